//! Concurrent in-memory user storage.

use std::collections::HashMap;
use std::future::ready;

use tokio::sync::RwLock;

use super::UserId;
use super::user::User;
use crate::error::HubError;

/// Registered users keyed by ID.
///
/// Email and username are unique ignoring ASCII case; the check and the
/// insert happen under one write lock.
#[derive(Debug)]
pub struct UserDirectory {
    users: RwLock<HashMap<UserId, User>>,
}

impl UserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    /// Replaces the contents of the directory. Returns the number of users
    /// loaded.
    pub async fn load(&self, users: Vec<User>) -> usize {
        let mut map = self.users.write().await;
        map.clear();
        map.extend(users.into_iter().map(|u| (u.id, u)));
        map.len()
    }

    /// Adds a user.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::DuplicateUser`] if the email or username is
    /// already taken.
    pub async fn insert(&self, user: User) -> Result<UserId, HubError> {
        self.insert_with(user, |_| ready(Ok(()))).await
    }

    /// Adds a user once `commit` has accepted it, under the write lock.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::DuplicateUser`] if the email or username is
    /// already taken, or whatever error `commit` returns.
    pub async fn insert_with<C, Fut>(&self, user: User, commit: C) -> Result<UserId, HubError>
    where
        C: FnOnce(User) -> Fut,
        Fut: Future<Output = Result<(), HubError>>,
    {
        let mut map = self.users.write().await;
        for existing in map.values() {
            if existing.email.eq_ignore_ascii_case(&user.email) {
                return Err(HubError::DuplicateUser(format!("email {}", user.email)));
            }
            if existing.username.eq_ignore_ascii_case(&user.username) {
                return Err(HubError::DuplicateUser(format!(
                    "username {}",
                    user.username
                )));
            }
        }
        commit(user.clone()).await?;
        let id = user.id;
        map.insert(id, user);
        Ok(id)
    }

    /// Returns a copy of the user.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::UserNotFound`] if no user has the given ID.
    pub async fn get(&self, id: UserId) -> Result<User, HubError> {
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(HubError::UserNotFound(id))
    }

    /// Returns copies of whichever of `ids` exist, in the order given.
    pub async fn get_many(&self, ids: &[UserId]) -> Vec<User> {
        let map = self.users.read().await;
        ids.iter().filter_map(|id| map.get(id).cloned()).collect()
    }

    /// Applies `f` to the stored user and returns the updated copy.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::UserNotFound`] if no user has the given ID.
    pub async fn update<F>(&self, id: UserId, f: F) -> Result<User, HubError>
    where
        F: FnOnce(&mut User),
    {
        self.update_with(id, f, |_| ready(Ok(()))).await
    }

    /// Applies `f` to a working copy of the user and stores it once
    /// `commit` has accepted it, all under the write lock.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::UserNotFound`] if no user has the given ID, or
    /// whatever error `commit` returns.
    pub async fn update_with<F, C, Fut>(&self, id: UserId, f: F, commit: C) -> Result<User, HubError>
    where
        F: FnOnce(&mut User),
        C: FnOnce(User) -> Fut,
        Fut: Future<Output = Result<(), HubError>>,
    {
        let mut map = self.users.write().await;
        let mut working = map.get(&id).cloned().ok_or(HubError::UserNotFound(id))?;
        f(&mut working);
        commit(working.clone()).await?;
        map.insert(id, working.clone());
        Ok(working)
    }

    /// Returns the number of registered users.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// Returns `true` if no user is registered.
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::user::{Profile, Role};

    fn user(email: &str, username: &str) -> User {
        User {
            id: UserId::new(),
            email: email.to_string(),
            username: username.to_string(),
            role: Role::User,
            profile: Profile::default(),
            preferences: Vec::new(),
            admin_request: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn email_and_username_are_unique_ignoring_case() {
        let dir = UserDirectory::new();
        assert!(dir.insert(user("ada@example.com", "ada")).await.is_ok());

        let same_email = dir.insert(user("ADA@example.com", "other")).await;
        assert!(matches!(same_email, Err(HubError::DuplicateUser(_))));

        let same_name = dir.insert(user("x@example.com", "Ada")).await;
        assert!(matches!(same_name, Err(HubError::DuplicateUser(_))));

        assert_eq!(dir.len().await, 1);
    }

    #[tokio::test]
    async fn update_changes_stored_user() {
        let dir = UserDirectory::new();
        let u = user("grace@example.com", "grace");
        let id = u.id;
        let _ = dir.insert(u).await;

        let Ok(updated) = dir.update(id, |u| u.role = Role::Admin).await else {
            panic!("user not found");
        };
        assert!(updated.is_admin());
        assert!(dir.get(id).await.is_ok_and(|u| u.is_admin()));
    }

    #[tokio::test]
    async fn failed_commit_keeps_previous_state() {
        let dir = UserDirectory::new();
        let u = user("grace@example.com", "grace");
        let id = u.id;
        let _ = dir.insert(u).await;

        let result = dir
            .update_with(
                id,
                |u| u.role = Role::Admin,
                |_| ready(Err(HubError::PersistenceError("down".to_string()))),
            )
            .await;
        assert!(result.is_err());
        assert!(dir.get(id).await.is_ok_and(|u| !u.is_admin()));

        let rejected = dir
            .insert_with(user("new@example.com", "new"), |_| {
                ready(Err(HubError::PersistenceError("down".to_string())))
            })
            .await;
        assert!(rejected.is_err());
        assert_eq!(dir.len().await, 1);
    }

    #[tokio::test]
    async fn missing_user_is_reported() {
        let dir = UserDirectory::new();
        assert!(dir.is_empty().await);
        let result = dir.update(UserId::new(), |_| {}).await;
        assert!(matches!(result, Err(HubError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn get_many_skips_unknown_ids() {
        let dir = UserDirectory::new();
        let u = user("linus@example.com", "linus");
        let id = u.id;
        let _ = dir.insert(u).await;
        let found = dir.get_many(&[UserId::new(), id]).await;
        assert_eq!(found.len(), 1);
    }
}
