//! User service: signup, profile lookup, and admin elevation.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::signup::{AdminRequestPayload, SignupPayload, SignupStep, validate_signup_step};
use crate::domain::user::Role;
use crate::domain::validation::ValidationReport;
use crate::domain::{User, UserDirectory, UserId};
use crate::error::HubError;
use crate::persistence::PostgresDocuments;

/// Orchestration layer for account operations.
#[derive(Debug, Clone)]
pub struct UserService {
    users: Arc<UserDirectory>,
    documents: Option<PostgresDocuments>,
}

impl UserService {
    /// Creates a new `UserService`.
    #[must_use]
    pub fn new(users: Arc<UserDirectory>, documents: Option<PostgresDocuments>) -> Self {
        Self { users, documents }
    }

    /// Returns a reference to the inner [`UserDirectory`].
    #[must_use]
    pub fn directory(&self) -> &Arc<UserDirectory> {
        &self.users
    }

    /// Registers a new account with the `user` role.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] if any signup step fails,
    /// [`HubError::DuplicateUser`] if the email or username is taken, or
    /// a persistence error.
    pub async fn register(&self, payload: &SignupPayload) -> Result<User, HubError> {
        let registration = payload.into_registration().inspect_err(|report| {
            tracing::warn!(fields = report.errors.len(), "signup rejected by validation");
        })?;

        let user = User {
            id: UserId::new(),
            email: registration.email,
            username: registration.username,
            role: Role::User,
            profile: registration.profile,
            preferences: registration.preferences,
            admin_request: None,
            created_at: Utc::now(),
        };
        self.users
            .insert_with(user.clone(), |u| self.persist(u))
            .await
            .inspect_err(|e| {
                tracing::warn!(error = %e, "signup rejected");
            })?;

        tracing::info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Validates one step of the signup form.
    #[must_use]
    pub fn validate_signup_step(&self, payload: &SignupPayload, step: SignupStep) -> ValidationReport {
        validate_signup_step(payload, step)
    }

    /// Returns a single account.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::UserNotFound`] if the account does not exist.
    pub async fn get_user(&self, id: UserId) -> Result<User, HubError> {
        self.users.get(id).await
    }

    /// Records an admin request and grants the admin role.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] if the request is incomplete,
    /// [`HubError::UserNotFound`], or a persistence error.
    pub async fn request_admin(
        &self,
        id: UserId,
        payload: &AdminRequestPayload,
    ) -> Result<User, HubError> {
        let request = payload.into_request(Utc::now())?;
        let user = self
            .users
            .update_with(
                id,
                |user| {
                    user.admin_request = Some(request);
                    user.role = Role::Admin;
                },
                |u| self.persist(u),
            )
            .await?;

        tracing::info!(user_id = %id, "admin role granted");
        Ok(user)
    }

    /// Writes `user` through to the document store, if any.
    async fn persist(&self, user: User) -> Result<(), HubError> {
        match &self.documents {
            Some(documents) => documents.save_user(&user).await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::signup::tests::valid_signup;

    fn service() -> UserService {
        UserService::new(Arc::new(UserDirectory::new()), None)
    }

    #[tokio::test]
    async fn register_creates_plain_user() {
        let service = service();
        let Ok(user) = service.register(&valid_signup("ada@example.com", "ada")).await else {
            panic!("register failed");
        };
        assert_eq!(user.role, Role::User);
        assert_eq!(user.preferences, vec!["workshop", "blockchain"]);

        let Ok(found) = service.get_user(user.id).await else {
            panic!("lookup failed");
        };
        assert_eq!(found, user);
    }

    #[tokio::test]
    async fn duplicate_email_or_username_is_rejected() {
        let service = service();
        let _ = service.register(&valid_signup("ada@example.com", "ada")).await;

        let same_email = service.register(&valid_signup("ADA@example.com", "other")).await;
        assert!(matches!(same_email, Err(HubError::DuplicateUser(_))));

        let same_username = service.register(&valid_signup("new@example.com", "Ada")).await;
        assert!(matches!(same_username, Err(HubError::DuplicateUser(_))));
        assert_eq!(service.directory().len().await, 1);
    }

    #[tokio::test]
    async fn invalid_signup_reports_fields() {
        let service = service();
        let payload = SignupPayload {
            email: Some("not-an-email".to_string()),
            ..valid_signup("", "ada")
        };
        let Err(HubError::Validation(errors)) = service.register(&payload).await else {
            panic!("expected validation error");
        };
        assert!(errors.contains_key("email"));
    }

    #[tokio::test]
    async fn admin_request_grants_role() {
        let service = service();
        let Ok(user) = service.register(&valid_signup("ada@example.com", "ada")).await else {
            panic!("register failed");
        };

        let incomplete = service
            .request_admin(user.id, &AdminRequestPayload::default())
            .await;
        assert!(matches!(incomplete, Err(HubError::Validation(_))));

        let payload = AdminRequestPayload {
            reason: Some("Running the local meetup".to_string()),
            experience: Some("Three years organizing".to_string()),
            ..AdminRequestPayload::default()
        };
        let Ok(admin) = service.request_admin(user.id, &payload).await else {
            panic!("request failed");
        };
        assert!(admin.is_admin());
        assert!(admin.admin_request.is_some());
    }

    #[tokio::test]
    async fn unknown_user_cannot_request_admin() {
        let payload = AdminRequestPayload {
            reason: Some("reason".to_string()),
            experience: Some("experience".to_string()),
            ..AdminRequestPayload::default()
        };
        let result = service().request_admin(UserId::new(), &payload).await;
        assert!(matches!(result, Err(HubError::UserNotFound(_))));
    }
}
