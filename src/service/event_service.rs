//! Event service: browsing, administration, and RSVPs.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::filter::{extract_categories, filter_events};
use crate::domain::validation::{EventPayload, ValidationReport, validate};
use crate::domain::{
    Attendee, Event, EventId, EventStore, FilterCriteria, User, UserDirectory, UserId,
};
use crate::error::HubError;
use crate::persistence::PostgresDocuments;

/// One attendee of an event, joined with their account when it still
/// exists.
#[derive(Debug, Clone)]
pub struct Booking {
    /// The seat.
    pub attendee: Attendee,
    /// The account holding it.
    pub user: Option<User>,
}

/// Orchestration layer for all event operations.
///
/// Every mutation follows the same pattern: authorize → validate →
/// mutate a working copy under the store's write lock → write it through
/// to the document store under that same lock → log.
#[derive(Debug, Clone)]
pub struct EventService {
    events: Arc<EventStore>,
    users: Arc<UserDirectory>,
    documents: Option<PostgresDocuments>,
}

impl EventService {
    /// Creates a new `EventService`.
    #[must_use]
    pub fn new(
        events: Arc<EventStore>,
        users: Arc<UserDirectory>,
        documents: Option<PostgresDocuments>,
    ) -> Self {
        Self {
            events,
            users,
            documents,
        }
    }

    /// Returns a reference to the inner [`EventStore`].
    #[must_use]
    pub fn store(&self) -> &Arc<EventStore> {
        &self.events
    }

    /// Returns the events visible to `viewer` that match `criteria`,
    /// ordered by start time.
    ///
    /// Private events are only listed for admins, their organizer, and
    /// their attendees.
    pub async fn list_events(&self, viewer: Option<UserId>, criteria: &FilterCriteria) -> Vec<Event> {
        let visible = self.visible_events(viewer).await;
        filter_events(&visible, criteria)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Returns the distinct category labels across the events visible to
    /// `viewer`.
    pub async fn categories(&self, viewer: Option<UserId>) -> Vec<&'static str> {
        extract_categories(&self.visible_events(viewer).await)
    }

    async fn visible_events(&self, viewer: Option<UserId>) -> Vec<Event> {
        let viewer = match viewer {
            Some(id) => self.users.get(id).await.ok(),
            None => None,
        };
        self.events
            .list()
            .await
            .into_iter()
            .filter(|event| is_visible(event, viewer.as_ref()))
            .collect()
    }

    /// Returns a single event.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::EventNotFound`] if the event does not exist.
    pub async fn get_event(&self, id: EventId) -> Result<Event, HubError> {
        self.events.get(id).await
    }

    /// Runs the event form validator without touching any state.
    #[must_use]
    pub fn validate_payload(&self, payload: &EventPayload) -> ValidationReport {
        validate(payload)
    }

    /// Creates an event organized by `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Forbidden`] if `actor` is not an admin,
    /// [`HubError::Validation`] if the payload is invalid, or a
    /// persistence error.
    pub async fn create_event(
        &self,
        actor: UserId,
        payload: &EventPayload,
    ) -> Result<Event, HubError> {
        self.require_admin(actor).await?;
        let draft = payload.into_draft().inspect_err(|report| {
            tracing::warn!(%actor, fields = report.errors.len(), "event rejected by validation");
        })?;

        let event = Event::from_draft(EventId::new(), actor, draft, Utc::now());
        self.events
            .insert_with(event.clone(), |e| self.persist(e))
            .await?;

        tracing::info!(event_id = %event.id, organizer = %actor, category = event.category_label(), "event created");
        Ok(event)
    }

    /// Replaces the editable fields of an event.
    ///
    /// Attendees are kept, so capacity may not drop below their count.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Forbidden`] if `actor` is not an admin,
    /// [`HubError::EventNotFound`], [`HubError::Validation`], or a
    /// persistence error.
    pub async fn update_event(
        &self,
        actor: UserId,
        id: EventId,
        payload: &EventPayload,
    ) -> Result<Event, HubError> {
        self.require_admin(actor).await?;
        let draft = payload.into_draft().inspect_err(|report| {
            tracing::warn!(%actor, event_id = %id, fields = report.errors.len(), "event update rejected by validation");
        })?;

        let (event, ()) = self
            .events
            .update_with(
                id,
                |event| {
                    if (draft.capacity as usize) < event.attendees.len() {
                        return Err(HubError::field(
                            "capacity",
                            "Capacity cannot be less than the current number of attendees",
                        ));
                    }
                    event.apply_draft(draft, Utc::now());
                    Ok(())
                },
                |e| self.persist(e),
            )
            .await?;

        tracing::info!(event_id = %id, %actor, "event updated");
        Ok(event)
    }

    /// Deletes an event.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Forbidden`] if `actor` is not an admin,
    /// [`HubError::EventNotFound`], or a persistence error.
    pub async fn delete_event(&self, actor: UserId, id: EventId) -> Result<(), HubError> {
        self.require_admin(actor).await?;
        let removed = self
            .events
            .remove_with(id, |id| async move {
                match &self.documents {
                    Some(documents) => documents.delete_event(id).await,
                    None => Ok(()),
                }
            })
            .await?;
        tracing::info!(event_id = %id, %actor, attendees = removed.attendees.len(), "event deleted");
        Ok(())
    }

    /// Reserves a seat for `user` now.
    ///
    /// # Errors
    ///
    /// See [`EventService::rsvp_at`].
    pub async fn rsvp(&self, user: UserId, id: EventId) -> Result<Event, HubError> {
        self.rsvp_at(user, id, Utc::now()).await
    }

    /// Reserves a seat for `user` as of `now`.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::UserNotFound`], [`HubError::EventNotFound`],
    /// [`HubError::AlreadyRegistered`], [`HubError::RegistrationClosed`],
    /// [`HubError::EventFull`], or a persistence error.
    pub async fn rsvp_at(
        &self,
        user: UserId,
        id: EventId,
        now: DateTime<Utc>,
    ) -> Result<Event, HubError> {
        self.users.get(user).await?;
        let result = self
            .events
            .update_with(
                id,
                |event| {
                    if event.has_attendee(user) {
                        return Err(HubError::AlreadyRegistered(id));
                    }
                    if !event.is_registration_open(now) {
                        return Err(HubError::RegistrationClosed(id));
                    }
                    if event.is_full() {
                        return Err(HubError::EventFull(id));
                    }
                    event.attendees.push(Attendee {
                        user_id: user,
                        rsvp_at: now,
                    });
                    event.updated_at = now;
                    Ok(())
                },
                |e| self.persist(e),
            )
            .await;
        let (event, ()) = result.inspect_err(|e| {
            tracing::warn!(event_id = %id, %user, error = %e, "rsvp rejected");
        })?;

        tracing::info!(event_id = %id, %user, seats_left = event.seats_left(), "rsvp accepted");
        Ok(event)
    }

    /// Releases `user`'s seat.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::EventNotFound`], [`HubError::NotRegistered`],
    /// or a persistence error.
    pub async fn cancel_rsvp(&self, user: UserId, id: EventId) -> Result<Event, HubError> {
        let (event, ()) = self
            .events
            .update_with(
                id,
                |event| {
                    let before = event.attendees.len();
                    event.attendees.retain(|a| a.user_id != user);
                    if event.attendees.len() == before {
                        return Err(HubError::NotRegistered(id));
                    }
                    event.updated_at = Utc::now();
                    Ok(())
                },
                |e| self.persist(e),
            )
            .await?;

        tracing::info!(event_id = %id, %user, seats_left = event.seats_left(), "rsvp cancelled");
        Ok(event)
    }

    /// Lists an event's attendees with their accounts.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Forbidden`] if `actor` is not an admin, or
    /// [`HubError::EventNotFound`].
    pub async fn bookings(
        &self,
        actor: UserId,
        id: EventId,
    ) -> Result<(Event, Vec<Booking>), HubError> {
        self.require_admin(actor).await?;
        let event = self.events.get(id).await?;
        let ids: Vec<UserId> = event.attendees.iter().map(|a| a.user_id).collect();
        let accounts = self.users.get_many(&ids).await;
        let bookings = event
            .attendees
            .iter()
            .map(|attendee| Booking {
                attendee: attendee.clone(),
                user: accounts.iter().find(|u| u.id == attendee.user_id).cloned(),
            })
            .collect();
        Ok((event, bookings))
    }

    /// Returns the events `user` holds a seat at, ordered by start time.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::UserNotFound`] if the user does not exist.
    pub async fn events_for_user(&self, user: UserId) -> Result<Vec<Event>, HubError> {
        self.users.get(user).await?;
        Ok(self
            .events
            .list()
            .await
            .into_iter()
            .filter(|e| e.has_attendee(user))
            .collect())
    }

    async fn require_admin(&self, actor: UserId) -> Result<User, HubError> {
        let user = self.users.get(actor).await.map_err(|_| HubError::Unauthenticated)?;
        if !user.is_admin() {
            tracing::warn!(%actor, "admin action refused");
            return Err(HubError::Forbidden("admin role required".to_string()));
        }
        Ok(user)
    }

    /// Writes `event` through to the document store, if any.
    async fn persist(&self, event: Event) -> Result<(), HubError> {
        match &self.documents {
            Some(documents) => documents.save_event(&event).await,
            None => Ok(()),
        }
    }
}

fn is_visible(event: &Event, viewer: Option<&User>) -> bool {
    if !event.is_private {
        return true;
    }
    viewer.is_some_and(|u| u.is_admin() || u.id == event.organizer || event.has_attendee(u.id))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::domain::user::{Profile, Role};
    use crate::domain::validation::NumberInput;
    use crate::domain::validation::tests::valid_payload;

    struct Fixture {
        service: EventService,
        admin: UserId,
        alice: UserId,
        bob: UserId,
    }

    async fn add_user(users: &UserDirectory, name: &str, role: Role) -> UserId {
        let user = User {
            id: UserId::new(),
            email: format!("{name}@example.com"),
            username: name.to_string(),
            role,
            profile: Profile::default(),
            preferences: Vec::new(),
            admin_request: None,
            created_at: Utc::now(),
        };
        let Ok(id) = users.insert(user).await else {
            panic!("user insert failed");
        };
        id
    }

    async fn fixture() -> Fixture {
        let users = Arc::new(UserDirectory::new());
        let admin = add_user(&users, "admin", Role::Admin).await;
        let alice = add_user(&users, "alice", Role::User).await;
        let bob = add_user(&users, "bob", Role::User).await;
        let service = EventService::new(Arc::new(EventStore::new()), users, None);
        Fixture {
            service,
            admin,
            alice,
            bob,
        }
    }

    fn small_payload(capacity: f64) -> EventPayload {
        EventPayload {
            capacity: Some(NumberInput::Number(capacity)),
            ..valid_payload()
        }
    }

    /// Well before the payload's registration deadline.
    fn early() -> DateTime<Utc> {
        match crate::domain::validation::parse_timestamp("2025-08-01T00:00:00Z") {
            Some(ts) => ts,
            None => panic!("valid timestamp"),
        }
    }

    #[tokio::test]
    async fn admin_creates_event() {
        let f = fixture().await;
        let Ok(event) = f.service.create_event(f.admin, &valid_payload()).await else {
            panic!("create failed");
        };
        assert_eq!(event.organizer, f.admin);
        assert_eq!(event.tags, vec!["rust", "talks"]);
        assert_eq!(f.service.store().len().await, 1);
    }

    #[tokio::test]
    async fn non_admin_cannot_create() {
        let f = fixture().await;
        let result = f.service.create_event(f.alice, &valid_payload()).await;
        assert!(matches!(result, Err(HubError::Forbidden(_))));

        let unknown = f.service.create_event(UserId::new(), &valid_payload()).await;
        assert!(matches!(unknown, Err(HubError::Unauthenticated)));
    }

    #[tokio::test]
    async fn invalid_payload_is_not_stored() {
        let f = fixture().await;
        let result = f.service.create_event(f.admin, &EventPayload::default()).await;
        let Err(HubError::Validation(errors)) = result else {
            panic!("expected validation error");
        };
        assert!(errors.contains_key("name"));
        assert!(f.service.store().is_empty().await);
    }

    #[tokio::test]
    async fn rsvp_respects_capacity_and_duplicates() {
        let f = fixture().await;
        let Ok(event) = f.service.create_event(f.admin, &small_payload(1.0)).await else {
            panic!("create failed");
        };

        let Ok(booked) = f.service.rsvp_at(f.alice, event.id, early()).await else {
            panic!("rsvp failed");
        };
        assert_eq!(booked.seats_left(), 0);

        let again = f.service.rsvp_at(f.alice, event.id, early()).await;
        assert!(matches!(again, Err(HubError::AlreadyRegistered(_))));

        let full = f.service.rsvp_at(f.bob, event.id, early()).await;
        assert!(matches!(full, Err(HubError::EventFull(_))));
    }

    #[tokio::test]
    async fn rsvp_after_deadline_is_closed() {
        let f = fixture().await;
        let Ok(event) = f.service.create_event(f.admin, &valid_payload()).await else {
            panic!("create failed");
        };
        let Some(deadline) = event.registration_deadline else {
            panic!("payload sets a deadline");
        };
        let late = f.service.rsvp_at(f.alice, event.id, deadline).await;
        assert!(matches!(late, Err(HubError::RegistrationClosed(_))));

        let just_in_time = deadline - Duration::milliseconds(1);
        assert!(f.service.rsvp_at(f.alice, event.id, just_in_time).await.is_ok());
    }

    #[tokio::test]
    async fn cancel_frees_the_seat() {
        let f = fixture().await;
        let Ok(event) = f.service.create_event(f.admin, &small_payload(1.0)).await else {
            panic!("create failed");
        };
        let _ = f.service.rsvp_at(f.alice, event.id, early()).await;

        let Ok(after) = f.service.cancel_rsvp(f.alice, event.id).await else {
            panic!("cancel failed");
        };
        assert_eq!(after.seats_left(), 1);

        let twice = f.service.cancel_rsvp(f.alice, event.id).await;
        assert!(matches!(twice, Err(HubError::NotRegistered(_))));
        assert!(f.service.rsvp_at(f.bob, event.id, early()).await.is_ok());
    }

    #[tokio::test]
    async fn update_keeps_attendees_and_guards_capacity() {
        let f = fixture().await;
        let Ok(event) = f.service.create_event(f.admin, &small_payload(2.0)).await else {
            panic!("create failed");
        };
        let _ = f.service.rsvp_at(f.alice, event.id, early()).await;
        let _ = f.service.rsvp_at(f.bob, event.id, early()).await;

        let shrink = f.service.update_event(f.admin, event.id, &small_payload(1.0)).await;
        let Err(HubError::Validation(errors)) = shrink else {
            panic!("expected capacity error");
        };
        assert!(errors.contains_key("capacity"));

        let renamed = EventPayload {
            name: Some("Renamed".to_string()),
            ..small_payload(5.0)
        };
        let Ok(updated) = f.service.update_event(f.admin, event.id, &renamed).await else {
            panic!("update failed");
        };
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.attendees.len(), 2);
        assert_eq!(updated.created_at, event.created_at);
    }

    #[tokio::test]
    async fn delete_requires_admin() {
        let f = fixture().await;
        let Ok(event) = f.service.create_event(f.admin, &valid_payload()).await else {
            panic!("create failed");
        };
        let denied = f.service.delete_event(f.alice, event.id).await;
        assert!(matches!(denied, Err(HubError::Forbidden(_))));

        assert!(f.service.delete_event(f.admin, event.id).await.is_ok());
        let gone = f.service.get_event(event.id).await;
        assert!(matches!(gone, Err(HubError::EventNotFound(_))));
    }

    #[tokio::test]
    async fn bookings_join_user_accounts() {
        let f = fixture().await;
        let Ok(event) = f.service.create_event(f.admin, &valid_payload()).await else {
            panic!("create failed");
        };
        let _ = f.service.rsvp_at(f.alice, event.id, early()).await;

        let Ok((_, bookings)) = f.service.bookings(f.admin, event.id).await else {
            panic!("bookings failed");
        };
        assert_eq!(bookings.len(), 1);
        assert_eq!(
            bookings.first().and_then(|b| b.user.as_ref()).map(|u| u.username.as_str()),
            Some("alice")
        );

        let denied = f.service.bookings(f.alice, event.id).await;
        assert!(matches!(denied, Err(HubError::Forbidden(_))));
    }

    #[tokio::test]
    async fn private_events_are_hidden_from_strangers() {
        let f = fixture().await;
        let private = EventPayload {
            is_private: Some(true),
            ..valid_payload()
        };
        let Ok(event) = f.service.create_event(f.admin, &private).await else {
            panic!("create failed");
        };
        let criteria = FilterCriteria::new();

        assert!(f.service.list_events(None, &criteria).await.is_empty());
        assert!(f.service.list_events(Some(f.bob), &criteria).await.is_empty());
        assert_eq!(f.service.list_events(Some(f.admin), &criteria).await.len(), 1);

        let _ = f.service.rsvp_at(f.alice, event.id, early()).await;
        assert_eq!(f.service.list_events(Some(f.alice), &criteria).await.len(), 1);
    }

    #[tokio::test]
    async fn my_events_lists_only_booked_events() {
        let f = fixture().await;
        let Ok(first) = f.service.create_event(f.admin, &valid_payload()).await else {
            panic!("create failed");
        };
        let _ = f.service.create_event(f.admin, &valid_payload()).await;
        let _ = f.service.rsvp_at(f.alice, first.id, early()).await;

        let Ok(mine) = f.service.events_for_user(f.alice).await else {
            panic!("lookup failed");
        };
        assert_eq!(mine.len(), 1);
        assert_eq!(mine.first().map(|e| e.id), Some(first.id));
    }

    #[tokio::test]
    async fn listing_applies_filters_and_categories() {
        let f = fixture().await;
        let workshop = EventPayload {
            name: Some("Async Rust".to_string()),
            category: Some("workshop".to_string()),
            ..valid_payload()
        };
        let _ = f.service.create_event(f.admin, &workshop).await;
        let _ = f.service.create_event(f.admin, &valid_payload()).await;

        let only = f
            .service
            .list_events(None, &FilterCriteria::new().in_categories(["workshop"]))
            .await;
        assert_eq!(only.len(), 1);

        let mut categories = f.service.categories(None).await;
        categories.sort_unstable();
        assert_eq!(categories, vec!["conference", "workshop"]);
    }

    #[tokio::test]
    async fn categories_skip_events_hidden_from_viewer() {
        let f = fixture().await;
        let hidden_social = EventPayload {
            category: Some("social".to_string()),
            is_private: Some(true),
            ..valid_payload()
        };
        let _ = f.service.create_event(f.admin, &hidden_social).await;
        let _ = f.service.create_event(f.admin, &valid_payload()).await;

        assert_eq!(f.service.categories(None).await, vec!["conference"]);
        assert_eq!(f.service.categories(Some(f.bob)).await, vec!["conference"]);

        let mut for_admin = f.service.categories(Some(f.admin)).await;
        for_admin.sort_unstable();
        assert_eq!(for_admin, vec!["conference", "social"]);
    }

    #[tokio::test]
    async fn rsvp_and_cancel_touch_updated_at() {
        let f = fixture().await;
        let Ok(event) = f.service.create_event(f.admin, &valid_payload()).await else {
            panic!("create failed");
        };

        let Ok(booked) = f.service.rsvp_at(f.alice, event.id, early()).await else {
            panic!("rsvp failed");
        };
        assert_eq!(booked.updated_at, early());

        let Ok(cancelled) = f.service.cancel_rsvp(f.alice, event.id).await else {
            panic!("cancel failed");
        };
        assert!(cancelled.updated_at > early());
        assert!(cancelled.updated_at >= event.updated_at);

        let Ok(stored) = f.service.get_event(event.id).await else {
            panic!("event not found");
        };
        assert_eq!(stored.updated_at, cancelled.updated_at);
    }
}
