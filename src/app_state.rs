//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::{EventStore, UserDirectory};
use crate::persistence::PostgresDocuments;
use crate::service::{EventService, UserService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Event browsing, administration, and RSVPs.
    pub event_service: Arc<EventService>,
    /// Signup and accounts.
    pub user_service: Arc<UserService>,
}

impl AppState {
    /// Wires both services over the given stores.
    #[must_use]
    pub fn new(
        events: Arc<EventStore>,
        users: Arc<UserDirectory>,
        documents: Option<PostgresDocuments>,
    ) -> Self {
        Self {
            event_service: Arc::new(EventService::new(
                events,
                Arc::clone(&users),
                documents.clone(),
            )),
            user_service: Arc::new(UserService::new(users, documents)),
        }
    }

    /// State backed by empty in-memory stores.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(EventStore::new()),
            Arc::new(UserDirectory::new()),
            None,
        )
    }
}
