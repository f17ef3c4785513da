//! REST endpoint handlers organized by resource.

pub mod events;
pub mod rsvp;
pub mod system;
pub mod users;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(events::routes())
        .merge(rsvp::routes())
        .merge(users::routes())
}
