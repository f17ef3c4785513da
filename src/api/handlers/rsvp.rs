//! RSVP handlers: reserve and release a seat.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::RsvpResponse;
use crate::api::extract::ActingUser;
use crate::app_state::AppState;
use crate::domain::EventId;
use crate::error::{ErrorResponse, HubError};

/// `POST /events/{id}/rsvp` — Reserve a seat for the acting user.
///
/// # Errors
///
/// Returns a conflict error when the user already holds a seat, the event
/// is full, or registration has closed.
#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/rsvp",
    tag = "RSVP",
    summary = "RSVP to an event",
    description = "Reserves one seat. Rejected when the user already holds a seat, the event is full, or the registration deadline (or start) has passed.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Seat reserved", body = RsvpResponse),
        (status = 401, description = "No acting user", body = ErrorResponse),
        (status = 404, description = "Event or user not found", body = ErrorResponse),
        (status = 409, description = "Duplicate, full, or closed", body = ErrorResponse),
    )
)]
pub async fn rsvp(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    Path(id): Path<EventId>,
) -> Result<impl IntoResponse, HubError> {
    let event = state.event_service.rsvp(user, id).await?;
    Ok(Json(RsvpResponse::for_user(&event, user)))
}

/// `DELETE /events/{id}/rsvp` — Release the acting user's seat.
///
/// # Errors
///
/// Returns [`HubError::NotRegistered`] if the user holds no seat.
#[utoipa::path(
    delete,
    path = "/api/v1/events/{id}/rsvp",
    tag = "RSVP",
    summary = "Cancel an RSVP",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Seat released", body = RsvpResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 409, description = "No seat to release", body = ErrorResponse),
    )
)]
pub async fn cancel_rsvp(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    Path(id): Path<EventId>,
) -> Result<impl IntoResponse, HubError> {
    let event = state.event_service.cancel_rsvp(user, id).await?;
    Ok(Json(RsvpResponse::for_user(&event, user)))
}

/// RSVP routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/events/{id}/rsvp", post(rsvp).delete(cancel_rsvp))
}
