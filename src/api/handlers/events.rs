//! Event handlers: list, create, validate, get, update, delete, bookings.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    BookingDto, BookingsResponse, CategoriesResponse, EventListQuery, EventListResponse,
    EventResponse,
};
use crate::api::extract::{ActingUser, JsonBody, OptionalActingUser};
use crate::app_state::AppState;
use crate::domain::EventId;
use crate::domain::validation::{EventPayload, ValidationReport};
use crate::error::{ErrorResponse, HubError};

/// `GET /events` — List and filter events.
///
/// # Errors
///
/// Returns [`HubError::InvalidRequest`] on a malformed `date`.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "Events",
    summary = "List events",
    description = "Returns a paginated list of events ordered by start time, narrowed by free text, start date, and category labels. Private events are only listed for admins, organizers, and attendees.",
    params(EventListQuery),
    responses(
        (status = 200, description = "Paginated event list", body = EventListResponse),
        (status = 400, description = "Malformed query", body = ErrorResponse),
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    OptionalActingUser(viewer): OptionalActingUser,
    Query(query): Query<EventListQuery>,
) -> Result<impl IntoResponse, HubError> {
    let criteria = query.criteria()?;
    let events = state.event_service.list_events(viewer, &criteria).await;
    let (page, pagination) = query.pagination().paginate(events);

    Ok(Json(EventListResponse {
        data: page.into_iter().map(EventResponse::from).collect(),
        pagination,
    }))
}

/// `POST /events` — Create an event.
///
/// # Errors
///
/// Returns [`HubError::Validation`] with per-field messages, or an access
/// error when the acting user is not an admin.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    tag = "Events",
    summary = "Create an event",
    description = "Validates the submitted form and stores the event with the acting admin as organizer.",
    request_body = EventPayload,
    responses(
        (status = 201, description = "Event created", body = EventResponse),
        (status = 400, description = "Validation failed or malformed body", body = ErrorResponse),
        (status = 401, description = "No acting user", body = ErrorResponse),
        (status = 403, description = "Acting user is not an admin", body = ErrorResponse),
    )
)]
pub async fn create_event(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    JsonBody(payload): JsonBody<EventPayload>,
) -> Result<impl IntoResponse, HubError> {
    let event = state.event_service.create_event(actor, &payload).await?;
    Ok((StatusCode::CREATED, Json(EventResponse::from(event))))
}

/// `POST /events/validate` — Validate an event form without saving it.
#[utoipa::path(
    post,
    path = "/api/v1/events/validate",
    tag = "Events",
    summary = "Validate an event form",
    description = "Runs every field rule and returns the per-field messages. Nothing is stored.",
    request_body = EventPayload,
    responses(
        (status = 200, description = "Validation outcome", body = ValidationReport),
        (status = 400, description = "Malformed body", body = ErrorResponse),
    )
)]
pub async fn validate_event(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<EventPayload>,
) -> impl IntoResponse {
    Json(state.event_service.validate_payload(&payload))
}

/// `GET /events/categories` — Category labels in use.
#[utoipa::path(
    get,
    path = "/api/v1/events/categories",
    tag = "Events",
    summary = "List categories in use",
    description = "Returns the distinct category labels across the events the caller can see, including `Uncategorized` when any of them has no category.",
    responses(
        (status = 200, description = "Category labels", body = CategoriesResponse),
    )
)]
pub async fn list_categories(
    State(state): State<AppState>,
    OptionalActingUser(viewer): OptionalActingUser,
) -> impl IntoResponse {
    let categories = state
        .event_service
        .categories(viewer)
        .await
        .into_iter()
        .map(str::to_string)
        .collect();
    Json(CategoriesResponse { categories })
}

/// `GET /events/{id}` — Get one event.
///
/// # Errors
///
/// Returns [`HubError::EventNotFound`] if the event does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Get event details",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Event details", body = EventResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
) -> Result<impl IntoResponse, HubError> {
    let event = state.event_service.get_event(id).await?;
    Ok(Json(EventResponse::from(event)))
}

/// `PUT /events/{id}` — Replace an event's editable fields.
///
/// # Errors
///
/// Returns [`HubError::Validation`], [`HubError::EventNotFound`], or an
/// access error.
#[utoipa::path(
    put,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Update an event",
    description = "Validates the submitted form and replaces the event's fields. Attendees, organizer, and creation time are kept.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    request_body = EventPayload,
    responses(
        (status = 200, description = "Event updated", body = EventResponse),
        (status = 400, description = "Validation failed or malformed body", body = ErrorResponse),
        (status = 403, description = "Acting user is not an admin", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn update_event(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(id): Path<EventId>,
    JsonBody(payload): JsonBody<EventPayload>,
) -> Result<impl IntoResponse, HubError> {
    let event = state.event_service.update_event(actor, id, &payload).await?;
    Ok(Json(EventResponse::from(event)))
}

/// `DELETE /events/{id}` — Delete an event.
///
/// # Errors
///
/// Returns [`HubError::EventNotFound`] or an access error.
#[utoipa::path(
    delete,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Delete an event",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 403, description = "Acting user is not an admin", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn delete_event(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(id): Path<EventId>,
) -> Result<impl IntoResponse, HubError> {
    state.event_service.delete_event(actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /events/{id}/bookings` — Attendees of an event.
///
/// # Errors
///
/// Returns [`HubError::EventNotFound`] or an access error.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/bookings",
    tag = "Events",
    summary = "List bookings",
    description = "Returns the attendees of an event in RSVP order, joined with their account details.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Bookings", body = BookingsResponse),
        (status = 403, description = "Acting user is not an admin", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(id): Path<EventId>,
) -> Result<impl IntoResponse, HubError> {
    let (event, bookings) = state.event_service.bookings(actor, id).await?;
    Ok(Json(BookingsResponse {
        event_id: event.id,
        seats_left: event.seats_left(),
        capacity: event.capacity,
        event_name: event.name,
        bookings: bookings.into_iter().map(BookingDto::from).collect(),
    }))
}

/// Event management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/validate", post(validate_event))
        .route("/events/categories", get(list_categories))
        .route(
            "/events/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/events/{id}/bookings", get(list_bookings))
}
