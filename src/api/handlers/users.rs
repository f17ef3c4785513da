//! Account handlers: signup, current user, my events, admin request.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::api::dto::{EventResponse, UserEventsResponse, UserResponse};
use crate::api::extract::{ActingUser, JsonBody};
use crate::app_state::AppState;
use crate::domain::signup::{AdminRequestPayload, SignupPayload, SignupStep};
use crate::domain::validation::ValidationReport;
use crate::error::{ErrorResponse, HubError};

/// `POST /auth/register` — Create an account.
///
/// # Errors
///
/// Returns [`HubError::Validation`] or [`HubError::DuplicateUser`].
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Users",
    summary = "Register an account",
    description = "Validates all three signup steps and creates an account with the `user` role. Email and username must be unique (case-insensitive).",
    request_body = SignupPayload,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Validation failed or malformed body", body = ErrorResponse),
        (status = 409, description = "Email or username taken", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SignupPayload>,
) -> Result<impl IntoResponse, HubError> {
    let user = state.user_service.register(&payload).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// `POST /auth/register/validate/{step}` — Validate one signup step.
///
/// # Errors
///
/// Returns [`HubError::InvalidSignupStep`] for an unknown step.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register/validate/{step}",
    tag = "Users",
    summary = "Validate a signup step",
    description = "Runs the rules of one step (`account`, `profile`, `preferences`, or `1`-`3`) against the form as filled in so far.",
    params(
        ("step" = String, Path, description = "Step name or number"),
    ),
    request_body = SignupPayload,
    responses(
        (status = 200, description = "Validation outcome", body = ValidationReport),
        (status = 400, description = "Unknown step or malformed body", body = ErrorResponse),
    )
)]
pub async fn validate_signup_step(
    State(state): State<AppState>,
    Path(step): Path<String>,
    JsonBody(payload): JsonBody<SignupPayload>,
) -> Result<impl IntoResponse, HubError> {
    let step: SignupStep = step.parse().map_err(HubError::InvalidSignupStep)?;
    Ok(Json(state.user_service.validate_signup_step(&payload, step)))
}

/// `GET /users/me` — The acting user's account.
///
/// # Errors
///
/// Returns [`HubError::UserNotFound`] if the account does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "Users",
    summary = "Current user",
    responses(
        (status = 200, description = "Account", body = UserResponse),
        (status = 401, description = "No acting user", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
    )
)]
pub async fn me(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
) -> Result<impl IntoResponse, HubError> {
    let user = state.user_service.get_user(user).await?;
    Ok(Json(UserResponse::from(user)))
}

/// `GET /users/me/events` — Events the acting user holds a seat at.
///
/// # Errors
///
/// Returns [`HubError::UserNotFound`] if the account does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/users/me/events",
    tag = "Users",
    summary = "My events",
    responses(
        (status = 200, description = "Booked events", body = UserEventsResponse),
        (status = 401, description = "No acting user", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
    )
)]
pub async fn my_events(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
) -> Result<impl IntoResponse, HubError> {
    let events = state.event_service.events_for_user(user).await?;
    Ok(Json(UserEventsResponse {
        data: events.into_iter().map(EventResponse::from).collect(),
    }))
}

/// `PUT /users/be-admin` — Request the admin role.
///
/// # Errors
///
/// Returns [`HubError::Validation`] if reason or experience is missing.
#[utoipa::path(
    put,
    path = "/api/v1/users/be-admin",
    tag = "Users",
    summary = "Request admin role",
    description = "Records the request on the account and grants the admin role.",
    request_body = AdminRequestPayload,
    responses(
        (status = 200, description = "Role granted", body = UserResponse),
        (status = 400, description = "Validation failed or malformed body", body = ErrorResponse),
        (status = 401, description = "No acting user", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
    )
)]
pub async fn be_admin(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    JsonBody(payload): JsonBody<AdminRequestPayload>,
) -> Result<impl IntoResponse, HubError> {
    let user = state.user_service.request_admin(user, &payload).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/register/validate/{step}", post(validate_signup_step))
        .route("/users/me", get(me))
        .route("/users/me/events", get(my_events))
        .route("/users/be-admin", put(be_admin))
}
