//! Account DTOs.

use serde::Serialize;
use utoipa::ToSchema;

use super::event_dto::EventResponse;
use crate::domain::User;

/// An account as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// The stored account.
    #[serde(flatten)]
    pub user: User,
    /// Shorthand for `role == "admin"`.
    pub is_admin: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            is_admin: user.is_admin(),
            user,
        }
    }
}

/// Response body for `GET /users/me/events`.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserEventsResponse {
    /// Events the user holds a seat at, ordered by start time.
    pub data: Vec<EventResponse>,
}
