//! Registered users and their roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UserId;

/// Access level of a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Browses events and RSVPs.
    #[default]
    User,
    /// Creates, edits, and deletes events; sees bookings.
    Admin,
}

/// Personal details collected in the profile step of signup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Short biography.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Employer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// Job title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
}

/// A user's request for administrator access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminRequest {
    /// Why the user wants admin access.
    pub reason: String,
    /// Relevant event-management experience.
    pub experience: String,
    /// References.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,
    /// Anything else.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
    /// When the request was submitted.
    pub submitted_at: DateTime<Utc>,
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User identifier.
    pub id: UserId,
    /// Login email, unique case-insensitively.
    pub email: String,
    /// Display name, unique case-insensitively.
    pub username: String,
    /// Access level.
    #[serde(default)]
    pub role: Role,
    /// Personal details.
    pub profile: Profile,
    /// Interests chosen at signup.
    #[serde(default)]
    pub preferences: Vec<String>,
    /// Latest admin-access request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_request: Option<AdminRequest>,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Returns `true` for administrators.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
