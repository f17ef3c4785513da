//! Event DTOs for listing, detail, RSVP, and bookings.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::{PaginationMeta, PaginationParams, default_page, default_per_page};
use crate::domain::validation::parse_tags;
use crate::domain::{Event, EventId, FilterCriteria, UserId};
use crate::error::HubError;
use crate::service::Booking;

/// Query parameters for `GET /events`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventListQuery {
    /// Free text matched against name, description, and location.
    #[serde(default)]
    pub q: Option<String>,
    /// Calendar day (`YYYY-MM-DD`) the event must start on.
    #[serde(default)]
    pub date: Option<String>,
    /// Comma-delimited category labels.
    #[serde(default)]
    pub categories: Option<String>,
    /// Offset of the calendar `date` refers to, in minutes east of UTC.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl EventListQuery {
    /// Builds the filter criteria described by the query.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::InvalidRequest`] if `date` is not `YYYY-MM-DD`.
    pub fn criteria(&self) -> Result<FilterCriteria, HubError> {
        let mut criteria = FilterCriteria::new();
        if let Some(q) = &self.q {
            criteria = criteria.with_search(q.as_str());
        }
        if let Some(date) = self.date.as_deref().map(str::trim)
            && !date.is_empty()
        {
            let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
                HubError::InvalidRequest(format!("date must be YYYY-MM-DD, got {date}"))
            })?;
            criteria = criteria.on_date(day);
        }
        if let Some(categories) = &self.categories {
            criteria = criteria.in_categories(parse_tags(categories));
        }
        if let Some(minutes) = self.utc_offset_minutes {
            criteria = criteria.with_utc_offset_minutes(minutes);
        }
        Ok(criteria)
    }

    /// Pagination part of the query.
    #[must_use]
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// An event with the values clients derive from it.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    /// The stored event.
    #[serde(flatten)]
    pub event: Event,
    /// Display category, `Uncategorized` when none is set.
    pub category_label: &'static str,
    /// Seats still available.
    pub seats_left: u32,
    /// Seats taken.
    pub attendee_count: usize,
    /// Whether an RSVP would currently be accepted by the schedule.
    pub registration_open: bool,
}

impl EventResponse {
    /// Derives the response as of `now`.
    #[must_use]
    pub fn at(event: Event, now: DateTime<Utc>) -> Self {
        Self {
            category_label: event.category_label(),
            seats_left: event.seats_left(),
            attendee_count: event.attendees.len(),
            registration_open: event.is_registration_open(now),
            event,
        }
    }
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self::at(event, Utc::now())
    }
}

/// Response body for `GET /events`.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventListResponse {
    /// Matching events on this page, ordered by start time.
    pub data: Vec<EventResponse>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Response body for the category endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoriesResponse {
    /// Category labels.
    pub categories: Vec<String>,
}

/// Response body for RSVP and cancellation.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RsvpResponse {
    /// Event.
    pub event_id: EventId,
    /// Whether the acting user now holds a seat.
    pub registered: bool,
    /// Seats still available.
    pub seats_left: u32,
    /// Seats taken.
    pub attendee_count: usize,
}

impl RsvpResponse {
    /// Summarizes `event` from `user`'s point of view.
    #[must_use]
    pub fn for_user(event: &Event, user: UserId) -> Self {
        Self {
            event_id: event.id,
            registered: event.has_attendee(user),
            seats_left: event.seats_left(),
            attendee_count: event.attendees.len(),
        }
    }
}

/// One attendee row of a bookings listing.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingDto {
    /// Attendee.
    pub user_id: UserId,
    /// Username, absent when the account no longer exists.
    pub username: Option<String>,
    /// Email, absent when the account no longer exists.
    pub email: Option<String>,
    /// When the seat was reserved.
    pub rsvp_at: DateTime<Utc>,
}

impl From<Booking> for BookingDto {
    fn from(booking: Booking) -> Self {
        let (username, email) = match booking.user {
            Some(user) => (Some(user.username), Some(user.email)),
            None => (None, None),
        };
        Self {
            user_id: booking.attendee.user_id,
            username,
            email,
            rsvp_at: booking.attendee.rsvp_at,
        }
    }
}

/// Response body for `GET /events/{id}/bookings`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingsResponse {
    /// Event.
    pub event_id: EventId,
    /// Event name.
    pub event_name: String,
    /// Total seats.
    pub capacity: u32,
    /// Seats still available.
    pub seats_left: u32,
    /// Attendees in RSVP order.
    pub bookings: Vec<BookingDto>,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::EventCategory;
    use crate::domain::event::fixtures::{base_start, event};

    fn query() -> EventListQuery {
        EventListQuery {
            q: None,
            date: None,
            categories: None,
            utc_offset_minutes: None,
            page: 1,
            per_page: 20,
        }
    }

    #[test]
    fn query_builds_criteria() {
        let q = EventListQuery {
            q: Some("rust".to_string()),
            date: Some("2025-03-10".to_string()),
            categories: Some("workshop, ,Uncategorized".to_string()),
            utc_offset_minutes: Some(60),
            ..query()
        };
        let Ok(criteria) = q.criteria() else {
            panic!("valid query");
        };
        assert_eq!(criteria.search_text, "rust");
        assert_eq!(criteria.selected_date, Some(base_start().date_naive()));
        assert_eq!(criteria.selected_categories, vec!["workshop", "Uncategorized"]);
        assert_eq!(criteria.utc_offset_minutes, 60);
    }

    #[test]
    fn blank_query_is_inactive() {
        let q = EventListQuery {
            date: Some("  ".to_string()),
            ..query()
        };
        let Ok(criteria) = q.criteria() else {
            panic!("valid query");
        };
        assert!(!criteria.is_active());
    }

    #[test]
    fn malformed_date_is_rejected() {
        let q = EventListQuery {
            date: Some("10/03/2025".to_string()),
            ..query()
        };
        assert!(matches!(q.criteria(), Err(HubError::InvalidRequest(_))));
    }

    #[test]
    fn response_flattens_event_with_derived_fields() {
        let ev = event("Rust Workshop", Some(EventCategory::Workshop));
        let before_start = base_start() - chrono::Duration::hours(1);
        let Ok(json) = serde_json::to_value(EventResponse::at(ev, before_start)) else {
            panic!("serializes");
        };
        assert_eq!(json.get("name"), Some(&json!("Rust Workshop")));
        assert_eq!(json.get("categoryLabel"), Some(&json!("workshop")));
        assert_eq!(json.get("seatsLeft"), Some(&json!(2)));
        assert_eq!(json.get("registrationOpen"), Some(&json!(true)));
        assert!(json.get("startDateTime").is_some());
    }
}
