//! The event aggregate and its value types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::category::{EventCategory, category_label};
use super::validation::EventDraft;
use super::{EventId, UserId};

/// Geographic position of a venue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    /// Degrees north, in `[-90, 90]`.
    pub latitude: f64,
    /// Degrees east, in `[-180, 180]`.
    pub longitude: f64,
}

/// Structured venue details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    /// Venue name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Street address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// City.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// State or region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Postal code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    /// Map position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl Venue {
    /// Returns `true` when no venue detail is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.address.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.zip_code.is_none()
            && self.coordinates.is_none()
    }
}

/// A user holding a seat at an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    /// The attending user.
    pub user_id: UserId,
    /// When the RSVP was accepted.
    pub rsvp_at: DateTime<Utc>,
}

/// A schedulable activity with time bounds, capacity, and category.
///
/// Events are only ever built from a validated [`EventDraft`], so the
/// time-ordering, capacity, and price invariants hold for every stored
/// value. `category` is optional because documents written before the
/// category field existed may lack it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event identifier.
    pub id: EventId,
    /// Title shown on cards.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Location as typed by the organizer.
    pub location: String,
    /// Start of the event.
    pub start_date_time: DateTime<Utc>,
    /// End of the event, strictly after the start.
    pub end_date_time: DateTime<Utc>,
    /// Optional structured venue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<Venue>,
    /// Category, absent on legacy documents.
    #[serde(default)]
    pub category: Option<EventCategory>,
    /// Maximum number of attendees (at least 1).
    pub capacity: u32,
    /// Users holding a seat, in RSVP order.
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    /// Ticket price, never negative.
    #[serde(default)]
    pub ticket_price: f64,
    /// Free-form tags, deduplicated.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Cover image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Hidden from public listings when `true`.
    #[serde(default)]
    pub is_private: bool,
    /// Ticket limit per user.
    #[serde(default = "default_max_tickets")]
    pub max_tickets_per_user: u32,
    /// Last moment an RSVP is accepted; strictly before the start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_deadline: Option<DateTime<Utc>>,
    /// Cancellation policy text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_policy: Option<String>,
    /// Administrator who created the event.
    pub organizer: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

const fn default_max_tickets() -> u32 {
    1
}

impl Event {
    /// Builds a new event from a validated draft.
    #[must_use]
    pub fn from_draft(id: EventId, organizer: UserId, draft: EventDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            location: draft.location,
            start_date_time: draft.start_date_time,
            end_date_time: draft.end_date_time,
            venue: draft.venue,
            category: Some(draft.category),
            capacity: draft.capacity,
            attendees: Vec::new(),
            ticket_price: draft.ticket_price,
            tags: draft.tags,
            image_url: draft.image_url,
            is_private: draft.is_private,
            max_tickets_per_user: draft.max_tickets_per_user,
            registration_deadline: draft.registration_deadline,
            cancellation_policy: draft.cancellation_policy,
            organizer,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces every editable field with the draft's values.
    ///
    /// Identity, organizer, attendees, and `created_at` are preserved.
    pub fn apply_draft(&mut self, draft: EventDraft, now: DateTime<Utc>) {
        self.name = draft.name;
        self.description = draft.description;
        self.location = draft.location;
        self.start_date_time = draft.start_date_time;
        self.end_date_time = draft.end_date_time;
        self.venue = draft.venue;
        self.category = Some(draft.category);
        self.capacity = draft.capacity;
        self.ticket_price = draft.ticket_price;
        self.tags = draft.tags;
        self.image_url = draft.image_url;
        self.is_private = draft.is_private;
        self.max_tickets_per_user = draft.max_tickets_per_user;
        self.registration_deadline = draft.registration_deadline;
        self.cancellation_policy = draft.cancellation_policy;
        self.updated_at = now;
    }

    /// Category label, [`super::category::UNCATEGORIZED`] when unset.
    #[must_use]
    pub fn category_label(&self) -> &'static str {
        category_label(self.category)
    }

    /// Seats still available.
    #[must_use]
    pub fn seats_left(&self) -> u32 {
        let taken = u32::try_from(self.attendees.len()).unwrap_or(u32::MAX);
        self.capacity.saturating_sub(taken)
    }

    /// Returns `true` when every seat is taken.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.seats_left() == 0
    }

    /// Returns `true` if the user already holds a seat.
    #[must_use]
    pub fn has_attendee(&self, user_id: UserId) -> bool {
        self.attendees.iter().any(|a| a.user_id == user_id)
    }

    /// Registration closes at the deadline, or at the start when no
    /// deadline is set.
    #[must_use]
    pub fn registration_closes_at(&self) -> DateTime<Utc> {
        self.registration_deadline.unwrap_or(self.start_date_time)
    }

    /// Returns `true` if an RSVP made at `now` is still accepted.
    #[must_use]
    pub fn is_registration_open(&self, now: DateTime<Utc>) -> bool {
        now < self.registration_closes_at()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Event builders shared by unit tests across the crate.

    use chrono::{DateTime, TimeZone, Utc};

    use super::Event;
    use crate::domain::{EventCategory, EventId, UserId};

    /// 2025-03-10 18:00 UTC.
    pub(crate) fn base_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 18, 0, 0)
            .single()
            .unwrap_or_default()
    }

    /// Minimal valid event starting at [`base_start`].
    pub(crate) fn event(name: &str, category: Option<EventCategory>) -> Event {
        let start = base_start();
        Event {
            id: EventId::new(),
            name: name.to_string(),
            description: format!("{name} description"),
            location: "Main Hall".to_string(),
            start_date_time: start,
            end_date_time: start + chrono::Duration::hours(2),
            venue: None,
            category,
            capacity: 2,
            attendees: Vec::new(),
            ticket_price: 0.0,
            tags: Vec::new(),
            image_url: None,
            is_private: false,
            max_tickets_per_user: 1,
            registration_deadline: None,
            cancellation_policy: None,
            organizer: UserId::new(),
            created_at: start - chrono::Duration::days(30),
            updated_at: start - chrono::Duration::days(30),
        }
    }
}
