//! Event categories and the canonical label for uncategorized events.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Label used for events that carry no category.
///
/// Applied uniformly: category extraction, category filtering, and API
/// responses all see an uncategorized event under this label.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// The fixed set of event categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    /// Multi-session professional gathering.
    Conference,
    /// Hands-on session.
    Workshop,
    /// Talk or lecture.
    Seminar,
    /// Networking meetup.
    Networking,
    /// Social gathering.
    Social,
    /// Anything else.
    Other,
}

impl EventCategory {
    /// Every category, in display order.
    pub const ALL: [Self; 6] = [
        Self::Conference,
        Self::Workshop,
        Self::Seminar,
        Self::Networking,
        Self::Social,
        Self::Other,
    ];

    /// Returns the wire name of the category (e.g. `"workshop"`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Conference => "conference",
            Self::Workshop => "workshop",
            Self::Seminar => "seminar",
            Self::Networking => "networking",
            Self::Social => "social",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for EventCategory {
    type Err = UnknownCategory;

    /// Parses an exact wire name. Form input is not case-folded: `"Workshop"`
    /// is rejected the same way the edit form rejects it.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Returns the display label for an optional category, falling back to
/// [`UNCATEGORIZED`].
#[must_use]
pub fn category_label(category: Option<EventCategory>) -> &'static str {
    category.map_or(UNCATEGORIZED, |c| c.as_str())
}
