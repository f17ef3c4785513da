//! Event search and filtering.
//!
//! [`filter_events`] narrows a list of events to those matching every
//! active criterion of a [`FilterCriteria`]. It is a single linear scan
//! that preserves input order and never mutates its input; event lists are
//! page-sized so no index is kept.

use chrono::{FixedOffset, NaiveDate, Offset, Utc};

use super::event::Event;

/// The active filters narrowing a displayed event list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Free-text query; blank means "no text filter".
    pub search_text: String,
    /// Calendar day the event must start on.
    pub selected_date: Option<NaiveDate>,
    /// Category labels; empty means "any category".
    pub selected_categories: Vec<String>,
    /// Offset of the calendar `selected_date` refers to, in minutes east
    /// of UTC.
    pub utc_offset_minutes: i32,
}

impl FilterCriteria {
    /// Criteria that match every event.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the free-text query.
    #[must_use]
    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    /// Restricts to events starting on `date`.
    #[must_use]
    pub fn on_date(mut self, date: NaiveDate) -> Self {
        self.selected_date = Some(date);
        self
    }

    /// Restricts to events whose category label is one of `labels`.
    #[must_use]
    pub fn in_categories<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_categories = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Interprets `selected_date` in a calendar `minutes` east of UTC.
    #[must_use]
    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    /// Returns `true` if any criterion narrows the list.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.search_text.trim().is_empty()
            || self.selected_date.is_some()
            || !self.selected_categories.is_empty()
    }

    /// Returns `true` if `event` satisfies every active criterion.
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        let needle = self.search_text.trim().to_lowercase();
        self.matches_with(event, &needle)
    }

    fn matches_with(&self, event: &Event, needle: &str) -> bool {
        matches_text(event, needle) && self.matches_date(event) && self.matches_category(event)
    }

    fn matches_date(&self, event: &Event) -> bool {
        let Some(date) = self.selected_date else {
            return true;
        };
        let offset = self.offset();
        event.start_date_time.with_timezone(&offset).date_naive() == date
    }

    fn matches_category(&self, event: &Event) -> bool {
        if self.selected_categories.is_empty() {
            return true;
        }
        let label = event.category_label();
        self.selected_categories
            .iter()
            .any(|selected| selected.trim().eq_ignore_ascii_case(label))
    }

    /// Out-of-range offsets fall back to UTC.
    fn offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }
}

fn matches_text(event: &Event, needle: &str) -> bool {
    needle.is_empty()
        || event.name.to_lowercase().contains(needle)
        || event.description.to_lowercase().contains(needle)
        || event.location.to_lowercase().contains(needle)
}

/// Returns the events matching `criteria`, in input order.
#[must_use]
pub fn filter_events<'a>(events: &'a [Event], criteria: &FilterCriteria) -> Vec<&'a Event> {
    let needle = criteria.search_text.trim().to_lowercase();
    events
        .iter()
        .filter(|event| criteria.matches_with(event, &needle))
        .collect()
}

/// Unique category labels in order of first appearance.
///
/// Uncategorized events contribute [`super::category::UNCATEGORIZED`].
#[must_use]
pub fn extract_categories(events: &[Event]) -> Vec<&'static str> {
    let mut labels: Vec<&'static str> = Vec::new();
    for label in events.iter().map(Event::category_label) {
        if !labels.contains(&label) {
            labels.push(label);
        }
    }
    labels
}
