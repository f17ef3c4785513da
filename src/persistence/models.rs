//! Document rows and the tables they live in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A row of one of the document tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    /// Entity UUID (event or user ID).
    pub id: Uuid,
    /// The entity serialized as JSON.
    pub body: serde_json::Value,
    /// When the row was last written.
    pub updated_at: DateTime<Utc>,
}

/// The document tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    /// `event_documents`.
    Events,
    /// `user_documents`.
    Users,
}

impl Collection {
    /// Table name. Never user-supplied, so it is safe to splice into SQL.
    #[must_use]
    pub const fn table(&self) -> &'static str {
        match self {
            Self::Events => "event_documents",
            Self::Users => "user_documents",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collections_map_to_distinct_tables() {
        assert_eq!(Collection::Events.table(), "event_documents");
        assert_eq!(Collection::Users.table(), "user_documents");
    }
}
