//! Domain layer: events, users, filtering, and validation.
//!
//! Everything here is independent of HTTP. The filter and validation
//! modules are pure functions; the stores wrap shared state behind
//! `tokio` locks so the service layer can use them from any handler.

pub mod category;
pub mod event;
pub mod event_store;
pub mod filter;
pub mod ids;
pub mod signup;
pub mod user;
pub mod user_directory;
pub mod validation;

pub use category::{EventCategory, UNCATEGORIZED};
pub use event::{Attendee, Event, Venue};
pub use event_store::EventStore;
pub use filter::{FilterCriteria, extract_categories, filter_events};
pub use ids::{EventId, UserId};
pub use user::{Role, User};
pub use user_directory::UserDirectory;
pub use validation::{EventPayload, ValidationReport, validate};
