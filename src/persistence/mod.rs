//! Persistence layer: PostgreSQL document tables.
//!
//! Events and users are stored whole, as JSONB documents keyed by their
//! UUID. The in-memory stores stay authoritative while the process runs;
//! the document tables let them survive a restart.

pub mod models;
pub mod postgres;

pub use models::{Collection, StoredDocument};
pub use postgres::PostgresDocuments;
