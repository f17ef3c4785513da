//! # event-hub
//!
//! REST service for browsing, filtering, validating, and booking events.
//!
//! Events carry a schedule, a venue, a category, and a fixed number of
//! seats. Anyone may browse and filter them; signed-up users RSVP; admins
//! create, edit, and delete them. Event and signup forms are validated
//! field by field so clients can show one message per input.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── EventService / UserService (service/)
//!     │
//!     ├── Filter + Validators (domain/)
//!     ├── EventStore / UserDirectory (domain/)
//!     │
//!     └── PostgreSQL document tables (optional)
//! ```
//!
//! Identity comes from upstream: the authenticated account ID arrives in
//! the `x-user-id` header.

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
