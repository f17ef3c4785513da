//! Service layer: business logic orchestration.
//!
//! [`EventService`] and [`UserService`] validate input, mutate the
//! in-memory stores, and write changes through to the optional document
//! store.

pub mod event_service;
pub mod user_service;

pub use event_service::{Booking, EventService};
pub use user_service::UserService;
