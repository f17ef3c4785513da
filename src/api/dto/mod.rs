//! Data Transfer Objects for REST request/response serialization.
//!
//! Request bodies reuse the domain payload types directly; these wrap
//! responses with derived fields and pagination.

pub mod common_dto;
pub mod event_dto;
pub mod user_dto;

pub use common_dto::*;
pub use event_dto::*;
pub use user_dto::*;
