//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::dto::{
    BookingDto, BookingsResponse, CategoriesResponse, EventListResponse, EventResponse,
    PaginationMeta, RsvpResponse, UserEventsResponse, UserResponse,
};
use super::handlers::{events, rsvp, system, users};
use crate::domain::signup::{AdminRequestPayload, ProfilePayload, SignupPayload};
use crate::domain::validation::{EventPayload, ValidationReport, VenuePayload};
use crate::error::{ErrorBody, ErrorResponse};

/// Generated OpenAPI description, served at `/api-docs/openapi.json`.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "event-hub",
        description = "Browse, filter, validate, and book events."
    ),
    paths(
        events::list_events,
        events::create_event,
        events::validate_event,
        events::list_categories,
        events::get_event,
        events::update_event,
        events::delete_event,
        events::list_bookings,
        rsvp::rsvp,
        rsvp::cancel_rsvp,
        users::register,
        users::validate_signup_step,
        users::me,
        users::my_events,
        users::be_admin,
        system::health_handler,
        system::categories_handler,
    ),
    components(schemas(
        EventPayload,
        VenuePayload,
        ValidationReport,
        EventResponse,
        EventListResponse,
        CategoriesResponse,
        RsvpResponse,
        BookingDto,
        BookingsResponse,
        PaginationMeta,
        SignupPayload,
        ProfilePayload,
        AdminRequestPayload,
        UserResponse,
        UserEventsResponse,
        ErrorResponse,
        ErrorBody,
    )),
    tags(
        (name = "Events", description = "Event browsing and administration"),
        (name = "RSVP", description = "Seat reservations"),
        (name = "Users", description = "Signup and accounts"),
        (name = "System", description = "Health and catalogs"),
    )
)]
pub struct ApiDoc;
