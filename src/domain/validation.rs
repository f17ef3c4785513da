//! Event form validation.
//!
//! [`validate`] checks a candidate [`EventPayload`] and reports every
//! failing field at once; nothing short-circuits, so a form can show all
//! of its errors inline after a single submit. [`EventPayload::into_draft`]
//! runs the same checks and, on success, yields an [`EventDraft`] with
//! optional fields defaulted exactly once.
//!
//! Error keys are the camelCase field names used on the wire
//! (`startDateTime`, `venue.coordinates.latitude`, ...).

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use url::{Host, Url};
use utoipa::ToSchema;

use super::category::EventCategory;
use super::event::{Coordinates, Venue};

/// Field → message map of validation failures.
pub type FieldErrors = BTreeMap<String, String>;

/// Outcome of validating a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// `true` iff `errors` is empty.
    pub is_valid: bool,
    /// One message per failing field.
    #[schema(value_type = Object)]
    pub errors: FieldErrors,
}

impl ValidationReport {
    /// Builds a report from collected errors.
    #[must_use]
    pub fn from_errors(errors: FieldErrors) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// Returns the message recorded for `field`, if any.
    #[must_use]
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }
}

/// A numeric form field that may arrive as a JSON number or as text.
///
/// HTML inputs submit numbers as strings and send `""` for untouched
/// fields; both shapes are accepted so that a bad value becomes a field
/// error rather than a body rejection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum NumberInput {
    /// A JSON number.
    Number(f64),
    /// Text to be parsed; blank means "not provided".
    Text(String),
}

impl NumberInput {
    /// `None` when blank, `Some(Err(()))` when not a finite number.
    fn value(&self) -> Option<Result<f64, ()>> {
        match self {
            Self::Number(n) if n.is_finite() => Some(Ok(*n)),
            Self::Number(_) => Some(Err(())),
            Self::Text(s) if s.trim().is_empty() => None,
            Self::Text(s) => Some(
                s.trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .ok_or(()),
            ),
        }
    }
}

impl From<f64> for NumberInput {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// Tags as submitted: a list, or one comma-delimited string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum TagsInput {
    /// Already split.
    List(Vec<String>),
    /// `"blockchain, web3, ethereum"`.
    Delimited(String),
}

impl TagsInput {
    /// Normalizes into a tag list; see [`parse_tags`].
    #[must_use]
    pub fn to_tags(&self) -> Vec<String> {
        match self {
            Self::List(items) => normalize_tags(items.iter().map(String::as_str)),
            Self::Delimited(text) => parse_tags(text),
        }
    }
}

/// Splits a comma-delimited tag string, trimming each tag and dropping
/// empties and repeats. First-seen order is kept.
#[must_use]
pub fn parse_tags(text: &str) -> Vec<String> {
    normalize_tags(text.split(','))
}

fn normalize_tags<'a>(items: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in items.map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// Submitted map position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CoordinatesPayload {
    /// Latitude in degrees.
    #[serde(default)]
    pub latitude: Option<NumberInput>,
    /// Longitude in degrees.
    #[serde(default)]
    pub longitude: Option<NumberInput>,
}

/// Submitted venue details. Blank strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VenuePayload {
    /// Venue name.
    #[serde(default)]
    pub name: Option<String>,
    /// Street address.
    #[serde(default)]
    pub address: Option<String>,
    /// City.
    #[serde(default)]
    pub city: Option<String>,
    /// State or region.
    #[serde(default)]
    pub state: Option<String>,
    /// Postal code.
    #[serde(default)]
    pub zip_code: Option<String>,
    /// Map position.
    #[serde(default)]
    pub coordinates: Option<CoordinatesPayload>,
}

/// Candidate event data submitted for creation or update.
///
/// Every field is optional at this stage; presence is a validation rule,
/// not a deserialization requirement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    /// Title.
    #[serde(default)]
    pub name: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Location string.
    #[serde(default)]
    pub location: Option<String>,
    /// Start timestamp (RFC 3339 or `YYYY-MM-DDTHH:MM`).
    #[serde(default)]
    pub start_date_time: Option<String>,
    /// End timestamp.
    #[serde(default)]
    pub end_date_time: Option<String>,
    /// Structured venue.
    #[serde(default)]
    pub venue: Option<VenuePayload>,
    /// Category wire name.
    #[serde(default)]
    pub category: Option<String>,
    /// Seat count.
    #[serde(default)]
    pub capacity: Option<NumberInput>,
    /// Ticket price.
    #[serde(default)]
    pub ticket_price: Option<NumberInput>,
    /// Tags, as a list or a comma-delimited string.
    #[serde(default)]
    pub tags: Option<TagsInput>,
    /// Cover image URL.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Privacy flag.
    #[serde(default)]
    pub is_private: Option<bool>,
    /// Per-user ticket limit.
    #[serde(default)]
    pub max_tickets_per_user: Option<NumberInput>,
    /// Registration deadline timestamp.
    #[serde(default)]
    pub registration_deadline: Option<String>,
    /// Cancellation policy text.
    #[serde(default)]
    pub cancellation_policy: Option<String>,
}

/// A validated payload with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    /// Trimmed title.
    pub name: String,
    /// Trimmed description.
    pub description: String,
    /// Trimmed location.
    pub location: String,
    /// Start.
    pub start_date_time: DateTime<Utc>,
    /// End, strictly after start.
    pub end_date_time: DateTime<Utc>,
    /// Venue, `None` when nothing was filled in.
    pub venue: Option<Venue>,
    /// Category.
    pub category: EventCategory,
    /// Seats, at least 1.
    pub capacity: u32,
    /// Price, defaults to 0.
    pub ticket_price: f64,
    /// Normalized tags.
    pub tags: Vec<String>,
    /// Cover image URL.
    pub image_url: Option<String>,
    /// Defaults to `false`.
    pub is_private: bool,
    /// Defaults to 1.
    pub max_tickets_per_user: u32,
    /// Strictly before start when set.
    pub registration_deadline: Option<DateTime<Utc>>,
    /// Cancellation policy text.
    pub cancellation_policy: Option<String>,
}

impl EventPayload {
    /// Validates the payload and converts it into an [`EventDraft`].
    ///
    /// # Errors
    ///
    /// Returns the failing [`ValidationReport`] when any rule fails.
    pub fn into_draft(&self) -> Result<EventDraft, ValidationReport> {
        let (errors, draft) = check(self);
        match draft {
            Some(draft) if errors.is_empty() => Ok(draft),
            _ => Err(ValidationReport::from_errors(errors)),
        }
    }
}

/// Validates an event payload, reporting every failing field.
#[must_use]
pub fn validate(payload: &EventPayload) -> ValidationReport {
    let (errors, _) = check(payload);
    ValidationReport::from_errors(errors)
}

/// Parses a form timestamp.
///
/// Accepts RFC 3339 with any offset, or the `datetime-local` shapes
/// `YYYY-MM-DDTHH:MM`, `YYYY-MM-DDTHH:MM:SS`, and
/// `YYYY-MM-DDTHH:MM:SS.fff`, which are read as UTC.
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    const LOCAL_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&String>,
    message: &str,
) -> Option<String> {
    let text = non_blank(value);
    if text.is_none() {
        errors.insert(field.to_string(), message.to_string());
    }
    text.map(str::to_string)
}

fn required_timestamp(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&String>,
    label: &str,
) -> Option<DateTime<Utc>> {
    let Some(text) = non_blank(value) else {
        errors.insert(field.to_string(), format!("{label} is required"));
        return None;
    };
    let parsed = parse_timestamp(text);
    if parsed.is_none() {
        errors.insert(field.to_string(), format!("{label} is invalid"));
    }
    parsed
}

fn whole_number(n: f64) -> bool {
    n.fract() == 0.0
}

/// Callers have already checked `n` is whole and within `0..=u32::MAX`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_to_u32(n: f64) -> u32 {
    n as u32
}

/// Absolute `http`/`https` URL with a well-formed host.
fn is_valid_url(text: &str) -> bool {
    let Ok(url) = Url::parse(text) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    match url.host() {
        Some(Host::Domain(domain)) => {
            let domain = domain.strip_suffix('.').unwrap_or(domain);
            !domain.is_empty() && domain.split('.').all(|label| !label.is_empty())
        }
        Some(Host::Ipv4(_) | Host::Ipv6(_)) => true,
        None => false,
    }
}

fn check_capacity(errors: &mut FieldErrors, input: Option<&NumberInput>) -> Option<u32> {
    let message = match input.and_then(NumberInput::value) {
        None => "Capacity is required",
        Some(Err(())) => "Capacity must be a number",
        Some(Ok(n)) if !whole_number(n) => "Capacity must be a whole number",
        Some(Ok(n)) if n < 1.0 => "Capacity must be at least 1",
        Some(Ok(n)) if n > f64::from(u32::MAX) => "Capacity is too large",
        Some(Ok(n)) => return Some(whole_to_u32(n)),
    };
    errors.insert("capacity".to_string(), message.to_string());
    None
}

fn check_ticket_price(errors: &mut FieldErrors, input: Option<&NumberInput>) -> f64 {
    match input.and_then(NumberInput::value) {
        None => 0.0,
        Some(Ok(price)) if price >= 0.0 => price,
        Some(Ok(_)) => {
            errors.insert(
                "ticketPrice".to_string(),
                "Ticket price cannot be negative".to_string(),
            );
            0.0
        }
        Some(Err(())) => {
            errors.insert(
                "ticketPrice".to_string(),
                "Ticket price must be a number".to_string(),
            );
            0.0
        }
    }
}

fn check_max_tickets(errors: &mut FieldErrors, input: Option<&NumberInput>) -> u32 {
    match input.and_then(NumberInput::value) {
        None => 1,
        Some(Ok(n)) if whole_number(n) && n >= 1.0 && n <= f64::from(u32::MAX) => whole_to_u32(n),
        Some(_) => {
            errors.insert(
                "maxTicketsPerUser".to_string(),
                "Max tickets per user must be at least 1".to_string(),
            );
            1
        }
    }
}

fn check_coordinate(
    errors: &mut FieldErrors,
    field: &str,
    input: Option<&NumberInput>,
    bound: f64,
    message: &str,
) -> Option<f64> {
    match input.and_then(NumberInput::value) {
        None => None,
        Some(Ok(n)) if (-bound..=bound).contains(&n) => Some(n),
        Some(_) => {
            errors.insert(field.to_string(), message.to_string());
            None
        }
    }
}

fn check_venue(errors: &mut FieldErrors, payload: Option<&VenuePayload>) -> Option<Venue> {
    let payload = payload?;
    let coordinates = payload.coordinates.as_ref().and_then(|c| {
        let latitude = check_coordinate(
            errors,
            "venue.coordinates.latitude",
            c.latitude.as_ref(),
            90.0,
            "Latitude must be between -90 and 90",
        );
        let longitude = check_coordinate(
            errors,
            "venue.coordinates.longitude",
            c.longitude.as_ref(),
            180.0,
            "Longitude must be between -180 and 180",
        );
        // A half-filled position defaults the missing axis to 0, as the form does.
        match (latitude, longitude) {
            (None, None) => None,
            (lat, lon) => Some(Coordinates {
                latitude: lat.unwrap_or_default(),
                longitude: lon.unwrap_or_default(),
            }),
        }
    });
    let text = |v: &Option<String>| non_blank(v.as_ref()).map(str::to_string);
    let venue = Venue {
        name: text(&payload.name),
        address: text(&payload.address),
        city: text(&payload.city),
        state: text(&payload.state),
        zip_code: text(&payload.zip_code),
        coordinates,
    };
    (!venue.is_empty()).then_some(venue)
}

/// Runs every rule; the draft is only assembled when all required parts
/// parsed.
fn check(payload: &EventPayload) -> (FieldErrors, Option<EventDraft>) {
    let mut errors = FieldErrors::new();

    let name = required_text(&mut errors, "name", payload.name.as_ref(), "Name is required");
    let description = required_text(
        &mut errors,
        "description",
        payload.description.as_ref(),
        "Description is required",
    );
    let location = required_text(
        &mut errors,
        "location",
        payload.location.as_ref(),
        "Location is required",
    );

    let start = required_timestamp(
        &mut errors,
        "startDateTime",
        payload.start_date_time.as_ref(),
        "Start date",
    );
    let end = required_timestamp(
        &mut errors,
        "endDateTime",
        payload.end_date_time.as_ref(),
        "End date",
    );
    if let (Some(start), Some(end)) = (start, end)
        && end <= start
    {
        errors.insert(
            "endDateTime".to_string(),
            "End date must be after start date".to_string(),
        );
    }

    let category = match non_blank(payload.category.as_ref()) {
        None => {
            errors.insert("category".to_string(), "Category is required".to_string());
            None
        }
        Some(text) => {
            let parsed = text.parse::<EventCategory>().ok();
            if parsed.is_none() {
                errors.insert(
                    "category".to_string(),
                    "Invalid category selected".to_string(),
                );
            }
            parsed
        }
    };

    let capacity = check_capacity(&mut errors, payload.capacity.as_ref());
    let ticket_price = check_ticket_price(&mut errors, payload.ticket_price.as_ref());
    let max_tickets_per_user = check_max_tickets(&mut errors, payload.max_tickets_per_user.as_ref());

    let registration_deadline = match non_blank(payload.registration_deadline.as_ref()) {
        None => None,
        Some(text) => match parse_timestamp(text) {
            None => {
                errors.insert(
                    "registrationDeadline".to_string(),
                    "Registration deadline is invalid".to_string(),
                );
                None
            }
            Some(deadline) => {
                if start.is_some_and(|start| deadline >= start) {
                    errors.insert(
                        "registrationDeadline".to_string(),
                        "Registration deadline must be before event start date".to_string(),
                    );
                }
                Some(deadline)
            }
        },
    };

    let image_url = non_blank(payload.image_url.as_ref()).map(str::to_string);
    if image_url.as_deref().is_some_and(|url| !is_valid_url(url)) {
        errors.insert("imageUrl".to_string(), "Must be a valid URL".to_string());
    }

    let venue = check_venue(&mut errors, payload.venue.as_ref());

    let (Some(name), Some(description), Some(location), Some(start), Some(end), Some(category), Some(capacity)) =
        (name, description, location, start, end, category, capacity)
    else {
        return (errors, None);
    };

    let draft = EventDraft {
        name,
        description,
        location,
        start_date_time: start,
        end_date_time: end,
        venue,
        category,
        capacity,
        ticket_price,
        tags: payload.tags.as_ref().map(TagsInput::to_tags).unwrap_or_default(),
        image_url,
        is_private: payload.is_private.unwrap_or(false),
        max_tickets_per_user,
        registration_deadline,
        cancellation_policy: non_blank(payload.cancellation_policy.as_ref()).map(str::to_string),
    };
    (errors, Some(draft))
}
