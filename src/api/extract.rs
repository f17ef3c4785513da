//! Request extractors: the acting user and JSON bodies.
//!
//! Authentication happens upstream; the authenticated account ID arrives in
//! the [`USER_ID_HEADER`] header. Every rejection is a [`HubError`], so
//! malformed requests get the same error body as any other failure.

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::domain::UserId;
use crate::error::HubError;

/// Header carrying the authenticated user's ID.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated user making the request.
///
/// Rejects with [`HubError::Unauthenticated`] when the header is missing
/// and [`HubError::InvalidRequest`] when it is not a UUID.
#[derive(Debug, Clone, Copy)]
pub struct ActingUser(pub UserId);

/// The acting user when one is present.
///
/// A malformed header is still rejected.
#[derive(Debug, Clone, Copy)]
pub struct OptionalActingUser(pub Option<UserId>);

fn user_from_parts(parts: &Parts) -> Result<Option<UserId>, HubError> {
    let Some(value) = parts.headers.get(USER_ID_HEADER) else {
        return Ok(None);
    };
    let text = value
        .to_str()
        .map_err(|_| HubError::InvalidRequest(format!("invalid {USER_ID_HEADER} header")))?;
    text.parse::<UserId>()
        .map(Some)
        .map_err(|_| HubError::InvalidRequest(format!("{USER_ID_HEADER} must be a UUID")))
}

impl<S: Send + Sync> FromRequestParts<S> for ActingUser {
    type Rejection = HubError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_from_parts(parts)?
            .map(Self)
            .ok_or(HubError::Unauthenticated)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for OptionalActingUser {
    type Rejection = HubError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_from_parts(parts).map(Self)
    }
}

/// A JSON request body.
///
/// Rejects with [`HubError::InvalidRequest`] when the body is not JSON or
/// does not have the expected shape.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = HubError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(|rejection| HubError::InvalidRequest(rejection.body_text()))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;

    use super::*;
    use crate::domain::validation::EventPayload;

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = axum::http::Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(USER_ID_HEADER, value);
        }
        let Ok(request) = builder.body(()) else {
            panic!("request builds");
        };
        request.into_parts().0
    }

    #[tokio::test]
    async fn missing_header_is_unauthenticated() {
        let result = ActingUser::from_request_parts(&mut parts(None), &()).await;
        assert!(matches!(result, Err(HubError::Unauthenticated)));

        let Ok(OptionalActingUser(None)) =
            OptionalActingUser::from_request_parts(&mut parts(None), &()).await
        else {
            panic!("optional extractor accepts a missing header");
        };
    }

    #[tokio::test]
    async fn malformed_header_is_rejected() {
        let result = ActingUser::from_request_parts(&mut parts(Some("nope")), &()).await;
        assert!(matches!(result, Err(HubError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn uuid_header_is_accepted() {
        let id = UserId::new();
        let header = id.to_string();
        let Ok(ActingUser(found)) =
            ActingUser::from_request_parts(&mut parts(Some(&header)), &()).await
        else {
            panic!("expected a user");
        };
        assert_eq!(found, id);
    }

    fn json_request(body: &str) -> Request {
        let Ok(request) = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
        else {
            panic!("request builds");
        };
        request
    }

    #[tokio::test]
    async fn mistyped_body_is_an_invalid_request() {
        for body in [r#"{"isPrivate":"yes"}"#, r#"{"venue":5}"#, r#"{"tags":3}"#, "{"] {
            let result = JsonBody::<EventPayload>::from_request(json_request(body), &()).await;
            assert!(
                matches!(result, Err(HubError::InvalidRequest(_))),
                "{body} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn well_formed_body_is_decoded() {
        let Ok(JsonBody(payload)) =
            JsonBody::<EventPayload>::from_request(json_request(r#"{"name":"Meetup"}"#), &())
                .await
        else {
            panic!("expected a payload");
        };
        assert_eq!(payload.name.as_deref(), Some("Meetup"));
    }
}
