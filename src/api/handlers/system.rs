//! System endpoints: health check and the category catalog.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::domain::{EventCategory, UNCATEGORIZED};

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Catalog entry for one category.
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryInfo {
    category: &'static str,
    description: &'static str,
    selectable: bool,
}

/// `GET /config/categories` — The category catalog.
#[utoipa::path(
    get,
    path = "/config/categories",
    tag = "System",
    summary = "List event categories",
    description = "Returns every category an event form accepts, plus the display fallback used for events without one.",
    responses(
        (status = 200, description = "Category catalog", body = Vec<CategoryInfo>),
    )
)]
pub async fn categories_handler() -> impl IntoResponse {
    let mut catalog: Vec<CategoryInfo> = EventCategory::ALL
        .iter()
        .map(|category| CategoryInfo {
            category: category.as_str(),
            description: describe(*category),
            selectable: true,
        })
        .collect();
    catalog.push(CategoryInfo {
        category: UNCATEGORIZED,
        description: "Shown for events stored without a category",
        selectable: false,
    });
    (StatusCode::OK, Json(catalog))
}

const fn describe(category: EventCategory) -> &'static str {
    match category {
        EventCategory::Conference => "Multi-session conferences and summits",
        EventCategory::Workshop => "Hands-on sessions with limited seats",
        EventCategory::Seminar => "Talks and lectures",
        EventCategory::Networking => "Meetups for making connections",
        EventCategory::Social => "Parties and informal gatherings",
        EventCategory::Other => "Anything else",
    }
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/categories", get(categories_handler))
}
