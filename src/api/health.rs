use axum::{
    Json,
    extract::{OriginalUri, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, HealthResponse};
use crate::db::timestamp_now;

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: IndexEndpoints,
}

#[derive(Debug, Serialize)]
pub struct IndexEndpoints {
    pub health: &'static str,
    pub projects: &'static str,
    pub contact: &'static str,
    pub auth: &'static str,
    pub admin: &'static str,
}

/// `GET /`
pub async fn index() -> impl IntoResponse {
    Json(ApiResponse::success(IndexResponse {
        message: "Folio portfolio API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: IndexEndpoints {
            health: "/api/health",
            projects: "/api/projects",
            contact: "/api/contact",
            auth: "/api/auth",
            admin: "/api/admin",
        },
    }))
}

/// `GET /api/health`
///
/// Responds 503 with `database: "disconnected"` when the pool cannot answer a ping.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    let db_ready = state.store.ping().await.is_ok();

    let (status, label) = if db_ready {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(ApiResponse::success(HealthResponse {
            status: label,
            timestamp: timestamp_now(),
            uptime: state.start_time.elapsed().as_secs_f64(),
            database: if db_ready { "connected" } else { "disconnected" },
            environment: state.config.general.environment.clone(),
        })),
    )
        .into_response()
}

/// Fallback for unmatched routes. Reports the full path, including any nest prefix.
pub async fn not_found(method: Method, OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::NotFound(format!("Cannot {method} {}", uri.path()))
}
