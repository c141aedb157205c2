use axum::{
    Extension, Json,
    extract::{Request, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::validate_credentials;
use super::{AdminEnvelope, ApiError, ApiResponse, AppState};
use crate::services::{AdminView, LoginResult};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct SetupRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// The administrator resolved by [`auth_middleware`], available to gated handlers.
#[derive(Debug, Clone)]
pub struct CurrentAdmin(pub AdminView);

// ============================================================================
// Middleware
// ============================================================================

/// Requires `Authorization: Bearer <token>` naming an existing administrator.
///
/// Missing token is 401; a token that does not resolve is 403.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers()).ok_or_else(ApiError::token_required)?;

    let Some(admin) = state.auth.resolve(&token).await? else {
        return Err(ApiError::invalid_token());
    };

    tracing::Span::current().record("admin_id", admin.id);
    request.extensions_mut().insert(CurrentAdmin(admin));

    Ok(next.run(request).await)
}

/// Extracts the token from a `Bearer` authorization header. Empty tokens count as absent.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        return None;
    }

    Some(token.to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    let payload = credentials_body(payload)?;
    let (username, password) =
        validate_credentials(payload.username.as_deref(), payload.password.as_deref())?;

    let result = state.auth.login(username, password).await?;

    Ok(Json(ApiResponse::success(result)))
}

/// POST /api/auth/setup
pub async fn setup(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SetupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = credentials_body(payload)?;
    let (username, password) =
        validate_credentials(payload.username.as_deref(), payload.password.as_deref())?;
    let email = payload.email.as_deref().map(str::trim).filter(|e| !e.is_empty());

    let admin = state
        .auth
        .setup_administrator(username, password, email)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::success(AdminEnvelope { admin })
                .with_message("Admin created successfully"),
        ),
    ))
}

/// A missing, empty or unparsable body is reported like missing fields.
fn credentials_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| {
            tracing::debug!(error = %rejection, "Rejected credentials body");
            ApiError::validation("Username and password are required")
        })
}

/// GET /api/auth/me
pub async fn me(
    Extension(CurrentAdmin(admin)): Extension<CurrentAdmin>,
) -> Json<ApiResponse<AdminEnvelope>> {
    Json(ApiResponse::success(AdminEnvelope { admin }))
}
