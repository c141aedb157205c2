use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, DashboardStats};

/// GET /api/admin/dashboard/stats
pub async fn dashboard_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<DashboardStats>>, ApiError> {
    let store = &state.store;

    let (projects, messages, unread_messages) = tokio::try_join!(
        store.count_projects(),
        store.count_contact_messages(),
        store.count_unread_contact_messages(),
    )?;

    Ok(Json(ApiResponse::success(DashboardStats {
        projects,
        messages,
        unread_messages,
    })))
}
