use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, ContactEnvelope, MessageEnvelope, MessagesEnvelope};
use crate::api::validation::{validate_contact, validate_id};
use crate::services::MessageStats;

#[derive(Deserialize)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

#[derive(Deserialize)]
pub struct MessageQuery {
    pub unread: Option<String>,
}

/// POST /api/contact
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ContactRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let contact = validate_contact(
        payload.name.as_deref(),
        payload.email.as_deref(),
        payload.message.as_deref(),
    )?;

    let contact = state
        .contacts
        .submit(contact.name, contact.email, contact.message)
        .await?;

    metrics::counter!("contact_messages_received_total").increment(1);

    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::success(ContactEnvelope { contact })
                .with_message("Thank you for your message! I'll get back to you soon."),
        ),
    ))
}

/// GET /api/admin/messages
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MessageQuery>,
) -> Result<Json<ApiResponse<MessagesEnvelope>>, ApiError> {
    let unread_only = query.unread.as_deref() == Some("true");
    let messages = state.contacts.list(unread_only).await?;

    Ok(Json(ApiResponse::success(MessagesEnvelope { messages })))
}

/// GET /api/admin/messages/stats
pub async fn message_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<MessageStats>>, ApiError> {
    let stats = state.contacts.stats().await?;
    Ok(Json(ApiResponse::success(stats)))
}

/// PUT /api/admin/messages/{id}/read
pub async fn mark_message_read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageEnvelope>>, ApiError> {
    let id = validate_id(id, "message")?;

    let message = state
        .contacts
        .mark_read(id)
        .await
        .map_err(|e| ApiError::from_store(e, "Message"))?;

    Ok(Json(
        ApiResponse::success(MessageEnvelope { message }).with_message("Message marked as read"),
    ))
}

/// DELETE /api/admin/messages/{id}
pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = validate_id(id, "message")?;

    state
        .contacts
        .delete(id)
        .await
        .map_err(|e| ApiError::from_store(e, "Message"))?;

    Ok(Json(ApiResponse::success(()).with_message("Message deleted")))
}
