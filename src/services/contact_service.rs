//! Contact-form messages.

use serde::Serialize;
use std::sync::Arc;

use crate::clients::email::{ContactNotification, ContactNotifier};
use crate::db::repositories::contact::{ContactMessageRow, NewContactMessage};
use crate::db::{Store, StoreResult};

/// What the submitter gets back; the message body is not echoed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedContactDto {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessageDto {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: String,
}

impl From<ContactMessageRow> for ContactMessageDto {
    fn from(row: ContactMessageRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            message: row.message,
            is_read: row.is_read,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MessageStats {
    pub total: u64,
    pub unread: u64,
    pub read: u64,
}

#[derive(Clone)]
pub struct ContactService {
    store: Store,
    notifier: Option<Arc<dyn ContactNotifier>>,
}

impl ContactService {
    #[must_use]
    pub fn new(store: Store, notifier: Option<Arc<dyn ContactNotifier>>) -> Self {
        Self { store, notifier }
    }

    /// Stores the message and fires the owner notification in the background.
    /// Notification failures are logged and never reach the submitter.
    pub async fn submit(
        &self,
        name: String,
        email: String,
        message: String,
    ) -> StoreResult<SubmittedContactDto> {
        let row = self
            .store
            .create_contact_message(NewContactMessage {
                name: name.clone(),
                email: email.clone(),
                message: message.clone(),
            })
            .await?;

        tracing::info!(message_id = row.id, "Contact message received");

        if let Some(notifier) = self.notifier.clone() {
            let contact = ContactNotification {
                name,
                email,
                message,
            };
            let message_id = row.id;
            tokio::spawn(async move {
                match notifier.notify(&contact).await {
                    Ok(()) => tracing::info!(message_id, "Contact notification sent"),
                    Err(e) => {
                        tracing::warn!(message_id, "Failed to send contact notification: {e}");
                    }
                }
            });
        } else {
            tracing::debug!("Email not configured, skipping contact notification");
        }

        Ok(SubmittedContactDto {
            id: row.id,
            name: row.name,
            email: row.email,
            created_at: row.created_at,
        })
    }

    pub async fn list(&self, unread_only: bool) -> StoreResult<Vec<ContactMessageDto>> {
        let rows = self.store.list_contact_messages(unread_only).await?;
        Ok(rows.into_iter().map(ContactMessageDto::from).collect())
    }

    pub async fn mark_read(&self, id: i32) -> StoreResult<ContactMessageDto> {
        Ok(self.store.mark_contact_message_read(id).await?.into())
    }

    pub async fn delete(&self, id: i32) -> StoreResult<()> {
        self.store.delete_contact_message(id).await
    }

    pub async fn stats(&self) -> StoreResult<MessageStats> {
        let (total, unread) = tokio::try_join!(
            self.store.count_contact_messages(),
            self.store.count_unread_contact_messages()
        )?;

        Ok(MessageStats {
            total,
            unread,
            read: total.saturating_sub(unread),
        })
    }
}
