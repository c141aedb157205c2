use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::db::{StoreError, StoreResult};
use crate::entities::contact_messages;

pub use crate::entities::contact_messages::Model as ContactMessageRow;

pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

pub struct ContactRepository {
    conn: DatabaseConnection,
}

impl ContactRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, message: NewContactMessage) -> StoreResult<ContactMessageRow> {
        let model = contact_messages::ActiveModel {
            name: Set(message.name),
            email: Set(message.email),
            message: Set(message.message),
            is_read: Set(false),
            created_at: Set(crate::db::timestamp_now()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;

        Ok(model)
    }

    /// Newest first.
    pub async fn list(&self, unread_only: bool) -> StoreResult<Vec<ContactMessageRow>> {
        let mut query = contact_messages::Entity::find();

        if unread_only {
            query = query.filter(contact_messages::Column::IsRead.eq(false));
        }

        let rows = query
            .order_by_desc(contact_messages::Column::CreatedAt)
            .order_by_desc(contact_messages::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }

    pub async fn mark_read(&self, id: i32) -> StoreResult<ContactMessageRow> {
        let existing = contact_messages::Entity::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or(StoreError::NotFound)?;

        let mut active: contact_messages::ActiveModel = existing.into();
        active.is_read = Set(true);

        Ok(active.update(&self.conn).await?)
    }

    pub async fn delete(&self, id: i32) -> StoreResult<()> {
        let result = contact_messages::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    pub async fn count(&self) -> StoreResult<u64> {
        Ok(contact_messages::Entity::find().count(&self.conn).await?)
    }

    pub async fn count_unread(&self) -> StoreResult<u64> {
        let count = contact_messages::Entity::find()
            .filter(contact_messages::Column::IsRead.eq(false))
            .count(&self.conn)
            .await?;

        Ok(count)
    }
}
