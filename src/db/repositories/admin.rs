use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};

use crate::db::StoreResult;
use crate::entities::admins;

/// Administrator row as the auth core sees it. Carries the password hash, so
/// it must never be serialized; `Debug` redacts the hash.
#[derive(Clone, PartialEq, Eq)]
pub struct Administrator {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub email: Option<String>,
    pub last_login: Option<String>,
    pub created_at: String,
}

impl std::fmt::Debug for Administrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Administrator")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("email", &self.email)
            .field("last_login", &self.last_login)
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl From<admins::Model> for Administrator {
    fn from(model: admins::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            password_hash: model.password_hash,
            email: model.email,
            last_login: model.last_login,
            created_at: model.created_at,
        }
    }
}

/// Insert payload; the password is already hashed.
#[derive(Clone)]
pub struct NewAdministrator {
    pub username: String,
    pub password_hash: String,
    pub email: Option<String>,
    pub created_at: String,
}

pub struct AdminRepository {
    conn: DatabaseConnection,
}

impl AdminRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_username(&self, username: &str) -> StoreResult<Option<Administrator>> {
        let admin = admins::Entity::find()
            .filter(admins::Column::Username.eq(username))
            .one(&self.conn)
            .await?;

        Ok(admin.map(Administrator::from))
    }

    pub async fn get_by_id(&self, id: i32) -> StoreResult<Option<Administrator>> {
        let admin = admins::Entity::find_by_id(id).one(&self.conn).await?;
        Ok(admin.map(Administrator::from))
    }

    pub async fn insert(&self, new: NewAdministrator) -> StoreResult<Administrator> {
        let model = admins::ActiveModel {
            username: Set(new.username),
            password_hash: Set(new.password_hash),
            email: Set(new.email),
            last_login: Set(None),
            created_at: Set(new.created_at),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;

        Ok(model.into())
    }

    pub async fn update_last_login(&self, id: i32, timestamp: &str) -> StoreResult<()> {
        let result = admins::Entity::update_many()
            .col_expr(
                admins::Column::LastLogin,
                sea_orm::sea_query::Expr::value(timestamp.to_string()),
            )
            .filter(admins::Column::Id.eq(id))
            .exec(&self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(crate::db::StoreError::NotFound);
        }

        Ok(())
    }

    pub async fn count(&self) -> StoreResult<u64> {
        Ok(admins::Entity::find().count(&self.conn).await?)
    }

    pub async fn delete(&self, id: i32) -> StoreResult<bool> {
        let result = admins::Entity::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}
