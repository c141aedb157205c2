use anyhow::Result;
use chrono::SecondsFormat;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

mod error;
pub mod migrator;
pub mod repositories;

pub use error::{StoreError, StoreResult};
pub use repositories::admin::{Administrator, NewAdministrator};
pub use repositories::contact::{ContactMessageRow, NewContactMessage};
pub use repositories::project::{NewProject, ProjectChanges, ProjectRow};

use crate::services::auth_service::CredentialStore;

/// Timestamps are stored as fixed-width RFC 3339 UTC strings so they sort lexically.
#[must_use]
pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    pub async fn close(self) -> Result<()> {
        self.conn.close().await?;
        Ok(())
    }

    fn admin_repo(&self) -> repositories::admin::AdminRepository {
        repositories::admin::AdminRepository::new(self.conn.clone())
    }

    fn project_repo(&self) -> repositories::project::ProjectRepository {
        repositories::project::ProjectRepository::new(self.conn.clone())
    }

    fn contact_repo(&self) -> repositories::contact::ContactRepository {
        repositories::contact::ContactRepository::new(self.conn.clone())
    }

    // Administrators

    pub async fn get_admin_by_username(&self, username: &str) -> StoreResult<Option<Administrator>> {
        self.admin_repo().get_by_username(username).await
    }

    pub async fn get_admin_by_id(&self, id: i32) -> StoreResult<Option<Administrator>> {
        self.admin_repo().get_by_id(id).await
    }

    pub async fn insert_admin(&self, admin: NewAdministrator) -> StoreResult<Administrator> {
        self.admin_repo().insert(admin).await
    }

    pub async fn update_admin_last_login(&self, id: i32, timestamp: &str) -> StoreResult<()> {
        self.admin_repo().update_last_login(id, timestamp).await
    }

    pub async fn count_admins(&self) -> StoreResult<u64> {
        self.admin_repo().count().await
    }

    pub async fn delete_admin(&self, id: i32) -> StoreResult<bool> {
        self.admin_repo().delete(id).await
    }

    // Projects

    pub async fn list_projects(&self, featured_only: bool) -> StoreResult<Vec<ProjectRow>> {
        self.project_repo().list(featured_only).await
    }

    pub async fn get_project(&self, id: i32) -> StoreResult<Option<ProjectRow>> {
        self.project_repo().get(id).await
    }

    pub async fn create_project(&self, project: NewProject) -> StoreResult<ProjectRow> {
        self.project_repo().create(project).await
    }

    pub async fn update_project(&self, id: i32, changes: ProjectChanges) -> StoreResult<ProjectRow> {
        self.project_repo().update(id, changes).await
    }

    pub async fn delete_project(&self, id: i32) -> StoreResult<()> {
        self.project_repo().delete(id).await
    }

    pub async fn count_projects(&self) -> StoreResult<u64> {
        self.project_repo().count().await
    }

    // Contact messages

    pub async fn create_contact_message(
        &self,
        message: NewContactMessage,
    ) -> StoreResult<ContactMessageRow> {
        self.contact_repo().create(message).await
    }

    pub async fn list_contact_messages(
        &self,
        unread_only: bool,
    ) -> StoreResult<Vec<ContactMessageRow>> {
        self.contact_repo().list(unread_only).await
    }

    pub async fn mark_contact_message_read(&self, id: i32) -> StoreResult<ContactMessageRow> {
        self.contact_repo().mark_read(id).await
    }

    pub async fn delete_contact_message(&self, id: i32) -> StoreResult<()> {
        self.contact_repo().delete(id).await
    }

    pub async fn count_contact_messages(&self) -> StoreResult<u64> {
        self.contact_repo().count().await
    }

    pub async fn count_unread_contact_messages(&self) -> StoreResult<u64> {
        self.contact_repo().count_unread().await
    }
}

#[async_trait::async_trait]
impl CredentialStore for Store {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Administrator>> {
        self.get_admin_by_username(username).await
    }

    async fn find_by_id(&self, id: i32) -> StoreResult<Option<Administrator>> {
        self.get_admin_by_id(id).await
    }

    async fn insert(&self, admin: NewAdministrator) -> StoreResult<Administrator> {
        self.insert_admin(admin).await
    }

    async fn update_last_login(&self, id: i32, timestamp: &str) -> StoreResult<()> {
        self.update_admin_last_login(id, timestamp).await
    }

    async fn any_exists(&self) -> StoreResult<bool> {
        Ok(self.count_admins().await? > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_store() -> Store {
        let path = std::env::temp_dir().join(format!("folio-db-test-{}.db", uuid::Uuid::new_v4()));
        Store::with_pool_options(&format!("sqlite:{}", path.display()), 1, 1)
            .await
            .expect("failed to open store")
    }

    fn new_admin(username: &str) -> NewAdministrator {
        NewAdministrator {
            username: username.to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
            email: None,
            created_at: timestamp_now(),
        }
    }

    #[tokio::test]
    async fn test_admin_roundtrip_and_unique_username() {
        let store = temp_store().await;
        assert!(!store.any_exists().await.unwrap());

        let admin = store.insert_admin(new_admin("admin")).await.unwrap();
        assert!(admin.last_login.is_none());
        assert!(store.any_exists().await.unwrap());

        let dup = store.insert_admin(new_admin("admin")).await;
        assert!(matches!(dup, Err(StoreError::UniqueViolation)));

        store
            .update_admin_last_login(admin.id, "2026-10-16T00:00:00.000Z")
            .await
            .unwrap();
        let reloaded = store.get_admin_by_id(admin.id).await.unwrap().unwrap();
        assert_eq!(reloaded.last_login.as_deref(), Some("2026-10-16T00:00:00.000Z"));
        assert_eq!(reloaded.created_at, admin.created_at);

        assert!(store.delete_admin(admin.id).await.unwrap());
        assert!(store.get_admin_by_username("admin").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_project_ordering_and_featured_filter() {
        let store = temp_store().await;

        for (title, featured, sort_order) in [("b", false, 2), ("a", true, 1), ("c", true, 1)] {
            store
                .create_project(NewProject {
                    title: title.to_string(),
                    description: "desc".to_string(),
                    tech_stack: "Rust".to_string(),
                    github_url: None,
                    live_url: None,
                    featured,
                    sort_order,
                })
                .await
                .unwrap();
        }

        let all = store.list_projects(false).await.unwrap();
        let titles: Vec<_> = all.iter().map(|p| p.title.as_str()).collect();
        // Same sort_order: newest first.
        assert_eq!(titles, vec!["c", "a", "b"]);

        let featured = store.list_projects(true).await.unwrap();
        assert_eq!(featured.len(), 2);
        assert!(featured.iter().all(|p| p.featured));
    }

    #[tokio::test]
    async fn test_missing_rows_report_not_found() {
        let store = temp_store().await;

        assert!(matches!(store.delete_project(99).await, Err(StoreError::NotFound)));
        assert!(matches!(
            store.update_project(99, ProjectChanges::default()).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.mark_contact_message_read(99).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.delete_contact_message(99).await,
            Err(StoreError::NotFound)
        ));
    }
}
