use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::db::{StoreError, StoreResult};
use crate::entities::projects;

pub use crate::entities::projects::Model as ProjectRow;

pub struct NewProject {
    pub title: String,
    pub description: String,
    pub tech_stack: String,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub featured: bool,
    pub sort_order: i32,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Default)]
pub struct ProjectChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tech_stack: Option<String>,
    pub github_url: Option<Option<String>>,
    pub live_url: Option<Option<String>>,
    pub featured: Option<bool>,
    pub sort_order: Option<i32>,
}

pub struct ProjectRepository {
    conn: DatabaseConnection,
}

impl ProjectRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Lists projects by `sort_order` ascending, newest first within a position.
    pub async fn list(&self, featured_only: bool) -> StoreResult<Vec<ProjectRow>> {
        let mut query = projects::Entity::find();

        if featured_only {
            query = query.filter(projects::Column::Featured.eq(true));
        }

        let rows = query
            .order_by_asc(projects::Column::SortOrder)
            .order_by_desc(projects::Column::CreatedAt)
            .order_by_desc(projects::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }

    pub async fn get(&self, id: i32) -> StoreResult<Option<ProjectRow>> {
        Ok(projects::Entity::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn create(&self, project: NewProject) -> StoreResult<ProjectRow> {
        let now = crate::db::timestamp_now();

        let model = projects::ActiveModel {
            title: Set(project.title),
            description: Set(project.description),
            tech_stack: Set(project.tech_stack),
            github_url: Set(project.github_url),
            live_url: Set(project.live_url),
            featured: Set(project.featured),
            sort_order: Set(project.sort_order),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;

        Ok(model)
    }

    pub async fn update(&self, id: i32, changes: ProjectChanges) -> StoreResult<ProjectRow> {
        let existing = projects::Entity::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or(StoreError::NotFound)?;

        let mut active: projects::ActiveModel = existing.into();

        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(tech_stack) = changes.tech_stack {
            active.tech_stack = Set(tech_stack);
        }
        if let Some(github_url) = changes.github_url {
            active.github_url = Set(github_url);
        }
        if let Some(live_url) = changes.live_url {
            active.live_url = Set(live_url);
        }
        if let Some(featured) = changes.featured {
            active.featured = Set(featured);
        }
        if let Some(sort_order) = changes.sort_order {
            active.sort_order = Set(sort_order);
        }
        active.updated_at = Set(crate::db::timestamp_now());

        Ok(active.update(&self.conn).await?)
    }

    pub async fn delete(&self, id: i32) -> StoreResult<()> {
        let result = projects::Entity::delete_by_id(id).exec(&self.conn).await?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    pub async fn count(&self) -> StoreResult<u64> {
        Ok(projects::Entity::find().count(&self.conn).await?)
    }
}
