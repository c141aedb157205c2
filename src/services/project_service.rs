//! Portfolio projects: public listing and admin management.

use serde::{Deserialize, Serialize};

use crate::db::repositories::project::{NewProject, ProjectChanges, ProjectRow};
use crate::db::{Store, StoreResult};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDto {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub tech_stack: Vec<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub featured: bool,
    pub sort_order: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ProjectRow> for ProjectDto {
    fn from(row: ProjectRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            tech_stack: split_tech_stack(&row.tech_stack),
            github_url: row.github_url,
            live_url: row.live_url,
            featured: row.featured,
            sort_order: row.sort_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Tech stack as sent by clients: a list or a comma-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TechStack {
    List(Vec<String>),
    Csv(String),
}

impl TechStack {
    /// Normalized storage form: trimmed entries joined with ", ".
    #[must_use]
    pub fn to_stored(&self) -> String {
        match self {
            Self::List(items) => join_tech_stack(items),
            Self::Csv(s) => join_tech_stack(&split_tech_stack(s)),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::List(items) => items.iter().all(|i| i.trim().is_empty()),
            Self::Csv(s) => s.trim().is_empty(),
        }
    }
}

#[must_use]
pub fn split_tech_stack(stored: &str) -> Vec<String> {
    stored
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn join_tech_stack(items: &[String]) -> String {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

pub struct CreateProject {
    pub title: String,
    pub description: String,
    pub tech_stack: TechStack,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub featured: bool,
    pub sort_order: i32,
}

#[derive(Default)]
pub struct UpdateProject {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tech_stack: Option<TechStack>,
    pub github_url: Option<Option<String>>,
    pub live_url: Option<Option<String>>,
    pub featured: Option<bool>,
    pub sort_order: Option<i32>,
}

#[derive(Clone)]
pub struct ProjectService {
    store: Store,
}

impl ProjectService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn list(&self, featured_only: bool) -> StoreResult<Vec<ProjectDto>> {
        let rows = self.store.list_projects(featured_only).await?;
        Ok(rows.into_iter().map(ProjectDto::from).collect())
    }

    pub async fn get(&self, id: i32) -> StoreResult<Option<ProjectDto>> {
        Ok(self.store.get_project(id).await?.map(ProjectDto::from))
    }

    pub async fn create(&self, input: CreateProject) -> StoreResult<ProjectDto> {
        let row = self
            .store
            .create_project(NewProject {
                title: input.title,
                description: input.description,
                tech_stack: input.tech_stack.to_stored(),
                github_url: non_empty(input.github_url),
                live_url: non_empty(input.live_url),
                featured: input.featured,
                sort_order: input.sort_order,
            })
            .await?;

        tracing::info!(project_id = row.id, "Project created");
        Ok(row.into())
    }

    pub async fn update(&self, id: i32, input: UpdateProject) -> StoreResult<ProjectDto> {
        let changes = ProjectChanges {
            title: input.title,
            description: input.description,
            tech_stack: input.tech_stack.map(|t| t.to_stored()),
            github_url: input.github_url.map(non_empty),
            live_url: input.live_url.map(non_empty),
            featured: input.featured,
            sort_order: input.sort_order,
        };

        let row = self.store.update_project(id, changes).await?;
        tracing::info!(project_id = id, "Project updated");
        Ok(row.into())
    }

    pub async fn delete(&self, id: i32) -> StoreResult<()> {
        self.store.delete_project(id).await?;
        tracing::info!(project_id = id, "Project deleted");
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_tech_stack() {
        assert_eq!(
            split_tech_stack("Rust, Axum ,SQLite"),
            vec!["Rust", "Axum", "SQLite"]
        );
        assert!(split_tech_stack("").is_empty());
        assert_eq!(split_tech_stack("Rust,,  ,Tokio"), vec!["Rust", "Tokio"]);
    }

    #[test]
    fn test_tech_stack_from_list_or_string() {
        let list: TechStack = serde_json::from_value(serde_json::json!([" Rust", "Axum "])).unwrap();
        assert_eq!(list.to_stored(), "Rust, Axum");

        let csv: TechStack = serde_json::from_value(serde_json::json!("Rust,Axum")).unwrap();
        assert_eq!(csv.to_stored(), "Rust, Axum");
    }

    #[test]
    fn test_tech_stack_empty() {
        assert!(TechStack::Csv("  ".to_string()).is_empty());
        assert!(TechStack::List(vec![" ".to_string()]).is_empty());
        assert!(TechStack::List(vec![]).is_empty());
        assert!(!TechStack::Csv("Rust".to_string()).is_empty());
    }

    #[test]
    fn test_dto_exposes_list_in_camel_case() {
        let dto = ProjectDto::from(ProjectRow {
            id: 1,
            title: "Folio".to_string(),
            description: "Portfolio API".to_string(),
            tech_stack: "Rust, Axum".to_string(),
            github_url: Some("https://github.com/example/folio".to_string()),
            live_url: None,
            featured: true,
            sort_order: 0,
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
            updated_at: "2026-01-01T00:00:00.000Z".to_string(),
        });

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["techStack"], serde_json::json!(["Rust", "Axum"]));
        assert_eq!(json["githubUrl"], "https://github.com/example/folio");
        assert!(json["liveUrl"].is_null());
        assert_eq!(json["sortOrder"], 0);
    }
}
