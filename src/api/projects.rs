use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Deserializer};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, ProjectEnvelope, ProjectListResponse};
use crate::api::validation::validate_id;
use crate::services::{CreateProject, TechStack, UpdateProject};

#[derive(Deserialize)]
pub struct ProjectQuery {
    pub featured: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tech_stack: Option<TechStack>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub sort_order: i32,
}

/// Absent fields are left unchanged; `null` clears the optional URLs.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tech_stack: Option<TechStack>,
    #[serde(default, deserialize_with = "present")]
    pub github_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub live_url: Option<Option<String>>,
    pub featured: Option<bool>,
    pub sort_order: Option<i32>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A provided field must not be blank; an absent one stays absent.
fn non_blank(value: Option<String>, message: &str) -> Result<Option<String>, ApiError> {
    match value {
        Some(v) => required(Some(v))
            .map(Some)
            .ok_or_else(|| ApiError::validation(message)),
        None => Ok(None),
    }
}

impl CreateProjectRequest {
    fn into_input(self) -> Result<CreateProject, ApiError> {
        let (Some(title), Some(description), Some(tech_stack)) = (
            required(self.title),
            required(self.description),
            self.tech_stack.filter(|t| !t.is_empty()),
        ) else {
            return Err(ApiError::validation(
                "Title, description, and techStack are required",
            ));
        };

        Ok(CreateProject {
            title,
            description,
            tech_stack,
            github_url: self.github_url,
            live_url: self.live_url,
            featured: self.featured,
            sort_order: self.sort_order,
        })
    }
}

impl UpdateProjectRequest {
    fn into_input(self) -> Result<UpdateProject, ApiError> {
        let title = non_blank(self.title, "Title cannot be empty")?;
        let description = non_blank(self.description, "Description cannot be empty")?;
        if self.tech_stack.as_ref().is_some_and(TechStack::is_empty) {
            return Err(ApiError::validation("techStack cannot be empty"));
        }

        Ok(UpdateProject {
            title,
            description,
            tech_stack: self.tech_stack,
            github_url: self.github_url,
            live_url: self.live_url,
            featured: self.featured,
            sort_order: self.sort_order,
        })
    }
}

/// GET /api/projects
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProjectQuery>,
) -> Result<Json<ApiResponse<ProjectListResponse>>, ApiError> {
    let featured_only = query.featured.as_deref() == Some("true");
    let projects = state.projects.list(featured_only).await?;

    Ok(Json(ApiResponse::success(ProjectListResponse {
        results: projects.len(),
        projects,
    })))
}

/// GET /api/projects/{id}
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ProjectEnvelope>>, ApiError> {
    let id = validate_id(id, "project")?;

    let project = state
        .projects
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project"))?;

    Ok(Json(ApiResponse::success(ProjectEnvelope { project })))
}

/// GET /api/admin/projects
pub async fn admin_list_projects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<ProjectListResponse>>, ApiError> {
    let projects = state.projects.list(false).await?;

    Ok(Json(ApiResponse::success(ProjectListResponse {
        results: projects.len(),
        projects,
    })))
}

/// POST /api/admin/projects
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = payload.into_input()?;
    let project = state.projects.create(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(ProjectEnvelope { project }).with_message("Project created")),
    ))
}

/// PUT /api/admin/projects/{id}
pub async fn update_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProjectRequest>,
) -> Result<Json<ApiResponse<ProjectEnvelope>>, ApiError> {
    let id = validate_id(id, "project")?;
    let input = payload.into_input()?;

    let project = state
        .projects
        .update(id, input)
        .await
        .map_err(|e| ApiError::from_store(e, "Project"))?;

    Ok(Json(
        ApiResponse::success(ProjectEnvelope { project }).with_message("Project updated"),
    ))
}

/// DELETE /api/admin/projects/{id}
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = validate_id(id, "project")?;

    state
        .projects
        .delete(id)
        .await
        .map_err(|e| ApiError::from_store(e, "Project"))?;

    Ok(Json(ApiResponse::success(()).with_message("Project deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_requires_core_fields() {
        let req: CreateProjectRequest = serde_json::from_value(serde_json::json!({
            "title": "Folio",
            "description": "  ",
            "techStack": ["Rust"],
        }))
        .unwrap();
        assert!(matches!(req.into_input(), Err(ApiError::ValidationError(_))));

        let req: CreateProjectRequest = serde_json::from_value(serde_json::json!({
            "title": "Folio",
            "description": "Portfolio backend",
            "techStack": "",
        }))
        .unwrap();
        assert!(req.into_input().is_err());
    }

    #[test]
    fn test_create_defaults() {
        let req: CreateProjectRequest = serde_json::from_value(serde_json::json!({
            "title": " Folio ",
            "description": "Portfolio backend",
            "techStack": "Rust, Axum",
        }))
        .unwrap();

        let input = req.into_input().unwrap();
        assert_eq!(input.title, "Folio");
        assert!(!input.featured);
        assert_eq!(input.sort_order, 0);
        assert_eq!(input.tech_stack.to_stored(), "Rust, Axum");
    }

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let req: UpdateProjectRequest = serde_json::from_value(serde_json::json!({
            "githubUrl": null,
            "featured": true,
        }))
        .unwrap();

        assert_eq!(req.github_url, Some(None));
        assert_eq!(req.live_url, None);
        assert_eq!(req.featured, Some(true));
    }

    #[test]
    fn test_update_rejects_blank_title() {
        let req: UpdateProjectRequest =
            serde_json::from_value(serde_json::json!({ "title": "   " })).unwrap();
        assert!(req.into_input().is_err());
    }
}
