use serde::Serialize;

use crate::services::{AdminView, ContactMessageDto, ProjectDto, SubmittedContactDto};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
            errors: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(message.into()),
            errors: None,
        }
    }

    pub fn field_errors(message: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self {
            errors: Some(errors),
            ..Self::error(message)
        }
    }
}

/// One failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdminEnvelope {
    pub admin: AdminView,
}

#[derive(Debug, Serialize)]
pub struct ProjectListResponse {
    pub results: usize,
    pub projects: Vec<ProjectDto>,
}

#[derive(Debug, Serialize)]
pub struct ProjectEnvelope {
    pub project: ProjectDto,
}

#[derive(Debug, Serialize)]
pub struct ContactEnvelope {
    pub contact: SubmittedContactDto,
}

#[derive(Debug, Serialize)]
pub struct MessagesEnvelope {
    pub messages: Vec<ContactMessageDto>,
}

#[derive(Debug, Serialize)]
pub struct MessageEnvelope {
    pub message: ContactMessageDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub projects: u64,
    pub messages: u64,
    pub unread_messages: u64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub uptime: f64,
    pub database: &'static str,
    pub environment: String,
}
