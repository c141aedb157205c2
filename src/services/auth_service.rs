//! Domain service for administrator authentication.
//!
//! Handles credential checks, session token issuance and token resolution.
//! The credential store is reached only through [`CredentialStore`], which the
//! service receives at construction.

use serde::Serialize;
use thiserror::Error;

use crate::db::StoreError;
use crate::db::repositories::admin::{Administrator, NewAdministrator};

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username and wrong password share this variant and message.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Admin already exists. Setup not allowed.")]
    SetupClosed,

    #[error("Username is already taken")]
    UsernameTaken,

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Redacted administrator view. The only administrator shape that leaves the
/// auth core; it has no password hash field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminView {
    pub id: i32,
    pub username: String,
    pub email: Option<String>,
}

impl From<&Administrator> for AdminView {
    fn from(admin: &Administrator) -> Self {
        Self {
            id: admin.id,
            username: admin.username.clone(),
            email: admin.email.clone(),
        }
    }
}

impl From<Administrator> for AdminView {
    fn from(admin: Administrator) -> Self {
        Self {
            id: admin.id,
            username: admin.username,
            email: admin.email,
        }
    }
}

/// Successful login: a bearer token plus the redacted administrator.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub admin: AdminView,
}

/// Storage operations the auth core depends on.
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<Administrator>, StoreError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Administrator>, StoreError>;

    async fn insert(&self, admin: NewAdministrator) -> Result<Administrator, StoreError>;

    async fn update_last_login(&self, id: i32, timestamp: &str) -> Result<(), StoreError>;

    async fn any_exists(&self) -> Result<bool, StoreError>;
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and issues a session token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown username and
    /// for a wrong password alike.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Resolves a bearer token to the administrator it names.
    ///
    /// `Ok(None)` covers every rejected token and tokens whose administrator
    /// has since been deleted.
    async fn resolve(&self, token: &str) -> Result<Option<AdminView>, AuthError>;

    /// Hashes the password and inserts a new administrator. Does not check
    /// whether other administrators exist.
    async fn create_administrator(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> Result<AdminView, AuthError>;

    /// First-run setup: creates the administrator only while none exists.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SetupClosed`] once any administrator exists.
    async fn setup_administrator(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> Result<AdminView, AuthError>;
}
