//! Default implementation of the `AuthService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::SecondsFormat;
use tokio::sync::Mutex;

use crate::db::StoreError;
use crate::db::repositories::admin::NewAdministrator;
use crate::services::auth_service::{
    AdminView, AuthError, AuthService, CredentialStore, LoginResult,
};
use crate::services::clock::Clock;
use crate::services::password::PasswordService;
use crate::services::token::TokenCodec;

pub struct DefaultAuthService {
    store: Arc<dyn CredentialStore>,
    passwords: PasswordService,
    tokens: TokenCodec,
    clock: Arc<dyn Clock>,
    /// Verified against when the username is unknown, so both failure paths cost one hash.
    dummy_hash: String,
    setup_lock: Mutex<()>,
}

impl DefaultAuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        passwords: PasswordService,
        tokens: TokenCodec,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        let dummy_hash = passwords.hash("folio-dummy-password")?;

        Ok(Self {
            store,
            passwords,
            tokens,
            clock,
            dummy_hash,
            setup_lock: Mutex::new(()),
        })
    }
}

#[async_trait]
impl AuthService for DefaultAuthService {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        let admin = self.store.find_by_username(username).await?;

        let Some(admin) = admin else {
            let _ = self
                .passwords
                .verify_blocking(password, &self.dummy_hash)
                .await;
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .passwords
            .verify_blocking(password, &admin.password_hash)
            .await
        {
            return Err(AuthError::InvalidCredentials);
        }

        let now = self.clock.now();
        let timestamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
        if let Err(e) = self.store.update_last_login(admin.id, &timestamp).await {
            tracing::warn!(admin_id = admin.id, "Failed to record last login: {e}");
        }

        let token = self
            .tokens
            .issue_at(admin.id, &admin.username, now.timestamp())?;

        tracing::info!(admin_id = admin.id, "Admin logged in");

        Ok(LoginResult {
            token,
            admin: AdminView::from(admin),
        })
    }

    async fn resolve(&self, token: &str) -> Result<Option<AdminView>, AuthError> {
        let Some(identity) = self.tokens.verify_at(token, self.clock.now().timestamp()) else {
            return Ok(None);
        };

        let admin = self.store.find_by_id(identity.id).await?;
        Ok(admin.map(AdminView::from))
    }

    async fn create_administrator(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> Result<AdminView, AuthError> {
        let password_hash = self.passwords.hash_blocking(password).await?;

        let admin = self
            .store
            .insert(NewAdministrator {
                username: username.to_string(),
                password_hash,
                email: email.map(String::from),
                created_at: self
                    .clock
                    .now()
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
            })
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation => AuthError::UsernameTaken,
                other => AuthError::Storage(other),
            })?;

        tracing::info!(admin_id = admin.id, "Administrator created");

        Ok(AdminView::from(admin))
    }

    async fn setup_administrator(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> Result<AdminView, AuthError> {
        // Serializes concurrent setup requests within this process.
        let _guard = self.setup_lock.lock().await;

        if self.store.any_exists().await? {
            return Err(AuthError::SetupClosed);
        }

        self.create_administrator(username, password, email).await
    }
}
