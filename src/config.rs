use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Minimum length of the token signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub auth: AuthConfig,

    pub security: SecurityConfig,

    pub email: EmailConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// "development" or "production"
    pub environment: String,

    pub database_url: String,

    pub log_level: String,

    /// Emit logs as JSON lines instead of the human-readable format
    pub json_logs: bool,

    /// Number of tokio worker threads (0 = number of CPU cores)
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            database_url: "sqlite:data/folio.db".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Maximum accepted request body, in KiB
    pub body_limit_kb: usize,

    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            cors_allowed_origins: vec!["http://localhost:5173".to_string()],
            body_limit_kb: 10,
            shutdown_timeout_seconds: 10,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret used to sign session tokens. Never has a usable default.
    #[serde(skip_serializing)]
    pub jwt_secret: String,

    /// Session token lifetime in seconds (default: 7 days)
    pub token_ttl_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_seconds: 7 * 24 * 60 * 60,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"********")
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 19456 = 19MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism
    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 19456,
            argon2_time_cost: 2,
            argon2_parallelism: 1,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub enabled: bool,

    /// Transactional email endpoint accepting `{from, to, subject, html, text}`
    pub api_url: String,

    #[serde(skip_serializing)]
    pub api_key: String,

    pub from_address: String,

    /// Where contact notifications are delivered
    pub notification_address: String,

    pub request_timeout_seconds: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: "https://api.resend.com/emails".to_string(),
            api_key: String::new(),
            from_address: "Portfolio Contact <contact@example.com>".to_string(),
            notification_address: String::new(),
            request_timeout_seconds: 15,
        }
    }
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("enabled", &self.enabled)
            .field("api_url", &self.api_url)
            .field("api_key", &"********")
            .field("from_address", &self.from_address)
            .field("notification_address", &self.notification_address)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .finish()
    }
}

impl EmailConfig {
    /// Email is only sent when enabled and both the key and recipient are set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.enabled && !self.api_key.is_empty() && !self.notification_address.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Config {
    /// Loads `.env`, the first config file found, then applies environment overrides.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::load_file()?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Overrides file values with environment variables looked up through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup("FOLIO_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(ttl) = lookup("FOLIO_TOKEN_TTL_SECONDS") {
            self.auth.token_ttl_seconds = ttl
                .parse()
                .context("FOLIO_TOKEN_TTL_SECONDS must be a number of seconds")?;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.general.database_url = url;
        }
        if let Some(env) = lookup("FOLIO_ENV") {
            self.general.environment = env;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port.parse().context("PORT must be a valid port number")?;
        }
        if let Some(origins) = lookup("CORS_ORIGIN") {
            self.server.cors_allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(key) = lookup("FOLIO_EMAIL_API_KEY") {
            self.email.api_key = key;
        }
        Ok(())
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("folio").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".folio").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            Self::default().save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            anyhow::bail!("auth.jwt_secret (or FOLIO_JWT_SECRET) must be set");
        }

        if self.auth.jwt_secret.len() < MIN_SECRET_LEN {
            anyhow::bail!("auth.jwt_secret must be at least {MIN_SECRET_LEN} bytes");
        }

        if self.auth.token_ttl_seconds == 0 {
            anyhow::bail!("auth.token_ttl_seconds must be > 0");
        }

        if self.general.database_url.is_empty() {
            anyhow::bail!("general.database_url cannot be empty");
        }

        if self.email.enabled && self.email.api_url.is_empty() {
            anyhow::bail!("email.api_url cannot be empty when email is enabled");
        }

        Ok(())
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        self.general.environment == "development"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn secret() -> String {
        "x".repeat(MIN_SECRET_LEN)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.body_limit_kb, 10);
        assert_eq!(config.auth.token_ttl_seconds, 604_800);
        assert!(config.auth.jwt_secret.is_empty());
        assert!(!config.email.enabled);
        assert!(config.is_development());
    }

    #[test]
    fn test_default_config_requires_secret() {
        let config = Config::default();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.auth.jwt_secret = "too-short".to_string();
        assert!(config.validate().is_err());

        config.auth.jwt_secret = secret();
        assert!(config.validate().is_ok());

        config.auth.token_ttl_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serialization_omits_secrets() {
        let mut config = Config::default();
        config.auth.jwt_secret = secret();
        config.email.api_key = "re_secret_key".to_string();

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[auth]"));
        assert!(!toml_str.contains(&secret()));
        assert!(!toml_str.contains("re_secret_key"));

        let debug = format!("{config:?}");
        assert!(!debug.contains(&secret()));
        assert!(!debug.contains("re_secret_key"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [auth]
            jwt_secret = "0123456789abcdef0123456789abcdef"
            token_ttl_seconds = 3600
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.auth.token_ttl_seconds, 3600);
        assert_eq!(config.server.port, 3000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("FOLIO_JWT_SECRET", "from-env-0123456789abcdef-0123456789"),
            ("PORT", "8080"),
            ("CORS_ORIGIN", "https://a.dev, https://b.dev,"),
            ("DATABASE_URL", "sqlite::memory:"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_env(|k| vars.get(k).map(|v| (*v).to_string()))
            .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.general.database_url, "sqlite::memory:");
        assert_eq!(
            config.server.cors_allowed_origins,
            vec!["https://a.dev".to_string(), "https://b.dev".to_string()]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_override_rejects_bad_port() {
        let mut config = Config::default();
        let result = config.apply_env(|k| (k == "PORT").then(|| "not-a-port".to_string()));
        assert!(result.is_err());
    }
}
