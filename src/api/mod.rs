use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::clients::email::{ContactNotifier, EmailClient};
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, ContactService, DefaultAuthService, PasswordService, ProjectService,
    SystemClock, TokenCodec,
};

mod admin;
pub mod auth;
mod contact;
mod error;
mod health;
mod observability;
mod projects;
mod types;
mod validation;

pub use auth::CurrentAdmin;
pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth: Arc<dyn AuthService>,

    pub projects: ProjectService,

    pub contacts: ContactService,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

/// Builds the state with the email client described by `config.email`.
pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let notifier = EmailClient::from_config(&config.email)?
        .map(|client| Arc::new(client) as Arc<dyn ContactNotifier>);

    create_app_state(config, notifier, prometheus_handle).await
}

pub async fn create_app_state(
    config: Config,
    notifier: Option<Arc<dyn ContactNotifier>>,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    config.validate()?;

    let store = Store::with_pool_options(
        &config.general.database_url,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let passwords = PasswordService::new(&config.security)?;
    let tokens = TokenCodec::new(
        config.auth.jwt_secret.as_bytes(),
        config.auth.token_ttl_seconds,
    );
    let auth = DefaultAuthService::new(
        Arc::new(store.clone()),
        passwords,
        tokens,
        Arc::new(SystemClock),
    )?;

    Ok(Arc::new(AppState {
        config: Arc::new(config),
        projects: ProjectService::new(store.clone()),
        contacts: ContactService::new(store.clone(), notifier),
        auth: Arc::new(auth),
        store,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.server.body_limit_kb.saturating_mul(1024);
    let cors_layer = cors_layer(&state.config.server.cors_allowed_origins);

    let admin_router = create_admin_router(state.clone());

    let api_router = Router::new()
        .nest("/admin", admin_router)
        .route(
            "/auth/me",
            get(auth::me).route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth::auth_middleware,
            )),
        )
        .route("/health", get(health::health_check))
        .route("/projects", get(projects::list_projects))
        .route("/projects/{id}", get(projects::get_project))
        .route("/contact", post(contact::submit_contact))
        .route("/auth/login", post(auth::login))
        .route("/auth/setup", post(auth::setup))
        .with_state(state);

    Router::new()
        .route("/", get(health::index))
        .nest("/api", api_router)
        .fallback(health::not_found)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors_layer)
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http())
}

fn create_admin_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    // Unknown admin paths still pass through the gate before the 404
    Router::new()
        .route(
            "/projects",
            get(projects::admin_list_projects).post(projects::create_project),
        )
        .route(
            "/projects/{id}",
            put(projects::update_project).delete(projects::delete_project),
        )
        .route("/messages", get(contact::list_messages))
        .route("/messages/stats", get(contact::message_stats))
        .route("/messages/{id}", delete(contact::delete_message))
        .route("/messages/{id}/read", put(contact::mark_message_read))
        .route("/dashboard/stats", get(admin::dashboard_stats))
        .route("/metrics", get(observability::get_metrics))
        .fallback(health::not_found)
        .layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = if origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_credentials(true)
    };

    layer
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ])
}
