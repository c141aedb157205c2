pub mod api;
pub mod cli;
pub mod clients;
pub mod config;
pub mod db;
pub mod entities;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
pub use config::Config;
use db::Store;
use services::{AuthService, DefaultAuthService, PasswordService, SystemClock, TokenCodec};

pub async fn run(config: Config) -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command() {
        Commands::InitConfig => cmd_init_config(),
        Commands::CheckConfig => cmd_check_config(&config),
        Commands::CreateAdmin { username, email } => {
            init_tracing(&config)?;
            cmd_create_admin(config, &username, email.as_deref()).await
        }
        Commands::Serve => {
            config.validate()?;
            init_tracing(&config)?;
            run_server(config).await
        }
    }
}

fn init_tracing(config: &Config) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let json = config.general.json_logs;
    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer));

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let (layer, task) = tracing_loki::builder()
            .label("app", "folio")?
            .extra_field("env", config.general.environment.clone())?
            .build_url(url)?;

        tokio::spawn(task);
        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    Ok(())
}

fn init_metrics(config: &Config) -> anyhow::Result<Option<metrics_exporter_prometheus::PrometheusHandle>> {
    if !config.observability.metrics_enabled {
        return Ok(None);
    }

    use metrics_exporter_prometheus::PrometheusBuilder;
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    info!("Prometheus metrics recorder initialized");

    Ok(Some(handle))
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    let prometheus_handle = init_metrics(&config)?;

    info!(
        environment = %config.general.environment,
        "Starting Folio v{}",
        env!("CARGO_PKG_VERSION")
    );
    if !config.is_development() && config.server.cors_allowed_origins.iter().any(|o| o == "*") {
        warn!("CORS allows any origin outside development");
    }
    if !config.email.is_configured() {
        warn!("Email notifications disabled: email.enabled is false or api_key is missing");
    }

    let port = config.server.port;
    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_seconds);

    let state = api::create_app_state_from_config(config, prometheus_handle).await?;
    let store = state.store.clone();
    let app = api::router(state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Web server running at http://{}", addr);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_rx.await.ok();
            })
            .await
    });

    tokio::select! {
        result = &mut server => {
            result.context("Web server task panicked")??;
            warn!("Web server exited without a shutdown signal");
            return Ok(());
        }
        () = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    shutdown_tx.send(()).ok();

    match tokio::time::timeout(shutdown_timeout, server).await {
        Ok(result) => result.context("Web server task panicked")??,
        Err(_) => warn!(
            "In-flight requests did not finish within {}s, exiting",
            shutdown_timeout.as_secs()
        ),
    }

    if let Err(e) = store.close().await {
        error!("Failed to close database pool: {}", e);
    }
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Error listening for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Error listening for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

fn cmd_init_config() -> anyhow::Result<()> {
    if Config::create_default_if_missing()? {
        println!("Created config.toml with default settings.");
        println!("Set FOLIO_JWT_SECRET (at least {} bytes) before running `folio serve`.", config::MIN_SECRET_LEN);
    } else {
        println!("config.toml already exists, leaving it unchanged.");
    }
    Ok(())
}

fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    config.validate()?;

    println!("Configuration OK");
    println!("  environment:   {}", config.general.environment);
    println!("  database:      {}", config.general.database_url);
    println!("  port:          {}", config.server.port);
    println!("  cors origins:  {}", config.server.cors_allowed_origins.join(", "));
    println!("  token ttl:     {}s", config.auth.token_ttl_seconds);
    println!(
        "  email:         {}",
        if config.email.is_configured() { "enabled" } else { "disabled" }
    );
    Ok(())
}

async fn cmd_create_admin(config: Config, username: &str, email: Option<&str>) -> anyhow::Result<()> {
    config.validate()?;

    let password = match std::env::var("FOLIO_ADMIN_PASSWORD") {
        Ok(password) => password,
        Err(_) => {
            let mut line = String::new();
            std::io::stdin()
                .read_line(&mut line)
                .context("Failed to read password from stdin")?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };
    if username.is_empty() || password.is_empty() {
        anyhow::bail!("Username and password are required");
    }

    let store = Store::with_pool_options(&config.general.database_url, 1, 1).await?;
    let auth = DefaultAuthService::new(
        Arc::new(store.clone()),
        PasswordService::new(&config.security)?,
        TokenCodec::new(config.auth.jwt_secret.as_bytes(), config.auth.token_ttl_seconds),
        Arc::new(SystemClock),
    )?;

    let admin = auth.create_administrator(username, &password, email).await?;
    println!("Created administrator '{}' (id {})", admin.username, admin.id);

    store.close().await
}
