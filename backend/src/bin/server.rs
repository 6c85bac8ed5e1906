//! Todo HTTP Server Binary
//!
//! Main entry point for the todo REST API server. Loads settings, prepares
//! the database when Postgres is selected, builds the repository and serves
//! the router until SIGINT/SIGTERM.
//!
//! # Usage
//!
//! ```bash
//! # Run with the in-memory repository (default features)
//! cargo run --bin todo-server
//!
//! # Run with PostgreSQL
//! POSTGRES_HOSTNAME=localhost POSTGRES_PASSWORD=secret \
//!   cargo run --bin todo-server --features postgres-repo
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8000)
//! - `REPOSITORY_TYPE`: `postgres` or `local`
//! - `TODO_CONFIG`: Optional TOML settings file used instead of the environment
//! - `RUST_LOG`: Log filter (default: info)

use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use todo_backend::config::{CorsPolicy, Settings};
use todo_backend::db::{services, RepositoryFactory, RepositoryType};
use todo_backend::http::{bind_listener, create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting todo HTTP server");

    let settings = Settings::load()?;
    info!(
        environment = %settings.environment,
        "Loaded settings: {:?}",
        settings
    );

    let repo_type =
        RepositoryType::from_settings(&settings).map_err(|e| anyhow::anyhow!(e))?;
    info!("Using {:?} repository", repo_type);

    if repo_type == RepositoryType::Postgres {
        prepare_database(&settings).await?;
    }

    let repository = RepositoryFactory::create(repo_type, &settings).await?;
    match services::health_check(repository.as_ref()).await {
        Ok(true) => info!("Repository initialized successfully"),
        Ok(false) => warn!("Repository reports unhealthy at startup"),
        Err(e) => warn!("Repository health check failed: {}", e),
    }

    let cors = settings.cors_policy();
    if cors == CorsPolicy::AllowAny {
        warn!("CORS allows any origin; credentials are disabled");
    }

    let app = create_router(AppState::new(repository), &cors);

    let listener = bind_listener(&settings).await?;
    let addr = listener.local_addr()?;
    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Create the database and table before the pool is built.
#[cfg(feature = "postgres-repo")]
async fn prepare_database(settings: &Settings) -> anyhow::Result<()> {
    let settings = settings.clone();
    let status = tokio::task::spawn_blocking(move || todo_backend::db::bootstrap::run(&settings))
        .await??;
    info!("Database ready ({:?})", status);
    Ok(())
}

#[cfg(not(feature = "postgres-repo"))]
async fn prepare_database(_settings: &Settings) -> anyhow::Result<()> {
    anyhow::bail!("Postgres repository selected but the postgres-repo feature is not enabled")
}

/// Resolve when the process receives Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
