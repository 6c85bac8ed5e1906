//! Database initialization binary.
//!
//! Creates the application database (if missing) and the `todos` table.
//! Safe to run repeatedly; prints `Database initialization complete!` on
//! success and exits non-zero on failure.

use log::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use todo_backend::config::Settings;
use todo_backend::db::bootstrap::{self, DatabaseStatus};

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::load()?;
    info!("Initializing database '{}'", settings.target_database());

    match bootstrap::run(&settings)? {
        DatabaseStatus::Created => info!("Database created"),
        DatabaseStatus::AlreadyExists => info!("Database already existed"),
    }

    println!("Database initialization complete!");
    Ok(())
}
