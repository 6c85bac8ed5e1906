//! One-time idempotent database setup.
//!
//! Two steps, both safe to repeat:
//!
//! 1. [`ensure_database`] connects to the `postgres` maintenance database and
//!    creates the target database if `pg_database` has no row for it.
//! 2. [`ensure_schema`] creates the `todos` table and its index if missing.
//!
//! Schema evolution is out of scope; there is no migration diffing.

use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_query;
use diesel::sql_types::{Integer, Text};
use log::info;

use crate::config::Settings;

/// DDL for the only table. Mirrors `repositories::postgres::schema`.
pub const CREATE_TODOS_SQL: &str = "\
CREATE TABLE IF NOT EXISTS todos (
    id SERIAL PRIMARY KEY,
    title VARCHAR(200) NOT NULL,
    description TEXT NULL,
    completed BOOLEAN NOT NULL DEFAULT FALSE
);
CREATE INDEX IF NOT EXISTS ix_todos_id ON todos (id);";

/// Errors raised while preparing the database.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Failed to connect to {target}: {source}")]
    Connection {
        target: String,
        #[source]
        source: diesel::ConnectionError,
    },

    #[error("Bootstrap query failed: {0}")]
    Query(#[from] DieselError),

    #[error("Invalid database name: {0:?}")]
    InvalidName(String),
}

/// Outcome of [`ensure_database`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseStatus {
    Created,
    AlreadyExists,
}

#[derive(QueryableByName)]
struct Present {
    #[diesel(sql_type = Integer)]
    #[allow(dead_code)]
    present: i32,
}

/// Quote a Postgres identifier, doubling embedded quotes.
pub fn quote_identifier(name: &str) -> Result<String, BootstrapError> {
    if name.is_empty() || name.contains('\0') {
        return Err(BootstrapError::InvalidName(name.to_string()));
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// Whether a `CREATE DATABASE` failure means another process won the race.
fn is_already_exists(err: &DieselError) -> bool {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => true,
        DieselError::DatabaseError(_, info) => info.message().contains("already exists"),
        _ => false,
    }
}

fn connect(url: &str, target: &str) -> Result<PgConnection, BootstrapError> {
    PgConnection::establish(url).map_err(|source| BootstrapError::Connection {
        target: target.to_string(),
        source,
    })
}

/// Create the target database if it does not exist yet.
pub fn ensure_database(settings: &Settings) -> Result<DatabaseStatus, BootstrapError> {
    let name = settings.target_database();
    let quoted = quote_identifier(&name)?;
    let mut conn = connect(&settings.maintenance_url(), "maintenance database")?;

    let rows: Vec<Present> =
        sql_query("SELECT 1 AS present FROM pg_database WHERE datname = $1")
            .bind::<Text, _>(&name)
            .load(&mut conn)?;

    if !rows.is_empty() {
        info!("Database '{}' already exists", name);
        return Ok(DatabaseStatus::AlreadyExists);
    }

    info!("Database '{}' does not exist, creating", name);
    match sql_query(format!("CREATE DATABASE {}", quoted)).execute(&mut conn) {
        Ok(_) => {
            info!("Database '{}' created", name);
            Ok(DatabaseStatus::Created)
        }
        Err(e) if is_already_exists(&e) => {
            info!("Database '{}' was created concurrently", name);
            Ok(DatabaseStatus::AlreadyExists)
        }
        Err(e) => Err(e.into()),
    }
}

/// Create the `todos` table and index if missing.
pub fn ensure_schema(conn: &mut PgConnection) -> QueryResult<()> {
    conn.batch_execute(CREATE_TODOS_SQL)
}

/// Run both bootstrap steps against the configured server.
pub fn run(settings: &Settings) -> Result<DatabaseStatus, BootstrapError> {
    let status = ensure_database(settings)?;

    let mut conn = connect(&settings.database_url(), &settings.target_database())?;
    info!("Creating tables (if not exist)");
    ensure_schema(&mut conn)?;
    info!("Tables created/checked");

    Ok(status)
}
