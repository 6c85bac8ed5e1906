//! Postgres repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - One pooled connection per repository call, returned on every exit path
//! - Optional retry for transient failures (off by default)
//! - Idempotent table creation on startup
//!
//! ## Configuration
//!
//! Built from [`Settings`]: the connection string comes from
//! `Settings::database_url()` and pool tuning from `Settings::pool`.

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use std::time::Duration;
use tokio::task;

use crate::config::Settings;
use crate::db::bootstrap;
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult, TodoRepository};
use crate::models::{NewTodo, Todo, TodoId, TodoPatch};

mod models;
pub mod schema;

use models::*;
use schema::todos;

type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of idle connections kept open
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl PostgresConfig {
    /// Derive the pool configuration from process settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            database_url: settings.database_url(),
            max_pool_size: settings.pool.max_connections,
            min_pool_size: settings.pool.min_connections,
            connection_timeout_sec: settings.pool.connect_timeout_sec,
            idle_timeout_sec: settings.pool.idle_timeout_sec,
            max_retries: settings.pool.max_retries,
            retry_delay_ms: settings.pool.retry_delay_ms,
        }
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Diesel-backed repository for Postgres.
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
}

impl std::fmt::Debug for PostgresRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.pool.state();
        f.debug_struct("PostgresRepository")
            .field("connections", &state.connections)
            .field("idle_connections", &state.idle_connections)
            .field("max_pool_size", &self.config.max_pool_size)
            .finish()
    }
}

impl PostgresRepository {
    /// Build the pool and make sure the `todos` table exists.
    ///
    /// Fails if no connection can be established within the configured
    /// timeout, which callers treat as fatal at startup.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true) // Validate connections before use
            .build(manager)
            .map_err(|e| RepositoryError::from(e).with_operation("create_pool"))?;

        {
            let mut conn = pool
                .get()
                .map_err(|e| {
                    RepositoryError::from(e).with_operation("get_connection_for_schema")
                })?;
            bootstrap::ensure_schema(&mut conn).map_err(|e| {
                RepositoryError::internal_with_context(
                    e.to_string(),
                    ErrorContext::new("ensure_schema"),
                )
            })?;
        }

        Ok(Self { pool, config })
    }

    /// Run `f` on a pooled connection inside the blocking thread pool.
    ///
    /// The connection is checked out for exactly one attempt and dropped
    /// (returned to the pool) when the attempt finishes, whatever its result.
    /// Retryable errors are retried up to `max_retries` times with
    /// exponential backoff.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    log::warn!("Retrying database operation (attempt {})", attempt + 1);
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2; // Exponential backoff
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::from(e).with_operation("get_connection");
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        return Err(err);
                    }
                };

                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }

            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }
}

fn map_diesel_error(
    operation: &'static str,
    id: Option<TodoId>,
) -> impl Fn(diesel::result::Error) -> RepositoryError {
    move |err| {
        let err = RepositoryError::from(err).with_operation(operation);
        match (id, err) {
            (Some(id), RepositoryError::QueryError { message, context }) => {
                RepositoryError::query_with_context(
                    message,
                    context.with_entity("todo").with_entity_id(id),
                )
            }
            (_, err) => err,
        }
    }
}

fn find_todo(conn: &mut PgConnection, id: TodoId) -> Result<Option<Todo>, diesel::result::Error> {
    todos::table
        .find(id.value())
        .select(TodoRow::as_select())
        .first::<TodoRow>(conn)
        .optional()
        .map(|row| row.map(Todo::from))
}

#[async_trait]
impl TodoRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error("health_check", None))
        })
        .await
    }

    async fn create_todo(&self, todo: &NewTodo) -> RepositoryResult<Todo> {
        let row = NewTodoRow::from(todo);
        self.with_conn(move |conn| {
            diesel::insert_into(todos::table)
                .values(&row)
                .returning(TodoRow::as_returning())
                .get_result::<TodoRow>(conn)
                .map(Todo::from)
                .map_err(map_diesel_error("create_todo", None))
        })
        .await
    }

    async fn get_todo(&self, id: TodoId) -> RepositoryResult<Option<Todo>> {
        self.with_conn(move |conn| {
            find_todo(conn, id).map_err(map_diesel_error("get_todo", Some(id)))
        })
        .await
    }

    async fn list_todos(&self, skip: u32, limit: u32) -> RepositoryResult<Vec<Todo>> {
        self.with_conn(move |conn| {
            let rows = todos::table
                .select(TodoRow::as_select())
                .order(todos::id.asc())
                .offset(i64::from(skip))
                .limit(i64::from(limit))
                .load::<TodoRow>(conn)
                .map_err(map_diesel_error("list_todos", None))?;

            Ok(rows.into_iter().map(Todo::from).collect())
        })
        .await
    }

    async fn update_todo(&self, id: TodoId, patch: &TodoPatch) -> RepositoryResult<Option<Todo>> {
        // Diesel refuses an UPDATE with an empty SET clause
        if patch.is_empty() {
            return self.get_todo(id).await;
        }

        let changeset = TodoChangeset::from(patch);
        self.with_conn(move |conn| {
            diesel::update(todos::table.find(id.value()))
                .set(&changeset)
                .returning(TodoRow::as_returning())
                .get_result::<TodoRow>(conn)
                .optional()
                .map(|row| row.map(Todo::from))
                .map_err(map_diesel_error("update_todo", Some(id)))
        })
        .await
    }

    async fn delete_todo(&self, id: TodoId) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            diesel::delete(todos::table.find(id.value()))
                .execute(conn)
                .map(|affected| affected > 0)
                .map_err(map_diesel_error("delete_todo", Some(id)))
        })
        .await
    }

    async fn count_todos(&self) -> RepositoryResult<u64> {
        self.with_conn(|conn| {
            todos::table
                .count()
                .get_result::<i64>(conn)
                .map(|n| n.max(0) as u64)
                .map_err(map_diesel_error("count_todos", None))
        })
        .await
    }
}
