//! # Todo Backend
//!
//! A small CRUD service for todo items, backed by PostgreSQL and exposed as a
//! JSON REST API via Axum.
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`config`]: Environment and file based settings
//! - [`models`]: The `Todo` record and its create/patch inputs
//! - [`db`]: Repository pattern, Postgres and in-memory backends, bootstrap
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! ```text
//! HTTP request ─► http::handlers ─► db::services ─► TodoRepository
//!                                                     ├─ PostgresRepository (diesel + r2d2)
//!                                                     └─ LocalRepository (in-memory)
//! ```

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod config;
pub mod db;
pub mod models;

#[cfg(feature = "http-server")]
pub mod http;

pub use config::{ConfigError, CorsPolicy, Settings};
pub use models::{NewTodo, Patch, Todo, TodoId, TodoPatch};
