//! Repository implementations module.
//!
//! This module contains the implementations of the `TodoRepository` trait:
//! - `postgres`: PostgreSQL implementation with Diesel ORM
//! - `local`: In-memory implementation for unit testing and local development

#[cfg(feature = "local-repo")]
pub mod local;
#[cfg(feature = "postgres-repo")]
pub mod postgres;

#[cfg(feature = "local-repo")]
pub use local::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use postgres::{PostgresConfig, PostgresRepository};
