//! Repository trait definitions for database operations.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`todo`]: CRUD operations for todo items
//!
//! Absence is part of normal control flow: lookups return `Option` and
//! deletes return `bool`, leaving it to callers to decide how to surface a
//! missing record. `RepositoryError` is reserved for genuine failures.

pub mod error;
pub mod todo;

// Re-export error types
pub use error::{ErrorContext, RepositoryError, RepositoryResult};

pub use todo::TodoRepository;
