//! Core todo repository trait for CRUD operations.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{NewTodo, Todo, TodoId, TodoPatch};

/// Repository trait for todo persistence.
///
/// Each call acquires its own connection (or lock) and releases it before
/// returning, on success and on failure alike. Nothing is shared between
/// concurrent calls except the pool itself.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    // ==================== Health & Connection ====================

    /// Check if the database connection is healthy.
    ///
    /// # Returns
    /// - `Ok(true)` if connection is healthy
    /// - `Ok(false)` if connection is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if an error occurred during the check
    async fn health_check(&self) -> RepositoryResult<bool>;

    // ==================== Todo Operations ====================

    /// Insert a new todo and return the stored record with its assigned id.
    async fn create_todo(&self, todo: &NewTodo) -> RepositoryResult<Todo>;

    /// Point lookup by primary key.
    ///
    /// # Returns
    /// * `Ok(Some(Todo))` - The stored record
    /// * `Ok(None)` - If no record has this id
    async fn get_todo(&self, id: TodoId) -> RepositoryResult<Option<Todo>>;

    /// List up to `limit` todos after skipping `skip`, in ascending id order.
    async fn list_todos(&self, skip: u32, limit: u32) -> RepositoryResult<Vec<Todo>>;

    /// Overwrite the fields present in `patch` and return the updated record.
    ///
    /// # Returns
    /// * `Ok(Some(Todo))` - The record after the update
    /// * `Ok(None)` - If no record has this id
    async fn update_todo(&self, id: TodoId, patch: &TodoPatch) -> RepositoryResult<Option<Todo>>;

    /// Permanently remove a todo.
    ///
    /// # Returns
    /// * `Ok(true)` - The record existed and was deleted
    /// * `Ok(false)` - If no record has this id
    async fn delete_todo(&self, id: TodoId) -> RepositoryResult<bool>;

    /// Total number of stored todos.
    async fn count_todos(&self) -> RepositoryResult<u64>;
}
