//! High-level todo operations.
//!
//! Repository-agnostic functions used by the HTTP layer. They enforce the
//! field rules (non-empty title, length bound) before touching the store, so
//! invalid input never costs a connection, and they log each mutation.
//!
//! # Usage
//!
//! ```ignore
//! use todo_backend::db::{services, repositories::LocalRepository};
//! use todo_backend::models::NewTodo;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = LocalRepository::new();
//!     let todo = services::create_todo(&repo, NewTodo::new("Buy milk")).await?;
//!     let todos = services::list_todos(&repo, 0, 100).await?;
//!     println!("Stored {} ({} total)", todo.id, todos.len());
//!     Ok(())
//! }
//! ```

use log::{debug, info};

use super::repository::{ErrorContext, RepositoryError, RepositoryResult, TodoRepository};
use crate::models::{NewTodo, Todo, TodoId, TodoPatch};

/// Default page size for [`list_todos`].
pub const DEFAULT_LIMIT: u32 = 100;

// ==================== Health & Connection ====================

/// Check if the database connection is healthy.
pub async fn health_check<R: TodoRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

// ==================== Todo Operations ====================

/// Validate and insert a new todo.
///
/// # Returns
/// * `Ok(Todo)` - The stored record with its assigned id
/// * `Err(RepositoryError::ValidationError)` - If the title is empty or too long
pub async fn create_todo<R: TodoRepository + ?Sized>(
    repo: &R,
    todo: NewTodo,
) -> RepositoryResult<Todo> {
    todo.validate().map_err(|msg| {
        RepositoryError::validation_with_context(
            msg,
            ErrorContext::new("create_todo").with_entity("todo"),
        )
    })?;

    let created = repo.create_todo(&todo).await?;
    info!("Created todo {}", created.id);
    Ok(created)
}

/// Fetch a single todo, `None` if it does not exist.
pub async fn get_todo<R: TodoRepository + ?Sized>(
    repo: &R,
    id: TodoId,
) -> RepositoryResult<Option<Todo>> {
    repo.get_todo(id).await
}

/// List todos in ascending id order.
pub async fn list_todos<R: TodoRepository + ?Sized>(
    repo: &R,
    skip: u32,
    limit: u32,
) -> RepositoryResult<Vec<Todo>> {
    let todos = repo.list_todos(skip, limit).await?;
    debug!(
        "Listed {} todos (skip={}, limit={})",
        todos.len(),
        skip,
        limit
    );
    Ok(todos)
}

/// Apply a partial update.
///
/// # Returns
/// * `Ok(Some(Todo))` - The updated record
/// * `Ok(None)` - If no record has this id
/// * `Err(RepositoryError::ValidationError)` - If a new title is empty or too long
pub async fn update_todo<R: TodoRepository + ?Sized>(
    repo: &R,
    id: TodoId,
    patch: TodoPatch,
) -> RepositoryResult<Option<Todo>> {
    patch.validate().map_err(|msg| {
        RepositoryError::validation_with_context(
            msg,
            ErrorContext::new("update_todo")
                .with_entity("todo")
                .with_entity_id(id),
        )
    })?;

    let updated = repo.update_todo(id, &patch).await?;
    match &updated {
        Some(_) => info!("Updated todo {}", id),
        None => debug!("Update skipped, todo {} not found", id),
    }
    Ok(updated)
}

/// Hard-delete a todo. Returns `false` if it did not exist.
pub async fn delete_todo<R: TodoRepository + ?Sized>(
    repo: &R,
    id: TodoId,
) -> RepositoryResult<bool> {
    let deleted = repo.delete_todo(id).await?;
    if deleted {
        info!("Deleted todo {}", id);
    } else {
        debug!("Delete skipped, todo {} not found", id);
    }
    Ok(deleted)
}

/// Number of stored todos.
pub async fn count_todos<R: TodoRepository + ?Sized>(repo: &R) -> RepositoryResult<u64> {
    repo.count_todos().await
}

#[cfg(all(test, feature = "local-repo"))]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::models::Patch;

    #[tokio::test]
    async fn test_create_defaults() {
        let repo = LocalRepository::new();
        let todo = create_todo(&repo, NewTodo::new("Buy milk")).await.unwrap();
        let fetched = get_todo(&repo, todo.id).await.unwrap().unwrap();
        assert!(!fetched.completed);
        assert_eq!(fetched.description, None);
        assert_eq!(fetched.title, "Buy milk");
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title_without_storing() {
        let repo = LocalRepository::new();
        let err = create_todo(&repo, NewTodo::new("  ")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError { .. }));
        assert_eq!(count_todos(&repo).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_validation_runs_before_store_access() {
        let repo = LocalRepository::new();
        repo.set_healthy(false);
        let err = create_todo(&repo, NewTodo::new("")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError { .. }));
    }

    #[tokio::test]
    async fn test_update_rejects_too_long_title() {
        let repo = LocalRepository::new();
        let todo = create_todo(&repo, NewTodo::new("ok")).await.unwrap();
        let patch = TodoPatch {
            title: Some("x".repeat(201)),
            ..Default::default()
        };
        let err = update_todo(&repo, todo.id, patch).await.unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError { .. }));
        assert_eq!(
            get_todo(&repo, todo.id).await.unwrap().unwrap().title,
            "ok"
        );
    }

    #[tokio::test]
    async fn test_update_partial_merge() {
        let repo = LocalRepository::new();
        let todo = create_todo(&repo, NewTodo::new("Buy milk").with_description("oat"))
            .await
            .unwrap();

        let patch = TodoPatch {
            completed: Some(true),
            ..Default::default()
        };
        update_todo(&repo, todo.id, patch).await.unwrap().unwrap();

        let fetched = get_todo(&repo, todo.id).await.unwrap().unwrap();
        assert!(fetched.completed);
        assert_eq!(fetched.title, "Buy milk");
        assert_eq!(fetched.description.as_deref(), Some("oat"));

        let patch = TodoPatch {
            description: Patch::Clear,
            ..Default::default()
        };
        let cleared = update_todo(&repo, todo.id, patch).await.unwrap().unwrap();
        assert_eq!(cleared.description, None);
        assert!(cleared.completed);
    }

    #[tokio::test]
    async fn test_missing_ids_are_not_errors() {
        let repo = LocalRepository::new();
        let missing = TodoId(404);
        assert_eq!(get_todo(&repo, missing).await.unwrap(), None);
        assert_eq!(
            update_todo(&repo, missing, TodoPatch::default()).await.unwrap(),
            None
        );
        assert!(!delete_todo(&repo, missing).await.unwrap());
    }
}
