//! In-memory local repository implementation.
//!
//! This module provides a local implementation of [`TodoRepository`]
//! suitable for unit testing and local development. Records live in a
//! `BTreeMap` keyed by id, so listing is naturally in ascending id order.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::db::repository::*;
use crate::models::{NewTodo, Todo, TodoId, TodoPatch};

/// In-memory local repository.
///
/// Ids are handed out from a counter that never goes backwards, so a deleted
/// id is never reused, matching a Postgres `SERIAL` column.
///
/// # Example
/// ```
/// use todo_backend::db::repositories::LocalRepository;
/// use todo_backend::db::repository::TodoRepository;
/// use todo_backend::models::NewTodo;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let repo = LocalRepository::new();
/// let todo = repo.create_todo(&NewTodo::new("Buy milk")).await.unwrap();
/// assert_eq!(repo.todo_count(), 1);
/// assert!(!todo.completed);
/// # });
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    todos: BTreeMap<TodoId, Todo>,
    next_id: i32,
    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            todos: BTreeMap::new(),
            next_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository. The id counter is kept.
    pub fn clear(&self) {
        self.data.write().todos.clear();
    }

    /// Get the number of todos stored.
    pub fn todo_count(&self) -> usize {
        self.data.read().todos.len()
    }

    /// Check if a todo exists.
    pub fn has_todo(&self, id: TodoId) -> bool {
        self.data.read().todos.contains_key(&id)
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self, operation: &str) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection_with_context(
                "Database is not healthy",
                ErrorContext::new(operation),
            ));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TodoRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn create_todo(&self, todo: &NewTodo) -> RepositoryResult<Todo> {
        self.check_health("create_todo")?;

        let mut data = self.data.write();
        let id = TodoId(data.next_id);
        data.next_id = data.next_id.checked_add(1).ok_or_else(|| {
            RepositoryError::internal_with_context(
                "Todo id sequence exhausted",
                ErrorContext::new("create_todo").with_entity("todo"),
            )
        })?;

        let stored = Todo {
            id,
            title: todo.title.clone(),
            description: todo.description.clone(),
            completed: todo.completed,
        };
        data.todos.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_todo(&self, id: TodoId) -> RepositoryResult<Option<Todo>> {
        self.check_health("get_todo")?;
        Ok(self.data.read().todos.get(&id).cloned())
    }

    async fn list_todos(&self, skip: u32, limit: u32) -> RepositoryResult<Vec<Todo>> {
        self.check_health("list_todos")?;
        let data = self.data.read();
        Ok(data
            .todos
            .values()
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn update_todo(&self, id: TodoId, patch: &TodoPatch) -> RepositoryResult<Option<Todo>> {
        self.check_health("update_todo")?;
        let mut data = self.data.write();
        Ok(data.todos.get_mut(&id).map(|todo| {
            todo.apply(patch);
            todo.clone()
        }))
    }

    async fn delete_todo(&self, id: TodoId) -> RepositoryResult<bool> {
        self.check_health("delete_todo")?;
        Ok(self.data.write().todos.remove(&id).is_some())
    }

    async fn count_todos(&self) -> RepositoryResult<u64> {
        self.check_health("count_todos")?;
        Ok(self.data.read().todos.len() as u64)
    }
}
