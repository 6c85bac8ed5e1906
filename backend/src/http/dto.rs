//! Data Transfer Objects for the HTTP API.
//!
//! Request bodies are converted into the domain inputs in `crate::models`;
//! responses serialize `crate::models::Todo` directly.

use serde::{Deserialize, Serialize};

use crate::db::services::DEFAULT_LIMIT;
use crate::models::{NewTodo, Patch, TodoPatch};

/// Request body for `POST /todos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodoRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `null` and an omitted key both mean `false`
    #[serde(default)]
    pub completed: Option<bool>,
}

impl From<CreateTodoRequest> for NewTodo {
    fn from(req: CreateTodoRequest) -> Self {
        NewTodo {
            title: req.title,
            description: req.description,
            completed: req.completed.unwrap_or(false),
        }
    }
}

/// Request body for `PUT /todos/{id}`.
///
/// Omitted keys leave the stored value untouched. `"description": null`
/// clears the description; `null` for `title` or `completed` is ignored
/// because those columns are not nullable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub description: Patch<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl From<UpdateTodoRequest> for TodoPatch {
    fn from(req: UpdateTodoRequest) -> Self {
        TodoPatch {
            title: req.title,
            description: req.description,
            completed: req.completed,
        }
    }
}

/// Query parameters for `GET /todos`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ListTodosQuery {
    /// Number of records to skip (default: 0)
    #[serde(default)]
    pub skip: Option<u32>,
    /// Maximum number of records to return (default: 100)
    #[serde(default)]
    pub limit: Option<u32>,
}

impl ListTodosQuery {
    pub fn skip(&self) -> u32 {
        self.skip.unwrap_or(0)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
}
