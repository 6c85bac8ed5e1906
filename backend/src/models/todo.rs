//! The `Todo` record and the inputs used to create and patch it.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum number of characters allowed in a title (`VARCHAR(200)`).
pub const MAX_TITLE_LEN: usize = 200;

/// Todo identifier, assigned by the store.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TodoId(pub i32);

impl TodoId {
    pub fn new(value: i32) -> Self {
        TodoId(value)
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TodoId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(TodoId)
    }
}

/// A stored todo item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}

impl Todo {
    /// Apply a patch in place. Fields left `Unchanged` keep their value.
    pub fn apply(&mut self, patch: &TodoPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        match &patch.description {
            Patch::Unchanged => {}
            Patch::Clear => self.description = None,
            Patch::Set(description) => self.description = Some(description.clone()),
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
    }
}

/// Fields needed to insert a new todo. The id is assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}

impl NewTodo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            completed: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)
    }
}

/// Tri-state field update.
///
/// In JSON an omitted key deserializes to `Unchanged` (via `#[serde(default)]`
/// on the containing field), `null` to `Clear` and a value to `Set`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    #[default]
    Unchanged,
    Clear,
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Patch::Unchanged)
    }

    /// Collapse into the nested option form used by changesets:
    /// `None` = leave alone, `Some(None)` = set NULL, `Some(Some(v))` = set `v`.
    pub fn into_change(self) -> Option<Option<T>> {
        match self {
            Patch::Unchanged => None,
            Patch::Clear => Some(None),
            Patch::Set(v) => Some(Some(v)),
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Set(v),
            None => Patch::Clear,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Patch::Set(v) => serializer.serialize_some(v),
            _ => serializer.serialize_none(),
        }
    }
}

/// Partial update for a todo.
///
/// `title` and `completed` map onto non-nullable columns, so they only
/// distinguish "keep" from "overwrite". `description` can also be cleared.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Patch<String>,
    pub completed: Option<bool>,
}

impl TodoPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_unchanged() && self.completed.is_none()
    }

    pub fn validate(&self) -> Result<(), String> {
        match &self.title {
            Some(title) => validate_title(title),
            None => Ok(()),
        }
    }
}

/// A title must contain a non-whitespace character and fit the column.
pub fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("title must not be empty".to_string());
    }
    let len = title.chars().count();
    if len > MAX_TITLE_LEN {
        return Err(format!(
            "title must be at most {} characters (got {})",
            MAX_TITLE_LEN, len
        ));
    }
    Ok(())
}
