use diesel::prelude::*;

use super::schema::todos;
use crate::models::{NewTodo, Todo, TodoId, TodoPatch};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = todos)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TodoRow {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Todo {
            id: TodoId(row.id),
            title: row.title,
            description: row.description,
            completed: row.completed,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = todos)]
pub struct NewTodoRow {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}

impl From<&NewTodo> for NewTodoRow {
    fn from(todo: &NewTodo) -> Self {
        NewTodoRow {
            title: todo.title.clone(),
            description: todo.description.clone(),
            completed: todo.completed,
        }
    }
}

/// `None` fields are left out of the `SET` clause; `description: Some(None)`
/// writes NULL.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = todos)]
pub struct TodoChangeset {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
}

impl From<&TodoPatch> for TodoChangeset {
    fn from(patch: &TodoPatch) -> Self {
        TodoChangeset {
            title: patch.title.clone(),
            description: patch.description.clone().into_change(),
            completed: patch.completed,
        }
    }
}
