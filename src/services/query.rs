use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db::todo_repository;
use crate::error::AppResult;
use crate::models::{Todo, TodoView, UNCATEGORIZED_ID};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoOrder {
    /// Insertion order.
    #[default]
    Oldest,
    Newest,
}

/// Which todos a list call should return. The default shows everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoFilter {
    /// `0` disables the category constraint.
    pub category_id: i64,
    pub search: String,
    pub order: TodoOrder,
}

impl TodoFilter {
    pub fn category(category_id: i64) -> Self {
        Self {
            category_id,
            ..Self::default()
        }
    }

    pub fn search(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            ..Self::default()
        }
    }

    pub fn matches(&self, todo: &Todo) -> bool {
        self.matches_category(todo) && self.matches_text(todo)
    }

    fn matches_category(&self, todo: &Todo) -> bool {
        self.category_id == UNCATEGORIZED_ID || todo.category_id == self.category_id
    }

    fn matches_text(&self, todo: &Todo) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        todo.title.to_lowercase().contains(&needle)
            || todo.description.to_lowercase().contains(&needle)
    }

    /// Keeps matching todos. `todos` must already be in insertion order.
    pub fn apply(&self, todos: Vec<TodoView>) -> Vec<TodoView> {
        let mut visible: Vec<TodoView> = todos.into_iter().filter(|t| self.matches(&t.todo)).collect();
        if self.order == TodoOrder::Newest {
            visible.reverse();
        }
        visible
    }
}

#[derive(Clone)]
pub struct QueryEngine {
    db: SqlitePool,
}

impl QueryEngine {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn list(&self, filter: &TodoFilter) -> AppResult<Vec<TodoView>> {
        let todos = todo_repository::fetch_todos(&self.db).await?;
        Ok(filter.apply(todos))
    }
}
