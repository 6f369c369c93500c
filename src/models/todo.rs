use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::{AppError, AppResult};
use crate::models::category::{CategorySummary, UNCATEGORIZED_ID};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(AppError::validation(format!(
                "priority must be one of low, medium, high; got {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub completed: bool,
    pub category_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// A todo joined with its effective category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoView {
    #[serde(flatten)]
    pub todo: Todo,
    pub category: CategorySummary,
}

/// Row shape of the todo/category `LEFT JOIN`.
#[derive(Debug, FromRow)]
pub struct TodoRow {
    #[sqlx(flatten)]
    pub todo: Todo,
    pub category_name: Option<String>,
    pub category_color: Option<String>,
}

impl From<TodoRow> for TodoView {
    fn from(row: TodoRow) -> Self {
        let category =
            CategorySummary::resolve(row.todo.category_id, row.category_name, row.category_color);
        Self {
            todo: row.todo,
            category,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTodoRequest {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub category_id: Option<i64>,
}

/// A create request that passed field validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category_id: i64,
}

impl NewTodoRequest {
    pub fn validate(self) -> AppResult<NewTodo> {
        let title = validate_title(self.title)?;
        let priority = match self.priority.as_deref() {
            Some(p) => p.parse()?,
            None => Priority::default(),
        };
        let category_id = validate_category_ref(self.category_id.unwrap_or(UNCATEGORIZED_ID))?;

        Ok(NewTodo {
            title,
            description: self.description.unwrap_or_default(),
            priority,
            category_id,
        })
    }
}

/// Sparse update: every field is independently present or absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub completed: Option<bool>,
    pub category_id: Option<i64>,
}

/// Fields to change, validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
    pub category_id: Option<i64>,
}

impl TodoChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.completed.is_none()
            && self.category_id.is_none()
    }
}

impl UpdateTodoRequest {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn validate(self) -> AppResult<TodoChanges> {
        Ok(TodoChanges {
            title: self.title.map(validate_title).transpose()?,
            description: self.description,
            priority: self.priority.as_deref().map(str::parse::<Priority>).transpose()?,
            completed: self.completed,
            category_id: self.category_id.map(validate_category_ref).transpose()?,
        })
    }
}

fn validate_title(title: String) -> AppResult<String> {
    if title.trim().is_empty() {
        return Err(AppError::validation("todo title must not be empty"));
    }
    Ok(title)
}

fn validate_category_ref(category_id: i64) -> AppResult<i64> {
    if category_id < 0 {
        return Err(AppError::validation(format!(
            "category_id must be 0 or a positive id, got {category_id}"
        )));
    }
    Ok(category_id)
}
