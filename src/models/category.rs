use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::{AppError, AppResult};

/// Id of the implicit "Uncategorized" bucket. Never stored, never deletable.
pub const UNCATEGORIZED_ID: i64 = 0;
pub const UNCATEGORIZED_NAME: &str = "Uncategorized";
pub const DEFAULT_COLOR: &str = "#1677ff";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategoryRequest {
    pub name: String,
    pub color: Option<String>,
}

impl NewCategoryRequest {
    /// Checks the name and resolves the color, falling back to [`DEFAULT_COLOR`].
    pub fn validate(&self) -> AppResult<String> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("category name must not be empty"));
        }
        match self.color.as_deref() {
            None => Ok(DEFAULT_COLOR.to_string()),
            Some(color) if is_hex_color(color) => Ok(color.to_string()),
            Some(color) => Err(AppError::validation(format!(
                "color must be a hex string like #1677ff, got {color:?}"
            ))),
        }
    }
}

/// Category as embedded in a todo read. Resolved at query time, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: i64,
    pub name: String,
    pub color: String,
}

impl CategorySummary {
    pub fn uncategorized() -> Self {
        Self {
            id: UNCATEGORIZED_ID,
            name: UNCATEGORIZED_NAME.to_string(),
            color: DEFAULT_COLOR.to_string(),
        }
    }

    /// Builds the summary from the joined columns, or the sentinel when the
    /// todo has no category.
    pub fn resolve(category_id: i64, name: Option<String>, color: Option<String>) -> Self {
        match (category_id, name, color) {
            (UNCATEGORIZED_ID, _, _) => Self::uncategorized(),
            (id, Some(name), Some(color)) => Self { id, name, color },
            _ => Self::uncategorized(),
        }
    }
}

/// `#RGB`, `#RRGGBB` or `#RRGGBBAA`.
pub fn is_hex_color(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 6 | 8) && digits.chars().all(|c| c.is_ascii_hexdigit())
}
