use thiserror::Error;

/// Errors raised by the stores, the integrity coordinator and the query engine.
///
/// This type never leaves the crate's service boundary; `api::ApiError` is
/// what callers see.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("{0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn category_not_found(id: i64) -> Self {
        AppError::NotFound { entity: "category", id }
    }

    pub fn todo_not_found(id: i64) -> Self {
        AppError::NotFound { entity: "todo", id }
    }
}

pub type AppResult<T> = Result<T, AppError>;
