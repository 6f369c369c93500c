//! Resource API: the operation surface handed to the transport layer.
//!
//! Each method checks input shape, delegates to exactly one store,
//! coordinator or query engine call, and maps [`AppError`]
//! into [`ApiError`].

pub mod envelope;

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db::{category_repository, todo_repository};
use crate::error::AppError;
use crate::models::{
    Category, NewCategoryRequest, NewTodoRequest, TodoView, UNCATEGORIZED_ID, UpdateTodoRequest,
};
use crate::services::{CategoryDeletion, IntegrityCoordinator, QueryEngine, TodoFilter, TodoOrder};

pub use envelope::{ApiError, ApiResult, Envelope, ErrorKind};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListTodosParams {
    pub category_id: Option<i64>,
    pub search: Option<String>,
    pub order: Option<TodoOrder>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub id: i64,
}

#[derive(Clone)]
pub struct ResourceApi {
    db: SqlitePool,
    integrity: IntegrityCoordinator,
    query: QueryEngine,
}

impl ResourceApi {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            integrity: IntegrityCoordinator::new(db.clone()),
            query: QueryEngine::new(db.clone()),
            db,
        }
    }

    pub async fn list_todos(&self, params: ListTodosParams) -> ApiResult<Vec<TodoView>> {
        let category_id = params.category_id.unwrap_or(UNCATEGORIZED_ID);
        if category_id < 0 {
            return Err(ApiError::validation(format!(
                "category_id must be 0 or a positive id, got {category_id}"
            )));
        }

        let filter = TodoFilter {
            category_id,
            search: params.search.unwrap_or_default(),
            order: params.order.unwrap_or_default(),
        };
        Ok(self.query.list(&filter).await?)
    }

    pub async fn get_todo(&self, id: i64) -> ApiResult<TodoView> {
        Ok(todo_repository::get_todo(&self.db, id).await?)
    }

    pub async fn create_todo(&self, req: NewTodoRequest) -> ApiResult<TodoView> {
        Ok(todo_repository::insert_todo(&self.db, req).await?)
    }

    pub async fn update_todo(&self, id: i64, req: UpdateTodoRequest) -> ApiResult<TodoView> {
        Ok(todo_repository::update_todo(&self.db, id, req).await?)
    }

    pub async fn delete_todo(&self, id: i64) -> ApiResult<Deleted> {
        todo_repository::delete_todo(&self.db, id).await?;
        Ok(Deleted { id })
    }

    pub async fn list_categories(&self) -> ApiResult<Vec<Category>> {
        Ok(category_repository::fetch_categories(&self.db)
            .await
            .map_err(AppError::from)?)
    }

    pub async fn get_category(&self, id: i64) -> ApiResult<Category> {
        require_category_id(id)?;
        Ok(category_repository::get_category(&self.db, id).await?)
    }

    pub async fn create_category(&self, req: NewCategoryRequest) -> ApiResult<Category> {
        Ok(category_repository::insert_category(&self.db, req).await?)
    }

    pub async fn delete_category(&self, id: i64) -> ApiResult<CategoryDeletion> {
        require_category_id(id)?;
        Ok(self.integrity.delete_category(id).await?)
    }
}

/// Category id 0 names the uncategorized bucket, which has no record.
fn require_category_id(id: i64) -> ApiResult<()> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "category id must be a positive integer, got {id}"
        )));
    }
    Ok(())
}
