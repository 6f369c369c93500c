use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::db::{category_repository, todo_repository};
use crate::error::{AppError, AppResult};
use crate::models::UNCATEGORIZED_ID;

/// Keeps todo -> category references valid across category removal.
#[derive(Clone)]
pub struct IntegrityCoordinator {
    db: SqlitePool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryDeletion {
    pub id: i64,
    pub reassigned_todos: u64,
}

impl IntegrityCoordinator {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Deletes a category and moves its todos to the uncategorized bucket in
    /// one transaction. A missing category rolls everything back and reports
    /// `NotFound`.
    pub async fn delete_category(&self, id: i64) -> AppResult<CategoryDeletion> {
        if id == UNCATEGORIZED_ID {
            return Err(AppError::validation(
                "the uncategorized bucket cannot be deleted",
            ));
        }

        let mut tx = self.db.begin().await?;

        let reassigned = todo_repository::detach_category(&mut tx, id).await?;
        if !category_repository::delete_category_row(&mut tx, id).await? {
            return Err(AppError::category_not_found(id));
        }

        tx.commit().await?;

        info!(category_id = id, reassigned, "category deleted");
        Ok(CategoryDeletion {
            id,
            reassigned_todos: reassigned,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::category_repository::{fetch_categories, insert_category};
    use crate::db::todo_repository::{fetch_todos, insert_todo};
    use crate::db::{connect_in_memory, migrate};
    use crate::models::{NewCategoryRequest, NewTodoRequest};

    async fn setup() -> (SqlitePool, IntegrityCoordinator) {
        let pool = connect_in_memory().await.expect("Failed to create test db");
        migrate(&pool).await.expect("Failed to run migrations");
        let coordinator = IntegrityCoordinator::new(pool.clone());
        (pool, coordinator)
    }

    async fn category(pool: &SqlitePool, name: &str) -> i64 {
        insert_category(
            pool,
            NewCategoryRequest {
                name: name.to_string(),
                color: None,
            },
        )
        .await
        .unwrap()
        .id
    }

    async fn todo(pool: &SqlitePool, title: &str, category_id: i64) -> i64 {
        insert_todo(
            pool,
            NewTodoRequest {
                title: title.to_string(),
                category_id: Some(category_id),
                ..NewTodoRequest::default()
            },
        )
        .await
        .unwrap()
        .todo
        .id
    }

    #[tokio::test]
    async fn test_cascade_reassigns_every_dependent_todo() {
        let (pool, coordinator) = setup().await;
        let work = category(&pool, "Work").await;
        let home = category(&pool, "Home").await;
        todo(&pool, "Report", work).await;
        todo(&pool, "Slides", work).await;
        todo(&pool, "Laundry", home).await;

        let deletion = coordinator.delete_category(work).await.unwrap();
        assert_eq!(
            deletion,
            CategoryDeletion {
                id: work,
                reassigned_todos: 2
            }
        );

        let todos = fetch_todos(&pool).await.unwrap();
        assert!(todos.iter().all(|t| t.todo.category_id != work));
        assert_eq!(todos.iter().filter(|t| t.todo.category_id == 0).count(), 2);
        assert_eq!(todos[2].todo.category_id, home);

        let remaining: Vec<_> = fetch_categories(&pool).await.unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(remaining, vec![home]);
    }

    #[tokio::test]
    async fn test_delete_unreferenced_category_touches_no_todo() {
        let (pool, coordinator) = setup().await;
        let work = category(&pool, "Work").await;
        let home = category(&pool, "Home").await;
        todo(&pool, "Laundry", home).await;
        let before = fetch_todos(&pool).await.unwrap();

        let deletion = coordinator.delete_category(work).await.unwrap();
        assert_eq!(deletion.reassigned_todos, 0);
        assert_eq!(fetch_todos(&pool).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_delete_missing_category_is_not_found() {
        let (_pool, coordinator) = setup().await;

        let err = coordinator.delete_category(9).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { entity: "category", id: 9 }));
    }

    #[tokio::test]
    async fn test_sentinel_cannot_be_deleted() {
        let (pool, coordinator) = setup().await;
        todo(&pool, "Groceries", 0).await;

        let err = coordinator.delete_category(0).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(fetch_todos(&pool).await.unwrap().len(), 1);
    }
}
