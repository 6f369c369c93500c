use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};
use tracing::info;

use crate::db::timestamp;
use crate::error::{AppError, AppResult};
use crate::models::{Category, NewCategoryRequest};

pub async fn fetch_categories(db: &SqlitePool) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "SELECT id, name, color, created_at, updated_at FROM categories ORDER BY id ASC",
    )
    .fetch_all(db)
    .await
}

pub async fn find_category<'e>(
    executor: impl SqliteExecutor<'e>,
    id: i64,
) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "SELECT id, name, color, created_at, updated_at FROM categories WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn get_category(db: &SqlitePool, id: i64) -> AppResult<Category> {
    find_category(db, id)
        .await?
        .ok_or_else(|| AppError::category_not_found(id))
}

pub async fn category_exists<'e>(
    executor: impl SqliteExecutor<'e>,
    id: i64,
) -> Result<bool, sqlx::Error> {
    let found: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?1)")
        .bind(id)
        .fetch_one(executor)
        .await?;
    Ok(found != 0)
}

pub async fn insert_category(db: &SqlitePool, req: NewCategoryRequest) -> AppResult<Category> {
    let color = req.validate()?;
    let now = timestamp();

    let id = sqlx::query(
        r#"
        INSERT INTO categories (name, color, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?3)
        "#,
    )
    .bind(&req.name)
    .bind(&color)
    .bind(&now)
    .execute(db)
    .await?
    .last_insert_rowid();

    info!(category_id = id, name = %req.name, "category created");

    Ok(Category {
        id,
        name: req.name,
        color,
        created_at: now.clone(),
        updated_at: now,
    })
}

/// Removes the row only. Dependent todos are the caller's business, see
/// `services::integrity`.
pub async fn delete_category_row(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    Ok(result > 0)
}
