#![allow(dead_code)]

use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;
use tempfile::TempDir;
use todo_backend::api::ResourceApi;
use todo_backend::db;
use todo_backend::models::{Category, NewCategoryRequest, NewTodoRequest, TodoView};

pub async fn setup_pool() -> SqlitePool {
    let pool = db::connect_in_memory()
        .await
        .expect("Failed to create database");
    db::migrate(&pool).await.expect("Failed to run migrations");
    pool
}

pub async fn setup_api() -> ResourceApi {
    ResourceApi::new(setup_pool().await)
}

/// A file-backed database with several pooled connections, so concurrent
/// callers really contend for SQLite's locks. Keep the `TempDir` alive for
/// as long as the pool is used.
pub async fn setup_shared_api(max_connections: u32) -> (TempDir, ResourceApi) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let options = SqliteConnectOptions::new().filename(dir.path().join("todo.db"));
    let pool = db::connect_with(options, max_connections)
        .await
        .expect("Failed to create database");
    db::migrate(&pool).await.expect("Failed to run migrations");
    (dir, ResourceApi::new(pool))
}

pub async fn create_category(api: &ResourceApi, name: &str, color: &str) -> Category {
    api.create_category(NewCategoryRequest {
        name: name.to_string(),
        color: Some(color.to_string()),
    })
    .await
    .expect("Failed to create category")
}

pub async fn create_todo(
    api: &ResourceApi,
    title: &str,
    description: &str,
    priority: &str,
    category_id: i64,
) -> TodoView {
    api.create_todo(NewTodoRequest {
        title: title.to_string(),
        description: Some(description.to_string()),
        priority: Some(priority.to_string()),
        category_id: Some(category_id),
    })
    .await
    .expect("Failed to create todo")
}
