use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};
use tracing::{debug, info};

use crate::db::category_repository::category_exists;
use crate::db::timestamp;
use crate::error::{AppError, AppResult};
use crate::models::{NewTodoRequest, TodoRow, TodoView, UNCATEGORIZED_ID, UpdateTodoRequest};

const TODO_SELECT_SQL: &str = r#"
    SELECT
        t.id AS id,
        t.title AS title,
        t.description AS description,
        t.priority AS priority,
        t.completed AS completed,
        t.category_id AS category_id,
        t.created_at AS created_at,
        t.updated_at AS updated_at,
        c.name AS category_name,
        c.color AS category_color
    FROM todos t
    LEFT JOIN categories c ON c.id = t.category_id
"#;

/// All todos with their resolved category, in insertion order.
pub async fn fetch_todos(db: &SqlitePool) -> Result<Vec<TodoView>, sqlx::Error> {
    let sql = format!("{TODO_SELECT_SQL} ORDER BY t.id ASC");
    let rows = sqlx::query_as::<_, TodoRow>(&sql).fetch_all(db).await?;
    Ok(rows.into_iter().map(TodoView::from).collect())
}

pub async fn find_todo<'e>(
    executor: impl SqliteExecutor<'e>,
    id: i64,
) -> Result<Option<TodoView>, sqlx::Error> {
    let sql = format!("{TODO_SELECT_SQL} WHERE t.id = ?1");
    let row = sqlx::query_as::<_, TodoRow>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(row.map(TodoView::from))
}

pub async fn get_todo(db: &SqlitePool, id: i64) -> AppResult<TodoView> {
    find_todo(db, id)
        .await?
        .ok_or_else(|| AppError::todo_not_found(id))
}

pub async fn insert_todo(db: &SqlitePool, req: NewTodoRequest) -> AppResult<TodoView> {
    let new = req.validate()?;
    let now = timestamp();

    // The insert goes first so the category lookup runs under the write lock.
    let mut tx = db.begin().await?;
    let id = sqlx::query(
        r#"
        INSERT INTO todos
            (title, description, priority, completed, category_id, created_at, updated_at)
        VALUES (?1, ?2, ?3, 0, ?4, ?5, ?5)
        "#,
    )
    .bind(&new.title)
    .bind(&new.description)
    .bind(new.priority)
    .bind(new.category_id)
    .bind(&now)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    ensure_category(&mut tx, new.category_id).await?;

    let todo = find_todo(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("todo {id} vanished inside its own transaction")))?;
    tx.commit().await?;

    info!(todo_id = id, category_id = new.category_id, priority = %new.priority, "todo created");
    Ok(todo)
}

pub async fn update_todo(db: &SqlitePool, id: i64, req: UpdateTodoRequest) -> AppResult<TodoView> {
    let changes = req.validate()?;
    if changes.is_empty() {
        return get_todo(db, id).await;
    }

    let mut tx = db.begin().await?;
    let updated = sqlx::query(
        r#"
        UPDATE todos
        SET title = COALESCE(?1, title),
            description = COALESCE(?2, description),
            priority = COALESCE(?3, priority),
            completed = COALESCE(?4, completed),
            category_id = COALESCE(?5, category_id),
            updated_at = ?6
        WHERE id = ?7
        "#,
    )
    .bind(changes.title.as_deref())
    .bind(changes.description.as_deref())
    .bind(changes.priority)
    .bind(changes.completed)
    .bind(changes.category_id)
    .bind(timestamp())
    .bind(id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if updated == 0 {
        return Err(AppError::todo_not_found(id));
    }
    if let Some(category_id) = changes.category_id {
        ensure_category(&mut tx, category_id).await?;
    }

    let todo = find_todo(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::todo_not_found(id))?;
    tx.commit().await?;

    info!(todo_id = id, completed = todo.todo.completed, "todo updated");
    Ok(todo)
}

pub async fn delete_todo(db: &SqlitePool, id: i64) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM todos WHERE id = ?1")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    if result == 0 {
        return Err(AppError::todo_not_found(id));
    }

    info!(todo_id = id, "todo deleted");
    Ok(())
}

/// Moves every todo of `category_id` to the uncategorized bucket. Returns the
/// number of todos touched.
pub async fn detach_category(conn: &mut SqliteConnection, category_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE todos
        SET category_id = ?1,
            updated_at = ?2
        WHERE category_id = ?3
        "#,
    )
    .bind(UNCATEGORIZED_ID)
    .bind(timestamp())
    .bind(category_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

async fn ensure_category(conn: &mut SqliteConnection, category_id: i64) -> AppResult<()> {
    if category_id == UNCATEGORIZED_ID || category_exists(&mut *conn, category_id).await? {
        return Ok(());
    }
    debug!(category_id, "rejecting dangling category reference");
    Err(AppError::validation(format!("category {category_id} does not exist")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::category_repository::insert_category;
    use crate::db::{connect_in_memory, migrate};
    use crate::models::{NewCategoryRequest, Priority};

    async fn setup_test_db() -> SqlitePool {
        let pool = connect_in_memory().await.expect("Failed to create test db");
        migrate(&pool).await.expect("Failed to run migrations");
        pool
    }

    async fn work_category(pool: &SqlitePool) -> i64 {
        insert_category(
            pool,
            NewCategoryRequest {
                name: "Work".to_string(),
                color: Some("#ff0000".to_string()),
            },
        )
        .await
        .expect("Failed to insert category")
        .id
    }

    fn todo(title: &str, category_id: i64) -> NewTodoRequest {
        NewTodoRequest {
            title: title.to_string(),
            description: None,
            priority: Some("high".to_string()),
            category_id: Some(category_id),
        }
    }

    #[tokio::test]
    async fn test_insert_and_fetch_todo() {
        let pool = setup_test_db().await;
        let work = work_category(&pool).await;

        let created = insert_todo(&pool, todo("Report", work))
            .await
            .expect("Failed to insert todo");

        assert_eq!(created.todo.id, 1);
        assert_eq!(created.todo.priority, Priority::High);
        assert!(!created.todo.completed);
        assert_eq!(created.category.name, "Work");
        assert_eq!(created.category.color, "#ff0000");

        let todos = fetch_todos(&pool).await.expect("Failed to fetch todos");
        assert_eq!(todos, vec![created]);
    }

    #[tokio::test]
    async fn test_insert_with_dangling_category_stores_nothing() {
        let pool = setup_test_db().await;

        let err = insert_todo(&pool, todo("Report", 42)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(fetch_todos(&pool).await.unwrap().is_empty());

        // The rolled back insert must not burn an id either.
        let created = insert_todo(&pool, todo("Report", 0)).await.unwrap();
        assert_eq!(created.todo.id, 1);
    }

    #[tokio::test]
    async fn test_uncategorized_todo_resolves_to_sentinel() {
        let pool = setup_test_db().await;

        let created = insert_todo(&pool, todo("Groceries", 0)).await.unwrap();
        assert_eq!(created.todo.category_id, 0);
        assert_eq!(created.category, crate::models::CategorySummary::uncategorized());
    }

    #[tokio::test]
    async fn test_update_todo_is_sparse() {
        let pool = setup_test_db().await;
        let work = work_category(&pool).await;
        let created = insert_todo(&pool, todo("Report", work)).await.unwrap();

        let updated = update_todo(&pool, created.todo.id, UpdateTodoRequest::completed(true))
            .await
            .expect("Failed to update todo");

        assert!(updated.todo.completed);
        assert_eq!(updated.todo.title, created.todo.title);
        assert_eq!(updated.todo.description, created.todo.description);
        assert_eq!(updated.todo.priority, created.todo.priority);
        assert_eq!(updated.todo.category_id, created.todo.category_id);
        assert_eq!(updated.todo.created_at, created.todo.created_at);
    }

    #[tokio::test]
    async fn test_update_rejects_dangling_category_and_keeps_record() {
        let pool = setup_test_db().await;
        let created = insert_todo(&pool, todo("Report", 0)).await.unwrap();

        let req = UpdateTodoRequest {
            title: Some("Renamed".to_string()),
            category_id: Some(7),
            ..UpdateTodoRequest::default()
        };
        let err = update_todo(&pool, created.todo.id, req).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let current = get_todo(&pool, created.todo.id).await.unwrap();
        assert_eq!(current, created);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_todo() {
        let pool = setup_test_db().await;

        let err = update_todo(&pool, 5, UpdateTodoRequest::completed(true))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { entity: "todo", id: 5 }));

        let err = delete_todo(&pool, 5).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { entity: "todo", id: 5 }));
    }

    #[tokio::test]
    async fn test_detach_category_only_touches_its_todos() {
        let pool = setup_test_db().await;
        let work = work_category(&pool).await;
        insert_todo(&pool, todo("Report", work)).await.unwrap();
        insert_todo(&pool, todo("Slides", work)).await.unwrap();
        insert_todo(&pool, todo("Groceries", 0)).await.unwrap();

        let mut conn = pool.acquire().await.unwrap();
        assert_eq!(detach_category(&mut conn, work).await.unwrap(), 2);
        assert_eq!(detach_category(&mut conn, work).await.unwrap(), 0);
        drop(conn);

        let todos = fetch_todos(&pool).await.unwrap();
        assert!(todos.iter().all(|t| t.todo.category_id == 0));
    }
}
