use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::api::{ApiError, Deleted, Envelope, ListTodosParams};
use crate::models::{Category, NewCategoryRequest, NewTodoRequest, TodoView, UpdateTodoRequest};
use crate::services::CategoryDeletion;
use crate::state::AppState;

type Reply<T> = Result<Json<Envelope<T>>, ApiError>;
type Created<T> = Result<(StatusCode, Json<Envelope<T>>), ApiError>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/categories", get(list_categories).post(create_category))
        .route(
            "/api/categories/{id}",
            get(get_category).delete(delete_category),
        )
        .route("/api/todos", get(list_todos).post(create_todo))
        .route(
            "/api/todos/{id}",
            get(get_todo)
                .put(update_todo)
                .patch(update_todo)
                .delete(delete_todo),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any origin when `origins` is empty, otherwise exactly the listed ones.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([CONTENT_TYPE])
}

async fn health(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("select 1").execute(&state.db).await {
        Ok(_) => StatusCode::OK,
        Err(err) => {
            error!("health check failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

async fn list_todos(
    State(state): State<AppState>,
    params: Result<Query<ListTodosParams>, QueryRejection>,
) -> Reply<Vec<TodoView>> {
    let Query(params) = params?;
    let todos = state.api.list_todos(params).await?;
    Ok(Json(Envelope::ok(todos)))
}

async fn get_todo(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Reply<TodoView> {
    let Path(id) = id?;
    let todo = state.api.get_todo(id).await?;
    Ok(Json(Envelope::ok(todo)))
}

async fn create_todo(
    State(state): State<AppState>,
    req: Result<Json<NewTodoRequest>, JsonRejection>,
) -> Created<TodoView> {
    let Json(req) = req?;
    let todo = state.api.create_todo(req).await?;
    Ok((StatusCode::CREATED, Json(Envelope::ok(todo))))
}

async fn update_todo(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    req: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> Reply<TodoView> {
    let Path(id) = id?;
    let Json(req) = req?;
    let todo = state.api.update_todo(id, req).await?;
    Ok(Json(Envelope::ok(todo)))
}

async fn delete_todo(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Reply<Deleted> {
    let Path(id) = id?;
    let deleted = state.api.delete_todo(id).await?;
    Ok(Json(Envelope::ok(deleted)))
}

async fn list_categories(State(state): State<AppState>) -> Reply<Vec<Category>> {
    let categories = state.api.list_categories().await?;
    Ok(Json(Envelope::ok(categories)))
}

async fn get_category(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Reply<Category> {
    let Path(id) = id?;
    let category = state.api.get_category(id).await?;
    Ok(Json(Envelope::ok(category)))
}

async fn create_category(
    State(state): State<AppState>,
    req: Result<Json<NewCategoryRequest>, JsonRejection>,
) -> Created<Category> {
    let Json(req) = req?;
    let category = state.api.create_category(req).await?;
    Ok((StatusCode::CREATED, Json(Envelope::ok(category))))
}

async fn delete_category(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Reply<CategoryDeletion> {
    let Path(id) = id?;
    let deletion = state.api.delete_category(id).await?;
    Ok(Json(Envelope::ok(deletion)))
}
