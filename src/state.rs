use sqlx::SqlitePool;

use crate::api::ResourceApi;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub api: ResourceApi,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            api: ResourceApi::new(db.clone()),
            db,
        }
    }
}
