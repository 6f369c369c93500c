pub mod integrity;
pub mod query;

pub use integrity::{CategoryDeletion, IntegrityCoordinator};
pub use query::{QueryEngine, TodoFilter, TodoOrder};
