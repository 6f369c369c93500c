pub mod category;
pub mod todo;

pub use category::{Category, CategorySummary, NewCategoryRequest, DEFAULT_COLOR, UNCATEGORIZED_ID};
pub use todo::{NewTodo, NewTodoRequest, Priority, Todo, TodoChanges, TodoRow, TodoView, UpdateTodoRequest};
