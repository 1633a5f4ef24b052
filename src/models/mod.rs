pub mod todo;

pub use todo::{
    Filter, NewTodoRequest, ReorderRequest, Todo, UpdateTodoRequest, active_count, filtered_view,
};
