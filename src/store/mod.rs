pub mod sqlite;

pub use sqlite::SqliteTodoStore;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::AppError;
use crate::models::{NewTodoRequest, Todo, UpdateTodoRequest};

/// Emitted after every successful mutation of the collection. Reactive
/// clients subscribe to this feed to know when to re-read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Created { id: String },
    Updated { id: String },
    Deleted { id: String },
    CompletedCleared { deleted: u64 },
}

/// The todo collection's owning component. Everything else reads through
/// this surface and issues operation requests against it.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// All todos, ascending by order (ties broken by creation time).
    async fn list(&self) -> Result<Vec<Todo>, AppError>;

    async fn get(&self, id: &str) -> Result<Option<Todo>, AppError>;

    /// Inserts a new active todo at the end of the list. The title is
    /// trimmed; an empty result is rejected with `InvalidInput`.
    async fn create(&self, req: NewTodoRequest) -> Result<Todo, AppError>;

    /// Merges the provided fields into the record. `NotFound` for unknown ids.
    async fn update(&self, id: &str, req: UpdateTodoRequest) -> Result<Todo, AppError>;

    /// Flips `completed`. `NotFound` for unknown ids.
    async fn toggle(&self, id: &str) -> Result<Todo, AppError>;

    /// Removes the record. Deleting an unknown id is a silent no-op.
    async fn delete(&self, id: &str) -> Result<(), AppError>;

    /// Sets the record's order verbatim, without renumbering the rest.
    /// `NotFound` for unknown ids.
    async fn reorder(&self, id: &str, new_order: i64) -> Result<(), AppError>;

    /// Deletes every completed todo, returning how many were removed.
    async fn clear_completed(&self) -> Result<u64, AppError>;

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;
}
