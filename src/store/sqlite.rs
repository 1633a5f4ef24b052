use async_trait::async_trait;
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tracing::debug;

use crate::db::repository;
use crate::error::AppError;
use crate::models::{NewTodoRequest, Todo, UpdateTodoRequest};
use crate::store::{ChangeEvent, TodoStore};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

pub struct SqliteTodoStore {
    db: SqlitePool,
    changes: broadcast::Sender<ChangeEvent>,
}

impl SqliteTodoStore {
    pub fn new(db: SqlitePool) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { db, changes }
    }

    fn publish(&self, event: ChangeEvent) {
        debug!(?event, "publishing change");
        // send only fails when no subscriber is listening
        let _ = self.changes.send(event);
    }
}

#[async_trait]
impl TodoStore for SqliteTodoStore {
    async fn list(&self) -> Result<Vec<Todo>, AppError> {
        Ok(repository::fetch_todos(&self.db).await?)
    }

    async fn get(&self, id: &str) -> Result<Option<Todo>, AppError> {
        Ok(repository::find_todo_by_id(&self.db, id).await?)
    }

    async fn create(&self, req: NewTodoRequest) -> Result<Todo, AppError> {
        let title = req.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::InvalidInput(
                "title must not be empty".to_string(),
            ));
        }

        let todo = repository::insert_todo(&self.db, NewTodoRequest { title, ..req }).await?;
        self.publish(ChangeEvent::Created {
            id: todo.id.clone(),
        });
        Ok(todo)
    }

    async fn update(&self, id: &str, req: UpdateTodoRequest) -> Result<Todo, AppError> {
        let todo = repository::update_todo(&self.db, id, req)
            .await?
            .ok_or(AppError::NotFound)?;
        self.publish(ChangeEvent::Updated { id: id.to_string() });
        Ok(todo)
    }

    async fn toggle(&self, id: &str) -> Result<Todo, AppError> {
        let todo = repository::toggle_todo(&self.db, id)
            .await?
            .ok_or(AppError::NotFound)?;
        self.publish(ChangeEvent::Updated { id: id.to_string() });
        Ok(todo)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let removed = repository::delete_todo(&self.db, id).await?;
        if removed {
            self.publish(ChangeEvent::Deleted { id: id.to_string() });
        }
        Ok(())
    }

    async fn reorder(&self, id: &str, new_order: i64) -> Result<(), AppError> {
        let touched = repository::reorder_todo(&self.db, id, new_order).await?;
        if !touched {
            return Err(AppError::NotFound);
        }
        self.publish(ChangeEvent::Updated { id: id.to_string() });
        Ok(())
    }

    async fn clear_completed(&self) -> Result<u64, AppError> {
        let deleted = repository::clear_completed(&self.db).await?;
        if deleted > 0 {
            self.publish(ChangeEvent::CompletedCleared { deleted });
        }
        Ok(deleted)
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }
}
