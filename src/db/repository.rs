use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{NewTodoRequest, Todo, UpdateTodoRequest};

// Ties on position break by creation time.
pub async fn fetch_todos(db: &SqlitePool) -> Result<Vec<Todo>, sqlx::Error> {
    sqlx::query_as::<_, Todo>(
        "SELECT id, title, description, due_date, completed, position, created_at, updated_at \
         FROM todos ORDER BY position ASC, created_at ASC",
    )
    .fetch_all(db)
    .await
}

pub async fn find_todo_by_id(db: &SqlitePool, id: &str) -> Result<Option<Todo>, sqlx::Error> {
    sqlx::query_as::<_, Todo>(
        "SELECT id, title, description, due_date, completed, position, created_at, updated_at \
         FROM todos WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_todo(db: &SqlitePool, req: NewTodoRequest) -> Result<Todo, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    // position is assigned inside the INSERT; concurrent creates serialize
    // on the database rather than racing a separate MAX read.
    sqlx::query(
        r#"
        INSERT INTO todos (id, title, description, due_date, completed, position, created_at, updated_at)
        VALUES (?, ?, ?, ?, 0, (SELECT COALESCE(MAX(position), 0) + 1 FROM todos), ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&req.title)
    .bind(&req.description)
    .bind(&req.due_date)
    .bind(&now)
    .bind(&now)
    .execute(db)
    .await?;

    find_todo_by_id(db, &id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

pub async fn update_todo(
    db: &SqlitePool,
    id: &str,
    req: UpdateTodoRequest,
) -> Result<Option<Todo>, sqlx::Error> {
    let mut current = match find_todo_by_id(db, id).await? {
        Some(t) => t,
        None => return Ok(None),
    };

    if let Some(title) = req.title {
        current.title = title;
    }
    if let Some(description) = req.description {
        current.description = Some(description);
    }
    if let Some(due_date) = req.due_date {
        current.due_date = Some(due_date);
    }
    if let Some(completed) = req.completed {
        current.completed = completed;
    }
    current.updated_at = Utc::now().to_rfc3339();

    sqlx::query(
        "UPDATE todos SET title = ?, description = ?, due_date = ?, completed = ?, updated_at = ? \
         WHERE id = ?",
    )
    .bind(&current.title)
    .bind(&current.description)
    .bind(&current.due_date)
    .bind(current.completed)
    .bind(&current.updated_at)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn toggle_todo(db: &SqlitePool, id: &str) -> Result<Option<Todo>, sqlx::Error> {
    let mut current = match find_todo_by_id(db, id).await? {
        Some(t) => t,
        None => return Ok(None),
    };

    current.completed = !current.completed;
    current.updated_at = Utc::now().to_rfc3339();

    sqlx::query("UPDATE todos SET completed = ?, updated_at = ? WHERE id = ?")
        .bind(current.completed)
        .bind(&current.updated_at)
        .bind(id)
        .execute(db)
        .await?;

    Ok(Some(current))
}

pub async fn delete_todo(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM todos WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn reorder_todo(db: &SqlitePool, id: &str, new_order: i64) -> Result<bool, sqlx::Error> {
    let now = Utc::now().to_rfc3339();
    let result = sqlx::query("UPDATE todos SET position = ?, updated_at = ? WHERE id = ?")
        .bind(new_order)
        .bind(&now)
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn clear_completed(db: &SqlitePool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM todos WHERE completed = 1")
        .execute(db)
        .await?
        .rows_affected();

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create test db");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        pool
    }

    fn new_todo(title: &str) -> NewTodoRequest {
        NewTodoRequest {
            title: title.to_string(),
            description: None,
            due_date: None,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_positions() {
        let pool = setup_test_db().await;

        let first = insert_todo(&pool, new_todo("Buy milk"))
            .await
            .expect("Failed to insert todo");
        let second = insert_todo(&pool, new_todo("Walk dog"))
            .await
            .expect("Failed to insert todo");

        assert_eq!(first.order, 1);
        assert_eq!(second.order, 2);
        assert!(!first.completed);
        assert!(!second.completed);
        assert_eq!(first.created_at, first.updated_at);
    }

    #[tokio::test]
    async fn test_fetch_orders_by_position() {
        let pool = setup_test_db().await;

        insert_todo(&pool, new_todo("first")).await.unwrap();
        let second = insert_todo(&pool, new_todo("second")).await.unwrap();
        insert_todo(&pool, new_todo("third")).await.unwrap();

        // move "second" to the end
        reorder_todo(&pool, &second.id, 10).await.unwrap();

        let todos = fetch_todos(&pool).await.expect("Failed to fetch todos");
        let titles: Vec<&str> = todos.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "third", "second"]);
    }

    #[tokio::test]
    async fn test_position_ties_break_by_creation_time() {
        let pool = setup_test_db().await;

        let a = insert_todo(&pool, new_todo("a")).await.unwrap();
        let b = insert_todo(&pool, new_todo("b")).await.unwrap();

        // collide with a's position; a was created first and stays first
        reorder_todo(&pool, &b.id, a.order).await.unwrap();

        let todos = fetch_todos(&pool).await.unwrap();
        assert_eq!(todos[0].id, a.id);
        assert_eq!(todos[1].id, b.id);
    }

    #[tokio::test]
    async fn test_update_merges_partial_fields() {
        let pool = setup_test_db().await;

        let todo = insert_todo(
            &pool,
            NewTodoRequest {
                title: "Read for 1 hour".to_string(),
                description: Some("any book".to_string()),
                due_date: None,
            },
        )
        .await
        .unwrap();

        let updated = update_todo(
            &pool,
            &todo.id,
            UpdateTodoRequest {
                title: Some("Read for 2 hours".to_string()),
                description: None,
                due_date: Some("2026-09-01T00:00:00+00:00".to_string()),
                completed: None,
            },
        )
        .await
        .expect("Failed to update todo")
        .expect("Todo not found");

        assert_eq!(updated.title, "Read for 2 hours");
        assert_eq!(updated.description.as_deref(), Some("any book"));
        assert_eq!(
            updated.due_date.as_deref(),
            Some("2026-09-01T00:00:00+00:00")
        );
        assert!(!updated.completed);
        assert!(updated.updated_at > updated.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let pool = setup_test_db().await;

        let result = update_todo(
            &pool,
            "no-such-id",
            UpdateTodoRequest {
                title: Some("x".to_string()),
                description: None,
                due_date: None,
                completed: None,
            },
        )
        .await
        .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_state() {
        let pool = setup_test_db().await;

        let todo = insert_todo(&pool, new_todo("10 minutes meditation"))
            .await
            .unwrap();

        let once = toggle_todo(&pool, &todo.id).await.unwrap().unwrap();
        assert!(once.completed);

        let twice = toggle_todo(&pool, &todo.id).await.unwrap().unwrap();
        assert!(!twice.completed);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let pool = setup_test_db().await;

        let todo = insert_todo(&pool, new_todo("Pick up groceries"))
            .await
            .unwrap();

        let first = delete_todo(&pool, &todo.id).await.unwrap();
        let second = delete_todo(&pool, &todo.id).await.unwrap();
        assert!(first);
        assert!(!second);

        let todos = fetch_todos(&pool).await.unwrap();
        assert!(todos.is_empty());
    }

    #[tokio::test]
    async fn test_clear_completed_removes_only_completed() {
        let pool = setup_test_db().await;

        let a = insert_todo(&pool, new_todo("A")).await.unwrap();
        insert_todo(&pool, new_todo("B")).await.unwrap();
        toggle_todo(&pool, &a.id).await.unwrap();

        let deleted = clear_completed(&pool).await.unwrap();
        assert_eq!(deleted, 1);

        let todos = fetch_todos(&pool).await.unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].title, "B");
        assert!(todos.iter().all(|t| !t.completed));

        // nothing completed left, a second pass deletes nothing
        assert_eq!(clear_completed(&pool).await.unwrap(), 0);
    }
}
