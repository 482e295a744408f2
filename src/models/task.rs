use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

const TASK_COLUMNS: &str = "task_id, text, completed, owner_user_id, deadline, created_at";

/// Represents a task entity as stored in the database and shown in the task list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier for the task.
    pub task_id: i64,
    /// What needs doing.
    pub text: String,
    /// Whether the task has been marked complete.
    pub completed: bool,
    /// Identifier of the user who owns the task.
    pub owner_user_id: i64,
    /// Optional calendar date the task is due on.
    pub deadline: Option<NaiveDate>,
    /// Timestamp of when the task was created. Never modified.
    pub created_at: DateTime<Utc>,
}

/// Persistence for [`Task`] records.
///
/// The store does not check ownership; callers scope access to the owning user.
#[derive(Clone)]
pub struct TaskStore {
    pool: SqlitePool,
}

impl TaskStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All tasks owned by `owner_user_id`, in insertion order.
    pub async fn list_for_owner(&self, owner_user_id: i64) -> Result<Vec<Task>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE owner_user_id = $1 ORDER BY task_id",
            TASK_COLUMNS
        ))
        .bind(owner_user_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn find(&self, task_id: i64) -> Result<Option<Task>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!("SELECT {} FROM tasks WHERE task_id = $1", TASK_COLUMNS))
            .bind(task_id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn insert(
        &self,
        owner_user_id: i64,
        text: &str,
        deadline: Option<NaiveDate>,
    ) -> Result<Task, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (text, completed, owner_user_id, deadline, created_at)
             VALUES ($1, FALSE, $2, $3, $4)
             RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(text)
        .bind(owner_user_id)
        .bind(deadline)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
    }

    /// Overwrites `text` and `deadline`. Fails with `RowNotFound` for an unknown id.
    pub async fn update_content(
        &self,
        task_id: i64,
        text: &str,
        deadline: Option<NaiveDate>,
    ) -> Result<Task, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET text = $1, deadline = $2 WHERE task_id = $3 RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(text)
        .bind(deadline)
        .bind(task_id)
        .fetch_one(&self.pool)
        .await
    }

    /// Sets the completion flag. Fails with `RowNotFound` for an unknown id.
    pub async fn set_completed(&self, task_id: i64, completed: bool) -> Result<Task, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET completed = $1 WHERE task_id = $2 RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(completed)
        .bind(task_id)
        .fetch_one(&self.pool)
        .await
    }

    /// Deletes the task, returning whether a row was removed.
    pub async fn delete(&self, task_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE task_id = $1")
            .bind(task_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
