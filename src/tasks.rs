//! Task business logic: creation, editing, completion and deletion, always scoped to the
//! authenticated owner.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{Task, TaskStore};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fields posted by the add-task form.
#[derive(Debug, Default, Deserialize)]
pub struct AddTaskForm {
    pub add_task: Option<String>,
    /// Checkbox; any non-empty value means a deadline is wanted.
    pub deadline: Option<String>,
    pub date: Option<String>,
}

/// Fields posted by the edit form.
#[derive(Debug, Deserialize)]
pub struct UpdateTaskForm {
    pub task_id: i64,
    pub update_task: Option<String>,
    pub deadline: Option<String>,
    pub date: Option<String>,
}

/// Forms that only identify a task (delete, toggle, edit).
#[derive(Debug, Deserialize)]
pub struct TaskIdForm {
    pub task_id: i64,
}

/// Values the edit form is pre-filled with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditView {
    pub task_id: i64,
    pub text: String,
    pub deadline: Option<NaiveDate>,
}

/// Validated task content, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskContent {
    pub text: String,
    pub deadline: Option<NaiveDate>,
}

impl TaskContent {
    /// Checks the submitted text and optional deadline against `today`.
    ///
    /// Text is kept exactly as submitted. Only an absent or empty value is rejected, the same
    /// rule the registration form applies to usernames.
    pub fn parse(
        text: Option<&str>,
        wants_deadline: bool,
        date: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self, AppError> {
        let text = text.unwrap_or_default();
        if text.is_empty() {
            return Err(AppError::Validation("task must not be empty".into()));
        }

        Ok(Self {
            text: text.to_string(),
            deadline: parse_deadline(wants_deadline, date, today)?,
        })
    }
}

/// Parses a requested deadline. Today is allowed, any earlier date is rejected.
pub fn parse_deadline(
    wants_deadline: bool,
    date: Option<&str>,
    today: NaiveDate,
) -> Result<Option<NaiveDate>, AppError> {
    if !wants_deadline {
        return Ok(None);
    }

    let date = date
        .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok())
        .ok_or_else(|| {
            AppError::Validation("you have to select a date if you want a deadline".into())
        })?;

    if date < today {
        return Err(AppError::Validation(
            "the deadline date must not be in the past".into(),
        ));
    }

    Ok(Some(date))
}

/// A checkbox counts as ticked when it was submitted with any non-empty value.
pub fn is_checked(field: Option<&str>) -> bool {
    field.map_or(false, |value| !value.is_empty())
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Task operations on behalf of an authenticated user.
#[derive(Clone)]
pub struct TaskService {
    store: TaskStore,
}

impl TaskService {
    pub fn new(store: TaskStore) -> Self {
        Self { store }
    }

    pub async fn list_tasks(&self, user_id: i64) -> Result<Vec<Task>, AppError> {
        Ok(self.store.list_for_owner(user_id).await?)
    }

    pub async fn add_task(&self, user_id: i64, form: &AddTaskForm) -> Result<Task, AppError> {
        let content = TaskContent::parse(
            form.add_task.as_deref(),
            is_checked(form.deadline.as_deref()),
            form.date.as_deref(),
            today(),
        )?;

        let task = self
            .store
            .insert(user_id, &content.text, content.deadline)
            .await?;
        log::info!("User {} added task {}", user_id, task.task_id);
        Ok(task)
    }

    pub async fn delete_task(&self, user_id: i64, task_id: i64) -> Result<(), AppError> {
        self.owned_task(user_id, task_id).await?;

        if !self.store.delete(task_id).await? {
            return Err(task_not_found(task_id));
        }
        log::info!("User {} deleted task {}", user_id, task_id);
        Ok(())
    }

    pub async fn toggle_completion(&self, user_id: i64, task_id: i64) -> Result<Task, AppError> {
        let task = self.owned_task(user_id, task_id).await?;
        let task = self.store.set_completed(task_id, !task.completed).await?;
        log::info!(
            "User {} marked task {} as {}",
            user_id,
            task_id,
            if task.completed { "completed" } else { "not completed" }
        );
        Ok(task)
    }

    /// Reads the task back from storage to pre-fill the edit form.
    pub async fn prepare_edit(&self, user_id: i64, task_id: i64) -> Result<EditView, AppError> {
        let task = self.owned_task(user_id, task_id).await?;
        Ok(EditView {
            task_id: task.task_id,
            text: task.text,
            deadline: task.deadline,
        })
    }

    /// Replaces text and deadline. Completion state and creation time are kept.
    pub async fn update_task(&self, user_id: i64, form: &UpdateTaskForm) -> Result<Task, AppError> {
        let content = TaskContent::parse(
            form.update_task.as_deref(),
            is_checked(form.deadline.as_deref()),
            form.date.as_deref(),
            today(),
        )?;

        self.owned_task(user_id, form.task_id).await?;
        let task = self
            .store
            .update_content(form.task_id, &content.text, content.deadline)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => task_not_found(form.task_id),
                other => other.into(),
            })?;
        log::info!("User {} updated task {}", user_id, task.task_id);
        Ok(task)
    }

    async fn owned_task(&self, user_id: i64, task_id: i64) -> Result<Task, AppError> {
        let task = self
            .store
            .find(task_id)
            .await?
            .ok_or_else(|| task_not_found(task_id))?;

        if task.owner_user_id != user_id {
            log::warn!(
                "User {} attempted to access task {} owned by user {}",
                user_id,
                task_id,
                task.owner_user_id
            );
            return Err(AppError::Forbidden("you can only change your own tasks".into()));
        }
        Ok(task)
    }
}

fn task_not_found(task_id: i64) -> AppError {
    AppError::NotFound(format!("task {} does not exist", task_id))
}
