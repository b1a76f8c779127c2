use crate::database::Database;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{DbErr, QueryResult};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

pub mod api;
pub mod web;

const SELECT_ALL_TASKS: &str = "SELECT taskid, name, description, status, created_at, updated_at \
     FROM tasks ORDER BY created_at DESC, taskid DESC";
const SELECT_TASK_BY_ID: &str = "SELECT taskid, name, description, status, created_at, updated_at \
     FROM tasks WHERE taskid = $1";
const COUNT_TASK_BY_ID: &str = "SELECT COUNT(*) FROM tasks WHERE taskid = $1";
const INSERT_TASK: &str = "INSERT INTO tasks (name, description, status, created_at, updated_at) \
     VALUES ($1, $2, $3, NOW(), NOW()) RETURNING taskid";
const UPDATE_TASK: &str = "UPDATE tasks \
     SET name = $2, description = $3, status = $4, updated_at = NOW() \
     WHERE taskid = $1";
const DELETE_TASK: &str = "DELETE FROM tasks WHERE taskid = $1";

/// A tracked task as stored in the `tasks` table.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Store-generated identifier
    pub id: i64,
    /// Name of the task
    pub name: String,
    /// Optional free-form description
    pub description: Option<String>,
    /// One of `Not Started`, `In Progress` or `Completed`
    pub status: String,
    /// When the task was inserted
    pub created_at: DateTime<Utc>,
    /// When the task was last written
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Maps a `tasks` row to a [`Task`].
    ///
    /// NULL `name`/`status` become empty strings and NULL timestamps become
    /// [`DateTime::<Utc>::MIN_UTC`]. The table forbids both, so either one
    /// is logged as a warning.
    pub fn from_row(row: &QueryResult) -> Result<Self, DbErr> {
        let id: i64 = row.try_get("", "taskid")?;
        Ok(Self {
            id,
            name: row.try_get::<Option<String>>("", "name")?.unwrap_or_default(),
            description: row.try_get("", "description")?,
            status: row
                .try_get::<Option<String>>("", "status")?
                .unwrap_or_default(),
            created_at: timestamp_or_min(row, id, "created_at")?,
            updated_at: timestamp_or_min(row, id, "updated_at")?,
        })
    }
}

fn timestamp_or_min(row: &QueryResult, id: i64, column: &str) -> Result<DateTime<Utc>, DbErr> {
    match row.try_get::<Option<DateTime<Utc>>>("", column)? {
        Some(timestamp) => Ok(timestamp),
        None => {
            tracing::warn!(task_id = id, column, "NULL timestamp, using minimum value");
            Ok(DateTime::<Utc>::MIN_UTC)
        }
    }
}

/// The lifecycle label of a task.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::NotStarted,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    /// Returns the label as stored and sent over the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "Not Started",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a label is not one of [`TaskStatus::ALL`].
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("Status must be one of: Not Started, In Progress, Completed")]
pub struct InvalidStatus;

impl FromStr for TaskStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or(InvalidStatus)
    }
}

/// Validated fields for inserting or updating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInput {
    pub name: String,
    pub description: Option<String>,
    pub status: TaskStatus,
}

/// Error type for task store operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskServiceError {
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// A row that was just written could not be read back.
    #[error("Task with id {0} could not be read back")]
    Vanished(i64),
}

/// Storage operations the task handlers depend on.
///
/// Each method is a single round trip; callers sequence them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Returns every task, newest first.
    async fn list_tasks(&self) -> Result<Vec<Task>, TaskServiceError>;

    /// Returns the task with `id`, if there is one.
    async fn find_task(&self, id: i64) -> Result<Option<Task>, TaskServiceError>;

    /// Returns whether a task with `id` exists.
    async fn task_exists(&self, id: i64) -> Result<bool, TaskServiceError>;

    /// Inserts a task and returns its generated id.
    async fn insert_task(&self, input: TaskInput) -> Result<i64, TaskServiceError>;

    /// Overwrites the mutable fields of task `id` and returns the affected-row count.
    async fn update_task(&self, id: i64, input: TaskInput) -> Result<u64, TaskServiceError>;

    /// Deletes task `id` and returns the affected-row count.
    async fn delete_task(&self, id: i64) -> Result<u64, TaskServiceError>;
}

/// [`TaskRepository`] backed by the `tasks` table.
#[derive(Debug)]
pub struct TaskService {
    db: Database,
}

impl TaskService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TaskRepository for TaskService {
    #[tracing::instrument(skip(self))]
    async fn list_tasks(&self) -> Result<Vec<Task>, TaskServiceError> {
        let rows = self.db.query(SELECT_ALL_TASKS, []).await?;
        let tasks = rows
            .iter()
            .map(Task::from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    #[tracing::instrument(skip(self))]
    async fn find_task(&self, id: i64) -> Result<Option<Task>, TaskServiceError> {
        let rows = self.db.query(SELECT_TASK_BY_ID, [id.into()]).await?;
        let task = rows.first().map(Task::from_row).transpose()?;
        Ok(task)
    }

    #[tracing::instrument(skip(self))]
    async fn task_exists(&self, id: i64) -> Result<bool, TaskServiceError> {
        let count = self
            .db
            .execute_scalar::<i64, _>(COUNT_TASK_BY_ID, [id.into()])
            .await?;
        Ok(count.unwrap_or(0) > 0)
    }

    #[tracing::instrument(skip(self))]
    async fn insert_task(&self, input: TaskInput) -> Result<i64, TaskServiceError> {
        let id = self
            .db
            .execute_insert_and_get_id(
                INSERT_TASK,
                [
                    input.name.into(),
                    input.description.into(),
                    input.status.as_str().into(),
                ],
            )
            .await?;
        tracing::info!(task_id = id, "created task");
        Ok(id)
    }

    #[tracing::instrument(skip(self))]
    async fn update_task(&self, id: i64, input: TaskInput) -> Result<u64, TaskServiceError> {
        let affected = self
            .db
            .execute_non_query(
                UPDATE_TASK,
                [
                    id.into(),
                    input.name.into(),
                    input.description.into(),
                    input.status.as_str().into(),
                ],
            )
            .await?;
        Ok(affected)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_task(&self, id: i64) -> Result<u64, TaskServiceError> {
        let affected = self
            .db
            .execute_non_query(DELETE_TASK, [id.into()])
            .await?;
        tracing::info!(task_id = id, affected, "deleted task");
        Ok(affected)
    }
}
