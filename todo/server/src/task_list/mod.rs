use crate::store::{Document, DocumentStore, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use utoipa::ToSchema;

pub mod api;
pub mod web;

/// A single to-do item, owned by exactly one [`TaskList`].
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque identifier, unique within the owning list
    id: String,
    /// What needs to be done
    description: String,
    /// Whether the task has been done
    completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(description: String) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            description,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// A titled, ordered collection of tasks.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskList {
    /// Opaque identifier, unique within the store
    id: String,
    /// Display title of the list
    title: String,
    /// Tasks in insertion order
    tasks: Vec<Task>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TaskList {
    pub fn new(title: String) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            tasks: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// A list is completed when it has at least one task and every task is done.
    pub fn is_completed(&self) -> bool {
        !self.tasks.is_empty() && self.tasks.iter().all(|task| task.completed)
    }

    /// Number of completed tasks in the list.
    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.completed).count()
    }

    /// Appends a new, incomplete task and returns it.
    pub fn push_task(&mut self, description: String) -> &Task {
        let task = Task::new(description);
        self.updated_at = task.created_at;
        self.tasks.push(task);
        &self.tasks[self.tasks.len() - 1]
    }

    fn task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == task_id)
    }
}

/// Error returned when a filter status string is not recognised.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("Invalid status: {0}. Must be one of: all, completed, pending")]
pub struct InvalidFilterStatus(pub String);

/// Which task lists to return when filtering.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FilterStatus {
    #[default]
    All,
    /// Non-empty lists whose tasks are all completed
    Completed,
    /// Every list that is not completed, including empty ones
    Pending,
}

impl FilterStatus {
    pub const VALUES: [FilterStatus; 3] = [
        FilterStatus::All,
        FilterStatus::Completed,
        FilterStatus::Pending,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterStatus::All => "all",
            FilterStatus::Completed => "completed",
            FilterStatus::Pending => "pending",
        }
    }

    /// Returns whether `task_list` belongs in the result for this status.
    pub fn matches(&self, task_list: &TaskList) -> bool {
        match self {
            FilterStatus::All => true,
            FilterStatus::Completed => task_list.is_completed(),
            FilterStatus::Pending => !task_list.is_completed(),
        }
    }
}

impl fmt::Display for FilterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterStatus {
    type Err = InvalidFilterStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterStatus::VALUES
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| InvalidFilterStatus(s.to_string()))
    }
}

/// Error type for TaskListService operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskListServiceError {
    /// A required text field was missing or blank.
    #[error("{0} is required")]
    MissingField(&'static str),
    /// No task list with the given ID exists.
    #[error("Task list with ID {0} not found")]
    TaskListNotFound(String),
    /// The task list exists but holds no task with the given ID.
    #[error("Task with ID {task_id} not found in task list {list_id}")]
    TaskNotFound { list_id: String, task_id: String },
    /// Reading or writing the data file failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Task list operations over a [`DocumentStore`].
///
/// Every operation loads the whole document, works on it in memory and,
/// for mutations, writes the whole document back. Mutations are serialized
/// through a single lock so concurrent requests cannot lose each other's
/// writes.
pub struct TaskListService {
    store: Arc<dyn DocumentStore>,
    write_lock: Mutex<()>,
}

impl TaskListService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Retrieves all task lists in stored order.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_task_lists(&self) -> Result<Vec<TaskList>, TaskListServiceError> {
        let document = self.store.load().await?;
        Ok(document.task_lists)
    }

    /// Retrieves a task list by its ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_task_list_by_id(&self, id: &str) -> Result<TaskList, TaskListServiceError> {
        self.store
            .load()
            .await?
            .task_lists
            .into_iter()
            .find(|task_list| task_list.id == id)
            .ok_or_else(|| TaskListServiceError::TaskListNotFound(id.to_string()))
    }

    /// Creates a new, empty task list.
    ///
    /// # Arguments
    ///
    /// * `title` - The title of the new list. Must not be blank.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `TaskList` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn create_task_list(&self, title: String) -> Result<TaskList, TaskListServiceError> {
        let title = required(title, "Title")?;
        self.modify(|document| {
            let task_list = TaskList::new(title);
            document.task_lists.push(task_list.clone());
            Ok(task_list)
        })
        .await
    }

    /// Renames a task list.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task list to rename.
    /// * `title` - The new title. Must not be blank.
    ///
    /// # Returns
    ///
    /// A `Result` containing the updated `TaskList` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn update_task_list(
        &self,
        id: &str,
        title: String,
    ) -> Result<TaskList, TaskListServiceError> {
        let title = required(title, "Title")?;
        self.modify(|document| {
            let task_list = find_task_list_mut(document, id)?;
            task_list.title = title;
            task_list.updated_at = Utc::now();
            Ok(task_list.clone())
        })
        .await
    }

    /// Deletes a task list together with all of its tasks.
    #[tracing::instrument(skip(self))]
    pub async fn delete_task_list(&self, id: &str) -> Result<(), TaskListServiceError> {
        self.modify(|document| {
            let initial_len = document.task_lists.len();
            document.task_lists.retain(|task_list| task_list.id != id);
            if document.task_lists.len() == initial_len {
                return Err(TaskListServiceError::TaskListNotFound(id.to_string()));
            }
            Ok(())
        })
        .await
    }

    /// Retrieves the task lists matching `status`, in stored order.
    #[tracing::instrument(skip(self))]
    pub async fn filter_task_lists(
        &self,
        status: FilterStatus,
    ) -> Result<Vec<TaskList>, TaskListServiceError> {
        let document = self.store.load().await?;
        Ok(document
            .task_lists
            .into_iter()
            .filter(|task_list| status.matches(task_list))
            .collect())
    }

    /// Appends a new task to a task list.
    ///
    /// # Arguments
    ///
    /// * `list_id` - The ID of the task list to add to.
    /// * `description` - The task description. Must not be blank.
    ///
    /// # Returns
    ///
    /// A `Result` containing the updated `TaskList` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn add_task(
        &self,
        list_id: &str,
        description: String,
    ) -> Result<TaskList, TaskListServiceError> {
        let description = required(description, "Description")?;
        self.modify(|document| {
            let task_list = find_task_list_mut(document, list_id)?;
            task_list.push_task(description);
            Ok(task_list.clone())
        })
        .await
    }

    /// Changes the description of a task.
    #[tracing::instrument(skip(self))]
    pub async fn update_task(
        &self,
        list_id: &str,
        task_id: &str,
        description: String,
    ) -> Result<TaskList, TaskListServiceError> {
        let description = required(description, "Description")?;
        self.modify_task(list_id, task_id, |task| task.description = description)
            .await
    }

    /// Removes a task from its list.
    #[tracing::instrument(skip(self))]
    pub async fn delete_task(
        &self,
        list_id: &str,
        task_id: &str,
    ) -> Result<TaskList, TaskListServiceError> {
        self.modify(|document| {
            let task_list = find_task_list_mut(document, list_id)?;
            let initial_len = task_list.tasks.len();
            task_list.tasks.retain(|task| task.id != task_id);
            if task_list.tasks.len() == initial_len {
                return Err(task_not_found(list_id, task_id));
            }
            task_list.updated_at = Utc::now();
            Ok(task_list.clone())
        })
        .await
    }

    /// Flips the completion flag of a task.
    #[tracing::instrument(skip(self))]
    pub async fn toggle_task_completion(
        &self,
        list_id: &str,
        task_id: &str,
    ) -> Result<TaskList, TaskListServiceError> {
        self.modify_task(list_id, task_id, |task| task.completed = !task.completed)
            .await
    }

    /// Applies `change` to one task and bumps the timestamps of the task and its list.
    async fn modify_task(
        &self,
        list_id: &str,
        task_id: &str,
        change: impl FnOnce(&mut Task),
    ) -> Result<TaskList, TaskListServiceError> {
        self.modify(|document| {
            let task_list = find_task_list_mut(document, list_id)?;
            let now = Utc::now();
            let task = task_list
                .task_mut(task_id)
                .ok_or_else(|| task_not_found(list_id, task_id))?;
            change(task);
            task.updated_at = now;
            task_list.updated_at = now;
            Ok(task_list.clone())
        })
        .await
    }

    /// Runs one load-mutate-save cycle under the write lock.
    ///
    /// Nothing is written when `change` fails.
    async fn modify<T>(
        &self,
        change: impl FnOnce(&mut Document) -> Result<T, TaskListServiceError>,
    ) -> Result<T, TaskListServiceError> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.store.load().await?;
        let outcome = change(&mut document)?;
        self.store.save(&document).await?;
        Ok(outcome)
    }
}

fn required(value: String, field: &'static str) -> Result<String, TaskListServiceError> {
    if value.trim().is_empty() {
        return Err(TaskListServiceError::MissingField(field));
    }
    Ok(value)
}

fn find_task_list_mut<'a>(
    document: &'a mut Document,
    id: &str,
) -> Result<&'a mut TaskList, TaskListServiceError> {
    document
        .task_lists
        .iter_mut()
        .find(|task_list| task_list.id == id)
        .ok_or_else(|| TaskListServiceError::TaskListNotFound(id.to_string()))
}

fn task_not_found(list_id: &str, task_id: &str) -> TaskListServiceError {
    TaskListServiceError::TaskNotFound {
        list_id: list_id.to_string(),
        task_id: task_id.to_string(),
    }
}
