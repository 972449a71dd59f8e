//! Client state controller.
//!
//! Holds an in-memory mirror of the task list and stats, two independent
//! forms (create, inline edit), and a single overwritten error message.
//! Every mutation re-fetches the full list and stats rather than patching
//! local state; stale responses may overwrite fresher ones, an accepted
//! race for datasets this small.

use super::http::TasksApi;
use crate::api::types::StatsSummary;
use crate::task::{Task, TaskPayload, TaskPriority, TaskStatus};

const FETCH_TASKS_ERROR: &str = "Failed to fetch tasks. Please make sure the backend is running.";
const FETCH_STATS_ERROR: &str = "Failed to fetch stats";
const CREATE_ERROR: &str = "Failed to create task";
const UPDATE_ERROR: &str = "Failed to update task";
const DELETE_ERROR: &str = "Failed to delete task";

/// Field values for the create and inline-edit forms.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            status: TaskStatus::Pending,
            priority: TaskPriority::Medium,
        }
    }
}

impl TaskForm {
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            priority: task.priority,
        }
    }

    pub fn to_payload(&self) -> TaskPayload {
        TaskPayload {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            status: Some(self.status.as_str().to_string()),
            priority: Some(self.priority.as_str().to_string()),
        }
    }
}

pub struct TaskBoard<A: TasksApi> {
    api: A,
    pub tasks: Vec<Task>,
    pub stats: StatsSummary,
    pub loading: bool,
    /// Single human-readable error banner; each failure overwrites it.
    pub error: Option<String>,
    /// Id of the task currently in inline-edit mode, if any.
    pub editing_id: Option<i64>,
    pub form: TaskForm,
    pub edit_form: TaskForm,
}

impl<A: TasksApi> TaskBoard<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            tasks: Vec::new(),
            stats: StatsSummary::default(),
            loading: false,
            error: None,
            editing_id: None,
            form: TaskForm::default(),
            edit_form: TaskForm::default(),
        }
    }

    /// Initial load: fetch list and stats concurrently. `loading` covers the
    /// task-list fetch; the stats outcome does not extend it.
    pub async fn mount(&mut self) {
        self.refresh().await;
    }

    /// Re-fetch both the list and the stats. A failed fetch sets the error
    /// banner and leaves the previous list/stats untouched.
    pub async fn refresh(&mut self) {
        self.loading = true;
        let (tasks, stats) = tokio::join!(self.api.list_tasks(), self.api.stats());

        match tasks {
            Ok(tasks) => {
                self.tasks = tasks;
                self.error = None;
            }
            Err(e) => {
                tracing::error!("Failed to fetch tasks: {}", e);
                self.error = Some(FETCH_TASKS_ERROR.to_string());
            }
        }
        self.loading = false;

        match stats {
            Ok(stats) => self.stats = stats,
            Err(e) => {
                tracing::error!("Failed to fetch stats: {}", e);
                self.error = Some(FETCH_STATS_ERROR.to_string());
            }
        }
    }

    /// Submit the create form. On success the form resets to defaults even
    /// if the follow-up re-fetch fails; on failure it stays as typed.
    pub async fn submit_create(&mut self) {
        match self.api.create_task(&self.form.to_payload()).await {
            Ok(_) => {
                self.refresh().await;
                self.form = TaskForm::default();
            }
            Err(e) => {
                tracing::error!("Failed to create task: {}", e);
                self.error = Some(CREATE_ERROR.to_string());
            }
        }
    }

    /// Enter inline-edit mode for one task, snapshotting its mutable fields.
    /// Only one task can be in edit mode; a second call re-targets it.
    /// Returns false if the id is not in the current list.
    pub fn begin_edit(&mut self, id: i64) -> bool {
        match self.tasks.iter().find(|t| t.id == id) {
            Some(task) => {
                self.edit_form = TaskForm::from_task(task);
                self.editing_id = Some(id);
                true
            }
            None => false,
        }
    }

    /// Save the inline edit. On failure edit mode stays open.
    pub async fn save_edit(&mut self) {
        let Some(id) = self.editing_id else {
            return;
        };

        match self.api.update_task(id, &self.edit_form.to_payload()).await {
            Ok(_) => {
                self.editing_id = None;
                self.refresh().await;
            }
            Err(e) => {
                tracing::error!("Failed to update task: {}", e);
                self.error = Some(UPDATE_ERROR.to_string());
            }
        }
    }

    /// Exit edit mode without calling the API.
    pub fn cancel_edit(&mut self) {
        self.editing_id = None;
    }

    /// Delete a task. `confirmed` is the user's answer to the confirmation
    /// prompt; declining performs no API call.
    pub async fn delete_task(&mut self, id: i64, confirmed: bool) {
        if !confirmed {
            return;
        }

        match self.api.delete_task(id).await {
            Ok(_) => self.refresh().await,
            Err(e) => {
                tracing::error!("Failed to delete task: {}", e);
                self.error = Some(DELETE_ERROR.to_string());
            }
        }
    }
}
