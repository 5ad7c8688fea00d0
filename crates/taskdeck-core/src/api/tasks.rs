//! Task endpoints (bearer-authenticated CRUD).

use reqwest::Method;

use super::{ApiClient, ApiOutcome};
use crate::tasks::{Task, TaskDraft};

const TASKS_PATH: &str = "/tasks";

fn task_path(id: i64) -> String {
    format!("{TASKS_PATH}/{id}")
}

impl ApiClient {
    /// `GET /tasks`: the full task list for the current session.
    pub async fn list_tasks(&self) -> ApiOutcome<Vec<Task>> {
        self.send_authed::<(), _>(Method::GET, TASKS_PATH, None)
            .await
    }

    /// `POST /tasks`: returns the server-assigned task.
    pub async fn create_task(&self, draft: &TaskDraft) -> ApiOutcome<Task> {
        self.send_authed(Method::POST, TASKS_PATH, Some(draft))
            .await
    }

    /// `PUT /tasks/{id}`: returns the replacement entry.
    pub async fn update_task(&self, id: i64, draft: &TaskDraft) -> ApiOutcome<Task> {
        self.send_authed(Method::PUT, &task_path(id), Some(draft))
            .await
    }

    /// `DELETE /tasks/{id}`: any 2xx means gone.
    pub async fn delete_task(&self, id: i64) -> ApiOutcome<()> {
        self.send_authed_unit::<()>(Method::DELETE, &task_path(id), None)
            .await
    }
}
