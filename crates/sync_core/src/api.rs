use reqwest::Client;
use shared::{
    domain::{Project, ProjectId, Task, TaskId, TaskList},
    error::{ApiError, ErrorCode},
    protocol::{NewList, NewProject, NewTask, ReorderRequest, Stats, TaskPatch},
};

use crate::error::SyncError;

/// Typed client for the request/response API mounted under `{base}/api`.
/// All mutations travel through here; the push channel is receive-only.
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{path}", self.base_url)
    }

    /// Maps non-2xx responses to `SyncError::Rejected`, pulling the message
    /// out of the server's `{"detail": ...}` body when it has one.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, SyncError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let code = ErrorCode::from_status(status.as_u16());
        let message = match response.json::<ApiError>().await {
            Ok(body) => body.detail,
            Err(_) => status.to_string(),
        };
        Err(SyncError::Rejected { code, message })
    }

    /// Project-less tasks when `project_id` is `None`, the project's tasks
    /// otherwise; the server returns them sorted by position.
    pub async fn list_tasks(&self, project_id: Option<&ProjectId>) -> Result<Vec<Task>, SyncError> {
        let mut request = self.http.get(self.url("/tasks"));
        if let Some(id) = project_id {
            request = request.query(&[("project_id", id.as_str())]);
        }
        let response = Self::check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    pub async fn create_task(&self, task: &NewTask) -> Result<Task, SyncError> {
        let response = Self::check(self.http.post(self.url("/tasks")).json(task).send().await?)
            .await?;
        Ok(response.json().await?)
    }

    pub async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, SyncError> {
        let response = Self::check(
            self.http
                .put(self.url(&format!("/tasks/{id}")))
                .json(patch)
                .send()
                .await?,
        )
        .await?;
        Ok(response.json().await?)
    }

    pub async fn delete_task(&self, id: &TaskId) -> Result<(), SyncError> {
        Self::check(
            self.http
                .delete(self.url(&format!("/tasks/{id}")))
                .send()
                .await?,
        )
        .await?;
        Ok(())
    }

    /// The server acknowledges with a plain message; the authoritative task
    /// arrives as a `task_moved` push event.
    pub async fn reorder(&self, request: &ReorderRequest) -> Result<(), SyncError> {
        Self::check(
            self.http
                .post(self.url("/tasks/reorder"))
                .json(request)
                .send()
                .await?,
        )
        .await?;
        Ok(())
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>, SyncError> {
        let response = Self::check(self.http.get(self.url("/projects")).send().await?).await?;
        Ok(response.json().await?)
    }

    pub async fn create_project(&self, project: &NewProject) -> Result<Project, SyncError> {
        let response = Self::check(
            self.http
                .post(self.url("/projects"))
                .json(project)
                .send()
                .await?,
        )
        .await?;
        Ok(response.json().await?)
    }

    pub async fn get_project(&self, id: &ProjectId) -> Result<Project, SyncError> {
        let response = Self::check(
            self.http
                .get(self.url(&format!("/projects/{id}")))
                .send()
                .await?,
        )
        .await?;
        Ok(response.json().await?)
    }

    pub async fn delete_project(&self, id: &ProjectId) -> Result<(), SyncError> {
        Self::check(
            self.http
                .delete(self.url(&format!("/projects/{id}")))
                .send()
                .await?,
        )
        .await?;
        Ok(())
    }

    pub async fn project_lists(&self, id: &ProjectId) -> Result<Vec<TaskList>, SyncError> {
        let response = Self::check(
            self.http
                .get(self.url(&format!("/projects/{id}/lists")))
                .send()
                .await?,
        )
        .await?;
        Ok(response.json().await?)
    }

    pub async fn create_list(&self, id: &ProjectId, list: &NewList) -> Result<TaskList, SyncError> {
        let response = Self::check(
            self.http
                .post(self.url(&format!("/projects/{id}/lists")))
                .json(list)
                .send()
                .await?,
        )
        .await?;
        Ok(response.json().await?)
    }

    pub async fn stats(&self) -> Result<Stats, SyncError> {
        let response = Self::check(self.http.get(self.url("/stats")).send().await?).await?;
        Ok(response.json().await?)
    }
}
