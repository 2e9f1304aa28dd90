use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response, multipart};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::models::{
    AiAnalysisRequest, AiAnalysisResponse, AiChatRequest, AiExchange, ChecklistItem,
    ChecklistItemCreate, ChecklistItemUpdate, Phase, PhaseTasks, PhasesResponse, Project,
    ProjectCreate, ProjectUpdate, Rejection, RejectionCreate, RejectionUpdate, Task, TaskCreate,
    TaskUpdate, TasksByPhaseResponse,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("server error ({code}): {detail}")]
    Api { code: u16, detail: String },
    #[error("failed to read file for upload: {0}")]
    Upload(String),
}

/// Error body shape used by the backend for non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Blocking client for the submission-tracking backend. One instance is
/// shared for the lifetime of the app; all calls are request/response on
/// the caller's thread.
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// Map a non-success response onto the error taxonomy, pulling the
    /// backend's `detail` message out of the body when present.
    fn check(resp: Response) -> Result<Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let detail = resp
            .json::<ErrorBody>()
            .map(|b| b.detail)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("request failed").to_string());
        match status {
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(detail)),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(ApiError::Validation(detail))
            }
            _ => Err(ApiError::Api { code: status.as_u16(), detail }),
        }
    }

    // ----- projects -----

    pub fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        let resp = self.http.get(self.url("/projects")).send()?;
        Ok(Self::check(resp)?.json()?)
    }

    pub fn create_project(&self, input: &ProjectCreate) -> Result<Project, ApiError> {
        if input.name.trim().is_empty() {
            return Err(ApiError::Validation("project name is required".to_string()));
        }
        let resp = self.http.post(self.url("/projects")).json(input).send()?;
        Ok(Self::check(resp)?.json()?)
    }

    pub fn get_project(&self, id: &str) -> Result<Project, ApiError> {
        let resp = self.http.get(self.url(&format!("/projects/{}", id))).send()?;
        Ok(Self::check(resp)?.json()?)
    }

    pub fn update_project(&self, id: &str, input: &ProjectUpdate) -> Result<Project, ApiError> {
        let resp = self
            .http
            .put(self.url(&format!("/projects/{}", id)))
            .json(input)
            .send()?;
        Ok(Self::check(resp)?.json()?)
    }

    pub fn delete_project(&self, id: &str) -> Result<(), ApiError> {
        let resp = self.http.delete(self.url(&format!("/projects/{}", id))).send()?;
        Self::check(resp)?;
        Ok(())
    }

    /// `PATCH /projects/{id}/schedule` with ISO-8601 query parameters.
    pub fn update_schedule(
        &self,
        id: &str,
        start_date: Option<DateTime<Utc>>,
        publish_date: Option<DateTime<Utc>>,
    ) -> Result<Project, ApiError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(start) = start_date {
            query.push(("start_date", start.to_rfc3339()));
        }
        if let Some(publish) = publish_date {
            query.push(("publish_date", publish.to_rfc3339()));
        }
        let resp = self
            .http
            .patch(self.url(&format!("/projects/{}/schedule", id)))
            .query(&query)
            .send()?;
        Ok(Self::check(resp)?.json()?)
    }

    pub fn generate_default_tasks(&self, id: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.url(&format!("/projects/{}/generate-default-tasks", id)))
            .send()?;
        Self::check(resp)?;
        Ok(())
    }

    pub fn generate_default_checklist(&self, id: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.url(&format!("/projects/{}/generate-default-checklist", id)))
            .send()?;
        Self::check(resp)?;
        Ok(())
    }

    // ----- tasks -----

    pub fn project_tasks(&self, project_id: &str) -> Result<Vec<PhaseTasks>, ApiError> {
        let resp = self
            .http
            .get(self.url(&format!("/projects/{}/tasks", project_id)))
            .send()?;
        let body: TasksByPhaseResponse = Self::check(resp)?.json()?;
        Ok(body.tasks_by_phase)
    }

    pub fn phases(&self) -> Result<Vec<Phase>, ApiError> {
        let resp = self.http.get(self.url("/phases")).send()?;
        let body: PhasesResponse = Self::check(resp)?.json()?;
        Ok(body.phases)
    }

    pub fn create_task(&self, input: &TaskCreate) -> Result<Task, ApiError> {
        if input.title.trim().is_empty() {
            return Err(ApiError::Validation("task title is required".to_string()));
        }
        let resp = self.http.post(self.url("/tasks")).json(input).send()?;
        Ok(Self::check(resp)?.json()?)
    }

    pub fn update_task(&self, id: &str, input: &TaskUpdate) -> Result<Task, ApiError> {
        let resp = self
            .http
            .put(self.url(&format!("/tasks/{}", id)))
            .json(input)
            .send()?;
        Ok(Self::check(resp)?.json()?)
    }

    pub fn delete_task(&self, id: &str) -> Result<(), ApiError> {
        let resp = self.http.delete(self.url(&format!("/tasks/{}", id))).send()?;
        Self::check(resp)?;
        Ok(())
    }

    pub fn set_task_completed(&self, id: &str, completed: bool) -> Result<Task, ApiError> {
        let resp = self
            .http
            .patch(self.url(&format!("/tasks/{}/complete", id)))
            .query(&[("completed", completed)])
            .send()?;
        Ok(Self::check(resp)?.json()?)
    }

    pub fn set_task_memo(&self, id: &str, memo: &str) -> Result<Task, ApiError> {
        let resp = self
            .http
            .patch(self.url(&format!("/tasks/{}/memo", id)))
            .query(&[("memo", memo)])
            .send()?;
        Ok(Self::check(resp)?.json()?)
    }

    // ----- checklist -----

    pub fn checklist(&self, project_id: &str) -> Result<Vec<ChecklistItem>, ApiError> {
        let resp = self
            .http
            .get(self.url("/checklist"))
            .query(&[("project_id", project_id)])
            .send()?;
        Ok(Self::check(resp)?.json()?)
    }

    pub fn create_checklist_item(
        &self,
        input: &ChecklistItemCreate,
    ) -> Result<ChecklistItem, ApiError> {
        if input.item_name.trim().is_empty() {
            return Err(ApiError::Validation("item name is required".to_string()));
        }
        let resp = self.http.post(self.url("/checklist")).json(input).send()?;
        Ok(Self::check(resp)?.json()?)
    }

    pub fn update_checklist_item(
        &self,
        id: &str,
        input: &ChecklistItemUpdate,
    ) -> Result<ChecklistItem, ApiError> {
        let resp = self
            .http
            .put(self.url(&format!("/checklist/{}", id)))
            .json(input)
            .send()?;
        Ok(Self::check(resp)?.json()?)
    }

    /// Multipart upload of one file attachment to a checklist item.
    pub fn upload_checklist_file(
        &self,
        id: &str,
        path: &Path,
    ) -> Result<ChecklistItem, ApiError> {
        let form = multipart::Form::new()
            .file("file", path)
            .map_err(|e| ApiError::Upload(e.to_string()))?;
        let resp = self
            .http
            .post(self.url(&format!("/checklist/{}/upload", id)))
            .multipart(form)
            .send()?;
        Ok(Self::check(resp)?.json()?)
    }

    pub fn delete_checklist_file(
        &self,
        id: &str,
        filename: &str,
    ) -> Result<ChecklistItem, ApiError> {
        let resp = self
            .http
            .delete(self.url(&format!("/checklist/{}/files/{}", id, filename)))
            .send()?;
        Ok(Self::check(resp)?.json()?)
    }

    /// Public URL for a stored attachment, for opening outside the app.
    pub fn upload_url(&self, filename: &str) -> String {
        self.url(&format!("/uploads/{}", filename))
    }

    // ----- rejections -----

    pub fn rejections(&self, project_id: &str) -> Result<Vec<Rejection>, ApiError> {
        let resp = self
            .http
            .get(self.url("/rejections"))
            .query(&[("project_id", project_id)])
            .send()?;
        Ok(Self::check(resp)?.json()?)
    }

    pub fn create_rejection(&self, input: &RejectionCreate) -> Result<Rejection, ApiError> {
        if input.reason.trim().is_empty() {
            return Err(ApiError::Validation("rejection reason is required".to_string()));
        }
        let resp = self.http.post(self.url("/rejections")).json(input).send()?;
        Ok(Self::check(resp)?.json()?)
    }

    pub fn update_rejection(
        &self,
        id: &str,
        input: &RejectionUpdate,
    ) -> Result<Rejection, ApiError> {
        let resp = self
            .http
            .put(self.url(&format!("/rejections/{}", id)))
            .json(input)
            .send()?;
        Ok(Self::check(resp)?.json()?)
    }

    // ----- AI assistant -----

    pub fn ai_chat(&self, project_id: &str, message: &str) -> Result<AiExchange, ApiError> {
        if message.trim().is_empty() {
            return Err(ApiError::Validation("message is required".to_string()));
        }
        let request = AiChatRequest {
            project_id: project_id.to_string(),
            message: message.to_string(),
        };
        let resp = self.http.post(self.url("/ai/chat")).json(&request).send()?;
        Ok(Self::check(resp)?.json()?)
    }

    pub fn analyze_rejection(
        &self,
        input: &AiAnalysisRequest,
    ) -> Result<AiAnalysisResponse, ApiError> {
        let resp = self
            .http
            .post(self.url("/ai/analyze-rejection"))
            .json(input)
            .send()?;
        Ok(Self::check(resp)?.json()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = ApiClient::new("http://localhost:8000/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.url("/projects"), "http://localhost:8000/api/projects");
        assert_eq!(
            client.upload_url("abc.png"),
            "http://localhost:8000/api/uploads/abc.png"
        );
    }

    #[test]
    fn empty_required_fields_fail_before_any_request() {
        let client = ApiClient::new("http://localhost:8000", Duration::from_secs(5)).unwrap();
        let result = client.create_project(&ProjectCreate {
            name: "   ".to_string(),
            platform: crate::models::Platform::Both,
            description: None,
            start_date: None,
            publish_date: None,
            auto_generate_tasks: true,
        });
        assert!(matches!(result, Err(ApiError::Validation(_))));
        assert!(matches!(
            client.ai_chat("p1", ""),
            Err(ApiError::Validation(_))
        ));
    }
}
