//! HTTP client for the worktrace API.
//!
//! Every request carries the employee's API key in the `x-api-key` header.
//! [`ApiClient`] implements [`TimerBackend`] so the session orchestrator
//! can drive the server-side timer exactly as it would an in-process one.

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use worktrace_core::api_keys::API_KEY_HEADER;
use worktrace_core::error::CoreError;
use worktrace_core::timer::TimerBackend;
use worktrace_core::tracking::{AssignedProject, EmployeeProfile, Screenshot, TimeEntry};
use worktrace_core::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server rejected request ({status}): {message}")]
    Rejected { status: StatusCode, message: String },
}

impl ClientError {
    /// Map to the domain taxonomy. `not_found` stands in for a 404 since
    /// only the caller knows which entity was missing.
    pub fn into_core(self, not_found: CoreError) -> CoreError {
        match self {
            ClientError::Transport(e) => CoreError::Internal(e.to_string()),
            ClientError::Rejected { status, message } => match status {
                StatusCode::NOT_FOUND => not_found,
                StatusCode::CONFLICT => CoreError::Conflict(message),
                StatusCode::UNAUTHORIZED => CoreError::Unauthorized(message),
                StatusCode::FORBIDDEN => CoreError::Forbidden(message),
                s if s.is_client_error() => CoreError::Validation(message),
                _ => CoreError::Internal(message),
            },
        }
    }
}

/// Error payload produced by the server's `AppError`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Wrapper used by list endpoints.
#[derive(Debug, Deserialize)]
struct DataResponse<T> {
    data: T,
}

/// Authenticated client for one employee. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_http(reqwest::Client::new(), base_url, api_key)
    }

    pub fn with_http(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            api_key: api_key.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{path}", self.base_url)
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header(API_KEY_HEADER, &self.api_key)
    }

    /// GET /auth/me
    pub async fn me(&self) -> Result<EmployeeProfile, ClientError> {
        decode(self.request(Method::GET, "/auth/me").send().await?).await
    }

    /// GET /me/projects
    pub async fn projects(&self) -> Result<Vec<AssignedProject>, ClientError> {
        let body: DataResponse<Vec<AssignedProject>> =
            decode(self.request(Method::GET, "/me/projects").send().await?).await?;
        Ok(body.data)
    }

    /// GET /timetracking/active
    pub async fn active(&self) -> Result<Option<TimeEntry>, ClientError> {
        decode(self.request(Method::GET, "/timetracking/active").send().await?).await
    }

    /// POST /timetracking/start
    pub async fn start_timer(&self, employee_id: DbId, task_id: DbId) -> Result<TimeEntry, ClientError> {
        let response = self
            .request(Method::POST, "/timetracking/start")
            .json(&json!({ "employee_id": employee_id, "task_id": task_id }))
            .send()
            .await?;
        decode(response).await
    }

    /// POST /timetracking/stop
    pub async fn stop_timer(&self, employee_id: DbId) -> Result<TimeEntry, ClientError> {
        let response = self
            .request(Method::POST, "/timetracking/stop")
            .json(&json!({ "employee_id": employee_id }))
            .send()
            .await?;
        decode(response).await
    }

    /// POST /screenshots (multipart)
    pub async fn submit_screenshot(
        &self,
        form: reqwest::multipart::Form,
    ) -> Result<Screenshot, ClientError> {
        let response = self
            .request(Method::POST, "/screenshots")
            .multipart(form)
            .send()
            .await?;
        decode(response).await
    }
}

/// Parse a success body, or turn an error status into [`ClientError::Rejected`].
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|b| b.error)
        .unwrap_or(text);
    Err(ClientError::Rejected { status, message })
}

impl TimerBackend for ApiClient {
    async fn start(&self, employee_id: DbId, task_id: DbId) -> Result<TimeEntry, CoreError> {
        self.start_timer(employee_id, task_id).await.map_err(|e| {
            e.into_core(CoreError::NotFound {
                entity: "Task",
                id: task_id,
            })
        })
    }

    async fn stop(&self, employee_id: DbId) -> Result<TimeEntry, CoreError> {
        self.stop_timer(employee_id)
            .await
            .map_err(|e| e.into_core(CoreError::no_open_entry(employee_id)))
    }
}
