//! HTTP client for the BrowserStack Test Management API.
//!
//! [`BrowserStackClient`] is a typed wrapper over [`reqwest`] exposing CRUD
//! operations for projects, test cases, test runs, test results and test
//! plans. All resources except projects are scoped under a project:
//!
//! ```text
//! /projects
//! /projects/{project_id}/test-cases
//! /projects/{project_id}/test-runs
//! /projects/{project_id}/test-runs/{run_id}/test-results
//! /projects/{project_id}/test-plans
//! ```
//!
//! The upload pipeline does not depend on the concrete client. It consumes
//! the narrower [`TestManagementApi`] trait, which [`BrowserStackClient`]
//! implements.
//!
//! # Errors
//!
//! Every operation returns [`ApiResult<T>`]. A response with a non-success
//! status becomes [`ApiError::Remote`], whose message combines the server's
//! `message` with its field-level `errors` map. Failures where no usable
//! response arrived surface as [`ApiError::Transport`] with the raw
//! transport message.
//!
//! # Example
//!
//! ```no_run
//! use testmgmt::client::{BrowserStackClient, ClientConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = BrowserStackClient::new(ClientConfig::new("user", "access-key"));
//! let projects = client.list_projects().await?;
//! for project in &projects.data {
//!     println!("{} {}", project.id, project.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod types;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

pub use types::*;

/// Production endpoint of the Test Management API.
pub const DEFAULT_BASE_URL: &str = "https://api.browserstack.com/test-management/v1";

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned by the Test Management API client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The service answered with a non-success status.
    ///
    /// `message` is the server-supplied message, or a generic
    /// `"Request failed with status code N"` when the body carried none.
    #[error("BrowserStack API Error: {message}{}", field_errors_suffix(.errors))]
    Remote {
        status: u16,
        message: String,
        errors: Option<serde_json::Value>,
    },

    /// No usable response was received (connection refused, DNS failure,
    /// undecodable body). Displays the transport message verbatim.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// HTTP status of a [`ApiError::Remote`] error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Remote { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

fn field_errors_suffix(errors: &Option<serde_json::Value>) -> String {
    match errors {
        Some(errors) if !errors.is_null() => format!(" - {}", errors),
        _ => String::new(),
    }
}

/// Structured error body returned by the service.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<serde_json::Value>,
}

/// Credentials and endpoint for a [`BrowserStackClient`].
#[derive(Clone)]
pub struct ClientConfig {
    /// Account username, sent as the basic-auth user.
    pub username: String,

    /// Account access key, sent as the basic-auth password.
    pub access_key: String,

    /// API endpoint. Defaults to [`DEFAULT_BASE_URL`].
    pub base_url: Option<String>,
}

impl ClientConfig {
    /// Creates a configuration targeting the production endpoint.
    pub fn new(username: impl Into<String>, access_key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            access_key: access_key.into(),
            base_url: None,
        }
    }

    /// Overrides the API endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("username", &self.username)
            .field("access_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Client for the BrowserStack Test Management REST API.
///
/// Credentials and endpoint are fixed at construction; the client holds no
/// other state apart from the pooled HTTP connection.
#[derive(Clone)]
pub struct BrowserStackClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    access_key: String,
}

impl std::fmt::Debug for BrowserStackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserStackClient")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl BrowserStackClient {
    /// Creates a client with a default HTTP transport.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_http_client(config, reqwest::Client::new())
    }

    /// Creates a client on top of a caller-configured HTTP transport.
    ///
    /// Use this to impose timeouts, proxies or custom TLS settings; the
    /// client itself applies none.
    pub fn with_http_client(config: ClientConfig, http: reqwest::Client) -> Self {
        let base_url = config
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            http,
            base_url,
            username: config.username,
            access_key: config.access_key,
        }
    }

    /// The endpoint all request paths are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The account username this client authenticates as.
    pub fn username(&self) -> &str {
        &self.username
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach credentials, send, and turn error statuses into [`ApiError::Remote`].
    async fn execute(&self, request: RequestBuilder) -> ApiResult<Response> {
        let response = request
            .basic_auth(&self.username, Some(&self.access_key))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error_body: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
        let message = error_body
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));

        debug!("API request failed with {}: {}", status, message);

        Err(ApiError::Remote {
            status: status.as_u16(),
            message,
            errors: error_body.errors,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        debug!("GET {}", path);
        let response = self.execute(self.http.get(self.url(path))).await?;
        Ok(response.json::<T>().await?)
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        debug!("POST {}", path);
        let response = self
            .execute(self.http.post(self.url(path)).json(body))
            .await?;
        Ok(response.json::<T>().await?)
    }

    async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        debug!("PUT {}", path);
        let response = self
            .execute(self.http.put(self.url(path)).json(body))
            .await?;
        Ok(response.json::<T>().await?)
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        debug!("DELETE {}", path);
        self.execute(self.http.delete(self.url(path))).await?;
        Ok(())
    }

    // ==================== Projects ====================

    /// Lists all projects visible to the account.
    pub async fn list_projects(&self) -> ApiResult<Paginated<Project>> {
        self.get("/projects").await
    }

    pub async fn get_project(&self, project_id: u64) -> ApiResult<Project> {
        self.get(&format!("/projects/{}", project_id)).await
    }

    pub async fn create_project(&self, request: &CreateProjectRequest) -> ApiResult<Project> {
        self.post("/projects", request).await
    }

    pub async fn update_project(
        &self,
        project_id: u64,
        request: &UpdateProjectRequest,
    ) -> ApiResult<Project> {
        self.put(&format!("/projects/{}", project_id), request).await
    }

    pub async fn delete_project(&self, project_id: u64) -> ApiResult<()> {
        self.delete(&format!("/projects/{}", project_id)).await
    }

    // ==================== Test Cases ====================

    /// Lists the test cases of a project (first page as served).
    pub async fn list_test_cases(&self, project_id: u64) -> ApiResult<Paginated<TestCase>> {
        self.get(&format!("/projects/{}/test-cases", project_id))
            .await
    }

    pub async fn get_test_case(&self, project_id: u64, test_case_id: u64) -> ApiResult<TestCase> {
        self.get(&format!(
            "/projects/{}/test-cases/{}",
            project_id, test_case_id
        ))
        .await
    }

    pub async fn create_test_case(
        &self,
        project_id: u64,
        request: &CreateTestCaseRequest,
    ) -> ApiResult<TestCase> {
        self.post(&format!("/projects/{}/test-cases", project_id), request)
            .await
    }

    pub async fn update_test_case(
        &self,
        project_id: u64,
        test_case_id: u64,
        request: &UpdateTestCaseRequest,
    ) -> ApiResult<TestCase> {
        self.put(
            &format!("/projects/{}/test-cases/{}", project_id, test_case_id),
            request,
        )
        .await
    }

    pub async fn delete_test_case(&self, project_id: u64, test_case_id: u64) -> ApiResult<()> {
        self.delete(&format!(
            "/projects/{}/test-cases/{}",
            project_id, test_case_id
        ))
        .await
    }

    // ==================== Test Runs ====================

    pub async fn list_test_runs(&self, project_id: u64) -> ApiResult<Paginated<TestRun>> {
        self.get(&format!("/projects/{}/test-runs", project_id))
            .await
    }

    pub async fn get_test_run(&self, project_id: u64, test_run_id: u64) -> ApiResult<TestRun> {
        self.get(&format!("/projects/{}/test-runs/{}", project_id, test_run_id))
            .await
    }

    pub async fn create_test_run(
        &self,
        project_id: u64,
        request: &CreateTestRunRequest,
    ) -> ApiResult<TestRun> {
        self.post(&format!("/projects/{}/test-runs", project_id), request)
            .await
    }

    pub async fn update_test_run(
        &self,
        project_id: u64,
        test_run_id: u64,
        request: &UpdateTestRunRequest,
    ) -> ApiResult<TestRun> {
        self.put(
            &format!("/projects/{}/test-runs/{}", project_id, test_run_id),
            request,
        )
        .await
    }

    pub async fn delete_test_run(&self, project_id: u64, test_run_id: u64) -> ApiResult<()> {
        self.delete(&format!("/projects/{}/test-runs/{}", project_id, test_run_id))
            .await
    }

    // ==================== Test Results ====================

    /// Records a result against a test run.
    pub async fn add_test_result(
        &self,
        project_id: u64,
        test_run_id: u64,
        request: &CreateTestResultRequest,
    ) -> ApiResult<TestResult> {
        self.post(
            &format!(
                "/projects/{}/test-runs/{}/test-results",
                project_id, test_run_id
            ),
            request,
        )
        .await
    }

    pub async fn list_test_results(
        &self,
        project_id: u64,
        test_run_id: u64,
    ) -> ApiResult<Paginated<TestResult>> {
        self.get(&format!(
            "/projects/{}/test-runs/{}/test-results",
            project_id, test_run_id
        ))
        .await
    }

    // ==================== Test Plans ====================

    pub async fn list_test_plans(&self, project_id: u64) -> ApiResult<Paginated<TestPlan>> {
        self.get(&format!("/projects/{}/test-plans", project_id))
            .await
    }

    pub async fn get_test_plan(&self, project_id: u64, test_plan_id: u64) -> ApiResult<TestPlan> {
        self.get(&format!(
            "/projects/{}/test-plans/{}",
            project_id, test_plan_id
        ))
        .await
    }

    pub async fn create_test_plan(
        &self,
        project_id: u64,
        request: &CreateTestPlanRequest,
    ) -> ApiResult<TestPlan> {
        self.post(&format!("/projects/{}/test-plans", project_id), request)
            .await
    }

    pub async fn update_test_plan(
        &self,
        project_id: u64,
        test_plan_id: u64,
        request: &UpdateTestPlanRequest,
    ) -> ApiResult<TestPlan> {
        self.put(
            &format!("/projects/{}/test-plans/{}", project_id, test_plan_id),
            request,
        )
        .await
    }

    pub async fn delete_test_plan(&self, project_id: u64, test_plan_id: u64) -> ApiResult<()> {
        self.delete(&format!(
            "/projects/{}/test-plans/{}",
            project_id, test_plan_id
        ))
        .await
    }
}

/// The subset of the API the upload pipeline drives.
///
/// Implemented by [`BrowserStackClient`]. Tests and alternative transports
/// can provide their own implementation.
#[async_trait]
pub trait TestManagementApi: Send + Sync {
    /// Lists the test cases of a project.
    async fn list_test_cases(&self, project_id: u64) -> ApiResult<Paginated<TestCase>>;

    /// Creates a test case in a project.
    async fn create_test_case(
        &self,
        project_id: u64,
        request: &CreateTestCaseRequest,
    ) -> ApiResult<TestCase>;

    /// Creates a test run in a project.
    async fn create_test_run(
        &self,
        project_id: u64,
        request: &CreateTestRunRequest,
    ) -> ApiResult<TestRun>;

    /// Updates a test run, returning its new representation.
    async fn update_test_run(
        &self,
        project_id: u64,
        test_run_id: u64,
        request: &UpdateTestRunRequest,
    ) -> ApiResult<TestRun>;

    /// Records a result against a test run.
    async fn add_test_result(
        &self,
        project_id: u64,
        test_run_id: u64,
        request: &CreateTestResultRequest,
    ) -> ApiResult<TestResult>;
}

#[async_trait]
impl TestManagementApi for BrowserStackClient {
    async fn list_test_cases(&self, project_id: u64) -> ApiResult<Paginated<TestCase>> {
        BrowserStackClient::list_test_cases(self, project_id).await
    }

    async fn create_test_case(
        &self,
        project_id: u64,
        request: &CreateTestCaseRequest,
    ) -> ApiResult<TestCase> {
        BrowserStackClient::create_test_case(self, project_id, request).await
    }

    async fn create_test_run(
        &self,
        project_id: u64,
        request: &CreateTestRunRequest,
    ) -> ApiResult<TestRun> {
        BrowserStackClient::create_test_run(self, project_id, request).await
    }

    async fn update_test_run(
        &self,
        project_id: u64,
        test_run_id: u64,
        request: &UpdateTestRunRequest,
    ) -> ApiResult<TestRun> {
        BrowserStackClient::update_test_run(self, project_id, test_run_id, request).await
    }

    async fn add_test_result(
        &self,
        project_id: u64,
        test_run_id: u64,
        request: &CreateTestResultRequest,
    ) -> ApiResult<TestResult> {
        BrowserStackClient::add_test_result(self, project_id, test_run_id, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_url() {
        let client = BrowserStackClient::new(ClientConfig::new("user", "key"));
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert_eq!(client.username(), "user");
    }

    #[test]
    fn test_custom_base_url_trailing_slash() {
        let config = ClientConfig::new("user", "key").with_base_url("https://custom.example.com/");
        let client = BrowserStackClient::new(config);
        assert_eq!(client.base_url(), "https://custom.example.com");
        assert_eq!(
            client.url("/projects/1"),
            "https://custom.example.com/projects/1"
        );
    }

    #[test]
    fn test_debug_redacts_access_key() {
        let config = ClientConfig::new("user", "super-secret");
        assert!(!format!("{:?}", config).contains("super-secret"));

        let client = BrowserStackClient::new(config);
        assert!(!format!("{:?}", client).contains("super-secret"));
    }

    #[test]
    fn test_remote_error_message() {
        let err = ApiError::Remote {
            status: 404,
            message: "Project not found".to_string(),
            errors: None,
        };
        assert_eq!(err.to_string(), "BrowserStack API Error: Project not found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_remote_error_message_with_field_errors() {
        let err = ApiError::Remote {
            status: 422,
            message: "Validation failed".to_string(),
            errors: Some(serde_json::json!({"title": ["can't be blank"]})),
        };
        assert_eq!(
            err.to_string(),
            r#"BrowserStack API Error: Validation failed - {"title":["can't be blank"]}"#
        );
    }

    #[test]
    fn test_null_field_errors_are_ignored() {
        let err = ApiError::Remote {
            status: 500,
            message: "Boom".to_string(),
            errors: Some(serde_json::Value::Null),
        };
        assert_eq!(err.to_string(), "BrowserStack API Error: Boom");
    }
}
