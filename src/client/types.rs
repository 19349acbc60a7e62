//! Wire types for the BrowserStack Test Management API.
//!
//! Field names follow the service's snake_case JSON. Optional request fields
//! are omitted from the body when unset so the service applies its own
//! defaults.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Decodes a timestamp, treating anything unparseable as absent.
///
/// Accepts RFC 3339 and the space-separated `YYYY-MM-DD HH:MM:SS[.fff]` form
/// (read as UTC).
fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(|v| v.as_str()).and_then(parse_timestamp))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Envelope returned by every list endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Paginated<T> {
    /// Items on the returned page.
    pub data: Vec<T>,

    /// Paging metadata, when the service includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// Paging metadata attached to a [`Paginated`] envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Pagination {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

/// Priority of a test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Lifecycle status of a test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Active,
    Inactive,
}

/// Status of a test run.
///
/// Runs created by the uploader start as [`RunStatus::InProgress`] and are
/// finalized to [`RunStatus::Passed`] or [`RunStatus::Failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Passed,
    Failed,
    Blocked,
    Skipped,
    InProgress,
}

impl RunStatus {
    /// Returns the wire representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Passed => "passed",
            RunStatus::Failed => "failed",
            RunStatus::Blocked => "blocked",
            RunStatus::Skipped => "skipped",
            RunStatus::InProgress => "in_progress",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a single test result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Passed,
    Failed,
    Blocked,
    Skipped,
}

impl ResultStatus {
    /// Returns the wire representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultStatus::Passed => "passed",
            ResultStatus::Failed => "failed",
            ResultStatus::Blocked => "blocked",
            ResultStatus::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==================== Projects ====================

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct UpdateProjectRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ==================== Test Cases ====================

/// A test case stored by the service.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TestCase {
    pub id: u64,
    pub project_id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CaseStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CreateTestCaseRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CaseStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct UpdateTestCaseRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CaseStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

// ==================== Test Runs ====================

/// A test run stored by the service.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TestRun {
    pub id: u64,
    pub project_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_plan_id: Option<u64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: RunStatus,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_results: Option<Vec<TestResult>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CreateTestRunRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_plan_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RunStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct UpdateTestRunRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RunStatus>,
}

// ==================== Test Results ====================

/// A single result recorded against a test run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TestResult {
    pub id: u64,
    pub test_case_id: u64,
    pub test_run_id: u64,
    pub status: ResultStatus,
    /// Execution time in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshots: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CreateTestResultRequest {
    pub test_case_id: u64,
    pub status: ResultStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshots: Option<Vec<String>>,
}

// ==================== Test Plans ====================

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TestPlan {
    pub id: u64,
    pub project_id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub test_case_ids: Vec<u64>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CreateTestPlanRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub test_case_ids: Vec<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct UpdateTestPlanRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_case_ids: Option<Vec<u64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_status_wire_names() {
        let json = serde_json::to_string(&RunStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");

        let status: RunStatus = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(status, RunStatus::Failed);
    }

    #[test]
    fn test_create_request_omits_unset_fields() {
        let request = CreateTestRunRequest {
            name: "Nightly".to_string(),
            description: None,
            test_plan_id: None,
            status: Some(RunStatus::InProgress),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"name": "Nightly", "status": "in_progress"})
        );
    }

    #[test]
    fn test_paginated_without_pagination() {
        let page: Paginated<TestCase> = serde_json::from_str(
            r#"{"data": [{
                "id": 3,
                "project_id": 1,
                "title": "Login works",
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z"
            }]}"#,
        )
        .unwrap();

        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].title, "Login works");
        assert!(page.data[0].tags.is_none());
        assert!(page.pagination.is_none());
    }

    #[test]
    fn test_paginated_with_pagination() {
        let page: Paginated<Project> = serde_json::from_str(
            r#"{
                "data": [],
                "pagination": {"page": 2, "per_page": 25, "total": 30, "total_pages": 2}
            }"#,
        )
        .unwrap();

        assert!(page.data.is_empty());
        let pagination = page.pagination.unwrap();
        assert_eq!(pagination.page, 2);
        assert_eq!(pagination.total_pages, 2);
    }

    #[test]
    fn test_run_tolerates_loose_and_missing_timestamps() {
        let run: TestRun = serde_json::from_str(
            r#"{
                "id": 4,
                "project_id": 1,
                "name": "Nightly",
                "status": "in_progress",
                "created_at": "2024-01-01 10:20:30"
            }"#,
        )
        .unwrap();

        let created = run.created_at.unwrap();
        assert_eq!(created.to_rfc3339(), "2024-01-01T10:20:30+00:00");
        assert!(run.updated_at.is_none());
        assert!(run.started_at.is_none());
    }

    #[test]
    fn test_unparseable_timestamp_is_absent() {
        let case: TestCase = serde_json::from_str(
            r#"{
                "id": 3,
                "project_id": 1,
                "title": "Login works",
                "created_at": "yesterday",
                "updated_at": null
            }"#,
        )
        .unwrap();

        assert!(case.created_at.is_none());
        assert!(case.updated_at.is_none());
    }

    #[test]
    fn test_rfc3339_offsets_normalized_to_utc() {
        let plan: TestPlan = serde_json::from_str(
            r#"{
                "id": 8,
                "project_id": 1,
                "name": "Smoke",
                "test_case_ids": [3, 5],
                "created_at": "2024-01-01T12:00:00+02:00"
            }"#,
        )
        .unwrap();

        assert_eq!(plan.test_case_ids, vec![3, 5]);
        assert_eq!(
            plan.created_at.unwrap().to_rfc3339(),
            "2024-01-01T10:00:00+00:00"
        );
    }
}
