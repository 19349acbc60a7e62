//! Playwright report ingestion.
//!
//! This module turns a Playwright JSON report into a runner-independent
//! sequence of [`CanonicalTestSuite`]s, one per source file, ready to be
//! uploaded.
//!
//! # Components
//!
//! - [`playwright`]: decodes the three known report shapes
//! - [`status`]: maps runner and canonical statuses onto the service vocabulary
//! - [`locate`]: finds a report in conventional output locations
//!
//! # Example
//!
//! ```no_run
//! use testmgmt::report::{find_report, parse_report};
//! use std::path::Path;
//!
//! if let Some(path) = find_report(Path::new(".")) {
//!     for suite in parse_report(&path)? {
//!         println!("{}: {} tests", suite.source_file, suite.tests.len());
//!     }
//! }
//! # Ok::<(), testmgmt::report::ReportError>(())
//! ```

pub mod locate;
pub mod playwright;
pub mod status;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use locate::{REPORT_CANDIDATES, find_report};
pub use playwright::{parse_report, parse_report_str};
pub use status::{map_runner_status, map_to_service_status};

/// Placeholder title for tests the report does not name.
pub const UNKNOWN_TEST_TITLE: &str = "Unknown Test";

/// Placeholder source file for suites the report does not attribute.
pub const UNKNOWN_SOURCE_FILE: &str = "unknown";

/// Result type for report operations.
pub type ReportResult<T> = Result<T, ReportError>;

/// Errors raised while reading a report.
///
/// An unrecognized report shape is not an error; it yields no suites.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// The report path does not exist.
    #[error("Playwright report file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The report exists but could not be read.
    #[error("Failed to read Playwright report {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The report is not valid JSON.
    #[error("Failed to parse Playwright report: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Outcome of a test as reported by the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
    TimedOut,
}

impl TestStatus {
    /// Returns `true` for outcomes that fail a test run.
    pub fn is_failure(&self) -> bool {
        matches!(self, TestStatus::Failed | TestStatus::TimedOut)
    }
}

/// Error details captured for a failed test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// A file attached to a test result (screenshot, trace, video).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default)]
    pub content_type: String,
}

/// Normalized result of one executed test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalTestResult {
    pub title: String,
    pub status: TestStatus,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TestError>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

/// All tests reported for one source file, in report order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalTestSuite {
    pub source_file: String,
    pub tests: Vec<CanonicalTestResult>,
}

impl CanonicalTestSuite {
    /// Number of tests in this suite with a failing outcome.
    pub fn failures(&self) -> usize {
        self.tests.iter().filter(|t| t.status.is_failure()).count()
    }
}

/// Total number of tests across suites.
pub fn total_tests(suites: &[CanonicalTestSuite]) -> usize {
    suites.iter().map(|s| s.tests.len()).sum()
}
