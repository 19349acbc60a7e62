//! Uploading Playwright results to BrowserStack Test Management.
//!
//! An upload pass is a single, strictly sequential walk over a parsed report:
//!
//! ```text
//!   parse_report(path)
//!        │
//!        ▼
//!   create_test_run(status = in_progress)
//!        │
//!        ▼
//!   for each suite, for each test (document order):
//!        ├── resolve test case (find, or create when enabled)
//!        │      └── no case and creation disabled → UploadWarning, next test
//!        └── add_test_result
//!        │
//!        ▼
//!   update_test_run(status = failed if any test failed or timed out, else passed)
//! ```
//!
//! The run leaves `in_progress` exactly once, after every test has been
//! processed. There are no retries and no rollback: if any remote call fails
//! the pass stops, and a run that was already created stays `in_progress` on
//! the service.
//!
//! # Example
//!
//! ```no_run
//! use testmgmt::client::{BrowserStackClient, ClientConfig};
//! use testmgmt::upload::{UploadOptions, upload_results};
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = BrowserStackClient::new(ClientConfig::new("user", "access-key"));
//! let options = UploadOptions::new(42, "Nightly").create_test_cases(true);
//!
//! let outcome = upload_results(&client, Path::new("playwright-report/report.json"), &options).await?;
//! println!("run {} finished as {}", outcome.test_run.id, outcome.final_status);
//! # Ok(())
//! # }
//! ```

pub mod reporter;
pub mod resolver;

use std::path::Path;

use tracing::{debug, info, warn};

use crate::client::{
    ApiError, CreateTestResultRequest, CreateTestRunRequest, RunStatus, TestManagementApi,
    TestResult, TestRun, UpdateTestRunRequest,
};
use crate::report::{CanonicalTestResult, CanonicalTestSuite, ReportError, parse_report};

pub use reporter::{ConsoleReporter, NullReporter, UploadReporter, print_summary};
pub use resolver::{Resolution, TestCaseResolver};

/// Result type for upload operations.
pub type UploadResult<T> = Result<T, UploadError>;

/// Errors that abort an upload pass.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The report could not be read or decoded.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// A call to the service failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Settings for one upload pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    /// Project receiving the run.
    pub project_id: u64,

    /// Name of the created test run.
    pub test_run_name: String,

    /// Optional description of the created test run.
    pub test_run_description: Option<String>,

    /// Test plan the run belongs to, if any.
    pub test_plan_id: Option<u64>,

    /// Create test cases for tests that match none.
    ///
    /// When disabled, such tests are skipped with an [`UploadWarning`].
    pub create_test_cases: bool,
}

impl UploadOptions {
    pub fn new(project_id: u64, test_run_name: impl Into<String>) -> Self {
        Self {
            project_id,
            test_run_name: test_run_name.into(),
            test_run_description: None,
            test_plan_id: None,
            create_test_cases: false,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.test_run_description = Some(description.into());
        self
    }

    pub fn test_plan(mut self, test_plan_id: u64) -> Self {
        self.test_plan_id = Some(test_plan_id);
        self
    }

    pub fn create_test_cases(mut self, create: bool) -> Self {
        self.create_test_cases = create;
        self
    }
}

/// A non-fatal problem encountered during a pass.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadWarning {
    /// No test case matched and creation was disabled; the test was skipped.
    #[error("Test case not found for \"{title}\" ({source_file}), result skipped")]
    MissingTestCase { title: String, source_file: String },
}

/// Everything an upload pass produced.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    /// The run as returned by the final status update.
    pub test_run: TestRun,

    /// Created results, in submission order.
    pub results: Vec<TestResult>,

    /// Tests that were skipped, in document order.
    pub warnings: Vec<UploadWarning>,

    /// Status the run was finalized with.
    pub final_status: RunStatus,
}

impl UploadOutcome {
    /// Returns `true` if the run was finalized as passed.
    pub fn success(&self) -> bool {
        self.final_status == RunStatus::Passed
    }

    /// Process exit code for this outcome: 0 when passed, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.success() { 0 } else { 1 }
    }
}

/// Runs upload passes against a [`TestManagementApi`].
pub struct Uploader<'a, A: ?Sized> {
    api: &'a A,
    options: UploadOptions,
    reporter: Box<dyn UploadReporter + 'a>,
}

impl<'a, A: TestManagementApi + ?Sized> Uploader<'a, A> {
    /// Creates an uploader that reports nothing.
    pub fn new(api: &'a A, options: UploadOptions) -> Self {
        Self {
            api,
            options,
            reporter: Box::new(NullReporter),
        }
    }

    /// Sends pass events to `reporter`.
    pub fn with_reporter<R: UploadReporter + 'a>(mut self, reporter: R) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    /// Parses the report at `report_path` and uploads it.
    ///
    /// Report errors abort before anything is sent to the service.
    pub async fn run(&self, report_path: &Path) -> UploadResult<UploadOutcome> {
        let suites = parse_report(report_path)?;
        info!(
            "Uploading {} from {}",
            pluralize(crate::report::total_tests(&suites), "test"),
            report_path.display()
        );
        self.upload_suites(&suites).await
    }

    /// Uploads already-parsed suites as one test run.
    pub async fn upload_suites(&self, suites: &[CanonicalTestSuite]) -> UploadResult<UploadOutcome> {
        let project_id = self.options.project_id;
        self.reporter.on_report_parsed(suites).await;

        let request = CreateTestRunRequest {
            name: self.options.test_run_name.clone(),
            description: self.options.test_run_description.clone(),
            test_plan_id: self.options.test_plan_id,
            status: Some(RunStatus::InProgress),
        };
        let test_run = self.api.create_test_run(project_id, &request).await?;
        info!("Created test run {} ({})", test_run.id, test_run.name);
        self.reporter.on_run_created(&test_run).await;

        let mut resolver = TestCaseResolver::new(self.api, project_id);
        let mut results = Vec::new();
        let mut warnings = Vec::new();
        let mut has_failures = false;

        for suite in suites {
            for test in &suite.tests {
                // Counted from the report, whether or not a result is submitted.
                has_failures |= test.status.is_failure();

                let test_case = if self.options.create_test_cases {
                    match resolver.find_or_create(&test.title, &suite.source_file).await? {
                        Resolution::Existing(case) => case,
                        Resolution::Created(case) => {
                            self.reporter.on_test_case_created(&case).await;
                            case
                        }
                    }
                } else {
                    match resolver.find(&test.title).await? {
                        Some(case) => case,
                        None => {
                            warn!(
                                "Test case not found for \"{}\". Skipping. Enable create_test_cases to auto-create.",
                                test.title
                            );
                            let warning = UploadWarning::MissingTestCase {
                                title: test.title.clone(),
                                source_file: suite.source_file.clone(),
                            };
                            self.reporter.on_test_skipped(&warning).await;
                            warnings.push(warning);
                            continue;
                        }
                    }
                };

                let request = result_request(test_case.id, test);
                let result = self
                    .api
                    .add_test_result(project_id, test_run.id, &request)
                    .await?;
                debug!(
                    "Recorded {} for \"{}\" (test case {})",
                    result.status, test.title, test_case.id
                );
                self.reporter.on_result_submitted(test, &result).await;
                results.push(result);
            }
        }

        let final_status = if has_failures {
            RunStatus::Failed
        } else {
            RunStatus::Passed
        };
        let update = UpdateTestRunRequest {
            status: Some(final_status),
            ..Default::default()
        };
        let test_run = self
            .api
            .update_test_run(project_id, test_run.id, &update)
            .await?;
        info!(
            "Finalized test run {} as {} ({} uploaded, {} skipped)",
            test_run.id,
            final_status,
            pluralize(results.len(), "result"),
            warnings.len()
        );

        let outcome = UploadOutcome {
            test_run,
            results,
            warnings,
            final_status,
        };
        self.reporter.on_run_finalized(&outcome).await;
        Ok(outcome)
    }
}

/// Parses the report at `report_path` and uploads it as one test run.
pub async fn upload_results<A: TestManagementApi + ?Sized>(
    api: &A,
    report_path: &Path,
    options: &UploadOptions,
) -> UploadResult<UploadOutcome> {
    Uploader::new(api, options.clone()).run(report_path).await
}

/// Builds the result submitted for a canonical test.
fn result_request(test_case_id: u64, test: &CanonicalTestResult) -> CreateTestResultRequest {
    CreateTestResultRequest {
        test_case_id,
        status: test.status.into(),
        execution_time: Some(test.duration_ms),
        error_message: test.error.as_ref().map(|e| e.message.clone()),
        stack_trace: test.error.as_ref().and_then(|e| e.stack.clone()),
        screenshots: None,
    }
}

/// Formats `count` with `noun`, adding a plural `s` unless `count` is 1.
pub fn pluralize(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
