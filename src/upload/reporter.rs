//! Upload progress events.
//!
//! The uploader never writes to the terminal itself. It emits events to an
//! [`UploadReporter`], so callers decide whether to show a progress bar,
//! collect events for assertions, or ignore them.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{UploadOutcome, UploadWarning, pluralize};
use crate::client::{ResultStatus, RunStatus, TestCase, TestResult, TestRun};
use crate::report::{CanonicalTestResult, CanonicalTestSuite, total_tests};

/// Receives events during an upload pass.
#[async_trait]
pub trait UploadReporter: Send + Sync {
    /// Called once the report has been decoded.
    async fn on_report_parsed(&self, suites: &[CanonicalTestSuite]);

    /// Called after the test run has been created.
    async fn on_run_created(&self, run: &TestRun);

    /// Called when a missing test case was created.
    async fn on_test_case_created(&self, test_case: &TestCase);

    /// Called when a test was skipped because it has no test case.
    async fn on_test_skipped(&self, warning: &UploadWarning);

    /// Called after a result has been recorded.
    async fn on_result_submitted(&self, test: &CanonicalTestResult, result: &TestResult);

    /// Called after the run status has been finalized.
    async fn on_run_finalized(&self, outcome: &UploadOutcome);
}

/// A reporter that does nothing.
pub struct NullReporter;

#[async_trait]
impl UploadReporter for NullReporter {
    async fn on_report_parsed(&self, _suites: &[CanonicalTestSuite]) {}
    async fn on_run_created(&self, _run: &TestRun) {}
    async fn on_test_case_created(&self, _test_case: &TestCase) {}
    async fn on_test_skipped(&self, _warning: &UploadWarning) {}
    async fn on_result_submitted(&self, _test: &CanonicalTestResult, _result: &TestResult) {}
    async fn on_run_finalized(&self, _outcome: &UploadOutcome) {}
}

/// Console reporter with a progress bar and a final summary.
pub struct ConsoleReporter {
    progress: Mutex<Option<indicatif::ProgressBar>>,
    verbose: bool,
}

impl ConsoleReporter {
    /// Creates a console reporter. With `verbose`, every test is listed.
    pub fn new(verbose: bool) -> Self {
        Self {
            progress: Mutex::new(None),
            verbose,
        }
    }

    fn with_progress(&self, f: impl FnOnce(&indicatif::ProgressBar)) {
        if let Ok(guard) = self.progress.lock()
            && let Some(pb) = guard.as_ref()
        {
            f(pb);
        }
    }
}

#[async_trait]
impl UploadReporter for ConsoleReporter {
    async fn on_report_parsed(&self, suites: &[CanonicalTestSuite]) {
        let total = total_tests(suites);
        println!(
            "Found {} in {}",
            pluralize(total, "test"),
            pluralize(suites.len(), "file")
        );

        let pb = indicatif::ProgressBar::new(total as u64);
        let style = indicatif::ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar())
            .progress_chars("#>-");
        pb.set_style(style);

        if let Ok(mut guard) = self.progress.lock() {
            *guard = Some(pb);
        }
    }

    async fn on_run_created(&self, run: &TestRun) {
        let line = format!("Created test run {} ({})", run.id, run.name);
        self.with_progress(|pb| pb.println(&line));
    }

    async fn on_test_case_created(&self, test_case: &TestCase) {
        if self.verbose {
            let line = format!(
                "{} test case {}: {}",
                console::style("NEW ").cyan(),
                test_case.id,
                test_case.title
            );
            self.with_progress(|pb| pb.println(&line));
        }
    }

    async fn on_test_skipped(&self, warning: &UploadWarning) {
        let line = format!("{} {}", console::style("SKIP").yellow(), warning);
        self.with_progress(|pb| {
            pb.println(&line);
            pb.inc(1);
        });
    }

    async fn on_result_submitted(&self, test: &CanonicalTestResult, result: &TestResult) {
        let status = match result.status {
            ResultStatus::Passed => console::style("PASS").green(),
            ResultStatus::Failed => console::style("FAIL").red(),
            ResultStatus::Skipped => console::style("SKIP").yellow(),
            ResultStatus::Blocked => console::style("BLCK").red().bold(),
        };

        let show = self.verbose || result.status == ResultStatus::Failed;
        let line = format!("{} {}", status, test.title);
        self.with_progress(|pb| {
            if show {
                pb.println(&line);
            }
            pb.inc(1);
        });
    }

    async fn on_run_finalized(&self, outcome: &UploadOutcome) {
        if let Ok(mut guard) = self.progress.lock()
            && let Some(pb) = guard.take()
        {
            pb.finish_and_clear();
        }

        print_summary(outcome);
    }
}

/// Prints a summary of an upload pass to the console.
pub fn print_summary(outcome: &UploadOutcome) {
    let count = |status: ResultStatus| {
        outcome
            .results
            .iter()
            .filter(|r| r.status == status)
            .count()
    };

    println!();
    println!("Test Run {}: {}", outcome.test_run.id, outcome.test_run.name);
    println!("  Uploaded: {}", outcome.results.len());
    println!("  Passed:   {}", console::style(count(ResultStatus::Passed)).green());
    println!("  Failed:   {}", console::style(count(ResultStatus::Failed)).red());
    println!("  Skipped:  {}", console::style(count(ResultStatus::Skipped)).yellow());

    if !outcome.warnings.is_empty() {
        println!(
            "  Missing:  {}",
            console::style(outcome.warnings.len()).yellow().bold()
        );
    }

    println!();
    match outcome.final_status {
        RunStatus::Failed => println!("{}", console::style("Test run failed.").red().bold()),
        _ => println!("{}", console::style("Test run passed!").green().bold()),
    }

    if !outcome.warnings.is_empty() {
        println!();
        println!("Tests without a test case (enable create_test_cases to auto-create):");
        for warning in &outcome.warnings {
            match warning {
                UploadWarning::MissingTestCase { title, source_file } => {
                    println!("  - {} {}", title, console::style(source_file).dim());
                }
            }
        }
    }
}
