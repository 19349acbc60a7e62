//! Status vocabulary mapping.
//!
//! Playwright reports use a loose, case-varying status vocabulary. Statuses
//! are first normalized to [`TestStatus`] and then mapped to the service's
//! [`ResultStatus`].

use super::TestStatus;
use crate::client::ResultStatus;

/// Maps a raw runner status to a [`TestStatus`].
///
/// Matching is case-insensitive. Unknown or absent statuses map to
/// [`TestStatus::Skipped`].
pub fn map_runner_status(raw: Option<&str>) -> TestStatus {
    let Some(raw) = raw else {
        return TestStatus::Skipped;
    };

    match raw.to_ascii_lowercase().as_str() {
        "passed" | "ok" => TestStatus::Passed,
        "failed" => TestStatus::Failed,
        "skipped" | "skip" => TestStatus::Skipped,
        "timedout" | "timeout" => TestStatus::TimedOut,
        _ => TestStatus::Skipped,
    }
}

/// Maps a [`TestStatus`] to the status recorded on the service.
///
/// Timeouts are recorded as failures. [`ResultStatus::Blocked`] is never
/// produced.
pub fn map_to_service_status(status: TestStatus) -> ResultStatus {
    match status {
        TestStatus::Passed => ResultStatus::Passed,
        TestStatus::Failed | TestStatus::TimedOut => ResultStatus::Failed,
        TestStatus::Skipped => ResultStatus::Skipped,
    }
}

impl From<TestStatus> for ResultStatus {
    fn from(status: TestStatus) -> Self {
        map_to_service_status(status)
    }
}
