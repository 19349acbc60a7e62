//! Playwright JSON report decoding.
//!
//! Playwright's JSON output has drifted across versions and wrappers. Three
//! shapes are recognized, tried in this order:
//!
//! | Shape | Root | Tests live in | Result attempt |
//! |-------|------|---------------|----------------|
//! | Spec list | `[spec, ...]` | `spec.suites[].tests[]` | first, else last |
//! | Spec object | `{"specs": [spec, ...]}` | `spec.suites[].tests[]` | first only |
//! | Flat suites | `{"suites": [suite, ...]}` | `suite.tests[]` | none, fields on the test |
//!
//! Anything else decodes to an empty report.
//!
//! Decoding is lenient below the root: a field with an unexpected type is
//! treated as absent, and empty strings and zero durations fall through to
//! the next candidate field. Output order is document order.

use std::path::Path;

use serde::de::{DeserializeOwned, Deserializer, IgnoredAny};
use serde::Deserialize;
use tracing::debug;

use super::status::map_runner_status;
use super::{
    Attachment, CanonicalTestResult, CanonicalTestSuite, ReportError, ReportResult, TestError,
    UNKNOWN_SOURCE_FILE, UNKNOWN_TEST_TITLE,
};

/// Reads and decodes the Playwright report at `path`.
///
/// # Errors
///
/// - [`ReportError::NotFound`] if `path` does not exist
/// - [`ReportError::Io`] if the file cannot be read
/// - [`ReportError::Parse`] if the content is not valid JSON
///
/// A valid JSON document in an unknown shape is not an error; it yields an
/// empty sequence.
pub fn parse_report(path: &Path) -> ReportResult<Vec<CanonicalTestSuite>> {
    if !path.exists() {
        return Err(ReportError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let suites = parse_report_str(&content)?;
    debug!(
        "Parsed {} suites from {}",
        suites.len(),
        path.display()
    );
    Ok(suites)
}

/// Decodes a Playwright report from a JSON string.
pub fn parse_report_str(content: &str) -> ReportResult<Vec<CanonicalTestSuite>> {
    let report: RawReport = serde_json::from_str(content)?;
    Ok(report.into_suites())
}

/// A value that decodes from any JSON, keeping `None` when it does not fit `T`.
struct Lenient<T>(Option<T>);

impl<T> Lenient<T> {
    fn into_inner(self) -> Option<T> {
        self.0
    }
}

impl<T> Default for Lenient<T> {
    fn default() -> Self {
        Lenient(None)
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Lenient<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Lenient(T::deserialize(value).ok()))
    }
}

type LenientList<T> = Lenient<Vec<Lenient<T>>>;

/// Flattens a lenient list, substituting defaults for malformed elements.
fn items<T: Default>(list: LenientList<T>) -> impl Iterator<Item = T> {
    list.0
        .unwrap_or_default()
        .into_iter()
        .map(|item| item.0.unwrap_or_default())
}

fn non_empty(value: Lenient<String>) -> Option<String> {
    value.0.filter(|s| !s.is_empty())
}

fn non_zero(value: Lenient<f64>) -> Option<f64> {
    value.0.filter(|d| *d != 0.0 && !d.is_nan())
}

fn to_millis(duration: f64) -> u64 {
    if duration.is_finite() && duration > 0.0 {
        duration.round() as u64
    } else {
        0
    }
}

/// Root of a report, in precedence order.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawReport {
    SpecList(Vec<Lenient<RawSpec>>),
    SpecObject { specs: Vec<Lenient<RawSpec>> },
    FlatSuites { suites: Vec<Lenient<RawFlatSuite>> },
    Unrecognized(IgnoredAny),
}

/// Which attempt of a test supplies its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttemptPick {
    /// The first attempt, or the last one when the first is missing.
    FirstOrLast,
    /// The first attempt only.
    FirstOnly,
}

impl RawReport {
    fn into_suites(self) -> Vec<CanonicalTestSuite> {
        match self {
            RawReport::SpecList(specs) => specs
                .into_iter()
                .map(|spec| spec.0.unwrap_or_default().into_suite(AttemptPick::FirstOrLast))
                .collect(),
            RawReport::SpecObject { specs } => specs
                .into_iter()
                .map(|spec| spec.0.unwrap_or_default().into_suite(AttemptPick::FirstOnly))
                .collect(),
            RawReport::FlatSuites { suites } => suites
                .into_iter()
                .map(|suite| suite.0.unwrap_or_default().into_suite())
                .collect(),
            RawReport::Unrecognized(_) => {
                debug!("Report matches no known Playwright shape");
                Vec::new()
            }
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawSpec {
    file: Lenient<String>,
    suites: LenientList<RawSpecSuite>,
}

impl RawSpec {
    fn into_suite(self, pick: AttemptPick) -> CanonicalTestSuite {
        let tests = items(self.suites)
            .flat_map(|suite| items(suite.tests))
            .map(|test| test.into_result(pick))
            .collect();

        CanonicalTestSuite {
            source_file: non_empty(self.file).unwrap_or_else(|| UNKNOWN_SOURCE_FILE.to_string()),
            tests,
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawSpecSuite {
    tests: LenientList<RawSpecTest>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawSpecTest {
    title: Lenient<String>,
    status: Lenient<String>,
    duration: Lenient<f64>,
    results: LenientList<RawAttempt>,
    attachments: LenientList<RawAttachment>,
}

impl RawSpecTest {
    fn into_result(self, pick: AttemptPick) -> CanonicalTestResult {
        let attempt = select_attempt(self.results, pick);

        let status = non_empty(attempt.status).or_else(|| non_empty(self.status));
        let duration = non_zero(attempt.duration).or_else(|| non_zero(self.duration));
        let attachments = if attempt.attachments.0.is_some() {
            attempt.attachments
        } else {
            self.attachments
        };

        CanonicalTestResult {
            title: non_empty(self.title).unwrap_or_else(|| UNKNOWN_TEST_TITLE.to_string()),
            status: map_runner_status(status.as_deref()),
            duration_ms: duration.map_or(0, to_millis),
            error: attempt.error.into_inner().map(RawError::into_test_error),
            attachments: items(attachments).map(RawAttachment::into_attachment).collect(),
        }
    }
}

fn select_attempt(results: LenientList<RawAttempt>, pick: AttemptPick) -> RawAttempt {
    let mut attempts: Vec<Option<RawAttempt>> = results
        .0
        .unwrap_or_default()
        .into_iter()
        .map(Lenient::into_inner)
        .collect();

    let first = attempts.first_mut().and_then(Option::take);
    let chosen = match pick {
        AttemptPick::FirstOnly => first,
        AttemptPick::FirstOrLast => first.or_else(|| attempts.pop().flatten()),
    };

    chosen.unwrap_or_default()
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawAttempt {
    status: Lenient<String>,
    duration: Lenient<f64>,
    error: Lenient<RawError>,
    attachments: LenientList<RawAttachment>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawFlatSuite {
    file: Lenient<String>,
    tests: LenientList<RawFlatTest>,
}

impl RawFlatSuite {
    fn into_suite(self) -> CanonicalTestSuite {
        CanonicalTestSuite {
            source_file: non_empty(self.file).unwrap_or_else(|| UNKNOWN_SOURCE_FILE.to_string()),
            tests: items(self.tests).map(RawFlatTest::into_result).collect(),
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawFlatTest {
    title: Lenient<String>,
    name: Lenient<String>,
    status: Lenient<String>,
    outcome: Lenient<String>,
    duration: Lenient<f64>,
    error: Lenient<RawError>,
    attachments: LenientList<RawAttachment>,
}

impl RawFlatTest {
    fn into_result(self) -> CanonicalTestResult {
        let title = non_empty(self.title).or_else(|| non_empty(self.name));
        let status = non_empty(self.status).or_else(|| non_empty(self.outcome));

        CanonicalTestResult {
            title: title.unwrap_or_else(|| UNKNOWN_TEST_TITLE.to_string()),
            status: map_runner_status(status.as_deref()),
            duration_ms: non_zero(self.duration).map_or(0, to_millis),
            error: self.error.into_inner().map(RawError::into_test_error),
            attachments: items(self.attachments)
                .map(RawAttachment::into_attachment)
                .collect(),
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawError {
    message: Lenient<String>,
    stack: Lenient<String>,
    #[serde(rename = "stackTrace")]
    stack_trace: Lenient<String>,
}

impl RawError {
    fn into_test_error(self) -> TestError {
        TestError {
            message: self.message.into_inner().unwrap_or_default(),
            stack: non_empty(self.stack).or_else(|| non_empty(self.stack_trace)),
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawAttachment {
    name: Lenient<String>,
    path: Lenient<String>,
    #[serde(rename = "contentType")]
    content_type: Lenient<String>,
}

impl RawAttachment {
    fn into_attachment(self) -> Attachment {
        Attachment {
            name: self.name.into_inner().unwrap_or_default(),
            path: non_empty(self.path),
            content_type: self.content_type.into_inner().unwrap_or_default(),
        }
    }
}
