//! Configuration schema definitions for testmgmt.
//!
//! ```text
//! Config (root)
//! ├── ServiceConfig   - Credentials and endpoint of the test-management service
//! ├── UploadConfig    - Target project, run naming, test case creation
//! └── ReportConfig    - Where the Playwright report lives (optional, has defaults)
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::client::ClientConfig;
use crate::upload::UploadOptions;

/// Root configuration structure for testmgmt.
///
/// # TOML Structure
///
/// ```toml
/// [service]
/// username = "${BROWSERSTACK_USERNAME}"
/// access_key = "${BROWSERSTACK_ACCESS_KEY}"
///
/// [upload]
/// project_id = 42
/// test_run_name = "Nightly"
///
/// [report]
/// root_dir = "."
/// ```
///
/// # Example
///
/// ```
/// use testmgmt::config::Config;
///
/// let config: Config = toml::from_str(r#"
///     [service]
///     username = "ci-bot"
///     access_key = "secret"
///
///     [upload]
///     project_id = 42
///     test_run_name = "Nightly"
/// "#).unwrap();
///
/// assert!(!config.upload.create_test_cases);
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Service credentials and endpoint.
    pub service: ServiceConfig,

    /// Upload target and run settings.
    pub upload: UploadConfig,

    /// Report location (optional, has defaults).
    #[serde(default)]
    pub report: ReportConfig,
}

/// Credentials and endpoint of the test-management service.
///
/// `~` and `$VAR`/`${VAR}` references are expanded when the file is loaded,
/// so secrets can stay in the environment.
#[derive(Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Account username used for basic auth.
    pub username: String,

    /// Account access key used for basic auth.
    pub access_key: String,

    /// API root. Defaults to the public BrowserStack endpoint when unset.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("username", &self.username)
            .field("access_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ServiceConfig {
    /// Builds the client configuration for these settings.
    pub fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::new(&self.username, &self.access_key);
        match &self.base_url {
            Some(base_url) => config.with_base_url(base_url),
            None => config,
        }
    }
}

/// Upload target and run settings.
///
/// # Defaults
///
/// | Field | Default |
/// |-------|---------|
/// | `test_run_description` | None |
/// | `test_plan_id` | None |
/// | `create_test_cases` | false |
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
    /// Project receiving the test run.
    pub project_id: u64,

    /// Name given to each created test run.
    pub test_run_name: String,

    /// Optional description of the created test run.
    #[serde(default)]
    pub test_run_description: Option<String>,

    /// Test plan the run is attached to.
    #[serde(default)]
    pub test_plan_id: Option<u64>,

    /// Create test cases for tests that match none.
    ///
    /// When false, unmatched tests are skipped with a warning.
    #[serde(default)]
    pub create_test_cases: bool,
}

impl UploadConfig {
    /// Builds the upload options for these settings.
    pub fn options(&self) -> UploadOptions {
        UploadOptions {
            project_id: self.project_id,
            test_run_name: self.test_run_name.clone(),
            test_run_description: self.test_run_description.clone(),
            test_plan_id: self.test_plan_id,
            create_test_cases: self.create_test_cases,
        }
    }
}

/// Where the Playwright report lives.
///
/// An explicit `path` wins; otherwise the conventional locations under
/// `root_dir` are searched.
///
/// # Example
///
/// ```toml
/// [report]
/// path = "playwright-report/report.json"
/// root_dir = "web"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportConfig {
    /// Explicit report file.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Directory searched for a report when `path` is unset.
    ///
    /// Default: `"."`
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            path: None,
            root_dir: default_root_dir(),
        }
    }
}

fn default_root_dir() -> PathBuf {
    PathBuf::from(".")
}
