//! Configuration loading and schema definitions for testmgmt.
//!
//! The library itself takes every setting programmatically; this module only
//! serves callers such as the `testmgmt` binary that keep their settings in a
//! TOML file. Credential and path values may reference the environment
//! (`$VAR`, `${VAR}`) and the home directory (`~`); references are expanded at
//! load time and an unset variable is an error.

pub mod schema;

pub use schema::*;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Default configuration file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "testmgmt.toml";

/// Template written by `testmgmt init`.
pub const CONFIG_TEMPLATE: &str = r#"# testmgmt configuration

[service]
# Environment references are expanded when the file is loaded.
username = "${BROWSERSTACK_USERNAME}"
access_key = "${BROWSERSTACK_ACCESS_KEY}"
# base_url = "https://api.browserstack.com/test-management/v1"

[upload]
project_id = 0
test_run_name = "Playwright run"
# test_run_description = "Uploaded from CI"
# test_plan_id = 7
create_test_cases = false

[report]
# path = "playwright-report/report.json"
root_dir = "."
"#;

/// Loads testmgmt configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid TOML, does not
/// match the schema, or references an unset environment variable.
///
/// # Example
///
/// ```no_run
/// use testmgmt::config::load_config;
/// use std::path::Path;
///
/// let config = load_config(Path::new("testmgmt.toml"))?;
/// println!("Project: {}", config.upload.project_id);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    expand_config(config)
        .with_context(|| format!("Failed to expand config file: {}", path.display()))
}

/// Loads testmgmt configuration from a TOML string.
///
/// # Example
///
/// ```
/// use testmgmt::config::load_config_str;
///
/// let config = load_config_str(r#"
///     [service]
///     username = "ci-bot"
///     access_key = "secret"
///
///     [upload]
///     project_id = 42
///     test_run_name = "Nightly"
/// "#)?;
///
/// assert_eq!(config.upload.project_id, 42);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn load_config_str(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Failed to parse config")?;

    expand_config(config)
}

fn expand_config(mut config: Config) -> Result<Config> {
    config.service.username = expand(&config.service.username, "service.username")?;
    config.service.access_key = expand(&config.service.access_key, "service.access_key")?;
    if let Some(base_url) = &config.service.base_url {
        config.service.base_url = Some(expand(base_url, "service.base_url")?);
    }

    if let Some(path) = &config.report.path {
        config.report.path = Some(expand_path(path, "report.path")?);
    }
    config.report.root_dir = expand_path(&config.report.root_dir, "report.root_dir")?;

    Ok(config)
}

fn expand(value: &str, field: &str) -> Result<String> {
    shellexpand::full(value)
        .map(|expanded| expanded.into_owned())
        .with_context(|| format!("Failed to expand {}", field))
}

fn expand_path(path: &Path, field: &str) -> Result<PathBuf> {
    expand(&path.to_string_lossy(), field).map(PathBuf::from)
}
