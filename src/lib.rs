//! testmgmt: upload Playwright results to BrowserStack Test Management.
//!
//! This crate provides a typed client for the BrowserStack Test Management
//! API and a pipeline that turns a Playwright JSON report into a test run
//! on the service.
//!
//! # Architecture
//!
//! The main components are:
//!
//! - **Client**: Typed CRUD over projects, test cases, runs, results and plans
//! - **Report**: Decode Playwright JSON reports into canonical suites
//! - **Upload**: Create a run, resolve test cases, submit results, finalize
//! - **Config**: TOML configuration for command-line callers
//!
//! # Example
//!
//! ```no_run
//! use testmgmt::client::{BrowserStackClient, ClientConfig};
//! use testmgmt::report::find_report;
//! use testmgmt::upload::{UploadOptions, upload_results};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = BrowserStackClient::new(ClientConfig::new("user", "access-key"));
//!     let report = find_report(std::path::Path::new(".")).expect("no report");
//!
//!     let options = UploadOptions::new(42, "Nightly").create_test_cases(true);
//!     let outcome = upload_results(&client, &report, &options).await?;
//!     std::process::exit(outcome.exit_code());
//! }
//! ```

pub mod client;
pub mod config;
pub mod report;
pub mod upload;

// Re-export commonly used types
pub use client::{ApiError, BrowserStackClient, ClientConfig, TestManagementApi};
pub use config::{Config, load_config};
pub use report::{CanonicalTestResult, CanonicalTestSuite, TestStatus, find_report, parse_report};
pub use upload::{UploadOptions, UploadOutcome, Uploader, upload_results};
