//! Smoke tests for the `testmgmt` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn testmgmt() -> Command {
    Command::cargo_bin("testmgmt").expect("bin")
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

const FLAT_REPORT: &str = r#"{
    "suites": [{
        "file": "cart.spec.ts",
        "tests": [
            {"title": "adds item", "status": "passed", "duration": 250},
            {"name": "checkout", "outcome": "timedOut", "duration": 1000.4,
             "error": {"message": "Timeout exceeded"}}
        ]
    }]
}"#;

#[test]
fn find_prints_report_path() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "test-results/report.json", "[]");

    testmgmt()
        .arg("find")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("test-results/report.json"));
}

#[test]
fn find_without_report_exits_1() {
    let temp_dir = TempDir::new().unwrap();

    testmgmt()
        .arg("find")
        .arg(temp_dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No Playwright report found"));
}

#[test]
fn parse_text_lists_tests() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "report.json", FLAT_REPORT);

    testmgmt()
        .arg("parse")
        .arg(temp_dir.path().join("report.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Parsed 2 tests in 1 file:"))
        .stdout(predicate::str::contains("cart.spec.ts (1 failing)"))
        .stdout(predicate::str::contains("adds item (250ms)"))
        .stdout(predicate::str::contains("checkout (1000ms)"))
        .stdout(predicate::str::contains("Timeout exceeded"));
}

#[test]
fn parse_json_emits_canonical_suites() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "report.json", FLAT_REPORT);

    let output = testmgmt()
        .args(["parse", "--format", "json"])
        .arg(temp_dir.path().join("report.json"))
        .output()
        .expect("run");
    assert!(output.status.success());

    let suites: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(suites[0]["sourceFile"], "cart.spec.ts");
    assert_eq!(suites[0]["tests"][1]["title"], "checkout");
    assert_eq!(suites[0]["tests"][1]["status"], "timedOut");
    assert_eq!(suites[0]["tests"][1]["durationMs"], 1000);
}

#[test]
fn parse_missing_report_fails() {
    let temp_dir = TempDir::new().unwrap();

    testmgmt()
        .arg("parse")
        .arg(temp_dir.path().join("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Playwright report file not found"));
}

#[test]
fn init_writes_template_once() {
    let temp_dir = TempDir::new().unwrap();

    testmgmt()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created testmgmt.toml"));

    let written = fs::read_to_string(temp_dir.path().join("testmgmt.toml")).unwrap();
    assert!(written.contains("[service]"));

    testmgmt()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn validate_prints_settings() {
    let temp_dir = TempDir::new().unwrap();
    write(
        temp_dir.path(),
        "testmgmt.toml",
        r#"
        [service]
        username = "ci-bot"
        access_key = "${TESTMGMT_CLI_TEST_KEY}"

        [upload]
        project_id = 42
        test_run_name = "Nightly"
        "#,
    );

    testmgmt()
        .current_dir(temp_dir.path())
        .env("TESTMGMT_CLI_TEST_KEY", "secret")
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid!"))
        .stdout(predicate::str::contains("Project: 42"))
        .stdout(predicate::str::contains("secret").not());
}

#[test]
fn validate_rejects_missing_config() {
    let temp_dir = TempDir::new().unwrap();

    testmgmt()
        .current_dir(temp_dir.path())
        .arg("validate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn parse_singular_counts() {
    let temp_dir = TempDir::new().unwrap();
    write(
        temp_dir.path(),
        "report.json",
        r#"{"suites": [{"file": "a.spec.ts", "tests": [{"title": "only", "status": "passed"}]}]}"#,
    );

    testmgmt()
        .arg("parse")
        .arg(temp_dir.path().join("report.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Parsed 1 test in 1 file:"))
        .stdout(predicate::str::contains("failing").not());
}

const TIMESTAMP: &str = "2024-01-01T00:00:00Z";

fn flat_report(status: &str) -> String {
    json!({
        "suites": [{
            "file": "login.spec.ts",
            "tests": [{"title": "Login works", "status": status, "duration": 42}]
        }]
    })
    .to_string()
}

fn write_config(root: &Path, server: &MockServer, upload_extra: &str, report_section: &str) {
    let config = format!(
        r#"
[service]
username = "ci-bot"
access_key = "secret"
base_url = "{}"

[upload]
project_id = 99
test_run_name = "From config"
{}

{}
"#,
        server.uri(),
        upload_extra,
        report_section
    );
    write(root, "testmgmt.toml", &config);
}

/// Mounts one full upload pass for project 1 that finalizes with `final_status`.
async fn mount_upload(server: &MockServer, run_name: &str, final_status: &str) {
    let run = |status: &str| {
        json!({
            "id": 11,
            "project_id": 1,
            "name": run_name,
            "status": status,
            "created_at": TIMESTAMP,
            "updated_at": TIMESTAMP
        })
    };

    Mock::given(method("POST"))
        .and(path("/projects/1/test-runs"))
        .and(body_json(json!({"name": run_name, "status": "in_progress"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(run("in_progress")))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/projects/1/test-cases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/projects/1/test-cases"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 21,
            "project_id": 1,
            "title": "Login works",
            "created_at": TIMESTAMP,
            "updated_at": TIMESTAMP
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/projects/1/test-runs/11/test-results"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 31,
            "test_case_id": 21,
            "test_run_id": 11,
            "status": final_status,
            "created_at": TIMESTAMP,
            "updated_at": TIMESTAMP
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/projects/1/test-runs/11"))
        .and(body_json(json!({"status": final_status})))
        .respond_with(ResponseTemplate::new(200).set_body_json(run(final_status)))
        .expect(1)
        .mount(server)
        .await;
}

/// Runs the binary off the async runtime so the mock server keeps serving.
async fn run_testmgmt(dir: &Path, args: Vec<String>) -> std::process::Output {
    let dir = dir.to_path_buf();
    tokio::task::spawn_blocking(move || {
        testmgmt()
            .current_dir(dir)
            .args(args)
            .output()
            .expect("run")
    })
    .await
    .expect("join")
}

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|a| a.to_string()).collect()
}

#[tokio::test(flavor = "multi_thread")]
async fn upload_report_flag_beats_config_path() {
    let server = MockServer::start().await;
    mount_upload(&server, "CLI run", "passed").await;

    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "out/passed.json", &flat_report("passed"));
    write_config(
        temp_dir.path(),
        &server,
        "",
        "[report]\npath = \"does-not-exist.json\"",
    );

    let output = run_testmgmt(
        temp_dir.path(),
        args(&[
            "upload",
            "--report",
            "out/passed.json",
            "--project",
            "1",
            "--run-name",
            "CLI run",
            "--create-test-cases",
        ]),
    )
    .await;

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    server.verify().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn upload_config_path_beats_discovery() {
    let server = MockServer::start().await;
    mount_upload(&server, "From config", "passed").await;

    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "configured.json", &flat_report("passed"));
    write(temp_dir.path(), "test-results.json", &flat_report("failed"));
    write_config(
        temp_dir.path(),
        &server,
        "create_test_cases = true",
        "[report]\npath = \"configured.json\"",
    );

    let output = run_testmgmt(temp_dir.path(), args(&["upload", "--project", "1"])).await;

    assert_eq!(output.status.code(), Some(0));
    server.verify().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn upload_discovers_report_and_fails_on_failed_test() {
    let server = MockServer::start().await;
    mount_upload(&server, "From config", "failed").await;

    let temp_dir = TempDir::new().unwrap();
    write(
        temp_dir.path(),
        "web/playwright-report/report.json",
        &flat_report("failed"),
    );
    write_config(
        temp_dir.path(),
        &server,
        "create_test_cases = true",
        "[report]\nroot_dir = \"web\"",
    );

    let output = run_testmgmt(temp_dir.path(), args(&["upload", "--project", "1"])).await;

    assert_eq!(output.status.code(), Some(1));
    server.verify().await;
}

#[test]
fn upload_without_any_report_fails() {
    let temp_dir = TempDir::new().unwrap();
    write(
        temp_dir.path(),
        "testmgmt.toml",
        r#"
        [service]
        username = "ci-bot"
        access_key = "secret"
        base_url = "http://127.0.0.1:1"

        [upload]
        project_id = 1
        test_run_name = "Nightly"
        "#,
    );

    testmgmt()
        .current_dir(temp_dir.path())
        .arg("upload")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No Playwright report found"));
}
