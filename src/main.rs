//! testmgmt CLI - Upload Playwright results to BrowserStack Test Management.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use testmgmt::client::BrowserStackClient;
use testmgmt::config::{self, CONFIG_TEMPLATE, DEFAULT_CONFIG_FILE};
use testmgmt::report::{self, CanonicalTestSuite, TestStatus};
use testmgmt::upload::{ConsoleReporter, Uploader, pluralize};

#[derive(Parser)]
#[command(name = "testmgmt")]
#[command(about = "Upload Playwright results to BrowserStack Test Management", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a Playwright report as a new test run
    Upload {
        /// Report file (overrides config and discovery)
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Override the target project
        #[arg(short, long)]
        project: Option<u64>,

        /// Override the test run name
        #[arg(long)]
        run_name: Option<String>,

        /// Override the test run description
        #[arg(long)]
        description: Option<String>,

        /// Override the test plan
        #[arg(long)]
        plan: Option<u64>,

        /// Create test cases for tests that match none
        #[arg(long)]
        create_test_cases: bool,
    },

    /// Parse a report and print the canonical suites
    Parse {
        /// Report file
        report: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Look for a report in the conventional locations
    Find {
        /// Directory to search
        #[arg(default_value = ".")]
        root: PathBuf,
    },

    /// Validate configuration file
    Validate,

    /// Initialize a new configuration file
    Init,
}

/// Command-line overrides applied on top of the `[upload]` section.
struct UploadOverrides {
    report: Option<PathBuf>,
    project: Option<u64>,
    run_name: Option<String>,
    description: Option<String>,
    plan: Option<u64>,
    create_test_cases: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Upload {
            report,
            project,
            run_name,
            description,
            plan,
            create_test_cases,
        } => {
            let overrides = UploadOverrides {
                report,
                project,
                run_name,
                description,
                plan,
                create_test_cases,
            };
            upload(&cli.config, overrides, cli.verbose).await
        }
        Commands::Parse { report, format } => parse(&report, &format),
        Commands::Find { root } => find(&root),
        Commands::Validate => validate_config(&cli.config),
        Commands::Init => init_config(),
    }
}

async fn upload(config_path: &Path, overrides: UploadOverrides, verbose: bool) -> Result<()> {
    // Load configuration
    let mut config = config::load_config(config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("Loaded configuration from {}", config_path.display());

    // Apply overrides
    if let Some(project) = overrides.project {
        config.upload.project_id = project;
    }
    if let Some(run_name) = overrides.run_name {
        config.upload.test_run_name = run_name;
    }
    if let Some(description) = overrides.description {
        config.upload.test_run_description = Some(description);
    }
    if let Some(plan) = overrides.plan {
        config.upload.test_plan_id = Some(plan);
    }
    if overrides.create_test_cases {
        config.upload.create_test_cases = true;
    }

    let report_path = match overrides.report.or_else(|| config.report.path.clone()) {
        Some(path) => path,
        None => report::find_report(&config.report.root_dir).with_context(|| {
            format!(
                "No Playwright report found under {}",
                config.report.root_dir.display()
            )
        })?,
    };

    let client = BrowserStackClient::new(config.service.client_config());
    let uploader = Uploader::new(&client, config.upload.options())
        .with_reporter(ConsoleReporter::new(verbose));

    let outcome = uploader
        .run(&report_path)
        .await
        .with_context(|| format!("Failed to upload {}", report_path.display()))?;

    std::process::exit(outcome.exit_code());
}

fn parse(report_path: &Path, format: &str) -> Result<()> {
    let suites = report::parse_report(report_path)?;

    match format {
        "json" => {
            let json = serde_json::to_string_pretty(&suites)?;
            println!("{}", json);
        }
        _ => print_suites(&suites),
    }

    Ok(())
}

fn print_suites(suites: &[CanonicalTestSuite]) {
    println!(
        "Parsed {} in {}:",
        pluralize(report::total_tests(suites), "test"),
        pluralize(suites.len(), "file")
    );

    for suite in suites {
        println!();
        let failures = suite.failures();
        if failures > 0 {
            println!(
                "{} {}",
                console::style(&suite.source_file).bold(),
                console::style(format!("({} failing)", failures)).red()
            );
        } else {
            println!("{}", console::style(&suite.source_file).bold());
        }
        for test in &suite.tests {
            let status = match test.status {
                TestStatus::Passed => console::style("PASS").green(),
                TestStatus::Failed => console::style("FAIL").red(),
                TestStatus::TimedOut => console::style("TIME").red(),
                TestStatus::Skipped => console::style("SKIP").yellow(),
            };
            println!("  {} {} ({}ms)", status, test.title, test.duration_ms);

            if let Some(error) = &test.error {
                for line in error.message.lines() {
                    println!("      {}", console::style(line).dim());
                }
            }
        }
    }
}

fn find(root: &Path) -> Result<()> {
    match report::find_report(root) {
        Some(path) => {
            println!("{}", path.display());
            Ok(())
        }
        None => {
            eprintln!("No Playwright report found under {}", root.display());
            std::process::exit(1);
        }
    }
}

fn validate_config(config_path: &Path) -> Result<()> {
    match config::load_config(config_path) {
        Ok(config) => {
            println!("Configuration is valid!");
            println!();
            println!("Settings:");
            println!("  Username: {}", config.service.username);
            println!(
                "  Endpoint: {}",
                config
                    .service
                    .base_url
                    .as_deref()
                    .unwrap_or(testmgmt::client::DEFAULT_BASE_URL)
            );
            println!("  Project: {}", config.upload.project_id);
            println!("  Test run name: {}", config.upload.test_run_name);
            if let Some(plan) = config.upload.test_plan_id {
                println!("  Test plan: {}", plan);
            }
            println!("  Create test cases: {}", config.upload.create_test_cases);

            match &config.report.path {
                Some(path) => println!("  Report: {}", path.display()),
                None => println!(
                    "  Report: discovered under {}",
                    config.report.root_dir.display()
                ),
            }

            Ok(())
        }
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn init_config() -> Result<()> {
    let path = PathBuf::from(DEFAULT_CONFIG_FILE);
    if path.exists() {
        bail!(
            "{} already exists. Remove it first or edit manually.",
            DEFAULT_CONFIG_FILE
        );
    }

    std::fs::write(&path, CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Created {}", DEFAULT_CONFIG_FILE);
    println!();
    println!("Set BROWSERSTACK_USERNAME and BROWSERSTACK_ACCESS_KEY, edit the project id, then run:");
    println!("  testmgmt upload");

    Ok(())
}
