//! test-summary - per-subproject summary of JUnit XML test reports
//!
//! Scans a multi-project build for test report files, groups them by the
//! subproject owning them and prints one summary row per subproject.
//!
//! Exit codes:
//!   0 - Report generated (failing tests are reported, not an error)
//!   1 - Runtime error (unreadable root, malformed report, bad config, etc.)
//!   2 - Failures found and --fail-on-failure set

mod analysis;
mod cli;
mod config;
mod error;
mod junit;
mod models;
mod report;
mod scanner;

use anyhow::{Context, Result};
use cli::Args;
use config::{Config, CONFIG_FILE_NAME};
use models::Report;
use report::RenderOptions;
use scanner::{ReportScanner, ScanConfig};
use std::path::Path;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config decides verbosity, so it is loaded before logging starts
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(log_level(&args, &config));

    debug!("test-summary v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {:?}", config);

    match run(&args, &config) {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("Summary failed: {}", e);
            eprintln!("❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .test-summary.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize the scan root, report pattern and table columns.");
    Ok(())
}

/// Quiet wins over verbose; verbose comes from the flag or the config file.
fn log_level(args: &Args, config: &Config) -> tracing::Level {
    if args.quiet {
        tracing::Level::ERROR
    } else if config.general.verbose {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    }
}

/// Initialize logging on stderr; `RUST_LOG` overrides the level.
fn init_logging(level: tracing::Level) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the summary. Returns exit code (0 or 2).
fn run(args: &Args, config: &Config) -> Result<i32> {
    // Handle --dry-run: list report files and exit
    if args.dry_run {
        let scan_config = ScanConfig::from(&config.discovery);
        return handle_dry_run(&config.discovery.root, &scan_config);
    }

    let report = build_report(config)?;
    info!(
        "Summarized {} report file(s) into {} subproject(s)",
        report.report_files,
        report.subprojects.len()
    );

    let rendered = report::render(
        &report,
        config.report.format,
        &RenderOptions::from(&config.report),
    )?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    report::write_output(&mut out, &rendered).context("Failed to write summary")?;

    if args.fail_on_failure && report.has_failures() {
        eprintln!("⛔ Some subprojects have failing tests. Failing (exit code 2).");
        return Ok(2);
    }

    Ok(0)
}

/// Discover, parse and aggregate the reports selected by `config`.
fn build_report(config: &Config) -> Result<Report> {
    let root = &config.discovery.root;
    let scan_config = ScanConfig::from(&config.discovery);

    analysis::summarize(root, &scan_config, config.parser.strategy)
        .with_context(|| format!("Failed to summarize test reports under {}", root.display()))
}

/// Handle --dry-run: list matching report files per subproject, exit.
fn handle_dry_run(root: &Path, scan_config: &ScanConfig) -> Result<i32> {
    let file_scanner = ReportScanner::new(root.to_path_buf(), scan_config.clone())?;
    let files = file_scanner.scan()?;

    if files.is_empty() {
        println!(
            "No report files matching '{}' under {}",
            scan_config.pattern,
            root.display()
        );
        return Ok(0);
    }

    for (subproject, reports) in analysis::group_by_subproject(&files) {
        println!("{} ({} file(s))", subproject, reports.len());
        for file in reports {
            println!("  {}", file.relative_path);
        }
    }
    println!("Total: {} file(s)", files.len());

    Ok(0)
}

/// Load configuration: explicit path, then the working directory, then the
/// scan root given on the command line, then defaults.
fn load_config(args: &Args) -> Result<Config> {
    let loaded = match args.config {
        Some(ref config_path) => Some(Config::load(config_path)?),
        None => Config::load_default()?,
    };

    let loaded = match (loaded, args.root.as_ref()) {
        (Some(config), _) => Some(config),
        (None, Some(root)) => Config::load_from_dir(root)?,
        (None, None) => None,
    };

    let mut config = loaded.unwrap_or_default();
    config.merge_with_args(args);
    Ok(config)
}
