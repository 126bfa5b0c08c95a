//! Site-Freezer main entry point
//!
//! This is the command-line interface for freezing a configured site into
//! static files.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use site_freezer::config::{load_config_with_hash, AppConfig, DEFAULT_CONFIG_FILE};
use site_freezer::crawler::{ConfiguredSeeds, Freezer, FreezerOptions};
use site_freezer::output::{print_report, write_markdown_report};
use site_freezer::{Application, ConfiguredSite};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Site-Freezer: turn a dynamic site into static files
///
/// Site-Freezer requests every route of the application declared in the
/// config file, follows the local links it renders, and writes each page
/// below the destination directory.
#[derive(Parser, Debug)]
#[command(name = "site-freezer")]
#[command(version = "1.0.0")]
#[command(about = "Freeze a dynamic site into static files", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Freeze the application into static files
    Freeze {
        /// Path to the frozen app config
        #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Output directory (overrides the config's destination)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Also write a markdown report to this file
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,

        /// Validate config and list the seed tasks without freezing
        #[arg(long)]
        dry_run: bool,
    },

    /// List the application's routes
    Routes {
        /// Path to the frozen app config
        #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Freeze {
            config,
            output,
            report,
            dry_run,
        } => {
            let config = load(&config)?;
            if dry_run {
                handle_dry_run(&config, output)
            } else {
                handle_freeze(&config, output, report.as_deref()).await
            }
        }
        Command::Routes { config } => handle_routes(&load(&config)?),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_freezer=info,warn"),
            1 => EnvFilter::new("site_freezer=debug,info"),
            2 => EnvFilter::new("site_freezer=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads and validates the config, logging its hash
fn load(path: &Path) -> Result<AppConfig> {
    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

/// Builds the freezer for a config, applying the output override
fn build_freezer(config: &AppConfig, output: Option<PathBuf>) -> Result<Freezer<ConfiguredSite>> {
    let site = ConfiguredSite::from_config(config).context("Failed to build the site")?;

    let mut options = FreezerOptions::from_config(&config.freezer);
    if let Some(output) = output {
        options.destination = output;
    }

    let mut freezer = Freezer::new(site, options);
    freezer.register_generator(ConfiguredSeeds::new(config.seeds.clone()));
    Ok(freezer)
}

/// Handles --dry-run: shows what a freeze would start from
fn handle_dry_run(config: &AppConfig, output: Option<PathBuf>) -> Result<()> {
    let freezer = build_freezer(config, output)?;
    let options = freezer.options();

    println!("=== Site-Freezer Dry Run ===\n");

    println!("Freezer Configuration:");
    println!("  Destination: {}", options.destination.display());
    println!(
        "  Intercept URL generation: {}",
        options.intercept_url_generation
    );
    match options.timeout {
        Some(timeout) => println!("  Timeout: {}s", timeout.as_secs()),
        None => println!("  Timeout: none"),
    }

    let context = freezer.app().context();
    println!("\nRequest Context:");
    println!("  Scheme: {}", context.scheme());
    println!("  Host: {}", context.host());
    println!("  Base path: {}", context.base_path());

    let tasks = freezer.seed_tasks()?;
    println!("\nSeed Tasks ({}):", tasks.len());
    for task in &tasks {
        println!("  - {}", task);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start freezing with {} seed tasks", tasks.len());

    Ok(())
}

/// Handles the routes subcommand
fn handle_routes(config: &AppConfig) -> Result<()> {
    let site = ConfiguredSite::from_config(config).context("Failed to build the site")?;

    println!("Routes ({}):", site.route_table().len());
    for route in site.route_table().iter() {
        let params = route.pattern.parameter_names();
        if params.is_empty() {
            println!("  {:<24} {}", route.name, route.pattern.as_str());
        } else {
            println!(
                "  {:<24} {}  [{}]",
                route.name,
                route.pattern.as_str(),
                params.join(", ")
            );
        }
    }

    tracing::debug!("{} routes listed", site.routes().len());
    Ok(())
}

/// Handles the main freeze operation
async fn handle_freeze(
    config: &AppConfig,
    output: Option<PathBuf>,
    report_path: Option<&Path>,
) -> Result<()> {
    let freezer = build_freezer(config, output)?;

    // Ctrl-C stops the crawl between tasks
    let cancel = freezer.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current task");
            cancel.cancel();
        }
    });

    let report = match freezer.freeze().await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Freeze failed: {}", e);
            return Err(e.into());
        }
    };

    print_report(&report);

    if let Some(path) = report_path {
        write_markdown_report(&report, path)?;
        println!("\n✓ Report written to: {}", path.display());
    }

    Ok(())
}
