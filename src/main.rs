//! ghsync CLI
//!
//! Reads `owner/repo` lines from stdin and applies the configured labels and
//! milestones to each repository

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use ghsync::{
    config::{load_config_from_file, DEFAULT_CONFIG_FILE},
    repository::read_repositories,
    sync::{RunReport, SyncOperation, SyncReport},
    DryRun, GitHubClient,
};

/// ghsync CLI
///
/// Syncs labels and milestones across GitHub repositories
#[derive(Parser, Debug)]
#[command(
    name = "ghsync",
    version,
    about = "ghsync syncs configuration across GitHub repositories",
    long_about = "Reads a list of repositories (one owner/repo per line) from stdin and makes \
    sure each of them has the labels and milestones defined in the configuration file. \
    Existing labels and milestones that are not configured are left alone."
)]
struct Cli {
    /// GitHub token to use for API authentication (defaults to $GITHUB_TOKEN)
    #[arg(long)]
    token: Option<String>,

    /// Configuration file in YAML (or JSON) format
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Dry run mode (don't make actual changes)
    #[arg(long)]
    dry_run: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "✗".red(), e);
        std::process::exit(1);
    }
}

/// Install the log subscriber; `RUST_LOG` takes precedence over `--verbose`
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "ghsync=debug" } else { "ghsync=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Execute synchronization
async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config_from_file(&cli.config)
        .with_context(|| format!("Error reading config file {}", cli.config.display()))?;

    let repos =
        read_repositories(std::io::stdin().lock()).context("Error reading repository list")?;

    let token = get_access_token(cli.token);
    let client = GitHubClient::new(token.as_deref())
        .await
        .context("Error creating GitHub client")?;

    let report = if cli.dry_run {
        eprintln!(
            "{} Running in dry-run mode (no changes will be made)",
            "!".yellow()
        );
        ghsync::run(&config, &repos, &DryRun::new(client)).await?
    } else {
        ghsync::run(&config, &repos, &client).await?
    };

    display_run_report(&report, cli.dry_run, cli.verbose);
    Ok(())
}

/// Display the summary of a run
fn display_run_report(report: &RunReport, dry_run: bool, verbose: bool) {
    if dry_run {
        println!("\n{} Sync preview (dry-run mode):", "•".blue());
    } else {
        println!("\n{} Sync completed:", "✓".green());
    }

    display_sync_report("Labels", &report.labels, verbose);
    display_sync_report("Milestones", &report.milestones, verbose);
}

fn display_sync_report(title: &str, report: &SyncReport, verbose: bool) {
    println!(
        "  {} ({} repositories): {} created, {} updated, {} unchanged",
        title.cyan(),
        report.repositories,
        report.created.to_string().green(),
        report.updated.to_string().yellow(),
        report.unchanged.to_string().white()
    );

    if !verbose {
        return;
    }

    for operation in &report.operations {
        match operation {
            SyncOperation::Create { resource, name } => {
                println!("    {} Create {}: {}", "+".green(), resource, name.cyan());
            }
            SyncOperation::Update {
                resource,
                name,
                changes,
            } => {
                println!("    {} Update {}: {}", "~".yellow(), resource, name.cyan());
                for change in changes {
                    println!("        {}", change.dimmed());
                }
            }
            SyncOperation::NoChange { resource, name } => {
                println!("    {} No change {}: {}", "=".white(), resource, name);
            }
        }
    }
}

/// Get access token, falling back to the GITHUB_TOKEN environment variable
fn get_access_token(arg_token: Option<String>) -> Option<String> {
    arg_token
        .or_else(|| std::env::var("GITHUB_TOKEN").ok())
        .filter(|token| !token.trim().is_empty())
}
