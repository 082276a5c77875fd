//! CLI for the issue harvester.
//!
//! This tool collects GitHub issues, their comments and their binary
//! attachments into a local durable store, either one issue at a time, per
//! repository, or across a whole organization.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use issue_harvester::{
    CollectionRequest, CollectionResult, Collector, CollectorConfig, CollectorError,
    DateRangeArgs, IssueStateFilter, RequestArgs, StorageStats, DEFAULT_DOWNLOAD_CONCURRENCY,
    DEFAULT_MAX_ATTACHMENT_SIZE_MB,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Issue Harvester - Collect GitHub issues, comments and attachments into a local store.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect issues from GitHub into the local store.
    Collect(CollectArgs),
    /// Print statistics for the local store.
    Status(StatusArgs),
}

#[derive(Parser, Debug)]
struct CollectArgs {
    /// GitHub organization to collect from.
    #[arg(long)]
    org: String,

    /// Repository to collect from; omit to sweep the whole organization.
    #[arg(long)]
    repo: Option<String>,

    /// Specific issue number to fetch; requires --repo.
    #[arg(long)]
    issue_number: Option<u64>,

    /// Label filter; repeat for multiple labels (all must match).
    #[arg(long = "label")]
    labels: Vec<String>,

    /// Issue state filter: open, closed or all.
    #[arg(long, default_value = "closed")]
    state: IssueStateFilter,

    /// Maximum number of issues to collect.
    #[arg(long, default_value_t = 10)]
    limit: usize,

    /// GitHub Personal Access Token.
    #[arg(long, env = "GITHUB_TOKEN")]
    token: String,

    /// Skip downloading detected attachments.
    #[arg(long)]
    no_download_attachments: bool,

    /// Per-attachment size ceiling in megabytes.
    #[arg(long, default_value_t = DEFAULT_MAX_ATTACHMENT_SIZE_MB)]
    max_attachment_size: u64,

    /// Maximum concurrent attachment downloads.
    #[arg(long, default_value_t = DEFAULT_DOWNLOAD_CONCURRENCY)]
    concurrency: usize,

    /// Only issues created on or after this date (YYYY-MM-DD).
    #[arg(long)]
    created_after: Option<NaiveDate>,

    /// Only issues created on or before this date (YYYY-MM-DD).
    #[arg(long)]
    created_before: Option<NaiveDate>,

    /// Only issues updated on or after this date (YYYY-MM-DD).
    #[arg(long)]
    updated_after: Option<NaiveDate>,

    /// Only issues updated on or before this date (YYYY-MM-DD).
    #[arg(long)]
    updated_before: Option<NaiveDate>,

    /// Only issues created in the last N days.
    #[arg(long)]
    last_days: Option<u32>,

    /// Only issues created in the last N weeks.
    #[arg(long)]
    last_weeks: Option<u32>,

    /// Only issues created in the last N months.
    #[arg(long)]
    last_months: Option<u32>,

    /// Repository to skip in organization mode; repeatable.
    #[arg(long = "exclude-repo")]
    exclude_repo: Vec<String>,

    /// Comma-separated repositories to skip in organization mode.
    #[arg(long = "exclude-repos")]
    exclude_repos: Option<String>,

    /// Root directory of the local store.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct StatusArgs {
    /// Root directory of the local store.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    init_tracing();

    // Parse arguments
    let args = Args::parse();

    match args.command {
        Command::Collect(collect_args) => match collect(collect_args).await {
            Ok(result) => {
                print_result(&result);
                if result.is_complete() {
                    ExitCode::from(0)
                } else {
                    ExitCode::from(1)
                }
            }
            Err(e) => {
                error!(error = %e, "Collection failed");
                ExitCode::from(2)
            }
        },
        Command::Status(status_args) => match status(status_args) {
            Ok(stats) => {
                print_stats(&stats);
                ExitCode::from(0)
            }
            Err(e) => {
                error!(error = %e, "Could not read store");
                ExitCode::from(2)
            }
        },
    }
}

/// Initializes tracing with environment filter support.
///
/// Tracing is Rust's structured logging/diagnostics framework. Unlike traditional
/// logging, it's async-aware and captures contextual, structured data rather than
/// just text. The subscriber configured here determines how events (from macros
/// like `info!`, `debug!`, etc.) are collected and displayed.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        // Use compact formatting without module target paths for cleaner output
        .with(fmt::layer().compact().with_target(false))
        // Allow runtime log filtering via RUST_LOG env var (e.g., RUST_LOG=debug)
        // Falls back to "info" level if RUST_LOG is not set or invalid
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        // Register as the global default subscriber
        .init();
}

/// Validates the arguments and runs one collection.
async fn collect(args: CollectArgs) -> Result<CollectionResult, CollectorError> {
    let request = CollectionRequest::validate(RequestArgs {
        org: args.org,
        repo: args.repo,
        issue_number: args.issue_number,
        labels: args.labels,
        state: args.state,
        limit: args.limit,
        dates: DateRangeArgs {
            created_after: args.created_after,
            created_before: args.created_before,
            updated_after: args.updated_after,
            updated_before: args.updated_before,
            last_days: args.last_days,
            last_weeks: args.last_weeks,
            last_months: args.last_months,
        },
        exclude_repo: args.exclude_repo,
        exclude_repos: args.exclude_repos,
    })?;

    let config = CollectorConfig::new(args.data_dir, args.token)
        .with_download_attachments(!args.no_download_attachments)
        .with_max_attachment_size_mb(args.max_attachment_size)
        .with_concurrency(args.concurrency);

    let collector = Collector::new(config)?;
    collector.collect(&request).await
}

/// Reads store statistics without touching the network.
fn status(args: StatusArgs) -> Result<StorageStats, CollectorError> {
    // The status path never issues API calls, so an empty token is fine.
    let config = CollectorConfig::new(args.data_dir, String::new());
    Collector::new(config)?.storage_stats()
}

/// Prints the outcome of one collection run.
fn print_result(result: &CollectionResult) {
    println!("\nSummary:");
    println!("  Issues saved: {}", result.total_saved);
    for (repository, count) in &result.per_repository {
        println!("    {repository}: {count}");
    }
    println!(
        "  Attachments downloaded: {}",
        result.attachments_downloaded
    );
    println!("  Attachments skipped: {}", result.attachments_skipped);

    if !result.warnings.is_empty() {
        println!("  Skipped repositories:");
        for warning in &result.warnings {
            println!("    {}: {}", warning.repository, warning.reason);
        }
    }

    print_stats(&result.storage);
}

/// Prints store statistics.
fn print_stats(stats: &StorageStats) {
    println!("\nStore:");
    println!("  Total issues: {}", stats.total_issues);
    println!("  Total bytes: {}", stats.total_bytes);
    for (repository, count) in &stats.per_repository {
        println!("    {repository}: {count}");
    }
}
