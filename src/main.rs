//! graphql-sync main entry point
//!
//! This is the command-line interface for the cost-aware GraphQL product sync.

use anyhow::Context;
use clap::Parser;
use graphql_sync::config::{load_config_with_hash, validate, Config};
use graphql_sync::output::print_outcome;
use graphql_sync::{HttpTransport, Paginator};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// graphql-sync: fetch a paginated GraphQL connection within its cost budget
///
/// Products are fetched page by page, waiting whenever the server's query-cost
/// budget runs low and retrying transient failures with exponential backoff.
#[derive(Parser, Debug)]
#[command(name = "graphql-sync")]
#[command(version)]
#[command(about = "Cost-aware GraphQL pagination", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// GraphQL endpoint URL
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Total products to fetch
    #[arg(long, value_name = "N")]
    total: Option<usize>,

    /// Products per request page
    #[arg(long, value_name = "N")]
    page_size: Option<usize>,

    /// HTTP timeout in milliseconds
    #[arg(long, value_name = "N")]
    timeout_ms: Option<u64>,

    /// Only print the summary report, not the product list
    #[arg(long)]
    no_list: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_effective_config(&cli)?;

    println!("=== graphql_sync ===");
    println!("Endpoint:   {}", config.client.endpoint);
    println!("Total:      {}", config.fetch.total);
    println!("Page size:  {}", config.fetch.page_size);
    println!("Timeout:    {} ms", config.client.timeout_ms);
    println!("====================");

    let transport = HttpTransport::from_config(&config.client)
        .context("Failed to build GraphQL transport")?;

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let mut paginator = Paginator::new(
        transport,
        config.throttle.tracker(),
        config.retry.policy(),
    )
    .with_cancellation(cancel);

    let outcome = paginator
        .fetch_all(config.fetch.total, config.fetch.page_size)
        .await;

    print_outcome(&outcome, !cli.no_list)?;

    Ok(())
}

/// Loads the config file (if any) and applies command-line overrides
fn load_effective_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::debug!("No configuration file given; using defaults");
            Config::default()
        }
    };

    if let Some(endpoint) = &cli.endpoint {
        config.client.endpoint = endpoint.clone();
    }
    if let Some(total) = cli.total {
        config.fetch.total = total;
    }
    if let Some(page_size) = cli.page_size {
        config.fetch.page_size = page_size;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.client.timeout_ms = timeout_ms;
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Cancels the run on Ctrl-C so the partial result still gets reported
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received; stopping after the current step");
            cancel.cancel();
        }
    });
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("graphql_sync=info,warn"),
            1 => EnvFilter::new("graphql_sync=debug,info"),
            2 => EnvFilter::new("graphql_sync=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
