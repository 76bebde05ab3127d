//! # News Scrape
//!
//! A periodic scraping job that walks the paginated listing of a news
//! category, stores every article in a document store, and summarizes the
//! run's vocabulary.
//!
//! ## Usage
//!
//! ```sh
//! news_scrape --database-url postgres://localhost:5432 --total-pages 50
//! news_scrape --in-memory -p 2
//! ```
//!
//! ## Architecture
//!
//! One run is a single pipeline:
//! 1. **Connect**: open the document store (fatal if unreachable)
//! 2. **Fetching**: scrape listing pages concurrently, upserting articles by URL
//! 3. **Analysis**: rank the most used words, chart them, store the ranking
//! 4. **Grouping**: print stored articles grouped by update date
//! 5. **Reporting**: store elapsed time and success/failure counts
//!
//! ## Exit codes
//!
//! `0` on success, `2` for configuration or storage-connection failures,
//! `1` for any other failure.

use clap::Parser;
use std::fs::OpenOptions;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod config;
mod error;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod store;
#[cfg(test)]
mod testing;
mod utils;

use cli::Cli;
use config::RunConfig;
use error::{ConfigError, RunError, StoreError};
use outputs::chart::{ChartSink, SvgBarChart};
use scrapers::{Extractor, NewsSiteExtractor};
use store::{DocumentStore, MemoryStore, PostgresStore};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    init_tracing(&args.log_file);
    info!("news_scrape starting up");
    debug!(?args, "Parsed CLI arguments");

    match start(args).await {
        Ok(stats) => {
            println!(
                "Run finished in {:.2}s: {} pages ok, {} pages failed, {} articles",
                stats.elapsed_seconds,
                stats.success_count,
                stats.failure_count,
                stats.total_processed
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "An error occurred");
            eprintln!("An error occurred: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn start(args: Cli) -> Result<models::RunStats, RunError> {
    let config = RunConfig::load(&args)?;
    info!(
        total_pages = config.total_pages,
        concurrency = config.concurrency,
        top_k = config.top_k,
        in_memory = args.in_memory,
        "Loaded configuration"
    );

    let extractor: Arc<dyn Extractor> = Arc::new(
        NewsSiteExtractor::new(config.request_timeout())
            .map_err(|e| ConfigError::Invalid(format!("cannot build HTTP client: {e}")))?,
    );
    let chart: Arc<dyn ChartSink> = Arc::new(SvgBarChart::new(&config.chart_path, config.top_k));

    let in_memory = args.in_memory;
    let database_url = config.database_url.clone();
    let database_name = config.database_name.clone();
    // One connection per in-flight page plus one for analysis and reporting.
    let max_connections = u32::try_from(config.concurrency).unwrap_or(u32::MAX).saturating_add(1);

    let connect = move || async move {
        let store: Arc<dyn DocumentStore> = if in_memory {
            Arc::new(MemoryStore::new())
        } else {
            Arc::new(PostgresStore::connect(&database_url, &database_name, max_connections).await?)
        };
        Ok::<_, StoreError>(store)
    };

    pipeline::execute(config, connect, extractor, chart).await
}

/// Log to stdout and append the same lines to `log_file`.
fn init_tracing(log_file: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match OpenOptions::new().create(true).append(true).open(log_file) {
        Ok(file) => Some(
            tfmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_timer(UtcTime::rfc_3339()),
        ),
        Err(e) => {
            eprintln!("cannot open log file {log_file}: {e}; logging to stdout only");
            None
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tfmt::layer()
                .with_target(true)
                .with_file(false)
                .with_line_number(false)
                .with_timer(UtcTime::rfc_3339()),
        )
        .with(file_layer)
        .init();
}
