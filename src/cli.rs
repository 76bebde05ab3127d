//! Command-line interface definitions for the news scraper.
//!
//! Every flag overrides the matching field of the YAML config file, which in
//! turn overrides the built-in defaults (see [`crate::config::RunConfig`]).

use clap::Parser;

/// Command-line arguments for a scrape run.
///
/// # Examples
///
/// ```sh
/// # Scrape the default 50 pages into Postgres
/// news_scrape --database-url postgres://localhost:5432
///
/// # Quick local run without a database
/// news_scrape --in-memory --total-pages 2
///
/// # Use a config file and override the chart location
/// news_scrape -c scrape.yaml --chart-path ./out/words.svg
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Listing URL template; `{page}` is replaced by the page number
    #[arg(long)]
    pub base_url: Option<String>,

    /// Number of listing pages to scrape, starting at 1
    #[arg(short = 'p', long)]
    pub total_pages: Option<u32>,

    /// Number of most frequent words to keep
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Pages processed concurrently
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,

    /// Postgres connection URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Database name, overrides the one in the connection URL
    #[arg(long, env = "DATABASE_NAME")]
    pub database_name: Option<String>,

    /// Where the word frequency bar chart is written
    #[arg(long)]
    pub chart_path: Option<String>,

    /// Log file that receives a copy of every log line
    #[arg(long, default_value = "logs.log")]
    pub log_file: String,

    /// Keep documents in memory instead of connecting to Postgres
    #[arg(long)]
    pub in_memory: bool,
}
