//! Typed errors for each stage of a scrape run.
//!
//! Errors local to one unit of work ([`FetchError`], [`ExtractionError`],
//! [`ChartRenderError`]) are contained where they happen. Only [`RunError`]
//! crosses the top-level boundary in `main`.

use thiserror::Error;

/// Network or transport failure while fetching a page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be completed (DNS, connect, timeout, body read).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

/// An article page did not have the structure the extractor expects.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("{url}: missing required element `{selector}`")]
    MissingElement { url: String, selector: &'static str },

    #[error("cannot resolve article link `{href}` against {base}")]
    InvalidLink { base: String, href: String },
}

/// Document store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Storage unreachable or could not be initialised.
    #[error("cannot connect to document store: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("document store query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("document for `{collection}` has no string field `{field}`")]
    MissingKey {
        collection: &'static str,
        field: String,
    },

    #[error("cannot serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("document store is closed")]
    Closed,
}

impl StoreError {
    /// The store can no longer serve any request.
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            StoreError::Closed | StoreError::Query(sqlx::Error::PoolClosed)
        )
    }
}

/// The chart sink could not produce its artifact.
#[derive(Debug, Error)]
pub enum ChartRenderError {
    #[error("chart io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("chart write error: {0}")]
    Write(String),
}

/// Invalid or unreadable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Failures that end a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Storage could not be opened; no work was attempted.
    #[error("storage connection failed: {0}")]
    Connection(#[source] StoreError),

    #[error("storage failure during run: {0}")]
    Store(#[from] StoreError),
}

impl RunError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::Config(_) | RunError::Connection(_) => 2,
            RunError::Store(_) => 1,
        }
    }
}
