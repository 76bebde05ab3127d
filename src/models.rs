//! Data models for scraped articles and run bookkeeping.
//!
//! - [`ArticleRecord`]: one scraped article, keyed on its `url`
//! - [`PageOutcome`]: success/failure counts for one listing page
//! - [`FetchTotals`]: run-wide reduction of all page outcomes
//! - [`WordFrequencyEntry`]: one ranked word from the run's corpus
//! - [`RunStats`]: the terminal summary record of a run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::AddAssign;
use uuid::Uuid;

/// A single article as extracted from its full-article page.
///
/// `url` is the natural identity: storing the same `url` again replaces
/// every other field of the stored document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleRecord {
    /// Absolute URL of the article page.
    pub url: String,
    /// Article headline.
    pub header: String,
    /// First paragraph of the page.
    pub summary: String,
    /// Body fragments joined with a single space.
    pub text: String,
    /// Lazy-loaded image sources in document order.
    pub image_urls: Vec<String>,
    /// `YYYY-MM-DD`, if the page carries a timestamp.
    pub publish_date: Option<String>,
    /// `YYYY-MM-DD`, if the page carries a timestamp.
    pub update_date: Option<String>,
}

impl ArticleRecord {
    /// Field the `news` collection is keyed on.
    pub const KEY_FIELD: &'static str = "url";
}

/// Result of processing one listing page.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PageOutcome {
    pub success: u32,
    pub failure: u32,
    pub records_processed: usize,
}

impl PageOutcome {
    pub fn succeeded(records_processed: usize) -> Self {
        Self {
            success: 1,
            failure: 0,
            records_processed,
        }
    }

    pub fn failed() -> Self {
        Self::failed_after(0)
    }

    /// A page that broke off after `records_processed` of its articles were stored.
    pub fn failed_after(records_processed: usize) -> Self {
        Self {
            success: 0,
            failure: 1,
            records_processed,
        }
    }
}

/// Run-wide totals produced by the fetch coordinator.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FetchTotals {
    pub success_total: u32,
    pub failure_total: u32,
    pub records_total: usize,
}

impl FetchTotals {
    /// Number of pages attempted.
    pub fn pages(&self) -> u32 {
        self.success_total + self.failure_total
    }
}

impl AddAssign<PageOutcome> for FetchTotals {
    fn add_assign(&mut self, outcome: PageOutcome) {
        self.success_total += outcome.success;
        self.failure_total += outcome.failure;
        self.records_total += outcome.records_processed;
    }
}

impl Sum<PageOutcome> for FetchTotals {
    fn sum<I: Iterator<Item = PageOutcome>>(iter: I) -> Self {
        iter.fold(FetchTotals::default(), |mut acc, outcome| {
            acc += outcome;
            acc
        })
    }
}

/// One ranked word of the run's corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordFrequencyEntry {
    pub word: String,
    pub count: u64,
}

/// How a frequency entry is persisted: tagged with the run that produced it.
#[derive(Debug, Serialize)]
pub struct WordFrequencyDocument<'a> {
    pub word: &'a str,
    pub count: u64,
    pub run_id: Uuid,
    pub recorded_at: DateTime<Utc>,
}

/// Summary of one complete run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub run_id: Uuid,
    pub elapsed_seconds: f64,
    pub total_processed: usize,
    pub success_count: u32,
    pub failure_count: u32,
    pub started_at: DateTime<Utc>,
    pub recorded_at: DateTime<Utc>,
}
