//! Page workers and the coordinator that fans them out.
//!
//! Every listing page is an independent unit of work: a page whose listing
//! cannot be fetched, or whose articles cannot all be stored, is counted as
//! one failure and never affects the others.
//! Each worker returns its own slice of the corpus; the coordinator joins
//! them in page order once every page has finished.

use super::RunContext;
use crate::error::StoreError;
use crate::models::{ArticleRecord, FetchTotals, PageOutcome};
use crate::store::{Collection, UpsertOutcome};
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use tracing::{debug, error, info, instrument, warn};

/// What one page worker produced.
#[derive(Debug)]
pub struct PageWork {
    pub page: u32,
    pub outcome: PageOutcome,
    /// Body texts of the page's articles, in extraction order.
    pub text: String,
}

/// Result of the whole fetch phase.
#[derive(Debug)]
pub struct FetchSummary {
    pub totals: FetchTotals,
    pub corpus: String,
}

/// Scrape one listing page and upsert every article on it.
///
/// A listing fetch failure or a failed upsert is recorded in the outcome as
/// this page's failure. Articles stored before a failed upsert still count.
/// Only a closed store is returned as an error.
#[instrument(level = "info", skip(ctx))]
pub async fn process_page(ctx: &RunContext, page: u32) -> Result<PageWork, StoreError> {
    let url = ctx.config.page_url(page);

    let records = match ctx.extractor.extract(&url).await {
        Ok(records) => records,
        Err(e) => {
            warn!(%url, error = %e, "Error while processing URL");
            return Ok(PageWork {
                page,
                outcome: PageOutcome::failed(),
                text: String::new(),
            });
        }
    };

    let mut stored = 0;
    let mut broken = false;
    for record in &records {
        match upsert_article(ctx, record).await {
            Ok(UpsertOutcome::Replaced) => {
                debug!(article = %record.url, "Article already stored; replaced");
            }
            Ok(UpsertOutcome::Inserted) => {}
            Err(e) if e.is_closed() => return Err(e),
            Err(e) => {
                error!(%url, article = %record.url, error = %e, "Upsert failed");
                broken = true;
                break;
            }
        }
        stored += 1;
    }

    let text = records[..stored].iter().map(|r| r.text.as_str()).join(" ");
    let outcome = if broken {
        PageOutcome::failed_after(stored)
    } else {
        info!(%url, records = stored, "Processed URL");
        PageOutcome::succeeded(stored)
    };
    Ok(PageWork { page, outcome, text })
}

async fn upsert_article(ctx: &RunContext, record: &ArticleRecord) -> Result<UpsertOutcome, StoreError> {
    let document = serde_json::to_value(record)?;
    ctx.store
        .upsert_one(Collection::News, ArticleRecord::KEY_FIELD, document)
        .await
}

/// Process pages `1..=total_pages` on a bounded pool and reduce their outcomes.
///
/// Waits for every page before returning. If the store was closed under a
/// page, that error is returned after all pages finished.
#[instrument(level = "info", skip(ctx), fields(concurrency = ctx.config.concurrency))]
pub async fn run(ctx: &RunContext, total_pages: u32) -> Result<FetchSummary, StoreError> {
    let results: Vec<Result<PageWork, StoreError>> = stream::iter(1..=total_pages)
        .map(|page| process_page(ctx, page))
        .buffer_unordered(ctx.config.concurrency.max(1))
        .collect()
        .await;

    let mut works = Vec::with_capacity(results.len());
    let mut first_error = None;
    for result in results {
        match result {
            Ok(work) => works.push(work),
            Err(e) if first_error.is_none() => first_error = Some(e),
            Err(e) => error!(error = %e, "Additional storage failure"),
        }
    }
    if let Some(e) = first_error {
        return Err(e);
    }

    works.sort_by_key(|w| w.page);
    let totals: FetchTotals = works.iter().map(|w| w.outcome).sum();
    let corpus = works
        .iter()
        .map(|w| w.text.as_str())
        .filter(|t| !t.is_empty())
        .join(" ");

    info!(
        pages = totals.pages(),
        success = totals.success_total,
        failure = totals.failure_total,
        records = totals.records_total,
        corpus_bytes = corpus.len(),
        "Fetch phase complete"
    );
    Ok(FetchSummary { totals, corpus })
}
