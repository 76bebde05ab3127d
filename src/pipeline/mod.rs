//! The fetch → analyze → report pipeline of one run.
//!
//! ```text
//! connect ──► fetch::run ──► frequency::analyze ──► grouping report ──► report::report_run
//!    │         (pages ∥)       (chart + word_frequency)   (stdout)          (stats)
//!    └──────────────────────────── close (always) ◄──────────────────────────────┘
//! ```
//!
//! The storage connection is opened once before any page is fetched and
//! closed exactly once after the last step, whether or not the run succeeded.
//! If it cannot be opened, nothing else runs.

use crate::config::RunConfig;
use crate::error::{RunError, StoreError};
use crate::models::RunStats;
use crate::outputs::chart::ChartSink;
use crate::outputs::grouping;
use crate::scrapers::Extractor;
use crate::store::DocumentStore;
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info, instrument};

mod context;
pub mod fetch;
pub mod frequency;
pub mod report;

pub use context::RunContext;

/// Run the whole job against the store produced by `connect`.
pub async fn execute<C, Fut>(
    config: RunConfig,
    connect: C,
    extractor: Arc<dyn Extractor>,
    chart: Arc<dyn ChartSink>,
) -> Result<RunStats, RunError>
where
    C: FnOnce() -> Fut,
    Fut: Future<Output = Result<Arc<dyn DocumentStore>, StoreError>>,
{
    let started_at = Utc::now();
    let store = connect().await.map_err(RunError::Connection)?;

    let ctx = RunContext::new(config, started_at, store, extractor, chart);
    let result = run(&ctx).await;
    if let Err(e) = &result {
        error!(run_id = %ctx.run_id, error = %e, "Run failed");
    }
    ctx.store.close().await;
    result
}

/// Every step after fetching runs as long as the store is open. A failed
/// analysis is returned only after the run's stats were written.
#[instrument(level = "info", skip_all, fields(run_id = %ctx.run_id, total_pages = ctx.config.total_pages))]
async fn run(ctx: &RunContext) -> Result<RunStats, RunError> {
    let fetched = fetch::run(ctx, ctx.config.total_pages).await?;

    let analysis_error = match frequency::analyze(ctx, &fetched.corpus).await {
        Ok(_) => None,
        Err(e) if e.is_closed() => return Err(e.into()),
        Err(e) => {
            error!(error = %e, "Word frequency analysis failed");
            Some(e)
        }
    };

    grouping::print_by_update_date(ctx.store.as_ref()).await;
    let stats = report::report_run(ctx, fetched.totals).await?;
    info!(elapsed_seconds = stats.elapsed_seconds, "Run complete");
    match analysis_error {
        Some(e) => Err(e.into()),
        None => Ok(stats),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Collection, MemoryStore};
    use crate::testing::{article, test_config, FakeExtractor, FlakyStore, RecordingChart};

    #[tokio::test]
    async fn test_connection_failure_runs_nothing() {
        let extractor = Arc::new(FakeExtractor::default());
        let chart = Arc::new(RecordingChart::default());

        let result = execute(
            test_config(3),
            || async { Err::<Arc<dyn DocumentStore>, _>(StoreError::Closed) },
            extractor.clone(),
            chart.clone(),
        )
        .await;

        assert!(matches!(result, Err(RunError::Connection(_))));
        assert_eq!(extractor.calls(), 0);
        assert!(chart.rendered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_full_run_writes_every_collection_and_closes() {
        let store = Arc::new(MemoryStore::new());
        let extractor = Arc::new(
            FakeExtractor::default()
                .with_page(
                    "https://news.test/page/1/",
                    vec![
                        article("https://news.test/a", "Ankara ankara meclis"),
                        article("https://news.test/b", "meclis bugün"),
                    ],
                )
                .failing_on("https://news.test/page/3/"),
        );
        let chart = Arc::new(RecordingChart::default());
        let handle = store.clone();

        let stats = execute(
            test_config(3),
            move || async move { Ok(handle as Arc<dyn DocumentStore>) },
            extractor.clone(),
            chart.clone(),
        )
        .await
        .unwrap();

        assert_eq!(stats.success_count, 2);
        assert_eq!(stats.failure_count, 1);
        assert_eq!(stats.total_processed, 2);
        assert_eq!(store.count(Collection::News), 2);
        assert_eq!(store.count(Collection::Stats), 1);
        assert_eq!(store.count(Collection::WordFrequency), 3);
        assert_eq!(store.documents(Collection::WordFrequency)[0]["word"], "ankara");
        assert_eq!(chart.rendered.lock().unwrap().len(), 1);
        assert!(store.is_closed());
    }

    #[tokio::test]
    async fn test_store_failure_still_closes_and_skips_stats() {
        let store = Arc::new(MemoryStore::new());
        store.close().await;
        let extractor = Arc::new(
            FakeExtractor::default()
                .with_page("https://news.test/page/1/", vec![article("https://news.test/a", "x")]),
        );
        let handle = store.clone();

        let result = execute(
            test_config(2),
            move || async move { Ok(handle as Arc<dyn DocumentStore>) },
            extractor,
            Arc::new(RecordingChart::default()),
        )
        .await;

        assert!(matches!(result, Err(RunError::Store(StoreError::Closed))));
        assert_eq!(store.count(Collection::Stats), 0);
        assert!(store.is_closed());
    }

    /// Page `n` holds one article, `https://news.test/a/{n}`.
    fn one_article_per_page(total_pages: u32) -> FakeExtractor {
        (1..=total_pages).fold(FakeExtractor::default(), |fake, n| {
            fake.with_page(
                format!("https://news.test/page/{n}/"),
                vec![article(&format!("https://news.test/a/{n}"), "gündem haber")],
            )
        })
    }

    #[tokio::test]
    async fn test_failed_upsert_on_one_page_still_analyzes_and_reports() {
        let store = Arc::new(FlakyStore::failing_upsert_of("https://news.test/a/7"));
        let handle = store.clone();

        let stats = execute(
            test_config(50),
            move || async move { Ok(handle as Arc<dyn DocumentStore>) },
            Arc::new(one_article_per_page(50)),
            Arc::new(RecordingChart::default()),
        )
        .await
        .unwrap();

        assert_eq!(stats.success_count, 49);
        assert_eq!(stats.failure_count, 1);
        assert_eq!(stats.total_processed, 49);
        assert_eq!(store.inner.count(Collection::News), 49);
        assert_eq!(store.inner.count(Collection::WordFrequency), 2);
        assert_eq!(store.inner.count(Collection::Stats), 1);
        assert!(store.inner.is_closed());
    }

    #[tokio::test]
    async fn test_failed_analysis_still_writes_stats() {
        let store = Arc::new(FlakyStore::failing_inserts_into(Collection::WordFrequency));
        let handle = store.clone();

        let result = execute(
            test_config(2),
            move || async move { Ok(handle as Arc<dyn DocumentStore>) },
            Arc::new(one_article_per_page(2)),
            Arc::new(RecordingChart::default()),
        )
        .await;

        assert!(matches!(result, Err(RunError::Store(StoreError::Query(_)))));
        assert_eq!(store.inner.count(Collection::Stats), 1);
        assert_eq!(store.inner.count(Collection::News), 2);
        assert!(store.inner.is_closed());
    }
}
