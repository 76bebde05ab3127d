//! Terminal stats record of a run.

use super::RunContext;
use crate::error::StoreError;
use crate::models::{FetchTotals, RunStats};
use crate::store::{Collection, DocumentStore};
use chrono::{DateTime, Utc};
use tracing::{info, instrument};
use uuid::Uuid;

/// Build the stats record; elapsed time never goes negative.
pub fn build_stats(
    run_id: Uuid,
    totals: FetchTotals,
    started_at: DateTime<Utc>,
    recorded_at: DateTime<Utc>,
) -> RunStats {
    let elapsed_seconds = (recorded_at - started_at)
        .to_std()
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);

    RunStats {
        run_id,
        elapsed_seconds,
        total_processed: totals.records_total,
        success_count: totals.success_total,
        failure_count: totals.failure_total,
        started_at,
        recorded_at,
    }
}

/// Persist the one [`RunStats`] record of this run.
#[instrument(level = "info", skip_all, fields(run_id = %run_id))]
pub async fn report(
    store: &dyn DocumentStore,
    run_id: Uuid,
    totals: FetchTotals,
    started_at: DateTime<Utc>,
) -> Result<RunStats, StoreError> {
    let stats = build_stats(run_id, totals, started_at, Utc::now());
    store
        .insert_one(Collection::Stats, serde_json::to_value(&stats)?)
        .await?;

    info!(
        elapsed_seconds = stats.elapsed_seconds,
        total = stats.total_processed,
        success = stats.success_count,
        failure = stats.failure_count,
        "Recorded run stats"
    );
    Ok(stats)
}

/// [`report`] for the run described by `ctx`.
pub async fn report_run(ctx: &RunContext, totals: FetchTotals) -> Result<RunStats, StoreError> {
    report(ctx.store.as_ref(), ctx.run_id, totals, ctx.started_at).await
}
