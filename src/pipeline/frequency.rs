//! Word frequency analysis over the run's corpus.
//!
//! Tokens are whitespace-delimited and lowercased; punctuation stays attached
//! (`"gündem,"` and `"gündem"` are different words). Ranking is by count,
//! descending, with ties kept in first-seen order.

use super::RunContext;
use crate::error::StoreError;
use crate::models::{WordFrequencyDocument, WordFrequencyEntry};
use crate::store::Collection;
use chrono::Utc;
use indexmap::IndexMap;
use itertools::Itertools;
use tracing::{error, info, instrument};

/// The `top_k` most frequent tokens of `corpus`.
pub fn top_words(corpus: &str, top_k: usize) -> Vec<WordFrequencyEntry> {
    let lowered = corpus.to_lowercase();
    let mut counts: IndexMap<&str, u64> = IndexMap::new();
    for token in lowered.split_whitespace() {
        *counts.entry(token).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1))
        .take(top_k)
        .map(|(word, count)| WordFrequencyEntry {
            word: word.to_string(),
            count,
        })
        .collect()
}

/// Rank the corpus, chart it, and append each entry to `word_frequency`.
///
/// Chart failures are logged and ignored.
#[instrument(level = "info", skip_all, fields(corpus_bytes = corpus.len()))]
pub async fn analyze(ctx: &RunContext, corpus: &str) -> Result<Vec<WordFrequencyEntry>, StoreError> {
    let entries = top_words(corpus, ctx.config.top_k);
    info!(words = entries.len(), "Computed word frequencies");

    if let Err(e) = ctx.chart.render(&entries) {
        error!(error = %e, "An error occurred while generating the bar chart");
    }

    let recorded_at = Utc::now();
    for entry in &entries {
        let document = serde_json::to_value(WordFrequencyDocument {
            word: &entry.word,
            count: entry.count,
            run_id: ctx.run_id,
            recorded_at,
        })?;
        ctx.store.insert_one(Collection::WordFrequency, document).await?;
    }
    Ok(entries)
}
