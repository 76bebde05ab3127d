//! Test doubles for the run's collaborators.

use crate::config::RunConfig;
use crate::error::{ChartRenderError, FetchError, StoreError};
use crate::models::{ArticleRecord, WordFrequencyEntry};
use crate::outputs::chart::ChartSink;
use crate::pipeline::RunContext;
use crate::scrapers::Extractor;
use crate::store::{Collection, DocumentGroup, DocumentStore, MemoryStore, UpsertOutcome};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn article(url: &str, text: &str) -> ArticleRecord {
    ArticleRecord {
        url: url.to_string(),
        header: format!("Header of {url}"),
        summary: "summary".to_string(),
        text: text.to_string(),
        image_urls: Vec::new(),
        publish_date: Some("2024-01-01".to_string()),
        update_date: Some("2024-01-01".to_string()),
    }
}

/// Serves canned listings; unknown URLs yield an empty page.
#[derive(Default)]
pub struct FakeExtractor {
    pages: HashMap<String, Vec<ArticleRecord>>,
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl FakeExtractor {
    pub fn with_page(mut self, url: impl Into<String>, records: Vec<ArticleRecord>) -> Self {
        self.pages.insert(url.into(), records);
        self
    }

    pub fn failing_on(mut self, url: impl Into<String>) -> Self {
        self.failing.insert(url.into());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Extractor for FakeExtractor {
    async fn extract(&self, listing_url: &str) -> Result<Vec<ArticleRecord>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(listing_url) {
            return Err(FetchError::Status {
                url: listing_url.to_string(),
                status: 503,
            });
        }
        Ok(self.pages.get(listing_url).cloned().unwrap_or_default())
    }
}

/// Records what it was asked to render, optionally failing.
#[derive(Default)]
pub struct RecordingChart {
    pub fail: bool,
    pub rendered: Mutex<Vec<Vec<WordFrequencyEntry>>>,
}

impl ChartSink for RecordingChart {
    fn render(&self, entries: &[WordFrequencyEntry]) -> Result<(), ChartRenderError> {
        self.rendered.lock().unwrap().push(entries.to_vec());
        if self.fail {
            Err(ChartRenderError::Write("display unavailable".into()))
        } else {
            Ok(())
        }
    }
}

/// A [`MemoryStore`] that rejects chosen writes with a query error.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    failing_urls: HashSet<String>,
    failing_inserts: Option<Collection>,
}

impl FlakyStore {
    pub fn failing_upsert_of(url: impl Into<String>) -> Self {
        Self {
            failing_urls: HashSet::from([url.into()]),
            ..Self::default()
        }
    }

    pub fn failing_inserts_into(collection: Collection) -> Self {
        Self {
            failing_inserts: Some(collection),
            ..Self::default()
        }
    }

    fn rejected() -> StoreError {
        StoreError::Query(sqlx::Error::Protocol("write rejected".into()))
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn upsert_one(
        &self,
        collection: Collection,
        key_field: &str,
        document: Value,
    ) -> Result<UpsertOutcome, StoreError> {
        let key = document.get(key_field).and_then(Value::as_str);
        if key.is_some_and(|k| self.failing_urls.contains(k)) {
            return Err(Self::rejected());
        }
        self.inner.upsert_one(collection, key_field, document).await
    }

    async fn insert_one(&self, collection: Collection, document: Value) -> Result<(), StoreError> {
        if self.failing_inserts == Some(collection) {
            return Err(Self::rejected());
        }
        self.inner.insert_one(collection, document).await
    }

    async fn group_by(
        &self,
        collection: Collection,
        field: &str,
    ) -> Result<Vec<DocumentGroup>, StoreError> {
        self.inner.group_by(collection, field).await
    }

    async fn close(&self) {
        self.inner.close().await
    }
}

pub fn test_config(total_pages: u32) -> RunConfig {
    RunConfig {
        base_url: "https://news.test/page/{page}/".to_string(),
        total_pages,
        concurrency: 4,
        ..RunConfig::default()
    }
}

pub fn context(
    config: RunConfig,
    store: Arc<MemoryStore>,
    extractor: Arc<FakeExtractor>,
    chart: Arc<RecordingChart>,
) -> RunContext {
    RunContext::new(
        config,
        Utc::now(),
        store as Arc<dyn DocumentStore>,
        extractor,
        chart,
    )
}
