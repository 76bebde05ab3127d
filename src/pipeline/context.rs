use crate::config::RunConfig;
use crate::outputs::chart::ChartSink;
use crate::scrapers::Extractor;
use crate::store::DocumentStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Everything one run needs, created at start and dropped at the end.
pub struct RunContext {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub config: RunConfig,
    pub store: Arc<dyn DocumentStore>,
    pub extractor: Arc<dyn Extractor>,
    pub chart: Arc<dyn ChartSink>,
}

impl RunContext {
    pub fn new(
        config: RunConfig,
        started_at: DateTime<Utc>,
        store: Arc<dyn DocumentStore>,
        extractor: Arc<dyn Extractor>,
        chart: Arc<dyn ChartSink>,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at,
            config,
            store,
            extractor,
            chart,
        }
    }
}
