//! Document store abstraction.
//!
//! The run persists three collections of JSON documents:
//!
//! | Collection | Contents | Write mode |
//! |------------|----------|------------|
//! | `news` | [`ArticleRecord`](crate::models::ArticleRecord) | upsert on `url` |
//! | `word_frequency` | ranked words tagged with the run id | append |
//! | `stats` | [`RunStats`](crate::models::RunStats) | append |
//!
//! Two backends implement [`DocumentStore`]: [`postgres::PostgresStore`] for
//! real runs and [`memory::MemoryStore`] for `--in-memory` runs and tests.

use crate::error::StoreError;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Logical collections written by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    News,
    WordFrequency,
    Stats,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::News, Collection::WordFrequency, Collection::Stats];

    pub fn name(self) -> &'static str {
        match self {
            Collection::News => "news",
            Collection::WordFrequency => "word_frequency",
            Collection::Stats => "stats",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What an upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Replaced,
}

/// Documents sharing one value of the grouping field.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentGroup {
    /// `None` when the field is missing or null.
    pub key: Option<String>,
    pub documents: Vec<Value>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert `document`, or replace the stored document whose `key_field`
    /// has the same value.
    async fn upsert_one(
        &self,
        collection: Collection,
        key_field: &str,
        document: Value,
    ) -> Result<UpsertOutcome, StoreError>;

    /// Append `document` to `collection`.
    async fn insert_one(&self, collection: Collection, document: Value) -> Result<(), StoreError>;

    /// Group `collection` by `field`, groups ascending with the `None` group first.
    async fn group_by(
        &self,
        collection: Collection,
        field: &str,
    ) -> Result<Vec<DocumentGroup>, StoreError>;

    /// Release the underlying connection. Safe to call more than once.
    async fn close(&self);
}

/// String value of `field` in `document`, used as the upsert key.
pub(crate) fn document_key(
    collection: Collection,
    field: &str,
    document: &Value,
) -> Result<String, StoreError> {
    document
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| StoreError::MissingKey {
            collection: collection.name(),
            field: field.to_string(),
        })
}

/// Grouping value of `field`: strings as-is, other scalars by their JSON text.
pub(crate) fn group_key(field: &str, document: &Value) -> Option<String> {
    match document.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}
