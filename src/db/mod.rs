pub mod migrations;
pub mod sqlite;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub use sqlite::SqliteStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("document encoding: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("invalid field name: {0}")]
    InvalidField(String),

    #[error("database lock poisoned")]
    Poisoned,
}

/// Collection/document CRUD over JSON documents.
///
/// Every method is a single statement; callers composing several calls get
/// no transactional guarantee across them.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(&self, collection: &str, id: &str, doc: &Value) -> Result<(), StoreError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Replaces an existing document. Returns `false` when there is nothing to replace.
    async fn put(&self, collection: &str, id: &str, doc: &Value) -> Result<bool, StoreError>;

    /// Sets one top-level field of an existing document, leaving the rest as
    /// stored. Returns `false` when the document does not exist.
    async fn set_field(&self, collection: &str, id: &str, field: &str, value: &Value) -> Result<bool, StoreError>;

    async fn upsert(&self, collection: &str, id: &str, doc: &Value) -> Result<(), StoreError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError>;

    /// Lists a collection, ascending by the given top-level field when one is named.
    async fn list(&self, collection: &str, order_by: Option<&str>) -> Result<Vec<Value>, StoreError>;

    async fn count(&self, collection: &str) -> Result<usize, StoreError>;
}

pub async fn fetch<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(collection, id).await? {
        Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
        None => Ok(None),
    }
}

pub async fn insert<T: Serialize + Sync>(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
    doc: &T,
) -> Result<(), StoreError> {
    store.insert(collection, id, &serde_json::to_value(doc)?).await
}

pub async fn replace<T: Serialize + Sync>(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
    doc: &T,
) -> Result<bool, StoreError> {
    store.put(collection, id, &serde_json::to_value(doc)?).await
}

/// Decodes every document of a collection, skipping (and logging) any that no
/// longer match the current shape.
pub fn decode_all<T: DeserializeOwned>(collection: &str, docs: Vec<Value>) -> Vec<T> {
    docs.into_iter()
        .filter_map(|doc| match serde_json::from_value(doc) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(collection, error = %e, "skipping malformed document");
                None
            }
        })
        .collect()
}
