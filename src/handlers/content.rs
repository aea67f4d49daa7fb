//! Generic admin CRUD over the content collections. Each route instantiates
//! these handlers with a concrete `Resource`, e.g. `list::<MenuItem>`.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::{self, DocumentStore};
use crate::errors::{AppError, Result};
use crate::handlers::ApiJson;
use crate::models::resource::sort_by_order;
use crate::models::{Creatable, DocMeta, Resource};
use crate::state::AppState;

/// Reads a whole collection sorted by `order`. When the store cannot order
/// the query, the documents are read unordered and sorted here instead.
pub async fn load_collection<R: Resource>(store: &dyn DocumentStore) -> Result<Vec<R>> {
    let docs = match store.list(R::COLLECTION, Some("order")).await {
        Ok(docs) => docs,
        Err(e) => {
            tracing::warn!(
                collection = R::COLLECTION,
                error = %e,
                "ordered query failed, falling back to unordered read"
            );
            store.list(R::COLLECTION, None).await?
        }
    };

    let mut items: Vec<R> = db::decode_all(R::COLLECTION, docs);
    sort_by_order(&mut items);
    Ok(items)
}

async fn load_one<R: Resource>(store: &dyn DocumentStore, id: &str) -> Result<R> {
    db::fetch(store, R::COLLECTION, id)
        .await?
        .ok_or_else(|| AppError::not_found(R::NAME, id))
}

// GET /api/admin/<collection>
pub async fn list<R: Resource>(State(state): State<Arc<AppState>>) -> Result<Json<Vec<R>>> {
    Ok(Json(load_collection::<R>(state.store.as_ref()).await?))
}

// POST /api/admin/<collection>
pub async fn create<R: Creatable>(
    State(state): State<Arc<AppState>>,
    ApiJson(input): ApiJson<R::Create>,
) -> Result<(StatusCode, Json<R>)> {
    if let Some(max) = R::MAX_ITEMS {
        let existing = state.store.count(R::COLLECTION).await?;
        if existing >= max {
            return Err(AppError::validation(format!(
                "Maximum of {max} {} items reached",
                R::NAME
            )));
        }
    }

    let item = R::create(input, DocMeta::new(Utc::now()))?;
    let id = item.meta().id.clone();
    db::insert(state.store.as_ref(), R::COLLECTION, &id, &item).await?;

    tracing::info!(collection = R::COLLECTION, id = %id, "document created");
    Ok((StatusCode::CREATED, Json(item)))
}

/// Splits `{ id, ...fields }` into the id and the typed patch.
fn split_patch<R: Resource>(mut body: Value) -> Result<(String, R::Patch)> {
    let fields = body
        .as_object_mut()
        .ok_or_else(|| AppError::validation("request body must be a JSON object"))?;

    let id = match fields.remove("id") {
        Some(Value::String(id)) if !id.trim().is_empty() => id.trim().to_string(),
        _ => return Err(AppError::validation("id is required")),
    };
    fields.remove("createdAt");
    fields.remove("updatedAt");

    let patch = serde_json::from_value(body).map_err(|e| AppError::validation(e.to_string()))?;
    Ok((id, patch))
}

// PATCH /api/admin/<collection>
pub async fn update<R: Resource>(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<R>> {
    let (id, patch) = split_patch::<R>(body)?;
    let mut item: R = load_one(state.store.as_ref(), &id).await?;

    let applied = item.apply(patch)?;
    if applied == 0 {
        return Err(AppError::validation("No fields to update"));
    }
    item.meta_mut().updated_at = Some(Utc::now());

    if !db::replace(state.store.as_ref(), R::COLLECTION, &id, &item).await? {
        return Err(AppError::not_found(R::NAME, &id));
    }

    tracing::info!(collection = R::COLLECTION, id = %id, fields = applied, "document updated");
    Ok(Json(item))
}

#[derive(Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

// DELETE /api/admin/<collection>?id=
pub async fn remove<R: Resource>(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IdQuery>,
) -> Result<Json<Value>> {
    let id = query
        .id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::validation("id is required"))?;
    let item: R = load_one(state.store.as_ref(), &id).await?;

    if let Some(public_id) = item.remote_asset() {
        match state.media.as_deref() {
            Some(media) => {
                if let Err(e) = media.delete(public_id).await {
                    tracing::warn!(
                        collection = R::COLLECTION,
                        id = %id,
                        public_id,
                        error = %e,
                        "failed to delete remote image, removing document anyway"
                    );
                }
            }
            None => tracing::warn!(public_id, "media host not configured, remote image left in place"),
        }
    }

    if !state.store.delete(R::COLLECTION, &id).await? {
        return Err(AppError::not_found(R::NAME, &id));
    }

    tracing::info!(collection = R::COLLECTION, id = %id, "document deleted");
    Ok(Json(json!({ "success": true, "id": id })))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::db::{SqliteStore, StoreError};
    use crate::models::MenuItem;

    /// Store whose ordered listing always fails, like a backend missing the
    /// index an ordered query needs.
    struct UnorderedStore {
        inner: SqliteStore,
        ordered_calls: AtomicUsize,
    }

    #[async_trait]
    impl DocumentStore for UnorderedStore {
        async fn insert(&self, collection: &str, id: &str, doc: &Value) -> std::result::Result<(), StoreError> {
            self.inner.insert(collection, id, doc).await
        }

        async fn get(&self, collection: &str, id: &str) -> std::result::Result<Option<Value>, StoreError> {
            self.inner.get(collection, id).await
        }

        async fn put(&self, collection: &str, id: &str, doc: &Value) -> std::result::Result<bool, StoreError> {
            self.inner.put(collection, id, doc).await
        }

        async fn set_field(
            &self,
            collection: &str,
            id: &str,
            field: &str,
            value: &Value,
        ) -> std::result::Result<bool, StoreError> {
            self.inner.set_field(collection, id, field, value).await
        }

        async fn upsert(&self, collection: &str, id: &str, doc: &Value) -> std::result::Result<(), StoreError> {
            self.inner.upsert(collection, id, doc).await
        }

        async fn delete(&self, collection: &str, id: &str) -> std::result::Result<bool, StoreError> {
            self.inner.delete(collection, id).await
        }

        async fn list(&self, collection: &str, order_by: Option<&str>) -> std::result::Result<Vec<Value>, StoreError> {
            if let Some(field) = order_by {
                self.ordered_calls.fetch_add(1, Ordering::SeqCst);
                return Err(StoreError::InvalidField(field.to_string()));
            }
            self.inner.list(collection, None).await
        }

        async fn count(&self, collection: &str) -> std::result::Result<usize, StoreError> {
            self.inner.count(collection).await
        }
    }

    #[tokio::test]
    async fn test_load_collection_falls_back_to_unordered_read() {
        let store = UnorderedStore {
            inner: SqliteStore::open(":memory:").unwrap(),
            ordered_calls: AtomicUsize::new(0),
        };
        for (id, name, order) in [("a", "Risotto", 3), ("b", "Tart", 1), ("c", "Soup", 2)] {
            store
                .insert("menu", id, &json!({ "id": id, "name": name, "price": 10, "order": order }))
                .await
                .unwrap();
        }
        store
            .insert("menu", "legacy", &json!({ "id": "legacy", "name": "Bread" }))
            .await
            .unwrap();

        let items = load_collection::<MenuItem>(&store).await.unwrap();
        let names: Vec<&str> = items.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Bread", "Tart", "Soup", "Risotto"]);
        assert_eq!(store.ordered_calls.load(Ordering::SeqCst), 1);
    }
}
