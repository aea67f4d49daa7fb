use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use super::migrations;
use super::{DocumentStore, StoreError};

/// JSON documents in a single SQLite table keyed by `(collection, id)`.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: &str) -> anyhow::Result<Self> {
        let conn = Connection::open(path).context("failed to open database")?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("failed to set database pragmas")?;

        migrations::run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

fn now_string() -> String {
    Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string()
}

// Field names are interpolated into a JSON path, so only plain identifiers pass.
fn json_path(field: &str) -> Result<String, StoreError> {
    let valid = !field.is_empty()
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(format!("$.{field}"))
    } else {
        Err(StoreError::InvalidField(field.to_string()))
    }
}

fn parse_rows(rows: Vec<String>) -> Result<Vec<Value>, StoreError> {
    rows.iter()
        .map(|raw| serde_json::from_str(raw).map_err(StoreError::from))
        .collect()
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn insert(&self, collection: &str, id: &str, doc: &Value) -> Result<(), StoreError> {
        let data = serde_json::to_string(doc)?;
        let now = now_string();
        let db = self.lock()?;
        db.execute(
            "INSERT INTO documents (collection, id, data, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![collection, id, data, now],
        )?;
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let raw: Option<String> = {
            let db = self.lock()?;
            db.query_row(
                "SELECT data FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| row.get(0),
            )
            .optional()?
        };

        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, collection: &str, id: &str, doc: &Value) -> Result<bool, StoreError> {
        let data = serde_json::to_string(doc)?;
        let now = now_string();
        let db = self.lock()?;
        let count = db.execute(
            "UPDATE documents SET data = ?1, updated_at = ?2 WHERE collection = ?3 AND id = ?4",
            params![data, now, collection, id],
        )?;
        Ok(count > 0)
    }

    async fn set_field(&self, collection: &str, id: &str, field: &str, value: &Value) -> Result<bool, StoreError> {
        let path = json_path(field)?;
        let value = serde_json::to_string(value)?;
        let now = now_string();
        let db = self.lock()?;
        let count = db.execute(
            "UPDATE documents SET data = json_set(data, ?1, json(?2)), updated_at = ?3
             WHERE collection = ?4 AND id = ?5",
            params![path, value, now, collection, id],
        )?;
        Ok(count > 0)
    }

    async fn upsert(&self, collection: &str, id: &str, doc: &Value) -> Result<(), StoreError> {
        let data = serde_json::to_string(doc)?;
        let now = now_string();
        let db = self.lock()?;
        db.execute(
            "INSERT INTO documents (collection, id, data, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(collection, id) DO UPDATE SET
               data = excluded.data,
               updated_at = excluded.updated_at",
            params![collection, id, data, now],
        )?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let db = self.lock()?;
        let count = db.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection, id],
        )?;
        Ok(count > 0)
    }

    async fn list(&self, collection: &str, order_by: Option<&str>) -> Result<Vec<Value>, StoreError> {
        let rows: Vec<String> = {
            let db = self.lock()?;
            match order_by {
                Some(field) => {
                    let path = json_path(field)?;
                    let mut stmt = db.prepare(
                        "SELECT data FROM documents WHERE collection = ?1
                         ORDER BY json_extract(data, ?2) ASC, created_at ASC",
                    )?;
                    let rows = stmt.query_map(params![collection, path], |row| row.get(0))?;
                    rows.collect::<Result<_, _>>()?
                }
                None => {
                    let mut stmt = db.prepare(
                        "SELECT data FROM documents WHERE collection = ?1 ORDER BY created_at ASC",
                    )?;
                    let rows = stmt.query_map(params![collection], |row| row.get(0))?;
                    rows.collect::<Result<_, _>>()?
                }
            }
        };

        parse_rows(rows)
    }

    async fn count(&self, collection: &str) -> Result<usize, StoreError> {
        let db = self.lock()?;
        let count: i64 = db.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> SqliteStore {
        SqliteStore::open(":memory:").unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = store();
        store
            .insert("menu", "a", &json!({"id": "a", "name": "Paella"}))
            .await
            .unwrap();

        let doc = store.get("menu", "a").await.unwrap().unwrap();
        assert_eq!(doc["name"], "Paella");
        assert!(store.get("menu", "missing").await.unwrap().is_none());
        assert!(store.get("gallery", "a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_requires_existing_document() {
        let store = store();
        assert!(!store.put("menu", "a", &json!({"id": "a"})).await.unwrap());

        store.insert("menu", "a", &json!({"id": "a", "price": 10})).await.unwrap();
        assert!(store.put("menu", "a", &json!({"id": "a", "price": 12})).await.unwrap());
        assert_eq!(store.get("menu", "a").await.unwrap().unwrap()["price"], 12);
    }

    #[tokio::test]
    async fn test_list_ordered_by_field() {
        let store = store();
        store.insert("menu", "a", &json!({"id": "a", "order": 3})).await.unwrap();
        store.insert("menu", "b", &json!({"id": "b", "order": 1})).await.unwrap();
        store.insert("menu", "c", &json!({"id": "c", "order": 2})).await.unwrap();

        let docs = store.list("menu", Some("order")).await.unwrap();
        let ids: Vec<&str> = docs.iter().filter_map(|d| d["id"].as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[tokio::test]
    async fn test_list_rejects_bad_order_field() {
        let store = store();
        let err = store.list("menu", Some("order; DROP")).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidField(_)));
    }

    #[tokio::test]
    async fn test_set_field_keeps_other_fields() {
        let store = store();
        assert!(!store.set_field("bookings", "a", "calendarEventId", &json!("evt-1")).await.unwrap());

        store
            .insert("bookings", "a", &json!({"id": "a", "status": "approved", "guests": 12}))
            .await
            .unwrap();
        assert!(store.set_field("bookings", "a", "calendarEventId", &json!("evt-1")).await.unwrap());

        let doc = store.get("bookings", "a").await.unwrap().unwrap();
        assert_eq!(doc["calendarEventId"], "evt-1");
        assert_eq!(doc["status"], "approved");
        assert_eq!(doc["guests"], 12);

        let err = store.set_field("bookings", "a", "x') --", &json!(1)).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidField(_)));
    }

    #[tokio::test]
    async fn test_delete_and_count() {
        let store = store();
        store.insert("gallery", "a", &json!({"id": "a"})).await.unwrap();
        store.insert("gallery", "b", &json!({"id": "b"})).await.unwrap();
        assert_eq!(store.count("gallery").await.unwrap(), 2);

        assert!(store.delete("gallery", "a").await.unwrap());
        assert!(!store.delete("gallery", "a").await.unwrap());
        assert_eq!(store.count("gallery").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upsert() {
        let store = store();
        store.upsert("settings", "theme", &json!({"primaryColor": "#000"})).await.unwrap();
        store.upsert("settings", "theme", &json!({"primaryColor": "#fff"})).await.unwrap();
        assert_eq!(store.count("settings").await.unwrap(), 1);
        assert_eq!(
            store.get("settings", "theme").await.unwrap().unwrap()["primaryColor"],
            "#fff"
        );
    }
}
