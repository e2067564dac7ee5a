//! In-process [`TableStore`] used for local runs and tests.
//!
//! Rows live in a map of JSON arrays keyed by table name. Inserts fill `id`
//! (UUID) and `created_at` when the row lacks them, the way the hosted
//! database's column defaults would. Every operation can be made to fail on
//! demand, and calls are counted so callers can assert which statements ran.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::db::error::{DbError, DbResult};
use crate::db::query::{Filter, SelectQuery};
use crate::db::store::{StoreFuture, TableStore};
use crate::db::timestamp::format_timestamp;

/// Store operation, used for fault injection and call counting.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operation {
    /// `insert`.
    Insert,
    /// `select`.
    Select,
    /// `update`.
    Update,
    /// `delete`.
    Delete,
}

impl Operation {
    const fn index(self) -> usize {
        match self {
            Self::Insert => 0,
            Self::Select => 1,
            Self::Update => 2,
            Self::Delete => 3,
        }
    }
}

/// In-memory table store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    failures: [AtomicBool; 4],
    calls: [AtomicUsize; 4],
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call of `op` fail (or succeed again).
    pub fn fail_on(&self, op: Operation, fail: bool) {
        self.failures[op.index()].store(fail, Ordering::SeqCst);
    }

    /// Number of calls of `op` seen so far, including failed ones.
    #[must_use]
    pub fn calls(&self, op: Operation) -> usize {
        self.calls[op.index()].load(Ordering::SeqCst)
    }

    /// Insert rows as-is, bypassing defaults, counters and fault injection.
    pub async fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut tables = self.tables.lock().await;
        tables.entry(table.to_string()).or_default().extend(rows);
    }

    /// Snapshot of a table's rows in insertion order.
    pub async fn rows(&self, table: &str) -> Vec<Value> {
        let tables = self.tables.lock().await;
        tables.get(table).cloned().unwrap_or_default()
    }

    fn begin(&self, op: Operation) -> DbResult<()> {
        self.calls[op.index()].fetch_add(1, Ordering::SeqCst);
        if self.failures[op.index()].load(Ordering::SeqCst) {
            return Err(DbError::Backend(format!("injected {op:?} failure")));
        }
        Ok(())
    }
}

fn project(row: &Value, columns: Option<&Vec<String>>) -> Value {
    let Some(columns) = columns else {
        return row.clone();
    };
    let mut projected = Map::new();
    for column in columns {
        if let Some(value) = row.get(column) {
            projected.insert(column.clone(), value.clone());
        }
    }
    Value::Object(projected)
}

impl TableStore for InMemoryStore {
    fn insert(&self, table: &str, row: Value) -> StoreFuture<'_, DbResult<Value>> {
        let table = table.to_string();
        Box::pin(async move {
            self.begin(Operation::Insert)?;
            let Value::Object(mut object) = row else {
                return Err(DbError::NotAnObject(table));
            };
            object
                .entry("id")
                .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
            object
                .entry("created_at")
                .or_insert_with(|| Value::String(format_timestamp(&Utc::now())));

            let stored = Value::Object(object);
            let mut tables = self.tables.lock().await;
            tables.entry(table).or_default().push(stored.clone());
            Ok(stored)
        })
    }

    fn select(&self, table: &str, query: SelectQuery) -> StoreFuture<'_, DbResult<Vec<Value>>> {
        let table = table.to_string();
        Box::pin(async move {
            self.begin(Operation::Select)?;
            let tables = self.tables.lock().await;
            let mut rows: Vec<&Value> = tables
                .get(&table)
                .map(|rows| rows.iter().filter(|row| query.filter.matches(row)).collect())
                .unwrap_or_default();

            if let Some(order) = &query.order {
                rows.sort_by(|a, b| order.compare_rows(a, b));
            }
            if let Some(limit) = query.limit {
                rows.truncate(limit);
            }

            Ok(rows
                .into_iter()
                .map(|row| project(row, query.columns.as_ref()))
                .collect())
        })
    }

    fn update(
        &self,
        table: &str,
        patch: Value,
        filter: Filter,
    ) -> StoreFuture<'_, DbResult<Vec<Value>>> {
        let table = table.to_string();
        Box::pin(async move {
            self.begin(Operation::Update)?;
            let Value::Object(patch) = patch else {
                return Err(DbError::NotAnObject(table));
            };
            let mut tables = self.tables.lock().await;
            let mut updated = Vec::new();
            if let Some(rows) = tables.get_mut(&table) {
                for row in rows.iter_mut().filter(|row| filter.matches(row)) {
                    if let Value::Object(object) = row {
                        for (key, value) in &patch {
                            object.insert(key.clone(), value.clone());
                        }
                    }
                    updated.push(row.clone());
                }
            }
            Ok(updated)
        })
    }

    fn delete(&self, table: &str, filter: Filter) -> StoreFuture<'_, DbResult<()>> {
        let table = table.to_string();
        Box::pin(async move {
            self.begin(Operation::Delete)?;
            let mut tables = self.tables.lock().await;
            if let Some(rows) = tables.get_mut(&table) {
                rows.retain(|row| !filter.matches(row));
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::query::Order;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_fills_defaults() {
        let store = InMemoryStore::new();
        let row = store.insert("t", json!({"name": "a"})).await.unwrap();

        assert!(row["id"].as_str().is_some_and(|id| !id.is_empty()));
        assert!(row["created_at"].as_str().is_some());
        assert_eq!(store.rows("t").await.len(), 1);
    }

    #[tokio::test]
    async fn test_insert_keeps_client_values() {
        let store = InMemoryStore::new();
        let row = store
            .insert("t", json!({"id": "x", "created_at": "2025-01-01T00:00:00.000000Z"}))
            .await
            .unwrap();
        assert_eq!(row["id"], "x");
        assert_eq!(row["created_at"], "2025-01-01T00:00:00.000000Z");
    }

    #[tokio::test]
    async fn test_select_filters_orders_limits_and_projects() {
        let store = InMemoryStore::new();
        store
            .seed(
                "t",
                vec![
                    json!({"user_id": "a", "n": 1, "extra": true}),
                    json!({"user_id": "b", "n": 2}),
                    json!({"user_id": "a", "n": 3}),
                    json!({"user_id": "a", "n": 2}),
                ],
            )
            .await;

        let query = SelectQuery::new()
            .columns(&["n"])
            .filter(Filter::new().eq("user_id", "a"))
            .order(Order::desc("n"))
            .limit(2);
        let rows = store.select("t", query).await.unwrap();

        assert_eq!(rows, vec![json!({"n": 3}), json!({"n": 2})]);
        assert!(store.select("missing", SelectQuery::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = InMemoryStore::new();
        store
            .seed("t", vec![json!({"id": 1, "s": "x"}), json!({"id": 2, "s": "x"})])
            .await;

        let updated = store
            .update("t", json!({"s": "y"}), Filter::new().eq("id", 2))
            .await
            .unwrap();
        assert_eq!(updated, vec![json!({"id": 2, "s": "y"})]);

        store.delete("t", Filter::new().eq("s", "x")).await.unwrap();
        assert_eq!(store.rows("t").await, vec![json!({"id": 2, "s": "y"})]);
    }

    #[tokio::test]
    async fn test_fault_injection_and_counters() {
        let store = InMemoryStore::new();
        store.fail_on(Operation::Delete, true);

        assert!(store.delete("t", Filter::new()).await.is_err());
        assert_eq!(store.calls(Operation::Delete), 1);
        assert_eq!(store.calls(Operation::Insert), 0);

        store.fail_on(Operation::Delete, false);
        assert!(store.delete("t", Filter::new()).await.is_ok());
        assert_eq!(store.calls(Operation::Delete), 2);
    }
}
