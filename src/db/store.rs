//! Table-store contract consumed by every service.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::db::error::DbResult;
use crate::db::query::{Filter, SelectQuery};

/// Boxed future type for table-store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Minimal row-oriented access to a hosted relational database.
///
/// Each call is a single atomic statement on the backend; there are no
/// multi-statement transactions.
pub trait TableStore: Send + Sync {
    /// Insert one row and return it as echoed by the backend.
    ///
    /// # Errors
    /// Returns an error if the backend rejects the row or is unreachable.
    fn insert(&self, table: &str, row: Value) -> StoreFuture<'_, DbResult<Value>>;

    /// Select rows. A backend answer that is not a list yields no rows.
    ///
    /// # Errors
    /// Returns an error if the backend is unreachable or rejects the query.
    fn select(&self, table: &str, query: SelectQuery) -> StoreFuture<'_, DbResult<Vec<Value>>>;

    /// Patch every row matching `filter` and return the updated rows.
    ///
    /// # Errors
    /// Returns an error if the backend is unreachable or rejects the patch.
    fn update(
        &self,
        table: &str,
        patch: Value,
        filter: Filter,
    ) -> StoreFuture<'_, DbResult<Vec<Value>>>;

    /// Delete every row matching `filter`.
    ///
    /// # Errors
    /// Returns an error if the backend is unreachable or rejects the delete.
    fn delete(&self, table: &str, filter: Filter) -> StoreFuture<'_, DbResult<()>>;
}
