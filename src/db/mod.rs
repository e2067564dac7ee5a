//! Table-store access for the hosted database.
//!
//! - `store`: the [`TableStore`] contract every service depends on
//! - `query`: structured filters, ordering and projections
//! - `rest`: PostgREST (Supabase) client
//! - `memory`: in-process backend for local runs and tests
//! - `timestamp`: the shared timestamp wire format

pub mod error;
pub mod memory;
pub mod query;
pub mod rest;
pub mod store;
pub mod timestamp;

pub use error::{DbError, DbResult};
pub use memory::{InMemoryStore, Operation};
pub use query::{Condition, Filter, FilterOp, Order, SelectQuery};
pub use rest::PostgrestStore;
pub use store::{StoreFuture, TableStore};
