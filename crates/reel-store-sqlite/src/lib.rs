//! SQLite backend for the Reel platform store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. The schema's unique indexes
//! are the serialization point for every identity and engagement invariant;
//! violations are translated into the domain error taxonomy instead of
//! surfacing as generic storage failures.

mod encode;
mod error;
mod schema;
mod store;

pub use store::SqliteStore;
