//! Storage abstraction for loaded trending entries.
//!
//! The [`Store`] trait is the write-path contract of the loader: a batch of
//! entries lands atomically, replacing any row that shares the
//! `(date, language, repo_slug)` key. Two backends exist:
//! [`SqliteStore`](crate::sqlite_store::SqliteStore) for real runs and
//! [`memory::InMemoryStore`] for tests.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Entry;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("stored row is not a valid entry: {0}")]
    InvalidRow(String),
}

/// Abstract storage backend for entries.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`replace_entries`](Store::replace_entries) | Atomic insert-or-replace of a batch |
/// | [`count_entries`](Store::count_entries) | Number of stored rows |
/// | [`list_entries`](Store::list_entries) | All rows, ordered by key |
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert or replace every entry as one unit of work.
    ///
    /// Either all entries land or none do. Returns the number of entries
    /// written. Within a batch, a later entry wins over an earlier one with
    /// the same key.
    async fn replace_entries(&self, entries: &[Entry]) -> Result<u64, StoreError>;

    async fn count_entries(&self) -> Result<i64, StoreError>;

    /// All stored entries ordered by `(date, language, repo_slug)`.
    async fn list_entries(&self) -> Result<Vec<Entry>, StoreError>;
}
