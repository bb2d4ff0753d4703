//! In-memory [`Store`] implementation for testing.
//!
//! Rows live in a `BTreeMap` keyed by `(date, language, repo_slug)` behind a
//! `std::sync::RwLock`; a batch is applied under a single write lock.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::Entry;

use super::{Store, StoreError};

type Key = (NaiveDate, String, String);

/// In-memory store for tests.
pub struct InMemoryStore {
    rows: RwLock<BTreeMap<Key, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn replace_entries(&self, entries: &[Entry]) -> Result<u64, StoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        for entry in entries {
            rows.insert(
                (
                    entry.date(),
                    entry.language().to_string(),
                    entry.repo_slug().to_string(),
                ),
                entry.description().to_string(),
            );
        }
        Ok(entries.len() as u64)
    }

    async fn count_entries(&self) -> Result<i64, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(rows.len() as i64)
    }

    async fn list_entries(&self) -> Result<Vec<Entry>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(rows
            .iter()
            .map(|((date, language, slug), description)| {
                Entry::new(*date, language.clone(), slug.clone(), description.clone())
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_document;

    #[tokio::test]
    async fn test_replace_overwrites_description() {
        let store = InMemoryStore::new();
        let first = parse_document(
            "2020-01-01",
            "2020-01-01",
            "#### go\n* [a/b](https://github.com/a/b):old\n",
        );
        let second = parse_document(
            "2020-01-01",
            "2020-01-01",
            "#### go\n* [a/b](https://github.com/a/b):new\n",
        );
        store.replace_entries(&first.entries).await.unwrap();
        store.replace_entries(&second.entries).await.unwrap();

        let rows = store.list_entries().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].description(), "new");
    }

    #[tokio::test]
    async fn test_duplicate_key_in_batch_last_wins() {
        let store = InMemoryStore::new();
        let parsed = parse_document(
            "2020-01-01",
            "2020-01-01",
            "#### go\n* [a/b](https://github.com/a/b):one\n* [a / b](https://github.com/a/b):two\n",
        );
        assert_eq!(store.replace_entries(&parsed.entries).await.unwrap(), 2);
        assert_eq!(store.count_entries().await.unwrap(), 1);
        assert_eq!(store.list_entries().await.unwrap()[0].description(), "two");
    }
}
