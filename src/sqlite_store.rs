//! SQLite-backed [`Store`] implementation.
//!
//! Each batch runs inside one sqlx transaction. If any statement fails the
//! transaction is dropped without commit, which rolls the whole batch back.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Row, SqlitePool};

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::models::Entry;
use crate::store::{Store, StoreError};

/// SQLite implementation of the [`Store`] trait over the `trending_repos`
/// table.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the configured database and make sure the schema exists.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = db::connect(config).await?;
        migrate::apply_schema(&pool).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn replace_entries(&self, entries: &[Entry]) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;

        for entry in entries {
            sqlx::query(
                r#"
                INSERT INTO trending_repos (date, language, repo_slug, description)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(date, language, repo_slug) DO UPDATE SET
                    description = excluded.description
                "#,
            )
            .bind(entry.date_key())
            .bind(entry.language())
            .bind(entry.repo_slug())
            .bind(entry.description())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(entries.len() as u64)
    }

    async fn count_entries(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM trending_repos")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list_entries(&self) -> Result<Vec<Entry>, StoreError> {
        let rows = sqlx::query(
            "SELECT date, language, repo_slug, description FROM trending_repos \
             ORDER BY date, language, repo_slug",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<Entry, StoreError> {
                let date: String = row.get("date");
                let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                    .map_err(|_| StoreError::InvalidRow(format!("bad date '{}'", date)))?;
                Ok(Entry::new(
                    date,
                    row.get("language"),
                    row.get("repo_slug"),
                    row.get("description"),
                ))
            })
            .collect()
    }
}
