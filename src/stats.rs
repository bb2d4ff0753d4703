//! Table statistics and health overview.
//!
//! Gives a quick summary of what has been loaded: row counts, the covered
//! date range, and a per-language breakdown. Used by `trending stats` to
//! confirm that syncs are landing where expected.

use anyhow::Result;
use serde::Serialize;
use sqlx::{Row, SqlitePool};

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::progress::format_number;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LanguageStats {
    pub language: String,
    pub entries: i64,
    pub repos: i64,
    pub days: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableStats {
    pub entries: i64,
    pub days: i64,
    pub languages: i64,
    pub repos: i64,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
    pub by_language: Vec<LanguageStats>,
}

/// Gather statistics from an open pool.
pub async fn collect_stats(pool: &SqlitePool) -> Result<TableStats> {
    let totals = sqlx::query(
        r#"
        SELECT
            COUNT(*) AS entries,
            COUNT(DISTINCT date) AS days,
            COUNT(DISTINCT language) AS languages,
            COUNT(DISTINCT repo_slug) AS repos,
            MIN(date) AS first_date,
            MAX(date) AS last_date
        FROM trending_repos
        "#,
    )
    .fetch_one(pool)
    .await?;

    let language_rows = sqlx::query(
        r#"
        SELECT
            language,
            COUNT(*) AS entries,
            COUNT(DISTINCT repo_slug) AS repos,
            COUNT(DISTINCT date) AS days
        FROM trending_repos
        GROUP BY language
        ORDER BY entries DESC, language
        "#,
    )
    .fetch_all(pool)
    .await?;

    let by_language = language_rows
        .iter()
        .map(|row| LanguageStats {
            language: row.get("language"),
            entries: row.get("entries"),
            repos: row.get("repos"),
            days: row.get("days"),
        })
        .collect();

    Ok(TableStats {
        entries: totals.get("entries"),
        days: totals.get("days"),
        languages: totals.get("languages"),
        repos: totals.get("repos"),
        first_date: totals.get("first_date"),
        last_date: totals.get("last_date"),
        by_language,
    })
}

/// Run the stats command: query the database and print a summary.
pub async fn run_stats(config: &Config, json: bool, top: usize) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate::apply_schema(&pool).await?;
    let stats = collect_stats(&pool).await?;
    pool.close().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("Trending — Database Stats");
    println!("=========================");
    println!();
    println!("  Database:    {}", config.db.path.display());
    println!("  Size:        {}", format_bytes(db_size));
    println!();
    println!("  Entries:     {}", format_number(stats.entries as u64));
    println!("  Days:        {}", stats.days);
    println!("  Languages:   {}", stats.languages);
    println!("  Repos:       {}", format_number(stats.repos as u64));
    if let (Some(first), Some(last)) = (&stats.first_date, &stats.last_date) {
        println!("  Range:       {} .. {}", first, last);
    }

    if !stats.by_language.is_empty() {
        println!();
        println!("  By language:");
        println!(
            "  {:<24} {:>8} {:>8} {:>6}",
            "LANGUAGE", "ENTRIES", "REPOS", "DAYS"
        );
        println!("  {}", "-".repeat(50));

        for s in stats.by_language.iter().take(top) {
            println!(
                "  {:<24} {:>8} {:>8} {:>6}",
                s.language, s.entries, s.repos, s.days
            );
        }
        if stats.by_language.len() > top {
            println!("  ... {} more", stats.by_language.len() - top);
        }
    }

    println!();
    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
