use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Create the `trending_repos` table and its indexes. Idempotent.
pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS trending_repos (
            date TEXT NOT NULL,
            language TEXT NOT NULL,
            repo_slug TEXT NOT NULL,
            description TEXT NOT NULL,
            UNIQUE(date, language, repo_slug)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_trending_language ON trending_repos(language)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_trending_repo_slug ON trending_repos(repo_slug)")
        .execute(pool)
        .await?;

    Ok(())
}
