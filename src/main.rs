//! # Trending CLI (`trending`)
//!
//! ## Usage
//!
//! ```bash
//! trending --config ./config/trending.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `trending init` | Create the SQLite database and schema |
//! | `trending sync` | Parse and load every listing under the input root |
//! | `trending check <file>` | Parse one listing and print the result |
//! | `trending stats` | Summarize what is in the table |

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use trending_harness::progress::ProgressMode;
use trending_harness::{check, config, ingest, migrate, stats};

/// Trending CLI: load daily GitHub trending listings into SQLite.
///
/// Commands that touch the database read a TOML configuration file given
/// by `--config`.
#[derive(Parser)]
#[command(
    name = "trending",
    about = "Load daily GitHub trending Markdown listings into SQLite",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/trending.toml")]
    config: PathBuf,

    /// Verbose logging (debug level). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Idempotent: running it multiple times is safe.
    Init,

    /// Parse every listing under the input root and load it.
    ///
    /// Each document is written as one transaction. Re-running over the
    /// same files leaves the table unchanged; changed files overwrite
    /// descriptions.
    Sync {
        /// Directory (or single file) to read instead of `[input].root`.
        #[arg(long)]
        input: Option<PathBuf>,

        /// Parse only; report counts without writing to the database.
        #[arg(long)]
        dry_run: bool,

        /// Only load documents dated on or after this date (YYYY-MM-DD).
        #[arg(long)]
        since: Option<String>,

        /// Only load documents dated on or before this date (YYYY-MM-DD).
        #[arg(long)]
        until: Option<String>,

        /// Maximum number of documents to process.
        #[arg(long)]
        limit: Option<usize>,

        /// Print the run summary as JSON.
        #[arg(long)]
        json: bool,

        /// Progress on stderr: `off`, `human`, or `json`. Defaults to
        /// `human` when stderr is a terminal.
        #[arg(long)]
        progress: Option<String>,
    },

    /// Parse one listing and print its entries and diagnostics.
    ///
    /// The file stem is the document date (`2017-08-29.md`). Nothing is
    /// written.
    Check {
        path: PathBuf,

        #[arg(long)]
        json: bool,

        /// Number of entries to print.
        #[arg(long, default_value_t = 20)]
        show: usize,
    },

    /// Show row counts and a per-language breakdown.
    Stats {
        #[arg(long)]
        json: bool,

        /// Number of languages to list.
        #[arg(long, default_value_t = 20)]
        top: usize,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("trending_harness={}", level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Commands that don't require config
    if let Commands::Check { path, json, show } = &cli.command {
        check::run_check(path, *json, *show)?;
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Sync {
            input,
            dry_run,
            since,
            until,
            limit,
            json,
            progress,
        } => {
            let progress = match progress.as_deref() {
                None => ProgressMode::default_for_tty(),
                Some(raw) => ProgressMode::parse(raw).ok_or_else(|| {
                    anyhow::anyhow!("--progress must be off, human, or json, got '{}'", raw)
                })?,
            };
            let options = ingest::SyncOptions {
                input,
                dry_run,
                since,
                until,
                limit,
                json,
                progress,
            };
            ingest::run_sync(&cfg, &options).await?;
        }
        Commands::Stats { json, top } => {
            stats::run_stats(&cfg, json, top).await?;
        }
        Commands::Check { .. } => unreachable!("handled before config loading"),
    }

    Ok(())
}
