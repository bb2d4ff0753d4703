//! # Trending Harness
//!
//! Turns daily GitHub "trending repositories" Markdown listings into rows of
//! `(date, language, repo_slug, description)` in a SQLite table.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌──────────────┐   ┌────────────────┐
//! │ Filesystem  │──▶│   Parser    │──▶│    Loader    │──▶│    SQLite      │
//! │ YYYY-MM-DD  │   │ state mach. │   │ 1 tx per doc │   │ trending_repos │
//! └─────────────┘   └──────┬──────┘   └──────┬───────┘   └────────────────┘
//!                          │ diagnostics     │ run summary
//!                          ▼                 ▼
//!                       tracing            stdout
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! trending init                   # create database
//! trending check 2017-08-29.md    # parse one file, no writes
//! trending sync                   # load every listing under [input].root
//! trending stats                  # what got loaded
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Entries, diagnostics, parse events |
//! | [`parser`] | Line-oriented listing parser |
//! | [`connector_fs`] | Filesystem discovery of listings |
//! | [`ingest`] | Idempotent loader and run summary |
//! | [`store`] | Storage trait and in-memory backend |
//! | [`sqlite_store`] | SQLite backend |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema creation |
//! | [`stats`] | Table statistics |
//! | [`check`] | Single-file dry parse |
//! | [`progress`] | Sync progress reporting |

pub mod check;
pub mod config;
pub mod connector_fs;
pub mod db;
pub mod ingest;
pub mod migrate;
pub mod models;
pub mod parser;
pub mod progress;
pub mod sqlite_store;
pub mod stats;
pub mod store;
