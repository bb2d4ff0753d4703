//! Ingestion pipeline orchestration.
//!
//! Coordinates the sync flow: filesystem scan → parse → batched upsert.
//! Every document is one atomic batch. A document that cannot be read, has
//! a bad date, or whose batch fails to commit is reported and skipped; the
//! run always moves on to the next document.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;

use crate::config::Config;
use crate::connector_fs::{self, SourceFile};
use crate::models::{Diagnostic, DiagnosticKind, Entry, ParseEvent, SourceDocument};
use crate::parser::{parse_document_date, DocumentParser};
use crate::progress::{ProgressMode, SyncProgressEvent, SyncProgressReporter};
use crate::sqlite_store::SqliteStore;
use crate::store::Store;

/// Outcome of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Parsed and (unless dry-run) committed. May have zero entries.
    Loaded,
    /// Nominal date did not parse; nothing was read from the body.
    Rejected,
    /// Unreadable input or the batch failed to commit. Nothing persisted.
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub document: String,
    #[serde(flatten)]
    pub status: DocumentStatus,
    /// Entries persisted (or, in a dry run, entries found).
    pub entries: u64,
    pub diagnostics: Vec<Diagnostic>,
}

impl DocumentReport {
    fn failed(document: &str, reason: String) -> Self {
        Self {
            document: document.to_string(),
            status: DocumentStatus::Failed(reason),
            entries: 0,
            diagnostics: Vec::new(),
        }
    }
}

/// Totals over a whole run plus the per-document breakdown.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub dry_run: bool,
    pub documents: u64,
    pub entries_persisted: u64,
    pub diagnostics_total: u64,
    pub failed_documents: u64,
    pub reports: Vec<DocumentReport>,
}

impl RunSummary {
    pub fn record(&mut self, report: DocumentReport) {
        self.documents += 1;
        self.entries_persisted += report.entries;
        self.diagnostics_total += report.diagnostics.len() as u64;
        if matches!(report.status, DocumentStatus::Failed(_)) {
            self.failed_documents += 1;
        }
        self.reports.push(report);
    }
}

/// Options for [`run_sync`], mirroring the `sync` CLI flags.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Overrides `[input].root`.
    pub input: Option<PathBuf>,
    pub dry_run: bool,
    pub since: Option<String>,
    pub until: Option<String>,
    pub limit: Option<usize>,
    pub json: bool,
    pub progress: ProgressMode,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            input: None,
            dry_run: false,
            since: None,
            until: None,
            limit: None,
            json: false,
            progress: ProgressMode::Off,
        }
    }
}

pub async fn run_sync(config: &Config, options: &SyncOptions) -> Result<RunSummary> {
    let since = parse_cli_date(options.since.as_deref(), "--since")?;
    let until = parse_cli_date(options.until.as_deref(), "--until")?;

    let mut input = config.input.clone();
    if let Some(root) = &options.input {
        input.root = root.clone();
    }

    let reporter = options.progress.reporter();
    reporter.report(SyncProgressEvent::Discovering {
        root: input.root.display().to_string(),
    });

    let mut files = connector_fs::scan_filesystem(&input)?;
    if files.is_empty() {
        bail!("No markdown files found under {}", input.root.display());
    }
    let discovered = files.len();
    files.retain(|file| within_range(&file.identity, since, until));
    if files.is_empty() {
        tracing::warn!(discovered, "no documents within --since/--until");
    }
    if let Some(lim) = options.limit {
        files.truncate(lim);
    }

    let summary = if options.dry_run {
        preview_documents(&files, reporter.as_ref())
    } else {
        let store = SqliteStore::open(config).await?;
        let summary = load_documents(&store, &files, reporter.as_ref()).await;
        store.close().await;
        summary
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&input.root.display().to_string(), &summary);
    }

    Ok(summary)
}

/// Read, parse and load each file in order.
pub async fn load_documents(
    store: &dyn Store,
    files: &[SourceFile],
    reporter: &dyn SyncProgressReporter,
) -> RunSummary {
    let mut summary = RunSummary::default();
    let total = files.len() as u64;

    for (i, file) in files.iter().enumerate() {
        let report = match file.read() {
            Ok(doc) => load_document(store, &doc).await,
            Err(e) => {
                let reason = format!("{:#}", e);
                tracing::error!(document = %file.identity, error = %reason, "document unreadable");
                DocumentReport::failed(&file.identity, reason)
            }
        };
        summary.record(report);
        reporter.report(SyncProgressEvent::Loading {
            document: file.identity.clone(),
            n: i as u64 + 1,
            total,
        });
    }

    summary
}

/// Parse one document and commit its entries as a single batch.
pub async fn load_document(store: &dyn Store, doc: &SourceDocument) -> DocumentReport {
    let (entries, diagnostics) = collect(doc);

    if parse_document_date(&doc.identity).is_none() {
        return DocumentReport {
            document: doc.identity.clone(),
            status: DocumentStatus::Rejected,
            entries: 0,
            diagnostics,
        };
    }

    if entries.is_empty() {
        tracing::debug!(document = %doc.identity, "no entries");
        return DocumentReport {
            document: doc.identity.clone(),
            status: DocumentStatus::Loaded,
            entries: 0,
            diagnostics,
        };
    }

    match store.replace_entries(&entries).await {
        Ok(written) => {
            tracing::info!(
                document = %doc.identity,
                entries = written,
                diagnostics = diagnostics.len(),
                "document loaded"
            );
            DocumentReport {
                document: doc.identity.clone(),
                status: DocumentStatus::Loaded,
                entries: written,
                diagnostics,
            }
        }
        Err(e) => {
            tracing::error!(document = %doc.identity, error = %e, "batch failed, rolled back");
            DocumentReport {
                diagnostics,
                ..DocumentReport::failed(&doc.identity, e.to_string())
            }
        }
    }
}

/// Parse without touching any store.
pub fn preview_document(doc: &SourceDocument) -> DocumentReport {
    let (entries, diagnostics) = collect(doc);
    let status = if parse_document_date(&doc.identity).is_some() {
        DocumentStatus::Loaded
    } else {
        DocumentStatus::Rejected
    };
    DocumentReport {
        document: doc.identity.clone(),
        status,
        entries: entries.len() as u64,
        diagnostics,
    }
}

fn preview_documents(files: &[SourceFile], reporter: &dyn SyncProgressReporter) -> RunSummary {
    let mut summary = RunSummary {
        dry_run: true,
        ..RunSummary::default()
    };
    let total = files.len() as u64;

    for (i, file) in files.iter().enumerate() {
        let report = match file.read() {
            Ok(doc) => preview_document(&doc),
            Err(e) => DocumentReport::failed(&file.identity, format!("{:#}", e)),
        };
        summary.record(report);
        reporter.report(SyncProgressEvent::Loading {
            document: file.identity.clone(),
            n: i as u64 + 1,
            total,
        });
    }

    summary
}

/// Drain the parser, logging each diagnostic as it appears.
fn collect(doc: &SourceDocument) -> (Vec<Entry>, Vec<Diagnostic>) {
    let mut entries = Vec::new();
    let mut diagnostics = Vec::new();

    for event in DocumentParser::new(&doc.identity, &doc.identity, &doc.body) {
        match event {
            ParseEvent::Entry(entry) => entries.push(entry),
            ParseEvent::Diagnostic(diag) => {
                tracing::warn!(
                    document = %diag.document,
                    line = diag.line,
                    kind = %diag.kind,
                    fragment = %diag.fragment,
                    "skipped input"
                );
                diagnostics.push(diag);
            }
        }
    }

    (entries, diagnostics)
}

fn parse_cli_date(raw: Option<&str>, flag: &str) -> Result<Option<NaiveDate>> {
    raw.map(|s| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("{} must be YYYY-MM-DD, got '{}'", flag, s))
    })
    .transpose()
}

/// Documents whose identity is not a date are kept so their rejection is
/// reported.
fn within_range(identity: &str, since: Option<NaiveDate>, until: Option<NaiveDate>) -> bool {
    let Some(date) = parse_document_date(identity) else {
        return true;
    };
    since.map_or(true, |s| date >= s) && until.map_or(true, |u| date <= u)
}

fn print_summary(root: &str, summary: &RunSummary) {
    if summary.dry_run {
        println!("sync {} (dry-run)", root);
    } else {
        println!("sync {}", root);
    }
    println!("  documents: {}", summary.documents);
    if summary.dry_run {
        println!("  entries found: {}", summary.entries_persisted);
    } else {
        println!("  entries persisted: {}", summary.entries_persisted);
    }
    println!("  diagnostics: {}", summary.diagnostics_total);
    println!("  failed documents: {}", summary.failed_documents);

    for report in &summary.reports {
        let status = match &report.status {
            DocumentStatus::Loaded => "loaded".to_string(),
            DocumentStatus::Rejected => "rejected".to_string(),
            DocumentStatus::Failed(reason) => format!("failed: {}", reason),
        };
        println!(
            "    {:<12} {:>6} entries {:>4} diagnostics  {}",
            report.document,
            report.entries,
            report.diagnostics.len(),
            status
        );
        for diag in &report.diagnostics {
            if diag.kind == DiagnosticKind::BadDocumentDate {
                continue;
            }
            println!("      line {}: {}: {}", diag.line, diag.kind, diag.fragment);
        }
    }
    println!("ok");
}
