//! `trending check <file>`: parse a single listing and show what would be
//! loaded, without opening the database.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use crate::connector_fs::SourceFile;
use crate::models::{Diagnostic, Entry};
use crate::parser::parse_document;

#[derive(Serialize)]
struct CheckOutput<'a> {
    document: &'a str,
    entries: &'a [Entry],
    diagnostics: &'a [Diagnostic],
}

pub fn run_check(path: &Path, json: bool, show: usize) -> Result<()> {
    let doc = SourceFile::from_path(path).read()?;
    let parsed = parse_document(&doc.identity, &doc.identity, &doc.body);

    if json {
        let out = CheckOutput {
            document: &doc.identity,
            entries: &parsed.entries,
            diagnostics: &parsed.diagnostics,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Checking: {} ({})", doc.identity, doc.origin);
    println!("  {} entries", parsed.entries.len());
    println!("  {} diagnostics", parsed.diagnostics.len());

    if !parsed.entries.is_empty() {
        println!();
        let n = parsed.entries.len().min(show);
        println!("Entries (first {}):", n);
        for entry in parsed.entries.iter().take(n) {
            println!(
                "  {} {:<14} {:<40} {}",
                entry.date_key(),
                entry.language(),
                entry.repo_slug(),
                entry.description()
            );
        }
        if parsed.entries.len() > n {
            println!("  ... and {} more", parsed.entries.len() - n);
        }
    }

    if !parsed.diagnostics.is_empty() {
        println!();
        println!("Diagnostics:");
        for diag in &parsed.diagnostics {
            println!("  {}", diag);
        }
    }

    Ok(())
}
