//! Filesystem source for daily listings.
//!
//! Walks `[input].root`, keeps files matching the include globs and not the
//! exclude globs, and names each one by its file stem (`2017-08-29.md` →
//! `2017-08-29`). The stem doubles as the document's nominal date.

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::InputConfig;
use crate::models::SourceDocument;

/// A discovered file, not yet read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub identity: String,
    pub path: PathBuf,
}

impl SourceFile {
    pub fn from_path(path: &Path) -> Self {
        let identity = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            identity,
            path: path.to_path_buf(),
        }
    }

    /// Read the file as UTF-8 text.
    pub fn read(&self) -> Result<SourceDocument> {
        let body = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        Ok(SourceDocument {
            identity: self.identity.clone(),
            origin: self.path.display().to_string(),
            body,
        })
    }
}

pub fn scan_filesystem(input: &InputConfig) -> Result<Vec<SourceFile>> {
    let root = &input.root;
    if !root.exists() {
        bail!("Input root does not exist: {}", root.display());
    }

    let include_set = build_globset(&input.include_globs)?;

    let mut default_excludes = vec!["**/.git/**".to_string()];
    default_excludes.extend(input.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    // A single file is accepted as-is.
    if root.is_file() {
        return Ok(vec![SourceFile::from_path(root)]);
    }

    let mut files = Vec::new();

    let walker = WalkDir::new(root).follow_links(input.follow_symlinks);
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().to_string();

        if exclude_set.is_match(&rel_str) {
            continue;
        }

        if !include_set.is_match(&rel_str) {
            continue;
        }

        files.push(SourceFile::from_path(path));
    }

    // Sort for deterministic ordering
    files.sort_by(|a, b| a.identity.cmp(&b.identity).then(a.path.cmp(&b.path)));

    tracing::debug!(root = %root.display(), files = files.len(), "input scanned");
    Ok(files)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
