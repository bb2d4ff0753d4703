//! Core data models flowing through the parse → load pipeline.
//!
//! An [`Entry`] is one repository seen trending under a language on a given
//! day. A [`Diagnostic`] is a line (or whole document) that could not be
//! turned into an entry. The parser yields both as [`ParseEvent`]s.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Maximum number of characters of offending text kept in a [`Diagnostic`].
pub const FRAGMENT_MAX_CHARS: usize = 80;

/// One normalized trending fact.
///
/// Fields are private: an `Entry` can only be built by the parser (or read
/// back from a store), which guarantees a lowercase non-empty language and
/// a normalized `owner/name` slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    date: NaiveDate,
    language: String,
    repo_slug: String,
    description: String,
}

impl Entry {
    pub(crate) fn new(
        date: NaiveDate,
        language: String,
        repo_slug: String,
        description: String,
    ) -> Self {
        Self {
            date,
            language,
            repo_slug,
            description,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The date rendered as stored, `YYYY-MM-DD`.
    pub fn date_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn repo_slug(&self) -> &str {
        &self.repo_slug
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Category of a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    EntryWithoutLanguage,
    InvalidSlug,
    MalformedEntry,
    BadDocumentDate,
}

impl DiagnosticKind {
    pub fn label(&self) -> &'static str {
        match self {
            DiagnosticKind::EntryWithoutLanguage => "entry without language section",
            DiagnosticKind::InvalidSlug => "invalid repo slug",
            DiagnosticKind::MalformedEntry => "malformed repository entry",
            DiagnosticKind::BadDocumentDate => "bad document date",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A non-fatal report of input that produced no entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Document identity (file stem for filesystem sources).
    pub document: String,
    /// 1-based source line; 0 for document-level diagnostics.
    pub line: usize,
    pub kind: DiagnosticKind,
    /// Offending raw text, truncated to [`FRAGMENT_MAX_CHARS`].
    pub fragment: String,
}

impl Diagnostic {
    pub fn new(document: &str, line: usize, kind: DiagnosticKind, raw: &str) -> Self {
        Self {
            document: document.to_string(),
            line,
            kind,
            fragment: truncate_chars(raw.trim(), FRAGMENT_MAX_CHARS),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}: {}",
            self.document, self.line, self.kind, self.fragment
        )
    }
}

/// Item yielded by the document parser, in source line order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEvent {
    Entry(Entry),
    Diagnostic(Diagnostic),
}

/// A raw document ready to be parsed.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Identity used in diagnostics and as the nominal date (`2017-08-29`).
    pub identity: String,
    /// Where the document came from, for display.
    pub origin: String,
    pub body: String,
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_truncated_on_char_boundary() {
        let raw = "é".repeat(100);
        let d = Diagnostic::new("doc", 3, DiagnosticKind::MalformedEntry, &raw);
        assert_eq!(d.fragment.chars().count(), FRAGMENT_MAX_CHARS + 3);
        assert!(d.fragment.ends_with("..."));
    }

    #[test]
    fn test_short_fragment_untouched() {
        let d = Diagnostic::new("doc", 1, DiagnosticKind::InvalidSlug, "  [ bad-slug ]  ");
        assert_eq!(d.fragment, "[ bad-slug ]");
        assert_eq!(d.to_string(), "doc:1: invalid repo slug: [ bad-slug ]");
    }

    #[test]
    fn test_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&DiagnosticKind::EntryWithoutLanguage).unwrap();
        assert_eq!(json, "\"entry-without-language\"");
    }
}
