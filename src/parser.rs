//! Line-oriented parser for daily trending listings.
//!
//! A listing looks like:
//!
//! ```text
//! ## 2017-08-29
//!
//! #### python
//! * [foo / bar](https://github.com/foo/bar):A tool
//!   for X
//! - [baz/qux](https://github.com/baz/qux):Another one
//! ```
//!
//! [`DocumentParser`] walks the lines once and yields [`ParseEvent`]s in
//! source order. Scan state ([`ScanState`]) is an explicit value threaded
//! through [`step`], so nothing is shared between documents.
//!
//! Malformed input never aborts the scan: every rejected line becomes a
//! [`Diagnostic`]. The only whole-document rejection is a nominal date that
//! is not a real `YYYY-MM-DD` calendar date.

use chrono::NaiveDate;
use regex::Regex;
use std::collections::VecDeque;
use std::iter::Enumerate;
use std::str::Lines;
use std::sync::LazyLock;

use crate::models::{Diagnostic, DiagnosticKind, Entry, ParseEvent};

static DOCUMENT_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap());

/// Any ATX heading, including a bare run of `#`. Only level 4 names a language.
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#+)(?:\s+(\S.*))?$").unwrap());

/// Thematic break: `---`, `***`, `___`, optionally spaced.
static RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:(?:-\s*){3,}|(?:\*\s*){3,}|(?:_\s*){3,})$").unwrap());

/// `* [owner / name](https://...):description`
static ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[*\-]\s+\[([^\]]*)\]\((https?://[^)\s]+)\)\s*:?(.*)$").unwrap()
});

/// Anything that starts like a list item.
static BULLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[*\-](\s|\[)").unwrap());

/// Parse a nominal document date. Exactly `YYYY-MM-DD` and a real day.
pub fn parse_document_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if !DOCUMENT_DATE.is_match(raw) {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Normalize a bracketed label into an `owner/name` slug.
///
/// All whitespace is removed (`owner / name` → `owner/name`). The result
/// must contain exactly one `/` with a non-empty owner and name.
pub fn normalize_slug(raw: &str) -> Option<String> {
    let slug: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let (owner, name) = slug.split_once('/')?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return None;
    }
    Some(slug)
}

/// An entry whose description may still grow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEntry {
    repo_slug: String,
    description: String,
}

impl PendingEntry {
    fn append(&mut self, fragment: &str) {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            return;
        }
        if !self.description.is_empty() {
            self.description.push(' ');
        }
        self.description.push_str(fragment);
    }
}

/// Parser state between two lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    /// No language heading seen yet.
    SeekingLanguage,
    InLanguage {
        language: String,
    },
    /// Right after a valid entry line; continuation lines extend `pending`.
    InDescription {
        language: String,
        pending: PendingEntry,
    },
    /// Right after an entry with an invalid slug; continuations are skipped.
    Discarding {
        language: String,
    },
}

#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Blank,
    /// `## 2017-08-29`, `### Notes`, a bare `####`, `---`.
    OtherHeading,
    LanguageHeading(&'a str),
    Entry {
        label: &'a str,
        description: &'a str,
    },
    MalformedBullet,
    Text(&'a str),
}

fn classify(raw: &str) -> Line<'_> {
    let line = raw.trim();
    if line.is_empty() {
        return Line::Blank;
    }

    if let Some(caps) = HEADING.captures(line) {
        let level = caps.get(1).map_or(0, |m| m.len());
        return match (level, caps.get(2)) {
            (4, Some(name)) => Line::LanguageHeading(name.as_str().trim()),
            _ => Line::OtherHeading,
        };
    }

    if RULE.is_match(line) {
        return Line::OtherHeading;
    }

    if let Some(caps) = ENTRY.captures(line) {
        return Line::Entry {
            label: caps.get(1).map_or("", |m| m.as_str()),
            description: caps.get(3).map_or("", |m| m.as_str()),
        };
    }

    if BULLET.is_match(line) {
        return Line::MalformedBullet;
    }

    Line::Text(line)
}

/// Per-document constants needed while stepping.
#[derive(Debug, Clone, Copy)]
pub struct ScanContext<'a> {
    pub document: &'a str,
    pub date: NaiveDate,
}

impl ScanContext<'_> {
    fn flush(&self, language: String, pending: PendingEntry, out: &mut VecDeque<ParseEvent>) {
        out.push_back(ParseEvent::Entry(Entry::new(
            self.date,
            language,
            pending.repo_slug,
            pending.description,
        )));
    }

    fn diagnose(
        &self,
        line_no: usize,
        kind: DiagnosticKind,
        raw: &str,
        out: &mut VecDeque<ParseEvent>,
    ) {
        out.push_back(ParseEvent::Diagnostic(Diagnostic::new(
            self.document,
            line_no,
            kind,
            raw,
        )));
    }
}

/// Advance the state machine by one line, pushing any events to `out`.
pub fn step(
    ctx: &ScanContext<'_>,
    state: ScanState,
    line_no: usize,
    raw: &str,
    out: &mut VecDeque<ParseEvent>,
) -> ScanState {
    match classify(raw) {
        Line::Blank | Line::OtherHeading => state,

        Line::LanguageHeading(name) => {
            if let ScanState::InDescription { language, pending } = state {
                ctx.flush(language, pending, out);
            }
            ScanState::InLanguage {
                language: name.to_lowercase(),
            }
        }

        Line::Entry { label, description } => {
            let language = match state {
                ScanState::SeekingLanguage => {
                    ctx.diagnose(line_no, DiagnosticKind::EntryWithoutLanguage, raw, out);
                    return ScanState::SeekingLanguage;
                }
                ScanState::InLanguage { language } | ScanState::Discarding { language } => {
                    language
                }
                ScanState::InDescription { language, pending } => {
                    ctx.flush(language.clone(), pending, out);
                    language
                }
            };

            match normalize_slug(label) {
                Some(repo_slug) => {
                    let mut pending = PendingEntry {
                        repo_slug,
                        description: String::new(),
                    };
                    pending.append(description);
                    ScanState::InDescription { language, pending }
                }
                None => {
                    ctx.diagnose(line_no, DiagnosticKind::InvalidSlug, raw, out);
                    ScanState::Discarding { language }
                }
            }
        }

        Line::MalformedBullet => {
            ctx.diagnose(line_no, DiagnosticKind::MalformedEntry, raw, out);
            state
        }

        Line::Text(text) => match state {
            ScanState::InDescription {
                language,
                mut pending,
            } => {
                pending.append(text);
                ScanState::InDescription { language, pending }
            }
            discarding @ ScanState::Discarding { .. } => {
                ctx.diagnose(line_no, DiagnosticKind::EntryWithoutLanguage, raw, out);
                discarding
            }
            other => other,
        },
    }
}

/// Flush whatever is pending at end of input.
pub fn finish(ctx: &ScanContext<'_>, state: ScanState, out: &mut VecDeque<ParseEvent>) {
    if let ScanState::InDescription { language, pending } = state {
        ctx.flush(language, pending, out);
    }
}

/// Lazy, single-pass parser over one document.
///
/// Yields entries and diagnostics in source line order. Dropping it early
/// simply stops the scan.
pub struct DocumentParser<'a> {
    document: &'a str,
    date: Option<NaiveDate>,
    lines: Enumerate<Lines<'a>>,
    state: Option<ScanState>,
    queue: VecDeque<ParseEvent>,
}

impl<'a> DocumentParser<'a> {
    /// `document` identifies the source in diagnostics; `nominal_date` must
    /// be `YYYY-MM-DD` or the whole document is rejected.
    pub fn new(document: &'a str, nominal_date: &str, text: &'a str) -> Self {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let date = parse_document_date(nominal_date);
        let mut queue = VecDeque::new();

        let state = match date {
            Some(_) => Some(ScanState::SeekingLanguage),
            None => {
                queue.push_back(ParseEvent::Diagnostic(Diagnostic::new(
                    document,
                    0,
                    DiagnosticKind::BadDocumentDate,
                    nominal_date,
                )));
                None
            }
        };

        Self {
            document,
            date,
            lines: text.lines().enumerate(),
            state,
            queue,
        }
    }
}

impl Iterator for DocumentParser<'_> {
    type Item = ParseEvent;

    fn next(&mut self) -> Option<ParseEvent> {
        loop {
            if let Some(event) = self.queue.pop_front() {
                return Some(event);
            }

            let state = self.state.take()?;
            let ctx = ScanContext {
                document: self.document,
                date: self.date?,
            };

            match self.lines.next() {
                Some((idx, raw)) => {
                    self.state = Some(step(&ctx, state, idx + 1, raw, &mut self.queue));
                }
                None => finish(&ctx, state, &mut self.queue),
            }
        }
    }
}

/// Entries and diagnostics of one fully drained document.
#[derive(Debug, Default, Clone)]
pub struct ParsedDocument {
    pub entries: Vec<Entry>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Eagerly drain a [`DocumentParser`].
pub fn parse_document(document: &str, nominal_date: &str, text: &str) -> ParsedDocument {
    let mut parsed = ParsedDocument::default();
    for event in DocumentParser::new(document, nominal_date, text) {
        match event {
            ParseEvent::Entry(entry) => parsed.entries.push(entry),
            ParseEvent::Diagnostic(diag) => parsed.diagnostics.push(diag),
        }
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ParsedDocument {
        parse_document("2017-08-29", "2017-08-29", text)
    }

    fn kinds(parsed: &ParsedDocument) -> Vec<DiagnosticKind> {
        parsed.diagnostics.iter().map(|d| d.kind).collect()
    }

    #[test]
    fn test_single_entry() {
        let parsed = parse("#### python\n- [foo / bar](https://github.com/foo/bar):A tool\n");
        assert!(parsed.diagnostics.is_empty());
        assert_eq!(parsed.entries.len(), 1);
        let e = &parsed.entries[0];
        assert_eq!(e.date_key(), "2017-08-29");
        assert_eq!(e.language(), "python");
        assert_eq!(e.repo_slug(), "foo/bar");
        assert_eq!(e.description(), "A tool");
    }

    #[test]
    fn test_continuation_line() {
        let parsed = parse(
            "#### python\n- [foo / bar](https://github.com/foo/bar):A tool\n    for X\n",
        );
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].description(), "A tool for X");
    }

    #[test]
    fn test_multi_line_join_trims_each_fragment() {
        let parsed = parse(
            "#### go\n* [a/b](https://github.com/a/b):  first  \n   second   \n\tthird\n",
        );
        assert_eq!(parsed.entries[0].description(), "first second third");
    }

    #[test]
    fn test_entry_before_language() {
        let parsed = parse("- [foo/bar](https://github.com/foo/bar):A tool\n");
        assert!(parsed.entries.is_empty());
        assert_eq!(kinds(&parsed), vec![DiagnosticKind::EntryWithoutLanguage]);
        assert_eq!(parsed.diagnostics[0].line, 1);
    }

    #[test]
    fn test_invalid_slug() {
        let parsed = parse("#### rust\n* [ bad-slug ](https://github.com/bad-slug):x\n");
        assert!(parsed.entries.is_empty());
        assert_eq!(kinds(&parsed), vec![DiagnosticKind::InvalidSlug]);
        assert_eq!(parsed.diagnostics[0].line, 2);
    }

    #[test]
    fn test_bad_document_date() {
        let parsed = parse_document(
            "not-a-date",
            "not-a-date",
            "#### python\n- [foo/bar](https://github.com/foo/bar):A tool\n",
        );
        assert!(parsed.entries.is_empty());
        assert_eq!(kinds(&parsed), vec![DiagnosticKind::BadDocumentDate]);
        assert_eq!(parsed.diagnostics[0].line, 0);
        assert_eq!(parsed.diagnostics[0].fragment, "not-a-date");
    }

    #[test]
    fn test_impossible_calendar_date_rejected() {
        assert!(parse_document_date("2017-02-30").is_none());
        assert!(parse_document_date("2017-8-29").is_none());
        assert!(parse_document_date("２０１７-08-29").is_none());
        assert_eq!(
            parse_document_date("2016-02-29"),
            NaiveDate::from_ymd_opt(2016, 2, 29)
        );
    }

    #[test]
    fn test_one_malformed_among_nine() {
        let mut text = String::from("#### javascript\n");
        for i in 0..9 {
            text.push_str(&format!(
                "* [owner{i} / repo{i}](https://github.com/owner{i}/repo{i}):desc {i}\n"
            ));
            if i == 4 {
                text.push_str("* [missing link] no url here\n");
            }
        }
        let parsed = parse(&text);
        assert_eq!(parsed.entries.len(), 9);
        assert_eq!(kinds(&parsed), vec![DiagnosticKind::MalformedEntry]);
    }

    #[test]
    fn test_malformed_bullet_does_not_flush_pending() {
        let parsed = parse(
            "#### c\n- [a/b](https://github.com/a/b):start\n- not an entry\nmore\n",
        );
        assert_eq!(kinds(&parsed), vec![DiagnosticKind::MalformedEntry]);
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].description(), "start more");
    }

    #[test]
    fn test_mixed_bullets() {
        let parsed = parse(
            "#### ruby\n* [a/b](https://github.com/a/b):one\n- [c/d](https://github.com/c/d):two\n",
        );
        let slugs: Vec<_> = parsed.entries.iter().map(|e| e.repo_slug()).collect();
        assert_eq!(slugs, vec!["a/b", "c/d"]);
    }

    #[test]
    fn test_heading_flushes_and_switches_language() {
        let parsed = parse(
            "#### Python\n* [a/b](https://github.com/a/b):one\n  more\n#### Go\n* [c/d](https://github.com/c/d):two\n",
        );
        assert_eq!(parsed.entries.len(), 2);
        assert_eq!(parsed.entries[0].language(), "python");
        assert_eq!(parsed.entries[0].description(), "one more");
        assert_eq!(parsed.entries[1].language(), "go");
    }

    #[test]
    fn test_redeclared_heading_replaces_language_silently() {
        let parsed = parse("#### java\n#### kotlin\n* [a/b](https://github.com/a/b):x\n");
        assert!(parsed.diagnostics.is_empty());
        assert_eq!(parsed.entries[0].language(), "kotlin");
    }

    #[test]
    fn test_date_heading_is_inert() {
        let parsed = parse(
            "## 2017-08-29\n\n#### swift\n* [a/b](https://github.com/a/b):x\n## trailer\n",
        );
        assert!(parsed.diagnostics.is_empty());
        assert_eq!(parsed.entries[0].description(), "x");
    }

    #[test]
    fn test_only_level_four_names_a_language() {
        let parsed = parse(
            "#### python
* [a/b](https://github.com/a/b):one
### Notes
             * [c/d](https://github.com/c/d):two
##### Extra
* [e/f](https://github.com/e/f):three
",
        );
        assert!(parsed.diagnostics.is_empty());
        let langs: Vec<_> = parsed.entries.iter().map(|e| e.language()).collect();
        assert_eq!(langs, vec!["python", "python", "python"]);
        assert_eq!(parsed.entries[0].description(), "one");
    }

    #[test]
    fn test_bare_heading_and_rule_are_not_continuations() {
        let parsed = parse(
            "#### python
* [a/b](https://github.com/a/b):one
####
---
* * *
             * [c/d](https://github.com/c/d):two
",
        );
        assert!(parsed.diagnostics.is_empty());
        assert_eq!(parsed.entries.len(), 2);
        assert_eq!(parsed.entries[0].description(), "one");
        assert_eq!(parsed.entries[1].language(), "python");
    }

    #[test]
    fn test_blank_lines_are_inert() {
        let parsed = parse("#### php\n* [a/b](https://github.com/a/b):first\n\n\nsecond\n");
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].description(), "first second");
    }

    #[test]
    fn test_colons_in_url_and_description() {
        let parsed = parse(
            "#### python\n* [a/b](https://github.com:443/a/b):Note: it works: really\n",
        );
        assert_eq!(parsed.entries[0].description(), "Note: it works: really");
    }

    #[test]
    fn test_missing_colon_and_empty_description() {
        let parsed = parse(
            "#### python\n* [a/b](https://github.com/a/b) no colon\n* [c/d](https://github.com/c/d):\n",
        );
        assert_eq!(parsed.entries[0].description(), "no colon");
        assert_eq!(parsed.entries[1].description(), "");
    }

    #[test]
    fn test_unicode_passes_through() {
        let desc = "Café ☕ — 日本語 e\u{301} 🚀";
        let parsed = parse(&format!(
            "#### python\n* [a/b](https://github.com/a/b):{desc}\n"
        ));
        assert_eq!(parsed.entries[0].description(), desc);
    }

    #[test]
    fn test_invalid_slug_discards_continuations() {
        let parsed = parse(
            "#### go\n* [nope](https://github.com/nope):x\n  garbage\n* [a/b](https://github.com/a/b):ok\n",
        );
        assert_eq!(
            kinds(&parsed),
            vec![
                DiagnosticKind::InvalidSlug,
                DiagnosticKind::EntryWithoutLanguage
            ]
        );
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].description(), "ok");
    }

    #[test]
    fn test_invalid_slug_flushes_previous_entry() {
        let parsed = parse(
            "#### go\n* [a/b](https://github.com/a/b):kept\n* [/b](https://github.com/b):x\n",
        );
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].description(), "kept");
        assert_eq!(kinds(&parsed), vec![DiagnosticKind::InvalidSlug]);
    }

    #[test]
    fn test_events_in_line_order() {
        let events: Vec<_> = DocumentParser::new(
            "d",
            "2020-01-01",
            "* [x/y](https://github.com/x/y):early\n#### c\n* [a/b](https://github.com/a/b):one\n- broken\n",
        )
        .collect();
        assert!(matches!(&events[0], ParseEvent::Diagnostic(d) if d.line == 1));
        assert!(matches!(&events[1], ParseEvent::Diagnostic(d) if d.line == 4));
        assert!(matches!(&events[2], ParseEvent::Entry(e) if e.repo_slug() == "a/b"));
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn test_lazy_consumption() {
        let text = "#### c\n* [a/b](https://github.com/a/b):one\n* [c/d](https://github.com/c/d):two\n";
        let mut parser = DocumentParser::new("d", "2020-01-01", text);
        match parser.next() {
            Some(ParseEvent::Entry(e)) => assert_eq!(e.repo_slug(), "a/b"),
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(parser.next().is_some());
        assert!(parser.next().is_none());
        assert!(parser.next().is_none());
    }

    #[test]
    fn test_crlf_and_bom() {
        let parsed = parse("\u{feff}#### python\r\n* [a/b](https://github.com/a/b):x\r\n  y\r\n");
        assert_eq!(parsed.entries[0].language(), "python");
        assert_eq!(parsed.entries[0].description(), "x y");
    }

    #[test]
    fn test_normalize_slug() {
        assert_eq!(normalize_slug("owner / name").as_deref(), Some("owner/name"));
        assert_eq!(normalize_slug(" o w n e r/n a m e ").as_deref(), Some("owner/name"));
        assert_eq!(normalize_slug("bad-slug"), None);
        assert_eq!(normalize_slug(" / name"), None);
        assert_eq!(normalize_slug("owner / "), None);
        assert_eq!(normalize_slug("a/b/c"), None);
        assert_eq!(normalize_slug(""), None);
    }

    #[test]
    fn test_step_is_pure_over_state() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let ctx = ScanContext {
            document: "d",
            date,
        };
        let mut out = VecDeque::new();
        let state = step(&ctx, ScanState::SeekingLanguage, 1, "#### Rust", &mut out);
        assert_eq!(
            state,
            ScanState::InLanguage {
                language: "rust".to_string()
            }
        );
        let state = step(&ctx, state, 2, "* [a/b](https://github.com/a/b):x", &mut out);
        assert!(out.is_empty());
        finish(&ctx, state, &mut out);
        assert_eq!(out.len(), 1);
    }
}
