//! Timeline parser: turns one file's rlog report into a [`FileTimeline`]
//!
//! rlog output is free-form and line-oriented. Parsing runs a two-phase
//! state machine: a header phase that collects file-scoped symbol
//! declarations, then a revision phase that walks `revision` blocks. The
//! report lists revisions newest-first; the produced timeline is always
//! oldest-first.

use crate::error::ParseError;
use crate::types::{FileTimeline, RevisionRecord};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use std::path::Path;

/// Parser states, one per region of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Before the first revision marker; symbol declarations live here
    Header,
    /// Inside a revision block, reading metadata lines
    RevisionHeader,
    /// Inside a `log` body, collecting free text
    LogBody,
    /// Between blocks, scanning for the next revision marker
    BlockEnd,
}

/// Line cursor over the report; all look-ahead goes through here.
struct LineCursor<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> LineCursor<'a> {
    fn new(report: &'a str) -> Self {
        Self {
            lines: report.lines().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<&'a str> {
        let line = self.lines.get(self.pos).copied();
        if line.is_some() {
            self.pos += 1;
        }
        line
    }
}

/// Join a wrapped symbol declaration fragment.
///
/// rlog occasionally folds `name:rev; name:rev; ...` lists across physical
/// lines. Keep appending while the fragment still looks unterminated (has a
/// `;`-delimited pair left open) and the next line is not the block marker
/// given by `stop_prefix`.
fn join_wrapped(cursor: &mut LineCursor, first: &str, stop_prefix: &str) -> String {
    let mut rest = first.to_string();
    while rest.contains(';')
        && !rest.trim_end().ends_with(';')
        && cursor
            .peek()
            .is_some_and(|l| !l.trim_start().starts_with(stop_prefix))
    {
        match cursor.advance() {
            Some(line) => {
                rest.push(' ');
                rest.push_str(line.trim());
            }
            None => break,
        }
    }
    rest
}

/// Split a joined declaration into `(name, revision-label)` pairs.
fn parse_symbol_pairs(decl: &str) -> Vec<(String, String)> {
    decl.split(';')
        .filter_map(|pair| {
            let pair = pair.trim();
            let (name, rev) = pair.split_once(':')?;
            let (name, rev) = (name.trim(), rev.trim());
            if name.is_empty() || rev.is_empty() {
                return None;
            }
            Some((name.to_string(), rev.to_string()))
        })
        .collect()
}

/// A run of dashes or equals signs, as rlog prints between blocks and at the
/// end of the report.
fn is_separator(line: &str) -> bool {
    let t = line.trim();
    t.len() >= 8 && (t.bytes().all(|b| b == b'-') || t.bytes().all(|b| b == b'='))
}

fn is_revision_marker(line: &str) -> bool {
    line.trim_start().starts_with("revision ")
}

fn is_content_marker(line: &str) -> bool {
    line.trim_start().starts_with("text")
}

/// Parse an RCS date field (`Y.M.D.h.m.s`) into Unix epoch seconds, UTC.
///
/// A one- or two-digit year is treated as 19YY. A field that does not match
/// the dot format is retried as a generic calendar string; if that also
/// fails the current wall-clock time is substituted so a single bad date
/// never aborts the import. Returns `(timestamp, degraded)` where `degraded`
/// flags the wall-clock fallback.
pub fn parse_rcs_date(s: &str) -> (i64, bool) {
    let s = s.trim();
    let parts: Vec<&str> = s.split('.').collect();
    if parts.len() < 6 {
        for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return (dt.and_utc().timestamp(), false);
            }
        }
        return (Utc::now().timestamp(), true);
    }

    let year_raw = parts[0].trim();
    let year_str = if year_raw.len() < 3 {
        format!("19{year_raw}")
    } else {
        year_raw.to_string()
    };

    let num = |i: usize| -> Option<u32> { parts.get(i)?.trim().parse().ok() };
    if let Ok(y) = year_str.parse::<i32>()
        && let (Some(mo), Some(d), Some(h), Some(mi), Some(sec)) =
            (num(1), num(2), num(3), num(4), num(5))
        && let Some(date) = NaiveDate::from_ymd_opt(y, mo, d)
        && let Some(dt) = date.and_hms_opt(h, mi, sec)
    {
        return (dt.and_utc().timestamp(), false);
    }

    (Utc::now().timestamp(), true)
}

/// Parse the raw textual rlog report for one file.
///
/// `filename` is the logical output path the history will be imported under.
/// Fails only when no revision at all can be recovered; the caller skips the
/// file and continues.
pub fn parse_report(
    rcs_path: &Path,
    filename: &str,
    report: &str,
) -> Result<FileTimeline, ParseError> {
    let mut timeline = FileTimeline {
        rcs_path: rcs_path.to_path_buf(),
        filename: filename.to_string(),
        symbols: Vec::new(),
        revisions: Vec::new(),
        degraded_timestamps: 0,
    };

    let mut cursor = LineCursor::new(report);
    let mut state = State::Header;
    let mut current: Option<RevisionRecord> = None;
    let mut log_lines: Vec<&str> = Vec::new();

    loop {
        match state {
            State::Header => {
                let Some(line) = cursor.peek() else { break };
                if is_revision_marker(line) {
                    state = State::RevisionHeader;
                    continue;
                }
                cursor.advance();
                let stripped = line.trim();
                if stripped.starts_with("symbol") {
                    // "symbol:"/"symbols:" declaration; pairs follow the colon
                    let rest = stripped.split_once(':').map(|(_, r)| r).unwrap_or("");
                    let joined = join_wrapped(&mut cursor, rest, "revision");
                    timeline.symbols.extend(parse_symbol_pairs(&joined));
                }
            }

            State::RevisionHeader => {
                let Some(line) = cursor.advance() else { break };
                let stripped = line.trim();

                if is_revision_marker(line) {
                    if let Some(rev) = current.take() {
                        timeline.revisions.push(rev);
                    }
                    let label = stripped
                        .split_whitespace()
                        .nth(1)
                        .unwrap_or_default()
                        .to_string();
                    current = Some(RevisionRecord::new(label));
                } else if stripped.starts_with("date:") {
                    if let Some(rev) = current.as_mut() {
                        apply_metadata_fields(rev, stripped, &mut timeline.degraded_timestamps);
                    }
                } else if let Some(val) = stripped.strip_prefix("branches:") {
                    if let Some(rev) = current.as_mut() {
                        rev.branches = parse_branch_list(val);
                    }
                } else if let Some(val) = stripped.strip_prefix("state:") {
                    // state occasionally appears as its own line
                    if let Some(rev) = current.as_mut() {
                        rev.state = Some(val.trim().trim_end_matches(';').to_string());
                    }
                } else if stripped.starts_with("symbol") {
                    // per-revision symbol declaration: names attach directly
                    // to this revision, not the file table
                    let rest = stripped.split_once(':').map(|(_, r)| r).unwrap_or("");
                    let joined = join_wrapped(&mut cursor, rest, "log");
                    if let Some(rev) = current.as_mut() {
                        rev.symbols
                            .extend(parse_symbol_pairs(&joined).into_iter().map(|(name, _)| name));
                    }
                } else if stripped == "log" {
                    log_lines.clear();
                    state = State::LogBody;
                } else if stripped.is_empty() || is_separator(line) || is_content_marker(line) {
                    state = State::BlockEnd;
                }
                // anything else: unrecognized metadata, skip
            }

            State::LogBody => {
                let Some(line) = cursor.peek() else {
                    finish_log(&mut current, &mut log_lines);
                    break;
                };
                if is_revision_marker(line) {
                    finish_log(&mut current, &mut log_lines);
                    state = State::RevisionHeader;
                } else if is_content_marker(line) || is_separator(line) {
                    // separator in terminator position ends the block; it is
                    // never log content
                    cursor.advance();
                    finish_log(&mut current, &mut log_lines);
                    state = State::BlockEnd;
                } else {
                    cursor.advance();
                    log_lines.push(line);
                }
            }

            State::BlockEnd => {
                let Some(line) = cursor.peek() else { break };
                if is_revision_marker(line) {
                    state = State::RevisionHeader;
                } else {
                    cursor.advance();
                }
            }
        }
    }

    if let Some(rev) = current.take() {
        timeline.revisions.push(rev);
    }

    if timeline.revisions.is_empty() {
        return Err(ParseError::NoRevisions(rcs_path.display().to_string()));
    }

    // rlog emits newest first; expose chronological order
    timeline.revisions.reverse();

    // back-attach file-scoped symbols to the revisions they name
    for (name, rev_label) in &timeline.symbols {
        if let Some(rev) = timeline.revisions.iter_mut().find(|r| &r.rev == rev_label) {
            rev.symbols.insert(name.clone());
        }
    }

    Ok(timeline)
}

/// Apply a `date: ...; author: ...; state: ...;` metadata line.
fn apply_metadata_fields(rev: &mut RevisionRecord, line: &str, degraded: &mut usize) {
    for field in line.split(';') {
        let field = field.trim();
        if let Some(val) = field.strip_prefix("date:") {
            let (ts, fell_back) = parse_rcs_date(val);
            rev.timestamp = ts;
            if fell_back {
                *degraded += 1;
                tracing::warn!(
                    "Unparsable date '{}' for revision {}; substituting current time",
                    val.trim(),
                    rev.rev
                );
            }
        } else if let Some(val) = field.strip_prefix("author:") {
            rev.author = val.trim().to_string();
        } else if let Some(val) = field.strip_prefix("state:") {
            rev.state = Some(val.trim().to_string());
        } else if let Some(val) = field.strip_prefix("branches:") {
            rev.branches = parse_branch_list(val);
        }
    }
}

/// Branch lists appear either inside the `;`-separated date line or on a
/// standalone `branches:` line; labels may carry trailing semicolons.
fn parse_branch_list(val: &str) -> Vec<String> {
    val.split_whitespace()
        .map(|s| s.trim_end_matches(';'))
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn finish_log(current: &mut Option<RevisionRecord>, log_lines: &mut Vec<&str>) {
    if let Some(rev) = current.as_mut() {
        rev.log = log_lines.join("\n").trim_end().to_string();
    }
    log_lines.clear();
}
