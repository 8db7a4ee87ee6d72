//! Core data model shared by the parsing, coalescing and emission stages

use std::collections::BTreeSet;
use std::path::PathBuf;

/// One saved version of one RCS file, as reported by `rlog`.
///
/// Revision labels are opaque and unique only within their own file; they
/// are never compared across files.
#[derive(Debug, Clone)]
pub struct RevisionRecord {
    /// RCS revision label (e.g. "1.4")
    pub rev: String,
    /// Commit instant, Unix epoch seconds, UTC
    pub timestamp: i64,
    /// Raw RCS username
    pub author: String,
    /// Lifecycle state tag ("Exp", "dead", ...), informational only
    pub state: Option<String>,
    /// Branch revision labels hanging off this revision; non-empty means
    /// this revision lives on a non-mainline line
    pub branches: Vec<String>,
    /// Symbolic names (tags) attached to this revision
    pub symbols: BTreeSet<String>,
    /// Log message, possibly empty, never absent
    pub log: String,
}

impl RevisionRecord {
    pub fn new(rev: impl Into<String>) -> Self {
        Self {
            rev: rev.into(),
            timestamp: 0,
            author: String::new(),
            state: None,
            branches: Vec::new(),
            symbols: BTreeSet::new(),
            log: String::new(),
        }
    }
}

/// The parsed history of a single `,v` file.
///
/// `revisions` is exposed oldest-first even though rlog reports newest-first;
/// the parser reverses before handing the timeline out.
#[derive(Debug, Clone)]
pub struct FileTimeline {
    /// Path to the `,v` file the history was read from
    pub rcs_path: PathBuf,
    /// Logical path used in the produced repository
    pub filename: String,
    /// File-scoped symbol table: symbol name -> revision label
    pub symbols: Vec<(String, String)>,
    /// Revisions in ascending-timestamp order
    pub revisions: Vec<RevisionRecord>,
    /// How many revisions fell back to "now" because their date field was
    /// unparsable; kept so degradation is observable, not silent
    pub degraded_timestamps: usize,
}

/// The flattened unit the coalescing engine consumes: one revision of one
/// file with its content attached.
#[derive(Debug, Clone)]
pub struct PerFileCommit {
    /// Logical path in the produced repository
    pub filename: String,
    /// Path to the `,v` file
    pub rcs_path: PathBuf,
    /// Revision label within `filename`
    pub rev: String,
    pub author: String,
    pub timestamp: i64,
    pub log: String,
    pub symbols: BTreeSet<String>,
    pub branches: Vec<String>,
    /// Full file content at this revision
    pub content: String,
}

impl PerFileCommit {
    /// Flatten one revision of a timeline into the uniform per-file record.
    pub fn from_revision(timeline: &FileTimeline, rev: &RevisionRecord, content: String) -> Self {
        Self {
            filename: timeline.filename.clone(),
            rcs_path: timeline.rcs_path.clone(),
            rev: rev.rev.clone(),
            author: if rev.author.is_empty() {
                "unknown".to_string()
            } else {
                rev.author.clone()
            },
            timestamp: rev.timestamp,
            log: rev.log.clone(),
            symbols: rev.symbols.clone(),
            branches: rev.branches.clone(),
            content,
        }
    }
}

/// An atomic multi-file commit produced by the coalescing engine.
///
/// Invariant: member file identities are pairwise distinct. Timestamp,
/// author and log come from the anchor record; symbols are the union of the
/// members' symbol sets.
#[derive(Debug, Clone)]
pub struct CommitGroup {
    pub timestamp: i64,
    pub author: String,
    pub log: String,
    /// Members in global sort order
    pub files: Vec<PerFileCommit>,
    pub symbols: BTreeSet<String>,
}

impl CommitGroup {
    /// A group holding exactly one per-file commit.
    pub fn singleton(commit: PerFileCommit) -> Self {
        Self {
            timestamp: commit.timestamp,
            author: commit.author.clone(),
            log: commit.log.clone(),
            symbols: commit.symbols.clone(),
            files: vec![commit],
        }
    }
}
