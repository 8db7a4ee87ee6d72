//! Stream emitter: serializes commit groups as a git fast-import stream
//!
//! Emission per group is strictly ordered: blobs first (allocating or
//! reusing marks), then the parent link, then the commit object itself,
//! then tag resets. All state lives in an explicit [`EmitterState`] so
//! independent emission runs can coexist.

use crate::authors::AuthorMap;
use crate::types::{CommitGroup, PerFileCommit};
use std::collections::HashMap;
use std::io::{self, Write};

/// Every commit lands on this single linear line of history; branch
/// topology is not reconstructed.
pub const TARGET_REF: &str = "refs/heads/master";

/// Mark allocation and parent-linkage tables, threaded through every
/// emission call. Marks are positive integers allocated strictly increasing
/// from 1, shared across blobs and commits.
#[derive(Debug)]
pub struct EmitterState {
    next_mark: usize,
    /// (logical path, revision label) -> blob mark; injective, allocated at
    /// most once per pair
    blob_marks: HashMap<(String, String), usize>,
    /// logical path -> mark of the most recent commit touching it
    last_commit_for_file: HashMap<String, usize>,
}

impl EmitterState {
    pub fn new() -> Self {
        Self {
            next_mark: 1,
            blob_marks: HashMap::new(),
            last_commit_for_file: HashMap::new(),
        }
    }

    fn alloc_mark(&mut self) -> usize {
        let mark = self.next_mark;
        self.next_mark += 1;
        mark
    }
}

impl Default for EmitterState {
    fn default() -> Self {
        Self::new()
    }
}

/// Behavior toggles for the emitter.
#[derive(Debug, Clone, Default)]
pub struct EmitOptions {
    /// Reuse the author identity on the committer line
    pub author_is_committer: bool,
    /// Additionally tag every member with its raw revision label
    pub tag_each_rev: bool,
    /// Prefix single-file commit messages with the file path
    pub log_filename: bool,
    /// Current-operator identity used verbatim on every committer line when
    /// `author_is_committer` is off; falls back to the author when absent
    pub committer_ident: Option<String>,
}

/// One path operation inside a commit.
#[derive(Debug, Clone)]
pub enum TreeOp {
    /// Set `path` to the blob at `mark` with the given mode
    Modify {
        path: String,
        mark: usize,
        mode: &'static str,
    },
    /// Remove `path` from the tree
    Delete { path: String },
}

/// Infer the file mode from content: executable iff it starts with a
/// shebang. The RCS history format does not reliably carry mode metadata,
/// so this heuristic stands in.
pub fn infer_mode(content: &str) -> &'static str {
    if content.starts_with("#!") { "755" } else { "644" }
}

pub struct StreamEmitter<'a, W: Write> {
    out: &'a mut W,
    state: EmitterState,
    authors: &'a AuthorMap,
    opts: EmitOptions,
}

impl<'a, W: Write> StreamEmitter<'a, W> {
    pub fn new(out: &'a mut W, authors: &'a AuthorMap, opts: EmitOptions) -> Self {
        Self {
            out,
            state: EmitterState::new(),
            authors,
            opts,
        }
    }

    /// Ensure a blob exists for (filename, revision), reusing the existing
    /// mark when the pair was already emitted.
    pub fn emit_blob(&mut self, filename: &str, rev: &str, content: &str) -> io::Result<usize> {
        let key = (filename.to_string(), rev.to_string());
        if let Some(&mark) = self.state.blob_marks.get(&key) {
            return Ok(mark);
        }
        let mark = self.state.alloc_mark();
        self.state.blob_marks.insert(key, mark);

        write!(self.out, "blob\nmark :{mark}\ndata {}\n", content.len())?;
        self.out.write_all(content.as_bytes())?;
        self.out.write_all(b"\n")?;
        Ok(mark)
    }

    /// Write one commit object and update the per-file parent table.
    /// Returns the commit's mark.
    pub fn emit_commit(
        &mut self,
        ops: &[TreeOp],
        author_username: &str,
        timestamp: i64,
        log: &str,
        parent: Option<usize>,
        tags: &[String],
    ) -> io::Result<usize> {
        let mark = self.state.alloc_mark();
        let author = self.authors.resolve(author_username);
        let date = format!("{timestamp} +0000");

        write!(self.out, "commit {TARGET_REF}\nmark :{mark}\n")?;
        writeln!(self.out, "author {author} {date}")?;
        if self.opts.author_is_committer {
            writeln!(self.out, "committer {author} {date}")?;
        } else {
            match &self.opts.committer_ident {
                Some(ident) => writeln!(self.out, "committer {ident}")?,
                None => writeln!(self.out, "committer {author} {date}")?,
            }
        }
        writeln!(self.out, "data {}", log.len())?;
        if !log.is_empty() {
            writeln!(self.out, "{log}")?;
        }
        if let Some(parent) = parent {
            writeln!(self.out, "from :{parent}")?;
        }
        for op in ops {
            match op {
                TreeOp::Modify { path, mark, mode } => {
                    writeln!(self.out, "M {mode} :{mark} {path}")?;
                }
                TreeOp::Delete { path } => {
                    writeln!(self.out, "D {path}")?;
                }
            }
        }
        for tag in tags {
            writeln!(self.out, "reset refs/tags/{tag}\nfrom :{mark}")?;
        }
        self.out.write_all(b"\n")?;

        for op in ops {
            if let TreeOp::Modify { path, .. } = op {
                self.state.last_commit_for_file.insert(path.clone(), mark);
            }
        }
        Ok(mark)
    }

    /// Emit one coalesced group: blobs, parent selection, commit, tags.
    pub fn emit_group(&mut self, group: &CommitGroup) -> io::Result<usize> {
        let parent = select_parent(&self.state, &group.files);

        let mut ops = Vec::with_capacity(group.files.len());
        for member in &group.files {
            let mode = infer_mode(&member.content);
            let mark = self.emit_blob(&member.filename, &member.rev, &member.content)?;
            ops.push(TreeOp::Modify {
                path: member.filename.clone(),
                mark,
                mode,
            });
        }

        let log = compose_log(&self.opts, group);
        let tags: Vec<String> = group.symbols.iter().cloned().collect();
        let mark = self.emit_commit(&ops, &group.author, group.timestamp, &log, parent, &tags)?;

        if self.opts.tag_each_rev {
            for member in &group.files {
                writeln!(self.out, "reset refs/tags/{}\nfrom :{mark}\n", member.rev)?;
            }
        }
        Ok(mark)
    }

    pub fn into_state(self) -> EmitterState {
        self.state
    }
}

/// Parent policy: the most recent commit recorded against any file the
/// group touches. When several touched files were last modified by
/// different commits, the numerically largest mark wins. This is a
/// single-lineage simplification, not a merge; the other candidate parents
/// are dropped.
fn select_parent(state: &EmitterState, files: &[PerFileCommit]) -> Option<usize> {
    files
        .iter()
        .filter_map(|f| state.last_commit_for_file.get(&f.filename))
        .max()
        .copied()
}

/// Single-file groups may carry their filename in the message.
fn compose_log(opts: &EmitOptions, group: &CommitGroup) -> String {
    if opts.log_filename && group.files.len() == 1 {
        format!("{}: {}", group.files[0].filename, group.log)
    } else {
        group.log.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    fn member(filename: &str, rev: &str, ts: i64, content: &str) -> PerFileCommit {
        PerFileCommit {
            filename: filename.to_string(),
            rcs_path: PathBuf::from(format!("{filename},v")),
            rev: rev.to_string(),
            author: "joe".to_string(),
            timestamp: ts,
            log: "a message".to_string(),
            symbols: BTreeSet::new(),
            branches: Vec::new(),
            content: content.to_string(),
        }
    }

    fn group(files: Vec<PerFileCommit>) -> CommitGroup {
        let anchor = files[0].clone();
        CommitGroup {
            timestamp: anchor.timestamp,
            author: anchor.author,
            log: anchor.log,
            symbols: BTreeSet::new(),
            files,
        }
    }

    fn emit_groups(groups: &[CommitGroup], opts: EmitOptions) -> String {
        let mut out = Vec::new();
        let authors = AuthorMap::new();
        let mut emitter = StreamEmitter::new(&mut out, &authors, opts);
        for g in groups {
            emitter.emit_group(g).unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_single_commit_stream_layout() {
        let g = group(vec![member("foo.c", "1.1", 1000, "hello\n")]);
        let stream = emit_groups(
            &[g],
            EmitOptions {
                author_is_committer: true,
                ..EmitOptions::default()
            },
        );
        assert_eq!(
            stream,
            "blob\nmark :1\ndata 6\nhello\n\n\
             commit refs/heads/master\nmark :2\n\
             author joe <joe@example.com> 1000 +0000\n\
             committer joe <joe@example.com> 1000 +0000\n\
             data 9\na message\n\
             M 644 :1 foo.c\n\n"
        );
    }

    #[test]
    fn test_blob_mark_reused_for_same_pair() {
        let mut out = Vec::new();
        let authors = AuthorMap::new();
        let mut emitter = StreamEmitter::new(&mut out, &authors, EmitOptions::default());
        let first = emitter.emit_blob("foo.c", "1.1", "x").unwrap();
        let second = emitter.emit_blob("foo.c", "1.1", "x").unwrap();
        let other = emitter.emit_blob("foo.c", "1.2", "y").unwrap();
        assert_eq!(first, second);
        assert_ne!(first, other);
        // only two blob frames were written
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("blob\n").count(), 2);
    }

    #[test]
    fn test_linear_parent_chain() {
        let g1 = group(vec![member("foo.c", "1.1", 1000, "one\n")]);
        let g2 = group(vec![member("foo.c", "1.2", 5000, "two\n")]);
        let stream = emit_groups(&[g1, g2], EmitOptions::default());
        // marks: blob 1, commit 2, blob 3, commit 4; second commit descends
        // from the first
        assert!(stream.contains("from :2\n"));
        assert!(!stream.contains("from :4\n"));
    }

    #[test]
    fn test_parent_is_largest_candidate_mark() {
        let g1 = group(vec![member("a.c", "1.1", 1000, "a\n")]);
        let g2 = group(vec![member("b.c", "1.1", 2000, "b\n")]);
        // touches both files; a.c was last touched by commit 2, b.c by
        // commit 4 -> parent must be 4
        let g3 = group(vec![
            member("a.c", "1.2", 3000, "a2\n"),
            member("b.c", "1.2", 3000, "b2\n"),
        ]);
        let stream = emit_groups(&[g1, g2, g3], EmitOptions::default());
        let last_commit = stream.rsplit("commit refs/heads/master").next().unwrap();
        assert!(last_commit.contains("from :4\n"));
    }

    #[test]
    fn test_shebang_content_marked_executable() {
        let g = group(vec![
            member("run.sh", "1.1", 1000, "#!/bin/sh\necho hi\n"),
            member("notes.txt", "1.1", 1000, "#comment, not a shebang\n"),
        ]);
        let stream = emit_groups(&[g], EmitOptions::default());
        assert!(stream.contains("M 755 :1 run.sh\n"));
        assert!(stream.contains("M 644 :2 notes.txt\n"));
    }

    #[test]
    fn test_infer_mode() {
        assert_eq!(infer_mode("#!/usr/bin/env python3\n"), "755");
        assert_eq!(infer_mode("plain text"), "644");
        assert_eq!(infer_mode(""), "644");
    }

    #[test]
    fn test_delete_op_rendering() {
        let mut out = Vec::new();
        let authors = AuthorMap::new();
        let mut emitter = StreamEmitter::new(&mut out, &authors, EmitOptions::default());
        let ops = vec![TreeOp::Delete {
            path: "gone.c".to_string(),
        }];
        emitter
            .emit_commit(&ops, "joe", 1000, "remove", None, &[])
            .unwrap();
        // deletions do not update the parent table
        let state = emitter.into_state();
        assert!(state.last_commit_for_file.is_empty());
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("D gone.c\n"));
    }

    #[test]
    fn test_symbol_tags_reset_to_commit() {
        let mut g = group(vec![member("foo.c", "1.2", 1000, "x\n")]);
        g.symbols = ["RELEASE_1_0".to_string()].into_iter().collect();
        let stream = emit_groups(&[g], EmitOptions::default());
        assert!(stream.contains("reset refs/tags/RELEASE_1_0\nfrom :2\n"));
    }

    #[test]
    fn test_tag_each_rev() {
        let g = group(vec![member("foo.c", "1.2", 1000, "x\n")]);
        let stream = emit_groups(
            &[g],
            EmitOptions {
                tag_each_rev: true,
                ..EmitOptions::default()
            },
        );
        assert!(stream.contains("reset refs/tags/1.2\nfrom :2\n"));
    }

    #[test]
    fn test_log_filename_prefix_single_member_only() {
        let single = group(vec![member("foo.c", "1.1", 1000, "x\n")]);
        let multi = group(vec![
            member("foo.c", "1.2", 2000, "x2\n"),
            member("bar.c", "1.1", 2000, "y\n"),
        ]);
        let stream = emit_groups(
            &[single, multi],
            EmitOptions {
                log_filename: true,
                ..EmitOptions::default()
            },
        );
        assert!(stream.contains("foo.c: a message\n"));
        // multi-member messages pass through unchanged
        assert!(stream.contains("\ndata 9\na message\n"));
    }

    #[test]
    fn test_committer_ident_used_when_configured() {
        let g = group(vec![member("foo.c", "1.1", 1000, "x\n")]);
        let stream = emit_groups(
            &[g],
            EmitOptions {
                committer_ident: Some("Operator <op@example.org> 999 +0000".to_string()),
                ..EmitOptions::default()
            },
        );
        assert!(stream.contains("committer Operator <op@example.org> 999 +0000\n"));
        assert!(stream.contains("author joe <joe@example.com> 1000 +0000\n"));
    }

    #[test]
    fn test_empty_log_frames_zero_bytes() {
        let mut g = group(vec![member("foo.c", "1.1", 1000, "x\n")]);
        g.log = String::new();
        g.files[0].log = String::new();
        let stream = emit_groups(&[g], EmitOptions::default());
        assert!(stream.contains("data 0\nM 644"));
    }
}
