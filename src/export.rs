//! Pipeline orchestration: walk → parse → fetch → normalize → sort →
//! coalesce → emit
//!
//! Data flows strictly forward through a single sequential pass. Per-file
//! failures are isolated: a file whose report cannot be parsed is skipped,
//! a revision whose content cannot be fetched gets empty content; only a
//! run that yields no usable history at all is fatal.

use crate::authors::AuthorMap;
use crate::coalesce::{self, CoalesceOptions};
use crate::config::Config;
use crate::emit::{EmitOptions, StreamEmitter};
use crate::error::ExportError;
use crate::rcs::{self, ContentSource, RcsContentSource};
use crate::rlog;
use crate::types::{FileTimeline, PerFileCommit};
use crate::walker::{RcsFile, RcsWalker};
use std::io::Write;
use std::path::PathBuf;

/// What an export run produced; logged at the end and asserted on in tests.
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    /// RCS files that yielded a usable timeline
    pub files: usize,
    /// Per-file revisions fed into the coalescing engine
    pub revisions: usize,
    /// Commit groups written to the stream
    pub commits: usize,
    /// Tag resets written to the stream
    pub tags: usize,
    /// Revisions whose timestamp fell back to the current wall clock
    pub degraded_timestamps: usize,
    /// Revisions whose content fetch failed and was substituted with empty
    /// content
    pub missing_content: usize,
}

/// Full production run: discover `,v` files under `paths`, read their rlog
/// reports, and export the reconstructed history to `out`.
pub fn run<W: Write>(
    paths: &[PathBuf],
    config: &Config,
    out: &mut W,
) -> Result<ExportReport, ExportError> {
    let rcs_files = RcsWalker::new(paths.to_vec())
        .with_ignore_patterns(&config.ignore_patterns)
        .walk();

    let timelines = collect_timelines(&rcs_files, config);
    export_timelines(timelines, config, &RcsContentSource, out)
}

/// Parse each discovered file's rlog report into a timeline, skipping
/// files that fail with a diagnostic.
fn collect_timelines(rcs_files: &[RcsFile], config: &Config) -> Vec<FileTimeline> {
    let mut timelines = Vec::with_capacity(rcs_files.len());
    for file in rcs_files {
        let report = match rcs::read_log(&file.rcs_path, config.log_encoding.as_deref()) {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", file.rcs_path.display(), e);
                continue;
            }
        };
        match rlog::parse_report(&file.rcs_path, &file.filename, &report) {
            Ok(timeline) => timelines.push(timeline),
            Err(e) => tracing::warn!("Skipping {}: {}", file.rcs_path.display(), e),
        }
    }
    timelines
}

/// Export already-parsed timelines. This is the seam integration tests use
/// with synthetic reports and a fake content source.
pub fn export_timelines<W: Write>(
    mut timelines: Vec<FileTimeline>,
    config: &Config,
    source: &dyn ContentSource,
    out: &mut W,
) -> Result<ExportReport, ExportError> {
    if config.skip_branches {
        for timeline in &mut timelines {
            timeline.revisions.retain(|r| r.branches.is_empty());
        }
        timelines.retain(|t| {
            if t.revisions.is_empty() {
                tracing::warn!(
                    "Skipping {}: no mainline revisions left",
                    t.rcs_path.display()
                );
                false
            } else {
                true
            }
        });
    }

    if timelines.is_empty() {
        return Err(ExportError::NoWorkFound);
    }

    let mut report = ExportReport {
        files: timelines.len(),
        degraded_timestamps: timelines.iter().map(|t| t.degraded_timestamps).sum(),
        ..ExportReport::default()
    };

    let commits = build_per_file_commits(&timelines, source, &mut report);
    report.revisions = commits.len();

    // a single-file import has nothing to merge across files
    let groups = if timelines.len() == 1 {
        coalesce::singletons(commits)
    } else {
        coalesce::coalesce(
            commits,
            CoalesceOptions {
                fuzz_secs: config.commit_fuzz,
                symbol_check: config.symbol_check,
            },
        )
    };
    report.commits = groups.len();

    let mut authors = match &config.authors_file {
        Some(path) => AuthorMap::load(path),
        None => AuthorMap::new(),
    };
    authors.seed_current_user();

    let committer_ident = if config.author_is_committer {
        None
    } else {
        rcs::committer_ident()
    };
    let opts = EmitOptions {
        author_is_committer: config.author_is_committer,
        tag_each_rev: config.tag_each_rev,
        log_filename: config.log_filename,
        committer_ident,
    };

    let mut emitter = StreamEmitter::new(out, &authors, opts);
    for group in &groups {
        emitter.emit_group(group)?;
        report.tags += group.symbols.len();
        if config.tag_each_rev {
            report.tags += group.files.len();
        }
    }

    Ok(report)
}

/// Flatten timelines into per-file commits with content attached, then
/// sort the whole set ascending by timestamp. The sort is stable, so
/// records sharing a timestamp keep their per-file order.
fn build_per_file_commits(
    timelines: &[FileTimeline],
    source: &dyn ContentSource,
    report: &mut ExportReport,
) -> Vec<PerFileCommit> {
    let mut commits = Vec::new();
    for timeline in timelines {
        for rev in &timeline.revisions {
            let content = match source.fetch(&timeline.rcs_path, &rev.rev) {
                Ok(content) => content,
                Err(e) => {
                    // dropping the revision would break timestamp/parent
                    // continuity for this file, so substitute empty content
                    tracing::warn!("{}; substituting empty content", e);
                    report.missing_content += 1;
                    String::new()
                }
            };
            commits.push(PerFileCommit::from_revision(timeline, rev, content));
        }
    }
    commits.sort_by_key(|c| c.timestamp);
    commits
}
