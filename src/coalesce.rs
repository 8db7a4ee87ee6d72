//! Coalescing engine: merges the global, time-sorted sequence of per-file
//! commits into multi-file commit groups
//!
//! Revisions of different files were never causally linked by RCS; the best
//! available signal that a developer committed several files "at once" is a
//! shared author and log message within a small time window. The engine runs
//! a single forward pass over the sorted input: each unconsumed record
//! anchors a group, and candidates inside the fuzz window join it unless
//! they disagree on author, message, symbol consistency, or would duplicate
//! a file already in the group.

use crate::types::{CommitGroup, PerFileCommit};
use std::collections::BTreeSet;

/// Knobs for the grouping pass.
#[derive(Debug, Clone, Copy)]
pub struct CoalesceOptions {
    /// Maximum gap in seconds between the anchor and a candidate for them to
    /// be considered part of the same atomic commit
    pub fuzz_secs: i64,
    /// Reject candidates whose symbol set is neither a subset nor a superset
    /// of the group's accumulated symbols; prevents merging a tagged release
    /// point with an unrelated untagged edit that happens to line up
    pub symbol_check: bool,
}

impl Default for CoalesceOptions {
    fn default() -> Self {
        Self {
            fuzz_secs: 300,
            symbol_check: true,
        }
    }
}

/// Group a time-sorted list of per-file commits into commit groups.
///
/// Every input record lands in exactly one group; groups come out in
/// non-decreasing anchor-timestamp order and members keep their global sort
/// order. A group may consume records past other records it rejected; those
/// rejected records are not consumed and stay eligible as future anchors.
pub fn coalesce(commits: Vec<PerFileCommit>, opts: CoalesceOptions) -> Vec<CommitGroup> {
    let mut groups: Vec<CommitGroup> = Vec::new();
    let mut consumed = vec![false; commits.len()];
    let n = commits.len();
    let mut i = 0;

    while i < n {
        if consumed[i] {
            i += 1;
            continue;
        }

        let anchor = &commits[i];
        let mut member_indices = vec![i];
        let mut group_symbols: BTreeSet<String> = anchor.symbols.clone();
        let mut filenames: BTreeSet<&str> = BTreeSet::new();
        filenames.insert(anchor.filename.as_str());
        consumed[i] = true;

        let mut j = i + 1;
        while j < n {
            let cand = &commits[j];
            if cand.timestamp > anchor.timestamp + opts.fuzz_secs {
                break;
            }
            if consumed[j]
                || cand.author != anchor.author
                || cand.log != anchor.log
                || filenames.contains(cand.filename.as_str())
            {
                j += 1;
                continue;
            }
            if opts.symbol_check && !symbols_consistent(&group_symbols, &cand.symbols) {
                j += 1;
                continue;
            }

            consumed[j] = true;
            member_indices.push(j);
            group_symbols.extend(cand.symbols.iter().cloned());
            filenames.insert(cand.filename.as_str());
            j += 1;
        }

        groups.push(finalize_group(&commits, member_indices, group_symbols));
        // records scanned but rejected were not consumed; the loop picks the
        // first unconsumed record as the next anchor
        i += 1;
    }

    tracing::debug!(
        "Coalesced {} per-file commits into {} groups",
        n,
        groups.len()
    );
    groups
}

/// One group per record, used for the degenerate single-file import where
/// there is nothing to merge across files. Output shape is identical to
/// running the full pass.
pub fn singletons(commits: Vec<PerFileCommit>) -> Vec<CommitGroup> {
    commits.into_iter().map(CommitGroup::singleton).collect()
}

/// Subset in either direction.
fn symbols_consistent(group: &BTreeSet<String>, candidate: &BTreeSet<String>) -> bool {
    group.is_subset(candidate) || candidate.is_subset(group)
}

fn finalize_group(
    commits: &[PerFileCommit],
    member_indices: Vec<usize>,
    symbols: BTreeSet<String>,
) -> CommitGroup {
    let anchor = &commits[member_indices[0]];
    CommitGroup {
        timestamp: anchor.timestamp,
        author: anchor.author.clone(),
        log: anchor.log.clone(),
        symbols,
        files: member_indices
            .into_iter()
            .map(|idx| commits[idx].clone())
            .collect(),
    }
}
