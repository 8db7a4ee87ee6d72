//! # rcs2git - RCS to git fast-import conversion
//!
//! Reconstructs a coherent, chronologically ordered commit history from a
//! tree of independently versioned RCS `,v` files and serializes it as a
//! `git fast-import` stream.
//!
//! ## Overview
//!
//! Each RCS file carries its own revision timeline, never causally linked
//! to edits of other files. rcs2git parses every file's `rlog` report,
//! flattens the timelines into one globally time-sorted list, coalesces
//! near-simultaneous same-author, same-message revisions into multi-file
//! commits, and emits a content-addressed, mark-referenced object stream
//! with correct parent linkage and tag placement.
//!
//! ## Pipeline
//!
//! ```text
//! ,v files ──walker──► rlog reports ──rlog──► FileTimelines
//!                                                │
//!                         co (content fetch) ────┤
//!                                                ▼
//!                                      PerFileCommits (time-sorted)
//!                                                │ coalesce
//!                                                ▼
//!                                          CommitGroups
//!                                                │ emit
//!                                                ▼
//!                                    git fast-import stream (stdout)
//! ```
//!
//! ## Usage Example
//!
//! ```no_run
//! use rcs2git::config::Config;
//! use std::path::PathBuf;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let mut out = std::io::stdout().lock();
//!     let report = rcs2git::export::run(&[PathBuf::from("project")], &config, &mut out)?;
//!     eprintln!("exported {} commits", report.commits);
//!     Ok(())
//! }
//! ```

/// Author lookup table with synthesized fallbacks
pub mod authors;

/// Command-line argument surface
pub mod cli;

/// Coalescing engine: per-file commits into multi-file commit groups
pub mod coalesce;

/// Layered configuration (CLI > env > file > defaults)
pub mod config;

/// Stream emitter: commit groups into the fast-import object stream
pub mod emit;

/// Error types and utilities
pub mod error;

/// Pipeline orchestration and the export report
pub mod export;

/// Collaborator calls into the rlog/co/git command-line tools
pub mod rcs;

/// Timeline parser for rlog reports
pub mod rlog;

/// Core data model shared by all stages
pub mod types;

/// Discovery of `,v` files with ignore-glob filtering
pub mod walker;
