//! Discovery of `,v` files under the argument paths
//!
//! Directories are walked recursively; explicit file arguments are taken
//! as-is. Ignore patterns are shell globs matched against both the full
//! path and the basename.

use globset::{Glob, GlobMatcher};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const RCS_SUFFIX: &str = ",v";

/// One discovered RCS file: where its history lives and the logical path
/// it will be imported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RcsFile {
    /// Path to the `,v` file
    pub rcs_path: PathBuf,
    /// Logical output path: relative to the walked root, `,v` stripped
    pub filename: String,
}

/// A compiled ignore pattern. Invalid globs fall back to substring
/// matching rather than aborting the run.
enum IgnoreMatcher {
    Glob(GlobMatcher),
    Substring(String),
}

impl IgnoreMatcher {
    fn compile(pattern: &str) -> Self {
        match Glob::new(pattern) {
            Ok(glob) => IgnoreMatcher::Glob(glob.compile_matcher()),
            Err(e) => {
                tracing::warn!(
                    "Invalid ignore pattern '{}', falling back to substring match: {}",
                    pattern,
                    e
                );
                IgnoreMatcher::Substring(pattern.to_string())
            }
        }
    }

    fn matches(&self, path: &Path) -> bool {
        match self {
            IgnoreMatcher::Glob(matcher) => {
                if matcher.is_match(path) {
                    return true;
                }
                path.file_name().is_some_and(|name| matcher.is_match(name))
            }
            IgnoreMatcher::Substring(pattern) => path.to_string_lossy().contains(pattern.as_str()),
        }
    }
}

/// Walks argument paths and collects the RCS files to import.
pub struct RcsWalker {
    paths: Vec<PathBuf>,
    ignore: Vec<IgnoreMatcher>,
}

impl RcsWalker {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            ignore: Vec::new(),
        }
    }

    pub fn with_ignore_patterns(mut self, patterns: &[String]) -> Self {
        self.ignore = patterns.iter().map(|p| IgnoreMatcher::compile(p)).collect();
        self
    }

    fn is_ignored(&self, path: &Path) -> bool {
        self.ignore.iter().any(|m| m.matches(path))
    }

    /// Collect all eligible `,v` files, in deterministic (sorted) order.
    pub fn walk(&self) -> Vec<RcsFile> {
        let mut files = Vec::new();

        for root in &self.paths {
            if root.is_dir() {
                self.walk_dir(root, &mut files);
            } else if let Some(file) = self.single_file(root) {
                files.push(file);
            }
        }

        files.sort_by(|a, b| a.rcs_path.cmp(&b.rcs_path));
        tracing::info!("Found {} RCS files to import", files.len());
        files
    }

    fn walk_dir(&self, root: &Path, files: &mut Vec<RcsFile>) {
        for entry in WalkDir::new(root) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Failed to read directory entry under {}: {}", root.display(), e);
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() || !has_rcs_suffix(path) {
                continue;
            }
            if self.is_ignored(path) {
                tracing::debug!("Ignoring {}", path.display());
                continue;
            }
            let relative = path.strip_prefix(root).unwrap_or(path);
            files.push(RcsFile {
                rcs_path: path.to_path_buf(),
                filename: logical_name(relative),
            });
        }
    }

    fn single_file(&self, path: &Path) -> Option<RcsFile> {
        if !has_rcs_suffix(path) {
            tracing::warn!("Skipping {} (not an RCS ,v file)", path.display());
            return None;
        }
        if self.is_ignored(path) {
            return None;
        }
        let basename = Path::new(path.file_name()?);
        Some(RcsFile {
            rcs_path: path.to_path_buf(),
            filename: logical_name(basename),
        })
    }
}

fn has_rcs_suffix(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(RCS_SUFFIX))
}

/// Strip the `,v` suffix to obtain the logical repository path.
fn logical_name(relative: &Path) -> String {
    let s = relative.to_string_lossy();
    s.strip_suffix(RCS_SUFFIX).unwrap_or(&s).to_string()
}
