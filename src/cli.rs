//! Command-line argument surface

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_COMMIT_HASH"),
    ", built ",
    env!("BUILD_TIMESTAMP"),
    ")"
);

/// Convert RCS `,v` files into a git fast-import stream on stdout.
///
/// Typical use:
///   git init destrepo && cd destrepo
///   rcs2git /path/to/rcs_project -A authors.txt | git fast-import
///   git reset
#[derive(Parser, Debug)]
#[command(author, version, long_version = LONG_VERSION, about, long_about = None)]
pub struct Args {
    /// RCS files or directories (directories are walked for ,v files)
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// File with `username = Full Name <email>` mappings
    #[arg(short = 'A', long)]
    pub authors_file: Option<PathBuf>,

    /// Use the author identity as the committer
    #[arg(long)]
    pub author_is_committer: bool,

    /// Ignore ,v files matching this shell pattern (can be repeated)
    #[arg(long = "ignore", value_name = "PATTERN")]
    pub ignore: Vec<String>,

    /// Encoding of log messages in the RCS files (e.g. ISO-8859-1)
    #[arg(long)]
    pub log_encoding: Option<String>,

    /// Time fuzz in seconds for coalescing commits
    #[arg(long, value_name = "SECONDS")]
    pub commit_fuzz: Option<i64>,

    /// Do not require symbol consistency when coalescing
    #[arg(long)]
    pub no_symbol_check: bool,

    /// Create a lightweight tag for each RCS revision
    #[arg(long)]
    pub tag_each_rev: bool,

    /// Prepend the filename to commit logs of single-file commits
    #[arg(long)]
    pub log_filename: bool,

    /// Skip branch-only revisions
    #[arg(long)]
    pub skip_branches: bool,

    /// Read defaults from this TOML config file instead of the platform
    /// location
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Overlay CLI arguments onto a loaded configuration. Flags only ever
    /// tighten or enable; absent options leave the config untouched.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(fuzz) = self.commit_fuzz {
            config.commit_fuzz = fuzz;
        }
        if self.no_symbol_check {
            config.symbol_check = false;
        }
        if self.tag_each_rev {
            config.tag_each_rev = true;
        }
        if self.log_filename {
            config.log_filename = true;
        }
        if self.skip_branches {
            config.skip_branches = true;
        }
        if self.author_is_committer {
            config.author_is_committer = true;
        }
        if let Some(path) = &self.authors_file {
            config.authors_file = Some(path.clone());
        }
        if let Some(encoding) = &self.log_encoding {
            config.log_encoding = Some(encoding.clone());
        }
        config
            .ignore_patterns
            .extend(self.ignore.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_invocation() {
        let args = Args::try_parse_from(["rcs2git", "/src/project"]).unwrap();
        assert_eq!(args.paths, vec![PathBuf::from("/src/project")]);
        assert!(args.commit_fuzz.is_none());
        assert!(!args.tag_each_rev);
    }

    #[test]
    fn test_paths_required() {
        assert!(Args::try_parse_from(["rcs2git"]).is_err());
    }

    #[test]
    fn test_repeated_ignore() {
        let args = Args::try_parse_from([
            "rcs2git",
            "--ignore",
            "*.h,v",
            "--ignore",
            "Attic*",
            "/src",
        ])
        .unwrap();
        assert_eq!(args.ignore, vec!["*.h,v", "Attic*"]);
    }

    #[test]
    fn test_apply_to_overrides_config() {
        let args = Args::try_parse_from([
            "rcs2git",
            "--commit-fuzz",
            "60",
            "--no-symbol-check",
            "--tag-each-rev",
            "-A",
            "authors.txt",
            "/src",
        ])
        .unwrap();

        let mut config = Config::default();
        args.apply_to(&mut config);
        assert_eq!(config.commit_fuzz, 60);
        assert!(!config.symbol_check);
        assert!(config.tag_each_rev);
        assert_eq!(config.authors_file, Some(PathBuf::from("authors.txt")));
    }

    #[test]
    fn test_apply_to_leaves_defaults_alone() {
        let args = Args::try_parse_from(["rcs2git", "/src"]).unwrap();
        let mut config = Config::default();
        args.apply_to(&mut config);
        assert_eq!(config.commit_fuzz, 300);
        assert!(config.symbol_check);
    }
}
