/// Configuration system for rcs2git
///
/// Supports loading from multiple sources with priority:
/// CLI args > Environment variables > Config file > Defaults
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Time fuzz in seconds for coalescing per-file commits
    #[serde(default = "default_commit_fuzz")]
    pub commit_fuzz: i64,

    /// Require symbol-set consistency when coalescing
    #[serde(default = "default_symbol_check")]
    pub symbol_check: bool,

    /// Create a lightweight tag for every RCS revision
    #[serde(default)]
    pub tag_each_rev: bool,

    /// Prefix single-file commit messages with the filename
    #[serde(default)]
    pub log_filename: bool,

    /// Drop revisions that live on branch lines
    #[serde(default)]
    pub skip_branches: bool,

    /// Reuse the author identity as the committer
    #[serde(default)]
    pub author_is_committer: bool,

    /// Shell patterns for `,v` files to skip
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Encoding of log messages in the RCS files (e.g. "ISO-8859-1")
    #[serde(default)]
    pub log_encoding: Option<String>,

    /// `username = Full Name <email>` mapping file
    #[serde(default)]
    pub authors_file: Option<PathBuf>,
}

fn default_commit_fuzz() -> i64 {
    300
}

fn default_symbol_check() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            commit_fuzz: default_commit_fuzz(),
            symbol_check: default_symbol_check(),
            tag_each_rev: false,
            log_filename: false,
            skip_branches: false,
            author_is_committer: false,
            ignore_patterns: Vec::new(),
            log_encoding: None,
            authors_file: None,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseFailed(format!("Invalid TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location or fall back to defaults
    pub fn load_or_default() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path();

        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            Self::from_file(&config_path)
        } else {
            tracing::debug!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Platform config location: `<config dir>/rcs2git/config.toml`
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rcs2git")
            .join("config.toml")
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.commit_fuzz < 0 {
            return Err(ConfigError::InvalidValue {
                key: "commit_fuzz".to_string(),
                reason: format!("must not be negative, got {}", self.commit_fuzz),
            });
        }
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(fuzz) = std::env::var("RCS2GIT_COMMIT_FUZZ")
            && let Ok(secs) = fuzz.parse()
        {
            self.commit_fuzz = secs;
        }

        if let Ok(path) = std::env::var("RCS2GIT_AUTHORS_FILE") {
            self.authors_file = Some(PathBuf::from(path));
        }

        if let Ok(encoding) = std::env::var("RCS2GIT_LOG_ENCODING") {
            self.log_encoding = Some(encoding);
        }
    }

    /// Create a new Config with defaults and environment overrides
    pub fn new() -> Result<Self, ConfigError> {
        let mut config = Self::load_or_default()?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.commit_fuzz, 300);
        assert!(config.symbol_check);
        assert!(!config.tag_each_rev);
        assert!(!config.author_is_committer);
        assert!(config.ignore_patterns.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "commit_fuzz = 60\ntag_each_rev = true\nignore_patterns = [\"*.h,v\"]\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.commit_fuzz, 60);
        assert!(config.tag_each_rev);
        assert!(config.symbol_check); // untouched default
        assert_eq!(config.ignore_patterns, vec!["*.h,v"]);
    }

    #[test]
    fn test_from_file_missing() {
        let result = Config::from_file(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_from_file_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "commit_fuzz = [not toml").unwrap();

        let result = Config::from_file(&path);
        assert!(matches!(result, Err(ConfigError::ParseFailed(_))));
    }

    #[test]
    fn test_validate_negative_fuzz() {
        let config = Config {
            commit_fuzz: -1,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_from_file_rejects_invalid_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "commit_fuzz = -5\n").unwrap();

        let result = Config::from_file(&path);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        // SAFETY: test-local env mutation, no concurrent reader of these keys
        unsafe {
            std::env::set_var("RCS2GIT_COMMIT_FUZZ", "120");
            std::env::set_var("RCS2GIT_LOG_ENCODING", "latin-1");
        }
        config.apply_env_overrides();
        unsafe {
            std::env::remove_var("RCS2GIT_COMMIT_FUZZ");
            std::env::remove_var("RCS2GIT_LOG_ENCODING");
        }
        assert_eq!(config.commit_fuzz, 120);
        assert_eq!(config.log_encoding.as_deref(), Some("latin-1"));
    }
}
