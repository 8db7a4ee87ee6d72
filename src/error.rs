/// Centralized error types for rcs2git using thiserror
///
/// The taxonomy mirrors how failures are handled: per-file parse and fetch
/// problems are survivable (skip or substitute, warn, continue); only an
/// export that finds no usable history at all is fatal.
use thiserror::Error;

/// Main error type for the exporter
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No RCS histories found")]
    NoWorkFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors raised while turning an rlog report into a timeline
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("rlog failed for '{path}': {reason}")]
    ToolFailed { path: String, reason: String },

    #[error("no revisions could be parsed from '{0}'")]
    NoRevisions(String),
}

/// Errors raised while fetching a revision's full text
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("co failed for '{path}' revision {rev}: {reason}")]
    CheckoutFailed {
        path: String,
        rev: String,
        reason: String,
    },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

impl From<anyhow::Error> for ExportError {
    fn from(err: anyhow::Error) -> Self {
        ExportError::Other(format!("{:#}", err))
    }
}

impl ExportError {
    /// Create a new error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        ExportError::Other(msg.into())
    }

    /// True for failures that remove one file (or revision) from the working
    /// set without aborting the run.
    pub fn is_survivable(&self) -> bool {
        matches!(self, ExportError::Parse(_) | ExportError::Content(_))
    }
}
