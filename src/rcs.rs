//! Collaborator calls into the RCS and git command-line tools
//!
//! Everything here is a thin, replaceable wrapper: `rlog` produces the raw
//! report the parser consumes, `co` produces revision content, and `git`
//! supplies the current operator identity. The [`ContentSource`] trait is
//! the seam the pipeline depends on, so tests never need the tools
//! installed.

use crate::error::{ContentError, ParseError};
use std::path::Path;
use std::process::Command;

/// Retrieves the full text of one revision of one file.
pub trait ContentSource {
    /// Fetch the exact content of `rev` of the file at `rcs_path`.
    fn fetch(&self, rcs_path: &Path, rev: &str) -> Result<String, ContentError>;
}

/// Production content source: `co -q -p<rev> <path>`.
#[derive(Debug, Default)]
pub struct RcsContentSource;

impl ContentSource for RcsContentSource {
    fn fetch(&self, rcs_path: &Path, rev: &str) -> Result<String, ContentError> {
        let output = Command::new("co")
            .arg("-q")
            .arg(format!("-p{rev}"))
            .arg(rcs_path)
            .output()
            .map_err(|e| ContentError::CheckoutFailed {
                path: rcs_path.display().to_string(),
                rev: rev.to_string(),
                reason: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(ContentError::CheckoutFailed {
                path: rcs_path.display().to_string(),
                rev: rev.to_string(),
                reason: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Run `rlog` for one `,v` file and return its decoded report text.
///
/// `rlog -z` is tried first; some builds reject the flag, so plain `rlog`
/// is the fallback.
pub fn read_log(rcs_path: &Path, log_encoding: Option<&str>) -> Result<String, ParseError> {
    let run = |with_z: bool| -> std::io::Result<std::process::Output> {
        let mut cmd = Command::new("rlog");
        if with_z {
            cmd.arg("-z");
        }
        cmd.arg(rcs_path).output()
    };

    let output = match run(true) {
        Ok(out) if out.status.success() => out,
        _ => run(false).map_err(|e| ParseError::ToolFailed {
            path: rcs_path.display().to_string(),
            reason: e.to_string(),
        })?,
    };

    if !output.status.success() {
        return Err(ParseError::ToolFailed {
            path: rcs_path.display().to_string(),
            reason: format!(
                "{}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }

    Ok(decode_log_output(&output.stdout, log_encoding))
}

/// Decode rlog output bytes.
///
/// UTF-8 (lossy) by default. Latin-1 is the one supported override, a pure
/// byte-to-char widening that needs no decoding table; other
/// encoding names are warned about and treated as UTF-8.
pub fn decode_log_output(bytes: &[u8], log_encoding: Option<&str>) -> String {
    match log_encoding.map(|e| e.to_ascii_lowercase()) {
        Some(enc) if matches!(enc.as_str(), "latin1" | "latin-1" | "iso-8859-1") => {
            bytes.iter().map(|&b| b as char).collect()
        }
        Some(enc) => {
            tracing::warn!("Unsupported log encoding '{}', decoding as UTF-8", enc);
            String::from_utf8_lossy(bytes).into_owned()
        }
        None => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Current operator identity from `git var GIT_COMMITTER_IDENT`, used
/// verbatim on committer lines when the author is not reused. `None` when
/// git is unavailable; the emitter then falls back to the author.
pub fn committer_ident() -> Option<String> {
    let output = Command::new("git")
        .args(["var", "GIT_COMMITTER_IDENT"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let ident = String::from_utf8(output.stdout).ok()?.trim().to_string();
    if ident.is_empty() { None } else { Some(ident) }
}
