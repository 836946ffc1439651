use std::path::{Path, PathBuf};

use thiserror::Error;

/// A dictionary file that could not be read or parsed. The overlay is left as
/// it was before the attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to parse localization file {path}: {reason}")]
pub struct LocalizationParseError {
    pub path: PathBuf,
    pub reason: String,
}

impl LocalizationParseError {
    #[must_use]
    pub fn new(path: &Path, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LocalizationParseError>;
