//! Error taxonomy for the index builder and verifier.
//!
//! Fatal conditions are a typed [`BuilderError`]; per-file problems that do not
//! abort a build are [`Warning`] values accumulated into the result instead.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum BuilderError {
    #[error("candidate file count exceeds max_files")]
    TooManyFiles,

    #[error("no ignore-aware directory walker is available")]
    RipgrepMissing,

    #[error("{0} is not a git repository")]
    NotGitRepo(PathBuf),

    #[error("git error: {0}")]
    GitError(String),

    #[error("failed to write artifact {file}: {source}")]
    WriteError {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration at {path}: {message}")]
    ConfigError { path: PathBuf, message: String },

    #[error("{path} is not valid UTF-8")]
    EncodingError { path: PathBuf },
}

impl BuilderError {
    /// The stable, machine-readable error code from the invoker contract.
    pub fn code(&self) -> &'static str {
        match self {
            BuilderError::TooManyFiles => "ARK_INDEX_TOO_MANY_FILES",
            BuilderError::RipgrepMissing => "ARK_INDEX_RIPGREP_MISSING",
            BuilderError::NotGitRepo(_) => "ARK_INDEX_NOT_GIT_REPO",
            BuilderError::GitError(_) => "ARK_INDEX_GIT_ERROR",
            BuilderError::WriteError { .. } => "ARK_INDEX_WRITE_ERROR",
            BuilderError::ReadError { .. } => "ARK_INDEX_READ_ERROR",
            BuilderError::ConfigError { .. } => "ARK_INDEX_READ_ERROR",
            BuilderError::EncodingError { .. } => "ARK_INDEX_ENCODING_ERROR",
        }
    }
}

/// JSON-serializable mirror of a [`BuilderError`] for the invoker's `error{code, message}` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}

impl From<&BuilderError> for ErrorPayload {
    fn from(e: &BuilderError) -> Self {
        ErrorPayload { code: e.code().to_string(), message: e.to_string() }
    }
}

/// A non-fatal, machine-readable warning attached to a build result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Warning {
    pub code: String,
    pub file: Option<String>,
    pub message: String,
}

impl Warning {
    pub fn file_skipped(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Warning { code: "ARK_INDEX_FILE_SKIPPED".to_string(), file: Some(file.into()), message: reason.into() }
    }

    pub fn extraction_error(file: impl Into<String>, message: impl Into<String>) -> Self {
        Warning {
            code: "ARK_INDEX_EXTRACTION_ERROR".to_string(),
            file: Some(file.into()),
            message: message.into(),
        }
    }
}
