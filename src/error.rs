use std::path::PathBuf;
use thiserror::Error;

use crate::llm::GenerationError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// None of the accepted credential variables is set.
    #[error("API key not found: set one of {vars} (a .env file works too)")]
    MissingCredential { vars: String },

    #[error("a target file or directory must be given with -p or --path")]
    MissingTarget,

    #[error("target '{path}' does not exist")]
    NotFound { path: PathBuf },

    /// Exists but is neither a regular file nor a directory.
    #[error("target '{path}' is neither a file nor a directory")]
    InvalidPath { path: PathBuf },

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("IO error accessing '{path}': {message}")]
    Io { path: PathBuf, message: String },

    #[error("failed to write documentation to '{path}': {message}")]
    Write { path: PathBuf, message: String },

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Errors that mean the arguments themselves were unusable.
    pub const fn is_usage(&self) -> bool {
        matches!(
            self,
            Self::MissingTarget | Self::MissingCredential { .. } | Self::InvalidConfig { .. }
        )
    }
}
