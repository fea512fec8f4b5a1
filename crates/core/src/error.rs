use std::io;
use std::result::Result as StdResult;

use thiserror::Error;

/// Errors that can occur in pipeline-sync core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid schema extension script (line {line}): {message}")]
    InvalidSpec { line: usize, message: String },

    #[error("Unsupported column type: {0}")]
    UnsupportedColumnType(String),

    #[error("Unknown ISO region: {0}")]
    UnknownIsoRegion(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl CoreError {
    pub(crate) fn spec(line: usize, message: impl Into<String>) -> Self {
        Self::InvalidSpec { line, message: message.into() }
    }
}

pub type Result<T> = StdResult<T, CoreError>;
