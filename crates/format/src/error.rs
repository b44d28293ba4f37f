use std::path::PathBuf;

use phylevo_sim::errors::{AlignmentError, ConfigError, TreeError};
use thiserror::Error;

/// Error type for reading and writing phylevo files.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid species count line: '{0}'")]
    BadSpeciesCount(String),
    #[error("Line {line}: {reason}")]
    BadLine { line: usize, reason: String },
    #[error("Expected {expected} sequences but found {found}")]
    MissingSequences { expected: usize, found: usize },
    #[error("Invalid {ty} value '{value}' for key '{key}'")]
    InvalidValue {
        key: String,
        value: String,
        ty: &'static str,
    },
    #[error("Missing required configuration key '{0}'")]
    MissingKey(&'static str),
    #[error(transparent)]
    Alignment(#[from] AlignmentError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FormatError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn bad_line(line: usize, reason: impl Into<String>) -> Self {
        Self::BadLine {
            line,
            reason: reason.into(),
        }
    }
}
