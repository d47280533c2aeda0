use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SiftError {
    #[error("failed to load {}: {message}", path.display())]
    Load { path: PathBuf, message: String },
    #[error("column not found: {0}")]
    ColumnNotFound(String),
    #[error("join key {key:?} matches {matches} rows")]
    AmbiguousJoin { key: String, matches: usize },
    #[error("invalid pipeline config: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Message(String),
}

impl SiftError {
    /// Build a load error for `path` from any displayable cause.
    pub fn load(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        Self::Load {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SiftError>;
