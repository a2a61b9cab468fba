// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrainError {
    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Evidence collision on {id}: {existing} already indexed, refused {incoming}")]
    EvidenceCollision {
        id: String,
        existing: String,
        incoming: String,
    },
}

pub type Result<T> = std::result::Result<T, BrainError>;

impl BrainError {
    /// Wraps an I/O error with the path that caused it.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: path.into(),
        }
    }
}

// Allow `?` on std::io::Error by converting to BrainError::Io with unknown path.
impl From<std::io::Error> for BrainError {
    fn from(source: std::io::Error) -> Self {
        BrainError::Io {
            source,
            path: PathBuf::from("<unknown>"),
        }
    }
}
