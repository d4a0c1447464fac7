/// Recorder error types
use crate::recorder::RecorderState;
use std::path::PathBuf;
use thiserror::Error;

pub type RecorderResult<T> = Result<T, RecorderError>;

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot {operation} while recorder is {state}")]
    InvalidState {
        operation: &'static str,
        state: RecorderState,
    },

    #[error("Failed to serialize result bundle: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to build XML manifest: {0}")]
    Xml(String),

    #[error("Invalid host event on line {line}: {error}")]
    InvalidEvent {
        line: usize,
        error: serde_json::Error,
    },

    #[error("Failed to read host events: {0}")]
    EventStream(std::io::Error),

    #[error("Remote sink unavailable: {0}")]
    Sink(String),
}

impl RecorderError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a state precondition error
    pub fn invalid_state(operation: &'static str, state: RecorderState) -> Self {
        Self::InvalidState { operation, state }
    }

    /// Create an XML serialization error
    pub fn xml(error: impl ToString) -> Self {
        Self::Xml(error.to_string())
    }
}
