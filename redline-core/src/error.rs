//! Error types for Redline review sessions

use thiserror::Error;

use crate::session::PlaceStage;
use crate::target::DiffTarget;

/// Result type alias for Redline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Redline operations
///
/// Every placement failure carries the offending [`DiffTarget`] so callers
/// can report exactly which annotation needs manual attention.
#[derive(Error, Debug)]
pub enum Error {
    /// The target did not resolve to exactly one anchor in the rendered diff
    #[error("target {target} not found in rendered diff: {detail}")]
    TargetNotFound {
        /// The target that failed to resolve
        target: DiffTarget,
        /// What the locator saw instead (missing file, ambiguous match, ...)
        detail: String,
    },

    /// No comment control could be opened for the target line
    #[error("no comment control found for {target}; the diff view markup may have changed")]
    AffordanceNotFound {
        /// The target whose comment control could not be opened
        target: DiffTarget,
    },

    /// No open, editable comment input matches the target
    #[error("comment editor not ready for {target}")]
    EditorNotReady {
        /// The target whose editor was expected to be open
        target: DiffTarget,
    },

    /// A readback confirmation did not arrive within the configured timeout
    #[error("timed out waiting for {stage} confirmation on {target}")]
    ConfirmationTimeout {
        /// The target being placed when the timeout elapsed
        target: DiffTarget,
        /// The placement stage that was awaiting confirmation
        stage: PlaceStage,
    },

    /// Finalize was called on a session with no open review
    #[error("no open review session to finalize")]
    NoOpenSession,

    /// The final review submission never confirmed
    #[error("timed out waiting for review submission to confirm")]
    SubmissionTimeout,

    /// Browser driver / surface transport error
    #[error("driver error: {0}")]
    Driver(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// The target attached to this error, if it is a placement failure
    pub fn target(&self) -> Option<&DiffTarget> {
        match self {
            Error::TargetNotFound { target, .. }
            | Error::AffordanceNotFound { target }
            | Error::EditorNotReady { target }
            | Error::ConfirmationTimeout { target, .. } => Some(target),
            _ => None,
        }
    }
}
