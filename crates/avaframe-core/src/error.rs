//! Error types shared by the editor session.
//!
//! Decoding and encoding keep their own error enums next to the code that
//! produces them; `EditorError` wraps them for session-level operations.

use thiserror::Error;

use crate::decode::DecodeError;
use crate::encode::EncodeError;

/// Result alias for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

/// Errors surfaced by the editor session.
#[derive(Debug, Error)]
pub enum EditorError {
    /// The caller supplied input the editor refuses to process
    /// (wrong MIME type, oversized upload, malformed URL, bad config).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The image bytes could not be decoded.
    #[error("Failed to decode image: {0}")]
    DecodeFailure(#[from] DecodeError),

    /// An operation was attempted without the state it requires.
    ///
    /// The session swallows these as no-ops; they only reach callers of
    /// lower-level functions such as [`crate::export::compose`].
    #[error("Precondition not met: {0}")]
    PreconditionNotMet(String),

    /// Encoding the composited image failed.
    #[error("Failed to encode image: {0}")]
    Encode(#[from] EncodeError),
}

impl EditorError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::PreconditionNotMet(msg.into())
    }
}
