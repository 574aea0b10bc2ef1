//! Error types for the Moodatlas engine
//!
//! Per-record payload failures are not errors: the normalizer degrades them
//! to `PayloadState::Malformed` and the batch proceeds. These variants cover
//! batch-level concerns only (input decoding, output encoding).

use thiserror::Error;

/// Errors that can occur at the engine boundary
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
