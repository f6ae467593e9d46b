// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by every Empath crate.

use thiserror::Error;

/// The primary error type used across Empath collaborators and core operations.
#[derive(Debug, Error)]
pub enum EmpathError {
    /// Configuration errors (invalid TOML, missing model files, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// A frame payload was empty or could not be decoded as an image.
    #[error("frame {index} could not be decoded: {reason}")]
    Decode { index: usize, reason: String },

    /// A frame batch did not contain the required number of frames.
    #[error("expected exactly {expected} frames, got {actual}")]
    InvalidBatchSize { expected: usize, actual: usize },

    /// No frame in the batch yielded a usable face.
    #[error("no faces detected in any of the {frames} frames")]
    BatchRejected { frames: usize },

    /// Client supplied a value outside an accepted domain (e.g. unknown emotion).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The user directory has no record of this username.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// The text-generation collaborator failed while producing a reply.
    #[error("generation service error: {message}")]
    Generation {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The text-generation collaborator failed while producing a summary.
    #[error("summarization service error: {message}")]
    Summarization {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Persistence backend errors (connection, query failure, shape mismatch).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Face detection or emotion inference failed at runtime.
    #[error("inference error: {0}")]
    Inference(String),

    /// Operation timed out after exhausting its retry budget.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EmpathError {
    /// Builds a [`EmpathError::Generation`] without an underlying source.
    pub fn generation(message: impl Into<String>) -> Self {
        EmpathError::Generation {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true when the caller is at fault (bad payload, bad input).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            EmpathError::Decode { .. }
                | EmpathError::InvalidBatchSize { .. }
                | EmpathError::BatchRejected { .. }
                | EmpathError::InvalidInput(_)
                | EmpathError::UserNotFound(_)
        )
    }

    /// Returns true when an outbound collaborator was unavailable.
    pub fn is_service_unavailable(&self) -> bool {
        matches!(
            self,
            EmpathError::Generation { .. }
                | EmpathError::Summarization { .. }
                | EmpathError::Timeout { .. }
        )
    }

    /// Re-tags a generation failure as a summarization failure.
    ///
    /// The summarizer talks to the same collaborator as the controller, so
    /// errors surface as `Generation` until the summarizer claims them.
    pub fn into_summarization(self) -> Self {
        match self {
            EmpathError::Generation { message, source } => {
                EmpathError::Summarization { message, source }
            }
            other => other,
        }
    }
}
