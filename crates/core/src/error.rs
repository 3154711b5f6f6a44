//! Error taxonomy shared by every generator in the crate.
//!
//! Validation errors are raised before any generation work starts. A
//! `GenerationFailure` aborts a call midway and always carries the level pair
//! and the operation that failed. Room under-provisioning and a failed
//! optional skip connection are not errors at all; they surface only through
//! the metadata of the returned artifact.

use thiserror::Error;

use crate::params::ContentType;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid parameter `{field}`: {message}")]
    ParameterValidation { field: &'static str, message: String },

    #[error("missing generator parameter `{key}`")]
    MissingParameter { key: String },

    #[error("generator parameter `{key}` is malformed: {source}")]
    InvalidParameter {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{operation} failed between levels {from_level} and {to_level}: {source}")]
    GenerationFailure {
        operation: &'static str,
        from_level: u32,
        to_level: u32,
        #[source]
        source: AnchorError,
    },

    #[error("generation cancelled before {stage}")]
    Cancelled { stage: String },

    #[error("no generator registered for content type `{0}`")]
    UnknownContentType(ContentType),
}

impl GenerationError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::ParameterValidation { field, message: message.into() }
    }

    /// True for errors detected before any generation work was done.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ParameterValidation { .. }
                | Self::MissingParameter { .. }
                | Self::InvalidParameter { .. }
        )
    }
}

/// Why an inter-level anchor could not be placed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AnchorError {
    #[error("level {level} has no room eligible to host a connection")]
    NoCandidateRooms { level: u32 },

    #[error(
        "no walkable floor tile found in room {room_id} of level {level} after {attempts} attempts"
    )]
    AttemptsExhausted { level: u32, room_id: usize, attempts: usize },

    #[error("level {level} does not exist")]
    MissingLevel { level: u32 },
}
