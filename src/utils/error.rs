//! Error types for the image reducer.
//!
//! Provides a hierarchy of error types using `thiserror` for ergonomic error handling.
//! Validation failures never touch session state; encoding failures are fatal for
//! the attempt in progress.

use std::io;
use thiserror::Error;
use serde::Serialize;

use crate::core::View;

/// Validation errors raised before any search starts.
///
/// Display strings are the advisories shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum ValidationError {
    /// Declared MIME type is not in the allow-list
    #[error("Unsupported file type. Please select a PNG, JPG, or WEBP file.")]
    UnsupportedFileType(String),
    /// Target size is missing, non-numeric or not positive
    #[error("Please enter a valid target size.")]
    InvalidTargetSize(String),
    /// Target size would not shrink the image
    #[error("Target size must be smaller than the original file size.")]
    TargetNotSmaller {
        target_bytes: u64,
        original_bytes: u64,
    },
    /// Invalid settings error
    #[error("Settings error: {0}")]
    Settings(String),
}

/// Main error type for the reducer.
///
/// All errors in the library are converted to this type before being
/// returned to the caller.
#[derive(Error, Debug, Serialize)]
pub enum ReducerError {
    /// Request or input validation failed
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The encoder capability failed; the attempt cannot continue
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Input bytes could not be decoded into pixels
    #[error("Decode error: {0}")]
    Decode(String),

    /// File IO error
    #[error("IO error: {0}")]
    IO(String),

    /// Unsupported or invalid image format
    #[error("Format error: {0}")]
    Format(String),

    /// Action not permitted from the current view
    #[error("Cannot {action} while in the {from} view")]
    InvalidTransition { from: View, action: &'static str },

    /// Configuration could not be loaded or is out of range
    #[error("Config error: {0}")]
    Config(String),
}

/// Convenience result type for reducer operations.
pub type ReducerResult<T> = Result<T, ReducerError>;

// Helper methods for error creation
impl ReducerError {
    pub fn encoding<T: Into<String>>(msg: T) -> Self {
        Self::Encoding(msg.into())
    }

    pub fn decode<T: Into<String>>(msg: T) -> Self {
        Self::Decode(msg.into())
    }

    pub fn format<T: Into<String>>(msg: T) -> Self {
        Self::Format(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_transition(from: View, action: &'static str) -> Self {
        Self::InvalidTransition { from, action }
    }

    /// True for errors the user recovers from on the same screen.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// True when the attempt is over and the flow restarts from Upload.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Encoding(_))
    }
}

// Helper methods for validation error creation
impl ValidationError {
    pub fn unsupported_file_type(mime: impl Into<String>) -> Self {
        Self::UnsupportedFileType(mime.into())
    }

    pub fn invalid_target_size(input: impl Into<String>) -> Self {
        Self::InvalidTargetSize(input.into())
    }

    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }
}

// Convert std::io::Error to ReducerError
impl From<io::Error> for ReducerError {
    fn from(err: io::Error) -> Self {
        Self::IO(err.to_string())
    }
}

impl From<serde_json::Error> for ReducerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<image::ImageError> for ReducerError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Decoding(e) => Self::Decode(e.to_string()),
            image::ImageError::Unsupported(e) => Self::Format(e.to_string()),
            image::ImageError::IoError(e) => Self::IO(e.to_string()),
            other => Self::Encoding(other.to_string()),
        }
    }
}
