/*!
 * Error types for the capsync application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the caption core: packing, rendering, parsing and timeline edits
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CaptionError {
    /// A dialogue line inside the events section is truncated or malformed
    #[error("Malformed dialogue line {line_number}: {line}")]
    Parse {
        /// 1-based line number in the source document
        line_number: usize,
        /// The offending line, as read
        line: String,
    },

    /// A timestamp literal could not be parsed
    #[error("Invalid ASS timestamp format: {0}")]
    Format(String),

    /// The caption style holds a value the document format cannot express
    #[error("Invalid caption style: {0}")]
    InvalidStyle(String),

    /// A single word is longer than the configured line length
    #[error("Word '{word}' is {length} characters long, exceeding max_line_length {max_line_length}")]
    LineOverflow {
        word: String,
        length: usize,
        max_line_length: usize,
    },
}

/// Errors that can occur at the speech-to-text boundary
#[derive(Error, Debug)]
pub enum TranscriptionError {
    /// The source audio does not exist
    #[error("Audio file not found: {}", .0.display())]
    MissingAudio(PathBuf),

    /// The transcription command could not be started or exited unsuccessfully
    #[error("Transcription command failed: {0}")]
    CommandFailed(String),

    /// The transcription command exceeded its time budget
    #[error("Transcription timed out after {0} seconds")]
    Timeout(u64),

    /// The transcript JSON was missing or unreadable
    #[error("Failed to read transcript: {0}")]
    InvalidTranscript(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the caption core
    #[error("Caption error: {0}")]
    Caption(#[from] CaptionError),

    /// Error from transcription
    #[error("Transcription error: {0}")]
    Transcription(#[from] TranscriptionError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
