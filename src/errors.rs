//! Error types for the ideaboard application.
//!
//! This module defines custom error types that categorize the failures
//! that can occur while managing ideas and moving them in and out of CSV.

use std::io;

use thiserror::Error;

/// The main error type for the ideaboard application.
#[derive(Error, Debug)]
pub enum PlanError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to JSON serialization (configuration, JSON listings).
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The CSV header lacks one or more required columns.
    #[error("Required columns not found: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    /// A data row failed the required-field checks during import.
    #[error("Row {row}: {reason}")]
    RowValidation { row: usize, reason: String },

    /// The input could not be read as delimited text at all.
    #[error("Invalid CSV file: {detail}")]
    Parse { detail: String },

    /// Export could not be serialized or written.
    #[error("Failed to export ideas to CSV: {message}")]
    ExportFailed { message: String },

    /// Idea was not found when performing an operation.
    #[error("Idea not found: {id}")]
    IdeaNotFound { id: String },

    /// Idea with the same ID already exists.
    #[error("Idea already exists: {id}")]
    IdeaAlreadyExists { id: String },

    /// Invalid user-supplied value or output format.
    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// file not found
    #[error("File not found: {file_path}")]
    FileNotFound { file_path: String },

    #[error("{message}")]
    EditorError { message: String },

    /// Generic application error with a custom message.
    #[error("{message}")]
    ApplicationError { message: String },
}
