//! Error types for the mindline application.
//!
//! This module defines custom error types that categorize different failures
//! that can occur while managing journal notes and chat history.

use std::{io, path::PathBuf};

use thiserror::Error;

/// The main error type for the mindline application.
#[derive(Error, Debug)]
pub enum MindlineError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Note was not found when performing an operation.
    #[error("Note not found: {id}")]
    NoteNotFound { id: String },

    /// Saved conversation was not found.
    #[error("Conversation not found: {id}")]
    ConversationNotFound { id: String },

    /// Stored data does not have the expected shape.
    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    /// User supplied input that the form layer rejects.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Directory creation or access failed.
    #[error("Failed to create or access directory: {path}")]
    DirectoryError { path: PathBuf },

    /// file not found
    #[error("File not found: {file_path}")]
    FileNotFound { file_path: String },

    #[error("{message}")]
    EditorError { message: String },

    /// The chat assistant failed to produce a reply.
    #[error("Assistant error: {message}")]
    AssistantError { message: String },

    /// Generic application error with a custom message.
    #[error("{message}")]
    ApplicationError { message: String },
}
