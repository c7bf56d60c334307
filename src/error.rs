//! Error types for the PowerPoint MCP server.

use thiserror::Error;

/// Errors that can occur in the PowerPoint MCP server.
#[derive(Debug, Error)]
pub enum PowerPointServerError {
    /// No filename left after sanitization.
    #[error("Filename is required")]
    FilenameRequired,

    /// The named presentation does not exist in the storage directory.
    #[error("Presentation '{name}' not found in {dir}")]
    PresentationNotFound { name: String, dir: String },

    /// The storage directory could not be created.
    #[error("Could not create directory {path}: {source}")]
    DirectoryCreate {
        path: String,
        source: std::io::Error,
    },

    /// Slide layout index outside the built-in template list.
    #[error("Invalid slide layout index: {0} (valid range: 0-1)")]
    InvalidLayout(usize),

    /// The file is absent, truncated, or not a presentation package.
    #[error("Not a readable presentation file: {0}")]
    PackageInvalid(String),

    /// ZIP container error.
    #[error("Package error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML error in a package part.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error (unexpected state).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PowerPointServerError {
    /// Create an internal error with a message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Result type for PowerPoint MCP server operations.
pub type Result<T> = std::result::Result<T, PowerPointServerError>;
