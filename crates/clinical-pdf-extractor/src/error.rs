//! Error types for the extraction pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for extractor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Extractor errors
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied parameter violates its precondition
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Path does not exist or cannot be opened
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A directory was given where a file is required
    #[error("Expected a file but found a directory: {}", .0.display())]
    NotAFile(PathBuf),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Text extraction backend failure
    #[error("Extraction failed with backend '{backend}': {message}")]
    Extraction { backend: String, message: String },

    /// External tool failure (spawn or non-zero exit)
    #[error("External tool '{tool}' failed: {message}")]
    ExternalTool { tool: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create an extraction error
    pub fn extraction(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extraction {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Create an external tool error
    pub fn external_tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalTool {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}
