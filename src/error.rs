//! Error types for chain-viewer.
//!
//! Only malformed input, configuration problems, I/O and rendering-surface
//! failures surface as errors. Structural anomalies inside a well-formed
//! mapping (missing root, dangling children, absent fields) are absorbed by
//! the traversal engine and never reach this type.

use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for chain-viewer operations.
#[derive(Error, Debug)]
pub enum ViewerError {
    /// The input document is not valid JSON or does not match the node shape.
    #[error("Failed to parse conversation document: {message}")]
    ParseError {
        /// Human-readable error message.
        message: String,
        /// Underlying serde_json error, if available.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The document parsed but carries no usable `mapping`.
    #[error("Invalid conversation format: {reason}")]
    InvalidDocument {
        /// Why the document was rejected.
        reason: String,
    },

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// A node id passed by the caller is not part of the mapping.
    #[error("Node not found: {node_id}")]
    NodeNotFound {
        /// The unknown node id.
        node_id: String,
    },

    /// The graph rendering surface failed to mount.
    #[error("Graph surface error: {message}")]
    SurfaceError {
        /// Human-readable error message.
        message: String,
        /// Underlying error, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Human-readable error message.
        message: String,
    },

    /// Unsupported operation or platform feature.
    #[error("Unsupported: {feature}")]
    Unsupported {
        /// Name of the unsupported feature.
        feature: String,
    },

    /// I/O error.
    #[error("I/O error: {context}")]
    IoError {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Serialization error while writing a projection.
    #[error("Serialization error: {context}")]
    SerializationError {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying serde_json error.
        #[source]
        source: serde_json::Error,
    },
}

impl ViewerError {
    /// Create a new parse error.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new parse error with source.
    #[must_use]
    pub fn parse_with_source(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::ParseError {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a new invalid-document error.
    #[must_use]
    pub fn invalid_document(reason: impl Into<String>) -> Self {
        Self::InvalidDocument {
            reason: reason.into(),
        }
    }

    /// Create a new I/O error with context.
    #[must_use]
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoError {
            context: context.into(),
            source,
        }
    }

    /// Create a new surface error.
    #[must_use]
    pub fn surface(message: impl Into<String>) -> Self {
        Self::SurfaceError {
            message: message.into(),
            source: None,
        }
    }

    /// Get the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::ParseError { .. } | Self::InvalidDocument { .. } => exit_codes::EXIT_PARSE_ERROR,
            Self::FileNotFound { .. } | Self::NodeNotFound { .. } => exit_codes::EXIT_NOT_FOUND,
            Self::InvalidConfig { .. } => exit_codes::EXIT_CONFIG_ERROR,
            Self::SurfaceError { .. } | Self::SerializationError { .. } => {
                exit_codes::EXIT_RENDER_ERROR
            }
            Self::IoError { .. } => exit_codes::EXIT_IO_ERROR,
            Self::Unsupported { .. } => exit_codes::EXIT_GENERAL_ERROR,
        }
    }

    /// Whether the error came from the input document rather than the environment.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(self, Self::ParseError { .. } | Self::InvalidDocument { .. })
    }
}

/// Result type alias for chain-viewer operations.
pub type Result<T> = std::result::Result<T, ViewerError>;

impl From<std::io::Error> for ViewerError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            context: "I/O operation failed".to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for ViewerError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            context: "JSON operation failed".to_string(),
            source: err,
        }
    }
}

/// Exit codes for CLI operations.
pub mod exit_codes {
    /// Operation completed successfully.
    pub const EXIT_SUCCESS: i32 = 0;
    /// General/unspecified error.
    pub const EXIT_GENERAL_ERROR: i32 = 1;
    /// Input document could not be parsed or validated.
    pub const EXIT_PARSE_ERROR: i32 = 2;
    /// Specified file or node not found.
    pub const EXIT_NOT_FOUND: i32 = 3;
    /// Invalid configuration.
    pub const EXIT_CONFIG_ERROR: i32 = 5;
    /// A projection could not be rendered or written.
    pub const EXIT_RENDER_ERROR: i32 = 6;
    /// I/O error (BSD standard).
    pub const EXIT_IO_ERROR: i32 = 74;
}
