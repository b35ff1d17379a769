//! Error types and handling infrastructure for binfile.
//!
//! This module provides a centralized error handling system using `thiserror` for
//! library error types. The `binfile` binary layers `anyhow` on top for context.
//!
//! ## Design Principles
//!
//! - **Named failures**: Callers get a specific variant, never an opaque string
//! - **Context preservation**: IO failures keep their `std::io::Error` source
//! - **Recoverable vs fatal**: The autodetection cascade inspects errors through
//!   [`BinaryError::is_out_of_memory`] and [`BinaryError::is_not_found`]

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for binfile operations.
#[derive(Error, Debug)]
pub enum BinaryError {
    /// File system related errors (permission denied, short reads, etc.)
    #[error("File operation failed: {message}")]
    FileError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// File not found, propagated from the file-system collaborator
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Memory mapping related errors
    #[error("Memory mapping failed: {message}")]
    MemoryMappingError { message: String },

    /// A byte range that falls outside the accessor's length
    #[error("Range {offset}..{offset}+{length} is out of bounds for length {available}")]
    OutOfBounds {
        offset: u64,
        length: u64,
        available: u64,
    },

    /// A length that cannot be materialized as a single in-memory buffer
    #[error("Length {length} exceeds the in-memory addressable limit")]
    LengthTooLarge { length: u64 },

    /// Invalid argument supplied by the caller
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The accessor does not implement the requested operation
    #[error("Operation not supported: {operation}")]
    Unsupported { operation: String },

    /// The operation would require closing a resource this file does not own
    #[error("Operation not allowed: {message}")]
    NotAllowed { message: String },

    /// The object is not in a state where the operation makes sense
    #[error("Invalid state: {message}")]
    InvalidState { message: String },

    /// Text could not be decoded with the requested encoding
    #[error("Encoding error: {message}")]
    EncodingError { message: String },

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

/// Standard Result type for binfile operations.
pub type Result<T> = std::result::Result<T, BinaryError>;

impl BinaryError {
    /// Create a FileError from an io::Error with additional context
    pub fn file_error(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileError {
            message: message.into(),
            source,
        }
    }

    /// Create a MemoryMappingError with a descriptive message
    pub fn memory_mapping(message: impl Into<String>) -> Self {
        Self::MemoryMappingError {
            message: message.into(),
        }
    }

    pub fn out_of_bounds(offset: u64, length: u64, available: u64) -> Self {
        Self::OutOfBounds {
            offset,
            length,
            available,
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    pub fn not_allowed(message: impl Into<String>) -> Self {
        Self::NotAllowed {
            message: message.into(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    pub fn encoding(message: impl Into<String>) -> Self {
        Self::EncodingError {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Whether this error reports an allocation failure
    ///
    /// The autodetection cascade treats these as soft failures and falls back
    /// to a less memory-hungry backend.
    pub fn is_out_of_memory(&self) -> bool {
        match self {
            Self::LengthTooLarge { .. } => true,
            Self::FileError { source, .. } => source.kind() == std::io::ErrorKind::OutOfMemory,
            _ => false,
        }
    }

    /// Whether this error reports a missing file
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::FileNotFound { .. } => true,
            Self::FileError { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

// Automatic conversion from io::Error to BinaryError
impl From<std::io::Error> for BinaryError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::FileError {
                message: "File not found".to_string(),
                source: err,
            },
            std::io::ErrorKind::PermissionDenied => Self::FileError {
                message: "Permission denied".to_string(),
                source: err,
            },
            std::io::ErrorKind::Unsupported => Self::Unsupported {
                operation: err.to_string(),
            },
            _ => Self::FileError {
                message: "IO operation failed".to_string(),
                source: err,
            },
        }
    }
}
