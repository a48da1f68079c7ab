use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the textfold library.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// IO error with context about the file path.
    #[error("IO error accessing '{path}': {message}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Configuration validation error.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Detailed error message
        message: String,
    },

    /// Scan root missing or not a directory.
    #[error("Scan root '{path}' does not exist or is not a directory")]
    RootNotFound {
        /// The offending scan root
        path: PathBuf,
    },

    /// Output location cannot be written to.
    #[error("Output location '{path}' is not writable: {message}")]
    OutputUnwritable {
        /// Output file or directory path
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// File exceeds the configured size ceiling.
    #[error("File '{path}' is too large: {size} bytes exceeds limit of {limit} bytes")]
    TooLarge {
        /// Path to the oversized file
        path: PathBuf,
        /// Actual size in bytes
        size: u64,
        /// Maximum allowed bytes
        limit: u64,
    },

    /// No candidate encoding could decode the file.
    #[error("File '{path}' could not be decoded as text. File may be binary or use an unsupported encoding.")]
    Undecodable {
        /// Path to the undecodable file
        path: PathBuf,
    },
}

impl Error {
    /// Creates an IO error with path context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a root-not-found error.
    #[must_use]
    pub fn root_not_found(path: impl Into<PathBuf>) -> Self {
        Self::RootNotFound { path: path.into() }
    }

    /// Creates an output-unwritable error.
    #[must_use]
    pub fn output_unwritable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OutputUnwritable {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Creates a too-large error.
    #[must_use]
    pub fn too_large(path: impl Into<PathBuf>, size: u64, limit: u64) -> Self {
        Self::TooLarge {
            path: path.into(),
            size,
            limit,
        }
    }

    /// Creates an undecodable error.
    #[must_use]
    pub fn undecodable(path: impl Into<PathBuf>) -> Self {
        Self::Undecodable { path: path.into() }
    }

    /// Returns true if this is an IO error.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// Returns true if this error is tolerated per file rather than
    /// aborting the run.
    #[must_use]
    pub const fn is_per_file(&self) -> bool {
        matches!(self, Self::TooLarge { .. } | Self::Undecodable { .. })
    }
}
