//! Error types for project packaging operations.

use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `PackError`.
pub type Result<T> = std::result::Result<T, PackError>;

/// Errors that can occur while gathering, archiving or listing project files.
#[derive(Error, Debug)]
pub enum PackError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O operation on a specific file or directory failed.
    #[error("cannot access {path}: {source}")]
    FileAccess {
        /// The path being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Project directory does not exist.
    #[error("project directory not found: {path}")]
    ProjectNotFound {
        /// The missing project path.
        path: PathBuf,
    },

    /// Project path exists but is not a directory.
    #[error("project path is not a directory: {path}")]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// Exclusion directory does not name a subdirectory of the project.
    #[error("invalid exclusion directory '{exclude}': {reason}")]
    InvalidExclusion {
        /// The exclusion as configured (relative to the project root).
        exclude: PathBuf,
        /// Why the exclusion was rejected.
        reason: String,
    },

    /// File extension is empty or blank.
    #[error("invalid file extension: {extension:?}")]
    InvalidExtension {
        /// The extension as configured.
        extension: String,
    },

    /// A file handed to the archiver or renderer is not under the project root.
    #[error("path {path} is not under project root {root}")]
    OutsideProject {
        /// The file path.
        path: PathBuf,
        /// The project root.
        root: PathBuf,
    },

    /// Compression level is outside 1-9.
    #[error("invalid compression level: {level} (expected 1-9)")]
    InvalidCompressionLevel {
        /// The rejected level.
        level: u8,
    },

    /// Project configuration file could not be parsed or written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Background packaging task did not complete.
    #[error("packaging task failed: {reason}")]
    TaskFailed {
        /// Why the task failed.
        reason: String,
    },
}

impl PackError {
    /// Wraps an I/O error with the path that caused it.
    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if this error is caused by invalid project configuration
    /// rather than by the filesystem during a run.
    ///
    /// # Examples
    ///
    /// ```
    /// use projpack_core::PackError;
    ///
    /// let err = PackError::InvalidExtension {
    ///     extension: "  ".into(),
    /// };
    /// assert!(err.is_configuration_error());
    ///
    /// let err = PackError::Io(std::io::Error::other("disk full"));
    /// assert!(!err.is_configuration_error());
    /// ```
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::ProjectNotFound { .. }
                | Self::NotADirectory { .. }
                | Self::InvalidExclusion { .. }
                | Self::InvalidExtension { .. }
                | Self::InvalidCompressionLevel { .. }
        )
    }

    /// Returns the path this error refers to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::FileAccess { path, .. }
            | Self::ProjectNotFound { path }
            | Self::NotADirectory { path }
            | Self::OutsideProject { path, .. } => Some(path),
            Self::InvalidExclusion { exclude, .. } => Some(exclude),
            _ => None,
        }
    }
}
