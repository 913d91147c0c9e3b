//! Application-wide error types.
//!
//! Library modules return [`Error`] via `thiserror`, while the CLI and
//! `main` use `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: Top-level error enum for indexing, export and serving
//! - Module-specific errors (e.g., [`crate::config::ConfigError`]) for detailed handling
//! - "No library" is not an error: loaders return `Option` instead
//!
//! # Example
//!
//! ```ignore
//! use music_sync::error::{Result, ResultExt};
//!
//! fn export(paths: &LibraryPaths, library: &Library) -> Result<()> {
//!     let file = File::create(paths.itunes_xml()).with_context("creating iTunes XML")?;
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error (scanning, persistence, export)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Library document encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Metadata extraction failed for a single file
    #[error("Metadata error for {path}: {message}")]
    Metadata { path: PathBuf, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Sync server lifecycle error
    #[error("Server error: {0}")]
    Server(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a metadata error.
    pub fn metadata(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Metadata {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a server error.
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server(message.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, serde_json::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Json(e).context(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("invalid bind address \"nowhere\"");
        assert_eq!(
            err.to_string(),
            "Configuration error: invalid bind address \"nowhere\""
        );
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::server("already listening").context("starting sync server");
        let msg = err.to_string();
        assert!(msg.contains("starting sync server"));
        assert!(msg.contains("already listening"));
    }

    #[test]
    fn test_metadata_error() {
        let err = Error::metadata("/music/song.mp3", "unsupported format");
        let msg = err.to_string();
        assert!(msg.contains("song.mp3"));
        assert!(msg.contains("unsupported format"));
    }

    #[test]
    fn test_io_result_ext() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let err = result.with_context("writing library.json").unwrap_err();
        assert!(err.to_string().contains("writing library.json"));
        assert!(matches!(err, Error::WithContext { .. }));
    }
}
