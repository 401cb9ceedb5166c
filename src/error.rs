//! Error types for the vulcanizer.
//!
//! Every failure that aborts a build carries the path it happened on, so the
//! binary can report "failed while importing <path>" or "failed to write
//! <path>".

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while flattening and writing a document.
#[derive(Debug, Error)]
pub enum VulcanizeError {
    /// A file could not be read or canonicalized
    #[error("failed while importing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The output or a sidecar file could not be written
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A file could not be decoded as markup
    #[error("failed while parsing {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// An exclusion pattern is not a valid regular expression
    #[error("invalid exclusion pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Scripts could not be separated because the document has no body
    #[error("document has no <body> to attach separated scripts to")]
    MissingBody,
}

/// Result type alias for vulcanizer operations.
pub type VulcanizeResult<T> = Result<T, VulcanizeError>;

impl VulcanizeError {
    /// Wrap an I/O error with the path that caused it.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn write(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Write {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a parse error for the given file.
    pub fn parse(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// The file the error is attributed to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            VulcanizeError::Io { path, .. }
            | VulcanizeError::Write { path, .. }
            | VulcanizeError::Parse { path, .. } => Some(path),
            VulcanizeError::Pattern(_) | VulcanizeError::MissingBody => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display_names_path() {
        let err = VulcanizeError::io(
            "components/x-foo.html",
            io::Error::new(io::ErrorKind::NotFound, "no such file"),
        );
        assert_eq!(
            err.to_string(),
            "failed while importing components/x-foo.html: no such file"
        );
        assert_eq!(err.path(), Some(Path::new("components/x-foo.html")));
    }

    #[test]
    fn test_write_error_display_names_path() {
        let err = VulcanizeError::write(
            "dist/out.html",
            io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        );
        assert_eq!(err.to_string(), "failed to write dist/out.html: permission denied");
        assert_eq!(err.path(), Some(Path::new("dist/out.html")));
    }

    #[test]
    fn test_parse_error_display() {
        let err = VulcanizeError::parse("index.html", "stream did not contain valid UTF-8");
        assert_eq!(
            err.to_string(),
            "failed while parsing index.html: stream did not contain valid UTF-8"
        );
    }

    #[test]
    fn test_missing_body_has_no_path() {
        assert!(VulcanizeError::MissingBody.path().is_none());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<VulcanizeError>();
    }
}
