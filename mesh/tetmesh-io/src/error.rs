//! Error types for mesh I/O operations.

use std::path::PathBuf;
use thiserror::Error;
use tetmesh_types::MeshError;

/// Result type for mesh I/O operations.
pub type IoResult<T> = Result<T, IoError>;

/// Errors that can occur during mesh I/O operations.
#[derive(Debug, Error)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// The unified-format header names a version other than 2.2.
    #[error("unsupported mesh format version {found}, only 2.2 is supported")]
    VersionMismatch {
        /// Version token found in the header.
        found: String,
    },

    /// A split-format element was decoded without a valid element arity.
    #[error("missing decoder configuration: {message}")]
    MissingConfig {
        /// What was missing or invalid.
        message: String,
    },

    /// A data line does not tokenize into the fields its section expects.
    #[error("malformed record at line {line}: {message}")]
    MalformedRecord {
        /// 1-based line number, or 0 when decoded outside a file.
        line: usize,
        /// Description of what was wrong.
        message: String,
    },

    /// A required section never appeared in a unified file.
    #[error("missing required section {name}")]
    MissingSection {
        /// Start marker of the missing section.
        name: &'static str,
    },

    /// A unified file ended inside a section.
    #[error("section {name} is not closed before end of file")]
    UnterminatedSection {
        /// Start marker of the open section.
        name: &'static str,
    },

    /// The parsed mesh failed validation or normalization.
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IoError {
    /// Create a `MalformedRecord` error not yet tied to a line.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            line: 0,
            message: message.into(),
        }
    }

    /// Attach a 1-based line number to a `MalformedRecord` error.
    ///
    /// Other variants are returned unchanged.
    #[must_use]
    pub fn at_line(self, line: usize) -> Self {
        match self {
            Self::MalformedRecord { message, .. } => Self::MalformedRecord { line, message },
            other => other,
        }
    }

    /// Prefix a `MalformedRecord` message with the file it came from.
    #[must_use]
    pub fn in_file(self, file: &str) -> Self {
        match self {
            Self::MalformedRecord { line, message } => Self::MalformedRecord {
                line,
                message: format!("{file}: {message}"),
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_and_file_context_compose() {
        let err = IoError::malformed("expected 4 fields")
            .at_line(12)
            .in_file("box.ele");
        assert_eq!(
            err.to_string(),
            "malformed record at line 12: box.ele: expected 4 fields"
        );
    }

    #[test]
    fn context_leaves_other_variants_alone() {
        let err = IoError::VersionMismatch {
            found: "4.1".into(),
        }
        .at_line(3);
        assert!(matches!(err, IoError::VersionMismatch { .. }));
    }
}
