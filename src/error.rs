//! Error types for evidence-access operations.
//!
//! All failures surfaced by this crate are translated into [`EvidenceError`]
//! at the module boundaries: native diagnostics from the filesystem engine
//! are carried as plain text, never as engine-specific types or handles.

use std::io;
use thiserror::Error;

/// Result type alias for evidence-access operations.
pub type Result<T> = std::result::Result<T, EvidenceError>;

/// Errors that can occur while accessing evidence sources.
#[derive(Error, Debug)]
pub enum EvidenceError {
    /// I/O error from an underlying byte source.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The filesystem engine failed to open the image.
    #[error("Unable to open image: {detail}")]
    ImageOpen {
        /// Diagnostic text reported by the engine.
        detail: String,
    },

    /// The filesystem engine failed to open a filesystem inside the image.
    #[error("Unable to open filesystem at offset {offset:#x}: {detail}")]
    FilesystemOpen {
        /// Partition offset the open was attempted at.
        offset: u64,
        /// Diagnostic text reported by the engine.
        detail: String,
    },

    /// A read past the declared size of a sized byte source.
    #[error("Read out of range: offset {offset:#x} + length {length} exceeds size {size}")]
    OutOfRange {
        /// Requested start offset.
        offset: u64,
        /// Requested length in bytes.
        length: usize,
        /// Declared size of the source.
        size: u64,
    },

    /// A typed accessor was called on registry data with a different tag.
    #[error("Registry type mismatch: expected {expected}, value is tagged {actual}")]
    TypeMismatch {
        /// Type the accessor requires.
        expected: &'static str,
        /// Type the value actually carries.
        actual: String,
    },

    /// Operation is not supported by this backing (e.g. renaming a
    /// hive-backed registry value, which is a read-only view).
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Operation is not supported by this byte source (e.g. writing
    /// through a null or read-only writer).
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// A named entry or node could not be found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid UTF-16 string payload.
    #[error("Invalid UTF-16 data in {context}")]
    InvalidUtf16 {
        /// What was being decoded, for triage.
        context: String,
    },

    /// Payload shorter than the decoded type requires.
    #[error("Truncated data: expected {expected} bytes, got {actual} bytes")]
    TruncatedData {
        /// Bytes the decoded type requires.
        expected: usize,
        /// Bytes actually present.
        actual: usize,
    },
}

impl EvidenceError {
    /// Creates an image-open error carrying the engine's diagnostic text.
    pub fn image_open(detail: impl Into<String>) -> Self {
        Self::ImageOpen {
            detail: detail.into(),
        }
    }

    /// Creates a filesystem-open error carrying the engine's diagnostic text.
    pub fn filesystem_open(offset: u64, detail: impl Into<String>) -> Self {
        Self::FilesystemOpen {
            offset,
            detail: detail.into(),
        }
    }

    /// Creates an out-of-range error for a sized source.
    pub fn out_of_range(offset: u64, length: usize, size: u64) -> Self {
        Self::OutOfRange {
            offset,
            length,
            size,
        }
    }

    /// Creates a type-mismatch error for a registry data accessor.
    pub fn type_mismatch(expected: &'static str, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected,
            actual: actual.into(),
        }
    }

    /// Creates a not-found error with context about what was searched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use evidence_access::error::EvidenceError;
    /// let err = EvidenceError::not_found("entry", "note.txt");
    /// ```
    pub fn not_found(item_type: &str, name: &str) -> Self {
        Self::NotFound(format!("{} '{}'", item_type, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_diagnostics() {
        let err = EvidenceError::image_open("unrecognized sector size");
        assert!(err.to_string().contains("unrecognized sector size"));

        let err = EvidenceError::filesystem_open(0x10000, "no filesystem signature");
        let msg = err.to_string();
        assert!(msg.contains("0x10000"));
        assert!(msg.contains("no filesystem signature"));
    }

    #[test]
    fn test_out_of_range_fields() {
        let err = EvidenceError::out_of_range(8, 16, 12);
        match err {
            EvidenceError::OutOfRange {
                offset,
                length,
                size,
            } => {
                assert_eq!(offset, 8);
                assert_eq!(length, 16);
                assert_eq!(size, 12);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
