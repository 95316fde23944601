//! Error types for the message format codec.

use std::io;
use thiserror::Error;

/// Result type for codec operations.
pub type FormatResult<T> = Result<T, FormatError>;

/// Errors that can occur while encoding or decoding message format records.
///
/// A failed decode is terminal for that call: no partially decoded value is
/// ever returned, and no retry happens inside this layer. Callers own the
/// quarantine/retry policy (for example re-reading from a replica on
/// [`FormatError::DataCorrupt`]).
#[derive(Debug, Error)]
pub enum FormatError {
    /// CRC mismatch, or a field value no recognized layout can contain.
    ///
    /// Indicates bit damage in the stored bytes. Never auto-corrected.
    #[error("data corrupt: {message}")]
    DataCorrupt {
        /// Description of the corruption.
        message: String,
    },

    /// The leading version tag is not one this build understands.
    ///
    /// Distinct from [`FormatError::DataCorrupt`]: this usually means the
    /// reader is older than the writer, not that bytes were damaged.
    #[error("unknown {record} format version {version}")]
    UnknownFormatVersion {
        /// Record family whose tag was unrecognized.
        record: &'static str,
        /// The unrecognized tag value.
        version: u16,
    },

    /// Caller-contract violation. Nothing is written when this is returned.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the violated contract.
        message: String,
    },

    /// Underlying stream read/write failure, propagated unchanged.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl FormatError {
    /// Creates a data corruption error.
    pub fn data_corrupt(message: impl Into<String>) -> Self {
        Self::DataCorrupt {
            message: message.into(),
        }
    }

    /// Creates an unknown format version error.
    pub fn unknown_version(record: &'static str, version: u16) -> Self {
        Self::UnknownFormatVersion { record, version }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}
