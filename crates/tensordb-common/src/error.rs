//! Unified error types for TensorDB.
//!
//! Every component reports failures through [`TensorDbError`]. The variants
//! map one-to-one onto the semantic failure kinds of the system: query
//! rejection, unknown types, name collisions, missing tensors, on-disk
//! corruption, element-count mismatches, bad slices, type mismatches, I/O
//! failures, and literal parse failures.

use thiserror::Error;

/// Result type used across TensorDB.
pub type TensorDbResult<T> = Result<T, TensorDbError>;

/// The main error type for TensorDB.
#[derive(Debug, Error)]
pub enum TensorDbError {
    /// The parser rejected the query text.
    #[error("malformed query at position {position}: {message}")]
    MalformedQuery {
        /// Byte offset of the offending token in the query string.
        position: usize,
        /// Human-readable description.
        message: String,
    },

    /// Unrecognized data type name.
    #[error("unsupported data type '{name}'")]
    UnknownType {
        /// The offending name.
        name: String,
    },

    /// A tensor with this name already exists.
    #[error("tensor '{name}' already exists")]
    AlreadyExists {
        /// The colliding tensor name.
        name: String,
    },

    /// The referenced tensor has no metadata file.
    #[error("tensor '{name}' not found")]
    NotFound {
        /// The missing tensor name.
        name: String,
    },

    /// On-disk state is inconsistent with metadata.
    #[error("data corruption detected: {message}")]
    Corruption {
        /// Description of the inconsistency.
        message: String,
    },

    /// Provided data size does not match the tensor's shape.
    #[error("{context}: expected {expected}, got {actual}")]
    SizeMismatch {
        /// Size implied by the shape; the context names the unit.
        expected: usize,
        /// Size actually provided, in the same unit.
        actual: usize,
        /// What was being attempted.
        context: String,
    },

    /// Slice bounds outside the tensor, or a rank mismatch.
    #[error("invalid slice: {message}")]
    InvalidSlice {
        /// Description of the violation.
        message: String,
    },

    /// Operand or buffer data types disagree.
    #[error("data type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected type name.
        expected: String,
        /// The actual type name.
        actual: String,
    },

    /// I/O error from the underlying filesystem or mmap.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A literal could not be parsed in the target element type.
    #[error("cannot parse '{literal}' as {target}")]
    ParseLiteral {
        /// The offending literal.
        literal: String,
        /// The target type name.
        target: String,
    },

    /// The byte source is too short for the requested element count.
    #[error("short buffer: need {needed} bytes, have {available}")]
    ShortBuffer {
        /// Bytes required.
        needed: usize,
        /// Bytes available.
        available: usize,
    },

    /// One or more per-tensor GET DATA tasks failed.
    #[error("errors occurred during GET DATA: {}", .messages.join("; "))]
    GetData {
        /// One message per failed tensor, in input order.
        messages: Vec<String>,
    },

    /// Invalid store configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },

    /// Internal error, indicating a bug.
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl TensorDbError {
    /// Creates a corruption error.
    #[must_use]
    pub fn corruption(message: impl Into<String>) -> Self {
        Self::Corruption {
            message: message.into(),
        }
    }

    /// Creates a not-found error for a tensor name.
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Creates an already-exists error for a tensor name.
    #[must_use]
    pub fn already_exists(name: impl Into<String>) -> Self {
        Self::AlreadyExists { name: name.into() }
    }

    /// Creates an invalid-slice error.
    #[must_use]
    pub fn invalid_slice(message: impl Into<String>) -> Self {
        Self::InvalidSlice {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this error means the referenced tensor is absent.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
