//! Query execution results.

use serde::Serialize;
use tensordb_core::TensorData;
use tensordb_storage::TensorMetadata;

/// Result of executing one statement.
///
/// CREATE, INSERT, and math operations answer with an exact status string;
/// SELECT with a nested JSON value; GET DATA with envelope sequences (flat
/// for a single tensor, nested per tensor otherwise); LIST with metadata
/// records sorted by name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryOutput {
    /// A status string; callers test these for equality.
    Status(String),
    /// SELECT output: the tensor contents as a nested JSON value.
    Value(serde_json::Value),
    /// Single-tensor GET DATA output, in ascending batch order.
    Batches(Vec<TensorData>),
    /// Multi-tensor GET DATA output, indexed by input order.
    BatchSets(Vec<Vec<TensorData>>),
    /// LIST TENSORS output.
    Listing(Vec<TensorMetadata>),
}

impl QueryOutput {
    /// Returns the status string, if this is a status result.
    #[must_use]
    pub fn as_status(&self) -> Option<&str> {
        match self {
            QueryOutput::Status(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the SELECT value, if this is a value result.
    #[must_use]
    pub const fn as_value(&self) -> Option<&serde_json::Value> {
        match self {
            QueryOutput::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the single-tensor envelope sequence, if present.
    #[must_use]
    pub fn as_batches(&self) -> Option<&[TensorData]> {
        match self {
            QueryOutput::Batches(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the listing, if this is a listing result.
    #[must_use]
    pub fn as_listing(&self) -> Option<&[TensorMetadata]> {
        match self {
            QueryOutput::Listing(l) => Some(l),
            _ => None,
        }
    }
}
