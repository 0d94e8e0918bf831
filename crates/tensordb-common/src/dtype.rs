//! Supported element data types.
//!
//! TensorDB stores elements of exactly four numeric kinds. The canonical
//! lowercase names (`float32`, `float64`, `int32`, `int64`) are what appears
//! in metadata files and in the query language.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TensorDbError;

/// The element type of a tensor.
///
/// Each kind has a fixed element size in bytes and a canonical lowercase
/// name used in metadata files and queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// 32-bit IEEE-754 float (`float32`).
    Float32,
    /// 64-bit IEEE-754 float (`float64`).
    Float64,
    /// 32-bit signed integer (`int32`).
    Int32,
    /// 64-bit signed integer (`int64`).
    Int64,
}

impl DataType {
    /// All supported data types, in declaration order.
    pub const ALL: [DataType; 4] = [
        DataType::Float32,
        DataType::Float64,
        DataType::Int32,
        DataType::Int64,
    ];

    /// Returns the size in bytes of one element of this type.
    #[inline]
    #[must_use]
    pub const fn element_size(self) -> usize {
        match self {
            DataType::Float32 | DataType::Int32 => 4,
            DataType::Float64 | DataType::Int64 => 8,
        }
    }

    /// Returns the canonical lowercase name of this type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
            DataType::Int32 => "int32",
            DataType::Int64 => "int64",
        }
    }

    /// Returns true if this is a floating-point kind.
    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, DataType::Float32 | DataType::Float64)
    }
}

impl FromStr for DataType {
    type Err = TensorDbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "float32" => Ok(DataType::Float32),
            "float64" => Ok(DataType::Float64),
            "int32" => Ok(DataType::Int32),
            "int64" => Ok(DataType::Int64),
            other => Err(TensorDbError::UnknownType {
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
