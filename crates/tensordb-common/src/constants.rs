//! System-wide constants.

use crate::dtype::DataType;

/// File extension of tensor metadata files.
pub const META_EXTENSION: &str = "meta";

/// File extension of tensor data files.
pub const DATA_EXTENSION: &str = "data";

/// Data type used when `CREATE TENSOR` omits the `TYPE` clause.
pub const DEFAULT_DATA_TYPE: DataType = DataType::Float64;
