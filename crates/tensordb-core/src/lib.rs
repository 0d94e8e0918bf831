//! # tensordb-core
//!
//! Tensor values for TensorDB: the typed element buffer, shape-aware
//! construction, rectangular slicing, batched materialization for
//! inference, nested formatting, and element-wise math.
//!
//! The element type is carried at runtime by a closed tagged enum
//! ([`TypedBuffer`]); every operation branches once on the kind and runs a
//! monomorphic loop inside.
//!
//! ## Example
//!
//! ```rust
//! use tensordb_common::DataType;
//! use tensordb_core::{Tensor, TypedBuffer};
//!
//! let mut t = Tensor::new("t", vec![2, 3], DataType::Float64);
//! t.set_data(TypedBuffer::F64(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])).unwrap();
//! let row = t.get_slice(&[(1, 2), (0, 3)]).unwrap();
//! assert_eq!(row, TypedBuffer::F64(vec![4.0, 5.0, 6.0]));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod buffer;
pub mod format;
pub mod ops;
pub mod tensor;

pub use batch::{BatchInfo, TensorData};
pub use buffer::TypedBuffer;
pub use tensor::Tensor;
