//! # tensordb-common
//!
//! Common types, errors, and configuration for TensorDB.
//!
//! This crate provides the foundational pieces shared by every TensorDB
//! component:
//!
//! - **Data types**: the closed set of supported element kinds ([`DataType`])
//! - **Shape arithmetic**: element counts and row-major strides
//! - **Errors**: unified error handling with [`TensorDbError`]
//! - **Config**: store configuration ([`StoreConfig`])
//! - **Constants**: file extensions and defaults
//!
//! ## Example
//!
//! ```rust
//! use tensordb_common::{DataType, shape};
//!
//! let dt: DataType = "float32".parse().unwrap();
//! assert_eq!(dt.element_size(), 4);
//! assert_eq!(shape::total_elements(&[2, 3]), 6);
//! assert_eq!(shape::compute_strides(&[2, 3]), vec![3, 1]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod constants;
pub mod dtype;
pub mod error;
pub mod shape;

pub use config::StoreConfig;
pub use dtype::DataType;
pub use error::{TensorDbError, TensorDbResult};
