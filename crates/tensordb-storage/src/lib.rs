//! # tensordb-storage
//!
//! The on-disk storage engine for TensorDB.
//!
//! Each tensor `N` lives in a data directory as two files: `N.meta`, a
//! small UTF-8 `key:value` document, and `N.data`, the raw little-endian
//! elements with no header or padding. Reads are served through
//! memory-mapped views of the data files; writes go through a map-copy-
//! flush cycle. An in-memory secondary index over `(data type, rank)` is
//! rebuilt from the metadata files every time a store is opened.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod index;
pub mod mapped;
pub mod metadata;

pub use engine::Storage;
pub use index::{IndexFilter, MetadataIndex};
pub use mapped::MappedTensorFile;
pub use metadata::TensorMetadata;
