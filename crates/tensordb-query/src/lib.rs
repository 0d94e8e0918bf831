//! # tensordb-query
//!
//! The query surface of TensorDB: a parser for the textual query language
//! and the executor that runs parsed statements against a store.
//!
//! ## The language
//!
//! ```text
//! CREATE TENSOR <name> [<d0>,<d1>,...] [TYPE <kind>]
//! INSERT INTO <name> VALUES ( <literal>, ... )
//! SELECT <display> FROM <name> [ [<lo>:<hi>, ...] ]
//! GET DATA FROM <name>[ [ranges] ] [, ...] [BATCH <n>]
//! LIST TENSORS [WHERE DATATYPE = '<kind>' [AND NUM_DIMENSIONS = <n>]]
//! ADD TENSOR <a> WITH TENSOR <b> INTO <out>
//! ADD SCALAR <literal> TO TENSOR <a> INTO <out>
//! ```
//!
//! Keywords are case-insensitive; tensor names are case-sensitive
//! identifiers.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tensordb_common::StoreConfig;
//! use tensordb_query::Executor;
//! use tensordb_storage::Storage;
//!
//! # async fn run() -> tensordb_common::TensorDbResult<()> {
//! let storage = Arc::new(Storage::open(StoreConfig::with_data_dir("./data"))?);
//! let executor = Executor::new(storage);
//! executor.execute_query("CREATE TENSOR t 2,3 TYPE float32").await?;
//! executor.execute_query("INSERT INTO t VALUES (1, 2, 3, 4, 5, 6)").await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod executor;
pub mod parser;

pub use executor::output::QueryOutput;
pub use executor::{Executor, MmapGuard, MmapView};
pub use parser::statement::{
    GetDataStatement, InsertSource, MathStatement, Statement, TensorSelection,
};
pub use parser::{ParseError, Parser};
