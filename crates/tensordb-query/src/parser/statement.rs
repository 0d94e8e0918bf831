//! Parsed statements.
//!
//! The parser lowers query text into these structures; the executor
//! consumes them. The raw-bytes insert channel is not reachable from the
//! parser: only programmatic callers construct [`InsertSource::Raw`].

use std::fmt;

use tensordb_common::DataType;
use tensordb_core::tensor::DimRange;
use tensordb_storage::IndexFilter;

/// A parsed query.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `CREATE TENSOR <name> [shape] [TYPE kind]`
    Create {
        /// New tensor name.
        name: String,
        /// Dimensions; empty for a scalar.
        shape: Vec<usize>,
        /// Element type (`float64` when omitted in the query).
        data_type: DataType,
    },
    /// `INSERT INTO <name> VALUES (...)`, or a raw binary insert.
    Insert {
        /// Target tensor name.
        name: String,
        /// Where the elements come from.
        source: InsertSource,
    },
    /// `SELECT <display> FROM <name> [slice]`
    Select {
        /// Display name (unused beyond the surface syntax).
        display: String,
        /// Source tensor name.
        name: String,
        /// Slice ranges; `None` means the whole tensor.
        ranges: Option<Vec<DimRange>>,
    },
    /// `GET DATA FROM ...`
    GetData(GetDataStatement),
    /// `LIST TENSORS [WHERE ...]`
    List {
        /// Index filter built from the WHERE predicates.
        filter: IndexFilter,
    },
    /// `ADD TENSOR ... INTO ...` / `ADD SCALAR ... INTO ...`
    Math(MathStatement),
}

/// The element source of an INSERT.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    /// Textual literals from the query, preserved as written; conversion
    /// happens in the executor using the target tensor's type.
    Literals(Vec<String>),
    /// A raw little-endian byte block from a programmatic caller.
    Raw(Vec<u8>),
}

/// One named tensor (with an optional slice) in a GET DATA query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorSelection {
    /// Tensor name.
    pub name: String,
    /// Slice ranges; `None` means the whole tensor.
    pub ranges: Option<Vec<DimRange>>,
}

/// A parsed `GET DATA` query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetDataStatement {
    /// The requested tensors, in query order.
    pub targets: Vec<TensorSelection>,
    /// Batch size; always positive when present.
    pub batch_size: Option<usize>,
}

/// A parsed math operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MathStatement {
    /// Element-wise addition of two tensors into a new one.
    AddTensors {
        /// Left operand.
        left: String,
        /// Right operand.
        right: String,
        /// New output tensor name.
        output: String,
    },
    /// Pointwise scalar addition into a new tensor.
    AddScalar {
        /// The scalar literal, preserved as written.
        scalar: String,
        /// The input tensor.
        input: String,
        /// New output tensor name.
        output: String,
    },
}

impl MathStatement {
    /// The operation name used in status strings.
    #[must_use]
    pub const fn op_name(&self) -> &'static str {
        match self {
            MathStatement::AddTensors { .. } => "ADD_TENSORS",
            MathStatement::AddScalar { .. } => "ADD_SCALAR",
        }
    }

    /// The output tensor name.
    #[must_use]
    pub fn output(&self) -> &str {
        match self {
            MathStatement::AddTensors { output, .. }
            | MathStatement::AddScalar { output, .. } => output,
        }
    }
}

impl fmt::Display for MathStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.op_name())
    }
}
