//! # tensordb-client
//!
//! A thin programmatic client over the TensorDB executor.
//!
//! The client exposes type-specialized entry points for bulk inserts
//! (elements travel as little-endian bytes, skipping literal parsing), the
//! query operations, and direct mmap access to tensor data files.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tensordb_client::Client;
//! use tensordb_common::{DataType, StoreConfig};
//!
//! # async fn run() -> tensordb_common::TensorDbResult<()> {
//! let client = Client::open(StoreConfig::with_data_dir("./data"))?;
//! client.create_tensor("t", &[2, 2], DataType::Float32).await?;
//! client.insert_f32("t", &[1.0, 2.0, 3.0, 4.0]).await?;
//! let value = client.select("t", None).await?;
//! println!("{value}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::sync::Arc;

use bytes::{BufMut, BytesMut};
use tensordb_common::{DataType, StoreConfig, TensorDbError, TensorDbResult};
use tensordb_core::tensor::DimRange;
use tensordb_core::{Tensor, TensorData};
use tensordb_query::{
    Executor, GetDataStatement, InsertSource, MathStatement, MmapGuard, MmapView, QueryOutput,
    Statement, TensorSelection,
};
use tensordb_storage::{IndexFilter, Storage, TensorMetadata};

/// Embedded TensorDB client.
pub struct Client {
    executor: Arc<Executor>,
}

impl Client {
    /// Wraps an existing executor.
    #[must_use]
    pub fn new(executor: Arc<Executor>) -> Self {
        Self { executor }
    }

    /// Opens a store at `config.data_dir` and builds a client over it.
    pub fn open(config: StoreConfig) -> TensorDbResult<Self> {
        let storage = Arc::new(Storage::open(config)?);
        Ok(Self::new(Arc::new(Executor::new(storage))))
    }

    /// Returns the underlying executor.
    #[must_use]
    pub fn executor(&self) -> &Arc<Executor> {
        &self.executor
    }

    /// Releases every retained file/mmap pair.
    pub fn close(&self) -> TensorDbResult<()> {
        self.executor.close()
    }

    /// Creates a tensor. The shape may be empty for a scalar.
    pub async fn create_tensor(
        &self,
        name: &str,
        shape: &[usize],
        data_type: DataType,
    ) -> TensorDbResult<()> {
        validate_name(name)?;
        self.executor
            .execute(Statement::Create {
                name: name.to_string(),
                shape: shape.to_vec(),
                data_type,
            })
            .await?;
        Ok(())
    }

    // =========================================================================
    // Typed bulk inserts
    // =========================================================================

    /// Inserts `float32` elements, replacing the tensor's contents.
    pub async fn insert_f32(&self, name: &str, data: &[f32]) -> TensorDbResult<()> {
        let mut buf = BytesMut::with_capacity(data.len() * 4);
        data.iter().for_each(|x| buf.put_f32_le(*x));
        self.insert_raw(name, buf.to_vec()).await
    }

    /// Inserts `float64` elements, replacing the tensor's contents.
    pub async fn insert_f64(&self, name: &str, data: &[f64]) -> TensorDbResult<()> {
        let mut buf = BytesMut::with_capacity(data.len() * 8);
        data.iter().for_each(|x| buf.put_f64_le(*x));
        self.insert_raw(name, buf.to_vec()).await
    }

    /// Inserts `int32` elements, replacing the tensor's contents.
    pub async fn insert_i32(&self, name: &str, data: &[i32]) -> TensorDbResult<()> {
        let mut buf = BytesMut::with_capacity(data.len() * 4);
        data.iter().for_each(|x| buf.put_i32_le(*x));
        self.insert_raw(name, buf.to_vec()).await
    }

    /// Inserts `int64` elements, replacing the tensor's contents.
    pub async fn insert_i64(&self, name: &str, data: &[i64]) -> TensorDbResult<()> {
        let mut buf = BytesMut::with_capacity(data.len() * 8);
        data.iter().for_each(|x| buf.put_i64_le(*x));
        self.insert_raw(name, buf.to_vec()).await
    }

    async fn insert_raw(&self, name: &str, bytes: Vec<u8>) -> TensorDbResult<()> {
        validate_name(name)?;
        self.executor
            .execute(Statement::Insert {
                name: name.to_string(),
                source: InsertSource::Raw(bytes),
            })
            .await?;
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns the tensor's contents as a nested JSON value, optionally
    /// restricted to a slice.
    pub async fn select(
        &self,
        name: &str,
        ranges: Option<Vec<DimRange>>,
    ) -> TensorDbResult<serde_json::Value> {
        let output = self
            .executor
            .execute(Statement::Select {
                display: name.to_string(),
                name: name.to_string(),
                ranges,
            })
            .await?;
        match output {
            QueryOutput::Value(v) => Ok(v),
            other => Err(unexpected_output("SELECT", &other)),
        }
    }

    /// Reads one tensor as batched envelopes.
    pub async fn get_data(
        &self,
        name: &str,
        ranges: Option<Vec<DimRange>>,
        batch_size: Option<usize>,
    ) -> TensorDbResult<Vec<TensorData>> {
        let output = self
            .executor
            .execute(Statement::GetData(GetDataStatement {
                targets: vec![TensorSelection {
                    name: name.to_string(),
                    ranges,
                }],
                batch_size,
            }))
            .await?;
        match output {
            QueryOutput::Batches(batches) => Ok(batches),
            other => Err(unexpected_output("GET DATA", &other)),
        }
    }

    /// Reads several tensors concurrently; results are indexed by input
    /// order.
    pub async fn get_data_multi(
        &self,
        targets: Vec<TensorSelection>,
        batch_size: Option<usize>,
    ) -> TensorDbResult<Vec<Vec<TensorData>>> {
        let single = targets.len() == 1;
        let output = self
            .executor
            .execute(Statement::GetData(GetDataStatement {
                targets,
                batch_size,
            }))
            .await?;
        match output {
            QueryOutput::BatchSets(sets) => Ok(sets),
            QueryOutput::Batches(batches) if single => Ok(vec![batches]),
            other => Err(unexpected_output("GET DATA", &other)),
        }
    }

    /// Lists tensor metadata matching `filter`, sorted by name.
    pub async fn list_tensors(&self, filter: IndexFilter) -> TensorDbResult<Vec<TensorMetadata>> {
        let output = self.executor.execute(Statement::List { filter }).await?;
        match output {
            QueryOutput::Listing(listing) => Ok(listing),
            other => Err(unexpected_output("LIST TENSORS", &other)),
        }
    }

    /// Element-wise addition of two stored tensors into a new one.
    /// Returns the status string.
    pub async fn add_tensors(&self, left: &str, right: &str, output: &str) -> TensorDbResult<String> {
        validate_name(output)?;
        let result = self
            .executor
            .execute(Statement::Math(MathStatement::AddTensors {
                left: left.to_string(),
                right: right.to_string(),
                output: output.to_string(),
            }))
            .await?;
        result
            .as_status()
            .map(str::to_string)
            .ok_or_else(|| unexpected_output("ADD_TENSORS", &result))
    }

    /// Pointwise scalar addition into a new tensor. The scalar literal is
    /// parsed in the operand's element type. Returns the status string.
    pub async fn add_scalar(&self, scalar: &str, input: &str, output: &str) -> TensorDbResult<String> {
        validate_name(output)?;
        let result = self
            .executor
            .execute(Statement::Math(MathStatement::AddScalar {
                scalar: scalar.to_string(),
                input: input.to_string(),
                output: output.to_string(),
            }))
            .await?;
        result
            .as_status()
            .map(str::to_string)
            .ok_or_else(|| unexpected_output("ADD_SCALAR", &result))
    }

    // =========================================================================
    // Metadata and direct mmap access
    // =========================================================================

    /// Loads a tensor's metadata record.
    pub fn get_metadata(&self, name: &str) -> TensorDbResult<TensorMetadata> {
        self.executor.storage().load_metadata(name)
    }

    /// Opens a direct read-only view of the tensor's data file.
    ///
    /// The returned [`MmapGuard`] must be disposed exactly once; it unmaps
    /// and closes the underlying pair.
    pub fn tensor_mmap(
        &self,
        name: &str,
    ) -> TensorDbResult<(TensorMetadata, MmapView, MmapGuard)> {
        self.executor.tensor_mmap(name)
    }

    /// Loads a full `float32` tensor (metadata plus elements).
    pub async fn load_tensor_f32(&self, name: &str) -> TensorDbResult<Tensor> {
        self.load_tensor_internal(name, DataType::Float32).await
    }

    /// Loads a full `float64` tensor (metadata plus elements).
    pub async fn load_tensor_f64(&self, name: &str) -> TensorDbResult<Tensor> {
        self.load_tensor_internal(name, DataType::Float64).await
    }

    /// Loads a full `int32` tensor (metadata plus elements).
    pub async fn load_tensor_i32(&self, name: &str) -> TensorDbResult<Tensor> {
        self.load_tensor_internal(name, DataType::Int32).await
    }

    /// Loads a full `int64` tensor (metadata plus elements).
    pub async fn load_tensor_i64(&self, name: &str) -> TensorDbResult<Tensor> {
        self.load_tensor_internal(name, DataType::Int64).await
    }

    /// Shared load path: verifies the stored data type, then rebuilds the
    /// tensor from an unbatched `GET DATA` round trip, so callers can rely
    /// on the buffer variant.
    async fn load_tensor_internal(
        &self,
        name: &str,
        expected: DataType,
    ) -> TensorDbResult<Tensor> {
        let meta = self.get_metadata(name)?;
        if meta.data_type != expected {
            return Err(TensorDbError::TypeMismatch {
                expected: expected.to_string(),
                actual: meta.data_type.to_string(),
            });
        }
        let mut batches = self.get_data(name, None, None).await?;
        let envelope = batches
            .pop()
            .ok_or_else(|| TensorDbError::internal(format!("no data returned for tensor '{name}'")))?;
        Tensor::from_parts(
            meta.name,
            meta.shape,
            meta.data_type,
            meta.strides,
            envelope.data,
        )
    }
}

fn unexpected_output(operation: &str, output: &QueryOutput) -> TensorDbError {
    TensorDbError::internal(format!(
        "unexpected result kind for {operation}: {output:?}"
    ))
}

/// Tensor names are identifiers: letters, digits, and underscores, not
/// starting with a digit.
fn validate_name(name: &str) -> TensorDbResult<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(TensorDbError::MalformedQuery {
            position: 0,
            message: format!("invalid tensor name '{name}'"),
        })
    }
}
