//! The query executor.
//!
//! [`Executor`] dispatches parsed statements against a [`Storage`]. It owns
//! a process-local table of `(name → open file, mmap)` pairs used to serve
//! reads; every fresh read of a name replaces (and thereby closes) the
//! previous pair. `GET DATA` fans out one blocking task per named tensor
//! and joins them in input order.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tensordb_common::{DataType, TensorDbError, TensorDbResult};
use tensordb_core::{ops, Tensor, TensorData, TypedBuffer};
use tensordb_storage::{IndexFilter, MappedTensorFile, Storage, TensorMetadata};
use tracing::warn;

use crate::parser::statement::{
    GetDataStatement, InsertSource, MathStatement, Statement, TensorSelection,
};
use crate::parser::Parser;

pub mod handle;
pub mod output;

use handle::OpenTable;
pub use handle::{MmapGuard, MmapView};
use output::QueryOutput;

/// Executes parsed statements against a store.
pub struct Executor {
    storage: Arc<Storage>,
    open: OpenTable,
}

impl Executor {
    /// Creates an executor over `storage` with an empty open-file table.
    #[must_use]
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            storage,
            open: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the underlying storage.
    #[must_use]
    pub fn storage(&self) -> &Arc<Storage> {
        &self.storage
    }

    /// Parses and executes one query string.
    pub async fn execute_query(&self, query: &str) -> TensorDbResult<QueryOutput> {
        let statement = Parser::parse(query)?;
        self.execute(statement).await
    }

    /// Executes one parsed statement.
    pub async fn execute(&self, statement: Statement) -> TensorDbResult<QueryOutput> {
        match statement {
            Statement::Create {
                name,
                shape,
                data_type,
            } => self.execute_create(&name, shape, data_type),
            Statement::Insert { name, source } => self.execute_insert(&name, source),
            Statement::Select { name, ranges, .. } => self.execute_select(&name, ranges.as_deref()),
            Statement::GetData(stmt) => self.execute_get_data(stmt).await,
            Statement::List { filter } => Ok(self.execute_list(&filter)),
            Statement::Math(stmt) => self.execute_math(&stmt),
        }
    }

    /// Unmaps and closes everything in the open-file table.
    ///
    /// Teardown is best-effort: entries release their mappings as they are
    /// dropped.
    pub fn close(&self) -> TensorDbResult<()> {
        self.open.lock().clear();
        Ok(())
    }

    /// Opens a direct mmap view of a tensor's data file.
    ///
    /// Any previously retained pair for this name is released first; the
    /// fresh pair is installed in the table and stays alive until the
    /// returned [`MmapGuard`] is disposed (or dropped).
    pub fn tensor_mmap(
        &self,
        name: &str,
    ) -> TensorDbResult<(TensorMetadata, MmapView, MmapGuard)> {
        let meta = self.storage.load_metadata(name)?;
        let mapped = self.storage.open_data(
            name,
            meta.total_elements(),
            meta.data_type.element_size(),
        )?;

        let mapped = mapped.map(Arc::new);
        {
            let mut table = self.open.lock();
            table.remove(name);
            if let Some(ref m) = mapped {
                table.insert(name.to_string(), Arc::clone(m));
            }
        }

        let view = MmapView::new(mapped);
        let guard = MmapGuard::new(Arc::clone(&self.open), name.to_string());
        Ok((meta, view, guard))
    }

    // =========================================================================
    // CREATE
    // =========================================================================

    fn execute_create(
        &self,
        name: &str,
        shape: Vec<usize>,
        data_type: DataType,
    ) -> TensorDbResult<QueryOutput> {
        if self.storage.metadata_exists(name) {
            return Err(TensorDbError::already_exists(name));
        }
        let tensor = Tensor::new(name, shape, data_type);
        self.storage.save(&tensor)?;
        self.storage.index().add(&TensorMetadata::from(&tensor));
        Ok(QueryOutput::Status(format!(
            "Tensor {name} created with type {data_type}"
        )))
    }

    // =========================================================================
    // INSERT
    // =========================================================================

    fn execute_insert(&self, name: &str, source: InsertSource) -> TensorDbResult<QueryOutput> {
        let meta = self.storage.load_metadata(name)?;
        let expected = meta.total_elements();
        let element_size = meta.data_type.element_size();

        match source {
            InsertSource::Raw(bytes) => {
                if bytes.len() % element_size != 0 {
                    return Err(TensorDbError::SizeMismatch {
                        expected: expected * element_size,
                        actual: bytes.len(),
                        context: format!(
                            "raw byte length for tensor '{name}' (not a multiple of element size {element_size})"
                        ),
                    });
                }
                let provided = bytes.len() / element_size;
                if provided != expected {
                    return Err(TensorDbError::SizeMismatch {
                        expected,
                        actual: provided,
                        context: format!(
                            "raw element count for tensor '{name}' (shape {:?})",
                            meta.shape
                        ),
                    });
                }
                let data = TypedBuffer::from_le_bytes(meta.data_type, &bytes, provided)?;
                self.persist_with_data(&meta, data)?;
                Ok(QueryOutput::Status(format!("Raw data inserted into {name}")))
            }
            InsertSource::Literals(literals) => {
                if literals.is_empty() && expected == 0 {
                    self.persist_with_data(&meta, TypedBuffer::empty(meta.data_type))?;
                    return Ok(QueryOutput::Status(format!(
                        "Data inserted into {name} (0 elements from string)"
                    )));
                }
                if literals.len() != expected {
                    return Err(TensorDbError::SizeMismatch {
                        expected,
                        actual: literals.len(),
                        context: format!(
                            "string element count for tensor '{name}' (shape {:?})",
                            meta.shape
                        ),
                    });
                }
                let data = TypedBuffer::from_literals(meta.data_type, &literals)?;
                self.persist_with_data(&meta, data)?;
                Ok(QueryOutput::Status(format!(
                    "String data inserted into {name}"
                )))
            }
        }
    }

    fn persist_with_data(&self, meta: &TensorMetadata, data: TypedBuffer) -> TensorDbResult<()> {
        let tensor = Tensor::from_parts(
            meta.name.clone(),
            meta.shape.clone(),
            meta.data_type,
            meta.strides.clone(),
            data,
        )?;
        self.storage.save(&tensor)
    }

    // =========================================================================
    // SELECT
    // =========================================================================

    fn execute_select(
        &self,
        name: &str,
        ranges: Option<&[(usize, usize)]>,
    ) -> TensorDbResult<QueryOutput> {
        let meta = self.storage.load_metadata(name)?;
        let tensor = load_full_tensor(&self.storage, &self.open, name, &meta)?;

        let Some(ranges) = ranges else {
            return Ok(QueryOutput::Value(tensor.format_multidimensional()));
        };

        let sliced = tensor.get_slice(ranges)?;
        let slice_shape: Vec<usize> = ranges.iter().map(|&(lo, hi)| hi - lo).collect();
        let mut view = Tensor::new(format!("sliced_{name}"), slice_shape, meta.data_type);
        view.set_data(sliced)?;
        Ok(QueryOutput::Value(view.format_multidimensional()))
    }

    // =========================================================================
    // GET DATA
    // =========================================================================

    async fn execute_get_data(&self, stmt: GetDataStatement) -> TensorDbResult<QueryOutput> {
        let single = stmt.targets.len() == 1;
        let batch_size = stmt.batch_size;

        let mut handles = Vec::with_capacity(stmt.targets.len());
        for target in &stmt.targets {
            let storage = Arc::clone(&self.storage);
            let open = Arc::clone(&self.open);
            let target: TensorSelection = target.clone();
            handles.push(tokio::task::spawn_blocking(
                move || -> TensorDbResult<Vec<TensorData>> {
                    let meta = storage.load_metadata(&target.name)?;
                    let tensor = load_full_tensor(&storage, &open, &target.name, &meta)?;
                    tensor.get_data_for_inference(target.ranges.as_deref(), batch_size)
                },
            ));
        }

        let mut results = Vec::with_capacity(handles.len());
        let mut failures = Vec::new();
        for (handle, target) in handles.into_iter().zip(&stmt.targets) {
            match handle.await {
                Ok(Ok(batches)) => results.push(batches),
                Ok(Err(e)) => failures.push(format!("tensor '{}': {e}", target.name)),
                Err(e) => failures.push(format!("tensor '{}': task failed: {e}", target.name)),
            }
        }
        if !failures.is_empty() {
            return Err(TensorDbError::GetData { messages: failures });
        }

        if single {
            Ok(QueryOutput::Batches(results.remove(0)))
        } else {
            Ok(QueryOutput::BatchSets(results))
        }
    }

    // =========================================================================
    // MATH
    // =========================================================================

    fn execute_math(&self, stmt: &MathStatement) -> TensorDbResult<QueryOutput> {
        let output = stmt.output();
        if self.storage.metadata_exists(output) {
            return Err(TensorDbError::already_exists(output));
        }

        let mut result = match stmt {
            MathStatement::AddTensors { left, right, .. } => {
                let meta_left = self.storage.load_metadata(left)?;
                let meta_right = self.storage.load_metadata(right)?;
                if meta_left.data_type != meta_right.data_type {
                    return Err(TensorDbError::TypeMismatch {
                        expected: meta_left.data_type.to_string(),
                        actual: meta_right.data_type.to_string(),
                    });
                }
                let a = load_full_tensor(&self.storage, &self.open, left, &meta_left)?;
                let b = load_full_tensor(&self.storage, &self.open, right, &meta_right)?;
                ops::add_tensors(&a, &b)?
            }
            MathStatement::AddScalar { scalar, input, .. } => {
                let meta = self.storage.load_metadata(input)?;
                let a = load_full_tensor(&self.storage, &self.open, input, &meta)?;
                ops::add_scalar(&a, scalar)?
            }
        };

        result.set_name(output);
        self.storage.save(&result)?;
        self.storage.index().add(&TensorMetadata::from(&result));
        Ok(QueryOutput::Status(format!(
            "Tensor '{output}' created successfully from operation {}",
            stmt.op_name()
        )))
    }

    // =========================================================================
    // LIST
    // =========================================================================

    fn execute_list(&self, filter: &IndexFilter) -> QueryOutput {
        let mut names = self.storage.index().query(filter);
        names.sort();

        let mut listing = Vec::with_capacity(names.len());
        for name in names {
            match self.storage.load_metadata(&name) {
                Ok(meta) => listing.push(meta),
                Err(e) => {
                    warn!(tensor = %name, error = %e, "skipping unloadable metadata during LIST TENSORS");
                }
            }
        }
        QueryOutput::Listing(listing)
    }
}

/// Loads a tensor's full contents through a fresh mmap.
///
/// The open-file table entry for `name` is replaced: the old pair (if any)
/// is dropped, which unmaps and closes it, before the new pair is
/// installed.
fn load_full_tensor(
    storage: &Storage,
    open: &Mutex<HashMap<String, Arc<MappedTensorFile>>>,
    name: &str,
    meta: &TensorMetadata,
) -> TensorDbResult<Tensor> {
    open.lock().remove(name);

    let total = meta.total_elements();
    let mapped = storage.open_data(name, total, meta.data_type.element_size())?;
    let data = Storage::read_typed(mapped.as_ref().map(|m| m.as_bytes()), total, meta.data_type)?;

    if let Some(mapped) = mapped {
        open.lock().insert(name.to_string(), Arc::new(mapped));
    }

    Tensor::from_parts(
        meta.name.clone(),
        meta.shape.clone(),
        meta.data_type,
        meta.strides.clone(),
        data,
    )
}
