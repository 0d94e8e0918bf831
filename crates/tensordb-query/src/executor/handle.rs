//! Shared mmap views handed to programmatic callers.
//!
//! The executor owns its open-file/mmap table; external callers get a
//! reference-counted view plus a guard bound to the table entry. Dropping
//! or disposing the guard removes the entry; the mapping itself is released
//! when the last view goes away.

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;

use parking_lot::Mutex;
use tensordb_common::TensorDbResult;
use tensordb_storage::MappedTensorFile;

pub(crate) type OpenTable = Arc<Mutex<HashMap<String, Arc<MappedTensorFile>>>>;

/// A read-only view of a tensor's mapped data file.
///
/// Empty tensors may have nothing mapped; the view then dereferences to an
/// empty slice.
#[derive(Debug, Clone)]
pub struct MmapView {
    inner: Option<Arc<MappedTensorFile>>,
}

impl MmapView {
    pub(crate) fn new(inner: Option<Arc<MappedTensorFile>>) -> Self {
        Self { inner }
    }

    /// Returns the mapped bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.inner.as_ref().map_or(&[], |m| m.as_bytes())
    }
}

impl Deref for MmapView {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Disposer for a view handed out by [`Executor::tensor_mmap`].
///
/// Call [`MmapGuard::dispose`] exactly once when done; dropping the guard
/// without disposing releases the entry as a fallback.
///
/// [`Executor::tensor_mmap`]: crate::Executor::tensor_mmap
#[derive(Debug)]
pub struct MmapGuard {
    table: OpenTable,
    name: String,
    disposed: bool,
}

impl MmapGuard {
    pub(crate) fn new(table: OpenTable, name: String) -> Self {
        Self {
            table,
            name,
            disposed: false,
        }
    }

    /// Unmaps and closes the underlying pair by releasing the executor's
    /// table entry for this tensor.
    pub fn dispose(mut self) -> TensorDbResult<()> {
        self.release();
        Ok(())
    }

    fn release(&mut self) {
        if !self.disposed {
            self.table.lock().remove(&self.name);
            self.disposed = true;
        }
    }
}

impl Drop for MmapGuard {
    fn drop(&mut self) {
        self.release();
    }
}
