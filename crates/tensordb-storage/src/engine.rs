//! The storage engine.
//!
//! [`Storage`] owns one data directory. Saving a tensor writes its `.meta`
//! file first, then creates or truncates the `.data` file to the exact
//! byte length and writes every element little-endian in a single pass.
//! Opening a store walks the directory and rebuilds the metadata index;
//! unparseable metadata files are logged and skipped, never fatal.

use std::fs;
use std::path::{Path, PathBuf};

use tensordb_common::constants::{DATA_EXTENSION, META_EXTENSION};
use tensordb_common::{DataType, StoreConfig, TensorDbError, TensorDbResult};
use tensordb_core::{Tensor, TypedBuffer};
use tracing::warn;

use crate::index::MetadataIndex;
use crate::mapped::{write_data_file, MappedTensorFile};
use crate::metadata::TensorMetadata;

/// The on-disk tensor store.
#[derive(Debug)]
pub struct Storage {
    config: StoreConfig,
    index: MetadataIndex,
}

impl Storage {
    /// Opens (creating if needed) the store at `config.data_dir` and
    /// rebuilds the metadata index from the `.meta` files found there.
    pub fn open(config: StoreConfig) -> TensorDbResult<Self> {
        config.validate()?;
        fs::create_dir_all(&config.data_dir)?;
        let storage = Self {
            config,
            index: MetadataIndex::new(),
        };
        storage.rebuild_index()?;
        Ok(storage)
    }

    /// Returns the store's data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Returns the metadata index.
    #[must_use]
    pub fn index(&self) -> &MetadataIndex {
        &self.index
    }

    /// Path of the metadata file for `name`.
    #[must_use]
    pub fn meta_path(&self, name: &str) -> PathBuf {
        self.config.data_dir.join(format!("{name}.{META_EXTENSION}"))
    }

    /// Path of the data file for `name`.
    #[must_use]
    pub fn data_path(&self, name: &str) -> PathBuf {
        self.config.data_dir.join(format!("{name}.{DATA_EXTENSION}"))
    }

    /// Returns true if a metadata file exists for `name`.
    #[must_use]
    pub fn metadata_exists(&self, name: &str) -> bool {
        self.meta_path(name).exists()
    }

    /// Reads and parses the metadata file for `name`.
    pub fn load_metadata(&self, name: &str) -> TensorDbResult<TensorMetadata> {
        let path = self.meta_path(name);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TensorDbError::not_found(name));
            }
            Err(e) => return Err(e.into()),
        };
        TensorMetadata::parse(&text)
    }

    /// Persists a tensor: metadata first, then the full element buffer.
    ///
    /// The data file ends up exactly `total_elements * element_size` bytes
    /// long (possibly zero). A buffer length inconsistent with the shape is
    /// an internal error and fails before anything is written.
    pub fn save(&self, tensor: &Tensor) -> TensorDbResult<()> {
        let expected = tensor.total_elements();
        if tensor.data().len() != expected {
            return Err(TensorDbError::corruption(format!(
                "tensor '{}': buffer holds {} elements but shape {:?} implies {}",
                tensor.name(),
                tensor.data().len(),
                tensor.shape(),
                expected
            )));
        }

        let meta = TensorMetadata::from(tensor);
        fs::write(self.meta_path(tensor.name()), meta.encode())?;

        let bytes = tensor.data().to_le_bytes();
        write_data_file(
            &self.data_path(tensor.name()),
            &bytes,
            self.config.sync_on_save,
        )
    }

    /// Opens and maps the data file for `name`.
    ///
    /// A missing file is fine when the tensor holds no elements (`None` is
    /// returned); otherwise the file must exist and its byte length must be
    /// exactly `expected_elements * element_size`.
    pub fn open_data(
        &self,
        name: &str,
        expected_elements: usize,
        element_size: usize,
    ) -> TensorDbResult<Option<MappedTensorFile>> {
        let path = self.data_path(name);
        if expected_elements == 0 {
            if !path.exists() {
                return Ok(None);
            }
            return Ok(Some(MappedTensorFile::open_unmapped(&path)?));
        }

        if !path.exists() {
            return Err(TensorDbError::corruption(format!(
                "data file missing for tensor '{name}'"
            )));
        }
        let expected_bytes = (expected_elements * element_size) as u64;
        let actual_bytes = fs::metadata(&path)?.len();
        if actual_bytes != expected_bytes {
            return Err(TensorDbError::corruption(format!(
                "data file size mismatch for '{name}': expected {expected_bytes} bytes, got {actual_bytes}"
            )));
        }
        Ok(Some(MappedTensorFile::open(&path)?))
    }

    /// Decodes exactly `count` elements of `data_type` from a mapped region.
    ///
    /// A `count` of zero tolerates an absent map and yields an empty buffer.
    pub fn read_typed(
        source: Option<&[u8]>,
        count: usize,
        data_type: DataType,
    ) -> TensorDbResult<TypedBuffer> {
        if count == 0 {
            return Ok(TypedBuffer::empty(data_type));
        }
        let Some(bytes) = source else {
            return Err(TensorDbError::corruption(
                "no mapped data but a non-zero element count was requested",
            ));
        };
        TypedBuffer::from_le_bytes(data_type, bytes, count)
    }

    /// Scans the data directory and repopulates the index from every
    /// parseable `.meta` file. Parse failures are logged and skipped.
    fn rebuild_index(&self) -> TensorDbResult<()> {
        self.index.clear();
        for entry in fs::read_dir(&self.config.data_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(META_EXTENSION) {
                continue;
            }
            let text = match fs::read_to_string(&path) {
                Ok(text) => text,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to read metadata during index rebuild");
                    continue;
                }
            };
            match TensorMetadata::parse(&text) {
                Ok(meta) => self.index.add(&meta),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unparseable metadata during index rebuild");
                }
            }
        }
        Ok(())
    }
}
