//! Memory-mapped data files.
//!
//! Reads are served through read-only maps; [`write_data_file`] is the
//! write half of the cycle: truncate to the exact byte length, map
//! read-write, copy, flush.

use std::fs::{File, OpenOptions};
use std::path::Path;

use memmap2::{Mmap, MmapMut};
use tensordb_common::TensorDbResult;

/// A tensor data file held open together with its read-only map.
///
/// Zero-length files carry no map; [`MappedTensorFile::as_bytes`] yields an
/// empty slice for them.
#[derive(Debug)]
pub struct MappedTensorFile {
    _file: File,
    map: Option<Mmap>,
}

impl MappedTensorFile {
    /// Opens `path` and maps it read-only (unless it is empty).
    pub fn open(path: &Path) -> TensorDbResult<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        let map = if len > 0 {
            Some(unsafe { Mmap::map(&file)? })
        } else {
            None
        };
        Ok(Self { _file: file, map })
    }

    /// Opens `path` without mapping it. Used for empty tensors, whose data
    /// files hold no bytes worth mapping.
    pub fn open_unmapped(path: &Path) -> TensorDbResult<Self> {
        let file = File::open(path)?;
        Ok(Self { _file: file, map: None })
    }

    /// Returns the mapped bytes, or an empty slice when nothing is mapped.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.map.as_deref().unwrap_or(&[])
    }

    /// Returns the mapped length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Returns true if nothing is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Writes `bytes` to `path` through a read-write map.
///
/// The file is created or truncated to exactly `bytes.len()`. With `sync`
/// set the map is flushed before returning.
pub fn write_data_file(path: &Path, bytes: &[u8], sync: bool) -> TensorDbResult<()> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;
    file.set_len(bytes.len() as u64)?;
    if bytes.is_empty() {
        return Ok(());
    }
    let mut map = unsafe { MmapMut::map_mut(&file)? };
    map.copy_from_slice(bytes);
    if sync {
        map.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_and_map_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.data");
        write_data_file(&path, &[1, 2, 3, 4], true).unwrap();

        let mapped = MappedTensorFile::open(&path).unwrap();
        assert_eq!(mapped.as_bytes(), &[1, 2, 3, 4]);
        assert_eq!(mapped.len(), 4);
    }

    #[test]
    fn test_rewrite_truncates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.data");
        write_data_file(&path, &[1; 16], true).unwrap();
        write_data_file(&path, &[2; 4], true).unwrap();

        let mapped = MappedTensorFile::open(&path).unwrap();
        assert_eq!(mapped.as_bytes(), &[2; 4]);
    }

    #[test]
    fn test_empty_file_has_no_map() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.data");
        write_data_file(&path, &[], true).unwrap();

        let mapped = MappedTensorFile::open(&path).unwrap();
        assert!(mapped.is_empty());
        assert_eq!(mapped.as_bytes(), &[] as &[u8]);
    }
}
