//! In-memory secondary index over tensor metadata.
//!
//! Two maps, `data type → names` and `rank → names`, serve `LIST TENSORS`
//! filtering without touching disk. The index is a view: the metadata
//! files remain the source of truth, and the whole thing is rebuilt from
//! them when a store is opened.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;
use tensordb_common::DataType;

use crate::metadata::TensorMetadata;

/// Filter for index queries; `None` fields are unfiltered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexFilter {
    /// Restrict to this element type.
    pub data_type: Option<DataType>,
    /// Restrict to this number of dimensions.
    pub rank: Option<usize>,
}

#[derive(Debug, Default)]
struct IndexInner {
    by_data_type: HashMap<DataType, HashSet<String>>,
    by_rank: HashMap<usize, HashSet<String>>,
}

/// Secondary index from `(data type, rank)` to tensor name sets.
///
/// Reads take a shared lock; `add`/`remove`/`clear` take the exclusive one.
#[derive(Debug, Default)]
pub struct MetadataIndex {
    inner: RwLock<IndexInner>,
}

impl MetadataIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tensor under its data type and rank.
    pub fn add(&self, meta: &TensorMetadata) {
        let mut inner = self.inner.write();
        inner
            .by_data_type
            .entry(meta.data_type)
            .or_default()
            .insert(meta.name.clone());
        inner
            .by_rank
            .entry(meta.rank())
            .or_default()
            .insert(meta.name.clone());
    }

    /// Removes a tensor from both maps, dropping empty buckets.
    pub fn remove(&self, meta: &TensorMetadata) {
        let mut inner = self.inner.write();
        if let Some(names) = inner.by_data_type.get_mut(&meta.data_type) {
            names.remove(&meta.name);
            if names.is_empty() {
                inner.by_data_type.remove(&meta.data_type);
            }
        }
        let rank = meta.rank();
        if let Some(names) = inner.by_rank.get_mut(&rank) {
            names.remove(&meta.name);
            if names.is_empty() {
                inner.by_rank.remove(&rank);
            }
        }
    }

    /// Drops all entries.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.by_data_type.clear();
        inner.by_rank.clear();
    }

    /// Returns the names matching `filter`, in no particular order.
    ///
    /// No filters yields every indexed name; a single filter its bucket;
    /// both filters the intersection, iterating over the smaller set.
    #[must_use]
    pub fn query(&self, filter: &IndexFilter) -> Vec<String> {
        let inner = self.inner.read();

        let by_type = filter
            .data_type
            .map(|dt| inner.by_data_type.get(&dt));
        let by_rank = filter.rank.map(|r| inner.by_rank.get(&r));

        match (by_type, by_rank) {
            (None, None) => {
                let mut all = HashSet::new();
                for names in inner.by_data_type.values() {
                    all.extend(names.iter().cloned());
                }
                all.into_iter().collect()
            }
            (Some(set), None) | (None, Some(set)) => {
                set.map(|s| s.iter().cloned().collect()).unwrap_or_default()
            }
            (Some(a), Some(b)) => {
                let (Some(a), Some(b)) = (a, b) else {
                    return Vec::new();
                };
                let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
                small
                    .iter()
                    .filter(|name| large.contains(*name))
                    .cloned()
                    .collect()
            }
        }
    }
}
