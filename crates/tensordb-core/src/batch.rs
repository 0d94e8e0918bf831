//! Batched materialization for inference.
//!
//! `GET DATA` turns a tensor selection into one or more [`TensorData`]
//! envelopes, each carrying the selection's metadata plus a contiguous,
//! non-overlapping element window.

use serde::Serialize;
use tensordb_common::{shape, DataType, TensorDbResult};

use crate::buffer::TypedBuffer;
use crate::tensor::{DimRange, Tensor};

/// Position of one batch within a batched selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchInfo {
    /// Requested batch size, in elements.
    pub batch_size: usize,
    /// Total number of batches in the selection.
    pub num_batches: usize,
    /// Zero-based index of this batch.
    pub current_batch_index: usize,
}

/// One result envelope of `GET DATA`: the selection's metadata plus a
/// window of its elements.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TensorData {
    /// Tensor name.
    pub name: String,
    /// Shape of the selection (not of the window).
    pub shape: Vec<usize>,
    /// Rank of the selection.
    pub num_dimensions: usize,
    /// Element type.
    pub data_type: DataType,
    /// Total elements in the selection (not in the window).
    pub total_elements: usize,
    /// Byte size of this envelope's window.
    pub data_size_bytes: usize,
    /// Row-major strides of the selection, in elements.
    pub strides: Vec<usize>,
    /// Batch position, absent for unbatched reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_info: Option<BatchInfo>,
    /// The window's elements.
    pub data: TypedBuffer,
}

impl Tensor {
    /// Materializes a selection of this tensor as batched envelopes.
    ///
    /// With `ranges` present the selection is `get_slice(ranges)` reshaped
    /// to the range widths with fresh strides; otherwise it is the whole
    /// tensor. Without a batch size (or with a zero one) a single unbatched
    /// envelope is returned. Otherwise the selection is cut into
    /// `ceil(total / batch_size)` contiguous windows in ascending index
    /// order. A zero-element selection with a batch size still yields
    /// exactly one envelope, with empty data and a single-batch
    /// [`BatchInfo`].
    pub fn get_data_for_inference(
        &self,
        ranges: Option<&[DimRange]>,
        batch_size: Option<usize>,
    ) -> TensorDbResult<Vec<TensorData>> {
        let (data, sel_shape, sel_strides) = match ranges {
            Some(ranges) => {
                let data = self.get_slice(ranges)?;
                let sel_shape: Vec<usize> = ranges.iter().map(|&(lo, hi)| hi - lo).collect();
                let sel_strides = shape::compute_strides(&sel_shape);
                (data, sel_shape, sel_strides)
            }
            None => (
                self.data().clone(),
                self.shape().to_vec(),
                self.strides().to_vec(),
            ),
        };

        let total = shape::total_elements(&sel_shape);
        let element_size = self.data_type().element_size();
        let batch_size = batch_size.filter(|&s| s > 0);

        let envelope = |data: TypedBuffer, batch_info: Option<BatchInfo>| TensorData {
            name: self.name().to_string(),
            shape: sel_shape.clone(),
            num_dimensions: sel_shape.len(),
            data_type: self.data_type(),
            total_elements: total,
            data_size_bytes: data.len() * element_size,
            strides: sel_strides.clone(),
            batch_info,
            data,
        };

        let Some(batch_size) = batch_size else {
            return Ok(vec![envelope(data, None)]);
        };

        if total == 0 {
            return Ok(vec![envelope(
                TypedBuffer::empty(self.data_type()),
                Some(BatchInfo {
                    batch_size,
                    num_batches: 1,
                    current_batch_index: 0,
                }),
            )]);
        }

        let num_batches = total.div_ceil(batch_size);
        let mut results = Vec::with_capacity(num_batches);
        for k in 0..num_batches {
            let start = k * batch_size;
            let end = usize::min(start + batch_size, total);
            results.push(envelope(
                data.window(start, end),
                Some(BatchInfo {
                    batch_size,
                    num_batches,
                    current_batch_index: k,
                }),
            ));
        }
        Ok(results)
    }
}
