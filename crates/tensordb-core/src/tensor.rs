//! The tensor value.
//!
//! A [`Tensor`] is a named, typed, multi-dimensional array: shape, row-major
//! strides, and a contiguous [`TypedBuffer`] holding exactly
//! `total_elements(shape)` elements.

use tensordb_common::{shape, DataType, TensorDbError, TensorDbResult};

use crate::buffer::TypedBuffer;

/// A half-open per-dimension slice range `[lo, hi)`.
pub type DimRange = (usize, usize);

/// A named, typed, multi-dimensional numeric array.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    name: String,
    shape: Vec<usize>,
    data_type: DataType,
    strides: Vec<usize>,
    data: TypedBuffer,
}

impl Tensor {
    /// Creates a tensor with a zero-initialized element buffer.
    ///
    /// Strides are computed from the shape; the buffer holds
    /// `total_elements(shape)` elements.
    #[must_use]
    pub fn new(name: impl Into<String>, shape: Vec<usize>, data_type: DataType) -> Self {
        let strides = shape::compute_strides(&shape);
        let data = TypedBuffer::zeroed(data_type, shape::total_elements(&shape));
        Self {
            name: name.into(),
            shape,
            data_type,
            strides,
            data,
        }
    }

    /// Reassembles a tensor from stored parts.
    ///
    /// The buffer kind must match `data_type` and its length must match the
    /// shape; `strides` (typically read back from metadata) must have the
    /// shape's rank.
    pub fn from_parts(
        name: impl Into<String>,
        shape: Vec<usize>,
        data_type: DataType,
        strides: Vec<usize>,
        data: TypedBuffer,
    ) -> TensorDbResult<Self> {
        let name = name.into();
        if data.data_type() != data_type {
            return Err(TensorDbError::TypeMismatch {
                expected: data_type.to_string(),
                actual: data.data_type().to_string(),
            });
        }
        if strides.len() != shape.len() {
            return Err(TensorDbError::corruption(format!(
                "tensor '{}': strides rank {} does not match shape rank {}",
                name,
                strides.len(),
                shape.len()
            )));
        }
        let expected = shape::total_elements(&shape);
        if data.len() != expected {
            return Err(TensorDbError::SizeMismatch {
                expected,
                actual: data.len(),
                context: format!("element count loading tensor '{name}'"),
            });
        }
        Ok(Self {
            name,
            shape,
            data_type,
            strides,
            data,
        })
    }

    /// Returns the tensor name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the tensor.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Returns the shape.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the element type.
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Returns the strides, in elements.
    #[must_use]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Returns the element buffer.
    #[must_use]
    pub const fn data(&self) -> &TypedBuffer {
        &self.data
    }

    /// Returns the number of dimensions.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Returns the total number of elements implied by the shape.
    #[must_use]
    pub fn total_elements(&self) -> usize {
        shape::total_elements(&self.shape)
    }

    /// Replaces the element buffer wholesale.
    ///
    /// The buffer kind must match the tensor's and its length must equal
    /// `total_elements(shape)`.
    pub fn set_data(&mut self, data: TypedBuffer) -> TensorDbResult<()> {
        if data.data_type() != self.data_type {
            return Err(TensorDbError::TypeMismatch {
                expected: self.data_type.to_string(),
                actual: data.data_type().to_string(),
            });
        }
        let expected = self.total_elements();
        if data.len() != expected {
            return Err(TensorDbError::SizeMismatch {
                expected,
                actual: data.len(),
                context: format!(
                    "element count for tensor '{}' (shape {:?})",
                    self.name, self.shape
                ),
            });
        }
        self.data = data;
        Ok(())
    }

    /// Copies the rectangular region described by `ranges` into a new
    /// contiguous row-major buffer.
    ///
    /// One `[lo, hi)` range per dimension, with `lo <= hi <= shape[i]`.
    /// Two historical exceptions are tolerated: a rank-0 tensor sliced with
    /// the single range `[0, 1)` yields a one-element copy, and a `[1]`
    /// tensor accepts the same single range.
    pub fn get_slice(&self, ranges: &[DimRange]) -> TensorDbResult<TypedBuffer> {
        if ranges.len() != self.rank() {
            let scalar_unit = self.rank() == 0 && ranges == [(0, 1)];
            if !scalar_unit {
                return Err(TensorDbError::invalid_slice(format!(
                    "{} ranges given for tensor '{}' of rank {}",
                    ranges.len(),
                    self.name,
                    self.rank()
                )));
            }
        } else {
            for (i, &(lo, hi)) in ranges.iter().enumerate() {
                if lo > hi || hi > self.shape[i] {
                    return Err(TensorDbError::invalid_slice(format!(
                        "range [{lo}:{hi}) for dimension {i} with size {}",
                        self.shape[i]
                    )));
                }
            }
        }

        let out_shape: Vec<usize> = ranges.iter().map(|&(lo, hi)| hi - lo).collect();
        let out_len = shape::total_elements(&out_shape);
        if out_len == 0 {
            return Ok(TypedBuffer::empty(self.data_type));
        }

        Ok(match &self.data {
            TypedBuffer::F32(v) => TypedBuffer::F32(gather(v, &self.strides, ranges, out_len)),
            TypedBuffer::F64(v) => TypedBuffer::F64(gather(v, &self.strides, ranges, out_len)),
            TypedBuffer::I32(v) => TypedBuffer::I32(gather(v, &self.strides, ranges, out_len)),
            TypedBuffer::I64(v) => TypedBuffer::I64(gather(v, &self.strides, ranges, out_len)),
        })
    }
}

/// Row-major odometer copy of the region `ranges` out of `src`.
///
/// The index vector starts at each range's `lo` and increments from the
/// least significant dimension, resetting carried dimensions back to their
/// `lo`. `out_len` is the product of the range widths and bounds the walk.
fn gather<T: Copy>(
    src: &[T],
    strides: &[usize],
    ranges: &[(usize, usize)],
    out_len: usize,
) -> Vec<T> {
    let mut out = Vec::with_capacity(out_len);
    let mut idx: Vec<usize> = ranges.iter().map(|r| r.0).collect();
    loop {
        let offset: usize = idx.iter().zip(strides).map(|(i, s)| i * s).sum();
        out.push(src[offset]);
        if out.len() == out_len {
            return out;
        }
        for d in (0..idx.len()).rev() {
            idx[d] += 1;
            if idx[d] < ranges[d].1 {
                break;
            }
            idx[d] = ranges[d].0;
        }
    }
}
