//! Nested formatting of tensor contents.
//!
//! `SELECT` renders a tensor as a nested JSON value mirroring its shape:
//! the bare element for rank 0, nested arrays for rank ≥ 1. Empty shapes
//! render as the correctly-shaped nest of empty arrays; a zero outermost
//! dimension collapses the whole rendering to `[]` while a zero inner
//! dimension keeps the outer structure (`[2, 0]` renders as `[[], []]`).

use serde_json::Value;

use crate::buffer::TypedBuffer;
use crate::tensor::Tensor;

impl Tensor {
    /// Renders the tensor's contents as a nested JSON value.
    #[must_use]
    pub fn format_multidimensional(&self) -> Value {
        if self.rank() == 0 {
            return self.data().json_leaf(0);
        }
        if self.total_elements() == 0 {
            return empty_structure(self.shape());
        }
        let mut offset = 0;
        format_rows(self.data(), self.shape(), &mut offset)
    }
}

fn format_rows(data: &TypedBuffer, shape: &[usize], offset: &mut usize) -> Value {
    if shape.len() == 1 {
        let mut row = Vec::with_capacity(shape[0]);
        for _ in 0..shape[0] {
            row.push(data.json_leaf(*offset));
            *offset += 1;
        }
        return Value::Array(row);
    }
    let mut rows = Vec::with_capacity(shape[0]);
    for _ in 0..shape[0] {
        rows.push(format_rows(data, &shape[1..], offset));
    }
    Value::Array(rows)
}

/// Builds the nest of empty arrays for a shape with a zero dimension.
///
/// Recursion stops at the first zero dimension, so the outer structure up
/// to that point is preserved.
fn empty_structure(shape: &[usize]) -> Value {
    if shape.is_empty() {
        return Value::Array(Vec::new());
    }
    let mut rows = Vec::with_capacity(shape[0]);
    for _ in 0..shape[0] {
        rows.push(empty_structure(&shape[1..]));
    }
    Value::Array(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tensordb_common::DataType;

    #[test]
    fn test_format_matrix() {
        let mut t = Tensor::new("t", vec![2, 3], DataType::Float64);
        t.set_data(TypedBuffer::F64(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]))
            .unwrap();
        assert_eq!(
            t.format_multidimensional(),
            json!([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]])
        );
    }

    #[test]
    fn test_format_vector() {
        let mut t = Tensor::new("v", vec![3], DataType::Int32);
        t.set_data(TypedBuffer::I32(vec![100, 200, 300])).unwrap();
        assert_eq!(t.format_multidimensional(), json!([100, 200, 300]));
    }

    #[test]
    fn test_format_scalar() {
        let mut t = Tensor::new("s", vec![], DataType::Int64);
        t.set_data(TypedBuffer::I64(vec![1234567890123])).unwrap();
        assert_eq!(t.format_multidimensional(), json!(1234567890123i64));
    }

    #[test]
    fn test_format_3d() {
        let mut t = Tensor::new("c", vec![2, 2, 2], DataType::Int32);
        t.set_data(TypedBuffer::I32((1..=8).collect())).unwrap();
        assert_eq!(
            t.format_multidimensional(),
            json!([[[1, 2], [3, 4]], [[5, 6], [7, 8]]])
        );
    }

    #[test]
    fn test_format_empty_leading_dim() {
        let t = Tensor::new("e", vec![0, 2], DataType::Float32);
        assert_eq!(t.format_multidimensional(), json!([]));
    }

    #[test]
    fn test_format_empty_trailing_dim() {
        let t = Tensor::new("e", vec![2, 0], DataType::Float32);
        assert_eq!(t.format_multidimensional(), json!([[], []]));
    }

    #[test]
    fn test_format_empty_middle_dim() {
        let t = Tensor::new("e", vec![2, 0, 3], DataType::Float32);
        assert_eq!(t.format_multidimensional(), json!([[], []]));
    }
}
