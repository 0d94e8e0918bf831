//! Element-wise tensor math.
//!
//! The two supported operations both produce a fresh tensor: element-wise
//! addition of two same-shaped, same-typed tensors, and pointwise addition
//! of a scalar parsed in the operand's element type.

use tensordb_common::{DataType, TensorDbError, TensorDbResult};

use crate::buffer::{parse_literal, TypedBuffer};
use crate::tensor::Tensor;

/// Element-wise sum of two tensors of identical shape and type.
///
/// Zero-element inputs produce a zero-element result. The result carries a
/// placeholder name; callers rename it before persisting.
pub fn add_tensors(a: &Tensor, b: &Tensor) -> TensorDbResult<Tensor> {
    if a.shape() != b.shape() {
        return Err(TensorDbError::invalid_slice(format!(
            "tensor shapes {:?} and {:?} do not match (broadcasting is not supported)",
            a.shape(),
            b.shape()
        )));
    }
    if a.data_type() != b.data_type() {
        return Err(TensorDbError::TypeMismatch {
            expected: a.data_type().to_string(),
            actual: b.data_type().to_string(),
        });
    }

    let mut result = Tensor::new("add_result", a.shape().to_vec(), a.data_type());
    if a.total_elements() > 0 {
        result.set_data(a.data().add(b.data())?)?;
    }
    Ok(result)
}

/// Pointwise addition of a scalar literal, parsed in the operand's type.
pub fn add_scalar(a: &Tensor, scalar: &str) -> TensorDbResult<Tensor> {
    let mut result = Tensor::new("add_scalar_result", a.shape().to_vec(), a.data_type());
    if a.total_elements() == 0 {
        // A malformed scalar fails even when there is nothing to add to.
        parse_scalar_checked(a.data_type(), scalar)?;
        return Ok(result);
    }

    let summed = match a.data() {
        TypedBuffer::F32(v) => {
            let s = parse_literal::<f32>(scalar, DataType::Float32)?;
            TypedBuffer::F32(v.iter().map(|x| x + s).collect())
        }
        TypedBuffer::F64(v) => {
            let s = parse_literal::<f64>(scalar, DataType::Float64)?;
            TypedBuffer::F64(v.iter().map(|x| x + s).collect())
        }
        TypedBuffer::I32(v) => {
            let s = parse_literal::<i32>(scalar, DataType::Int32)?;
            TypedBuffer::I32(v.iter().map(|x| x + s).collect())
        }
        TypedBuffer::I64(v) => {
            let s = parse_literal::<i64>(scalar, DataType::Int64)?;
            TypedBuffer::I64(v.iter().map(|x| x + s).collect())
        }
    };
    result.set_data(summed)?;
    Ok(result)
}

fn parse_scalar_checked(data_type: DataType, scalar: &str) -> TensorDbResult<()> {
    match data_type {
        DataType::Float32 => parse_literal::<f32>(scalar, data_type).map(|_| ()),
        DataType::Float64 => parse_literal::<f64>(scalar, data_type).map(|_| ()),
        DataType::Int32 => parse_literal::<i32>(scalar, data_type).map(|_| ()),
        DataType::Int64 => parse_literal::<i64>(scalar, data_type).map(|_| ()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tensor_f32(name: &str, shape: Vec<usize>, values: Vec<f32>) -> Tensor {
        let mut t = Tensor::new(name, shape, DataType::Float32);
        t.set_data(TypedBuffer::F32(values)).unwrap();
        t
    }

    #[test]
    fn test_add_tensors() {
        let a = tensor_f32("a", vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]);
        let b = tensor_f32("b", vec![2, 2], vec![10.0, 20.0, 30.0, 40.0]);
        let c = add_tensors(&a, &b).unwrap();
        assert_eq!(c.data(), &TypedBuffer::F32(vec![11.0, 22.0, 33.0, 44.0]));
        assert_eq!(c.shape(), &[2, 2]);
    }

    #[test]
    fn test_add_tensors_shape_mismatch() {
        let a = tensor_f32("a", vec![2, 2], vec![0.0; 4]);
        let b = tensor_f32("b", vec![4], vec![0.0; 4]);
        assert!(add_tensors(&a, &b).is_err());
    }

    #[test]
    fn test_add_tensors_type_mismatch() {
        let a = tensor_f32("a", vec![2], vec![0.0; 2]);
        let mut b = Tensor::new("b", vec![2], DataType::Float64);
        b.set_data(TypedBuffer::F64(vec![0.0; 2])).unwrap();
        assert!(matches!(
            add_tensors(&a, &b),
            Err(TensorDbError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_add_tensors_empty() {
        let a = Tensor::new("a", vec![0, 3], DataType::Int64);
        let b = Tensor::new("b", vec![0, 3], DataType::Int64);
        let c = add_tensors(&a, &b).unwrap();
        assert_eq!(c.total_elements(), 0);
        assert!(c.data().is_empty());
    }

    #[test]
    fn test_add_scalar_float() {
        let a = tensor_f32("a", vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]);
        let c = add_scalar(&a, "1.5").unwrap();
        assert_eq!(c.data(), &TypedBuffer::F32(vec![2.5, 3.5, 4.5, 5.5]));
    }

    #[test]
    fn test_add_scalar_int() {
        let mut a = Tensor::new("a", vec![3], DataType::Int64);
        a.set_data(TypedBuffer::I64(vec![1, 2, 3])).unwrap();
        let c = add_scalar(&a, "-1").unwrap();
        assert_eq!(c.data(), &TypedBuffer::I64(vec![0, 1, 2]));
    }

    #[test]
    fn test_add_scalar_zero_is_identity() {
        let a = tensor_f32("a", vec![2], vec![1.25, -7.5]);
        let c = add_scalar(&a, "0").unwrap();
        assert_eq!(c.data(), a.data());
    }

    #[test]
    fn test_add_scalar_bad_literal() {
        let mut a = Tensor::new("a", vec![1], DataType::Int32);
        a.set_data(TypedBuffer::I32(vec![1])).unwrap();
        let err = add_scalar(&a, "2.5").unwrap_err();
        assert!(matches!(err, TensorDbError::ParseLiteral { .. }));
    }

    #[test]
    fn test_add_scalar_bad_literal_on_empty_tensor() {
        let a = Tensor::new("a", vec![0], DataType::Int32);
        assert!(add_scalar(&a, "oops").is_err());
    }
}
