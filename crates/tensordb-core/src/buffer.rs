//! The typed element buffer.
//!
//! [`TypedBuffer`] is the single sum type carrying tensor elements. It owns
//! a contiguous `Vec` of one of the four supported kinds and provides the
//! little-endian codec, literal parsing, and element-wise arithmetic the
//! rest of the system is built on.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::Serialize;
use tensordb_common::{DataType, TensorDbError, TensorDbResult};

/// A contiguous, typed element buffer.
///
/// The variant tag is the runtime form of the tensor's [`DataType`];
/// operations match on it once and run monomorphic loops inside.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedBuffer {
    /// 32-bit float elements.
    F32(Vec<f32>),
    /// 64-bit float elements.
    F64(Vec<f64>),
    /// 32-bit integer elements.
    I32(Vec<i32>),
    /// 64-bit integer elements.
    I64(Vec<i64>),
}

impl TypedBuffer {
    /// Creates a zero-initialized buffer of `len` elements of `data_type`.
    #[must_use]
    pub fn zeroed(data_type: DataType, len: usize) -> Self {
        match data_type {
            DataType::Float32 => TypedBuffer::F32(vec![0.0; len]),
            DataType::Float64 => TypedBuffer::F64(vec![0.0; len]),
            DataType::Int32 => TypedBuffer::I32(vec![0; len]),
            DataType::Int64 => TypedBuffer::I64(vec![0; len]),
        }
    }

    /// Creates an empty buffer of `data_type`.
    #[must_use]
    pub fn empty(data_type: DataType) -> Self {
        Self::zeroed(data_type, 0)
    }

    /// Returns the element kind of this buffer.
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        match self {
            TypedBuffer::F32(_) => DataType::Float32,
            TypedBuffer::F64(_) => DataType::Float64,
            TypedBuffer::I32(_) => DataType::Int32,
            TypedBuffer::I64(_) => DataType::Int64,
        }
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            TypedBuffer::F32(v) => v.len(),
            TypedBuffer::F64(v) => v.len(),
            TypedBuffer::I32(v) => v.len(),
            TypedBuffer::I64(v) => v.len(),
        }
    }

    /// Returns true if the buffer holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the size of this buffer's contents in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.len() * self.data_type().element_size()
    }

    // =========================================================================
    // Little-endian codec
    // =========================================================================

    /// Decodes exactly `count` little-endian elements of `data_type` from
    /// the front of `src`.
    ///
    /// Fails with [`TensorDbError::ShortBuffer`] when `src` holds fewer than
    /// `count * element_size` bytes. Trailing bytes are ignored.
    pub fn from_le_bytes(
        data_type: DataType,
        src: &[u8],
        count: usize,
    ) -> TensorDbResult<Self> {
        let needed = count * data_type.element_size();
        if src.len() < needed {
            return Err(TensorDbError::ShortBuffer {
                needed,
                available: src.len(),
            });
        }
        let mut buf = &src[..needed];
        Ok(match data_type {
            DataType::Float32 => {
                TypedBuffer::F32((0..count).map(|_| buf.get_f32_le()).collect())
            }
            DataType::Float64 => {
                TypedBuffer::F64((0..count).map(|_| buf.get_f64_le()).collect())
            }
            DataType::Int32 => TypedBuffer::I32((0..count).map(|_| buf.get_i32_le()).collect()),
            DataType::Int64 => TypedBuffer::I64((0..count).map(|_| buf.get_i64_le()).collect()),
        })
    }

    /// Encodes the buffer as contiguous little-endian bytes.
    #[must_use]
    pub fn to_le_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.size_bytes());
        match self {
            TypedBuffer::F32(v) => v.iter().for_each(|x| buf.put_f32_le(*x)),
            TypedBuffer::F64(v) => v.iter().for_each(|x| buf.put_f64_le(*x)),
            TypedBuffer::I32(v) => v.iter().for_each(|x| buf.put_i32_le(*x)),
            TypedBuffer::I64(v) => v.iter().for_each(|x| buf.put_i64_le(*x)),
        }
        buf.freeze()
    }

    // =========================================================================
    // Literal parsing
    // =========================================================================

    /// Parses textual literals into a buffer of `data_type`.
    ///
    /// Integer kinds take decimal integers; float kinds take decimal floats
    /// with an optional exponent. The first failing literal aborts the parse.
    pub fn from_literals(data_type: DataType, literals: &[String]) -> TensorDbResult<Self> {
        Ok(match data_type {
            DataType::Float32 => TypedBuffer::F32(
                literals
                    .iter()
                    .map(|s| parse_literal::<f32>(s, data_type))
                    .collect::<TensorDbResult<_>>()?,
            ),
            DataType::Float64 => TypedBuffer::F64(
                literals
                    .iter()
                    .map(|s| parse_literal::<f64>(s, data_type))
                    .collect::<TensorDbResult<_>>()?,
            ),
            DataType::Int32 => TypedBuffer::I32(
                literals
                    .iter()
                    .map(|s| parse_literal::<i32>(s, data_type))
                    .collect::<TensorDbResult<_>>()?,
            ),
            DataType::Int64 => TypedBuffer::I64(
                literals
                    .iter()
                    .map(|s| parse_literal::<i64>(s, data_type))
                    .collect::<TensorDbResult<_>>()?,
            ),
        })
    }

    // =========================================================================
    // Arithmetic
    // =========================================================================

    /// Element-wise sum of two buffers of the same kind and length.
    pub fn add(&self, other: &TypedBuffer) -> TensorDbResult<TypedBuffer> {
        match (self, other) {
            (TypedBuffer::F32(a), TypedBuffer::F32(b)) => {
                Ok(TypedBuffer::F32(a.iter().zip(b).map(|(x, y)| x + y).collect()))
            }
            (TypedBuffer::F64(a), TypedBuffer::F64(b)) => {
                Ok(TypedBuffer::F64(a.iter().zip(b).map(|(x, y)| x + y).collect()))
            }
            (TypedBuffer::I32(a), TypedBuffer::I32(b)) => {
                Ok(TypedBuffer::I32(a.iter().zip(b).map(|(x, y)| x + y).collect()))
            }
            (TypedBuffer::I64(a), TypedBuffer::I64(b)) => {
                Ok(TypedBuffer::I64(a.iter().zip(b).map(|(x, y)| x + y).collect()))
            }
            _ => Err(TensorDbError::TypeMismatch {
                expected: self.data_type().to_string(),
                actual: other.data_type().to_string(),
            }),
        }
    }

    /// Copies the half-open element window `[start, end)` into a new buffer.
    ///
    /// # Panics
    ///
    /// Panics if `start > end` or `end > self.len()`.
    #[must_use]
    pub fn window(&self, start: usize, end: usize) -> TypedBuffer {
        match self {
            TypedBuffer::F32(v) => TypedBuffer::F32(v[start..end].to_vec()),
            TypedBuffer::F64(v) => TypedBuffer::F64(v[start..end].to_vec()),
            TypedBuffer::I32(v) => TypedBuffer::I32(v[start..end].to_vec()),
            TypedBuffer::I64(v) => TypedBuffer::I64(v[start..end].to_vec()),
        }
    }

    /// Returns the elements as `f32`s, if that is this buffer's kind.
    #[must_use]
    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            TypedBuffer::F32(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the elements as `f64`s, if that is this buffer's kind.
    #[must_use]
    pub fn as_f64(&self) -> Option<&[f64]> {
        match self {
            TypedBuffer::F64(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the elements as `i32`s, if that is this buffer's kind.
    #[must_use]
    pub fn as_i32(&self) -> Option<&[i32]> {
        match self {
            TypedBuffer::I32(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the elements as `i64`s, if that is this buffer's kind.
    #[must_use]
    pub fn as_i64(&self) -> Option<&[i64]> {
        match self {
            TypedBuffer::I64(v) => Some(v),
            _ => None,
        }
    }

    /// Returns element `i` as a JSON leaf value.
    ///
    /// Non-finite floats render as `null`, which mirrors what they would
    /// become on a JSON wire anyway.
    #[must_use]
    pub fn json_leaf(&self, i: usize) -> serde_json::Value {
        match self {
            TypedBuffer::F32(v) => float_leaf(f64::from(v[i])),
            TypedBuffer::F64(v) => float_leaf(v[i]),
            TypedBuffer::I32(v) => serde_json::Value::from(v[i]),
            TypedBuffer::I64(v) => serde_json::Value::from(v[i]),
        }
    }
}

fn float_leaf(value: f64) -> serde_json::Value {
    serde_json::Number::from_f64(value)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

/// Parses one literal, reporting the target type on failure.
pub(crate) fn parse_literal<T: std::str::FromStr>(
    literal: &str,
    target: DataType,
) -> TensorDbResult<T> {
    literal.parse().map_err(|_| TensorDbError::ParseLiteral {
        literal: literal.to_string(),
        target: target.to_string(),
    })
}
