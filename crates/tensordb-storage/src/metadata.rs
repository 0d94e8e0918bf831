//! The tensor metadata record and its on-disk text codec.
//!
//! A `.meta` file is newline-separated `key:value` pairs. Recognized keys
//! are `name`, `shape`, `datatype`, and `strides`; unknown keys are
//! ignored so older stores with extra annotations still load. Shapes and
//! strides are comma-separated decimal integers; the empty string encodes
//! the empty sequence (rank 0).

use serde::Serialize;
use tensordb_common::{shape, DataType, TensorDbError, TensorDbResult};
use tensordb_core::Tensor;

/// Persistent description of a tensor: everything except its elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TensorMetadata {
    /// Tensor name.
    pub name: String,
    /// Shape; empty for rank 0.
    pub shape: Vec<usize>,
    /// Element type.
    pub data_type: DataType,
    /// Row-major strides, in elements; same length as `shape`.
    pub strides: Vec<usize>,
}

impl TensorMetadata {
    /// Parses the contents of a `.meta` file.
    ///
    /// Missing `name`, `shape`, or `datatype` is fatal. Absent `strides`
    /// are recomputed from the shape. Blank lines are tolerated; unknown
    /// keys are skipped.
    pub fn parse(text: &str) -> TensorDbResult<Self> {
        let mut name = None;
        let mut shape_dims = None;
        let mut data_type = None;
        let mut strides = None;

        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                return Err(TensorDbError::corruption(format!(
                    "invalid metadata line '{line}'"
                )));
            };
            let value = value.trim();
            match key {
                "name" => name = Some(value.to_string()),
                "shape" => shape_dims = Some(parse_dims(value)?),
                "datatype" => data_type = Some(value.parse::<DataType>()?),
                "strides" => strides = Some(parse_dims(value)?),
                _ => {}
            }
        }

        let (Some(name), Some(shape_dims), Some(data_type)) = (name, shape_dims, data_type)
        else {
            return Err(TensorDbError::corruption(
                "incomplete metadata: name, shape, or datatype missing",
            ));
        };
        if name.is_empty() {
            return Err(TensorDbError::corruption("metadata name is empty"));
        }

        let strides = match strides {
            Some(s) if s.len() == shape_dims.len() => s,
            Some(s) => {
                return Err(TensorDbError::corruption(format!(
                    "strides rank {} does not match shape rank {} for tensor '{}'",
                    s.len(),
                    shape_dims.len(),
                    name
                )));
            }
            None => shape::compute_strides(&shape_dims),
        };

        Ok(Self {
            name,
            shape: shape_dims,
            data_type,
            strides,
        })
    }

    /// Encodes this record in the `.meta` file format.
    #[must_use]
    pub fn encode(&self) -> String {
        format!(
            "name:{}\nshape:{}\ndatatype:{}\nstrides:{}\n",
            self.name,
            dims_to_string(&self.shape),
            self.data_type,
            dims_to_string(&self.strides)
        )
    }

    /// Returns the number of dimensions.
    ///
    /// This is always the shape length: a shape of `[0]` (written by older
    /// stores for scalars) counts as a zero-element rank-1 tensor, not a
    /// scalar.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Returns the total number of elements implied by the shape.
    #[must_use]
    pub fn total_elements(&self) -> usize {
        shape::total_elements(&self.shape)
    }
}

impl From<&Tensor> for TensorMetadata {
    fn from(t: &Tensor) -> Self {
        Self {
            name: t.name().to_string(),
            shape: t.shape().to_vec(),
            data_type: t.data_type(),
            strides: t.strides().to_vec(),
        }
    }
}

fn parse_dims(value: &str) -> TensorDbResult<Vec<usize>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(Vec::new());
    }
    value
        .split(',')
        .map(|part| {
            part.trim().parse::<usize>().map_err(|_| {
                TensorDbError::corruption(format!(
                    "invalid dimension '{}' in '{}'",
                    part.trim(),
                    value
                ))
            })
        })
        .collect()
}

fn dims_to_string(dims: &[usize]) -> String {
    dims.iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_parse_round_trip() {
        let meta = TensorMetadata {
            name: "weights".to_string(),
            shape: vec![2, 3],
            data_type: DataType::Float32,
            strides: vec![3, 1],
        };
        let text = meta.encode();
        assert_eq!(text, "name:weights\nshape:2,3\ndatatype:float32\nstrides:3,1\n");
        assert_eq!(TensorMetadata::parse(&text).unwrap(), meta);
    }

    #[test]
    fn test_scalar_round_trip() {
        let meta = TensorMetadata {
            name: "s".to_string(),
            shape: vec![],
            data_type: DataType::Int64,
            strides: vec![],
        };
        let text = meta.encode();
        assert_eq!(text, "name:s\nshape:\ndatatype:int64\nstrides:\n");
        let back = TensorMetadata::parse(&text).unwrap();
        assert_eq!(back.rank(), 0);
        assert_eq!(back.total_elements(), 1);
    }

    #[test]
    fn test_strides_recomputed_when_absent() {
        let meta =
            TensorMetadata::parse("name:t\nshape:4,5\ndatatype:float64\n").unwrap();
        assert_eq!(meta.strides, vec![5, 1]);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let text = "name:t\nshape:2\ndatatype:int32\nstrides:1\ncomment:hello\n";
        let meta = TensorMetadata::parse(text).unwrap();
        assert_eq!(meta.name, "t");
    }

    #[test]
    fn test_blank_lines_tolerated() {
        let text = "name:t\n\nshape:2\n\ndatatype:int32\n";
        assert!(TensorMetadata::parse(text).is_ok());
    }

    #[test]
    fn test_values_trimmed() {
        let meta = TensorMetadata::parse("name: t \nshape: 2 , 3 \ndatatype: int32\n").unwrap();
        assert_eq!(meta.name, "t");
        assert_eq!(meta.shape, vec![2, 3]);
    }

    #[test]
    fn test_missing_required_key_fatal() {
        assert!(TensorMetadata::parse("name:t\nshape:2\n").is_err());
        assert!(TensorMetadata::parse("shape:2\ndatatype:int32\n").is_err());
        assert!(TensorMetadata::parse("name:t\ndatatype:int32\n").is_err());
    }

    #[test]
    fn test_bad_dimension_rejected() {
        let err = TensorMetadata::parse("name:t\nshape:2,x\ndatatype:int32\n").unwrap_err();
        assert!(matches!(err, TensorDbError::Corruption { .. }));
    }

    #[test]
    fn test_unknown_datatype_rejected() {
        let err = TensorMetadata::parse("name:t\nshape:2\ndatatype:float16\n").unwrap_err();
        assert!(matches!(err, TensorDbError::UnknownType { .. }));
    }

    #[test]
    fn test_legacy_zero_shape_is_rank_one() {
        // Older stores wrote `shape:0` for scalars; it reloads as a
        // zero-element rank-1 tensor.
        let meta = TensorMetadata::parse("name:old\nshape:0\ndatatype:float64\n").unwrap();
        assert_eq!(meta.rank(), 1);
        assert_eq!(meta.total_elements(), 0);
        assert_eq!(meta.strides, vec![0]);
    }

    #[test]
    fn test_from_tensor() {
        let t = Tensor::new("t", vec![3, 2], DataType::Int32);
        let meta = TensorMetadata::from(&t);
        assert_eq!(meta.shape, vec![3, 2]);
        assert_eq!(meta.strides, vec![2, 1]);
        assert_eq!(meta.data_type, DataType::Int32);
    }
}
