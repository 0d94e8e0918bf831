//! Shape and stride arithmetic.
//!
//! Shapes are sequences of non-negative dimensions; rank 0 (the empty
//! shape) is the scalar case. Strides are expressed in elements, not bytes.

/// Returns the total number of elements implied by `shape`.
///
/// Rank 0 holds exactly one element; a shape containing any zero dimension
/// holds none.
#[must_use]
pub fn total_elements(shape: &[usize]) -> usize {
    if shape.is_empty() {
        return 1;
    }
    let mut total = 1usize;
    for &dim in shape {
        if dim == 0 {
            return 0;
        }
        total *= dim;
    }
    total
}

/// Computes row-major strides for `shape`, in elements.
///
/// The innermost stride is 1 and `strides[i] = strides[i + 1] * shape[i + 1]`.
/// Rank 0 yields the empty sequence; a shape with any zero dimension yields
/// all-zero strides.
#[must_use]
pub fn compute_strides(shape: &[usize]) -> Vec<usize> {
    if shape.is_empty() {
        return Vec::new();
    }
    let mut strides = vec![0usize; shape.len()];
    if total_elements(shape) == 0 {
        return strides;
    }
    strides[shape.len() - 1] = 1;
    for i in (0..shape.len() - 1).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_elements_scalar() {
        assert_eq!(total_elements(&[]), 1);
    }

    #[test]
    fn test_total_elements_basic() {
        assert_eq!(total_elements(&[2, 3]), 6);
        assert_eq!(total_elements(&[4]), 4);
        assert_eq!(total_elements(&[2, 3, 4]), 24);
    }

    #[test]
    fn test_total_elements_zero_dim() {
        assert_eq!(total_elements(&[0]), 0);
        assert_eq!(total_elements(&[0, 2]), 0);
        assert_eq!(total_elements(&[2, 0]), 0);
        assert_eq!(total_elements(&[3, 0, 5]), 0);
    }

    #[test]
    fn test_strides_scalar() {
        assert!(compute_strides(&[]).is_empty());
    }

    #[test]
    fn test_strides_basic() {
        assert_eq!(compute_strides(&[4]), vec![1]);
        assert_eq!(compute_strides(&[2, 3]), vec![3, 1]);
        assert_eq!(compute_strides(&[2, 3, 4]), vec![12, 4, 1]);
    }

    #[test]
    fn test_strides_zero_dim() {
        assert_eq!(compute_strides(&[0, 2]), vec![0, 0]);
        assert_eq!(compute_strides(&[2, 0]), vec![0, 0]);
    }

    #[test]
    fn test_stride_recurrence() {
        // strides[rank-1] == 1 and strides[i] == strides[i+1] * shape[i+1]
        // for every non-zero-dim shape.
        for shape in [vec![1], vec![7], vec![2, 5], vec![3, 4, 5], vec![2, 1, 6, 3]] {
            let strides = compute_strides(&shape);
            assert_eq!(strides[shape.len() - 1], 1);
            for i in 0..shape.len() - 1 {
                assert_eq!(strides[i], strides[i + 1] * shape[i + 1]);
            }
        }
    }
}
