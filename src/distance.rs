//! Distance Functions for Vector Similarity
//!
//! Scalar cosine math backing the neighbor index. All embedding vectors in
//! this crate are unit-normalized before they reach the index, so cosine
//! distance reduces to `1 - dot(a, b)`.
//!
//! # Example
//!
//! ```
//! use notegraph::distance::{cosine_distance_normalized, normalized};
//!
//! let a = normalized(&[1.0, 0.0]);
//! let b = normalized(&[0.0, 1.0]);
//!
//! // Orthogonal vectors have cosine distance of 1.0
//! let dist = cosine_distance_normalized(&a, &b);
//! assert!((dist - 1.0).abs() < 1e-6);
//! ```

/// Compute dot product of two vectors
///
/// # Panics
/// Panics if `a` and `b` have different lengths.
#[inline]
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "vectors must have equal length for dot product");
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Compute cosine distance for pre-normalized vectors.
///
/// Assumes both vectors are unit-normalized (magnitude = 1) and computes
/// `1 - dot_product(a, b)`. Using this with non-normalized vectors will
/// produce incorrect results; normalize with [`normalize`] or
/// [`normalized`] first.
///
/// # Panics
/// Panics if `a` and `b` have different lengths.
#[inline]
pub fn cosine_distance_normalized(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "vectors must have equal length for cosine distance");
    1.0 - dot_product(a, b)
}

/// Normalize a vector in-place. Zero vectors are left untouched.
pub fn normalize(vector: &mut [f32]) {
    let norm = dot_product(vector, vector).sqrt();
    if norm > 0.0 {
        let inv_norm = 1.0 / norm;
        for x in vector.iter_mut() {
            *x *= inv_norm;
        }
    }
}

/// Normalize a vector, returning a new vector
pub fn normalized(vector: &[f32]) -> Vec<f32> {
    let mut result = vector.to_vec();
    normalize(&mut result);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_product() {
        let a = vec![1.0, 2.0, 3.0, 4.0];
        let b = vec![5.0, 6.0, 7.0, 8.0];
        assert!((dot_product(&a, &b) - 70.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize() {
        let mut v = vec![3.0, 4.0];
        normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_zero_vector() {
        let mut v = vec![0.0, 0.0, 0.0];
        normalize(&mut v);
        assert_eq!(v, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_cosine_distance_normalized() {
        let a = normalized(&[1.0, 0.0]);
        let b = normalized(&[0.0, 1.0]);
        assert!((cosine_distance_normalized(&a, &b) - 1.0).abs() < 1e-6);

        let c = normalized(&[1.0, 2.0, 3.0]);
        assert!(cosine_distance_normalized(&c, &c).abs() < 1e-5);
    }
}
