//! Exact Nearest-Neighbor Index
//!
//! Brute-force cosine k-NN over the full embedding matrix. Exact search is
//! the right tradeoff at note-collection scale (up to tens of thousands of
//! rows): no index build, no recall loss, and the scan parallelizes
//! trivially across query rows. An approximate index could be substituted
//! as long as the result ordering and self-inclusion contract below are
//! preserved.
//!
//! # Contract
//!
//! For each row `i`, the result holds `min(k + 1, N)` entries sorted
//! ascending by distance, with `i` itself always first at distance 0.
//! Callers must skip the self entry before using the neighbors.

use crate::distance::cosine_distance_normalized;
use ordered_float::OrderedFloat;
use rayon::prelude::*;

/// One neighbor candidate: matrix row index and cosine distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Row index of the neighbor in the embedding matrix
    pub index: usize,
    /// Cosine distance from the query row
    pub distance: f32,
}

/// Compute the `k` nearest neighbors of every vector, by cosine distance.
///
/// Vectors must be unit-normalized. Ties sort by index, so the output is
/// fully deterministic for a fixed input. With `N <= 1` each row contains
/// only its self entry.
pub fn nearest_neighbors(vectors: &[Vec<f32>], k: usize) -> Vec<Vec<Neighbor>> {
    let n = vectors.len();
    (0..n)
        .into_par_iter()
        .map(|i| {
            let mut candidates: Vec<Neighbor> = (0..n)
                .filter(|&j| j != i)
                .map(|j| Neighbor {
                    index: j,
                    distance: cosine_distance_normalized(&vectors[i], &vectors[j]),
                })
                .collect();
            candidates
                .sort_unstable_by_key(|c| (OrderedFloat(c.distance), c.index));
            candidates.truncate(k);

            // Self entry is forced at the front rather than recomputed, so
            // float round-off can never displace it.
            let mut row = Vec::with_capacity(candidates.len() + 1);
            row.push(Neighbor { index: i, distance: 0.0 });
            row.extend(candidates);
            row
        })
        .collect()
}
