//! Edge Admission
//!
//! The dual-threshold filter that turns neighbor candidates into graph
//! edges. A candidate pair must clear *both* the embedding similarity
//! threshold and the lexical Jaccard threshold: embedding models sometimes
//! place topically unrelated notes close together, and requiring shared
//! vocabulary suppresses those false positives. Keep both checks; this is
//! a precision-over-recall choice, not redundancy.

use crate::graph::GraphEdge;
use crate::knn::Neighbor;
use crate::tokenize::jaccard;
use std::collections::HashSet;

/// Number of decimal places kept in serialized edge scores
const SCORE_DECIMALS: i32 = 4;

/// Edge admission thresholds
#[derive(Debug, Clone, Copy)]
pub struct EdgeFilter {
    /// Minimum cosine similarity for an edge
    pub min_sim: f32,
    /// Minimum lexical Jaccard overlap for an edge
    pub min_jaccard: f32,
}

impl Default for EdgeFilter {
    fn default() -> Self {
        Self { min_sim: 0.25, min_jaccard: 0.05 }
    }
}

impl EdgeFilter {
    /// Admission rule: `sim >= min_sim && jaccard >= min_jaccard && i < j`.
    ///
    /// The `i < j` clause canonicalizes the undirected pair and
    /// deduplicates the symmetric case. Under asymmetric k-NN a pair found
    /// only from the higher-id side is dropped; that loss is documented,
    /// accepted behavior.
    pub fn admit(&self, i: usize, j: usize, sim: f32, jaccard: f32) -> bool {
        sim >= self.min_sim && jaccard >= self.min_jaccard && i < j
    }

    /// Walk every note's neighbor list (skipping the self entry) and
    /// collect the admitted edges, in scan order.
    pub fn collect_edges(
        &self,
        neighbors: &[Vec<Neighbor>],
        token_sets: &[HashSet<String>],
    ) -> Vec<GraphEdge> {
        debug_assert_eq!(neighbors.len(), token_sets.len());
        let mut edges = Vec::new();
        for (i, row) in neighbors.iter().enumerate() {
            for neighbor in row.iter().skip(1) {
                let j = neighbor.index;
                let sim = 1.0 - neighbor.distance;
                let overlap = jaccard(&token_sets[i], &token_sets[j]);
                if self.admit(i, j, sim, overlap) {
                    edges.push(GraphEdge {
                        source: i,
                        target: j,
                        score: round_score(sim),
                    });
                }
            }
        }
        edges
    }
}

/// Round a similarity to a fixed precision so serialized scores are stable
/// across runs and platforms.
fn round_score(sim: f32) -> f32 {
    let factor = 10f32.powi(SCORE_DECIMALS);
    (sim * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::tokenize;

    fn neighbor(index: usize, distance: f32) -> Neighbor {
        Neighbor { index, distance }
    }

    #[test]
    fn test_admit_requires_both_thresholds() {
        let f = EdgeFilter { min_sim: 0.5, min_jaccard: 0.1 };
        assert!(f.admit(0, 1, 0.6, 0.2));
        assert!(!f.admit(0, 1, 0.4, 0.2)); // sim too low
        assert!(!f.admit(0, 1, 0.6, 0.05)); // overlap too low
    }

    #[test]
    fn test_admit_canonical_orientation() {
        let f = EdgeFilter { min_sim: 0.0, min_jaccard: 0.0 };
        assert!(f.admit(0, 1, 1.0, 1.0));
        assert!(!f.admit(1, 0, 1.0, 1.0));
        assert!(!f.admit(1, 1, 1.0, 1.0));
    }

    #[test]
    fn test_impossible_similarity_threshold_admits_nothing() {
        let f = EdgeFilter { min_sim: 1.1, min_jaccard: 0.0 };
        assert!(!f.admit(0, 1, 1.0, 1.0));
    }

    #[test]
    fn test_collect_edges_skips_self_and_dedups() {
        let tokens = vec![
            tokenize("kubernetes cluster networking"),
            tokenize("kubernetes cluster storage"),
        ];
        // symmetric neighbor lists, self first
        let neighbors = vec![
            vec![neighbor(0, 0.0), neighbor(1, 0.1)],
            vec![neighbor(1, 0.0), neighbor(0, 0.1)],
        ];
        let f = EdgeFilter { min_sim: 0.25, min_jaccard: 0.05 };
        let edges = f.collect_edges(&neighbors, &tokens);
        assert_eq!(edges.len(), 1);
        assert_eq!((edges[0].source, edges[0].target), (0, 1));
        assert!((edges[0].score - 0.9).abs() < 1e-4);
    }

    #[test]
    fn test_collect_edges_requires_token_overlap() {
        let tokens = vec![
            tokenize("kubernetes cluster networking"),
            tokenize("banana bread recipe"),
        ];
        let neighbors = vec![
            vec![neighbor(0, 0.0), neighbor(1, 0.05)],
            vec![neighbor(1, 0.0), neighbor(0, 0.05)],
        ];
        // high similarity, zero shared vocabulary -> no edge
        let f = EdgeFilter::default();
        assert!(f.collect_edges(&neighbors, &tokens).is_empty());
    }

    #[test]
    fn test_raising_jaccard_never_adds_edges() {
        let tokens = vec![
            tokenize("alpha beta gamma delta"),
            tokenize("alpha beta gamma epsilon"),
            tokenize("alpha zeta eta theta"),
        ];
        let neighbors = vec![
            vec![neighbor(0, 0.0), neighbor(1, 0.1), neighbor(2, 0.3)],
            vec![neighbor(1, 0.0), neighbor(0, 0.1), neighbor(2, 0.35)],
            vec![neighbor(2, 0.0), neighbor(0, 0.3), neighbor(1, 0.35)],
        ];
        let mut prev = usize::MAX;
        for min_jaccard in [0.0, 0.2, 0.5, 0.9] {
            let f = EdgeFilter { min_sim: 0.0, min_jaccard };
            let count = f.collect_edges(&neighbors, &tokens).len();
            assert!(count <= prev, "edge count grew when threshold rose");
            prev = count;
        }
    }

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(0.123456), 0.1235);
        assert_eq!(round_score(1.0), 1.0);
    }
}
