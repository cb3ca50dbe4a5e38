//! Graph Data Model
//!
//! The serialized output consumed by the visualization front-end:
//! `{nodes, edges, embeddingModel}`. Nodes appear in note discovery order
//! and edges in filter scan order, so two runs on unchanged input produce
//! byte-identical JSON.

use crate::loader::Note;
use serde::{Deserialize, Serialize};

/// One graph node, carrying a note's display metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Note id (discovery order)
    pub id: usize,
    /// Source file path
    pub path: String,
    /// Display title
    pub title: String,
    /// Category derived from the storage path
    pub group: String,
}

/// One undirected similarity edge.
///
/// Invariants: `source < target` (canonical orientation, each unordered
/// pair at most once) and `score` is the cosine similarity rounded to four
/// decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Lower node id of the pair
    pub source: usize,
    /// Higher node id of the pair
    pub target: usize,
    /// Cosine similarity, rounded for serialization stability
    pub score: f32,
}

/// The complete similarity graph, tagged with the embedding model that
/// produced it for provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteGraph {
    /// All notes, in discovery order
    pub nodes: Vec<GraphNode>,
    /// Admitted similarity links, in filter scan order
    pub edges: Vec<GraphEdge>,
    /// Identifier of the embedding model that produced the graph
    #[serde(rename = "embeddingModel")]
    pub embedding_model: String,
}

impl NoteGraph {
    /// Assemble the graph from the full note list and the admitted edges.
    pub fn build(notes: &[Note], edges: Vec<GraphEdge>, embedding_model: impl Into<String>) -> Self {
        let nodes = notes
            .iter()
            .map(|note| GraphNode {
                id: note.id,
                path: note.meta.path.clone(),
                title: note.meta.title.clone(),
                group: note.meta.group.clone(),
            })
            .collect();
        Self {
            nodes,
            edges,
            embedding_model: embedding_model.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::NoteMeta;

    fn note(id: usize, title: &str) -> Note {
        Note {
            id,
            meta: NoteMeta {
                path: format!("content/{title}.md"),
                title: title.to_string(),
                group: "content".to_string(),
            },
            body: String::new(),
        }
    }

    #[test]
    fn test_build_preserves_node_order() {
        let notes = vec![note(0, "a"), note(1, "b"), note(2, "c")];
        let graph = NoteGraph::build(&notes, Vec::new(), "mock");
        let ids: Vec<_> = graph.nodes.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(graph.embedding_model, "mock");
    }

    #[test]
    fn test_json_field_names() {
        let graph = NoteGraph::build(&[note(0, "a")], vec![GraphEdge { source: 0, target: 1, score: 0.5 }], "m");
        let json = serde_json::to_value(&graph).unwrap();
        assert!(json.get("embeddingModel").is_some());
        assert_eq!(json["edges"][0]["source"], 0);
        assert_eq!(json["edges"][0]["target"], 1);
        assert_eq!(json["nodes"][0]["path"], "content/a.md");
    }
}
