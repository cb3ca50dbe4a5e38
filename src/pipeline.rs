//! Pipeline Orchestration
//!
//! The run-scoped entry point that wires the stages together:
//! load -> tokenize -> embed -> persist matrix/index -> k-NN -> edge
//! filter -> graph JSON. One deterministic batch pass, no shared mutable
//! state across stages; re-running on unchanged input and configuration
//! with a deterministic provider reproduces the output byte for byte.
//!
//! Configuration is an explicit record handed to [`run`], never ambient
//! state, so tests can run pipelines in parallel with different settings.

use crate::artifacts;
use crate::embed::{canonical_model_id, EmbeddingProvider};
use crate::error::{NotegraphError, Result};
use crate::filter::EdgeFilter;
use crate::graph::{GraphNode, NoteGraph};
use crate::knn::nearest_neighbors;
use crate::loader::load_notes;
use crate::tokenize::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{info, warn};

/// Full pipeline configuration, all fields override-able
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory containing markdown notes
    pub notes_dir: PathBuf,
    /// Graph JSON output path
    pub graph_path: PathBuf,
    /// Embedding matrix output path
    pub matrix_path: PathBuf,
    /// Embedding metadata index output path
    pub index_path: PathBuf,
    /// Embedding model identifier (mock, openai/<model>, ollama/<model>)
    pub model: String,
    /// Nearest neighbors kept per note
    pub top_k: usize,
    /// Cosine similarity threshold for an edge
    pub min_sim: f32,
    /// Lexical Jaccard overlap threshold for an edge
    pub min_jaccard: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            notes_dir: PathBuf::from("content"),
            graph_path: PathBuf::from("static/data/notes_graph.json"),
            matrix_path: PathBuf::from("static/data/embeddings.bin"),
            index_path: PathBuf::from("static/data/embeddings_index.json"),
            model: "ollama/nomic-embed-text".to_string(),
            top_k: 10,
            min_sim: 0.25,
            min_jaccard: 0.05,
        }
    }
}

impl PipelineConfig {
    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(NotegraphError::InvalidConfig("top-k must be at least 1".into()));
        }
        if !self.min_sim.is_finite() {
            return Err(NotegraphError::InvalidConfig("min-sim must be finite".into()));
        }
        if !self.min_jaccard.is_finite() {
            return Err(NotegraphError::InvalidConfig("min-jaccard must be finite".into()));
        }
        Ok(())
    }

    fn edge_filter(&self) -> EdgeFilter {
        EdgeFilter { min_sim: self.min_sim, min_jaccard: self.min_jaccard }
    }
}

/// What a pipeline run produced, for logging and assertions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Notes loaded into the graph
    pub notes: usize,
    /// Files skipped because they could not be read
    pub skipped: usize,
    /// Embedding dimensionality
    pub dimensions: usize,
    /// Edges admitted by the filter
    pub edges: usize,
}

impl RunSummary {
    fn empty() -> Self {
        Self { notes: 0, skipped: 0, dimensions: 0, edges: 0 }
    }
}

/// Run the full pipeline.
///
/// An empty corpus is not an error: the run logs a warning, writes nothing,
/// and returns a zero summary. A missing notes directory is fatal.
pub async fn run(config: &PipelineConfig, provider: &dyn EmbeddingProvider) -> Result<RunSummary> {
    config.validate()?;

    let loaded = load_notes(&config.notes_dir)?;
    if loaded.skipped > 0 {
        warn!(skipped = loaded.skipped, "some notes could not be read");
    }
    if loaded.notes.is_empty() {
        warn!(dir = %config.notes_dir.display(), "no markdown notes found, nothing to do");
        return Ok(RunSummary::empty());
    }
    info!(count = loaded.notes.len(), "notes loaded");

    let token_sets: Vec<HashSet<String>> =
        loaded.notes.iter().map(|n| tokenize(&n.body)).collect();

    info!(provider = provider.name(), model = provider.model_id(), "embedding corpus");
    let texts: Vec<String> = loaded.notes.iter().map(|n| n.body.clone()).collect();
    let vectors = provider.embed_batch(texts).await?;
    if vectors.len() != loaded.notes.len() {
        return Err(NotegraphError::Embedding(format!(
            "provider returned {} rows for {} notes",
            vectors.len(),
            loaded.notes.len()
        )));
    }
    let dims = vectors[0].len();
    for row in &vectors {
        if row.len() != dims {
            return Err(NotegraphError::DimensionMismatch { expected: dims, got: row.len() });
        }
    }

    // Persist embeddings before graph construction so a failed filter run
    // still leaves reusable artifacts behind.
    let index: Vec<_> = loaded.notes.iter().map(|n| n.meta.clone()).collect();
    artifacts::write_matrix(&config.matrix_path, &vectors)?;
    artifacts::write_index(&config.index_path, &index)?;
    info!(path = %config.matrix_path.display(), rows = vectors.len(), dims, "embeddings saved");

    let neighbors = nearest_neighbors(&vectors, config.top_k);
    let edges = config.edge_filter().collect_edges(&neighbors, &token_sets);

    let graph = NoteGraph::build(&loaded.notes, edges, provider.model_id());
    artifacts::write_graph(&config.graph_path, &graph)?;
    info!(
        path = %config.graph_path.display(),
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "graph written"
    );

    Ok(RunSummary {
        notes: graph.nodes.len(),
        skipped: loaded.skipped,
        dimensions: dims,
        edges: graph.edges.len(),
    })
}

/// Rebuild the graph from saved artifacts under the current thresholds.
///
/// Reuses the persisted embedding matrix and metadata index; only the
/// token sets are recomputed from the notes directory. Fails if the corpus
/// no longer matches the saved matrix row count.
pub fn refilter(config: &PipelineConfig) -> Result<RunSummary> {
    config.validate()?;

    let vectors = artifacts::read_matrix(&config.matrix_path)?;
    let index = artifacts::read_index(&config.index_path)?;
    if vectors.len() != index.len() {
        return Err(NotegraphError::InvalidMatrix(format!(
            "matrix has {} rows but index has {} entries",
            vectors.len(),
            index.len()
        )));
    }

    let loaded = load_notes(&config.notes_dir)?;
    if loaded.notes.len() != vectors.len() {
        return Err(NotegraphError::DimensionMismatch {
            expected: vectors.len(),
            got: loaded.notes.len(),
        });
    }
    let token_sets: Vec<HashSet<String>> =
        loaded.notes.iter().map(|n| tokenize(&n.body)).collect();

    let neighbors = nearest_neighbors(&vectors, config.top_k);
    let edges = config.edge_filter().collect_edges(&neighbors, &token_sets);

    // Node metadata comes from the saved index, matching the matrix rows.
    let nodes: Vec<GraphNode> = index
        .iter()
        .enumerate()
        .map(|(id, meta)| GraphNode {
            id,
            path: meta.path.clone(),
            title: meta.title.clone(),
            group: meta.group.clone(),
        })
        .collect();
    let dims = vectors.first().map(|v| v.len()).unwrap_or(0);
    let graph = NoteGraph {
        nodes,
        edges,
        embedding_model: canonical_model_id(&config.model),
    };
    artifacts::write_graph(&config.graph_path, &graph)?;
    info!(
        path = %config.graph_path.display(),
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "graph rebuilt from saved embeddings"
    );

    Ok(RunSummary {
        notes: graph.nodes.len(),
        skipped: loaded.skipped,
        dimensions: dims,
        edges: graph.edges.len(),
    })
}
