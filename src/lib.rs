//! # Notegraph - Semantic Similarity Graph Builder
//!
//! Notegraph scans a directory of markdown notes, embeds each note with a
//! pluggable embedding provider, finds every note's nearest neighbors in
//! vector space, and writes a JSON knowledge graph (nodes = notes, edges =
//! similarity links) for a visualization front-end.
//!
//! Edges must clear a dual threshold: cosine similarity between embeddings
//! AND lexical Jaccard overlap between token sets. Requiring shared
//! vocabulary on top of embedding proximity suppresses the false positives
//! embedding models produce for topically unrelated texts.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use notegraph::embed::{MockConfig, MockProvider};
//! use notegraph::pipeline::{self, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> notegraph::Result<()> {
//!     let config = PipelineConfig {
//!         notes_dir: "content".into(),
//!         ..Default::default()
//!     };
//!     let provider = MockProvider::new(MockConfig::new(384));
//!     let summary = pipeline::run(&config, &provider).await?;
//!     println!("{} notes, {} edges", summary.notes, summary.edges);
//!     Ok(())
//! }
//! ```
//!
//! ## Artifacts
//!
//! Each run writes three files: the graph JSON, the raw embedding matrix,
//! and a metadata index with one entry per matrix row. The matrix and
//! index let [`pipeline::refilter`] rebuild the graph under different
//! thresholds without recomputing embeddings.

#![warn(missing_docs)]

pub mod artifacts;
pub mod distance;
pub mod embed;
pub mod error;
pub mod filter;
pub mod graph;
pub mod knn;
pub mod loader;
pub mod pipeline;
pub mod tokenize;

pub use embed::EmbeddingProvider;
pub use error::{NotegraphError, Result};
pub use filter::EdgeFilter;
pub use graph::{GraphEdge, GraphNode, NoteGraph};
pub use loader::{Note, NoteMeta};
pub use pipeline::{PipelineConfig, RunSummary};
