//! Notegraph CLI - build semantic similarity graphs from markdown notes

use clap::{Args, Parser, Subcommand};
use notegraph::embed::provider_for;
use notegraph::pipeline::{self, PipelineConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "notegraph")]
#[command(author, version, about = "Semantic similarity graph builder for markdown notes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConfigArgs {
    /// Directory containing markdown notes
    #[arg(long, default_value = "content")]
    notes_dir: PathBuf,

    /// Graph JSON output path
    #[arg(long, default_value = "static/data/notes_graph.json")]
    output_json: PathBuf,

    /// Embedding matrix output path
    #[arg(long, default_value = "static/data/embeddings.bin")]
    embedding_file: PathBuf,

    /// Embedding metadata index output path
    #[arg(long, default_value = "static/data/embeddings_index.json")]
    index_file: PathBuf,

    /// Embedding model (mock, mock/<dims>, openai/<model>, ollama/<model>)
    #[arg(long, default_value = "ollama/nomic-embed-text")]
    model: String,

    /// Nearest neighbors per note to keep
    #[arg(long, default_value = "10")]
    top_k: usize,

    /// Cosine similarity threshold for an edge
    #[arg(long, default_value = "0.25")]
    min_sim: f32,

    /// Lexical token-overlap (Jaccard) threshold for an edge
    #[arg(long, default_value = "0.05")]
    min_jaccard: f32,
}

impl ConfigArgs {
    fn into_config(self) -> PipelineConfig {
        PipelineConfig {
            notes_dir: self.notes_dir,
            graph_path: self.output_json,
            matrix_path: self.embedding_file,
            index_path: self.index_file,
            model: self.model,
            top_k: self.top_k,
            min_sim: self.min_sim,
            min_jaccard: self.min_jaccard,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Embed the corpus and build the similarity graph
    Build {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Rebuild the graph from saved embeddings with new thresholds
    Refilter {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Build { config } => {
            let config = config.into_config();
            match provider_for(&config.model) {
                Ok(provider) => pipeline::run(&config, provider.as_ref()).await,
                Err(e) => Err(e),
            }
        }
        Commands::Refilter { config } => pipeline::refilter(&config.into_config()),
    };

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
