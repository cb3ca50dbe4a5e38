//! Embedding Providers
//!
//! Abstraction over the embedding model: the pipeline only sees an opaque
//! `texts -> matrix` capability, so models and providers can be swapped
//! without touching graph construction. Ships a deterministic mock provider
//! for tests and offline runs, plus OpenAI and Ollama HTTP providers.
//!
//! All providers return unit-normalized rows; the neighbor index relies on
//! that to use the fast normalized cosine distance.
//!
//! # Example
//!
//! ```rust,no_run
//! use notegraph::embed::{EmbeddingProvider, MockProvider, MockConfig};
//!
//! #[tokio::main]
//! async fn main() -> notegraph::Result<()> {
//!     let provider = MockProvider::new(MockConfig::new(384));
//!     let rows = provider.embed_batch(vec!["hello".into()]).await?;
//!     assert_eq!(rows[0].len(), 384);
//!     Ok(())
//! }
//! ```

use crate::distance::normalize;
use crate::error::{NotegraphError, Result};
use async_trait::async_trait;
use std::hash::{Hash, Hasher};
use std::time::Duration;

/// Trait for embedding providers
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Provider name for logging and provenance
    fn name(&self) -> &str;

    /// Model identifier recorded in the output graph
    fn model_id(&self) -> &str;

    /// Output vector dimensionality
    fn dimensions(&self) -> usize;

    /// Embed a batch of texts, one unit-normalized row per input, in input
    /// order. A failure is fatal to the run; any retry policy lives inside
    /// the provider, never in the pipeline.
    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;
}

/// Select a provider from a model identifier string.
///
/// - `mock` or `mock/<dims>` — deterministic offline provider
/// - `openai/<model>` — OpenAI embeddings API (key from `OPENAI_API_KEY`)
/// - `ollama/<model>` — local Ollama instance
pub fn provider_for(model_id: &str) -> Result<Box<dyn EmbeddingProvider>> {
    match model_id.split_once('/') {
        None if model_id == "mock" => Ok(Box::new(MockProvider::new(MockConfig::default()))),
        Some(("mock", dims)) => {
            let dims: usize = dims
                .parse()
                .map_err(|_| NotegraphError::InvalidConfig(format!("bad mock dimensions: {dims}")))?;
            Ok(Box::new(MockProvider::new(MockConfig::new(dims))))
        }
        Some(("openai", model)) => {
            let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
                NotegraphError::InvalidConfig("OPENAI_API_KEY not set".to_string())
            })?;
            Ok(Box::new(OpenAIProvider::new(OpenAIConfig::new(api_key).with_model(model))))
        }
        Some(("ollama", model)) => Ok(Box::new(OllamaProvider::new(
            OllamaConfig::default().with_model(model),
        ))),
        _ => Err(NotegraphError::InvalidConfig(format!(
            "unknown embedding model '{model_id}' (expected mock, openai/<model>, or ollama/<model>)"
        ))),
    }
}

/// Canonical form of a model identifier, as recorded in graph provenance.
///
/// Providers report fully-qualified ids (the mock includes its
/// dimensionality), so a graph rebuilt from saved artifacts must expand
/// shorthand the same way to keep provenance identical across both paths.
pub fn canonical_model_id(model_id: &str) -> String {
    if model_id == "mock" {
        format!("mock/{}", MockConfig::default().dimensions)
    } else {
        model_id.to_string()
    }
}

// ============================================================================
// Mock Provider
// ============================================================================

/// Mock provider configuration for tests and offline dry runs
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Output vector dimensionality
    pub dimensions: usize,
    /// Mixed into the text hash so corpora can be re-rolled
    pub seed: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self { dimensions: 384, seed: 42 }
    }
}

impl MockConfig {
    /// Config with the given dimensionality and the default seed
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, ..Default::default() }
    }
}

/// Deterministic embedding provider: vectors are seeded from a hash of the
/// input text, so identical texts always map to identical unit vectors.
pub struct MockProvider {
    config: MockConfig,
    model_id: String,
}

impl MockProvider {
    /// Create a mock provider for the given config
    pub fn new(config: MockConfig) -> Self {
        let model_id = format!("mock/{}", config.dimensions);
        Self { config, model_id }
    }

    fn generate_embedding(&self, text: &str) -> Vec<f32> {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        text.hash(&mut hasher);
        let mut state = hasher.finish().wrapping_add(self.config.seed);

        let mut emb = Vec::with_capacity(self.config.dimensions);
        for _ in 0..self.config.dimensions {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            emb.push(((state >> 33) as f32) / (u32::MAX as f32) * 2.0 - 1.0);
        }
        normalize(&mut emb);
        emb
    }
}

#[async_trait]
impl EmbeddingProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.generate_embedding(t)).collect())
    }
}

// ============================================================================
// OpenAI Provider
// ============================================================================

/// OpenAI provider configuration
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// Bearer token for the embeddings API
    pub api_key: String,
    /// Embedding model name
    pub model: String,
    /// API base URL
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Expected output dimensionality
    pub dimensions: usize,
}

impl OpenAIConfig {
    /// Config for the default model (`text-embedding-3-small`)
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: "text-embedding-3-small".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(60),
            dimensions: 1536,
        }
    }

    /// Override the model name
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the expected dimensionality
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self
    }
}

/// Embedding provider backed by the OpenAI embeddings API
pub struct OpenAIProvider {
    config: OpenAIConfig,
    model_id: String,
    client: reqwest::Client,
}

impl OpenAIProvider {
    /// Create a provider for the given config
    pub fn new(config: OpenAIConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();
        let model_id = format!("openai/{}", config.model);
        Self { config, model_id, client }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let body = serde_json::json!({ "model": self.config.model, "input": texts });

        let resp = self
            .client
            .post(format!("{}/embeddings", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| NotegraphError::Embedding(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(NotegraphError::Embedding(format!("openai returned {status}: {message}")));
        }

        let result: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| NotegraphError::Embedding(e.to_string()))?;

        let rows = result["data"]
            .as_array()
            .ok_or_else(|| NotegraphError::Embedding("missing 'data' in response".into()))?
            .iter()
            .map(|item| {
                item["embedding"]
                    .as_array()
                    .map(|arr| arr.iter().filter_map(|v| v.as_f64().map(|f| f as f32)).collect())
                    .ok_or_else(|| NotegraphError::Embedding("missing 'embedding' in response".into()))
            })
            .collect::<Result<Vec<Vec<f32>>>>()?;

        Ok(rows.into_iter().map(|mut row| {
            normalize(&mut row);
            row
        }).collect())
    }
}

// ============================================================================
// Ollama Provider
// ============================================================================

/// Ollama provider configuration (local inference)
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Embedding model name
    pub model: String,
    /// Local Ollama endpoint
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Expected output dimensionality
    pub dimensions: usize,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            model: "nomic-embed-text".into(),
            base_url: "http://localhost:11434".into(),
            timeout: Duration::from_secs(120),
            dimensions: 768,
        }
    }
}

impl OllamaConfig {
    /// Override the model name
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Embedding provider backed by a local Ollama instance
pub struct OllamaProvider {
    config: OllamaConfig,
    model_id: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Create a provider for the given config
    pub fn new(config: OllamaConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();
        let model_id = format!("ollama/{}", config.model);
        Self { config, model_id, client }
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let body = serde_json::json!({ "model": self.config.model, "prompt": text });
        let resp = self
            .client
            .post(format!("{}/api/embeddings", self.config.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| NotegraphError::Embedding(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(NotegraphError::Embedding(format!("ollama returned {status}: {message}")));
        }

        let result: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| NotegraphError::Embedding(e.to_string()))?;

        let mut row: Vec<f32> = result["embedding"]
            .as_array()
            .ok_or_else(|| NotegraphError::Embedding("missing 'embedding' in response".into()))?
            .iter()
            .filter_map(|v| v.as_f64().map(|f| f as f32))
            .collect();
        normalize(&mut row);
        Ok(row)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    // The Ollama embeddings endpoint is one prompt per request.
    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let mut rows = Vec::with_capacity(texts.len());
        for text in &texts {
            rows.push(self.embed_one(text).await?);
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::dot_product;

    #[tokio::test]
    async fn test_mock_provider_is_deterministic() {
        let p = MockProvider::new(MockConfig::new(64));
        let a = p.embed_batch(vec!["hello world".into()]).await.unwrap();
        let b = p.embed_batch(vec!["hello world".into()]).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_mock_provider_distinguishes_texts() {
        let p = MockProvider::new(MockConfig::new(64));
        let rows = p
            .embed_batch(vec!["kubernetes pods".into(), "banana bread recipe".into()])
            .await
            .unwrap();
        assert_ne!(rows[0], rows[1]);
    }

    #[tokio::test]
    async fn test_mock_provider_normalizes() {
        let p = MockProvider::new(MockConfig::new(128));
        let rows = p.embed_batch(vec!["some text".into()]).await.unwrap();
        let norm = dot_product(&rows[0], &rows[0]).sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
        assert_eq!(rows[0].len(), 128);
    }

    #[test]
    fn test_provider_for_mock() {
        let p = provider_for("mock").unwrap();
        assert_eq!(p.name(), "mock");
        assert_eq!(p.dimensions(), 384);
        assert_eq!(p.model_id(), "mock/384");

        let p = provider_for("mock/32").unwrap();
        assert_eq!(p.dimensions(), 32);
        assert_eq!(p.model_id(), "mock/32");
    }

    #[test]
    fn test_canonical_model_id_matches_provider_ids() {
        // Shorthand and fully-qualified ids resolve identically
        assert_eq!(canonical_model_id("mock"), provider_for("mock").unwrap().model_id());
        assert_eq!(canonical_model_id("mock/32"), "mock/32");
        assert_eq!(canonical_model_id("ollama/nomic-embed-text"), "ollama/nomic-embed-text");
    }

    #[test]
    fn test_provider_for_rejects_unknown() {
        assert!(provider_for("sentencepiece/whatever").is_err());
        assert!(provider_for("mock/not-a-number").is_err());
    }

    #[test]
    fn test_provider_for_ollama() {
        let p = provider_for("ollama/nomic-embed-text").unwrap();
        assert_eq!(p.name(), "ollama");
        assert_eq!(p.model_id(), "ollama/nomic-embed-text");
    }
}
