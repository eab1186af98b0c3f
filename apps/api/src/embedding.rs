//! Embedding Generator — deterministic text-to-vector mapping.
//!
//! Uses all-MiniLM-L6-v2 via the fastembed crate (ONNX runtime). The model
//! is loaded once at startup and carried in `AppState` as `Arc<dyn Embedder>`;
//! inference is read-only, so the shared instance needs no locking. Vectors
//! are only comparable when produced by the same model version.

use anyhow::{Context, Result};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

/// Trait seam for the embedding backend. Lets the pipelines (and their
/// tests) run against any vector source with stable dimensions.
pub trait Embedder: Send + Sync {
    /// Embeds a single input string into a fixed-dimension vector.
    /// Deterministic for a fixed model version and input.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Returns the embedding dimension.
    fn dimension(&self) -> usize;

    /// Returns the model name/identifier.
    fn model_name(&self) -> &str;
}

/// all-MiniLM-L6-v2 sentence embedder.
///
/// - Dimensions: 384
/// - Max tokens: 256
pub struct MiniLmEmbedder {
    model: TextEmbedding,
}

const MINILM_DIMENSION: usize = 384;
const MINILM_NAME: &str = "all-MiniLM-L6-v2";

impl MiniLmEmbedder {
    /// Loads the ONNX model. Called once per process lifetime, before the
    /// server starts accepting requests; there is no teardown.
    pub fn load() -> Result<Self> {
        let model = TextEmbedding::try_new(
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false),
        )
        .context("failed to load embedding model")?;
        Ok(Self { model })
    }
}

impl Embedder for MiniLmEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self
            .model
            .embed(vec![text], None)
            .context("embedding inference failed")?;
        vectors
            .pop()
            .context("embedding model returned no vector")
    }

    fn dimension(&self) -> usize {
        MINILM_DIMENSION
    }

    fn model_name(&self) -> &str {
        MINILM_NAME
    }
}
