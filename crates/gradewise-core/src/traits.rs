//! Capability traits for external providers.
//!
//! The grader and session driver only depend on these narrow contracts.
//! Concrete backends live in `gradewise-providers`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Embedding
// ---------------------------------------------------------------------------

/// Turns text into a fixed-length vector.
///
/// Implementations must return vectors of the same length for every call.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Human-readable provider name (e.g. "ollama").
    fn name(&self) -> &str;

    /// Vector length, when known up front.
    fn dimensions(&self) -> Option<usize> {
        None
    }

    /// Embed a single text.
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;

    /// Embed several texts, preserving order.
    ///
    /// Backends with a native batch endpoint should override this.
    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        futures::future::try_join_all(texts.iter().map(|t| self.embed(t))).await
    }
}

// ---------------------------------------------------------------------------
// Speech transcription
// ---------------------------------------------------------------------------

/// Turns recorded audio into text.
///
/// Implementations report "nothing recognized" as
/// [`ProviderError::Unrecognized`](crate::error::ProviderError::Unrecognized).
#[async_trait]
pub trait Transcriber: Send + Sync {
    fn name(&self) -> &str;

    /// Transcribe an encoded audio file (WAV, FLAC, ...).
    async fn transcribe(&self, audio: &[u8]) -> anyhow::Result<String>;
}

// ---------------------------------------------------------------------------
// Extractive question answering
// ---------------------------------------------------------------------------

/// Answers a question from a supplied context passage.
#[async_trait]
pub trait Answerer: Send + Sync {
    fn name(&self) -> &str;

    async fn answer(&self, question: &str, context: &str) -> anyhow::Result<Answer>;
}

/// An answer extracted from a context passage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// The answer text.
    pub text: String,
    /// Model confidence, when the provider reports one.
    #[serde(default)]
    pub score: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct LengthEmbedder;

    #[async_trait]
    impl Embedder for LengthEmbedder {
        fn name(&self) -> &str {
            "length"
        }

        async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
            Ok(vec![text.len() as f32, 1.0])
        }
    }

    #[tokio::test]
    async fn default_batch_preserves_order() {
        let embedder = LengthEmbedder;
        let texts = vec!["a".to_string(), "abc".to_string(), "ab".to_string()];
        let vectors = embedder.embed_batch(&texts).await.unwrap();
        let lengths: Vec<f32> = vectors.iter().map(|v| v[0]).collect();
        assert_eq!(lengths, vec![1.0, 3.0, 2.0]);
        assert_eq!(embedder.dimensions(), None);
    }
}
