//! Mock providers for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use gradewise_core::error::ProviderError;
use gradewise_core::traits::{Answer, Answerer, Embedder, Transcriber};

use crate::hashing::HashingEmbedder;

/// A mock embedder for exercising grading without real API calls.
///
/// Returns configured vectors for exact text matches and falls back to a
/// hashing embedding otherwise.
pub struct MockEmbedder {
    /// Map of input text → vector.
    vectors: HashMap<String, Vec<f32>>,
    fallback: HashingEmbedder,
    /// When set, every call fails with a network error.
    offline: bool,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last text received.
    last_input: Mutex<Option<String>>,
}

impl MockEmbedder {
    /// Create a mock with the given text→vector mappings. All vectors must
    /// share `dimensions`.
    pub fn new(dimensions: usize, vectors: HashMap<String, Vec<f32>>) -> Self {
        Self {
            vectors,
            fallback: HashingEmbedder::new(dimensions),
            offline: false,
            call_count: AtomicU32::new(0),
            last_input: Mutex::new(None),
        }
    }

    /// A mock whose every call fails as if the endpoint were down.
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::new(8, HashMap::new())
        }
    }

    /// Get the number of calls made to this embedder.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last text embedded.
    pub fn last_input(&self) -> Option<String> {
        self.last_input.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    fn name(&self) -> &str {
        "mock"
    }

    fn dimensions(&self) -> Option<usize> {
        self.fallback.dimensions()
    }

    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_input.lock() {
            *last = Some(text.to_string());
        }

        if self.offline {
            return Err(ProviderError::NetworkError("mock embedder is offline".into()).into());
        }

        Ok(self
            .vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.fallback.embed_text(text)))
    }
}

/// A mock transcriber with a scripted outcome.
pub struct MockTranscriber {
    transcript: Option<String>,
    call_count: AtomicU32,
}

impl MockTranscriber {
    /// Always returns `transcript`.
    pub fn with_transcript(transcript: &str) -> Self {
        Self {
            transcript: Some(transcript.to_string()),
            call_count: AtomicU32::new(0),
        }
    }

    /// Always reports that no speech was recognized.
    pub fn unrecognized() -> Self {
        Self {
            transcript: None,
            call_count: AtomicU32::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    fn name(&self) -> &str {
        "mock"
    }

    async fn transcribe(&self, _audio: &[u8]) -> anyhow::Result<String> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        match &self.transcript {
            Some(text) => Ok(text.clone()),
            None => Err(ProviderError::Unrecognized.into()),
        }
    }
}

/// A mock answerer that returns the context sentence containing the most
/// words of the question.
pub struct MockAnswerer;

#[async_trait]
impl Answerer for MockAnswerer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn answer(&self, question: &str, context: &str) -> anyhow::Result<Answer> {
        let words: Vec<String> = question
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();

        let best = context
            .split_terminator(['.', '!', '?'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .max_by_key(|sentence| {
                let lower = sentence.to_lowercase();
                words.iter().filter(|w| lower.contains(w.as_str())).count()
            })
            .unwrap_or_default();

        Ok(Answer {
            text: best.to_string(),
            score: None,
        })
    }
}
