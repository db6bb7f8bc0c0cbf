//! Deterministic embedders shared by this crate's unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::traits::Embedder;

/// Sums one vector per whitespace-separated token. Tokens missing from the
/// table map to a one-hot vector picked from their bytes.
pub(crate) struct TableEmbedder {
    dims: usize,
    table: HashMap<String, Vec<f32>>,
    calls: AtomicUsize,
}

impl TableEmbedder {
    pub(crate) fn new(dims: usize) -> Self {
        Self {
            dims,
            table: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with(mut self, token: &str, vector: &[f32]) -> Self {
        assert_eq!(vector.len(), self.dims);
        self.table.insert(token.to_string(), vector.to_vec());
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    fn token_vector(&self, token: &str) -> Vec<f32> {
        if let Some(v) = self.table.get(token) {
            return v.clone();
        }
        let slot = token
            .bytes()
            .fold(7usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize))
            % self.dims;
        let mut v = vec![0.0; self.dims];
        v[slot] = 1.0;
        v
    }
}

#[async_trait]
impl Embedder for TableEmbedder {
    fn name(&self) -> &str {
        "table"
    }

    fn dimensions(&self) -> Option<usize> {
        Some(self.dims)
    }

    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let mut sum = vec![0.0f32; self.dims];
        for token in text.split_whitespace() {
            for (acc, v) in sum.iter_mut().zip(self.token_vector(token)) {
                *acc += v;
            }
        }
        Ok(sum)
    }
}

/// Always fails, as an unreachable remote endpoint would.
pub(crate) struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    fn name(&self) -> &str {
        "failing"
    }

    async fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
        Err(ProviderError::NetworkError("connection refused".into()).into())
    }
}
