//! Similarity-based answer grading.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::error::{InputSide, QuizError};
use crate::model::{GradingResult, Threshold, Verdict};
use crate::normalize::Normalizer;
use crate::similarity::similarity_score;
use crate::traits::Embedder;

/// Grades a candidate answer against a reference answer.
///
/// Both texts are normalized, embedded through the configured [`Embedder`],
/// and compared by cosine similarity. A grading call never retries.
pub struct Grader {
    embedder: Arc<dyn Embedder>,
    normalizer: Normalizer,
}

impl Grader {
    /// Create a grader using the English normalizer.
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            normalizer: Normalizer::english(),
        }
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn embedder(&self) -> &dyn Embedder {
        self.embedder.as_ref()
    }

    /// Grade `candidate` against `reference`.
    ///
    /// Fails with [`QuizError::EmptyInput`] when either side is blank or
    /// normalizes to nothing, without contacting the embedder.
    #[instrument(skip_all, fields(embedder = %self.embedder.name(), threshold = %threshold))]
    pub async fn grade(
        &self,
        candidate: &str,
        reference: &str,
        threshold: Threshold,
    ) -> Result<GradingResult, QuizError> {
        let candidate = self.prepare(candidate, InputSide::Candidate)?;
        let reference = self.prepare(reference, InputSide::Reference)?;

        let vectors = self
            .embedder
            .embed_batch(&[candidate, reference])
            .await
            .map_err(|e| QuizError::EmbeddingUnavailable(format!("{e:#}")))?;
        let [candidate_vec, reference_vec] = vectors.as_slice() else {
            return Err(QuizError::EmbeddingUnavailable(format!(
                "expected 2 embeddings, got {}",
                vectors.len()
            )));
        };

        let similarity_score = similarity_score(candidate_vec, reference_vec)?;
        let verdict = Verdict::from_score(similarity_score, threshold);
        debug!(similarity_score, %verdict, "graded answer");

        Ok(GradingResult {
            similarity_score,
            verdict,
        })
    }

    fn prepare(&self, text: &str, side: InputSide) -> Result<String, QuizError> {
        if text.trim().is_empty() {
            return Err(QuizError::EmptyInput(side));
        }
        let normalized = self.normalizer.normalize(text);
        if normalized.is_empty() {
            return Err(QuizError::EmptyInput(side));
        }
        Ok(normalized)
    }
}
