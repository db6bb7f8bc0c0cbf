//! Ranked suggestions from a text corpus.
//!
//! Given a free-text query (for example a complaint), finds the corpus
//! entries (for example statute sections) most similar to it. The similarity
//! cut-off starts at `initial_threshold` and is lowered by `step` until at
//! least `min_results` entries pass or the cut-off is no longer positive.
//! This is separate from answer grading and shares only the normalizer and
//! the embedder with it.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{InputSide, QuizError};
use crate::normalize::Normalizer;
use crate::similarity::cosine_similarity;
use crate::traits::Embedder;

/// One row of a corpus, as header/value pairs in column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub fields: Vec<(String, String)>,
}

impl CorpusEntry {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(header, _)| header == name)
            .map(|(_, value)| value.as_str())
    }

    /// The text to match against: one column, or every column joined.
    pub fn text(&self, column: Option<&str>) -> Option<String> {
        match column {
            Some(name) => self.field(name).map(str::to_string),
            None => Some(
                self.fields
                    .iter()
                    .map(|(_, value)| value.as_str())
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
        }
    }
}

/// Tuning for [`suggest`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuggestOptions {
    #[serde(default = "default_initial_threshold")]
    pub initial_threshold: f64,
    #[serde(default = "default_step")]
    pub step: f64,
    #[serde(default = "default_min_results")]
    pub min_results: usize,
}

fn default_initial_threshold() -> f64 {
    0.2
}
fn default_step() -> f64 {
    0.05
}
fn default_min_results() -> usize {
    5
}

/// Upper bound on cut-off passes; a smaller `step` is rejected.
pub const MAX_DECAY_PASSES: usize = 10_000;

impl SuggestOptions {
    /// Check that the options describe a finite search.
    ///
    /// `initial_threshold` must be finite and in (0, 1], and `step` must be
    /// finite, positive, and large enough to reach zero within
    /// [`MAX_DECAY_PASSES`] passes.
    pub fn validate(&self) -> Result<(), QuizError> {
        let t = self.initial_threshold;
        if !t.is_finite() || t <= 0.0 || t > 1.0 {
            return Err(QuizError::InvalidSuggestOptions(format!(
                "initial_threshold must be in (0, 1], got {t}"
            )));
        }
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(QuizError::InvalidSuggestOptions(format!(
                "step must be positive, got {}",
                self.step
            )));
        }
        if self.passes() > MAX_DECAY_PASSES {
            return Err(QuizError::InvalidSuggestOptions(format!(
                "step {} is too small to lower {t} to zero in {MAX_DECAY_PASSES} passes",
                self.step
            )));
        }
        Ok(())
    }

    /// Number of cut-offs tried before the threshold stops being positive.
    fn passes(&self) -> usize {
        let passes = (self.initial_threshold / self.step).ceil();
        if passes > MAX_DECAY_PASSES as f64 {
            MAX_DECAY_PASSES + 1
        } else {
            (passes as usize).max(1)
        }
    }
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self {
            initial_threshold: default_initial_threshold(),
            step: default_step(),
            min_results: default_min_results(),
        }
    }
}

/// A corpus entry that matched the query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Position of the entry in the corpus.
    pub index: usize,
    pub similarity: f64,
}

/// Ranked matches plus the cut-off that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestions {
    pub threshold: f64,
    pub matches: Vec<Suggestion>,
}

/// Rank `entries` by similarity to `query`.
///
/// Entries that normalize to nothing never match. Invalid `options` are
/// rejected before anything is embedded.
#[instrument(skip_all, fields(embedder = %embedder.name(), entries = entries.len()))]
pub async fn suggest(
    embedder: &dyn Embedder,
    normalizer: &Normalizer,
    query: &str,
    entries: &[String],
    options: SuggestOptions,
) -> Result<Suggestions, QuizError> {
    options.validate()?;

    let query = normalizer.normalize(query);
    if query.is_empty() {
        return Err(QuizError::EmptyInput(InputSide::Query));
    }

    let (indices, texts): (Vec<usize>, Vec<String>) = entries
        .iter()
        .enumerate()
        .map(|(i, e)| (i, normalizer.normalize(e)))
        .filter(|(_, text)| !text.is_empty())
        .unzip();

    let unavailable = |e: anyhow::Error| QuizError::EmbeddingUnavailable(format!("{e:#}"));
    let query_vec = embedder.embed(&query).await.map_err(unavailable)?;
    let entry_vecs = if texts.is_empty() {
        Vec::new()
    } else {
        embedder.embed_batch(&texts).await.map_err(unavailable)?
    };

    let mut similarities = Vec::with_capacity(entry_vecs.len());
    for (&index, vec) in indices.iter().zip(&entry_vecs) {
        similarities.push(Suggestion {
            index,
            similarity: cosine_similarity(&query_vec, vec)?,
        });
    }

    let (threshold, mut matches) = decay_threshold(&similarities, options);
    matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    debug!(threshold, matches = matches.len(), "ranked suggestions");

    Ok(Suggestions { threshold, matches })
}

/// Lower the cut-off until enough entries pass it or it reaches zero.
/// Returns the last cut-off applied and the entries above it. Expects
/// options that passed [`SuggestOptions::validate`].
fn decay_threshold(similarities: &[Suggestion], options: SuggestOptions) -> (f64, Vec<Suggestion>) {
    let mut applied = options.initial_threshold;
    let mut relevant = Vec::new();

    for pass in 0..options.passes() {
        let threshold = options.initial_threshold - pass as f64 * options.step;
        if relevant.len() >= options.min_results || threshold <= 0.0 {
            break;
        }
        relevant = similarities
            .iter()
            .filter(|s| s.similarity > threshold)
            .copied()
            .collect();
        applied = threshold;
    }

    (applied, relevant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingEmbedder, TableEmbedder};

    fn scored(values: &[f64]) -> Vec<Suggestion> {
        values
            .iter()
            .enumerate()
            .map(|(index, &similarity)| Suggestion { index, similarity })
            .collect()
    }

    #[test]
    fn stops_at_the_first_threshold_with_enough_results() {
        let sims = scored(&[0.9, 0.5, 0.3, 0.12, 0.05]);
        let options = SuggestOptions {
            initial_threshold: 0.6,
            step: 0.2,
            min_results: 2,
        };
        let (threshold, matches) = decay_threshold(&sims, options);
        assert!((threshold - 0.4).abs() < 1e-9);
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn gives_up_when_threshold_is_no_longer_positive() {
        let sims = scored(&[0.9, 0.01]);
        let options = SuggestOptions {
            initial_threshold: 0.2,
            step: 0.15,
            min_results: 5,
        };
        let (threshold, matches) = decay_threshold(&sims, options);
        assert!((threshold - 0.05).abs() < 1e-9);
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn step_larger_than_threshold_applies_it_once() {
        let sims = scored(&[0.9, 0.1]);
        let options = SuggestOptions {
            initial_threshold: 0.5,
            step: 0.7,
            min_results: 5,
        };
        let (threshold, matches) = decay_threshold(&sims, options);
        assert_eq!(threshold, 0.5);
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn default_options_are_valid() {
        assert!(SuggestOptions::default().validate().is_ok());
    }

    #[test]
    fn rejects_options_that_never_terminate() {
        let bad = [
            (f64::NAN, 0.05),
            (f64::INFINITY, 0.05),
            (0.0, 0.05),
            (1.5, 0.05),
            (0.2, 0.0),
            (0.2, -0.05),
            (0.2, f64::NAN),
            (0.2, 1e-18),
            (0.2, 1e-12),
        ];
        for (initial_threshold, step) in bad {
            let options = SuggestOptions {
                initial_threshold,
                step,
                min_results: 5,
            };
            assert!(
                matches!(options.validate(), Err(QuizError::InvalidSuggestOptions(_))),
                "accepted initial_threshold={initial_threshold} step={step}"
            );
        }
    }

    #[tokio::test]
    async fn tiny_step_fails_instead_of_spinning() {
        let embedder = TableEmbedder::new(16);
        let options = SuggestOptions {
            initial_threshold: 0.2,
            step: 1e-18,
            min_results: 5,
        };
        let result = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            suggest(
                &embedder,
                &Normalizer::english(),
                "theft",
                &["theft of property".to_string()],
                options,
            ),
        )
        .await
        .expect("suggest returned");
        assert!(matches!(result, Err(QuizError::InvalidSuggestOptions(_))));
    }

    #[tokio::test]
    async fn nan_threshold_is_rejected() {
        let embedder = TableEmbedder::new(16);
        let options = SuggestOptions {
            initial_threshold: f64::NAN,
            ..SuggestOptions::default()
        };
        let err = suggest(
            &embedder,
            &Normalizer::english(),
            "theft",
            &["theft of property".to_string()],
            options,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, QuizError::InvalidSuggestOptions(_)));
    }

    #[test]
    fn entry_text_selects_or_joins_columns() {
        let entry = CorpusEntry {
            fields: vec![
                ("Section".into(), "379".into()),
                ("Offense".into(), "Theft".into()),
            ],
        };
        assert_eq!(entry.text(Some("Offense")).as_deref(), Some("Theft"));
        assert_eq!(entry.text(None).as_deref(), Some("379 Theft"));
        assert_eq!(entry.text(Some("Court")), None);
    }

    #[tokio::test]
    async fn ranks_matching_entries_first() {
        let embedder = TableEmbedder::new(64);
        let entries = vec![
            "Punishment for theft of property".to_string(),
            "Punishment for murder".to_string(),
            "Theft in a dwelling house".to_string(),
        ];
        let options = SuggestOptions {
            initial_threshold: 0.3,
            step: 0.05,
            min_results: 1,
        };
        let result = suggest(&embedder, &Normalizer::english(), "theft", &entries, options)
            .await
            .unwrap();

        let indices: Vec<usize> = result.matches.iter().map(|m| m.index).collect();
        assert!(indices.contains(&0));
        assert!(indices.contains(&2));
        assert!(!indices.contains(&1));
        assert!(result
            .matches
            .windows(2)
            .all(|w| w[0].similarity >= w[1].similarity));
    }

    #[tokio::test]
    async fn empty_query_is_rejected() {
        let embedder = TableEmbedder::new(8);
        let options = SuggestOptions::default();
        let err = suggest(&embedder, &Normalizer::english(), "the of", &[], options)
            .await
            .unwrap_err();
        assert!(matches!(err, QuizError::EmptyInput(InputSide::Query)));
    }

    #[tokio::test]
    async fn provider_failure_propagates() {
        let err = suggest(
            &FailingEmbedder,
            &Normalizer::english(),
            "theft",
            &["theft".to_string()],
            SuggestOptions::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, QuizError::EmbeddingUnavailable(_)));
    }
}
