//! Error types.
//!
//! `QuizError` is what the grader, the session driver, and the data loaders
//! return. `ProviderError` describes failures of external capabilities; it
//! lives here so core can classify provider failures by downcasting instead
//! of matching on strings.

use std::path::PathBuf;

use thiserror::Error;

use crate::session::SessionState;

/// Which side of a grading call an input belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSide {
    Candidate,
    Reference,
    Question,
    Context,
    Query,
}

impl std::fmt::Display for InputSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputSide::Candidate => write!(f, "candidate"),
            InputSide::Reference => write!(f, "reference"),
            InputSide::Question => write!(f, "question"),
            InputSide::Context => write!(f, "context"),
            InputSide::Query => write!(f, "query"),
        }
    }
}

/// Errors raised while grading answers or driving a quiz session.
///
/// None of these corrupt session state: a failed attempt leaves the score
/// and the completed positions exactly as they were.
#[derive(Debug, Error)]
pub enum QuizError {
    /// The input was empty, either as given or after normalization.
    #[error("{0} is empty after normalization")]
    EmptyInput(InputSide),

    /// The embedding provider failed or could not be reached.
    #[error("embedding provider unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// The two embeddings do not share a dimensionality.
    #[error("embedding dimensions differ: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    /// The transcription provider failed.
    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),

    /// The audio was processed but no speech was recognized.
    #[error("speech could not be recognized")]
    SpeechUnrecognized,

    /// The question-answering provider failed.
    #[error("answer provider unavailable: {0}")]
    AnswerUnavailable(String),

    /// The question source does not exist.
    #[error("question source not found: {}", .0.display())]
    DataSourceMissing(PathBuf),

    /// The question source exists but could not be read.
    #[error("failed to read question source {}: {message}", .path.display())]
    DataSource { path: PathBuf, message: String },

    /// A summary was requested for a session with no questions.
    #[error("cannot compute a percentage over zero questions")]
    DivisionUndefined,

    /// More questions were requested than the source provides.
    #[error("requested {requested} questions but only {available} are available")]
    InsufficientPairs { requested: usize, available: usize },

    /// The threshold is outside the open interval (0, 1).
    #[error("threshold must be strictly between 0 and 1, got {0}")]
    InvalidThreshold(f64),

    /// Suggestion tuning that cannot produce a terminating search.
    #[error("invalid suggest options: {0}")]
    InvalidSuggestOptions(String),

    /// The operation is not valid in the session's current state.
    #[error("cannot {operation} while the session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },
}

/// Errors that can occur when interacting with an external provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The service answered but recognized nothing in the input.
    #[error("no speech recognized")]
    Unrecognized,

    /// The provider does not offer the requested capability.
    #[error("{provider} does not support {capability}")]
    Unsupported {
        provider: String,
        capability: &'static str,
    },
}

impl ProviderError {
    /// Map an HTTP status and body to the matching variant.
    pub fn from_status(status: u16, body: String, model: &str) -> Self {
        match status {
            401 | 403 => ProviderError::AuthenticationFailed(body),
            404 => ProviderError::ModelNotFound(model.to_string()),
            429 => ProviderError::RateLimited {
                retry_after_ms: 1000,
            },
            _ => ProviderError::ApiError {
                status,
                message: body,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert!(matches!(
            ProviderError::from_status(401, "bad key".into(), "m"),
            ProviderError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            ProviderError::from_status(404, String::new(), "m"),
            ProviderError::ModelNotFound(ref m) if m == "m"
        ));
        assert!(matches!(
            ProviderError::from_status(500, "boom".into(), "m"),
            ProviderError::ApiError { status: 500, .. }
        ));
    }

    #[test]
    fn messages_name_the_input() {
        let err = QuizError::EmptyInput(InputSide::Candidate);
        assert_eq!(err.to_string(), "candidate is empty after normalization");
    }
}
