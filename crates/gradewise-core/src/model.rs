//! Core data model types for gradewise.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::QuizError;

/// A question and the answer it is graded against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnswerPair {
    /// The question shown to the user.
    pub question: String,
    /// The answer candidates are compared with.
    pub reference_answer: String,
}

impl QuestionAnswerPair {
    pub fn new(question: impl Into<String>, reference_answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            reference_answer: reference_answer.into(),
        }
    }
}

/// Outcome of a single grading call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Correct,
    Incorrect,
}

impl Verdict {
    /// `Correct` only when the score strictly exceeds the threshold.
    pub fn from_score(similarity_score: f64, threshold: Threshold) -> Self {
        if similarity_score > threshold.value() {
            Verdict::Correct
        } else {
            Verdict::Incorrect
        }
    }

    pub fn is_correct(self) -> bool {
        self == Verdict::Correct
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Correct => write!(f, "correct"),
            Verdict::Incorrect => write!(f, "incorrect"),
        }
    }
}

/// Score and verdict produced by the grader.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradingResult {
    /// Cosine similarity of the normalized texts, in `[0, 1]`.
    pub similarity_score: f64,
    pub verdict: Verdict,
}

/// Similarity cut-off, strictly between 0 and 1.
///
/// There is no default: deployments have used both 0.5 and 0.8, so callers
/// always choose one.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(value: f64) -> Result<Self, QuizError> {
        if value > 0.0 && value < 1.0 {
            Ok(Self(value))
        } else {
            Err(QuizError::InvalidThreshold(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Threshold {
    type Error = QuizError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Threshold::new(value)
    }
}

impl From<Threshold> for f64 {
    fn from(threshold: Threshold) -> Self {
        threshold.0
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_bounds() {
        assert!(Threshold::new(0.5).is_ok());
        assert!(Threshold::new(0.999).is_ok());
        assert!(matches!(
            Threshold::new(0.0),
            Err(QuizError::InvalidThreshold(_))
        ));
        assert!(Threshold::new(1.0).is_err());
        assert!(Threshold::new(-0.2).is_err());
        assert!(Threshold::new(f64::NAN).is_err());
    }

    #[test]
    fn verdict_is_strictly_greater() {
        let t = Threshold::new(0.5).unwrap();
        assert_eq!(Verdict::from_score(0.5, t), Verdict::Incorrect);
        assert_eq!(Verdict::from_score(0.5001, t), Verdict::Correct);
    }

    #[test]
    fn threshold_effect_is_monotonic() {
        let low = Threshold::new(0.3).unwrap();
        let high = Threshold::new(0.7).unwrap();
        for score in [0.31, 0.5, 0.69, 0.7] {
            assert_eq!(Verdict::from_score(score, low), Verdict::Correct);
            assert_eq!(Verdict::from_score(score, high), Verdict::Incorrect);
        }
    }

    #[test]
    fn threshold_deserializes_with_validation() {
        let ok: Threshold = serde_json::from_str("0.8").unwrap();
        assert_eq!(ok.value(), 0.8);
        assert!(serde_json::from_str::<Threshold>("1.5").is_err());
    }
}
