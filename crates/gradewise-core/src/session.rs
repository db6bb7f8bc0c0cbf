//! Quiz session driver.
//!
//! A [`QuizSession`] is a plain value: the presentation layer holds it,
//! feeds answers in, and re-renders from its accessors. `submit` takes
//! `&mut self`, so only one grading call can be in flight per session.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::QuizError;
use crate::grader::Grader;
use crate::model::{GradingResult, QuestionAnswerPair, Threshold};

/// Lifecycle of a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NotStarted,
    InProgress,
    Completed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::NotStarted => write!(f, "not started"),
            SessionState::InProgress => write!(f, "in progress"),
            SessionState::Completed => write!(f, "completed"),
        }
    }
}

/// What happened at one position of the quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question: String,
    pub reference_answer: String,
    /// The submitted answer, `None` when the question was skipped.
    pub candidate: Option<String>,
    /// The grading outcome, `None` when the question was skipped.
    pub result: Option<GradingResult>,
}

impl AnswerRecord {
    pub fn is_correct(&self) -> bool {
        self.result.is_some_and(|r| r.verdict.is_correct())
    }
}

/// Final score of a completed session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuizSummary {
    pub score: usize,
    pub total: usize,
    pub percentage: f64,
}

impl fmt::Display for QuizSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({:.2}%)", self.score, self.total, self.percentage)
    }
}

/// 1-based position within the session, for "question i of n" displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub position: usize,
    pub total: usize,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "question {} of {}", self.position, self.total)
    }
}

/// Choose the questions for a session.
///
/// `None`, or a size equal to the number of pairs, keeps every pair in its
/// original order. A smaller size draws uniformly at random without
/// replacement, in draw order.
pub fn select_pairs<R: Rng + ?Sized>(
    pairs: Vec<QuestionAnswerPair>,
    subset_size: Option<usize>,
    rng: &mut R,
) -> Result<Vec<QuestionAnswerPair>, QuizError> {
    let available = pairs.len();
    match subset_size {
        None => Ok(pairs),
        Some(requested) if requested > available => Err(QuizError::InsufficientPairs {
            requested,
            available,
        }),
        Some(requested) if requested == available => Ok(pairs),
        Some(requested) => {
            let mut slots: Vec<Option<QuestionAnswerPair>> = pairs.into_iter().map(Some).collect();
            Ok(rand::seq::index::sample(rng, available, requested)
                .into_iter()
                .filter_map(|i| slots[i].take())
                .collect())
        }
    }
}

/// An in-memory quiz over an ordered set of question/answer pairs.
#[derive(Debug, Clone)]
pub struct QuizSession {
    threshold: Threshold,
    state: SessionState,
    pairs: Vec<QuestionAnswerPair>,
    current_index: usize,
    score: usize,
    answers: Vec<AnswerRecord>,
}

impl QuizSession {
    /// A session that grades with `threshold` and has not started yet.
    pub fn new(threshold: Threshold) -> Self {
        Self {
            threshold,
            state: SessionState::NotStarted,
            pairs: Vec::new(),
            current_index: 0,
            score: 0,
            answers: Vec::new(),
        }
    }

    /// Start (or restart) the session with the selected pairs.
    ///
    /// A session over zero pairs is immediately completed.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        pairs: Vec<QuestionAnswerPair>,
        subset_size: Option<usize>,
        rng: &mut R,
    ) -> Result<(), QuizError> {
        let selected = select_pairs(pairs, subset_size, rng)?;
        info!(questions = selected.len(), "starting quiz session");

        self.pairs = selected;
        self.current_index = 0;
        self.score = 0;
        self.answers.clear();
        self.state = if self.pairs.is_empty() {
            SessionState::Completed
        } else {
            SessionState::InProgress
        };
        Ok(())
    }

    /// Grade `candidate` against the current question and advance.
    ///
    /// On error the session is unchanged and the same question stays
    /// current, so the caller can re-prompt or [`skip`](Self::skip).
    pub async fn submit(
        &mut self,
        grader: &Grader,
        candidate: &str,
    ) -> Result<GradingResult, QuizError> {
        let pair = self.require_current("submit an answer")?;
        let result = grader
            .grade(candidate, &pair.reference_answer, self.threshold)
            .await?;

        let record = AnswerRecord {
            question: pair.question.clone(),
            reference_answer: pair.reference_answer.clone(),
            candidate: Some(candidate.to_string()),
            result: Some(result),
        };
        if result.verdict.is_correct() {
            self.score += 1;
        }
        self.advance(record);
        Ok(result)
    }

    /// Move past the current question without scoring it.
    pub fn skip(&mut self) -> Result<(), QuizError> {
        let pair = self.require_current("skip a question")?;
        let record = AnswerRecord {
            question: pair.question.clone(),
            reference_answer: pair.reference_answer.clone(),
            candidate: None,
            result: None,
        };
        self.advance(record);
        Ok(())
    }

    /// Score, total, and percentage of a completed session.
    pub fn summary(&self) -> Result<QuizSummary, QuizError> {
        if self.state != SessionState::Completed {
            return Err(QuizError::InvalidState {
                operation: "summarize",
                state: self.state,
            });
        }
        let total = self.pairs.len();
        if total == 0 {
            return Err(QuizError::DivisionUndefined);
        }
        Ok(QuizSummary {
            score: self.score,
            total,
            percentage: 100.0 * self.score as f64 / total as f64,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn total(&self) -> usize {
        self.pairs.len()
    }

    pub fn pairs(&self) -> &[QuestionAnswerPair] {
        &self.pairs
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    /// The pair awaiting an answer, if the session is in progress.
    pub fn current_pair(&self) -> Option<&QuestionAnswerPair> {
        match self.state {
            SessionState::InProgress => self.pairs.get(self.current_index),
            _ => None,
        }
    }

    pub fn current_question(&self) -> Option<&str> {
        self.current_pair().map(|p| p.question.as_str())
    }

    pub fn progress(&self) -> Option<Progress> {
        self.current_pair().map(|_| Progress {
            position: self.current_index + 1,
            total: self.pairs.len(),
        })
    }

    fn require_current(&self, operation: &'static str) -> Result<&QuestionAnswerPair, QuizError> {
        self.current_pair().ok_or(QuizError::InvalidState {
            operation,
            state: self.state,
        })
    }

    fn advance(&mut self, record: AnswerRecord) {
        self.answers.push(record);
        self.current_index += 1;
        debug!(
            index = self.current_index,
            score = self.score,
            "advanced quiz session"
        );
        if self.current_index == self.pairs.len() {
            self.state = SessionState::Completed;
            info!(score = self.score, total = self.pairs.len(), "quiz completed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InputSide;
    use crate::testing::{FailingEmbedder, TableEmbedder};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn pairs() -> Vec<QuestionAnswerPair> {
        vec![
            QuestionAnswerPair::new("What is the keyword used to create a function?", "def"),
            QuestionAnswerPair::new("What is 2+2?", "4"),
            QuestionAnswerPair::new("Which method removes surrounding whitespace?", "strip"),
            QuestionAnswerPair::new("How do you handle exceptions?", "try except"),
        ]
    }

    fn grader() -> Grader {
        Grader::new(Arc::new(TableEmbedder::new(64)))
    }

    fn session() -> QuizSession {
        QuizSession::new(Threshold::new(0.5).unwrap())
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn new_session_is_not_started() {
        let s = session();
        assert_eq!(s.state(), SessionState::NotStarted);
        assert!(s.current_question().is_none());
        assert!(matches!(
            s.summary(),
            Err(QuizError::InvalidState {
                state: SessionState::NotStarted,
                ..
            })
        ));
    }

    #[test]
    fn start_without_subset_keeps_order() {
        let mut s = session();
        s.start(pairs(), None, &mut rng()).unwrap();
        assert_eq!(s.state(), SessionState::InProgress);
        assert_eq!(s.pairs(), pairs().as_slice());
        assert_eq!(s.progress().unwrap().to_string(), "question 1 of 4");
    }

    #[test]
    fn full_size_subset_keeps_order() {
        let selected = select_pairs(pairs(), Some(4), &mut rng()).unwrap();
        assert_eq!(selected, pairs());
    }

    #[test]
    fn subset_is_drawn_without_replacement() {
        let selected = select_pairs(pairs(), Some(3), &mut rng()).unwrap();
        assert_eq!(selected.len(), 3);
        for pair in &selected {
            assert!(pairs().contains(pair));
            assert_eq!(selected.iter().filter(|p| *p == pair).count(), 1);
        }
    }

    #[test]
    fn subset_is_reproducible_with_a_seed() {
        let a = select_pairs(pairs(), Some(2), &mut StdRng::seed_from_u64(42)).unwrap();
        let b = select_pairs(pairs(), Some(2), &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn oversized_subset_is_rejected() {
        let mut s = session();
        let err = s.start(pairs(), Some(5), &mut rng()).unwrap_err();
        assert!(matches!(
            err,
            QuizError::InsufficientPairs {
                requested: 5,
                available: 4
            }
        ));
        assert_eq!(s.state(), SessionState::NotStarted);
    }

    #[tokio::test]
    async fn answering_every_question_completes_the_session() {
        let grader = grader();
        let mut s = session();
        s.start(pairs(), None, &mut rng()).unwrap();

        let answers = ["def", "five", "strip", "try except"];
        for (i, answer) in answers.iter().enumerate() {
            assert_eq!(s.current_index(), i);
            s.submit(&grader, answer).await.unwrap();
            assert!(s.score() <= s.current_index());
        }

        assert_eq!(s.state(), SessionState::Completed);
        assert!(s.current_question().is_none());
        let summary = s.summary().unwrap();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.score, 3);
        assert_eq!(summary.percentage, 75.0);
        assert_eq!(s.answers().len(), 4);
        assert!(!s.answers()[1].is_correct());
    }

    #[tokio::test]
    async fn submit_after_completion_is_invalid() {
        let grader = grader();
        let mut s = session();
        s.start(vec![QuestionAnswerPair::new("2+2?", "4")], None, &mut rng())
            .unwrap();
        s.submit(&grader, "4").await.unwrap();

        let err = s.submit(&grader, "4").await.unwrap_err();
        assert!(matches!(
            err,
            QuizError::InvalidState {
                state: SessionState::Completed,
                ..
            }
        ));
        assert_eq!(s.summary().unwrap().score, 1);
    }

    #[tokio::test]
    async fn failed_grading_leaves_the_session_untouched() {
        let good = grader();
        let broken = Grader::new(Arc::new(FailingEmbedder));
        let mut s = session();
        s.start(pairs(), None, &mut rng()).unwrap();
        s.submit(&good, "def").await.unwrap();

        let err = s.submit(&broken, "4").await.unwrap_err();
        assert!(matches!(err, QuizError::EmbeddingUnavailable(_)));
        let err = s.submit(&good, "the").await.unwrap_err();
        assert!(matches!(err, QuizError::EmptyInput(InputSide::Candidate)));

        assert_eq!(s.current_index(), 1);
        assert_eq!(s.score(), 1);
        assert_eq!(s.current_question(), Some("What is 2+2?"));
    }

    #[tokio::test]
    async fn skip_counts_as_incorrect() {
        let grader = grader();
        let mut s = session();
        s.start(pairs(), Some(2), &mut rng()).unwrap();
        s.skip().unwrap();
        let reference = s.current_pair().unwrap().reference_answer.clone();
        s.submit(&grader, &reference).await.unwrap();

        let summary = s.summary().unwrap();
        assert_eq!(summary.score, 1);
        assert_eq!(summary.total, 2);
        assert!(s.answers()[0].candidate.is_none());
    }

    #[test]
    fn empty_session_has_undefined_percentage() {
        let mut s = session();
        s.start(Vec::new(), None, &mut rng()).unwrap();
        assert_eq!(s.state(), SessionState::Completed);
        assert!(matches!(s.summary(), Err(QuizError::DivisionUndefined)));
    }

    #[tokio::test]
    async fn restart_resets_progress() {
        let grader = grader();
        let mut s = session();
        s.start(pairs(), None, &mut rng()).unwrap();
        s.submit(&grader, "def").await.unwrap();
        s.start(pairs(), Some(1), &mut rng()).unwrap();
        assert_eq!(s.current_index(), 0);
        assert_eq!(s.score(), 0);
        assert!(s.answers().is_empty());
        assert_eq!(s.total(), 1);
    }
}
