//! gradewise-core: Answer grading, quiz sessions, and text normalization.
//!
//! This crate defines the data model, the capability traits that external
//! providers implement, and the similarity-based grading logic that the rest
//! of gradewise builds on.

pub mod answer;
pub mod error;
pub mod grader;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod report;
pub mod session;
pub mod similarity;
pub mod suggest;
pub mod traits;

#[cfg(test)]
mod testing;

pub use error::{ProviderError, QuizError};
pub use grader::Grader;
pub use model::{GradingResult, QuestionAnswerPair, Threshold, Verdict};
pub use normalize::Normalizer;
pub use session::{QuizSession, QuizSummary, SessionState};
