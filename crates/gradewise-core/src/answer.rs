//! Glue between the non-embedding capabilities and the error taxonomy.

use tracing::{debug, instrument};

use crate::error::{InputSide, ProviderError, QuizError};
use crate::traits::{Answer, Answerer, Transcriber};

/// Ask `answerer` to extract the answer to `question` from `context`.
///
/// Both inputs must be non-blank.
#[instrument(skip_all, fields(answerer = %answerer.name()))]
pub async fn ask(
    answerer: &dyn Answerer,
    question: &str,
    context: &str,
) -> Result<Answer, QuizError> {
    let question = question.trim();
    let context = context.trim();
    if question.is_empty() {
        return Err(QuizError::EmptyInput(InputSide::Question));
    }
    if context.is_empty() {
        return Err(QuizError::EmptyInput(InputSide::Context));
    }

    let answer = answerer
        .answer(question, context)
        .await
        .map_err(|e| QuizError::AnswerUnavailable(format!("{e:#}")))?;
    debug!(score = ?answer.score, "received answer");
    Ok(answer)
}

/// Transcribe a spoken answer so it can be graded.
///
/// A blank transcript counts as unrecognized speech.
#[instrument(skip_all, fields(transcriber = %transcriber.name(), bytes = audio.len()))]
pub async fn transcribe_answer(
    transcriber: &dyn Transcriber,
    audio: &[u8],
) -> Result<String, QuizError> {
    let text = transcriber.transcribe(audio).await.map_err(|e| {
        match e.downcast_ref::<ProviderError>() {
            Some(ProviderError::Unrecognized) => QuizError::SpeechUnrecognized,
            _ => QuizError::TranscriptionFailed(format!("{e:#}")),
        }
    })?;

    let text = text.trim();
    if text.is_empty() {
        return Err(QuizError::SpeechUnrecognized);
    }
    debug!(chars = text.len(), "transcribed answer");
    Ok(text.to_string())
}
