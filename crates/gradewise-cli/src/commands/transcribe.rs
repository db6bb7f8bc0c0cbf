//! The `gradewise transcribe` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use gradewise_core::answer::transcribe_answer;
use gradewise_core::Grader;
use gradewise_providers::config::load_config_from;

pub async fn execute(
    audio: PathBuf,
    reference: Option<String>,
    threshold: Option<f64>,
    transcriber: Option<String>,
    embedder: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    // Resolve grading before spending a transcription call.
    let grading = match reference {
        Some(reference) => {
            let threshold = config.threshold(threshold)?;
            let grader = Grader::new(config.embedder(embedder.as_deref())?)
                .with_normalizer(config.normalizer());
            Some((grader, reference, threshold))
        }
        None => None,
    };
    let transcriber = config.transcriber(transcriber.as_deref())?;

    let bytes = std::fs::read(&audio)
        .with_context(|| format!("failed to read audio: {}", audio.display()))?;
    let transcript = transcribe_answer(transcriber.as_ref(), &bytes).await?;
    println!("Transcript: {transcript}");

    if let Some((grader, reference, threshold)) = grading {
        let result = grader.grade(&transcript, &reference, threshold).await?;
        println!(
            "{} (similarity {:.3}, threshold {threshold})",
            result.verdict, result.similarity_score
        );
    }

    Ok(())
}
