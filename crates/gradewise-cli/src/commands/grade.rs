//! The `gradewise grade` command.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use gradewise_core::Grader;
use gradewise_providers::config::load_config_from;

#[derive(Serialize)]
struct GradeOutput<'a> {
    embedder: &'a str,
    threshold: f64,
    similarity_score: f64,
    verdict: String,
}

pub async fn execute(
    candidate: String,
    reference: String,
    threshold: Option<f64>,
    embedder: Option<String>,
    json: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let threshold = config.threshold(threshold)?;
    let embedder = config.embedder(embedder.as_deref())?;
    let grader = Grader::new(embedder).with_normalizer(config.normalizer());

    let result = grader.grade(&candidate, &reference, threshold).await?;

    if json {
        let output = GradeOutput {
            embedder: grader.embedder().name(),
            threshold: threshold.value(),
            similarity_score: result.similarity_score,
            verdict: result.verdict.to_string(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "{} (similarity {:.3}, threshold {threshold})",
            result.verdict, result.similarity_score
        );
    }

    Ok(())
}
