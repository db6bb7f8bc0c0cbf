//! The `gradewise ask` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use gradewise_core::answer::ask;
use gradewise_providers::config::load_config_from;

pub async fn execute(
    question: String,
    context: Option<String>,
    context_file: Option<PathBuf>,
    answerer: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let context = match (context, context_file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read context: {}", path.display()))?,
        (None, None) => anyhow::bail!("either --context or --context-file is required"),
    };

    let config = load_config_from(config_path.as_deref())?;
    let answerer = config.answerer(answerer.as_deref())?;

    let answer = ask(answerer.as_ref(), &question, &context).await?;
    match answer.score {
        Some(score) => println!("{} (confidence {score:.2})", answer.text),
        None => println!("{}", answer.text),
    }

    Ok(())
}
