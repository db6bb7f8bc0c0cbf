//! The `gradewise validate` command.

use std::path::PathBuf;

use anyhow::Result;

use gradewise_core::loader::{load_pairs, validate_pairs};
use gradewise_providers::config::load_config_from;

pub fn execute(questions: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let pairs = load_pairs(&questions)?;

    println!("Question bank: {} ({} questions)", questions.display(), pairs.len());

    let warnings = validate_pairs(&pairs, &config.normalizer());
    for w in &warnings {
        let prefix = w
            .position
            .map(|p| format!("  [#{p}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Question bank valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
