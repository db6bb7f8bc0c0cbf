//! The `gradewise suggest` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use gradewise_core::loader::load_corpus;
use gradewise_core::suggest::suggest;
use gradewise_providers::config::load_config_from;

pub async fn execute(
    corpus: PathBuf,
    query: String,
    text_column: Option<String>,
    show: Option<String>,
    min_results: Option<usize>,
    embedder: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let embedder = config.embedder(embedder.as_deref())?;
    let normalizer = config.normalizer();
    let mut options = config.suggest;
    if let Some(min) = min_results {
        options.min_results = min;
    }

    let entries = load_corpus(&corpus)?;
    let texts = entries
        .iter()
        .map(|e| {
            e.text(text_column.as_deref()).ok_or_else(|| {
                anyhow::anyhow!(
                    "column '{}' not found in {}",
                    text_column.as_deref().unwrap_or_default(),
                    corpus.display()
                )
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let suggestions = suggest(embedder.as_ref(), &normalizer, &query, &texts, options).await?;

    if suggestions.matches.is_empty() {
        println!("No matching entries.");
        return Ok(());
    }

    let display_column = show.as_deref().or(text_column.as_deref());
    let mut table = Table::new();
    table.set_header(vec!["Row", "Similarity", "Entry"]);
    for m in &suggestions.matches {
        let entry = &entries[m.index];
        let shown = display_column
            .and_then(|c| entry.field(c).map(str::to_string))
            .unwrap_or_else(|| texts[m.index].clone());
        table.add_row(vec![
            Cell::new(m.index + 1),
            Cell::new(format!("{:.3}", m.similarity)),
            Cell::new(shown),
        ]);
    }

    println!("{table}");
    println!(
        "{} match(es) above similarity {:.2}",
        suggestions.matches.len(),
        suggestions.threshold
    );

    Ok(())
}
