//! The `gradewise quiz` command.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{AsyncBufReadExt, BufReader};

use gradewise_core::loader::load_pairs;
use gradewise_core::report::QuizReport;
use gradewise_core::{Grader, QuizError, QuizSession, SessionState};
use gradewise_providers::config::load_config_from;

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    questions: PathBuf,
    count: Option<usize>,
    threshold: Option<f64>,
    seed: Option<u64>,
    embedder: Option<String>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let threshold = config.threshold(threshold)?;
    let embedder = config.embedder(embedder.as_deref())?;
    let grader = Grader::new(embedder).with_normalizer(config.normalizer());

    let pairs = load_pairs(&questions)?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut session = QuizSession::new(threshold);
    session.start(pairs, count, &mut rng)?;
    let started_at = chrono::Utc::now();

    if session.state() == SessionState::Completed {
        println!("No questions to ask in {}.", questions.display());
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let (Some(progress), Some(pair)) = (session.progress(), session.current_pair().cloned()) {
        print!("\n[{progress}] {}\n> ", pair.question);
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await.context("failed to read answer")? else {
            println!();
            break;
        };
        let answer = line.trim();

        if answer.is_empty() {
            session.skip()?;
            println!("Skipped. Expected: {}", pair.reference_answer);
            continue;
        }

        match session.submit(&grader, answer).await {
            Ok(result) if result.verdict.is_correct() => {
                println!("Correct! (similarity {:.3})", result.similarity_score);
            }
            Ok(result) => {
                println!(
                    "Incorrect (similarity {:.3}). Expected: {}",
                    result.similarity_score, pair.reference_answer
                );
            }
            Err(QuizError::EmptyInput(side)) => {
                tracing::debug!(%side, "answer normalized to nothing");
                session.skip()?;
                println!(
                    "That answer has no content words; skipped. Expected: {}",
                    pair.reference_answer
                );
            }
            Err(e) => {
                eprintln!("Could not grade that answer: {e}. Try again, or press Enter to skip.");
            }
        }
    }

    match session.summary() {
        Ok(summary) => {
            print_answers(&session);
            println!("\nFinal score: {summary}");
        }
        Err(_) => {
            println!(
                "Quiz ended early: {} correct after {} of {} questions.",
                session.score(),
                session.answers().len(),
                session.total()
            );
        }
    }

    if let Some(dir) = output {
        let report = QuizReport::from_session(&session, grader.embedder().name(), started_at);
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
        let path = dir.join(format!("quiz-{timestamp}.json"));
        report.save_json(&path)?;
        eprintln!("Report saved to: {}", path.display());
    }

    Ok(())
}

fn print_answers(session: &QuizSession) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Your answer", "Similarity", "Verdict"]);

    for (i, record) in session.answers().iter().enumerate() {
        let (similarity, verdict) = match &record.result {
            Some(r) => (format!("{:.3}", r.similarity_score), r.verdict.to_string()),
            None => ("-".to_string(), "skipped".to_string()),
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&record.question),
            Cell::new(record.candidate.as_deref().unwrap_or("")),
            Cell::new(similarity),
            Cell::new(verdict),
        ]);
    }

    println!("\n{table}");
}
