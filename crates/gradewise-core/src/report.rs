//! Quiz report types with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Threshold;
use crate::session::{AnswerRecord, QuizSession, QuizSummary};

/// A record of one completed (or abandoned) quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the quiz started.
    pub started_at: DateTime<Utc>,
    /// When the report was taken.
    pub finished_at: DateTime<Utc>,
    /// Name of the embedding provider that graded the answers.
    pub embedder: String,
    pub threshold: Threshold,
    /// Questions selected for the quiz.
    pub total_questions: usize,
    /// Per-question outcomes, in quiz order.
    pub answers: Vec<AnswerRecord>,
    /// Final score; absent when the quiz was not completed.
    pub summary: Option<QuizSummary>,
}

impl QuizReport {
    /// Snapshot a session.
    pub fn from_session(session: &QuizSession, embedder: &str, started_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at,
            finished_at: Utc::now(),
            embedder: embedder.to_string(),
            threshold: session.threshold(),
            total_questions: session.total(),
            answers: session.answers().to_vec(),
            summary: session.summary().ok(),
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }
}
