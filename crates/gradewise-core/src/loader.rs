//! CSV question sources.
//!
//! Question files have a header row and exactly two columns: the question
//! and its reference answer. Rows with any other shape are skipped with a
//! warning rather than failing the whole file.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::QuizError;
use crate::model::QuestionAnswerPair;
use crate::normalize::Normalizer;
use crate::suggest::CorpusEntry;

/// Load question/answer pairs from a CSV file.
pub fn load_pairs(path: &Path) -> Result<Vec<QuestionAnswerPair>, QuizError> {
    let file = open(path)?;
    let pairs = load_pairs_from_reader(file, path)?;
    debug!(path = %path.display(), pairs = pairs.len(), "loaded question source");
    Ok(pairs)
}

/// Load pairs from any reader. `source` is only used in messages.
pub fn load_pairs_from_reader<R: Read>(
    reader: R,
    source: &Path,
) -> Result<Vec<QuestionAnswerPair>, QuizError> {
    let mut csv_reader = reader_builder().from_reader(reader);
    let mut pairs = Vec::new();

    for (i, record) in csv_reader.records().enumerate() {
        let Some(record) = usable_record(record, i, source)? else {
            continue;
        };
        let line = line_of(&record, i);

        if record.len() != 2 {
            warn!(
                source = %source.display(),
                line,
                columns = record.len(),
                "skipping row without exactly two columns"
            );
            continue;
        }

        let (question, answer) = (&record[0], &record[1]);
        if question.is_empty() || answer.is_empty() {
            warn!(source = %source.display(), line, "skipping row with a blank field");
            continue;
        }
        pairs.push(QuestionAnswerPair::new(question, answer));
    }

    Ok(pairs)
}

/// Load a headered CSV file as generic corpus entries.
pub fn load_corpus(path: &Path) -> Result<Vec<CorpusEntry>, QuizError> {
    let file = open(path)?;
    load_corpus_from_reader(file, path)
}

pub fn load_corpus_from_reader<R: Read>(
    reader: R,
    source: &Path,
) -> Result<Vec<CorpusEntry>, QuizError> {
    let mut csv_reader = reader_builder().from_reader(reader);
    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|e| data_source_error(source, e))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut entries = Vec::new();
    for (i, record) in csv_reader.records().enumerate() {
        let Some(record) = usable_record(record, i, source)? else {
            continue;
        };
        if record.len() != headers.len() {
            warn!(
                source = %source.display(),
                line = line_of(&record, i),
                columns = record.len(),
                expected = headers.len(),
                "skipping corpus row with wrong column count"
            );
            continue;
        }
        let fields = headers
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();
        entries.push(CorpusEntry { fields });
    }

    Ok(entries)
}

/// A problem found in a question set that does not stop it from loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// 1-based position of the pair, when the warning is about one pair.
    pub position: Option<usize>,
    pub message: String,
}

/// Check a question set for issues that would surface mid-quiz.
pub fn validate_pairs(
    pairs: &[QuestionAnswerPair],
    normalizer: &Normalizer,
) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if pairs.is_empty() {
        warnings.push(ValidationWarning {
            position: None,
            message: "no usable question/answer rows".into(),
        });
    }

    let mut seen = HashSet::new();
    for (i, pair) in pairs.iter().enumerate() {
        if !seen.insert(pair.question.to_lowercase()) {
            warnings.push(ValidationWarning {
                position: Some(i + 1),
                message: format!("duplicate question: {}", pair.question),
            });
        }
    }

    // Such answers can never be graded.
    for (i, pair) in pairs.iter().enumerate() {
        if normalizer.normalize(&pair.reference_answer).is_empty() {
            warnings.push(ValidationWarning {
                position: Some(i + 1),
                message: format!(
                    "reference answer '{}' contains only stop words",
                    pair.reference_answer
                ),
            });
        }
    }

    warnings
}

fn open(path: &Path) -> Result<File, QuizError> {
    if !path.exists() {
        return Err(QuizError::DataSourceMissing(path.to_path_buf()));
    }
    File::open(path).map_err(|e| data_source_error(path, e))
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All);
    builder
}

/// Skip undecodable rows; fail only on I/O errors.
fn usable_record(
    record: csv::Result<csv::StringRecord>,
    index: usize,
    source: &Path,
) -> Result<Option<csv::StringRecord>, QuizError> {
    match record {
        Ok(record) => Ok(Some(record)),
        Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => Err(data_source_error(source, e)),
        Err(e) => {
            warn!(
                source = %source.display(),
                row = index + 1,
                error = %e,
                "skipping unreadable row"
            );
            Ok(None)
        }
    }
}

fn line_of(record: &csv::StringRecord, index: usize) -> u64 {
    record
        .position()
        .map(|p| p.line())
        .unwrap_or(index as u64 + 2)
}

fn data_source_error(path: &Path, e: impl std::fmt::Display) -> QuizError {
    QuizError::DataSource {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}
