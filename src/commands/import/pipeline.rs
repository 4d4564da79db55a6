use std::path::{Path, PathBuf};

use anyhow::Result;
use rusqlite::Connection;
use tracing::{debug, error, info, warn};

use super::answers::{AnswerResolver, ResolvedAnswers};
use super::classify::Classifier;
use super::content_hash::compute_content_hash;
use super::loader::load_question_file;
use super::repository::{find_question_by_hash, insert_question, update_question};
use super::types::{
    OptionRecord, QuestionMetadata, QuestionRecord, RawQuestion, RecordOutcome, SkipReason,
};
use crate::model::ImportCounts;
use crate::util::now_utc_string;

const PROGRESS_EVERY: usize = 10;
const MIN_OPTIONS: usize = 2;

impl ImportCounts {
    pub(crate) fn record(self, outcome: RecordOutcome) -> Self {
        let mut next = Self {
            processed: self.processed + 1,
            ..self
        };
        match outcome {
            RecordOutcome::Inserted => next.inserted += 1,
            RecordOutcome::Updated => next.updated += 1,
            RecordOutcome::Skipped(_) => next.skipped += 1,
            RecordOutcome::Failed => next.errors += 1,
        }
        next
    }

    pub(crate) fn file_failed(self) -> Self {
        Self {
            errors: self.errors + 1,
            ..self
        }
    }
}

pub(crate) struct ImportPipeline {
    classifier: Classifier,
    resolver: AnswerResolver,
}

impl ImportPipeline {
    pub fn new() -> Result<Self> {
        Ok(Self {
            classifier: Classifier::new()?,
            resolver: AnswerResolver::new()?,
        })
    }

    pub fn import_files(&self, connection: &mut Connection, files: &[PathBuf]) -> ImportCounts {
        files.iter().fold(ImportCounts::default(), |counts, path| {
            self.import_file(connection, path, counts)
        })
    }

    pub fn import_file(
        &self,
        connection: &mut Connection,
        path: &Path,
        counts: ImportCounts,
    ) -> ImportCounts {
        info!(file = %path.display(), "processing question file");

        let questions = match load_question_file(path) {
            Ok(questions) => questions,
            Err(err) => {
                error!(
                    file = %path.display(),
                    error = %format!("{err:#}"),
                    "failed to load question file"
                );
                return counts.file_failed();
            }
        };

        let source_name = source_name_for(path);
        info!(
            file = %path.display(),
            source = %source_name,
            questions = questions.len(),
            "loaded question file"
        );

        let counts = questions.iter().fold(counts, |counts, question| {
            let outcome = self.import_question(connection, question, &source_name);
            let counts = counts.record(outcome);
            if counts.processed % PROGRESS_EVERY == 0 {
                info!(
                    processed = counts.processed,
                    inserted = counts.inserted,
                    updated = counts.updated,
                    "import progress"
                );
            }
            counts
        });

        info!(file = %path.display(), "finished question file");
        counts
    }

    pub fn import_question(
        &self,
        connection: &mut Connection,
        question: &RawQuestion,
        source_name: &str,
    ) -> RecordOutcome {
        let record = match self.prepare_record(question, source_name) {
            Ok(record) => record,
            Err(reason) => {
                warn!(
                    file = %source_name,
                    question_id = %question.display_id(),
                    reason = %reason,
                    "skipping question"
                );
                return RecordOutcome::Skipped(reason);
            }
        };

        match upsert_record(connection, &record) {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(
                    file = %source_name,
                    question_id = %question.display_id(),
                    error = %format!("{err:#}"),
                    "failed to store question"
                );
                RecordOutcome::Failed
            }
        }
    }

    pub fn prepare_record(
        &self,
        question: &RawQuestion,
        source_name: &str,
    ) -> Result<QuestionRecord, SkipReason> {
        validate_question(question)?;

        let classification =
            self.classifier
                .classify(&question.text, source_name, question.options.len());
        let answers = self.resolver.resolve(question);
        debug!(
            question_id = %question.display_id(),
            answer_source = ?answers.source,
            answers = ?answers.indices,
            "resolved correct answers"
        );
        if !answers.is_resolved() {
            warn!(
                file = %source_name,
                question_id = %question.display_id(),
                "no correct answer found; storing question as unanswered"
            );
        }

        Ok(QuestionRecord {
            text: question.text.clone(),
            explanation: question.explanation.clone().unwrap_or_default(),
            classification,
            is_multiple_choice: answers.is_multiple_choice(),
            content_hash: compute_content_hash(&question.text, &question.options),
            metadata: QuestionMetadata {
                source_file: source_name.to_string(),
                original_id: question.source_id.clone(),
                has_correct_answer: answers.is_resolved(),
                extraction_date: now_utc_string(),
            },
            options: option_records(question, &answers),
        })
    }
}

pub(crate) fn validate_question(question: &RawQuestion) -> Result<(), SkipReason> {
    if question.text.trim().is_empty() {
        return Err(SkipReason::EmptyText);
    }
    if question.options.len() < MIN_OPTIONS {
        return Err(SkipReason::TooFewOptions(question.options.len()));
    }
    Ok(())
}

fn upsert_record(connection: &mut Connection, record: &QuestionRecord) -> Result<RecordOutcome> {
    match find_question_by_hash(connection, &record.content_hash)? {
        Some(question_id) => {
            update_question(connection, &question_id, record)?;
            Ok(RecordOutcome::Updated)
        }
        None => {
            insert_question(connection, record)?;
            Ok(RecordOutcome::Inserted)
        }
    }
}

fn option_records(question: &RawQuestion, answers: &ResolvedAnswers) -> Vec<OptionRecord> {
    question
        .options
        .iter()
        .enumerate()
        .map(|(index, option)| OptionRecord {
            label: option
                .label
                .clone()
                .unwrap_or_else(|| positional_label(index)),
            text: option.text.clone(),
            is_correct: answers.contains(index),
        })
        .collect()
}

fn positional_label(index: usize) -> String {
    u32::try_from(index)
        .ok()
        .and_then(|offset| u32::from(b'A').checked_add(offset))
        .and_then(char::from_u32)
        .map(String::from)
        .unwrap_or_else(|| (index + 1).to_string())
}

pub(crate) fn source_name_for(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
