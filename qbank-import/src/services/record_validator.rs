//! Structural validation of source records, before transformation
//!
//! Every applicable check runs so one call reports the full error set.

use qbank_common::config::{IdStrategy, SubjectConfig};
use qbank_common::question::QuestionType;

use super::question_id;
use crate::models::{RunMode, SourceRecord};

pub struct RecordValidator {
    subject_code: String,
    domain_code: String,
    mode: RunMode,
    id_strategy: IdStrategy,
}

impl RecordValidator {
    pub fn new(subject: &SubjectConfig, mode: RunMode) -> Self {
        Self {
            subject_code: subject.subject_code.clone(),
            domain_code: subject.domain_code.clone(),
            mode,
            id_strategy: IdStrategy::Source,
        }
    }

    /// Source-derived ids are only checked when they become the stored id
    pub fn with_id_strategy(mut self, id_strategy: IdStrategy) -> Self {
        self.id_strategy = id_strategy;
        self
    }

    /// All problems with `record`; empty means valid
    pub fn validate(&self, record: &SourceRecord) -> Vec<String> {
        let mut errors = Vec::new();

        // Provisional id; live runs keeping source ids only
        if self.mode == RunMode::Live && self.id_strategy == IdStrategy::Source {
            let id = question_id::generate(&self.subject_code, &self.domain_code, record.id);
            if let Err(e) = question_id::check_format(&id, &self.subject_code, &self.domain_code)
            {
                errors.push(e.to_string());
            }
        }

        if record.question.trim().is_empty() {
            errors.push("Question text is required".to_string());
        }

        match record.kind() {
            QuestionType::MultipleChoice => match &record.answers {
                None => errors.push("Answer data is required and must be an array".to_string()),
                Some(answers) => {
                    if answers.len() != 4 {
                        errors.push(
                            "Multiple choice questions must have exactly 4 answers".to_string(),
                        );
                    }
                    if answers.iter().filter(|a| a.is_correct).count() != 1 {
                        errors.push(
                            "Multiple choice questions must have exactly 1 correct answer"
                                .to_string(),
                        );
                    }
                    for (index, answer) in answers.iter().enumerate() {
                        if answer.text.trim().is_empty() {
                            errors.push(format!("Answer {} text is missing", index + 1));
                        }
                    }
                }
            },
            QuestionType::Open => {
                if !record.has_solution() {
                    errors.push("Open questions require solution text".to_string());
                }
            }
        }

        if record.category_label().is_none() {
            errors.push("Category is required".to_string());
        }

        errors
    }
}
