//! Source record → canonical question
//!
//! Pure: no I/O, same output for the same record, taxonomy and aliases.
//! Besides category mapping, the only step that can abort is exam-info
//! reconciliation.

use qbank_common::config::SubjectConfig;
use qbank_common::question::{
    AnswerFormat, CanonicalQuestion, ContentFormat, CreatorType, EvaluationCriterion, ExamSource,
    FinalAnswer, FinalAnswerType, ManualSource, Moed, QuestionAnswer, QuestionContent,
    QuestionMetadata, QuestionOption, QuestionSource, QuestionType, Season, Solution,
};

use super::category_mapper::CategoryMapper;
use super::exam_info::{self, ExamInfo};
use super::question_id;
use super::text_normalizer::{self, HtmlOutcome};
use crate::error::{ImportError, Result};
use crate::models::SourceRecord;

const DEFAULT_SOLUTION: &str = "No explanation provided";
const DEFAULT_DIFFICULTY: u8 = 3;
const MULTIPLE_CHOICE_MINUTES: u32 = 5;
const OPEN_QUESTION_MINUTES: u32 = 10;

/// Transformation steps recorded in import provenance
pub mod steps {
    pub const HTML_TO_MARKDOWN: &str = "html-to-markdown";
    pub const HTML_CLEANUP_ONLY: &str = "html-cleanup-only";
    pub const EXAM_INFO_EXTRACTION: &str = "exam-info-extraction";
    pub const CATEGORY_MAPPING: &str = "category-mapping";
    pub const OPTION_CLEANUP: &str = "option-cleanup";
}

/// A transformed question plus the steps that changed it
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    pub question: CanonicalQuestion,
    pub transformations: Vec<String>,
}

pub struct QuestionTransformer {
    mapper: CategoryMapper,
    subject: SubjectConfig,
}

impl QuestionTransformer {
    pub fn new(mapper: CategoryMapper, subject: SubjectConfig) -> Self {
        Self { mapper, subject }
    }

    pub fn mapper(&self) -> &CategoryMapper {
        &self.mapper
    }

    pub fn subject(&self) -> &SubjectConfig {
        &self.subject
    }

    pub fn transform(&self, record: &SourceRecord) -> Result<CanonicalQuestion> {
        self.transform_detailed(record).map(|t| t.question)
    }

    pub fn transform_detailed(&self, record: &SourceRecord) -> Result<Transformed> {
        let mut notes = HtmlNotes::default();

        let title_info = exam_info::parse(&record.title);

        let body = notes.normalize(&record.question, false);
        let extraction = exam_info::extract_from_body(&body);
        if let Some(body_info) = &extraction.exam_info {
            let mismatches = exam_info::reconcile(&title_info, body_info);
            if !mismatches.is_empty() {
                return Err(ImportError::ExamInfoMismatch(mismatches));
            }
        }

        let mapping = self
            .mapper
            .map_category(record.category_label().unwrap_or(""))?;

        let kind = record.kind();
        let (options, final_answer) = match kind {
            QuestionType::MultipleChoice => {
                let (options, final_answer) = self.multiple_choice(record, &mut notes)?;
                (Some(options), Some(final_answer))
            }
            QuestionType::Open => (None, None),
        };

        let solution_text = notes.normalize(&record.correct_msg, false);
        let solution_text = if solution_text.is_empty() {
            DEFAULT_SOLUTION.to_string()
        } else {
            solution_text
        };

        let question = CanonicalQuestion {
            id: question_id::generate(
                &self.subject.subject_code,
                &self.subject.domain_code,
                record.id,
            ),
            content: QuestionContent {
                text: extraction.cleaned_text,
                format: ContentFormat::Markdown,
                options,
            },
            answer: QuestionAnswer {
                final_answer,
                solution: Solution {
                    text: solution_text,
                    format: ContentFormat::Markdown,
                },
            },
            metadata: QuestionMetadata {
                subject_id: self.subject.subject_id.clone(),
                domain_id: self.subject.domain_id.clone(),
                topic_id: mapping.topic_id,
                subtopic_id: mapping.subtopic_id,
                question_type: kind,
                difficulty: DEFAULT_DIFFICULTY,
                estimated_time: match kind {
                    QuestionType::MultipleChoice => MULTIPLE_CHOICE_MINUTES,
                    QuestionType::Open => OPEN_QUESTION_MINUTES,
                },
                answer_format: answer_format(kind),
                source: self.source(&title_info, extraction.exam_info.as_ref()),
            },
            evaluation_criteria: vec![criterion(kind)],
        };

        let mut transformations = Vec::new();
        if notes.converted {
            transformations.push(steps::HTML_TO_MARKDOWN.to_string());
        }
        if notes.cleaned_only {
            transformations.push(steps::HTML_CLEANUP_ONLY.to_string());
        }
        if title_info.identifies_sitting() || extraction.exam_info.is_some() {
            transformations.push(steps::EXAM_INFO_EXTRACTION.to_string());
        }
        transformations.push(steps::CATEGORY_MAPPING.to_string());
        if kind == QuestionType::MultipleChoice {
            transformations.push(steps::OPTION_CLEANUP.to_string());
        }

        Ok(Transformed {
            question,
            transformations,
        })
    }

    fn multiple_choice(
        &self,
        record: &SourceRecord,
        notes: &mut HtmlNotes,
    ) -> Result<(Vec<QuestionOption>, FinalAnswer)> {
        let answers = record.answers.as_deref().unwrap_or_default();

        let correct_index = answers
            .iter()
            .position(|a| a.is_correct)
            .ok_or_else(|| {
                ImportError::InvalidQuestion(vec!["No answer is marked correct".to_string()])
            })?;
        let value = u8::try_from(correct_index + 1).map_err(|_| {
            ImportError::InvalidQuestion(vec![format!(
                "Correct answer index {} out of range",
                correct_index + 1
            )])
        })?;

        let options = answers
            .iter()
            .map(|a| QuestionOption {
                text: text_normalizer::clean_option_text(&notes.normalize(&a.text, a.is_html)),
                format: ContentFormat::Markdown,
            })
            .collect();

        Ok((
            options,
            FinalAnswer {
                kind: FinalAnswerType::MultipleChoice,
                value,
            },
        ))
    }

    /// Exam attribution when the title names a year, manual authorship otherwise
    fn source(&self, title: &ExamInfo, body: Option<&ExamInfo>) -> QuestionSource {
        match title.year {
            Some(year) => QuestionSource::Exam(ExamSource {
                exam_template_id: self.subject.exam_template_id.clone(),
                year,
                season: title.season.unwrap_or(Season::Summer),
                moed: title.moed.unwrap_or(Moed::A),
                order: title.order.or_else(|| body.and_then(|b| b.order)),
            }),
            None => QuestionSource::Manual(ManualSource {
                creator_type: CreatorType::Human,
            }),
        }
    }
}

fn answer_format(kind: QuestionType) -> AnswerFormat {
    match kind {
        QuestionType::MultipleChoice => AnswerFormat {
            has_final_answer: true,
            final_answer_type: "multiple_choice".to_string(),
            requires_solution: true,
        },
        QuestionType::Open => AnswerFormat {
            has_final_answer: false,
            final_answer_type: "none".to_string(),
            requires_solution: true,
        },
    }
}

fn criterion(kind: QuestionType) -> EvaluationCriterion {
    match kind {
        QuestionType::MultipleChoice => EvaluationCriterion {
            name: "basic_correctness".to_string(),
            description: "תשובה נכונה ומלאה".to_string(),
            weight: 100,
        },
        QuestionType::Open => EvaluationCriterion {
            name: "solution_quality".to_string(),
            description: "איכות הפתרון והשימוש בתקנות".to_string(),
            weight: 100,
        },
    }
}

/// Tracks which HTML path each normalized field took
#[derive(Default)]
struct HtmlNotes {
    converted: bool,
    cleaned_only: bool,
}

impl HtmlNotes {
    fn normalize(&mut self, text: &str, is_html: bool) -> String {
        let normalized = text_normalizer::normalize_detailed(text, is_html);
        match normalized.outcome {
            HtmlOutcome::Plain => {}
            HtmlOutcome::Converted => self.converted = true,
            HtmlOutcome::CleanedOnly => self.cleaned_only = true,
        }
        normalized.text
    }
}
