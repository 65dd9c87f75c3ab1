//! Canonical question model
//!
//! This is the shape the question bank stores. Field names serialize in
//! camelCase to match the documents already in the bank.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A fully-formed question bank entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalQuestion {
    /// `XXX-YYY-NNNNNN`: subject code, domain code, 6-digit number
    pub id: String,
    pub content: QuestionContent,
    pub answer: QuestionAnswer,
    pub metadata: QuestionMetadata,
    pub evaluation_criteria: Vec<EvaluationCriterion>,
}

impl CanonicalQuestion {
    pub fn criteria_weight_total(&self) -> u32 {
        self.evaluation_criteria.iter().map(|c| c.weight).sum()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    #[default]
    Markdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionContent {
    pub text: String,
    pub format: ContentFormat,
    /// Present only for multiple-choice questions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<QuestionOption>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub text: String,
    pub format: ContentFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnswer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_answer: Option<FinalAnswer>,
    pub solution: Solution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalAnswer {
    #[serde(rename = "type")]
    pub kind: FinalAnswerType,
    /// 1-based index of the correct option
    pub value: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalAnswerType {
    MultipleChoice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub text: String,
    pub format: ContentFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    Open,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerFormat {
    pub has_final_answer: bool,
    /// `multiple_choice` or `none`
    pub final_answer_type: String,
    pub requires_solution: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionMetadata {
    pub subject_id: String,
    pub domain_id: String,
    pub topic_id: String,
    pub subtopic_id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    /// 1 (easy) to 5 (hard)
    pub difficulty: u8,
    /// Minutes
    pub estimated_time: u32,
    pub answer_format: AnswerFormat,
    pub source: QuestionSource,
}

/// Where a question came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QuestionSource {
    Exam(ExamSource),
    Manual(ManualSource),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamSource {
    pub exam_template_id: String,
    pub year: u16,
    pub season: Season,
    pub moed: Moed,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualSource {
    pub creator_type: CreatorType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
}

/// Exam sitting designator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Moed {
    A,
    B,
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Season::Spring => f.write_str("spring"),
            Season::Summer => f.write_str("summer"),
        }
    }
}

impl fmt::Display for Moed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Moed::A => f.write_str("a"),
            Moed::B => f.write_str("b"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreatorType {
    Human,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationCriterion {
    pub name: String,
    pub description: String,
    pub weight: u32,
}

/// What gets handed to persistence: the question plus where it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub question: CanonicalQuestion,
    pub validation_status: ValidationStatus,
    pub import_info: ImportInfo,
}

/// Outcome of the import checks for a stored question
///
/// Only questions that passed every check are stored. `Warning` marks one
/// whose markup could not be converted and was kept as cleaned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Valid,
    Warning,
}

impl ValidationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationStatus::Valid => "valid",
            ValidationStatus::Warning => "warning",
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance of an imported question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportInfo {
    /// Source system name
    pub system: String,
    pub original_id: String,
    pub original_title: String,
    pub original_category: String,
    pub run_id: String,
    pub imported_by: String,
    pub transformations: Vec<String>,
    /// RFC 3339
    pub imported_at: String,
}
