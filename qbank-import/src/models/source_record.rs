//! Legacy quiz-plugin export records
//!
//! Field names follow the export verbatim (`_id`, `_question`, ...). The
//! export is loose about types: ids arrive as numbers or strings, flags as
//! booleans, numbers or strings, and text fields may be `null`.

use qbank_common::question::QuestionType;
use serde::{Deserialize, Deserializer, Serialize};

use crate::services::text_normalizer;

/// One question as exported by the legacy quiz plugin
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Numeric source id; drives the canonical id number
    #[serde(rename = "_id", default, deserialize_with = "lenient_u64")]
    pub id: u64,

    /// Title, usually carrying the exam designator ("שאלה 12 - קיץ 2022 מועד א")
    #[serde(rename = "_title", default, deserialize_with = "null_as_default")]
    pub title: String,

    /// Question body (may be HTML)
    #[serde(rename = "_question", default, deserialize_with = "null_as_default")]
    pub question: String,

    /// Explanation shown for a correct answer; becomes the solution
    #[serde(rename = "_correctMsg", default, deserialize_with = "null_as_default")]
    pub correct_msg: String,

    #[serde(rename = "_incorrectMsg", default, deserialize_with = "null_as_default")]
    pub incorrect_msg: String,

    /// Plugin answer-kind tag (`single`, `free_answer`, ...)
    #[serde(rename = "_answerType", default, deserialize_with = "null_as_default")]
    pub answer_type: String,

    /// `None` when the export carries no answer list at all
    #[serde(rename = "_answerData", default)]
    pub answers: Option<Vec<SourceAnswer>>,

    /// Raw category label, assigned from the category sheet at load time
    #[serde(rename = "_category", default)]
    pub category: Option<String>,

    #[serde(rename = "_createdAt", default)]
    pub created_at: Option<String>,

    #[serde(rename = "_updatedAt", default)]
    pub updated_at: Option<String>,
}

/// One answer option
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceAnswer {
    #[serde(rename = "_answer", default, deserialize_with = "null_as_default")]
    pub text: String,

    #[serde(rename = "_correct", default, deserialize_with = "lenient_bool")]
    pub is_correct: bool,

    /// Plugin flag: answer text is HTML
    #[serde(rename = "_html", default, deserialize_with = "lenient_bool")]
    pub is_html: bool,
}

impl SourceAnswer {
    pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            text: text.into(),
            is_correct,
            is_html: false,
        }
    }
}

impl SourceRecord {
    /// Question kind implied by the plugin's answer-kind tag
    ///
    /// Unknown tags are treated as multiple-choice, which is what the
    /// exports overwhelmingly contain.
    pub fn kind(&self) -> QuestionType {
        match self.answer_type.trim().to_ascii_lowercase().as_str() {
            "free_answer" | "essay" | "open" => QuestionType::Open,
            _ => QuestionType::MultipleChoice,
        }
    }

    /// Trimmed category label, `None` when absent or blank
    pub fn category_label(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    pub fn has_solution(&self) -> bool {
        !self.correct_msg.trim().is_empty()
    }

    /// Any HTML in the body, the explanation, or the answers
    pub fn has_markup(&self) -> bool {
        text_normalizer::contains_markup(&self.question)
            || text_normalizer::contains_markup(&self.correct_msg)
            || self.answers.iter().flatten().any(|a| {
                a.is_html || text_normalizer::contains_markup(&a.text)
            })
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Bool(bool),
    Number(u64),
    Text(String),
    Null,
}

fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    match Loose::deserialize(deserializer)? {
        Loose::Number(n) => Ok(n),
        Loose::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid numeric id: {:?}", s))),
        Loose::Null => Ok(0),
        Loose::Bool(b) => Err(serde::de::Error::custom(format!(
            "invalid numeric id: {}",
            b
        ))),
    }
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Loose::deserialize(deserializer)? {
        Loose::Bool(b) => b,
        Loose::Number(n) => n != 0,
        Loose::Text(s) => matches!(s.trim(), "1" | "true" | "yes"),
        Loose::Null => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_loose_export_types() {
        let record: SourceRecord = serde_json::from_str(
            r#"{
                "_id": "1234",
                "_title": "שאלה 3 - קיץ 2022 מועד א",
                "_question": "<p>מהו הגובה?</p>",
                "_correctMsg": null,
                "_answerType": "single",
                "_answerData": [
                    { "_answer": "א. 1 מ'", "_correct": false, "_html": false },
                    { "_answer": "2 מ'", "_correct": 1 },
                    { "_answer": "3 מ'", "_correct": "0" },
                    { "_answer": null, "_correct": null }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(record.id, 1234);
        assert_eq!(record.correct_msg, "");
        assert!(!record.has_solution());
        let answers = record.answers.as_ref().unwrap();
        assert_eq!(answers.len(), 4);
        assert!(answers[1].is_correct);
        assert!(!answers[2].is_correct);
        assert_eq!(answers[3].text, "");
        assert!(record.has_markup());
        assert_eq!(record.kind(), QuestionType::MultipleChoice);
    }

    #[test]
    fn test_missing_answer_data_is_none() {
        let record: SourceRecord = serde_json::from_str(r#"{ "_id": 7 }"#).unwrap();
        assert!(record.answers.is_none());
        assert_eq!(record.category_label(), None);
    }

    #[test]
    fn test_kind_from_answer_type() {
        let mut record = SourceRecord {
            answer_type: "free_answer".to_string(),
            ..Default::default()
        };
        assert_eq!(record.kind(), QuestionType::Open);
        record.answer_type = "essay".to_string();
        assert_eq!(record.kind(), QuestionType::Open);
        record.answer_type = "multiple".to_string();
        assert_eq!(record.kind(), QuestionType::MultipleChoice);
        record.answer_type = String::new();
        assert_eq!(record.kind(), QuestionType::MultipleChoice);
    }

    #[test]
    fn test_blank_category_label() {
        let record = SourceRecord {
            category: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(record.category_label(), None);
    }

    #[test]
    fn test_rejects_non_numeric_id() {
        assert!(serde_json::from_str::<SourceRecord>(r#"{ "_id": "abc" }"#).is_err());
    }
}
