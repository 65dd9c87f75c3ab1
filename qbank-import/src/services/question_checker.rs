//! Post-transform structural check of a canonical question
//!
//! Catches anything the transform produced that the bank would reject.
//! Errors are reported as `field: message`. The id format is not checked
//! here; the record validator covers it in live mode.

use qbank_common::config::SubjectConfig;
use qbank_common::question::{CanonicalQuestion, QuestionType};

use super::category_mapper::CategoryMapper;

const OPTION_COUNT: usize = 4;

pub struct QuestionChecker {
    subject_id: String,
    domain_id: String,
}

impl QuestionChecker {
    pub fn new(subject: &SubjectConfig) -> Self {
        Self {
            subject_id: subject.subject_id.clone(),
            domain_id: subject.domain_id.clone(),
        }
    }

    pub fn check(&self, question: &CanonicalQuestion, mapper: &CategoryMapper) -> Vec<String> {
        let mut errors = Vec::new();
        let mut fail = |field: &str, message: String| errors.push(format!("{}: {}", field, message));

        if question.content.text.trim().is_empty() {
            fail("content.text", "Question text is missing".to_string());
        }

        match question.metadata.question_type {
            QuestionType::MultipleChoice => {
                match &question.content.options {
                    None => fail(
                        "content.options",
                        "Multiple choice questions must have options".to_string(),
                    ),
                    Some(options) => {
                        if options.len() != OPTION_COUNT {
                            fail(
                                "content.options",
                                format!("Expected {} options, got {}", OPTION_COUNT, options.len()),
                            );
                        }
                        for (index, option) in options.iter().enumerate() {
                            if option.text.trim().is_empty() {
                                fail(
                                    &format!("content.options[{}].text", index),
                                    "Option text is missing".to_string(),
                                );
                            }
                        }
                    }
                }
                match &question.answer.final_answer {
                    None => fail(
                        "answer.finalAnswer",
                        "Multiple choice questions must have a final answer".to_string(),
                    ),
                    Some(answer) if !(1..=OPTION_COUNT as u8).contains(&answer.value) => fail(
                        "answer.finalAnswer.value",
                        format!("Must be between 1 and {}, got {}", OPTION_COUNT, answer.value),
                    ),
                    Some(_) => {}
                }
            }
            QuestionType::Open => {
                if question.content.options.is_some() {
                    fail(
                        "content.options",
                        "Open questions must not have options".to_string(),
                    );
                }
                if question.answer.final_answer.is_some() {
                    fail(
                        "answer.finalAnswer",
                        "Open questions must not have a final answer".to_string(),
                    );
                }
            }
        }

        if question.answer.solution.text.trim().is_empty() {
            fail("answer.solution.text", "Solution text is missing".to_string());
        }

        let metadata = &question.metadata;
        if metadata.subject_id != self.subject_id {
            fail(
                "metadata.subjectId",
                format!("Expected {}, got {}", self.subject_id, metadata.subject_id),
            );
        }
        if metadata.domain_id != self.domain_id {
            fail(
                "metadata.domainId",
                format!("Expected {}, got {}", self.domain_id, metadata.domain_id),
            );
        }
        if !mapper.contains(&metadata.topic_id, &metadata.subtopic_id) {
            fail(
                "metadata.subtopicId",
                format!(
                    "Subtopic {} is not part of topic {}",
                    metadata.subtopic_id, metadata.topic_id
                ),
            );
        }
        if !(1..=5).contains(&metadata.difficulty) {
            fail(
                "metadata.difficulty",
                format!("Must be between 1 and 5, got {}", metadata.difficulty),
            );
        }
        if metadata.estimated_time == 0 {
            fail("metadata.estimatedTime", "Must be positive".to_string());
        }

        let weight = question.criteria_weight_total();
        if weight != 100 {
            fail(
                "evaluationCriteria",
                format!("Weights must sum to 100, got {}", weight),
            );
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SourceAnswer, SourceRecord};
    use crate::services::category_mapper::AliasTable;
    use crate::services::question_transformer::QuestionTransformer;
    use qbank_common::question::{EvaluationCriterion, QuestionOption};
    use qbank_common::taxonomy::StaticTaxonomy;

    fn transformer() -> QuestionTransformer {
        let taxonomy = StaticTaxonomy::from_json_str(
            r#"{
                "subjectID": "civil_engineering",
                "domainID": "construction_safety",
                "topics": [
                    { "id": "management", "name": "ניהול בטיחות", "subTopics": [
                        { "id": "safety_plans", "name": "תכניות בטיחות" }
                    ]}
                ]
            }"#,
        )
        .unwrap();
        let mapper = CategoryMapper::new(AliasTable::default(), &taxonomy, "civil_engineering");
        QuestionTransformer::new(mapper, SubjectConfig::default())
    }

    fn question() -> CanonicalQuestion {
        let record = SourceRecord {
            id: 5,
            question: "מי אחראי על תכנית הבטיחות?".to_string(),
            answers: Some(vec![
                SourceAnswer::new("מנהל העבודה", true),
                SourceAnswer::new("הקבלן", false),
                SourceAnswer::new("המפקח", false),
                SourceAnswer::new("העובד", false),
            ]),
            category: Some("תוכניות בטיחות".to_string()),
            ..Default::default()
        };
        transformer().transform(&record).unwrap()
    }

    fn check(question: &CanonicalQuestion) -> Vec<String> {
        let transformer = transformer();
        QuestionChecker::new(transformer.subject()).check(question, transformer.mapper())
    }

    #[test]
    fn test_transformed_question_passes() {
        assert!(check(&question()).is_empty());
    }

    #[test]
    fn test_reports_field_errors() {
        let mut q = question();
        q.content.options = Some(vec![QuestionOption {
            text: " ".to_string(),
            format: Default::default(),
        }]);
        q.evaluation_criteria.push(EvaluationCriterion {
            name: "extra".to_string(),
            description: String::new(),
            weight: 10,
        });
        q.metadata.subtopic_id = "nowhere".to_string();

        assert_eq!(
            check(&q),
            vec![
                "content.options: Expected 4 options, got 1",
                "content.options[0].text: Option text is missing",
                "metadata.subtopicId: Subtopic nowhere is not part of topic management",
                "evaluationCriteria: Weights must sum to 100, got 110",
            ]
        );
    }

    #[test]
    fn test_final_answer_range() {
        let mut q = question();
        if let Some(answer) = q.answer.final_answer.as_mut() {
            answer.value = 5;
        }
        assert_eq!(
            check(&q),
            vec!["answer.finalAnswer.value: Must be between 1 and 4, got 5"]
        );
    }
}
