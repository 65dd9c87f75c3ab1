//! Topic taxonomy model and lookup service
//!
//! The taxonomy is owned outside the importer. It is loaded once per run
//! from a JSON domain document and exposed through [`TaxonomyService`]:
//!
//! ```json
//! {
//!   "subjectID": "civil_engineering",
//!   "domainID": "construction_safety",
//!   "topics": [
//!     { "id": "work_methods", "name": "...", "subTopics": [ { "id": "...", "name": "..." } ] }
//!   ]
//! }
//! ```
//!
//! A file may also hold an array of such documents.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Leaf of the taxonomy; `name` is the display name categories match against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTopic {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub name: String,
    #[serde(default, rename = "subTopics")]
    pub sub_topics: Vec<SubTopic>,
}

/// Topics of one subject/domain pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainTaxonomy {
    #[serde(rename = "subjectID")]
    pub subject_id: String,
    #[serde(rename = "domainID")]
    pub domain_id: String,
    #[serde(default)]
    pub topics: Vec<Topic>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TaxonomyDocument {
    One(DomainTaxonomy),
    Many(Vec<DomainTaxonomy>),
}

/// Read-only topic lookup used by the category mapper and question checker
pub trait TaxonomyService: Send + Sync {
    /// All topics (with their subtopics) belonging to a subject
    fn topics_for_subject(&self, subject_id: &str) -> Vec<Topic>;
}

/// In-memory taxonomy loaded from JSON
#[derive(Debug, Clone, Default)]
pub struct StaticTaxonomy {
    domains: Vec<DomainTaxonomy>,
}

impl StaticTaxonomy {
    pub fn new(domains: Vec<DomainTaxonomy>) -> Result<Self> {
        for domain in &domains {
            if domain.subject_id.is_empty() || domain.domain_id.is_empty() {
                return Err(Error::InvalidInput(
                    "Invalid domain data - missing domain or subject ID".to_string(),
                ));
            }
            for topic in &domain.topics {
                if topic.id.is_empty() || topic.name.is_empty() {
                    return Err(Error::InvalidInput(format!(
                        "Invalid topic data in domain {} - missing id or name",
                        domain.domain_id
                    )));
                }
                if let Some(sub) = topic
                    .sub_topics
                    .iter()
                    .find(|s| s.id.is_empty() || s.name.is_empty())
                {
                    return Err(Error::InvalidInput(format!(
                        "Invalid subtopic {:?} in topic {} - missing id or name",
                        sub, topic.id
                    )));
                }
            }
        }
        Ok(Self { domains })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let domains = match serde_json::from_str::<TaxonomyDocument>(json)? {
            TaxonomyDocument::One(domain) => vec![domain],
            TaxonomyDocument::Many(domains) => domains,
        };
        Self::new(domains)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let taxonomy = Self::from_json_str(&content)?;
        info!(
            "Loaded taxonomy from {}: {} domain(s), {} topic(s)",
            path.display(),
            taxonomy.domains.len(),
            taxonomy.domains.iter().map(|d| d.topics.len()).sum::<usize>()
        );
        Ok(taxonomy)
    }

    pub fn domains(&self) -> &[DomainTaxonomy] {
        &self.domains
    }
}

impl TaxonomyService for StaticTaxonomy {
    fn topics_for_subject(&self, subject_id: &str) -> Vec<Topic> {
        self.domains
            .iter()
            .filter(|d| d.subject_id == subject_id)
            .flat_map(|d| d.topics.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLE: &str = r#"{
        "subjectID": "civil_engineering",
        "domainID": "construction_safety",
        "topics": [
            { "id": "height", "name": "עבודה בגובה", "subTopics": [
                { "id": "fragile_or_steep_roofs", "name": "גגות שבירים או תלולים" }
            ]}
        ]
    }"#;

    #[test]
    fn test_single_document() {
        let taxonomy = StaticTaxonomy::from_json_str(SINGLE).unwrap();
        let topics = taxonomy.topics_for_subject("civil_engineering");
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].sub_topics[0].id, "fragile_or_steep_roofs");
        assert!(taxonomy.topics_for_subject("mathematics").is_empty());
    }

    #[test]
    fn test_document_array_merges_subject_topics() {
        let json = r#"[
            { "subjectID": "s", "domainID": "d1", "topics": [ { "id": "t1", "name": "T1" } ] },
            { "subjectID": "s", "domainID": "d2", "topics": [ { "id": "t2", "name": "T2" } ] },
            { "subjectID": "other", "domainID": "d3", "topics": [ { "id": "t3", "name": "T3" } ] }
        ]"#;
        let taxonomy = StaticTaxonomy::from_json_str(json).unwrap();
        let ids: Vec<String> = taxonomy
            .topics_for_subject("s")
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["t1", "t2"]);
        assert!(taxonomy.topics_for_subject("s")[0].sub_topics.is_empty());
    }

    #[test]
    fn test_rejects_topic_without_name() {
        let json = r#"{ "subjectID": "s", "domainID": "d", "topics": [ { "id": "t", "name": "" } ] }"#;
        assert!(matches!(
            StaticTaxonomy::from_json_str(json),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            StaticTaxonomy::from_json_str("{ not json"),
            Err(Error::Json(_))
        ));
    }
}
