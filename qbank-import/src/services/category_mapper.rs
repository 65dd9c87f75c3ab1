//! Category label → taxonomy subtopic mapping
//!
//! Raw labels come from a hand-maintained spreadsheet and drift from the
//! taxonomy's display names. An [`AliasTable`] repairs the known variants
//! before an exact-match search over the subject's subtopics.
//!
//! Precondition: subtopic display names are unique within a subject. The
//! first match wins and duplicates are not detected here.

use qbank_common::taxonomy::{TaxonomyService, Topic};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{ImportError, Result};

/// Known spreadsheet variants and their canonical subtopic names
const BUILTIN_ALIASES: [(&str, &str); 7] = [
    ("משטחי עבודה, מדרכת מעבר ופתחים", "משטחי עבודה, מדרכות מעבר ופתחים"),
    // Spreadsheet export escapes the comma
    ("משטחי עבודה\\, מדרכת מעבר ופתחים", "משטחי עבודה, מדרכות מעבר ופתחים"),
    ("מכונות הרמה אחרות ואביזרי הרמה", "מכונות ואביזרי הרמה"),
    ("תוכניות בטיחות", "תכניות בטיחות"),
    ("גגות שבירים תלולים", "גגות שבירים או תלולים"),
    ("הקמת מבנה מתכת", "הקמת מבני מתכת"),
    ("שירות פיקוח על העבודה והמוס\"ל", "שרות פיקוח על העבודה והמוס\"ל"),
];

/// Immutable raw-label → canonical-label table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    aliases: BTreeMap<String, String>,
}

impl Default for AliasTable {
    /// The built-in table
    fn default() -> Self {
        Self::new(
            BUILTIN_ALIASES
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string())),
        )
    }
}

impl AliasTable {
    pub fn new(aliases: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            aliases: aliases.into_iter().collect(),
        }
    }

    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }

    /// Extra entries layered over this table; overrides win on conflict
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, String>) -> Self {
        self.aliases
            .extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Canonical label for `raw`, or `raw` itself when no alias applies
    pub fn resolve<'a>(&'a self, raw: &'a str) -> &'a str {
        self.aliases.get(raw).map(String::as_str).unwrap_or(raw)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// Location of a subtopic in the taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicMapping {
    pub topic_id: String,
    pub subtopic_id: String,
}

/// Resolves raw category labels against one subject's topics
///
/// Topics are snapshotted at construction; the taxonomy is read-only for
/// the duration of a run.
#[derive(Debug, Clone)]
pub struct CategoryMapper {
    aliases: AliasTable,
    topics: Vec<Topic>,
}

impl CategoryMapper {
    pub fn new(aliases: AliasTable, taxonomy: &dyn TaxonomyService, subject_id: &str) -> Self {
        let topics = taxonomy.topics_for_subject(subject_id);
        debug!(
            "Category mapper for {}: {} topics, {} aliases",
            subject_id,
            topics.len(),
            aliases.len()
        );
        Self { aliases, topics }
    }

    /// Alias-normalized form of a raw label
    pub fn normalize<'a>(&'a self, raw: &'a str) -> &'a str {
        self.aliases.resolve(raw.trim())
    }

    pub fn map_category(&self, raw: &str) -> Result<TopicMapping> {
        let name = self.normalize(raw);
        self.topics
            .iter()
            .find_map(|topic| {
                topic
                    .sub_topics
                    .iter()
                    .find(|sub| sub.name == name)
                    .map(|sub| TopicMapping {
                        topic_id: topic.id.clone(),
                        subtopic_id: sub.id.clone(),
                    })
            })
            .ok_or_else(|| ImportError::CategoryNotFound(raw.to_string()))
    }

    /// `subtopic_id` exists under `topic_id`
    pub fn contains(&self, topic_id: &str, subtopic_id: &str) -> bool {
        self.topics
            .iter()
            .filter(|t| t.id == topic_id)
            .any(|t| t.sub_topics.iter().any(|s| s.id == subtopic_id))
    }
}
