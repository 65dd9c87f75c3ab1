//! Exam designator extraction and reconciliation
//!
//! Titles and question bodies carry the exam sitting in Hebrew, e.g.
//! `שאלה 12 - קיץ 2022 מועד א`. Winter and autumn sittings fold into
//! `spring`, spring into `summer`; moed ג has no canonical counterpart and
//! parses as absent.

use once_cell::sync::Lazy;
use qbank_common::question::{Moed, Season};
use regex::Regex;
use serde::Serialize;

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"20[0-9]{2}").unwrap());
static SEASON: Lazy<Regex> = Lazy::new(|| Regex::new(r"(קיץ|חורף|אביב|סתיו)").unwrap());
static MOED: Lazy<Regex> = Lazy::new(|| Regex::new(r"(מועד א|מועד ב|מועד ג)").unwrap());
static ORDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"שאלה ([0-9]+)").unwrap());

/// Exam designator fields found in a piece of text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExamInfo {
    pub year: Option<u16>,
    pub season: Option<Season>,
    pub moed: Option<Moed>,
    pub order: Option<u32>,
}

impl ExamInfo {
    /// Year, season or moed present; order alone does not identify a sitting
    pub fn identifies_sitting(&self) -> bool {
        self.year.is_some() || self.season.is_some() || self.moed.is_some()
    }
}

/// Result of scanning a question body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyExtraction {
    /// Body with the designator line removed, if there was one
    pub cleaned_text: String,
    /// `None` when the body names no sitting
    pub exam_info: Option<ExamInfo>,
}

/// Parse whatever designator fields `text` contains
pub fn parse(text: &str) -> ExamInfo {
    ExamInfo {
        year: YEAR.find(text).and_then(|m| m.as_str().parse().ok()),
        season: SEASON.find(text).map(|m| match m.as_str() {
            "קיץ" | "אביב" => Season::Summer,
            _ => Season::Spring,
        }),
        moed: MOED.find(text).and_then(|m| match m.as_str() {
            "מועד א" => Some(Moed::A),
            "מועד ב" => Some(Moed::B),
            _ => None,
        }),
        order: ORDER
            .captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok()),
    }
}

/// Split a leading designator line off a question body
///
/// Only the first line is inspected, and only when more lines follow it.
pub fn extract_from_body(body: &str) -> BodyExtraction {
    let unchanged = || BodyExtraction {
        cleaned_text: body.to_string(),
        exam_info: None,
    };

    let Some((first_line, rest)) = body.split_once('\n') else {
        return unchanged();
    };

    let info = parse(first_line.trim());
    if !info.identifies_sitting() {
        return unchanged();
    }

    BodyExtraction {
        cleaned_text: rest.trim().to_string(),
        exam_info: Some(info),
    }
}

/// Compare title and body designators
///
/// Only fields present on both sides are compared. Returns one message per
/// disagreeing field; empty means consistent.
pub fn reconcile(title: &ExamInfo, body: &ExamInfo) -> Vec<String> {
    let mut errors = Vec::new();

    if let (Some(t), Some(b)) = (title.year, body.year) {
        if t != b {
            errors.push(format!("Year mismatch: {} in title vs {} in question", t, b));
        }
    }
    if let (Some(t), Some(b)) = (title.season, body.season) {
        if t != b {
            errors.push(format!("Season mismatch: {} in title vs {} in question", t, b));
        }
    }
    if let (Some(t), Some(b)) = (title.moed, body.moed) {
        if t != b {
            errors.push(format!("Moed mismatch: {} in title vs {} in question", t, b));
        }
    }

    errors
}
