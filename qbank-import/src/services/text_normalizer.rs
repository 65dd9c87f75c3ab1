//! Text normalization for legacy question content
//!
//! Converts the plugin's HTML fragments to plain markdown-ish text and
//! cleans answer option labels. Conversion never fails from the caller's
//! point of view: when markup cannot be converted, the text is returned
//! with only the entity/whitespace cleanup applied and the outcome says so.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// Entities decoded by the cleanup step, in application order
const HTML_ENTITIES: [(&str, &str); 12] = [
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&ndash;", "–"),
    ("&mdash;", "—"),
    ("&lsquo;", "\u{2018}"),
    ("&rsquo;", "\u{2019}"),
    ("&ldquo;", "\u{201C}"),
    ("&rdquo;", "\u{201D}"),
];

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static LINE_BREAK_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static BLOCK_CLOSE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</(?:p|div|li|h[1-6])>").unwrap());
static LIST_ITEM_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<li[^>]*>").unwrap());
/// A tag opener with no closing `>` before end of text
static UNTERMINATED_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[A-Za-z/!][^>]*$").unwrap());
static CARRIAGE_RETURN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n|\r").unwrap());
static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

static TABS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\t+").unwrap());
static REPEATED_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());
/// Hebrew option label: letter followed by a period, whitespace, or both
static OPTION_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[אבגד](?:\.\s*|\s+)").unwrap());

/// How [`normalize_detailed`] handled markup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlOutcome {
    /// No markup; cleanup only
    Plain,
    /// Markup converted to text
    Converted,
    /// Markup present but not convertible; cleanup only
    CleanedOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub text: String,
    pub outcome: HtmlOutcome,
}

/// True when `text` contains anything that looks like a tag
pub fn contains_markup(text: &str) -> bool {
    TAG.is_match(text)
}

/// Normalize `text`, converting HTML when flagged or detected
pub fn normalize(text: &str, is_html: bool) -> String {
    normalize_detailed(text, is_html).text
}

pub fn normalize_detailed(text: &str, is_html: bool) -> NormalizedText {
    if text.is_empty() {
        return NormalizedText {
            text: String::new(),
            outcome: HtmlOutcome::Plain,
        };
    }

    let decoded = decode_entities(&CARRIAGE_RETURN.replace_all(text, "\n"));

    if !is_html && !contains_markup(&decoded) {
        return NormalizedText {
            text: tidy(&decoded),
            outcome: HtmlOutcome::Plain,
        };
    }

    match convert_html(&decoded) {
        Ok(converted) => NormalizedText {
            text: tidy(&converted),
            outcome: HtmlOutcome::Converted,
        },
        Err(reason) => {
            warn!("HTML conversion failed ({}), keeping cleaned text", reason);
            NormalizedText {
                text: tidy(&decoded),
                outcome: HtmlOutcome::CleanedOnly,
            }
        }
    }
}

fn convert_html(html: &str) -> Result<String, String> {
    if let Some(m) = UNTERMINATED_TAG.find(html) {
        return Err(format!("unterminated tag at byte {}", m.start()));
    }

    let text = LINE_BREAK_TAG.replace_all(html, "\n");
    let text = BLOCK_CLOSE_TAG.replace_all(&text, "\n");
    let text = LIST_ITEM_TAG.replace_all(&text, "- ");
    let text = ANY_TAG.replace_all(&text, "");
    Ok(text.into_owned())
}

fn decode_entities(text: &str) -> String {
    let mut decoded = text.to_string();
    for (entity, replacement) in HTML_ENTITIES {
        if decoded.contains(entity) {
            decoded = decoded.replace(entity, replacement);
        }
    }
    decoded
}

fn tidy(text: &str) -> String {
    EXCESS_NEWLINES
        .replace_all(text, "\n\n")
        .trim()
        .to_string()
}

/// Clean an answer option: drop the Hebrew letter label, unescape unit
/// abbreviations, and collapse whitespace
///
/// Idempotent: every leading label is stripped, so a second pass finds
/// nothing left to remove.
pub fn clean_option_text(text: &str) -> String {
    let mut cleaned = TABS.replace_all(text.trim(), " ").into_owned();

    while let Some(m) = OPTION_PREFIX.find(&cleaned) {
        if m.end() == 0 {
            break;
        }
        cleaned = cleaned[m.end()..].trim_start().to_string();
    }

    let cleaned = cleaned.replace("ק\\\"ג", "ק\"ג").replace("מ\\\"ר", "מ\"ר");
    REPEATED_WHITESPACE
        .replace_all(&cleaned, " ")
        .trim()
        .to_string()
}
