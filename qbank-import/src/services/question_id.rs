//! Canonical question ids: `XXX-YYY-NNNNNN`

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static STRICT_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z]{3})-([A-Z]{3})-[0-9]{6}$").unwrap());
static ID_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-([0-9]+)$").unwrap());

/// Why an id failed [`check_format`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdFormatError {
    #[error("Invalid question ID format. Expected format: {expected}-NNNNNN, got: {id}")]
    Pattern { id: String, expected: String },

    #[error("Question ID must have exactly 6 digits after the domain code. Got: {id}")]
    DigitCount { id: String, digits: usize },
}

/// Build an id, zero-padding `number` to 6 digits
///
/// Numbers above 999999 produce a 7+ digit group that [`check_format`]
/// rejects.
pub fn generate(subject_code: &str, domain_code: &str, number: u64) -> String {
    format!("{}-{}-{:06}", subject_code, domain_code, number)
}

/// Check exact digit count, then pattern and codes
pub fn check_format(
    id: &str,
    subject_code: &str,
    domain_code: &str,
) -> Result<(), IdFormatError> {
    if let Some(digits) = ID_DIGITS.captures(id).map(|c| c[1].len()) {
        if digits != 6 {
            return Err(IdFormatError::DigitCount {
                id: id.to_string(),
                digits,
            });
        }
    }

    let pattern_ok = STRICT_ID
        .captures(id)
        .is_some_and(|c| &c[1] == subject_code && &c[2] == domain_code);
    if !pattern_ok {
        return Err(IdFormatError::Pattern {
            id: id.to_string(),
            expected: format!("{}-{}", subject_code, domain_code),
        });
    }

    Ok(())
}

pub fn validate_format(id: &str, subject_code: &str, domain_code: &str) -> bool {
    check_format(id, subject_code, domain_code).is_ok()
}

/// Numeric suffix of an id, if it has one
pub fn sequence_number(id: &str) -> Option<u64> {
    ID_DIGITS.captures(id).and_then(|c| c[1].parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_pads() {
        assert_eq!(generate("CIV", "SAF", 42), "CIV-SAF-000042");
        assert_eq!(generate("CIV", "SAF", 999999), "CIV-SAF-999999");
    }

    #[test]
    fn test_validate_format() {
        assert!(validate_format("CIV-SAF-000042", "CIV", "SAF"));
        assert!(!validate_format("CIV-SAF-00042", "CIV", "SAF"));
        assert!(!validate_format("CIV-SAF-0000042", "CIV", "SAF"));
        assert!(!validate_format("CIV-ELC-000042", "CIV", "SAF"));
        assert!(!validate_format("civ-saf-000042", "CIV", "SAF"));
    }

    #[test]
    fn test_overflowing_number_is_rejected() {
        let id = generate("CIV", "SAF", 1_234_567);
        assert_eq!(id, "CIV-SAF-1234567");
        assert_eq!(
            check_format(&id, "CIV", "SAF"),
            Err(IdFormatError::DigitCount {
                id: id.clone(),
                digits: 7
            })
        );
    }

    #[test]
    fn test_pattern_error_message() {
        let err = check_format("bad", "CIV", "SAF").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid question ID format. Expected format: CIV-SAF-NNNNNN, got: bad"
        );
    }

    #[test]
    fn test_sequence_number() {
        assert_eq!(sequence_number("CIV-SAF-000042"), Some(42));
        assert_eq!(sequence_number("CIV-SAF-"), None);
        assert_eq!(sequence_number("legacy"), None);
    }
}
