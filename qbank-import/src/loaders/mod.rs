//! Input file readers (LOADING phase)

pub mod category_sheet;
pub mod source_export;

pub use category_sheet::{load_category_sheet, parse_category_rows, CategorySheet};
pub use source_export::{load_source_export, parse_source_export, SourceExport};

use crate::models::SourceRecord;

/// Give each record its category from the sheet, keyed by title
///
/// Records missing from the sheet keep the category embedded in the export,
/// if any.
pub fn assign_categories(records: &mut [SourceRecord], sheet: &CategorySheet) {
    for record in records {
        if let Some(category) = sheet.get(&record.title) {
            record.category = Some(category.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbank_common::config::SpreadsheetConfig;

    #[test]
    fn test_assign_categories_prefers_sheet() {
        let sheet = parse_category_rows(
            vec![
                vec!["title".to_string(), "category".to_string()],
                vec!["שאלה 1".to_string(), "חפירות".to_string()],
            ],
            &SpreadsheetConfig {
                title_column: 0,
                category_column: 1,
                excluded_categories: vec![],
            },
        );
        let mut records = vec![
            SourceRecord {
                title: "שאלה 1".to_string(),
                category: Some("ישן".to_string()),
                ..Default::default()
            },
            SourceRecord {
                title: "שאלה 2".to_string(),
                category: Some("פיגומים".to_string()),
                ..Default::default()
            },
            SourceRecord {
                title: "שאלה 3".to_string(),
                ..Default::default()
            },
        ];

        assign_categories(&mut records, &sheet);
        assert_eq!(records[0].category.as_deref(), Some("חפירות"));
        assert_eq!(records[1].category.as_deref(), Some("פיגומים"));
        assert_eq!(records[2].category, None);
    }
}
