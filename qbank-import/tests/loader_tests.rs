//! Input loader tests against files on disk

mod helpers;

use helpers::{export_json, mc_record, two_column_layout};
use qbank_import::loaders::{assign_categories, load_category_sheet, load_source_export};
use qbank_import::ImportError;

#[tokio::test]
async fn test_source_export_hash_and_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.json");
    let json = export_json(&[mc_record(9, "x", 0), mc_record(4, "y", 1)]);
    std::fs::write(&path, &json).unwrap();

    let export = load_source_export(&path).await.unwrap();
    let ids: Vec<u64> = export.records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![9, 4]);
    assert_eq!(export.sha256.len(), 64);

    let again = load_source_export(&path).await.unwrap();
    assert_eq!(export.sha256, again.sha256);
}

#[tokio::test]
async fn test_missing_and_empty_exports() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("nope.json");
    assert!(matches!(
        load_source_export(&missing).await,
        Err(ImportError::Load { .. })
    ));

    let empty = dir.path().join("empty.json");
    std::fs::write(&empty, r#"{ "question": {} }"#).unwrap();
    assert!(matches!(
        load_source_export(&empty).await,
        Err(ImportError::EmptySource(_))
    ));
}

#[test]
fn test_csv_sheet_skips_excluded_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("categories.csv");
    std::fs::write(
        &path,
        "title,category\n\
         שאלה 1,תכניות בטיחות\n\
         שאלה 2,no\n\
         שאלה 3,single\n\
         ,הקמת מבני מתכת\n\
         \"  שאלה 4  \",\"משטחי עבודה, מדרכת מעבר ופתחים\"\n\
         שאלה 1,הקמת מבני מתכת\n",
    )
    .unwrap();

    let sheet = load_category_sheet(&path, &two_column_layout()).unwrap();
    assert_eq!(sheet.len(), 2);
    assert_eq!(sheet.get("שאלה 1"), Some("הקמת מבני מתכת"));
    assert_eq!(sheet.get("שאלה 2"), None);
    assert_eq!(sheet.get("שאלה 4"), Some("משטחי עבודה, מדרכת מעבר ופתחים"));
}

#[test]
fn test_unreadable_workbook_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("categories.xlsx");
    std::fs::write(&path, b"not a workbook").unwrap();

    assert!(matches!(
        load_category_sheet(&path, &two_column_layout()),
        Err(ImportError::Load { .. })
    ));
}

#[test]
fn test_sheet_category_wins_over_embedded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("categories.csv");
    std::fs::write(&path, "title,category\nשאלה 1 - קיץ 2022 מועד א,הקמת מבני מתכת\n").unwrap();
    let sheet = load_category_sheet(&path, &two_column_layout()).unwrap();

    let mut records = vec![
        mc_record(1, "תכניות בטיחות", 0),
        mc_record(2, "תכניות בטיחות", 0),
    ];
    assign_categories(&mut records, &sheet);

    assert_eq!(records[0].category.as_deref(), Some("הקמת מבני מתכת"));
    assert_eq!(records[1].category.as_deref(), Some("תכניות בטיחות"));
}
