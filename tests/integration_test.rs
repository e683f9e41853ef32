//! Integration Tests for sheetsite
//!
//! End-to-end tests for the sheet transformer and the simple sitemap
//! assembler. Fixture workbooks are generated with rust_xlsxwriter and all
//! output is written into temporary directories.

use rust_xlsxwriter::*;
use serde_json::{json, Value};
use sheetsite::{
    HandoffOutcome, SheetLayout, SheetOutcome, SheetSpec, SheetTable, SitemapBuilder,
    TransformerBuilder, HANDOFF_PATH,
};
use std::io::Cursor;
use std::path::Path;

// Helper module for generating test fixtures
mod fixtures {
    use super::*;

    /// Generate a site workbook with an organization sheet and two list sheets
    pub fn generate_site_workbook() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();

        let core = workbook.add_worksheet();
        core.set_name("core_info")?;
        core.write_string(0, 0, "name")?;
        core.write_string(0, 1, "Acme Corp")?;
        core.write_string(1, 0, "website")?;
        core.write_string(1, 1, "  https://acme.io ")?;
        core.write_string(2, 0, "founded")?;
        core.write_number(2, 1, 1999.0)?;
        core.write_string(3, 0, "sameAs")?;
        core.write_string(3, 1, "https://x.com/acme | https://github.com/acme")?;
        core.write_string(4, 0, "fax")?;
        core.write_string(4, 1, "N/A")?;

        let services = workbook.add_worksheet();
        services.set_name("Services")?;
        services.write_string(0, 0, "Name")?;
        services.write_string(0, 1, "Price")?;
        services.write_string(0, 2, "Active")?;
        services.write_string(1, 0, "Widget")?;
        services.write_string(1, 1, "9.99")?;
        services.write_boolean(1, 2, true)?;
        services.write_string(2, 0, "Gadget")?;
        services.write_number(2, 1, 25.0)?;
        services.write_string(2, 2, "no")?;

        let faqs = workbook.add_worksheet();
        faqs.set_name("FAQs")?;
        faqs.write_string(0, 0, "question")?;
        faqs.write_string(0, 1, "answer")?;
        faqs.write_string(1, 0, "Do you ship?")?;
        faqs.write_string(1, 1, "Yes")?;
        faqs.write_string(3, 0, "none")?;
        faqs.write_string(3, 1, "n/a")?;

        Ok(workbook.save_to_buffer()?)
    }

    /// Generate a workbook whose organization sheet has no website row
    pub fn generate_without_website() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let core = workbook.add_worksheet();
        core.set_name("core_info")?;
        core.write_string(0, 0, "name")?;
        core.write_string(0, 1, "Acme Corp")?;
        Ok(workbook.save_to_buffer()?)
    }
}

fn read_json(path: &Path) -> Value {
    let text = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn read_yaml(path: &Path) -> Value {
    let text = std::fs::read_to_string(path).unwrap();
    serde_saphyr::from_str(&text).unwrap()
}

#[test]
fn test_transform_writes_key_value_sheet() {
    let temp = tempfile::tempdir().unwrap();
    let transformer = TransformerBuilder::new()
        .with_root(temp.path())
        .build()
        .unwrap();

    let data = fixtures::generate_site_workbook().unwrap();
    let report = transformer.transform(Cursor::new(data)).unwrap();

    let dir = temp.path().join("schema-files/organization");
    let expected = json!({
        "name": "Acme Corp",
        "website": "https://acme.io",
        "founded": 1999,
        "sameAs": ["https://x.com/acme", "https://github.com/acme"],
        "fax": null
    });
    assert_eq!(read_json(&dir.join("main-data.json")), expected);
    assert_eq!(read_yaml(&dir.join("main-data.yaml")), expected);

    match report.sheet("core_info") {
        Some(SheetOutcome::Written { items, paths }) => {
            assert_eq!(*items, 5);
            assert_eq!(paths.len(), 2);
        }
        other => panic!("Expected core_info to be written, got {:?}", other),
    }
}

#[test]
fn test_transform_writes_list_sheets() {
    let temp = tempfile::tempdir().unwrap();
    let transformer = TransformerBuilder::new()
        .with_root(temp.path())
        .build()
        .unwrap();

    let data = fixtures::generate_site_workbook().unwrap();
    transformer.transform(Cursor::new(data)).unwrap();

    let services = read_json(&temp.path().join("schema-files/services/services-list.json"));
    assert_eq!(
        services,
        json!([
            {"Name": "Widget", "Price": 9.99, "Active": true},
            {"Name": "Gadget", "Price": 25, "Active": false}
        ])
    );

    // Rows whose fields are all placeholders are dropped
    let faqs = read_json(&temp.path().join("schema-files/faqs/faq.json"));
    assert_eq!(faqs, json!([{"question": "Do you ship?", "answer": true}]));

    let faqs_yaml = read_yaml(&temp.path().join("schema-files/faqs/faq.yaml"));
    assert_eq!(faqs_yaml, faqs);
}

#[test]
fn test_json_preserves_field_order() {
    let temp = tempfile::tempdir().unwrap();
    let transformer = TransformerBuilder::new()
        .with_root(temp.path())
        .build()
        .unwrap();

    let data = fixtures::generate_site_workbook().unwrap();
    transformer.transform(Cursor::new(data)).unwrap();

    let text =
        std::fs::read_to_string(temp.path().join("schema-files/organization/main-data.json"))
            .unwrap();
    let name = text.find("\"name\"").unwrap();
    let website = text.find("\"website\"").unwrap();
    let fax = text.find("\"fax\"").unwrap();
    assert!(name < website && website < fax);
    assert!(text.contains("\n  \"name\""), "Expected 2-space indentation");
}

#[test]
fn test_missing_sheets_are_reported_not_fatal() {
    let temp = tempfile::tempdir().unwrap();
    let transformer = TransformerBuilder::new()
        .with_root(temp.path())
        .build()
        .unwrap();

    let data = fixtures::generate_site_workbook().unwrap();
    let report = transformer.transform(Cursor::new(data)).unwrap();

    assert_eq!(report.sheets.len(), 11);
    assert_eq!(report.written_count(), 3);
    assert_eq!(report.missing_count(), 8);
    assert_eq!(report.sheet("Products"), Some(&SheetOutcome::Missing));
    assert!(!temp.path().join("schema-files/products").exists());
}

#[test]
fn test_handoff_written_from_website() {
    let temp = tempfile::tempdir().unwrap();
    let transformer = TransformerBuilder::new()
        .with_root(temp.path())
        .with_fallback_url(Some("https://fallback.io".to_string()))
        .build()
        .unwrap();

    let data = fixtures::generate_site_workbook().unwrap();
    let report = transformer.transform(Cursor::new(data)).unwrap();

    assert_eq!(
        report.handoff,
        HandoffOutcome::FromWebsite("https://acme.io".to_string())
    );
    let saved = std::fs::read_to_string(temp.path().join(HANDOFF_PATH)).unwrap();
    assert_eq!(saved, "https://acme.io");
}

#[test]
fn test_handoff_falls_back_without_website() {
    let temp = tempfile::tempdir().unwrap();
    let transformer = TransformerBuilder::new()
        .with_root(temp.path())
        .with_fallback_url(Some("https://fallback.io".to_string()))
        .build()
        .unwrap();

    let data = fixtures::generate_without_website().unwrap();
    let report = transformer.transform(Cursor::new(data)).unwrap();

    assert_eq!(report.handoff.url(), Some("https://fallback.io"));
}

#[test]
fn test_handoff_unresolved_writes_nothing() {
    let temp = tempfile::tempdir().unwrap();
    let transformer = TransformerBuilder::new()
        .with_root(temp.path())
        .build()
        .unwrap();

    let data = fixtures::generate_without_website().unwrap();
    let report = transformer.transform(Cursor::new(data)).unwrap();

    assert_eq!(report.handoff, HandoffOutcome::Unresolved);
    assert!(!temp.path().join(HANDOFF_PATH).exists());
}

#[test]
fn test_custom_sheet_table() {
    let temp = tempfile::tempdir().unwrap();
    let table = SheetTable::new(vec![SheetSpec::new(
        "Services",
        "data/offerings",
        "offerings",
        SheetLayout::List,
    )]);
    let transformer = TransformerBuilder::new()
        .with_root(temp.path())
        .with_sheet_table(table)
        .build()
        .unwrap();

    let data = fixtures::generate_site_workbook().unwrap();
    let report = transformer.transform(Cursor::new(data)).unwrap();

    assert_eq!(report.sheets.len(), 1);
    assert!(temp.path().join("data/offerings/offerings.json").is_file());
    assert!(temp.path().join("data/offerings/offerings.yaml").is_file());
    // core_info is not in the table, so no handoff is produced
    assert_eq!(report.handoff, HandoffOutcome::Unresolved);
}

#[test]
fn test_transform_path_missing_input() {
    let temp = tempfile::tempdir().unwrap();
    let transformer = TransformerBuilder::new()
        .with_root(temp.path())
        .build()
        .unwrap();

    let result = transformer.transform_path(&temp.path().join("missing.xlsx"));
    assert!(matches!(result, Err(sheetsite::SheetSiteError::InputNotFound(_))));
}

#[test]
fn test_transform_then_sitemap() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("site.xlsx");
    std::fs::write(&input, fixtures::generate_site_workbook().unwrap()).unwrap();

    TransformerBuilder::new()
        .with_root(temp.path())
        .build()
        .unwrap()
        .transform_path(&input)
        .unwrap();

    let summary = SitemapBuilder::new()
        .with_root(temp.path())
        .with_fallback_url(Some("https://ignored.io".to_string()))
        .build()
        .unwrap()
        .assemble()
        .unwrap();

    assert_eq!(summary.base_url, "https://acme.io");
    let locs: Vec<&str> = summary.entries.iter().map(|e| e.loc.as_str()).collect();
    assert_eq!(
        locs,
        vec![
            "https://acme.io/schema-files/faqs/faq.json",
            "https://acme.io/schema-files/faqs/faq.yaml",
            "https://acme.io/schema-files/organization/main-data.json",
            "https://acme.io/schema-files/organization/main-data.yaml",
            "https://acme.io/schema-files/services/services-list.json",
            "https://acme.io/schema-files/services/services-list.yaml",
        ]
    );

    let lastmods: Vec<_> = summary.entries.iter().map(|e| e.lastmod).collect();
    assert!(lastmods.windows(2).all(|pair| pair[0] == pair[1]));

    let xml = std::fs::read_to_string(temp.path().join("ai-sitemap.xml")).unwrap();
    assert_eq!(xml.matches("<url>").count(), 6);
}
