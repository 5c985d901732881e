//! Conversions over real PDF files built with lopdf.

mod common;

use std::fs;

use pdfcsv::{
    convert_bytes, convert_file, inspect, ConvertOptions, Error, ExtractionMethod, PageTextSource,
    SourceOptions, StrategyKind,
};

fn records_pdf() -> Vec<u8> {
    common::text_pdf(&[
        &[
            "Patient register",
            "218915949830 F 21",
            "218919256808 M 26",
            "21A915949830 M 30",
        ],
        &["218910000001 F 44", "218910000002 X 50"],
    ])
}

#[test]
fn test_source_reads_pages_lazily() {
    let source = PageTextSource::from_bytes(&records_pdf(), &SourceOptions::default()).unwrap();
    assert_eq!(source.page_count(), 2);

    let page = source.page(1).unwrap();
    let lines: Vec<_> = page.lines().map(|(_, l)| l.to_string()).collect();
    assert_eq!(lines, vec!["218910000001 F 44", "218910000002 X 50"]);
}

#[test]
fn test_convert_file_writes_csv() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("records.pdf");
    let output = dir.path().join("records.csv");
    fs::write(&input, records_pdf()).unwrap();

    let options = ConvertOptions::new().with_columns(["ID", "Gender", "Age"]);
    let result = convert_file(&input, &output, &options).unwrap();

    assert_eq!(result.strategy, Some(StrategyKind::Regex));
    assert_eq!(result.pages_processed, 2);
    assert_eq!(result.total_records, 5);
    assert_eq!(result.valid_records, 3);
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "ID,Gender,Age\n218915949830,F,21\n218919256808,M,26\n218910000001,F,44\n"
    );
}

#[test]
fn test_convert_bytes_is_deterministic() {
    let pdf = records_pdf();
    let mut first = Vec::new();
    let mut second = Vec::new();
    let a = convert_bytes(&pdf, &mut first, &ConvertOptions::default()).unwrap();
    let b = convert_bytes(&pdf, &mut second, &ConvertOptions::default()).unwrap();
    assert_eq!(a, b);
    assert_eq!(first, second);
}

#[test]
fn test_max_pages() {
    let mut out = Vec::new();
    let result = convert_bytes(
        &records_pdf(),
        &mut out,
        &ConvertOptions::new().with_column_count(3).with_max_pages(1),
    )
    .unwrap();
    assert_eq!(result.pages_processed, 1);
    assert_eq!(result.total_records, 3);
}

fn table_fixture() -> Vec<u8> {
    common::table_pdf(&[
        &["1001", "M", "34"],
        &["1002", "F", "29"],
        &["1003", "F", "61"],
    ])
}

#[test]
fn test_tables_are_detected() {
    let source = PageTextSource::from_bytes(&table_fixture(), &SourceOptions::default()).unwrap();
    let page = source.page(0).unwrap();
    let tables = page.tables.expect("table detection ran");
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0][1], vec!["1002", "F", "29"]);
}

#[test]
fn test_auto_picks_table_from_pdf() {
    let mut out = Vec::new();
    let result = convert_bytes(&table_fixture(), &mut out, &ConvertOptions::default()).unwrap();
    assert_eq!(result.strategy, Some(StrategyKind::Table));
    assert_eq!(result.valid_records, 3);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Column_1,Column_2,Column_3\n1001,M,34\n1002,F,29\n1003,F,61\n"
    );
}

#[test]
fn test_without_table_detection() {
    let mut out = Vec::new();
    let options = ConvertOptions::new()
        .with_tables(false)
        .with_method(ExtractionMethod::Table)
        .with_column_count(3);
    let result = convert_bytes(&table_fixture(), &mut out, &options).unwrap();
    assert_eq!(result.total_records, 0);
}

#[test]
fn test_inspect_pdf() {
    let source = PageTextSource::from_bytes(&table_fixture(), &SourceOptions::default()).unwrap();
    let info = inspect(&source, &ConvertOptions::default()).unwrap();
    assert_eq!(info.pages, 1);
    assert_eq!(info.tables_per_page, vec![1]);
    assert_eq!(info.columns, 3);
    assert_eq!(info.probe.chosen, StrategyKind::Table);
}

#[test]
fn test_open_errors() {
    let dir = tempfile::tempdir().unwrap();
    let fake = dir.path().join("fake.pdf");
    fs::write(&fake, "ID,Gender,Age\n1,M,20\n").unwrap();

    let err = PageTextSource::open(&fake, &SourceOptions::default()).unwrap_err();
    assert!(matches!(err, Error::UnknownFormat));

    let err = PageTextSource::open(dir.path().join("missing.pdf"), &SourceOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_encrypted_document_needs_the_right_password() {
    let pdf = common::encrypted_pdf();

    let err = PageTextSource::from_bytes(&pdf, &SourceOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Encrypted), "{:?}", err);

    let options = SourceOptions::new().with_password("hunter2");
    let err = PageTextSource::from_bytes(&pdf, &options).unwrap_err();
    assert!(matches!(err, Error::InvalidPassword), "{:?}", err);
    assert!(err.is_document_open());
}

#[test]
fn test_convert_file_encrypted_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("locked.pdf");
    let output = dir.path().join("locked.csv");
    fs::write(&input, common::encrypted_pdf()).unwrap();

    let err = convert_file(&input, &output, &ConvertOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Encrypted));
    assert!(!output.exists());
}
