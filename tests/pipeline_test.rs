//! End-to-end runs over in-memory pages.

use pdfcsv::error::{Error, Result};
use pdfcsv::extract::ProbePolicy;
use pdfcsv::model::TableGrid;
use pdfcsv::schema::ScriptedPrompt;
use pdfcsv::source::{MemoryBackend, PageBackend};
use pdfcsv::{
    CancelToken, ConversionPipeline, ConversionResult, ConvertOptions, CsvSink, ExtractionMethod,
    LengthPolicy, MemorySink, Page, PageTextSource, PipelineState, ProgressObserver, RecordSink,
    StrategyKind,
};

const RECORDS: &str = "Patient register\n\
218915949830 F 21\n\
218919256808 M 26\n\
21A915949830 M 30\n\
218910000001 X 44\n\
218910000002 F 130\n\
218910000003 m 0\n\
Page 1 of 1";

fn grid(rows: &[&[&str]]) -> TableGrid {
    rows.iter()
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .collect()
}

fn text_source(pages: &[&str]) -> PageTextSource {
    PageTextSource::from_backend(MemoryBackend::from_texts(pages.iter().copied()))
}

fn run_csv(options: ConvertOptions, source: PageTextSource) -> (ConversionResult, String) {
    let mut sink = CsvSink::new(Vec::new());
    let result = ConversionPipeline::new(options)
        .run(source, &mut sink)
        .unwrap();
    let csv = String::from_utf8(sink.into_inner().unwrap()).unwrap();
    (result, csv)
}

#[test]
fn test_regex_run_with_canonical_validation() {
    let options = ConvertOptions::new().with_columns(["ID", "Gender", "Age"]);
    let (result, csv) = run_csv(options, text_source(&[RECORDS]));

    assert_eq!(result.strategy, Some(StrategyKind::Regex));
    assert_eq!(result.total_records, 6);
    assert_eq!(result.valid_records, 3);
    assert_eq!(result.invalid_records, 3);
    assert_eq!(result.skipped_lines, 2);
    assert_eq!(
        csv,
        "ID,Gender,Age\n218915949830,F,21\n218919256808,M,26\n218910000003,m,0\n"
    );
}

#[test]
fn test_total_never_below_valid() {
    for method in [
        ExtractionMethod::Auto,
        ExtractionMethod::Structured,
        ExtractionMethod::Regex,
        ExtractionMethod::Table,
    ] {
        let (result, _) = run_csv(
            ConvertOptions::new().with_method(method),
            text_source(&[RECORDS, "", "1 M 2\n3"]),
        );
        assert!(result.total_records >= result.valid_records, "{:?}", method);
        assert_eq!(
            result.total_records,
            result.valid_records + result.rejected_records + result.invalid_records
        );
    }
}

#[test]
fn test_runs_are_idempotent() {
    let options = ConvertOptions::new();
    let first = run_csv(options.clone(), text_source(&[RECORDS, RECORDS]));
    let second = run_csv(options, text_source(&[RECORDS, RECORDS]));
    assert_eq!(first, second);
}

const PLACES: &str = "Alice Paris France\n\
Bob Rome Italy\n\
Carol Oslo Norway\n\
Dave Lima Peru\n\
Erin Quito Ecuador\n\
Frank Cairo Egypt";

#[test]
fn test_plain_three_word_lines_use_regex() {
    let (result, csv) = run_csv(ConvertOptions::new().without_validation(), text_source(&[PLACES]));
    assert_eq!(result.strategy, Some(StrategyKind::Regex));
    assert_eq!(result.total_records, 6);
    assert_eq!(result.valid_records, 6);
    assert!(csv.starts_with("Column_1,Column_2,Column_3\nAlice,Paris,France\nBob,Rome,Italy\n"));
}

#[test]
fn test_custom_three_column_names_validate_structurally() {
    let options = ConvertOptions::new().with_columns(["Name", "City", "Country"]);
    let (result, csv) = run_csv(options, text_source(&[PLACES]));
    assert_eq!(result.strategy, Some(StrategyKind::Regex));
    assert_eq!(result.total_records, 6);
    assert_eq!(result.valid_records, 6);
    assert!(csv.ends_with("Frank,Cairo,Egypt\n"));
}

#[test]
fn test_structured_six_lines() {
    let options = ConvertOptions::new()
        .with_method(ExtractionMethod::Structured)
        .with_columns(["ID", "Gender", "Age"]);
    let (result, csv) = run_csv(options, text_source(&["1001\nM\n34\n1002\nF\n29"]));
    assert_eq!(result.total_records, 2);
    assert_eq!(result.valid_records, 2);
    assert_eq!(csv, "ID,Gender,Age\n1001,M,34\n1002,F,29\n");
}

#[test]
fn test_disabled_validation_accepts_every_aligned_row() {
    let options = ConvertOptions::new()
        .with_method(ExtractionMethod::Regex)
        .without_validation();
    let (result, _) = run_csv(options, text_source(&[RECORDS]));
    assert_eq!(result.total_records, 6);
    assert_eq!(result.valid_records, 6);
}

#[test]
fn test_auto_falls_through_without_tables() {
    let (result, _) = run_csv(ConvertOptions::new(), text_source(&[RECORDS]));
    assert_eq!(result.strategy, Some(StrategyKind::Regex));
}

#[test]
fn test_auto_keeps_table_for_later_pages() {
    let pages = vec![
        Page::new(0, "1\nM\n20\n2\nF\n30").with_tables(vec![grid(&[&["1", "M", "20"], &["2", "F", "30"]])]),
        Page::new(1, "3 M 40\n4 F 50"),
    ];
    let source = PageTextSource::from_backend(MemoryBackend::new(pages));
    let (result, csv) = run_csv(ConvertOptions::new(), source);

    assert_eq!(result.strategy, Some(StrategyKind::Table));
    assert_eq!(result.pages_processed, 2);
    assert_eq!(result.total_records, 2);
    assert_eq!(csv, "Column_1,Column_2,Column_3\n1,M,20\n2,F,30\n");
}

#[test]
fn test_most_rows_policy_can_beat_tables() {
    let pages = vec![
        Page::new(0, "3 M 40\n4 F 50\n5 F 60").with_tables(vec![grid(&[&["1", "M", "20"]])]),
    ];
    let options = ConvertOptions::new()
        .with_column_count(3)
        .with_probe(3, ProbePolicy::MostRows);
    let source = PageTextSource::from_backend(MemoryBackend::new(pages));
    let (result, _) = run_csv(options, source);
    assert_eq!(result.strategy, Some(StrategyKind::Regex));
    assert_eq!(result.valid_records, 3);
}

#[test]
fn test_interactive_names_in_ask_order() {
    let mut prompt = ScriptedPrompt::new(["ID", "Gender", "Age"]);
    let mut sink = MemorySink::new();
    ConversionPipeline::new(ConvertOptions::new().interactive())
        .with_prompt(&mut prompt)
        .run(text_source(&[RECORDS]), &mut sink)
        .unwrap();
    assert_eq!(prompt.asked(), &[0, 1, 2]);
    assert_eq!(
        sink.header,
        Some(vec!["ID".to_string(), "Gender".to_string(), "Age".to_string()])
    );
}

#[test]
fn test_explicit_names_win_over_interactive() {
    let mut prompt = ScriptedPrompt::new(Vec::<String>::new());
    let mut sink = MemorySink::new();
    ConversionPipeline::new(
        ConvertOptions::new()
            .interactive()
            .with_columns(["a", "b", "c"]),
    )
    .with_prompt(&mut prompt)
    .run(text_source(&[RECORDS]), &mut sink)
    .unwrap();
    assert!(prompt.asked().is_empty());
}

fn wide_table() -> PageTextSource {
    PageTextSource::from_backend(MemoryBackend::new(vec![Page::new(0, "").with_tables(vec![
        grid(&[&["1", "M", "20", "note"], &["2", "F", "30"], &["3", "F"]]),
    ])]))
}

#[test]
fn test_length_policy_truncate() {
    let options = ConvertOptions::new()
        .with_method(ExtractionMethod::Table)
        .with_column_count(3);
    let (result, csv) = run_csv(options, wide_table());
    assert_eq!(result.valid_records, 2);
    assert_eq!(result.rejected_records, 1);
    assert_eq!(csv, "Column_1,Column_2,Column_3\n1,M,20\n2,F,30\n");
}

#[test]
fn test_length_policy_reject() {
    let options = ConvertOptions::new()
        .with_method(ExtractionMethod::Table)
        .with_column_count(3)
        .with_length_policy(LengthPolicy::Reject);
    let (result, _) = run_csv(options, wide_table());
    assert_eq!(result.valid_records, 1);
    assert_eq!(result.rejected_records, 2);
}

#[test]
fn test_csv_quoting() {
    let options = ConvertOptions::new()
        .with_method(ExtractionMethod::Structured)
        .with_columns(["Name", "Quote"]);
    let (_, csv) = run_csv(options, text_source(&["Smith, John\nHe said \"hi\""]));
    assert_eq!(csv, "Name,Quote\n\"Smith, John\",\"He said \"\"hi\"\"\"\n");
}

#[test]
fn test_cancel_before_start() {
    let token = CancelToken::new();
    token.cancel();
    let mut sink = MemorySink::new();
    let result = ConversionPipeline::new(ConvertOptions::new())
        .with_cancel_token(token)
        .run(text_source(&[RECORDS]), &mut sink)
        .unwrap();
    assert!(result.cancelled);
    assert_eq!(result.pages_processed, 0);
    assert!(sink.header.is_some());
    assert!(sink.rows.is_empty());
}

struct CancelAfterFirstPage(CancelToken);

impl ProgressObserver for CancelAfterFirstPage {
    fn on_page(&mut self, _: usize, _: usize, _: usize, _: usize) {
        self.0.cancel();
    }
}

#[test]
fn test_cancel_between_pages_returns_partial_result() {
    let token = CancelToken::new();
    let mut observer = CancelAfterFirstPage(token.clone());
    let mut sink = MemorySink::new();
    let result = ConversionPipeline::new(ConvertOptions::new().with_progress_every(0))
        .with_cancel_token(token)
        .with_observer(&mut observer)
        .run(text_source(&["1 M 20", "2 F 30", "3 F 40"]), &mut sink)
        .unwrap();
    assert!(result.cancelled);
    assert_eq!(result.pages_processed, 1);
    assert_eq!(sink.rows.len(), 1);
}

struct FlakyBackend(MemoryBackend);

impl PageBackend for FlakyBackend {
    fn page_count(&self) -> usize {
        self.0.page_count()
    }

    fn page_text(&self, index: usize) -> Result<String> {
        if index == 1 {
            return Err(Error::PdfParse("broken content stream".into()));
        }
        self.0.page_text(index)
    }

    fn page_tables(&self, index: usize) -> Result<Option<Vec<TableGrid>>> {
        self.0.page_tables(index)
    }
}

#[derive(Default)]
struct PageLog(Vec<usize>);

impl ProgressObserver for PageLog {
    fn on_page(&mut self, index: usize, _: usize, _: usize, _: usize) {
        self.0.push(index);
    }
}

#[test]
fn test_page_errors_are_skipped() {
    let source = PageTextSource::from_backend(FlakyBackend(MemoryBackend::from_texts([
        "1 M 20", "2 F 30", "3 F 40",
    ])));
    let mut pages = PageLog::default();
    let mut sink = MemorySink::new();
    let result = ConversionPipeline::new(ConvertOptions::new().with_column_count(3))
        .with_observer(&mut pages)
        .run(source, &mut sink)
        .unwrap();
    assert_eq!(result.page_errors, 1);
    assert_eq!(result.pages_processed, 2);
    assert_eq!(result.valid_records, 2);
    assert_eq!(pages.0, vec![0, 1, 2]);
}

struct BrokenSink;

impl RecordSink for BrokenSink {
    fn write_header(&mut self, _: &[String]) -> Result<()> {
        Ok(())
    }

    fn write_row(&mut self, _: &[String]) -> Result<()> {
        Err(Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full")))
    }
}

#[test]
fn test_sink_failure_is_fatal() {
    let mut pipeline = ConversionPipeline::new(ConvertOptions::new());
    let err = pipeline.run(text_source(&[RECORDS]), &mut BrokenSink).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert_eq!(pipeline.state(), PipelineState::Failed);
}

#[test]
fn test_bad_pattern_is_configuration_error() {
    let options = ConvertOptions::new().with_pattern("([unclosed");
    let mut sink = MemorySink::new();
    let err = ConversionPipeline::new(options)
        .run(text_source(&[RECORDS]), &mut sink)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidPattern(_)));
}
