//! # pdfcsv
//!
//! Extract tabular records embedded as text in PDF documents and write
//! them as CSV.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfcsv::{convert_file, ConvertOptions};
//!
//! fn main() -> pdfcsv::Result<()> {
//!     let options = ConvertOptions::new().with_columns(["ID", "Gender", "Age"]);
//!     let result = convert_file("records.pdf", "records.csv", &options)?;
//!     println!("{} of {} rows valid", result.valid_records, result.total_records);
//!     Ok(())
//! }
//! ```
//!
//! ## How it works
//!
//! - **Pages** are decoded lazily, one at a time ([`source`]).
//! - **Schema**: column names are explicit, prompted for, or inferred from
//!   a sample of the first rows ([`schema`]).
//! - **Strategies** turn a page into candidate rows: fixed line groups,
//!   regex matching, or detected table grids. Auto probes the first pages
//!   and keeps one strategy for the whole document ([`extract`]).
//! - **Validation** accepts or rejects each aligned row ([`validate`]).
//! - **Output** goes to a [`RecordSink`]; [`CsvSink`] writes RFC 4180 CSV.

pub mod detect;
pub mod error;
pub mod extract;
pub mod model;
pub mod pipeline;
pub mod schema;
pub mod sink;
pub mod source;
pub mod validate;

// Re-export commonly used types
pub use detect::{detect_header_from_bytes, detect_header_from_path, is_pdf, PdfHeader};
pub use error::{Error, Result};
pub use extract::{ExtractionMethod, ExtractionStrategy, GroupUnit, ProbePolicy, StrategyKind};
pub use model::{ConversionResult, DataRecord, Page, RawRow, RejectReason, RowOutcome};
pub use pipeline::{
    inspect, CancelToken, ConversionPipeline, ConvertOptions, Inspection, PipelineState,
    ProgressObserver,
};
pub use schema::{ColumnPrompt, ColumnSchema, LengthPolicy, SchemaConfig};
pub use sink::{CsvSink, MemorySink, RecordSink};
pub use source::{PageTextSource, SourceOptions};
pub use validate::{FieldRule, RuleSet, ValidationConfig, Validator};

use std::io::Write;
use std::path::Path;

use pipeline::LogProgress;

/// Convert a PDF file to a CSV file.
///
/// Interactive naming needs a prompt and is not available here; use
/// [`ConversionPipeline::with_prompt`] instead.
///
/// # Example
///
/// ```no_run
/// use pdfcsv::{convert_file, ConvertOptions, ExtractionMethod};
///
/// let options = ConvertOptions::new().with_method(ExtractionMethod::Table);
/// let result = convert_file("report.pdf", "report.csv", &options).unwrap();
/// assert!(result.valid_records <= result.total_records);
/// ```
pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: &ConvertOptions,
) -> Result<ConversionResult> {
    let source = PageTextSource::open(input, &options.source_options())?;
    let mut sink = CsvSink::create(output)?;
    run_logged(source, &mut sink, options)
}

/// Convert PDF bytes, writing CSV to `out`.
pub fn convert_bytes<W: Write>(data: &[u8], out: W, options: &ConvertOptions) -> Result<ConversionResult> {
    let source = PageTextSource::from_bytes(data, &options.source_options())?;
    let mut sink = CsvSink::new(out);
    run_logged(source, &mut sink, options)
}

fn run_logged(
    source: PageTextSource,
    sink: &mut dyn RecordSink,
    options: &ConvertOptions,
) -> Result<ConversionResult> {
    let mut progress = LogProgress;
    let mut pipeline = ConversionPipeline::new(options.clone()).with_observer(&mut progress);
    pipeline.run(source, sink)
}
