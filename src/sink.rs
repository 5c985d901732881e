//! Record sinks.
//!
//! Accepted records leave the pipeline through a [`RecordSink`]. The
//! header is written once, before any row; `finish` flushes whatever the
//! sink buffers.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Error, Result};

/// Destination of accepted records.
pub trait RecordSink {
    /// Write the column names.
    fn write_header(&mut self, columns: &[String]) -> Result<()>;

    /// Write one accepted record.
    fn write_row(&mut self, values: &[String]) -> Result<()>;

    /// Flush buffered output.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// CSV output: UTF-8, comma-delimited, fields quoted only when needed and
/// embedded quotes doubled.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    /// Write CSV to any writer.
    pub fn new(inner: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .quote_style(csv::QuoteStyle::Necessary)
                .from_writer(inner),
        }
    }

    /// Flush and return the inner writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))
    }
}

impl CsvSink<BufWriter<File>> {
    /// Create (or truncate) a CSV file.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> RecordSink for CsvSink<W> {
    fn write_header(&mut self, columns: &[String]) -> Result<()> {
        self.writer.write_record(columns)?;
        Ok(())
    }

    fn write_row(&mut self, values: &[String]) -> Result<()> {
        self.writer.write_record(values)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Collects records in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySink {
    /// Header, once written
    pub header: Option<Vec<String>>,
    /// Rows in write order
    pub rows: Vec<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordSink for MemorySink {
    fn write_header(&mut self, columns: &[String]) -> Result<()> {
        self.header = Some(columns.to_vec());
        Ok(())
    }

    fn write_row(&mut self, values: &[String]) -> Result<()> {
        self.rows.push(values.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn render(rows: &[&[&str]]) -> String {
        let mut sink = CsvSink::new(Vec::new());
        sink.write_header(&strings(&["ID", "Gender", "Age"])).unwrap();
        for row in rows {
            sink.write_row(&strings(row)).unwrap();
        }
        sink.finish().unwrap();
        String::from_utf8(sink.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_header_then_rows() {
        assert_eq!(
            render(&[&["218915949830", "F", "21"]]),
            "ID,Gender,Age\n218915949830,F,21\n"
        );
    }

    #[test]
    fn test_quotes_only_when_needed() {
        assert_eq!(
            render(&[&["a,b", "say \"hi\"", "plain"]]),
            "ID,Gender,Age\n\"a,b\",\"say \"\"hi\"\"\",plain\n"
        );
    }

    #[test]
    fn test_field_count_mismatch_is_csv_error() {
        let mut sink = CsvSink::new(Vec::new());
        sink.write_header(&strings(&["a", "b"])).unwrap();
        assert!(matches!(sink.write_row(&strings(&["1"])), Err(Error::Csv(_))));
    }

    #[test]
    fn test_create_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut sink = CsvSink::create(&path).unwrap();
        sink.write_header(&strings(&["x"])).unwrap();
        sink.finish().unwrap();
        drop(sink);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x\n");
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::new();
        sink.write_header(&strings(&["x"])).unwrap();
        sink.write_row(&strings(&["1"])).unwrap();
        assert_eq!(sink.header, Some(strings(&["x"])));
        assert_eq!(sink.rows, vec![strings(&["1"])]);
    }
}
