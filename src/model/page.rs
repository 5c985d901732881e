//! Page-level types.

use serde::{Deserialize, Serialize};

/// A table recovered from a page: rows of cell strings, in reading order.
pub type TableGrid = Vec<Vec<String>>;

/// A single decoded page.
///
/// Produced on demand by [`PageTextSource`](crate::source::PageTextSource)
/// and dropped once the pipeline has extracted its rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Page index (0-based)
    pub index: usize,

    /// Raw text content, lines separated by `\n`
    pub text: String,

    /// Table grids found on the page, if the backend detects tables
    pub tables: Option<Vec<TableGrid>>,
}

impl Page {
    /// Create a text-only page.
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
            tables: None,
        }
    }

    /// Create a page from a list of lines.
    pub fn from_lines<S: AsRef<str>>(index: usize, lines: &[S]) -> Self {
        let text = lines
            .iter()
            .map(|l| l.as_ref())
            .collect::<Vec<_>>()
            .join("\n");
        Self::new(index, text)
    }

    /// Attach table grids to the page.
    pub fn with_tables(mut self, tables: Vec<TableGrid>) -> Self {
        self.tables = Some(tables);
        self
    }

    /// Non-empty lines with their 1-based line number, trimmed.
    pub fn lines(&self) -> impl Iterator<Item = (usize, &str)> {
        self.text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty())
    }

    /// Whitespace-separated tokens of the whole page, in order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.text.split_whitespace()
    }

    /// Whether the page carries at least one non-empty table grid.
    pub fn has_tables(&self) -> bool {
        self.tables
            .as_ref()
            .is_some_and(|tables| tables.iter().any(|grid| !grid.is_empty()))
    }

    /// All table rows on the page, grids concatenated in order.
    pub fn table_rows(&self) -> impl Iterator<Item = &Vec<String>> {
        self.tables.iter().flatten().flatten()
    }

    /// Whether the page has neither text nor tables.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty() && !self.has_tables()
    }
}
