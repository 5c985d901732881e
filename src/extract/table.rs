//! Rows straight from detected table grids.

use crate::error::Result;
use crate::model::{Page, RawRow};

use super::{ExtractionStrategy, PageRows, StrategyKind};

/// Emits every grid row of the page as one row, cells trimmed.
///
/// Rows whose cells are all empty are skipped. A page without grids
/// yields nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableExtractor;

impl TableExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl ExtractionStrategy for TableExtractor {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Table
    }

    fn extract(&self, page: &Page) -> Result<PageRows> {
        let mut out = PageRows::default();
        for cells in page.table_rows() {
            let tokens: Vec<String> = cells.iter().map(|c| c.trim().to_string()).collect();
            if tokens.iter().all(String::is_empty) {
                out.skipped += 1;
                continue;
            }
            out.rows.push(RawRow::new(tokens, page.index, 0));
        }
        Ok(out)
    }
}
