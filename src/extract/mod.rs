//! Extraction strategies.
//!
//! A strategy turns one [`Page`] into candidate [`RawRow`]s. Strategies are
//! pure: the same page always yields the same rows, and nothing is carried
//! from one page to the next.
//!
//! The concrete strategies are [`StructuredExtractor`], [`RegexExtractor`]
//! and [`TableExtractor`]. `Auto` is not a strategy of its own; the
//! [`AutoSelector`] probes the leading pages once and names the concrete
//! strategy used for the whole document.

mod auto;
mod regex;
mod structured;
mod table;

pub use self::auto::{AutoSelector, ProbePolicy, ProbeReport, DEFAULT_PROBE_PAGES};
pub use self::regex::{RegexExtractor, CANONICAL_PATTERN};
pub use self::structured::{GroupUnit, StructuredExtractor};
pub use self::table::TableExtractor;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{Page, RawRow};

/// Candidate rows produced from one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRows {
    /// Rows in page order
    pub rows: Vec<RawRow>,
    /// Lines (or tokens, or table rows) that produced no row
    pub skipped: usize,
}

impl PageRows {
    /// Number of non-blank rows.
    pub fn non_empty(&self) -> usize {
        self.rows.iter().filter(|r| !r.is_blank()).count()
    }
}

/// Converts a page into candidate rows.
pub trait ExtractionStrategy {
    /// Which strategy this is.
    fn kind(&self) -> StrategyKind;

    /// Extract candidate rows from one page.
    fn extract(&self, page: &Page) -> Result<PageRows>;
}

/// A concrete extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Fixed groups of consecutive lines
    Structured,
    /// Line-by-line pattern matching
    Regex,
    /// Detected table grids
    Table,
}

impl StrategyKind {
    /// Probe precedence; earlier kinds win ties.
    pub const PRECEDENCE: [StrategyKind; 3] =
        [StrategyKind::Table, StrategyKind::Structured, StrategyKind::Regex];

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Structured => "structured",
            StrategyKind::Regex => "regex",
            StrategyKind::Table => "table",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategy selection in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionMethod {
    /// Probe the leading pages and pick
    #[default]
    Auto,
    /// Always use the structured strategy
    Structured,
    /// Always use the regex strategy
    Regex,
    /// Always use the table strategy
    Table,
}

impl ExtractionMethod {
    /// The fixed strategy, or `None` for `Auto`.
    pub fn fixed(&self) -> Option<StrategyKind> {
        match self {
            ExtractionMethod::Auto => None,
            ExtractionMethod::Structured => Some(StrategyKind::Structured),
            ExtractionMethod::Regex => Some(StrategyKind::Regex),
            ExtractionMethod::Table => Some(StrategyKind::Table),
        }
    }
}

impl From<StrategyKind> for ExtractionMethod {
    fn from(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::Structured => ExtractionMethod::Structured,
            StrategyKind::Regex => ExtractionMethod::Regex,
            StrategyKind::Table => ExtractionMethod::Table,
        }
    }
}

/// One instance of every concrete strategy, configured for a schema.
#[derive(Debug, Clone)]
pub struct StrategySet {
    /// Structured strategy
    pub structured: StructuredExtractor,
    /// Regex strategy
    pub regex: RegexExtractor,
    /// Table strategy
    pub table: TableExtractor,
}

impl StrategySet {
    /// Defaults for a schema of `columns` columns.
    pub fn for_columns(columns: usize) -> Result<Self> {
        Ok(Self {
            structured: StructuredExtractor::new(columns),
            regex: RegexExtractor::for_columns(columns)?,
            table: TableExtractor::new(),
        })
    }

    /// The strategy of the given kind.
    pub fn get(&self, kind: StrategyKind) -> &dyn ExtractionStrategy {
        match kind {
            StrategyKind::Structured => &self.structured,
            StrategyKind::Regex => &self.regex,
            StrategyKind::Table => &self.table,
        }
    }
}
