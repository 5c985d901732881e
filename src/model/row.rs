//! Row-level types: raw extracted rows and schema-aligned records.

use serde::{Deserialize, Serialize};

/// Tokens extracted from one line, line group or table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    /// Raw string tokens, in column order
    pub tokens: Vec<String>,

    /// Index of the page the row came from
    pub page: usize,

    /// 1-based line number of the row's first line (0 for table rows)
    pub line: usize,
}

impl RawRow {
    /// Create a new raw row.
    pub fn new(tokens: Vec<String>, page: usize, line: usize) -> Self {
        Self { tokens, page, line }
    }

    /// Create a raw row from string slices.
    pub fn from_strs(tokens: &[&str], page: usize, line: usize) -> Self {
        Self::new(tokens.iter().map(|t| t.to_string()).collect(), page, line)
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the row has no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Whether every token is blank.
    pub fn is_blank(&self) -> bool {
        self.tokens.iter().all(|t| t.trim().is_empty())
    }
}

/// A row aligned to the active schema.
///
/// `values.len()` always equals the schema's column count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRecord {
    /// Field values, one per schema column
    pub values: Vec<String>,

    /// Index of the originating page
    pub page: usize,

    /// Line of the originating row
    pub line: usize,

    /// Set by the validator
    pub valid: bool,
}

impl DataRecord {
    /// Build an unvalidated record from aligned values.
    pub fn new(values: Vec<String>, page: usize, line: usize) -> Self {
        Self {
            values,
            page,
            line,
            valid: false,
        }
    }

    /// Get a field by position.
    pub fn field(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }
}

/// Why a row could not be aligned to the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// The row has fewer tokens than the schema has columns.
    TooFewTokens { expected: usize, found: usize },
    /// The row has more tokens and the length policy rejects over-long rows.
    TooManyTokens { expected: usize, found: usize },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::TooFewTokens { expected, found } => {
                write!(f, "expected {} fields, found {}", expected, found)
            }
            RejectReason::TooManyTokens { expected, found } => {
                write!(f, "expected {} fields, found {} (over-long)", expected, found)
            }
        }
    }
}

/// What happened to one candidate row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// Aligned and valid; written to the sink.
    Accepted,
    /// Could not be aligned to the schema.
    Rejected(RejectReason),
    /// Aligned but failed a field rule.
    ValidationFailed {
        /// Position of the first failing field
        field: usize,
        /// Human-readable reason
        reason: String,
    },
}
