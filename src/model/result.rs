//! Conversion run statistics.

use serde::{Deserialize, Serialize};

use crate::extract::StrategyKind;

use super::RowOutcome;

/// Terminal result of a conversion run.
///
/// `total_records` counts every candidate row that reached alignment;
/// `valid_records` counts rows written to the sink.
/// `total_records == valid_records + rejected_records + invalid_records`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Candidate rows seen
    pub total_records: usize,
    /// Rows accepted and written
    pub valid_records: usize,
    /// Rows that could not be aligned to the schema
    pub rejected_records: usize,
    /// Rows that were aligned but failed validation
    pub invalid_records: usize,
    /// Lines that produced no candidate row (unmatched lines, partial groups)
    pub skipped_lines: usize,
    /// Pages fully processed
    pub pages_processed: usize,
    /// Pages whose decoding or extraction failed
    pub page_errors: usize,
    /// The concrete strategy used for the run
    pub strategy: Option<StrategyKind>,
    /// Set when the run stopped early on a cancellation request
    pub cancelled: bool,
}

impl ConversionResult {
    /// Create an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one row outcome.
    pub fn record(&mut self, outcome: &RowOutcome) {
        self.total_records += 1;
        match outcome {
            RowOutcome::Accepted => self.valid_records += 1,
            RowOutcome::Rejected(_) => self.rejected_records += 1,
            RowOutcome::ValidationFailed { .. } => self.invalid_records += 1,
        }
    }

    /// Rows seen but not written.
    pub fn dropped_records(&self) -> usize {
        self.total_records - self.valid_records
    }

    /// Share of candidate rows that were accepted (0.0 when nothing was seen).
    pub fn acceptance_rate(&self) -> f64 {
        if self.total_records == 0 {
            0.0
        } else {
            self.valid_records as f64 / self.total_records as f64
        }
    }
}
