//! Data model shared by the extraction engine.
//!
//! Pages flow in from the page source, strategies turn them into
//! [`RawRow`]s, the schema aligns those into [`DataRecord`]s, and the run's
//! counters accumulate in a [`ConversionResult`]. None of these outlive the
//! page they came from except the result.

mod page;
mod result;
mod row;

pub use page::{Page, TableGrid};
pub use result::ConversionResult;
pub use row::{DataRecord, RawRow, RejectReason, RowOutcome};
