//! Progress reporting for conversion runs.

use crate::model::ConversionResult;

/// Receives progress notifications from the pipeline.
///
/// `on_page` fires after every page and, on dense pages, every
/// `progress_every_rows` rows. Counts are running totals for the run.
pub trait ProgressObserver {
    /// The run is about to read `total_pages` pages.
    fn on_start(&mut self, _total_pages: usize) {}

    /// Page `index` (0-based) is being or has been processed.
    fn on_page(&mut self, index: usize, total_pages: usize, total_rows: usize, valid_rows: usize);

    /// The run finished, possibly cancelled.
    fn on_finish(&mut self, _result: &ConversionResult) {}
}

/// Ignores all notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_page(&mut self, _: usize, _: usize, _: usize, _: usize) {}
}

/// Writes progress to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_start(&mut self, total_pages: usize) {
        log::info!("Converting {} page(s)", total_pages);
    }

    fn on_page(&mut self, index: usize, total_pages: usize, total_rows: usize, valid_rows: usize) {
        log::debug!(
            "Page {}/{}: {} row(s), {} valid",
            index + 1,
            total_pages,
            total_rows,
            valid_rows
        );
    }

    fn on_finish(&mut self, result: &ConversionResult) {
        log::info!(
            "Finished: {} of {} row(s) valid across {} page(s)",
            result.valid_records,
            result.total_records,
            result.pages_processed
        );
    }
}
