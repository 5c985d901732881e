//! Lazy per-page access to a PDF document.
//!
//! [`PageTextSource`] owns the decoded document for the duration of a run
//! and hands out one [`Page`] at a time. Memory use follows the page being
//! processed, not the document: nothing is decoded before it is requested
//! and nothing is kept after the caller drops it.
//!
//! ```no_run
//! use pdfcsv::source::{PageTextSource, SourceOptions};
//!
//! let source = PageTextSource::open("records.pdf", &SourceOptions::default())?;
//! for page in source.pages() {
//!     let page = page?;
//!     println!("page {}: {} lines", page.index + 1, page.lines().count());
//! }
//! # Ok::<(), pdfcsv::Error>(())
//! ```

mod backend;
mod spans;
mod table_detector;

pub use backend::{LopdfBackend, MemoryBackend, PageBackend};
pub use spans::{decode_text_simple, extract_page_spans, TextSpan};
pub use table_detector::{DetectedTable, SpanRow, TableDetector, TableDetectorConfig};

use std::path::Path;

use crate::error::{Error, Result};
use crate::model::Page;

/// Options for opening a page source.
#[derive(Debug, Clone)]
pub struct SourceOptions {
    /// Password for encrypted documents
    pub password: Option<String>,

    /// Whether to run table detection on each page
    pub detect_tables: bool,

    /// Table detector tuning
    pub table_detector: TableDetectorConfig,

    /// Stop after this many pages (None = whole document)
    pub max_pages: Option<usize>,
}

impl SourceOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Enable or disable table detection.
    pub fn with_tables(mut self, detect: bool) -> Self {
        self.detect_tables = detect;
        self
    }

    /// Set table detector tuning.
    pub fn with_table_detector(mut self, config: TableDetectorConfig) -> Self {
        self.table_detector = config;
        self
    }

    /// Limit the number of pages read.
    pub fn with_max_pages(mut self, max: usize) -> Self {
        self.max_pages = Some(max);
        self
    }
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            password: None,
            detect_tables: true,
            table_detector: TableDetectorConfig::default(),
            max_pages: None,
        }
    }
}

/// A finite, lazily decoded sequence of pages.
pub struct PageTextSource {
    backend: Box<dyn PageBackend>,
    max_pages: Option<usize>,
}

impl PageTextSource {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P, options: &SourceOptions) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Opening {}", path.display());
        let backend = LopdfBackend::load_file(path, options.password.as_deref())?;
        Ok(Self::with_lopdf(backend, options))
    }

    /// Open a PDF held in memory.
    pub fn from_bytes(data: &[u8], options: &SourceOptions) -> Result<Self> {
        let backend = LopdfBackend::load_bytes(data, options.password.as_deref())?;
        Ok(Self::with_lopdf(backend, options))
    }

    /// Wrap any backend.
    pub fn from_backend(backend: impl PageBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            max_pages: None,
        }
    }

    /// Limit the number of pages yielded.
    pub fn with_max_pages(mut self, max: Option<usize>) -> Self {
        self.max_pages = max;
        self
    }

    fn with_lopdf(backend: LopdfBackend, options: &SourceOptions) -> Self {
        let backend = if options.detect_tables {
            backend.with_table_detector(options.table_detector.clone())
        } else {
            backend.without_tables()
        };
        Self::from_backend(backend).with_max_pages(options.max_pages)
    }

    /// Number of pages this source yields.
    pub fn page_count(&self) -> usize {
        let total = self.backend.page_count();
        self.max_pages.map_or(total, |max| max.min(total))
    }

    /// Decode page `index` directly.
    pub fn page(&self, index: usize) -> Result<Page> {
        let count = self.page_count();
        if index >= count {
            return Err(Error::PageOutOfRange(index, count));
        }
        self.backend.load_page(index)
    }

    /// Iterate over pages in order, decoding each on demand.
    pub fn pages(&self) -> Pages<'_> {
        Pages {
            source: self,
            next: 0,
            end: self.page_count(),
        }
    }
}

impl std::fmt::Debug for PageTextSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageTextSource")
            .field("page_count", &self.page_count())
            .finish()
    }
}

/// Iterator over the pages of a [`PageTextSource`].
pub struct Pages<'a> {
    source: &'a PageTextSource,
    next: usize,
    end: usize,
}

impl Iterator for Pages<'_> {
    type Item = Result<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some(self.source.backend.load_page(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Pages<'_> {}
