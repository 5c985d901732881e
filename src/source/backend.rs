//! Page backends.
//!
//! A [`PageBackend`] hides the concrete PDF library behind per-page
//! primitives so the rest of the engine never sees lopdf types. Backends
//! decode pages on request; none of them cache decoded text.

use std::path::Path;

use lopdf::{Document as LopdfDocument, ObjectId};

use crate::detect::{detect_header_from_bytes, detect_header_from_path};
use crate::error::{Error, Result};
use crate::model::{Page, TableGrid};

use super::spans::extract_page_spans;
use super::table_detector::{TableDetector, TableDetectorConfig};

/// Abstract per-page access to a decoded document.
pub trait PageBackend {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Text of page `index` (0-based), lines separated by `\n`.
    fn page_text(&self, index: usize) -> Result<String>;

    /// Table grids of page `index`.
    ///
    /// `Ok(None)` means the backend does not detect tables on its own.
    fn page_tables(&self, index: usize) -> Result<Option<Vec<TableGrid>>>;

    /// Decode one page.
    ///
    /// A failure while detecting tables degrades to a text-only page.
    fn load_page(&self, index: usize) -> Result<Page> {
        let count = self.page_count();
        if index >= count {
            return Err(Error::PageOutOfRange(index, count));
        }

        let text = self.page_text(index)?;
        let tables = match self.page_tables(index) {
            Ok(tables) => tables,
            Err(e) => {
                log::warn!("Table detection failed on page {}: {}", index + 1, e);
                None
            }
        };

        Ok(Page {
            index,
            text,
            tables,
        })
    }
}

// ---------------------------------------------------------------------------
// LopdfBackend
// ---------------------------------------------------------------------------

/// [`PageBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
    /// (page number, object id) in document order
    pages: Vec<(u32, ObjectId)>,
    detector: Option<TableDetector>,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P, password: Option<&str>) -> Result<Self> {
        let path = path.as_ref();
        detect_header_from_path(path)?;
        let doc = LopdfDocument::load(path).map_err(|e| load_error(e, password))?;
        Self::from_document(doc, password)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8], password: Option<&str>) -> Result<Self> {
        detect_header_from_bytes(data)?;
        let doc = LopdfDocument::load_mem(data).map_err(|e| load_error(e, password))?;
        Self::from_document(doc, password)
    }

    /// Wrap an already loaded document, decrypting it if needed.
    pub fn from_document(mut doc: LopdfDocument, password: Option<&str>) -> Result<Self> {
        if doc.is_encrypted() {
            match password {
                Some(pwd) => doc.decrypt(pwd).map_err(|e| {
                    log::debug!("Decryption failed: {}", e);
                    Error::InvalidPassword
                })?,
                // Owner-password-only documents open with the empty user password
                None => doc.decrypt("").map_err(|_| Error::Encrypted)?,
            }
        }

        let pages = doc.get_pages().into_iter().collect();
        Ok(Self {
            doc,
            pages,
            detector: Some(TableDetector::new()),
        })
    }

    /// Use a custom table detector configuration.
    pub fn with_table_detector(mut self, config: TableDetectorConfig) -> Self {
        self.detector = Some(TableDetector::with_config(config));
        self
    }

    /// Skip table detection; pages carry text only.
    pub fn without_tables(mut self) -> Self {
        self.detector = None;
        self
    }

    /// PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn page_entry(&self, index: usize) -> Result<(u32, ObjectId)> {
        self.pages
            .get(index)
            .copied()
            .ok_or(Error::PageOutOfRange(index, self.pages.len()))
    }
}

/// A decryption failure while loading means the supplied password (or the
/// empty one) did not open the document.
fn load_error(err: lopdf::Error, password: Option<&str>) -> Error {
    match (err, password) {
        (lopdf::Error::Decryption(e), Some(_)) => {
            log::debug!("Decryption failed: {:?}", e);
            Error::InvalidPassword
        }
        (err, _) => err.into(),
    }
}

impl PageBackend for LopdfBackend {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> Result<String> {
        let (number, _) = self.page_entry(index)?;
        self.doc
            .extract_text(&[number])
            .map_err(|e| Error::PdfParse(format!("page {}: {}", number, e)))
    }

    fn page_tables(&self, index: usize) -> Result<Option<Vec<TableGrid>>> {
        let Some(detector) = &self.detector else {
            return Ok(None);
        };
        let (_, id) = self.page_entry(index)?;
        let spans = extract_page_spans(&self.doc, id)?;
        Ok(Some(detector.detect_grids(&spans)))
    }
}

// ---------------------------------------------------------------------------
// MemoryBackend
// ---------------------------------------------------------------------------

/// [`PageBackend`] over pages that were decoded elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    pages: Vec<Page>,
}

impl MemoryBackend {
    /// Create a backend from pages; indices are reassigned in order.
    pub fn new(pages: Vec<Page>) -> Self {
        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(index, page)| Page { index, ..page })
            .collect();
        Self { pages }
    }

    /// Create a text-only backend, one string per page.
    pub fn from_texts<S: Into<String>>(texts: impl IntoIterator<Item = S>) -> Self {
        Self::new(
            texts
                .into_iter()
                .enumerate()
                .map(|(i, text)| Page::new(i, text))
                .collect(),
        )
    }
}

impl PageBackend for MemoryBackend {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> Result<String> {
        self.pages
            .get(index)
            .map(|p| p.text.clone())
            .ok_or(Error::PageOutOfRange(index, self.pages.len()))
    }

    fn page_tables(&self, index: usize) -> Result<Option<Vec<TableGrid>>> {
        self.pages
            .get(index)
            .map(|p| p.tables.clone())
            .ok_or(Error::PageOutOfRange(index, self.pages.len()))
    }
}
