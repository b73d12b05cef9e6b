//! Page sources for the segmenter.
//!
//! The segmenter only needs each page's text and zero or more raw tables.
//! [`PdfDocument`] derives both from a PDF's text layer; [`MemoryDocument`]
//! lets callers with their own extractor feed pages directly.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::debug;

use bomfill_models::PageExtractionError;

use super::normalizer::RawTable;
use crate::config::ExtractionConfig;
use crate::error::{BomFillError, BomFillResult};

/// Tabs or runs of two or more spaces separate layout columns.
static COLUMN_GAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\t+|\s{2,}").expect("valid regex"));

/// Text and tables recovered from one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedPage {
    /// One-based page number.
    pub number: usize,
    pub text: String,
    pub tables: Vec<RawTable>,
}

/// A page-structured document.
pub trait DocumentSource {
    fn page_count(&self) -> usize;

    /// Extracts page `index` (zero-based). A failure is local to that page.
    fn page(&self, index: usize) -> Result<ExtractedPage, PageExtractionError>;
}

/// Pages supplied by the caller, failures included.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    pages: Vec<Result<ExtractedPage, PageExtractionError>>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, text: &str, tables: Vec<RawTable>) -> Self {
        let number = self.pages.len() + 1;
        self.pages.push(Ok(ExtractedPage {
            number,
            text: text.to_string(),
            tables,
        }));
        self
    }

    pub fn with_failed_page(mut self, message: &str) -> Self {
        let number = self.pages.len() + 1;
        self.pages.push(Err(PageExtractionError::new(number, message)));
        self
    }
}

impl DocumentSource for MemoryDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, index: usize) -> Result<ExtractedPage, PageExtractionError> {
        self.pages
            .get(index)
            .cloned()
            .unwrap_or_else(|| Err(PageExtractionError::new(index + 1, "page out of range")))
    }
}

/// A PDF whose text layer was extracted page by page.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    pages: Vec<String>,
    max_garbled_ratio: f64,
}

impl PdfDocument {
    pub fn from_bytes(data: &[u8], config: &ExtractionConfig) -> BomFillResult<Self> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(data)
            .map_err(|e| BomFillError::pdf_extraction(e.to_string()))?;

        debug!(pages = pages.len(), "PDF text layer extracted");
        Ok(Self {
            pages,
            max_garbled_ratio: config.max_garbled_ratio,
        })
    }

    pub fn open(path: &Path, config: &ExtractionConfig) -> BomFillResult<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data, config)
    }
}

impl DocumentSource for PdfDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, index: usize) -> Result<ExtractedPage, PageExtractionError> {
        let number = index + 1;
        let text = self
            .pages
            .get(index)
            .ok_or_else(|| PageExtractionError::new(number, "page out of range"))?;

        let ratio = garbled_ratio(text);
        if ratio > self.max_garbled_ratio {
            return Err(PageExtractionError::new(
                number,
                format!("{:.0}% of glyphs could not be decoded", ratio * 100.0),
            ));
        }

        Ok(ExtractedPage {
            number,
            text: text.clone(),
            tables: tables_from_text(text),
        })
    }
}

/// Share of replacement and control characters among non-whitespace text.
pub fn garbled_ratio(text: &str) -> f64 {
    let mut total = 0usize;
    let mut garbled = 0usize;
    for c in text.chars().filter(|c| !c.is_whitespace()) {
        total += 1;
        if c == char::REPLACEMENT_CHARACTER || c.is_control() {
            garbled += 1;
        }
    }
    if total == 0 {
        0.0
    } else {
        garbled as f64 / total as f64
    }
}

/// Splits a laid-out text line into cells on column gaps.
pub fn split_layout_line(line: &str) -> Vec<String> {
    COLUMN_GAP
        .split(line.trim())
        .map(|cell| cell.trim().to_string())
        .filter(|cell| !cell.is_empty())
        .collect()
}

/// Groups consecutive multi-cell lines into tables.
///
/// A table needs at least two such lines; single-cell lines end the current
/// table, blank lines are ignored.
pub fn tables_from_text(text: &str) -> Vec<RawTable> {
    let mut tables = Vec::new();
    let mut current: RawTable = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let cells = split_layout_line(line);
        if cells.len() >= 2 {
            current.push(cells);
        } else if !current.is_empty() {
            let finished = std::mem::take(&mut current);
            if finished.len() >= 2 {
                tables.push(finished);
            }
        }
    }

    if current.len() >= 2 {
        tables.push(current);
    }

    tables
}
