//! Document Segmenter
//!
//! Classifies every page of a BOM report into a named section and assembles
//! each section's raw tables into one normalized [`Table`].

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use bomfill_models::{DocumentMetadata, ParsedDocument, SectionName, Table};

use super::normalizer::{clean_row, unique_headers, RawTable, TableNormalizer};
use super::pdf_source::{DocumentSource, ExtractedPage};
use super::supplier_index::build_supplier_index;
use crate::config::ExtractionConfig;
use crate::error::{BomFillError, BomFillResult};

static METADATA_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(style|season|design|production\s+lo\w*)\s*(?:#|no\.?|number)?\s*:\s*(.*)$")
        .expect("valid regex")
});

static SEGMENT_GAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\t+|\s{2,}").expect("valid regex"));

static PAGE_BANNER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^page\s+\d+\s*(?:of|/)\s*\d+$").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Leading lines of the page only.
    Heading,
    /// Whole page text; reserved for phrases that never show up as cell text.
    Page,
}

struct Signature {
    section: SectionName,
    scope: Scope,
    all: &'static [&'static str],
    any: &'static [&'static str],
}

impl Signature {
    fn matches(&self, text: &str) -> bool {
        self.all.iter().all(|k| text.contains(k))
            && (self.any.is_empty() || self.any.iter().any(|k| text.contains(k)))
    }
}

const SIGNATURES: &[Signature] = &[
    Signature { section: SectionName::ColorBom, scope: Scope::Heading, all: &["color bom"], any: &[] },
    Signature { section: SectionName::ColorlessBom, scope: Scope::Heading, all: &["colorless bom"], any: &[] },
    Signature {
        section: SectionName::ColorSpecification,
        scope: Scope::Heading,
        all: &["color specification"],
        any: &[],
    },
    Signature {
        section: SectionName::CostingSummary,
        scope: Scope::Heading,
        all: &["costing bom"],
        any: &["summary", "total fob"],
    },
    Signature {
        section: SectionName::CostingDetail,
        scope: Scope::Heading,
        all: &[],
        any: &["costing bom", "costing detail"],
    },
    Signature { section: SectionName::Measurements, scope: Scope::Heading, all: &["measurement"], any: &[] },
    Signature { section: SectionName::HangtagReport, scope: Scope::Heading, all: &["hangtag"], any: &[] },
    Signature { section: SectionName::CareReport, scope: Scope::Page, all: &["care report"], any: &[] },
    Signature { section: SectionName::ContentReport, scope: Scope::Page, all: &["content report"], any: &[] },
    Signature { section: SectionName::SalesSample, scope: Scope::Page, all: &["sales sample"], any: &[] },
];

/// Keyword-signature page classifier.
#[derive(Debug, Clone)]
pub struct SectionClassifier {
    heading_lines: usize,
}

impl SectionClassifier {
    pub fn new(heading_lines: usize) -> Self {
        Self {
            heading_lines: heading_lines.max(1),
        }
    }

    /// Heading-scoped signatures are tried first, in order; page-scoped ones
    /// only when no heading signature matched.
    pub fn classify(&self, text: &str) -> SectionName {
        let heading = heading_area(text, self.heading_lines).to_lowercase();
        let page = text.to_lowercase();

        SIGNATURES
            .iter()
            .filter(|s| s.scope == Scope::Heading)
            .find(|s| s.matches(&heading))
            .or_else(|| {
                SIGNATURES
                    .iter()
                    .filter(|s| s.scope == Scope::Page)
                    .find(|s| s.matches(&page))
            })
            .map(|s| s.section)
            .unwrap_or(SectionName::Unknown)
    }
}

/// First `lines` non-empty lines of a page, joined by newlines.
fn heading_area(text: &str, lines: usize) -> String {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(lines)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reads `Style`, `Season`, `Design` and `Production LO` from page text.
///
/// Lines are split on column gaps so several labels may share a line. The
/// first value found for each label wins; missing labels stay empty.
pub fn parse_metadata(text: &str) -> DocumentMetadata {
    let mut metadata = DocumentMetadata::default();

    for line in text.lines() {
        for segment in SEGMENT_GAP.split(line.trim()) {
            let caps = match METADATA_FIELD.captures(segment.trim()) {
                Some(caps) => caps,
                None => continue,
            };
            let value = caps[2].trim();
            if value.is_empty() {
                continue;
            }

            let label = caps[1].to_lowercase();
            let slot = if label.starts_with("style") {
                &mut metadata.style
            } else if label.starts_with("season") {
                &mut metadata.season
            } else if label.starts_with("design") {
                &mut metadata.design
            } else {
                &mut metadata.production_location
            };
            if slot.is_empty() {
                *slot = value.to_string();
            }
        }
    }

    metadata
}

fn row_key(row: &[String]) -> Vec<String> {
    let mut key: Vec<String> = row.iter().map(|c| c.trim().to_lowercase()).collect();
    while key.last().map_or(false, |c| c.is_empty()) {
        key.pop();
    }
    key
}

fn table_width(table: &[Vec<String>]) -> usize {
    table.iter().map(|r| r.len()).max().unwrap_or(0)
}

/// Row holding both a material and a supplier label, if any leading row does.
fn find_stitch_header(table: &[Vec<String>], scan_rows: usize) -> Option<usize> {
    table.iter().take(scan_rows).position(|row| {
        let cells: Vec<String> = row.iter().map(|c| c.trim().to_lowercase()).collect();
        cells.iter().any(|c| c.contains("material")) && cells.iter().any(|c| c.contains("supplier"))
    })
}

/// Page tables, or a single-column table of its text lines when it has none.
fn page_tables(page: &ExtractedPage) -> (Vec<RawTable>, bool) {
    let tables: Vec<RawTable> = page
        .tables
        .iter()
        .filter(|t| t.iter().any(|row| row.iter().any(|c| !c.trim().is_empty())))
        .cloned()
        .collect();

    if !tables.is_empty() {
        return (tables, false);
    }

    let lines: RawTable = page
        .text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| vec![l.to_string()])
        .collect();

    if lines.is_empty() {
        (Vec::new(), true)
    } else {
        (vec![lines], true)
    }
}

/// Raw tables gathered for one section across pages.
#[derive(Debug, Default)]
struct SectionRows {
    tables: Vec<RawTable>,
    /// Canonical header of a material/supplier section, set by its first page.
    stitch_header: Option<Vec<String>>,
}

impl SectionRows {
    fn push(&mut self, table: RawTable, scan_rows: usize) {
        if self.stitch_header.is_none() {
            if let Some(idx) = find_stitch_header(&table, scan_rows) {
                self.stitch_header = Some(clean_row(&table[idx]));
            }
        }
        self.tables.push(table);
    }

    /// True when every table of an unclassified page lines up with this
    /// section's canonical header.
    fn continued_by(&self, tables: &[RawTable]) -> bool {
        match &self.stitch_header {
            Some(header) => {
                !tables.is_empty() && tables.iter().all(|t| table_width(t) == header.len())
            }
            None => false,
        }
    }
}

/// Splits a page-structured document into sections.
#[derive(Debug, Clone)]
pub struct DocumentSegmenter {
    config: ExtractionConfig,
    classifier: SectionClassifier,
    normalizer: TableNormalizer,
}

impl DocumentSegmenter {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            config: config.clone(),
            classifier: SectionClassifier::new(config.heading_lines),
            normalizer: TableNormalizer::new(config.header_scan_rows),
        }
    }

    /// Parses every page of `source`.
    ///
    /// A page that fails extraction is skipped and reported in
    /// `warnings`; only a document without pages is an error.
    pub fn parse(&self, source: &dyn DocumentSource) -> BomFillResult<ParsedDocument> {
        let page_count = source.page_count();
        if page_count == 0 {
            return Err(BomFillError::EmptyDocument);
        }

        let mut warnings = Vec::new();
        let mut metadata: Option<DocumentMetadata> = None;
        let mut collected: BTreeMap<SectionName, SectionRows> = BTreeMap::new();
        let mut previous: Option<SectionName> = None;

        for index in 0..page_count {
            let page = match source.page(index) {
                Ok(page) => page,
                Err(error) => {
                    warn!(page = error.page, error = %error.message, "Skipping page that failed extraction");
                    warnings.push(error);
                    continue;
                }
            };

            if metadata.is_none() {
                metadata = Some(parse_metadata(&page.text));
            }

            let (tables, fallback) = page_tables(&page);
            let mut section = self.classifier.classify(&page.text);
            if section == SectionName::Unknown && !fallback {
                if let Some(prev) = previous {
                    if collected.get(&prev).map_or(false, |rows| rows.continued_by(&tables)) {
                        section = prev;
                    }
                }
            }

            debug!(page = page.number, section = %section, tables = tables.len(), "Classified page");

            let rows = collected.entry(section).or_default();
            for table in tables {
                rows.push(table, self.config.header_scan_rows);
            }
            previous = Some(section);
        }

        let mut sections: BTreeMap<SectionName, Table> = collected
            .into_iter()
            .map(|(name, rows)| (name, self.assemble(rows)))
            .collect();
        for name in SectionName::KNOWN {
            sections.entry(name).or_insert_with(Table::empty);
        }

        let supplier_index = sections
            .get(&SectionName::CostingDetail)
            .map(build_supplier_index)
            .unwrap_or_default();

        let document = ParsedDocument {
            id: Uuid::new_v4(),
            parsed_at: Utc::now(),
            page_count,
            metadata: metadata.unwrap_or_default(),
            sections,
            supplier_index,
            warnings,
        };

        info!(
            style = %document.metadata.style,
            pages = page_count,
            supplier_codes = document.supplier_index.len(),
            warnings = document.warnings.len(),
            "Parsed BOM document"
        );

        Ok(document)
    }

    fn assemble(&self, rows: SectionRows) -> Table {
        match rows.stitch_header {
            Some(header) => self.stitch(&header, &rows.tables),
            None => self.concatenate(&rows.tables),
        }
    }

    /// Rows under one canonical header, with repeated headers, leading
    /// banners, page counters and sparse rows removed.
    fn stitch(&self, header: &[String], tables: &[RawTable]) -> Table {
        let header_key = row_key(header);
        let mut seen_header = false;
        let mut data = Vec::new();

        for row in tables.iter().flatten() {
            let row = clean_row(row);
            if row_key(&row) == header_key {
                seen_header = true;
                continue;
            }
            if !seen_header {
                continue;
            }

            let filled = row.iter().filter(|c| !c.is_empty()).count();
            if filled < self.config.min_data_cells || row.iter().any(|c| PAGE_BANNER.is_match(c)) {
                continue;
            }
            data.push(row);
        }

        Table::new(unique_headers(header), data)
    }

    /// All rows in page order, normalized once; later copies of the header
    /// row are dropped.
    fn concatenate(&self, tables: &[RawTable]) -> Table {
        let rows: Vec<Vec<String>> = tables.iter().flatten().map(|r| clean_row(r)).collect();
        if rows.is_empty() {
            return Table::empty();
        }

        let header_idx = self.normalizer.detect_header_row(&rows);
        let header_key = row_key(&rows[header_idx]);
        let kept: Vec<Vec<String>> = rows
            .into_iter()
            .enumerate()
            .filter(|(i, row)| *i <= header_idx || row_key(row) != header_key)
            .map(|(_, row)| row)
            .collect();

        self.normalizer.normalize(&kept)
    }
}

/// Parses `source` with the given extraction settings.
pub fn parse_document(
    source: &dyn DocumentSource,
    config: &ExtractionConfig,
) -> BomFillResult<ParsedDocument> {
    DocumentSegmenter::new(config).parse(source)
}
