use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::supplier::SupplierIndex;
use crate::table::Table;

/// Named section of a BOM report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionName {
    ColorBom,
    ColorlessBom,
    ColorSpecification,
    CostingSummary,
    CostingDetail,
    CareReport,
    ContentReport,
    Measurements,
    SalesSample,
    HangtagReport,
    Unknown,
}

impl SectionName {
    /// Every section a parsed document always carries, possibly empty.
    pub const KNOWN: [SectionName; 10] = [
        SectionName::ColorBom,
        SectionName::ColorlessBom,
        SectionName::ColorSpecification,
        SectionName::CostingSummary,
        SectionName::CostingDetail,
        SectionName::CareReport,
        SectionName::ContentReport,
        SectionName::Measurements,
        SectionName::SalesSample,
        SectionName::HangtagReport,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::ColorBom => "color_bom",
            Self::ColorlessBom => "colorless_bom",
            Self::ColorSpecification => "color_specification",
            Self::CostingSummary => "costing_summary",
            Self::CostingDetail => "costing_detail",
            Self::CareReport => "care_report",
            Self::ContentReport => "content_report",
            Self::Measurements => "measurements",
            Self::SalesSample => "sales_sample",
            Self::HangtagReport => "hangtag_report",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Header fields printed on the first page of a BOM report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub style: String,
    pub season: String,
    pub design: String,
    pub production_location: String,
}

/// A single page that could not be turned into tables.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("Page {page}: {message}")]
pub struct PageExtractionError {
    pub page: usize,
    pub message: String,
}

impl PageExtractionError {
    pub fn new(page: usize, message: impl Into<String>) -> Self {
        Self {
            page,
            message: message.into(),
        }
    }
}

/// One uploaded BOM report split into typed sections.
///
/// Built once per upload and read-only afterwards. Every entry of
/// [`SectionName::KNOWN`] is present in `sections`.
#[derive(Debug)]
pub struct ParsedDocument {
    pub id: Uuid,
    pub parsed_at: DateTime<Utc>,
    pub page_count: usize,
    pub metadata: DocumentMetadata,
    pub sections: BTreeMap<SectionName, Table>,
    pub supplier_index: SupplierIndex,
    pub warnings: Vec<PageExtractionError>,
}

impl ParsedDocument {
    /// Section table, or an empty table for sections the document lacks.
    pub fn section(&self, name: SectionName) -> &Table {
        static BLANK: Table = Table::BLANK;
        self.sections.get(&name).unwrap_or(&BLANK)
    }

    pub fn has_all_known_sections(&self) -> bool {
        SectionName::KNOWN
            .iter()
            .all(|name| self.sections.contains_key(name))
    }

    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id,
            parsed_at: self.parsed_at,
            page_count: self.page_count,
            metadata: self.metadata.clone(),
            section_rows: self
                .sections
                .iter()
                .map(|(name, table)| (name.key().to_string(), table.len()))
                .collect(),
            supplier_codes: self.supplier_index.len(),
            warnings: self.warnings.clone(),
        }
    }
}

/// Serializable overview of a parsed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: Uuid,
    pub parsed_at: DateTime<Utc>,
    pub page_count: usize,
    pub metadata: DocumentMetadata,
    pub section_rows: BTreeMap<String, usize>,
    pub supplier_codes: usize,
    pub warnings: Vec<PageExtractionError>,
}
