//! BOM (Bill of Materials) Processing Module
//!
//! Splits BOM report PDFs into typed section tables, builds lookup indexes
//! from them and fills comparison-file rows from those indexes.

pub mod normalizer;
pub mod pdf_source;
pub mod segmenter;
pub mod supplier_index;
pub mod component_index;
pub mod care_content;
pub mod matcher;
pub mod validator;
pub mod catalog;
pub mod comparison;
pub mod export;

#[cfg(test)]
mod property_tests;

pub use normalizer::{RawTable, TableNormalizer};
pub use pdf_source::{DocumentSource, ExtractedPage, MemoryDocument, PdfDocument};
pub use segmenter::{parse_document, DocumentSegmenter, SectionClassifier};
pub use supplier_index::build_supplier_index;
pub use component_index::{build_component_index, canonical_colorway};
pub use care_content::CareContentBuilder;
pub use matcher::{ColorwayMatch, ColorwayMatcher, ComponentMatcher, MatchStrategy};
pub use validator::{style_matches, BomIndexes, LabelSelection, RowValidator};
pub use catalog::DocumentCatalog;
pub use comparison::{comparison_rows, ComparisonFormat, ComparisonReader};
pub use export::{export_resolved, export_sections, DocumentReport, StatusSummary};
