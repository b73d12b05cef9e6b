//! Plain-row exports: resolved rows and section tables as CSV, document
//! reports as JSON.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use bomfill_models::{DocumentSummary, OutputField, ParsedDocument, ResolvedRow, SectionName, Table};

use super::validator::BomIndexes;
use crate::config::MatchingConfig;
use crate::error::{BomFillError, BomFillResult};

/// Row counts per verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub validated: usize,
    pub partial: usize,
    pub errors: usize,
}

impl StatusSummary {
    pub fn from_rows(rows: &[ResolvedRow]) -> Self {
        rows.iter().fold(Self::default(), |mut summary, row| {
            if row.status.is_error() {
                summary.errors += 1;
            } else if row.status == bomfill_models::ValidationStatus::Validated {
                summary.validated += 1;
            } else {
                summary.partial += 1;
            }
            summary
        })
    }

    pub fn total(&self) -> usize {
        self.validated + self.partial + self.errors
    }
}

/// Writes the comparison columns followed by the twenty output columns.
/// Comparison columns named like an output column are replaced by it.
pub fn write_resolved_csv<W: Write>(
    writer: W,
    headers: &[String],
    rows: &[ResolvedRow],
) -> BomFillResult<()> {
    let output_headers = OutputField::export_headers();
    let passthrough: Vec<&str> = headers
        .iter()
        .map(String::as_str)
        .filter(|name| !output_headers.contains(name))
        .collect();

    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(passthrough.iter().chain(output_headers.iter()))?;

    for resolved in rows {
        let mut record: Vec<String> = passthrough
            .iter()
            .map(|name| resolved.row.value(name).unwrap_or("").to_string())
            .collect();
        record.extend(resolved.output_values());
        csv.write_record(&record)?;
    }

    csv.flush()?;
    Ok(())
}

pub fn export_resolved(path: &Path, headers: &[String], rows: &[ResolvedRow]) -> BomFillResult<()> {
    let file = File::create(path)?;
    write_resolved_csv(file, headers, rows)?;
    info!(path = %path.display(), rows = rows.len(), "Exported resolved rows");
    Ok(())
}

pub fn write_table_csv<W: Write>(writer: W, table: &Table) -> BomFillResult<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(table.columns())?;
    for row in table.rows() {
        csv.write_record(row.cells())?;
    }
    csv.flush()?;
    Ok(())
}

/// One `<section>.csv` per non-empty section, written into `dir`.
pub fn export_sections(document: &ParsedDocument, dir: &Path) -> BomFillResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for name in SectionName::KNOWN {
        let table = document.section(name);
        if table.is_empty() {
            continue;
        }
        let path = dir.join(format!("{}.csv", name.key()));
        write_table_csv(File::create(&path)?, table)?;
        written.push(path);
    }

    info!(dir = %dir.display(), files = written.len(), "Exported section tables");
    Ok(written)
}

/// What `inspect` prints about a parsed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentReport {
    #[serde(flatten)]
    pub summary: DocumentSummary,
    pub colorways: Vec<String>,
    /// `"<component> - <material code>"` choices for the label selectors.
    pub selection_tokens: Vec<String>,
}

impl DocumentReport {
    pub fn build(document: &ParsedDocument, config: &MatchingConfig) -> Self {
        let indexes = BomIndexes::build(document, config);
        Self {
            summary: document.summary(),
            selection_tokens: indexes.components.selection_tokens(),
            colorways: indexes.colorways,
        }
    }

    pub fn to_json(&self) -> BomFillResult<String> {
        serde_json::to_string_pretty(self).map_err(BomFillError::from)
    }

    pub fn write_json(&self, path: &Path) -> BomFillResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bomfill_models::{ComparisonRow, ValidationStatus};
    use std::collections::BTreeMap;

    use crate::bom::pdf_source::MemoryDocument;
    use crate::bom::segmenter::parse_document;
    use crate::config::ExtractionConfig;

    fn resolved(index: usize, status: ValidationStatus) -> ResolvedRow {
        let mut row = ComparisonRow::new(index, "CL2880", "010");
        row.passthrough = vec![
            ("Buyer Style Number".to_string(), "CL2880".to_string()),
            ("Main Label".to_string(), "stale".to_string()),
            ("Color/Option".to_string(), "010".to_string()),
        ];
        let mut fields = BTreeMap::new();
        if !status.is_error() {
            fields.insert(OutputField::MainLabel, "Label 1".to_string());
        }
        ResolvedRow {
            row,
            colorway: Some("010-Black".to_string()),
            fields,
            status,
        }
    }

    fn headers() -> Vec<String> {
        ["Buyer Style Number", "Main Label", "Color/Option"]
            .iter()
            .map(|h| h.to_string())
            .collect()
    }

    fn parsed() -> ParsedDocument {
        let source = MemoryDocument::new().with_page(
            "Color BOM\nStyle: CL2880",
            vec![vec![
                vec!["Component".to_string(), "Details".to_string(), "010-Black".to_string()],
                vec!["Label 1".to_string(), "Woven (003287)".to_string(), "Black".to_string()],
            ]],
        );
        parse_document(&source, &ExtractionConfig::default()).unwrap()
    }

    #[test]
    fn test_resolved_csv_layout() {
        let rows = vec![
            resolved(0, ValidationStatus::Partial),
            resolved(1, ValidationStatus::NoBomData),
        ];
        let mut buffer = Vec::new();
        write_resolved_csv(&mut buffer, &headers(), &rows).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("Buyer Style Number,Color/Option,Main Label,Main Label Color"));
        assert!(lines[0].ends_with("Validation Status"));
        assert_eq!(lines[0].split(',').count(), 22);
        assert!(lines[1].starts_with("CL2880,010,Label 1,"));
        assert!(lines[2].starts_with("CL2880,010,,"));
        assert!(!text.contains("stale"));
    }

    #[test]
    fn test_header_only_comparison_keeps_its_columns() {
        let mut buffer = Vec::new();
        write_resolved_csv(&mut buffer, &headers(), &[]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Buyer Style Number,Color/Option,Main Label,"));
        assert_eq!(lines[0].split(',').count(), 22);
    }

    #[test]
    fn test_status_summary() {
        let rows = vec![
            resolved(0, ValidationStatus::Validated),
            resolved(1, ValidationStatus::Partial),
            resolved(2, ValidationStatus::Partial),
            resolved(3, ValidationStatus::NoBomData),
        ];
        let summary = StatusSummary::from_rows(&rows);
        assert_eq!(summary, StatusSummary { validated: 1, partial: 2, errors: 1 });
        assert_eq!(summary.total(), 4);
    }

    #[test]
    fn test_export_sections_and_report() {
        let document = parsed();
        let dir = tempfile::tempdir().unwrap();

        let written = export_sections(&document, dir.path()).unwrap();
        assert_eq!(written, vec![dir.path().join("color_bom.csv")]);
        let csv = std::fs::read_to_string(&written[0]).unwrap();
        assert!(csv.starts_with("Component,Details,010-Black"));

        let report = DocumentReport::build(&document, &MatchingConfig::default());
        assert_eq!(report.selection_tokens, vec!["Label 1 - 003287"]);
        assert_eq!(report.colorways, vec!["010-Black"]);

        let path = dir.path().join("report.json");
        report.write_json(&path).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["metadata"]["style"], "CL2880");
        assert_eq!(json["section_rows"]["color_bom"], 1);
    }
}
