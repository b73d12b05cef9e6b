//! Comparison File Reader
//!
//! Reads the buyer's comparison spreadsheet (CSV, XLSX or XLS) into a
//! [`ComparisonTable`], locates its header row and maps the style and
//! colorway columns.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use bomfill_models::{ColumnMapping, ComparisonRow, ComparisonTable};

use super::normalizer::{clean_row, unique_headers};
use crate::config::ComparisonConfig;
use crate::error::{BomFillError, BomFillResult};

/// Supported comparison file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonFormat {
    Csv,
    Xlsx,
    Xls,
}

impl ComparisonFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ComparisonReader {
    header_fill_ratio: f64,
    min_mapping_confidence: f64,
}

impl Default for ComparisonReader {
    fn default() -> Self {
        Self::new(&ComparisonConfig::default())
    }
}

impl ComparisonReader {
    pub fn new(config: &ComparisonConfig) -> Self {
        Self {
            header_fill_ratio: config.header_fill_ratio,
            min_mapping_confidence: config.min_mapping_confidence,
        }
    }

    pub fn read_path(&self, path: &Path) -> Result<ComparisonTable> {
        let data = std::fs::read(path)
            .with_context(|| format!("Failed to read comparison file {}", path.display()))?;
        let filename = path.to_string_lossy();
        self.read_bytes(&filename, &data, None)
    }

    /// Parse a comparison file from bytes
    pub fn read_bytes(
        &self,
        filename: &str,
        data: &[u8],
        format: Option<ComparisonFormat>,
    ) -> Result<ComparisonTable> {
        let format = format
            .or_else(|| ComparisonFormat::from_extension(Path::new(filename)))
            .context("Could not determine comparison file format")?;

        let grid = match format {
            ComparisonFormat::Csv => read_csv_grid(data)?,
            ComparisonFormat::Xlsx | ComparisonFormat::Xls => read_excel_grid(data, format)?,
        };

        let table = self
            .locate_header(grid)
            .with_context(|| format!("No header row found in {}", filename))?;
        info!(
            file = %filename,
            header_row = table.header_row,
            columns = table.headers.len(),
            rows = table.len(),
            "Read comparison file"
        );
        Ok(table)
    }

    /// The header is the first row filling at least `header_fill_ratio` of
    /// the widest row. Rows after it are padded or truncated to its width;
    /// blank rows are dropped.
    pub fn locate_header(&self, grid: Vec<Vec<String>>) -> Option<ComparisonTable> {
        let grid: Vec<Vec<String>> = grid.iter().map(|row| clean_row(row)).collect();
        let width = grid
            .iter()
            .map(|row| row.iter().rposition(|c| !c.is_empty()).map_or(0, |p| p + 1))
            .max()
            .unwrap_or(0);
        if width == 0 {
            return None;
        }

        let threshold = self.header_fill_ratio * width as f64;
        let header_row = grid.iter().position(|row| {
            let filled = row.iter().filter(|c| !c.is_empty()).count();
            filled > 0 && filled as f64 >= threshold
        })?;

        let mut header = grid[header_row].clone();
        header.resize(width, String::new());
        let headers = unique_headers(&header);

        let rows = grid
            .into_iter()
            .skip(header_row + 1)
            .filter(|row| row.iter().any(|c| !c.is_empty()))
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();

        Some(ComparisonTable {
            headers,
            rows,
            header_row,
        })
    }

    /// Settles the column mapping. Each role comes from the caller when
    /// given, otherwise from keyword detection.
    pub fn resolve_mapping(
        &self,
        table: &ComparisonTable,
        style_column: Option<&str>,
        color_column: Option<&str>,
    ) -> BomFillResult<ColumnMapping> {
        let find = |name: &str| -> BomFillResult<String> {
            table
                .headers
                .iter()
                .find(|h| h.trim().eq_ignore_ascii_case(name.trim()))
                .cloned()
                .ok_or_else(|| {
                    BomFillError::column_mapping(format!(
                        "Column '{}' not found; available: {}",
                        name,
                        table.headers.join(", ")
                    ))
                })
        };

        if let (Some(style), Some(color)) = (style_column, color_column) {
            return Ok(ColumnMapping::explicit(find(style)?, find(color)?));
        }

        let detected = ColumnMapping::auto_detect(&table.headers);
        let mut mapping = match (detected, style_column, color_column) {
            (Some(mut mapping), style, color) => {
                if let Some(style) = style {
                    mapping.style_column = find(style)?;
                }
                if let Some(color) = color {
                    mapping.color_column = find(color)?;
                }
                mapping
            }
            (None, _, _) => {
                return Err(BomFillError::column_mapping(format!(
                    "Could not detect style and colorway columns among: {}",
                    table.headers.join(", ")
                )))
            }
        };

        if mapping.style_column == mapping.color_column {
            return Err(BomFillError::column_mapping(format!(
                "Style and colorway both map to '{}'",
                mapping.style_column
            )));
        }
        if style_column.is_some() || color_column.is_some() {
            mapping.auto_detected = false;
        } else if mapping.confidence < self.min_mapping_confidence {
            return Err(BomFillError::column_mapping(format!(
                "Detected mapping {} / {} has confidence {:.2}; pass the columns explicitly",
                mapping.style_column, mapping.color_column, mapping.confidence
            )));
        }

        info!(
            style = %mapping.style_column,
            color = %mapping.color_column,
            confidence = mapping.confidence,
            auto = mapping.auto_detected,
            "Comparison columns mapped"
        );
        Ok(mapping)
    }
}

/// Applies `mapping` to every data row. Passthrough keeps all columns in
/// file order.
pub fn comparison_rows(
    table: &ComparisonTable,
    mapping: &ColumnMapping,
) -> BomFillResult<Vec<ComparisonRow>> {
    let position = |name: &str| {
        table.headers.iter().position(|h| h == name).ok_or_else(|| {
            BomFillError::column_mapping(format!("Column '{}' is not in the table", name))
        })
    };
    let style_idx = position(&mapping.style_column)?;
    let color_idx = position(&mapping.color_column)?;

    let rows: Vec<ComparisonRow> = table
        .rows
        .iter()
        .enumerate()
        .map(|(index, cells)| {
            let cell = |i: usize| cells.get(i).map(String::as_str).unwrap_or("");
            let mut row = ComparisonRow::new(index, cell(style_idx), cell(color_idx));
            row.passthrough = table
                .headers
                .iter()
                .enumerate()
                .map(|(i, header)| (header.clone(), cell(i).to_string()))
                .collect();
            row
        })
        .collect();

    let blank = rows.iter().filter(|r| r.buyer_style.is_empty()).count();
    if blank > 0 {
        warn!(rows = blank, "Comparison rows without a buyer style");
    }
    Ok(rows)
}

fn read_csv_grid(data: &[u8]) -> Result<Vec<Vec<String>>> {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut grid = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Row {}: CSV parse error", idx + 1))?;
        grid.push(record.iter().map(str::to_string).collect());
    }
    Ok(grid)
}

fn read_excel_grid(data: &[u8], format: ComparisonFormat) -> Result<Vec<Vec<String>>> {
    use calamine::{open_workbook_from_rs, DataType, Range, Reader, Xls, Xlsx};

    let cursor = std::io::Cursor::new(data);
    let range: Range<DataType> = match format {
        ComparisonFormat::Xls => {
            let mut workbook: Xls<_> =
                open_workbook_from_rs(cursor).context("Failed to open Excel workbook")?;
            let sheet_name = workbook
                .sheet_names()
                .first()
                .cloned()
                .context("No sheets found in workbook")?;
            workbook
                .worksheet_range(&sheet_name)
                .context("Failed to read worksheet")??
        }
        _ => {
            let mut workbook: Xlsx<_> =
                open_workbook_from_rs(cursor).context("Failed to open Excel workbook")?;
            let sheet_name = workbook
                .sheet_names()
                .first()
                .cloned()
                .context("No sheets found in workbook")?;
            workbook
                .worksheet_range(&sheet_name)
                .context("Failed to read worksheet")??
        }
    };

    Ok(range
        .rows()
        .map(|row| row.iter().map(|cell: &DataType| cell.to_string()).collect())
        .collect())
}
