//! Table Normalizer
//!
//! Turns ragged rows of extracted cells into a rectangular [`Table`].

use std::collections::{HashMap, HashSet};

use bomfill_models::Table;

/// Raw cell grid as it comes off a page.
pub type RawTable = Vec<Vec<String>>;

/// Collapses line breaks inside a cell and trims it.
pub fn clean_cell(cell: &str) -> String {
    cell.replace(&['\r', '\n'][..], " ").trim().to_string()
}

pub fn clean_row(row: &[String]) -> Vec<String> {
    row.iter().map(|c| clean_cell(c)).collect()
}

fn non_empty(row: &[String]) -> usize {
    row.iter().filter(|c| !c.trim().is_empty()).count()
}

/// Synthesizes `col_<i>` for blank names and suffixes repeats `_2`, `_3`, ...
pub fn unique_headers(header: &[String]) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut suffixes: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(header.len());

    for (idx, cell) in header.iter().enumerate() {
        let base = match cell.trim() {
            "" => format!("col_{}", idx),
            name => name.to_string(),
        };

        let mut name = base.clone();
        if used.contains(&name) {
            let counter = suffixes.entry(base.clone()).or_insert(1);
            loop {
                *counter += 1;
                name = format!("{}_{}", base, counter);
                if !used.contains(&name) {
                    break;
                }
            }
        }

        used.insert(name.clone());
        names.push(name);
    }

    names
}

/// Header detection and width reconciliation.
#[derive(Debug, Clone)]
pub struct TableNormalizer {
    header_scan_rows: usize,
}

impl Default for TableNormalizer {
    fn default() -> Self {
        Self { header_scan_rows: 5 }
    }
}

impl TableNormalizer {
    pub fn new(header_scan_rows: usize) -> Self {
        Self {
            header_scan_rows: header_scan_rows.max(1),
        }
    }

    /// Index of the row with the most non-empty cells among the leading
    /// rows; the first such row wins ties.
    pub fn detect_header_row(&self, rows: &[Vec<String>]) -> usize {
        let mut best_idx = 0;
        let mut best_count = 0;
        for (idx, row) in rows.iter().take(self.header_scan_rows).enumerate() {
            let count = non_empty(row);
            if count > best_count {
                best_count = count;
                best_idx = idx;
            }
        }
        best_idx
    }

    pub fn normalize(&self, rows: &[Vec<String>]) -> Table {
        let rows: Vec<Vec<String>> = rows.iter().map(|r| clean_row(r)).collect();
        if rows.is_empty() {
            return Table::empty();
        }

        let header_idx = self.detect_header_row(&rows);
        let columns = unique_headers(&rows[header_idx]);

        // Table::new pads/truncates to the header width and drops blank rows.
        Table::new(columns, rows[header_idx + 1..].to_vec())
    }
}
