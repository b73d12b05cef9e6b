//! Rectangular, header-named tables recovered from BOM pages.
//!
//! Every cell is text. The empty string is the only "no value" marker; a
//! lookup against a missing column yields [`EMPTY`] rather than an `Option`.

use serde::{Deserialize, Serialize};

/// Sentinel returned for absent cells and unknown columns.
pub const EMPTY: &str = "";

/// A table with an explicit header schema.
///
/// Invariants upheld by [`Table::new`]: every row has exactly
/// `columns.len()` cells and no row is entirely empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// A table with no columns and no rows.
    pub const BLANK: Table = Table {
        columns: Vec::new(),
        rows: Vec::new(),
    };

    /// Builds a table, padding or truncating rows to the header width and
    /// dropping rows whose cells are all empty.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .collect();

        Self { columns, rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|cells| Row {
            columns: &self.columns,
            cells,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        self.rows.iter().map(move |cells| Row {
            columns: &self.columns,
            cells,
        })
    }

    /// Position of a column whose name matches exactly (case-insensitive, trimmed).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let needle = name.trim().to_lowercase();
        self.columns
            .iter()
            .position(|c| c.trim().to_lowercase() == needle)
    }

    /// First column whose lowercased name satisfies `predicate`.
    pub fn find_column<F>(&self, predicate: F) -> Option<usize>
    where
        F: Fn(&str) -> bool,
    {
        self.columns
            .iter()
            .position(|c| predicate(&c.trim().to_lowercase()))
    }

    /// Header followed by data rows, the shape the normalizer consumes.
    pub fn to_raw_rows(&self) -> Vec<Vec<String>> {
        std::iter::once(self.columns.clone())
            .chain(self.rows.iter().cloned())
            .collect()
    }
}

/// Borrowed view over one table row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [String],
    cells: &'a [String],
}

impl<'a> Row<'a> {
    /// Cell under the named column, or [`EMPTY`].
    pub fn get(&self, column: &str) -> &'a str {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| self.cell(idx))
            .unwrap_or(EMPTY)
    }

    /// Cell at `index`, trimmed, or [`EMPTY`] when out of range.
    pub fn cell(&self, index: usize) -> &'a str {
        self.cells.get(index).map(|c| c.trim()).unwrap_or(EMPTY)
    }

    pub fn cells(&self) -> &'a [String] {
        self.cells
    }

    pub fn non_empty_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.trim().is_empty()).count()
    }

    /// `(column, cell)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        let cells = self.cells;
        self.columns
            .iter()
            .enumerate()
            .map(move |(i, c)| (c.as_str(), cells.get(i).map(|v| v.trim()).unwrap_or(EMPTY)))
    }
}
