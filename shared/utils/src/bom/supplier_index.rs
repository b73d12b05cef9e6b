//! Supplier Index Builder
//!
//! Builds the material-code to supplier map from a costing detail table.

use tracing::debug;

use bomfill_models::{numeric_tokens, SupplierEntry, SupplierIndex, Table, EMPTY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fragment {
    Upper,
    Lower,
}

/// Alphabetic tokens of at most two characters, by case.
fn fragment_kind(token: &str) -> Option<Fragment> {
    let len = token.chars().count();
    if len == 0 || len > 2 || !token.chars().all(char::is_alphabetic) {
        return None;
    }
    if token.chars().all(char::is_uppercase) {
        Some(Fragment::Upper)
    } else if token.chars().all(char::is_lowercase) {
        Some(Fragment::Lower)
    } else {
        None
    }
}

/// Rejoins supplier names split by glyph extraction, e.g. `"Y K K"` -> `"YKK"`.
///
/// Only runs of two or more same-case fragments that include a single
/// letter are merged, so names like `"SML Group"` or `"AB CD"` are kept.
pub fn clean_supplier_name(name: &str) -> String {
    let tokens: Vec<&str> = name.split_whitespace().collect();
    let mut words: Vec<String> = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        let mut j = i + 1;
        if let Some(kind) = fragment_kind(tokens[i]) {
            while j < tokens.len() && fragment_kind(tokens[j]) == Some(kind) {
                j += 1;
            }
        }

        let run = &tokens[i..j];
        if run.len() >= 2 && run.iter().any(|t| t.chars().count() == 1) {
            words.push(run.concat());
        } else {
            words.extend(run.iter().map(|t| t.to_string()));
        }
        i = j;
    }

    words.join(" ")
}

/// Builds a [`SupplierIndex`] from a costing detail table.
///
/// Every 3 to 7 digit token in the material cell becomes a code for the
/// row's supplier; rows with an empty material cell contribute the tokens
/// of their other cells instead. Each row is also retained for the
/// index's full-scan fallback.
pub fn build_supplier_index(table: &Table) -> SupplierIndex {
    let mut index = SupplierIndex::new();

    let supplier_idx = match table
        .column_index("supplier")
        .or_else(|| table.find_column(|c| c.contains("supplier") || c.contains("vendor")))
    {
        Some(idx) => idx,
        None => {
            debug!("Costing table has no supplier column");
            return index;
        }
    };
    let material_idx = table
        .column_index("material")
        .or_else(|| table.find_column(|c| c.contains("material")));
    let country_idx = table.find_column(|c| c.contains("country"));

    for row in table.rows() {
        let supplier = clean_supplier_name(row.cell(supplier_idx));
        if supplier.is_empty() {
            continue;
        }

        let mut entry = SupplierEntry::new(supplier);
        if let Some(idx) = country_idx {
            entry.country_of_origin = row.cell(idx).to_string();
        }

        let material = material_idx.map(|idx| row.cell(idx)).unwrap_or(EMPTY);
        let codes: Vec<&str> = if !material.is_empty() {
            numeric_tokens(material, 3, 7).collect()
        } else {
            row.cells()
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != supplier_idx)
                .flat_map(|(_, cell)| numeric_tokens(cell.as_str(), 3, 7))
                .collect()
        };

        for code in codes {
            index.register(code, entry.clone());
        }
        index.retain_row(row.cells().to_vec(), entry);
    }

    debug!(codes = index.len(), "Built supplier index");
    index
}
