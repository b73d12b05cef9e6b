//! Component Index Builder
//!
//! Reads a color BOM table into a [`ComponentIndex`]. Colorway columns are
//! the ones whose header looks like `010-Black`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

use bomfill_models::{numeric_tokens, ComponentEntry, ComponentIndex, MaterialCodeSource, Row, Table};

static COLORWAY_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)\s*-\s*(\S.*?)\s*$").expect("valid regex"));

const SAP_ROW_LABEL: &str = "sap material code";

/// `"010 - Black"` -> `"010-Black"`; `None` for headers that are not colorways.
pub fn canonical_colorway(header: &str) -> Option<String> {
    COLORWAY_HEADER
        .captures(header)
        .map(|caps| format!("{}-{}", &caps[1], &caps[2]))
}

fn first_material_code<'a, I>(cells: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    cells
        .into_iter()
        .find_map(|cell| numeric_tokens(cell, 3, 6).next())
}

/// Builds the component index of one color BOM table.
///
/// Material codes come from, in order: a `SAP Material Code` row directly
/// below the component, the first 3 to 6 digit token of the description,
/// the first such token of any colorway cell. A `SAP Material Code` row
/// ahead of every component holds the document's per-colorway SAP codes.
pub fn build_component_index(table: &Table) -> ComponentIndex {
    let mut index = ComponentIndex::default();
    if table.width() == 0 {
        return index;
    }

    let colorway_columns: Vec<(usize, String)> = table
        .columns()
        .iter()
        .enumerate()
        .filter_map(|(idx, header)| canonical_colorway(header).map(|key| (idx, key)))
        .collect();
    index.colorways = colorway_columns.iter().map(|(_, key)| key.clone()).collect();

    let component_idx = table.column_index("component").unwrap_or(0);
    let description_idx = table
        .column_index("details")
        .or_else(|| table.column_index("description"))
        .or_else(|| table.find_column(|c| c.contains("detail") || c.contains("description")));
    let usage_idx = table.column_index("usage");

    let colorway_cells = |row: &Row<'_>| -> Vec<(String, String)> {
        colorway_columns
            .iter()
            .map(|(idx, key)| (key.clone(), row.cell(*idx).to_string()))
            .filter(|(_, value)| !value.is_empty())
            .collect()
    };

    for row in table.rows() {
        let name = row.cell(component_idx);
        if name.is_empty() {
            continue;
        }

        if name.to_lowercase().contains(SAP_ROW_LABEL) {
            let cells = colorway_cells(&row);
            let side_code = first_material_code(cells.iter().map(|(_, v)| v.as_str()))
                .map(str::to_string);

            match (index.components.last_mut(), side_code) {
                (Some(component), Some(code)) => {
                    debug!(component = %component.name, code = %code, "SAP side row sets material code");
                    component.material_code = code;
                    component.material_code_source = MaterialCodeSource::SapRow;
                }
                (last, _) if last.is_none() || index.sap_codes.is_empty() => {
                    index.sap_codes = cells.into_iter().collect::<BTreeMap<_, _>>();
                }
                _ => {}
            }
            continue;
        }

        let mut entry = ComponentEntry::new(name);
        entry.description = description_idx.map(|idx| row.cell(idx)).unwrap_or("").to_string();
        entry.usage = usage_idx.map(|idx| row.cell(idx)).unwrap_or("").to_string();
        entry.usage_per_colorway = colorway_cells(&row).into_iter().collect();

        if let Some(code) = first_material_code(std::iter::once(entry.description.as_str())) {
            entry.material_code = code.to_string();
            entry.material_code_source = MaterialCodeSource::Description;
        } else if let Some(code) =
            first_material_code(entry.usage_per_colorway.values().map(String::as_str))
        {
            entry.material_code = code.to_string();
            entry.material_code_source = MaterialCodeSource::ColorwayCell;
        }

        index.components.push(entry);
    }

    debug!(
        components = index.len(),
        colorways = index.colorways.len(),
        "Built component index"
    );
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color_bom(rows: &[&[&str]]) -> Table {
        Table::new(
            ["Component", "Details", "Usage", "010-Black", "224 - Camel Brown"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_canonical_colorway() {
        assert_eq!(canonical_colorway("010-Black").as_deref(), Some("010-Black"));
        assert_eq!(canonical_colorway(" 224 - Camel Brown ").as_deref(), Some("224-Camel Brown"));
        assert_eq!(canonical_colorway("Details"), None);
        assert_eq!(canonical_colorway("010-"), None);
    }

    #[test]
    fn test_material_code_priority() {
        let table = color_bom(&[
            &["SAP Material Code", "", "", "2092641010", "2092641224"],
            &["Label 1", "Woven label (003287)", "Neck", "Black", "Camel"],
            &["SAP Material Code", "", "", "004411", ""],
            &["Label Logo 1", "Printed logo", "Back", "Logo 075660", ""],
            &["Packaging 3", "UPC sticker [980010]", "Polybag", "White", "White"],
            &["Shell 1", "Knit", "Body", "", ""],
        ]);

        let index = build_component_index(&table);
        assert_eq!(index.colorways, vec!["010-Black", "224-Camel Brown"]);
        assert_eq!(index.sap_codes.get("010-Black").map(String::as_str), Some("2092641010"));

        let label = index.get("Label 1").unwrap();
        assert_eq!(label.material_code, "004411");
        assert_eq!(label.material_code_source, MaterialCodeSource::SapRow);
        assert_eq!(label.colorway_value("224-Camel Brown"), "Camel");

        let logo = index.get("Label Logo 1").unwrap();
        assert_eq!(logo.material_code, "075660");
        assert_eq!(logo.material_code_source, MaterialCodeSource::ColorwayCell);

        let upc = index.get("Packaging 3").unwrap();
        assert_eq!(upc.material_code, "980010");
        assert_eq!(upc.material_code_source, MaterialCodeSource::Description);

        let shell = index.get("Shell 1").unwrap();
        assert_eq!(shell.material_code_source, MaterialCodeSource::None);
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn test_first_column_is_used_without_component_header() {
        let table = Table::new(
            vec!["Part".to_string(), "Details".to_string()],
            vec![vec!["Hangtag Package Part".to_string(), "Hangtag (097305)".to_string()]],
        );

        let index = build_component_index(&table);
        assert_eq!(index.get("Hangtag Package Part").unwrap().material_code, "097305");
        assert!(index.colorways.is_empty());
    }

    #[test]
    fn test_empty_table_builds_empty_index() {
        assert!(build_component_index(&Table::empty()).is_empty());
    }
}
