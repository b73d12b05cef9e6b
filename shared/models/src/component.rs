//! Component lookup built from a color BOM section.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where a component's material code was recovered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialCodeSource {
    /// "SAP Material Code" side-table row directly below the component.
    SapRow,
    /// First numeric token in the free-text description.
    Description,
    /// First numeric token in one of the component's colorway cells.
    ColorwayCell,
    None,
}

/// One trim, label or packaging part of a color BOM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentEntry {
    pub name: String,
    pub material_code: String,
    pub material_code_source: MaterialCodeSource,
    pub description: String,
    pub usage: String,
    /// Colorway key (e.g. `"010-Black"`) to the cell printed for that colorway.
    pub usage_per_colorway: BTreeMap<String, String>,
}

impl ComponentEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            material_code: String::new(),
            material_code_source: MaterialCodeSource::None,
            description: String::new(),
            usage: String::new(),
            usage_per_colorway: BTreeMap::new(),
        }
    }

    /// Value printed for `colorway`, empty when the colorway has no cell.
    pub fn colorway_value(&self, colorway: &str) -> &str {
        self.usage_per_colorway
            .get(colorway)
            .map(|v| v.as_str())
            .unwrap_or("")
    }

    /// `"<name> - <material code>"` token used by label pickers.
    pub fn selection_token(&self) -> String {
        if self.material_code.is_empty() {
            self.name.clone()
        } else {
            format!("{} - {}", self.name, self.material_code)
        }
    }
}

/// Components of one document in BOM order, plus the colorways it declares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentIndex {
    pub components: Vec<ComponentEntry>,
    /// Colorway keys in column order.
    pub colorways: Vec<String>,
    /// Document-level SAP codes per colorway.
    pub sap_codes: BTreeMap<String, String>,
}

impl ComponentIndex {
    /// Exact name match first, then case-insensitive.
    pub fn get(&self, name: &str) -> Option<&ComponentEntry> {
        let name = name.trim();
        self.components
            .iter()
            .find(|c| c.name == name)
            .or_else(|| {
                let lower = name.to_lowercase();
                self.components.iter().find(|c| c.name.to_lowercase() == lower)
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(|c| c.name.as_str())
    }

    pub fn selection_tokens(&self) -> Vec<String> {
        self.components.iter().map(|c| c.selection_token()).collect()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
