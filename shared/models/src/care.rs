//! Care and content codes per colorway.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One named part of a fiber composition, e.g. `Shell: 100% Polyester`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiberSection {
    pub label: String,
    pub composition: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareContentEntry {
    pub care_code: String,
    pub english_instructions: String,
    pub content_code: String,
    pub shell_composition: String,
    pub section_breakdown: Vec<FiberSection>,
}

impl CareContentEntry {
    /// Fills empty fields of `self` from `other`.
    pub fn merge_from(&mut self, other: &CareContentEntry) {
        fn fill(target: &mut String, source: &str) {
            if target.is_empty() && !source.is_empty() {
                *target = source.to_string();
            }
        }

        fill(&mut self.care_code, &other.care_code);
        fill(&mut self.english_instructions, &other.english_instructions);
        fill(&mut self.content_code, &other.content_code);
        fill(&mut self.shell_composition, &other.shell_composition);
        if self.section_breakdown.is_empty() {
            self.section_breakdown = other.section_breakdown.clone();
        }
    }
}

/// Entries keyed by colorway number, colorway name, and `NNN-Name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareContentIndex {
    pub entries: BTreeMap<String, CareContentEntry>,
}

impl CareContentIndex {
    pub fn upsert(&mut self, key: &str, entry: &CareContentEntry) {
        let key = key.trim();
        if key.is_empty() {
            return;
        }
        self.entries
            .entry(key.to_string())
            .and_modify(|existing| existing.merge_from(entry))
            .or_insert_with(|| entry.clone());
    }

    /// Combines two indexes; fields already present in `self` win.
    pub fn merge(mut self, other: CareContentIndex) -> Self {
        for (key, entry) in other.entries {
            self.upsert(&key, &entry);
        }
        self
    }

    /// Looks up a resolved colorway key such as `"010-Black"`.
    ///
    /// Care and content reports may key the same colorway differently, so
    /// the entries under the full key, its number prefix and its name
    /// (case-insensitive) are combined, in that order of precedence. A bare
    /// number also picks up `NNN-Name` entries for that number.
    pub fn lookup(&self, colorway: &str) -> Option<CareContentEntry> {
        let colorway = colorway.trim();
        let (number, name) = match colorway.split_once('-') {
            Some((number, name)) => (number.trim(), name.trim().to_lowercase()),
            None => (colorway, String::new()),
        };

        let mut hits: Vec<&CareContentEntry> = Vec::new();
        if let Some(entry) = self.entries.get(colorway) {
            hits.push(entry);
        }
        if !number.is_empty() && number != colorway {
            if let Some(entry) = self.entries.get(number) {
                hits.push(entry);
            }
        }
        if !name.is_empty() {
            hits.extend(
                self.entries
                    .iter()
                    .filter(|(key, _)| key.to_lowercase() == name)
                    .map(|(_, entry)| entry),
            );
        } else if !number.is_empty() {
            let prefix = format!("{}-", number);
            hits.extend(
                self.entries
                    .iter()
                    .filter(|(key, _)| key.starts_with(&prefix))
                    .map(|(_, entry)| entry),
            );
        }

        let (first, rest) = hits.split_first()?;
        let mut merged = (*first).clone();
        for entry in rest {
            merged.merge_from(entry);
        }
        Some(merged)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(care: &str, content: &str) -> CareContentEntry {
        CareContentEntry {
            care_code: care.to_string(),
            content_code: content.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_lookup_falls_back_to_number_then_name() {
        let mut index = CareContentIndex::default();
        index.upsert("010", &entry("3000", "R8T"));
        index.upsert("Everblue", &entry("3001", "R8U"));

        assert_eq!(index.lookup("010-Black").unwrap().content_code, "R8T");
        assert_eq!(index.lookup("429-everblue").unwrap().care_code, "3001");
        assert!(index.lookup("551-Lavender Pearl").is_none());
    }

    #[test]
    fn test_lookup_combines_differently_keyed_entries() {
        let mut care = CareContentIndex::default();
        for key in ["010", "Black", "010-Black"] {
            care.upsert(key, &entry("3000", ""));
        }
        let mut content = CareContentIndex::default();
        content.upsert("010", &entry("", "R8T"));
        let merged = care.merge(content);

        let found = merged.lookup("010-Black").unwrap();
        assert_eq!(found.care_code, "3000");
        assert_eq!(found.content_code, "R8T");

        let mut by_name = CareContentIndex::default();
        by_name.upsert("010-Black", &entry("3000", ""));
        by_name.upsert("black", &entry("", "R8T"));
        assert_eq!(by_name.lookup("010").unwrap().care_code, "3000");
        assert_eq!(by_name.lookup("010-Black").unwrap().content_code, "R8T");
    }

    #[test]
    fn test_merge_keeps_existing_fields() {
        let care = {
            let mut index = CareContentIndex::default();
            index.upsert("010", &entry("3000", ""));
            index
        };
        let content = {
            let mut index = CareContentIndex::default();
            index.upsert("010", &entry("9999", "R8T"));
            index
        };

        let merged = care.merge(content);
        let found = merged.lookup("010").unwrap();
        assert_eq!(found.care_code, "3000");
        assert_eq!(found.content_code, "R8T");
    }
}
