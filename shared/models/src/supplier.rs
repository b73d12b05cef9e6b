//! Material-code to supplier lookup built from the costing detail section.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// Supplier details registered under one or more material codes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierEntry {
    pub name: String,
    pub country_of_origin: String,
}

impl SupplierEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            country_of_origin: String::new(),
        }
    }
}

/// A costing row kept verbatim for the full-scan fallback.
#[derive(Debug, Clone)]
struct ScanRow {
    cells: Vec<String>,
    entry: SupplierEntry,
}

/// `material code -> supplier`, where `"003287"` and `"3287"` are the same key.
///
/// Codes missing from the direct map are resolved by scanning the retained
/// costing rows. Scan outcomes, misses included, are cached behind a mutex so
/// concurrent readers never repeat or race a scan.
#[derive(Debug, Default)]
pub struct SupplierIndex {
    entries: HashMap<String, SupplierEntry>,
    scan_rows: Vec<ScanRow>,
    scan_cache: Mutex<HashMap<String, Option<SupplierEntry>>>,
}

/// `"003287"` -> `"3287"`; an all-zero code keeps a single `"0"`.
pub fn strip_leading_zeros(code: &str) -> &str {
    let code = code.trim();
    let stripped = code.trim_start_matches('0');
    if stripped.is_empty() && !code.is_empty() {
        &code[code.len() - 1..]
    } else {
        stripped
    }
}

/// Runs of ASCII digits whose length lies in `min..=max`.
pub fn numeric_tokens(text: &str, min: usize, max: usize) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(move |token| (min..=max).contains(&token.len()))
}

impl SupplierIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `entry` under `code` and its zero-stripped variant.
    ///
    /// On collision the longer supplier name wins; equal lengths keep the
    /// first registration.
    pub fn register(&mut self, code: &str, entry: SupplierEntry) {
        let code = code.trim();
        if code.is_empty() || entry.name.trim().is_empty() {
            return;
        }

        let stripped = strip_leading_zeros(code);
        let keys: Vec<&str> = if stripped != code {
            vec![code, stripped]
        } else {
            vec![code]
        };

        for key in keys {
            match self.entries.get(key) {
                Some(existing) if existing.name.chars().count() >= entry.name.chars().count() => {}
                _ => {
                    self.entries.insert(key.to_string(), entry.clone());
                }
            }
        }
    }

    /// Keeps a costing row for codes that never made it into the direct map.
    pub fn retain_row(&mut self, cells: Vec<String>, entry: SupplierEntry) {
        if entry.name.trim().is_empty() {
            return;
        }
        self.scan_rows.push(ScanRow { cells, entry });
    }

    /// Direct lookup: exact key, then zero-stripped key.
    pub fn get(&self, code: &str) -> Option<&SupplierEntry> {
        let code = code.trim();
        if code.is_empty() {
            return None;
        }
        self.entries
            .get(code)
            .or_else(|| self.entries.get(strip_leading_zeros(code)))
    }

    pub fn supplier(&self, code: &str) -> Option<&str> {
        self.get(code).map(|entry| entry.name.as_str())
    }

    /// Direct lookup with a cached full-scan fallback over retained rows.
    pub fn resolve(&self, code: &str) -> Option<SupplierEntry> {
        if let Some(entry) = self.get(code) {
            return Some(entry.clone());
        }

        let wanted = strip_leading_zeros(code);
        if wanted.is_empty() {
            return None;
        }

        {
            let cache = self.scan_cache.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(hit) = cache.get(wanted) {
                return hit.clone();
            }
        }

        let found = self.scan(wanted);
        let mut cache = self.scan_cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.insert(wanted.to_string(), found.clone());
        found
    }

    fn scan(&self, wanted: &str) -> Option<SupplierEntry> {
        let mut best: Option<&SupplierEntry> = None;
        for row in &self.scan_rows {
            let hit = row.cells.iter().any(|cell| {
                numeric_tokens(cell, 3, 7).any(|token| strip_leading_zeros(token) == wanted)
            });
            if !hit {
                continue;
            }
            match best {
                Some(current) if current.name.chars().count() >= row.entry.name.chars().count() => {}
                _ => best = Some(&row.entry),
            }
        }
        best.cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered codes, stripped variants included, in sorted order.
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_stripped_codes_are_equivalent() {
        let mut index = SupplierIndex::new();
        index.register("003287", SupplierEntry::new("Acme"));

        assert_eq!(index.supplier("003287"), Some("Acme"));
        assert_eq!(index.supplier("3287"), Some("Acme"));
    }

    #[test]
    fn test_padded_lookup_finds_unpadded_registration() {
        let mut index = SupplierIndex::new();
        index.register("3287", SupplierEntry::new("Acme"));
        assert_eq!(index.supplier("003287"), Some("Acme"));
    }

    #[test]
    fn test_collision_keeps_longer_name() {
        let mut index = SupplierIndex::new();
        index.register("097305", SupplierEntry::new("Avery"));
        index.register("097305", SupplierEntry::new("Avery Dennison RIS"));
        index.register("097305", SupplierEntry::new("Short"));

        assert_eq!(index.supplier("97305"), Some("Avery Dennison RIS"));
    }

    #[test]
    fn test_full_scan_fallback_is_cached() {
        let mut index = SupplierIndex::new();
        index.retain_row(
            vec!["Hangtag".to_string(), "Tag [0121612] RFID".to_string()],
            SupplierEntry::new("Checkpoint"),
        );

        assert!(index.get("121612").is_none());
        assert_eq!(index.resolve("121612").map(|e| e.name), Some("Checkpoint".to_string()));
        assert_eq!(index.resolve("0121612").map(|e| e.name), Some("Checkpoint".to_string()));
        assert!(index.resolve("999999").is_none());

        let cache = index.scan_cache.lock().unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_strip_leading_zeros() {
        assert_eq!(strip_leading_zeros("003287"), "3287");
        assert_eq!(strip_leading_zeros("000"), "0");
        assert_eq!(strip_leading_zeros(""), "");
    }

    #[test]
    fn test_numeric_tokens_respects_bounds() {
        let tokens: Vec<&str> = numeric_tokens("(075660) 12 2092641010 980010", 3, 6).collect();
        assert_eq!(tokens, vec!["075660", "980010"]);
    }
}
