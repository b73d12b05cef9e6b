//! Care/Content Index Builder
//!
//! Care and content reports print one code block per colorway group, e.g.
//! `CONTENT CODE: R8T Shell: 100% Acrylic, Lining: 100% Polyester`, either
//! as a column header or inside a cell, followed by rows naming colorways.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use bomfill_models::{numeric_tokens, CareContentEntry, CareContentIndex, FiberSection, Table};

use super::component_index::canonical_colorway;
use crate::config::MatchingConfig;

static CONTENT_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i:\bcontent\s+code)\s*[:#]?\s*([A-Z0-9][A-Z0-9-]*)\b").expect("valid regex")
});

static CARE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i:\bcare\s+code)\s*[:#]?\s*([A-Z0-9][A-Z0-9-]*)\b").expect("valid regex")
});

static LEADING_COLORWAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{3}\b").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Care,
    Content,
}

/// A code plus the text that follows it up to the next block.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CodeBlock {
    kind: BlockKind,
    code: String,
    text: String,
}

fn parse_code_blocks(text: &str) -> Vec<CodeBlock> {
    let mut found: Vec<(usize, usize, BlockKind, String)> = Vec::new();

    for (regex, kind) in [(&*CONTENT_BLOCK, BlockKind::Content), (&*CARE_BLOCK, BlockKind::Care)] {
        for caps in regex.captures_iter(text) {
            let (whole, code) = match (caps.get(0), caps.get(1)) {
                (Some(whole), Some(code)) => (whole, code),
                _ => continue,
            };
            // "CONTENT CODE: Shell: ..." has no code, only a fiber label.
            if text[whole.end()..].trim_start().starts_with(':') {
                continue;
            }
            found.push((whole.start(), whole.end(), kind, code.as_str().to_string()));
        }
    }
    found.sort_by_key(|(start, ..)| *start);

    let mut blocks = Vec::with_capacity(found.len());
    for (i, (_, end, kind, code)) in found.iter().enumerate() {
        let stop = found.get(i + 1).map(|(start, ..)| *start).unwrap_or(text.len());
        let body = if *end <= stop { &text[*end..stop] } else { "" };
        blocks.push(CodeBlock {
            kind: *kind,
            code: code.clone(),
            text: body.trim_matches(|c: char| c.is_whitespace() || ",;-".contains(c)).to_string(),
        });
    }
    blocks
}

/// Builds care/content indexes; one builder serves both report kinds.
#[derive(Debug, Clone)]
pub struct CareContentBuilder {
    fiber_labels: Vec<String>,
    fiber_pattern: Option<Regex>,
}

impl CareContentBuilder {
    pub fn new(fiber_sections: &[String]) -> Self {
        let mut labels: Vec<String> = fiber_sections
            .iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        // Longest first so "Sleeve Lining" wins over "Lining".
        labels.sort_by(|a, b| b.len().cmp(&a.len()));

        let fiber_pattern = if labels.is_empty() {
            None
        } else {
            let alternatives: Vec<String> = labels
                .iter()
                .map(|l| regex::escape(l).replace("\\ ", r"\s+").replace(' ', r"\s+"))
                .collect();
            Regex::new(&format!(r"(?i)\b({})(?:\s*:\s*|\s+(\d))", alternatives.join("|"))).ok()
        };

        Self {
            fiber_labels: labels,
            fiber_pattern,
        }
    }

    pub fn from_config(config: &MatchingConfig) -> Self {
        Self::new(&config.fiber_sections)
    }

    /// Splits `"Shell: 100% Acrylic, Lining: 100% Polyester"` on the known
    /// section labels. Text without any label yields no sections.
    pub fn split_fiber_sections(&self, text: &str) -> Vec<FiberSection> {
        let pattern = match &self.fiber_pattern {
            Some(pattern) => pattern,
            None => return Vec::new(),
        };

        let marks: Vec<(usize, usize, String)> = pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let label = caps.get(1)?.as_str();
                let body_start = caps.get(2).map(|d| d.start()).unwrap_or(whole.end());
                Some((whole.start(), body_start, self.canonical_label(label)))
            })
            .collect();

        marks
            .iter()
            .enumerate()
            .map(|(i, (_, body_start, label))| {
                let stop = marks.get(i + 1).map(|(start, ..)| *start).unwrap_or(text.len());
                let body = if *body_start <= stop { &text[*body_start..stop] } else { "" };
                FiberSection {
                    label: label.clone(),
                    composition: body
                        .trim_matches(|c: char| c.is_whitespace() || ",;".contains(c))
                        .to_string(),
                }
            })
            .collect()
    }

    fn canonical_label(&self, matched: &str) -> String {
        let matched = matched.split_whitespace().collect::<Vec<_>>().join(" ");
        self.fiber_labels
            .iter()
            .find(|l| l.eq_ignore_ascii_case(&matched))
            .cloned()
            .unwrap_or(matched)
    }

    /// The `Shell` section, else the first section, else the whole text.
    pub fn shell_composition(sections: &[FiberSection], text: &str) -> String {
        sections
            .iter()
            .find(|s| s.label.eq_ignore_ascii_case("shell"))
            .or_else(|| sections.first())
            .map(|s| s.composition.clone())
            .unwrap_or_else(|| text.trim().to_string())
    }

    fn set_composition(&self, entry: &mut CareContentEntry, text: &str) {
        entry.section_breakdown = self.split_fiber_sections(text);
        entry.shell_composition = Self::shell_composition(&entry.section_breakdown, text);
    }

    fn apply_block(&self, current: &mut CareContentEntry, block: &CodeBlock) {
        match block.kind {
            BlockKind::Content => {
                current.content_code = block.code.clone();
                self.set_composition(current, &block.text);
            }
            BlockKind::Care => {
                current.care_code = block.code.clone();
                current.english_instructions = block.text.clone();
            }
        }
    }

    /// Builds the index of one care or content table.
    ///
    /// `current` holds the most recent code block. It is seeded from the
    /// column headers, replaced whenever a cell carries a new block, and
    /// copied onto every colorway row that follows. Explicit code,
    /// instruction and composition columns on a row override it for that
    /// row only.
    pub fn build(&self, table: &Table) -> CareContentIndex {
        let mut index = CareContentIndex::default();
        if table.width() == 0 {
            return index;
        }

        let number_idx = ["color way number", "colorway number", "colorway no", "color way no"]
            .iter()
            .find_map(|name| table.column_index(name));
        let name_idx = ["color way name", "colorway name"]
            .iter()
            .find_map(|name| table.column_index(name));
        let care_code_idx = table.column_index("care code");
        let content_code_idx = table.column_index("content code");
        let code_idx = table.column_index("code");
        let instructions_idx = table
            .find_column(|c| c.contains("english") && c.contains("instruction"))
            .or_else(|| table.find_column(|c| c.contains("instruction")));
        let composition_idx = table.find_column(|c| c.contains("composition"));
        let generic_is_care = instructions_idx.is_some();

        let reserved: Vec<usize> = [care_code_idx, content_code_idx, code_idx, instructions_idx, composition_idx]
            .iter()
            .flatten()
            .copied()
            .collect();

        let mut current = CareContentEntry::default();
        for header in table.columns() {
            for block in parse_code_blocks(header) {
                self.apply_block(&mut current, &block);
            }
        }

        for row in table.rows() {
            for cell in row.cells() {
                for block in parse_code_blocks(cell) {
                    debug!(code = %block.code, "Code block becomes current");
                    self.apply_block(&mut current, &block);
                }
            }

            let mut entry = current.clone();
            let explicit = |idx: Option<usize>| idx.map(|i| row.cell(i)).filter(|v| !v.is_empty());
            if let Some(code) = explicit(care_code_idx) {
                entry.care_code = code.to_string();
            }
            if let Some(code) = explicit(content_code_idx) {
                entry.content_code = code.to_string();
            }
            if let Some(code) = explicit(code_idx) {
                if generic_is_care {
                    entry.care_code = code.to_string();
                } else {
                    entry.content_code = code.to_string();
                }
            }
            if let Some(text) = explicit(instructions_idx) {
                entry.english_instructions = text.to_string();
            }
            if let Some(text) = explicit(composition_idx) {
                self.set_composition(&mut entry, text);
            }

            let (number_cell, name_cell) = match (number_idx, name_idx) {
                (None, None) => {
                    let cell = row
                        .cells()
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| !reserved.contains(i))
                        .map(|(_, c)| c.trim())
                        .find(|c| canonical_colorway(c).is_some() || LEADING_COLORWAY.is_match(c))
                        .unwrap_or("");
                    (cell, "")
                }
                (number, name) => (
                    number.map(|i| row.cell(i)).unwrap_or(""),
                    name.map(|i| row.cell(i)).unwrap_or(""),
                ),
            };

            let keys = colorway_keys(number_cell, name_cell);
            if keys.is_empty() || entry == CareContentEntry::default() {
                continue;
            }
            for key in &keys {
                index.upsert(key, &entry);
            }
        }

        debug!(keys = index.len(), "Built care/content index");
        index
    }
}

/// Index keys for one row: each colorway number, the name, and `NNN-Name`
/// when the row names exactly one number.
fn colorway_keys(number_cell: &str, name_cell: &str) -> Vec<String> {
    let mut name = name_cell.trim().to_string();
    let numbers: Vec<String> = match canonical_colorway(number_cell) {
        Some(key) => {
            let (number, cell_name) = key.split_once('-').unwrap_or((key.as_str(), ""));
            if name.is_empty() {
                name = cell_name.to_string();
            }
            vec![number.to_string()]
        }
        None => numeric_tokens(number_cell, 1, 6).map(str::to_string).collect(),
    };

    let mut keys = numbers.clone();
    if !name.is_empty() {
        keys.push(name.clone());
        if numbers.len() == 1 {
            keys.push(format!("{}-{}", numbers[0], name));
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> CareContentBuilder {
        CareContentBuilder::from_config(&MatchingConfig::default())
    }

    fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_parse_code_blocks() {
        let blocks = parse_code_blocks("CONTENT CODE: R8T Shell: 100% Acrylic CARE CODE 3000 Hand Wash Cold");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].code, "R8T");
        assert_eq!(blocks[0].text, "Shell: 100% Acrylic");
        assert_eq!(blocks[1].kind, BlockKind::Care);
        assert_eq!(blocks[1].text, "Hand Wash Cold");

        assert!(parse_code_blocks("Content Code").is_empty());
        assert!(parse_code_blocks("CONTENT CODE: SHELL: 100% Acrylic").is_empty());
    }

    #[test]
    fn test_split_fiber_sections() {
        let builder = builder();
        let sections = builder.split_fiber_sections("Shell: 100% Acrylic, Faux Fur: 100% Polyester");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].label, "Faux Fur");
        assert_eq!(sections[1].composition, "100% Polyester");

        let sections = builder.split_fiber_sections("SLEEVE LINING 100% Nylon Shell 80% Wool");
        assert_eq!(sections[0].label, "Sleeve Lining");
        assert_eq!(sections[0].composition, "100% Nylon");
        assert_eq!(CareContentBuilder::shell_composition(&sections, ""), "80% Wool");

        assert!(builder.split_fiber_sections("100% Acrylic").is_empty());
        assert_eq!(CareContentBuilder::shell_composition(&[], " 100% Acrylic "), "100% Acrylic");
    }

    #[test]
    fn test_code_block_carries_forward() {
        let content = table(
            &["CONTENT CODE: R8T Shell: 100% Acrylic, Lining: 100% Polyester", "Color Way Number", "Color Way Name"],
            &[
                &["", "010", "Black"],
                &["", "224", "Camel Brown"],
                &["CONTENT CODE: R8U Shell: 95% Acrylic 5% Spandex", "", ""],
                &["", "278", "Dark Stone"],
            ],
        );

        let index = builder().build(&content);
        let black = index.lookup("010-Black").unwrap();
        assert_eq!(black.content_code, "R8T");
        assert_eq!(black.shell_composition, "100% Acrylic");
        assert_eq!(black.section_breakdown.len(), 2);
        assert_eq!(index.lookup("224-Camel Brown").unwrap().content_code, "R8T");
        assert_eq!(index.lookup("278").unwrap().content_code, "R8U");
        assert!(index.entries.contains_key("278-Dark Stone"));
    }

    #[test]
    fn test_explicit_columns_and_multi_number_cells() {
        let care = table(
            &["Colorway Number", "Care Code", "English Instructions"],
            &[
                &["010/224", "3000", "Hand Wash Cold, Do Not Bleach"],
                &["551", "", "Dry Flat"],
            ],
        );

        let index = builder().build(&care);
        assert_eq!(index.lookup("224-Camel Brown").unwrap().care_code, "3000");
        assert_eq!(index.lookup("010").unwrap().english_instructions, "Hand Wash Cold, Do Not Bleach");
        assert_eq!(index.lookup("551").unwrap().care_code, "");
        assert!(index.lookup("429").is_none());
    }

    #[test]
    fn test_colorway_cells_found_without_colorway_columns() {
        let care = table(
            &["CARE CODE: 3000 Hand Wash Cold", "col_1"],
            &[&["010-Black", ""], &["224 Camel Brown", ""]],
        );

        let index = builder().build(&care);
        assert_eq!(index.lookup("010-Black").unwrap().care_code, "3000");
        assert_eq!(index.lookup("224").unwrap().english_instructions, "Hand Wash Cold");
    }
}
