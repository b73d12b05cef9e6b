use serde::{Deserialize, Serialize};

/// Which comparison-file columns carry the style and colorway identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub style_column: String,
    pub color_column: String,
    /// 1.0 for caller-supplied mappings; keyword score otherwise.
    pub confidence: f64,
    pub auto_detected: bool,
}

/// Keyword scores for the buyer style column; exact names beat substrings.
const STYLE_EXACT: &[(&str, f64)] = &[
    ("buyer style number", 1.0),
    ("buyer style", 1.0),
    ("buyer style no", 1.0),
    ("style number", 0.9),
    ("style no", 0.9),
    ("style #", 0.9),
    ("style", 0.8),
    ("sku", 0.7),
    ("article", 0.6),
    ("model", 0.5),
];
const STYLE_CONTAINS: &[(&str, f64)] = &[("style", 0.6), ("sku", 0.5), ("article", 0.5)];

const COLOR_EXACT: &[(&str, f64)] = &[
    ("color/option", 1.0),
    ("color option", 1.0),
    ("colorway", 0.9),
    ("color", 0.8),
    ("colour", 0.8),
    ("option", 0.7),
    ("variant", 0.6),
];
const COLOR_CONTAINS: &[(&str, f64)] = &[
    ("colorway", 0.8),
    ("color", 0.7),
    ("colour", 0.7),
    ("option", 0.6),
    ("variant", 0.5),
];

fn keyword_score(header: &str, exact: &[(&str, f64)], contains: &[(&str, f64)]) -> f64 {
    let header = header.trim().to_lowercase();
    if let Some((_, score)) = exact.iter().find(|(k, _)| *k == header) {
        return *score;
    }
    contains
        .iter()
        .filter(|(k, _)| header.contains(k))
        .map(|(_, score)| *score)
        .fold(0.0, f64::max)
}

/// Highest-scoring header, skipping `exclude`; the first one wins ties.
fn best_column(
    headers: &[String],
    exclude: Option<usize>,
    score: impl Fn(&str) -> f64,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, header) in headers.iter().enumerate() {
        if Some(idx) == exclude {
            continue;
        }
        let value = score(header);
        if value > 0.0 && best.map_or(true, |(_, top)| value > top) {
            best = Some((idx, value));
        }
    }
    best
}

impl ColumnMapping {
    pub fn explicit(style_column: impl Into<String>, color_column: impl Into<String>) -> Self {
        Self {
            style_column: style_column.into(),
            color_column: color_column.into(),
            confidence: 1.0,
            auto_detected: false,
        }
    }

    /// Picks the style and colorway columns by keyword. Colorway candidates
    /// mentioning "description" are ignored. Confidence is the mean of the
    /// two column scores.
    pub fn auto_detect(headers: &[String]) -> Option<Self> {
        let style = best_column(headers, None, |h| keyword_score(h, STYLE_EXACT, STYLE_CONTAINS))?;
        let color = best_column(headers, Some(style.0), |h| {
            if h.to_lowercase().contains("description") {
                0.0
            } else {
                keyword_score(h, COLOR_EXACT, COLOR_CONTAINS)
            }
        })?;

        Some(Self {
            style_column: headers[style.0].clone(),
            color_column: headers[color.0].clone(),
            confidence: (style.1 + color.1) / 2.0,
            auto_detected: true,
        })
    }
}

/// Comparison spreadsheet after header location, before column mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Zero-based index of the header row in the source grid.
    pub header_row: usize,
}

impl ComparisonTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One comparison row with its identifiers pulled out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonRow {
    /// Position of the row in the comparison table, used to restore order.
    pub index: usize,
    pub buyer_style: String,
    pub color_option: String,
    /// Every source column in original order, identifiers included.
    pub passthrough: Vec<(String, String)>,
}

impl ComparisonRow {
    pub fn new(index: usize, buyer_style: impl Into<String>, color_option: impl Into<String>) -> Self {
        Self {
            index,
            buyer_style: buyer_style.into(),
            color_option: color_option.into(),
            passthrough: Vec::new(),
        }
    }

    pub fn value(&self, column: &str) -> Option<&str> {
        self.passthrough
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_auto_detect_prefers_exact_names() {
        let mapping = ColumnMapping::auto_detect(&headers(&[
            "Season",
            "Style Description",
            "Buyer Style Number",
            "Color Description",
            "Color/Option",
        ]))
        .unwrap();

        assert_eq!(mapping.style_column, "Buyer Style Number");
        assert_eq!(mapping.color_column, "Color/Option");
        assert!(mapping.auto_detected);
        assert!((mapping.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_auto_detect_substrings() {
        let mapping = ColumnMapping::auto_detect(&headers(&["SKU", "Colour Code", "Qty"])).unwrap();
        assert_eq!(mapping.style_column, "SKU");
        assert_eq!(mapping.color_column, "Colour Code");
        assert!(mapping.confidence < 0.8);
    }

    #[test]
    fn test_auto_detect_needs_both_roles() {
        assert!(ColumnMapping::auto_detect(&headers(&["Style", "Qty"])).is_none());
        assert!(ColumnMapping::auto_detect(&headers(&["Color Description", "Style"])).is_none());
    }
}
