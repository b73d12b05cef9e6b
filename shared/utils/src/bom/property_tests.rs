//! Property-based tests for the BOM pipeline
//!
//! Normalizing twice changes nothing, the colorway guard rejects null-like
//! input whatever the candidates are, and row results never depend on the
//! order rows are validated in.

use proptest::prelude::*;

use bomfill_models::{ComparisonRow, ParsedDocument};

use super::matcher::ColorwayMatcher;
use super::normalizer::TableNormalizer;
use super::pdf_source::MemoryDocument;
use super::segmenter::parse_document;
use super::validator::{BomIndexes, RowValidator};
use crate::config::{AppConfig, ExtractionConfig, MatchingConfig};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn sample_document() -> ParsedDocument {
    let source = MemoryDocument::new()
        .with_page(
            "Color BOM\nStyle: CL2880",
            vec![vec![
                strings(&["Component", "Details", "010-Black", "464-Collegiate Navy"]),
                strings(&["Label 1", "Woven label (003287)", "Black", "Navy"]),
                strings(&["Care Label", "Printed care (004411)", "White", "White"]),
            ]],
        )
        .with_page(
            "Costing BOM Detail",
            vec![vec![
                strings(&["Material", "Supplier", "Country of Origin"]),
                strings(&["003287 Woven label", "Avery Dennison", "China"]),
            ]],
        );
    parse_document(&source, &ExtractionConfig::default()).expect("sample document parses")
}

prop_compose! {
    fn arb_grid()(
        rows in prop::collection::vec(
            prop::collection::vec("[a-z ]{0,5}", 1..6),
            1..10
        )
    ) -> Vec<Vec<String>> {
        rows
    }
}

prop_compose! {
    fn arb_color_option()(
        choice in 0..6usize,
        noise in "[A-Za-z0-9 ]{0,12}"
    ) -> String {
        match choice {
            0 => "010".to_string(),
            1 => "COL-464 COLLEGIATE NAVY".to_string(),
            2 => "black".to_string(),
            3 => "N/A".to_string(),
            4 => String::new(),
            _ => noise,
        }
    }
}

proptest! {
    /// Property: a normalized table survives a second normalization as is.
    #[test]
    fn prop_normalize_is_idempotent(rows in arb_grid()) {
        let normalizer = TableNormalizer::default();
        let once = normalizer.normalize(&rows);
        let twice = normalizer.normalize(&once.to_raw_rows());

        prop_assert_eq!(once.columns(), twice.columns());
        prop_assert_eq!(once.to_raw_rows(), twice.to_raw_rows());
    }

    /// Property: empty, one-character and sentinel inputs never resolve.
    #[test]
    fn prop_guard_rejects_null_like_input(
        raw in prop_oneof![
            Just(String::new()),
            "[A-Za-z0-9]",
            Just("N/A".to_string()),
            Just("nan".to_string()),
            Just("None".to_string()),
            Just("null".to_string()),
        ],
        padding in " {0,3}"
    ) {
        let matcher = ColorwayMatcher::new(&MatchingConfig::default());
        let candidates = strings(&["010-Black", "N/A", "nan", "a"]);
        let input = format!("{}{}{}", padding, raw, padding);

        prop_assert!(matcher.match_colorway(&input, &candidates).is_none());
    }

    /// Property: the numeric prefix ignores alias prefixes and zero padding.
    #[test]
    fn prop_numeric_prefix_strips_zeros(
        prefix in prop_oneof![Just(""), Just("COL-"), Just("col "), Just("CW#")],
        zeros in 0..3usize,
        number in "[1-9][0-9]{0,3}",
        name in "( [A-Za-z]{3,8})?"
    ) {
        let matcher = ColorwayMatcher::new(&MatchingConfig::default());
        let raw = format!("{}{}{}{}", prefix, "0".repeat(zeros), number, name);

        prop_assert_eq!(matcher.numeric_prefix(&raw), Some(number));
    }

    /// Property: each resolved row depends on its own input only.
    #[test]
    fn prop_row_order_is_irrelevant(
        options in prop::collection::vec(arb_color_option(), 1..8),
        seed in any::<u64>()
    ) {
        let document = sample_document();
        let config = AppConfig::default();
        let indexes = BomIndexes::build(&document, &config.matching);
        let validator = RowValidator::new(&config);

        let rows: Vec<ComparisonRow> = options
            .iter()
            .enumerate()
            .map(|(i, option)| ComparisonRow::new(i, "CL2880", option.as_str()))
            .collect();

        let mut shuffled = rows.clone();
        let len = shuffled.len();
        shuffled.rotate_left((seed as usize) % len);
        shuffled.reverse();

        let mut forward = validator.validate_rows(&rows, &indexes);
        let mut backward = validator.validate_rows_parallel(&shuffled, &indexes);
        forward.sort_by_key(|r| r.row.index);
        backward.sort_by_key(|r| r.row.index);

        prop_assert_eq!(forward, backward);
    }
}
