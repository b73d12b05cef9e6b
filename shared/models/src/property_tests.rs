//! Property-based tests for the BOM fill domain models
//!
//! Covers the invariants callers rely on: tables are always rectangular
//! with no blank rows, and supplier codes resolve the same with or without
//! leading zeros.

use proptest::prelude::*;

use crate::{strip_leading_zeros, SupplierEntry, SupplierIndex, Table};

prop_compose! {
    fn arb_material_code()(
        zeros in 0..3usize,
        body in "[1-9][0-9]{2,4}"
    ) -> String {
        format!("{}{}", "0".repeat(zeros), body)
    }
}

prop_compose! {
    fn arb_ragged_rows()(
        rows in prop::collection::vec(
            prop::collection::vec("[a-z0-9 ]{0,6}", 0..8),
            0..12
        )
    ) -> Vec<Vec<String>> {
        rows
    }
}

proptest! {
    /// Property: every row of a constructed table matches the header width
    /// and no row is entirely blank.
    #[test]
    fn prop_table_is_rectangular(
        width in 1..6usize,
        rows in arb_ragged_rows()
    ) {
        let columns: Vec<String> = (0..width).map(|i| format!("col_{}", i)).collect();
        let table = Table::new(columns, rows);

        for row in table.rows() {
            prop_assert_eq!(row.cells().len(), width);
            prop_assert!(row.non_empty_count() > 0);
        }
    }

    /// Property: registering a padded code makes both spellings resolve.
    #[test]
    fn prop_zero_padding_is_transparent(
        code in arb_material_code(),
        supplier in "[A-Z][a-z]{2,12}"
    ) {
        let mut index = SupplierIndex::new();
        index.register(&code, SupplierEntry::new(supplier.clone()));

        let stripped = strip_leading_zeros(&code).to_string();
        prop_assert_eq!(index.supplier(&code), Some(supplier.as_str()));
        prop_assert_eq!(index.supplier(&stripped), Some(supplier.as_str()));
        prop_assert_eq!(index.supplier(&format!("00{}", stripped)), Some(supplier.as_str()));
    }
}
