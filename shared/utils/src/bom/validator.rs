//! Row Validator
//!
//! Resolves each comparison row against one parsed document and fills the
//! derived output fields.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use bomfill_models::{
    CareContentEntry, CareContentIndex, ComparisonRow, ComponentEntry, ComponentIndex, OutputField,
    ParsedDocument, ResolvedRow, SectionName, ValidationStatus, NOT_FOUND,
};

use super::care_content::CareContentBuilder;
use super::component_index::{build_component_index, canonical_colorway};
use super::matcher::{ColorwayMatcher, ComponentMatcher};
use crate::config::{AppConfig, FieldSourceConfig, MatchingConfig};

/// Lookup indexes derived from one parsed document.
#[derive(Debug)]
pub struct BomIndexes<'d> {
    pub document: &'d ParsedDocument,
    pub components: ComponentIndex,
    pub care_content: CareContentIndex,
    /// Colorway keys rows are resolved against.
    pub colorways: Vec<String>,
}

impl<'d> BomIndexes<'d> {
    pub fn build(document: &'d ParsedDocument, config: &MatchingConfig) -> Self {
        let components = build_component_index(document.section(SectionName::ColorBom));

        let builder = CareContentBuilder::from_config(config);
        let care = builder.build(document.section(SectionName::CareReport));
        let content = builder.build(document.section(SectionName::ContentReport));
        let care_content = care.merge(content);

        let colorways = if !components.colorways.is_empty() {
            components.colorways.clone()
        } else if !components.sap_codes.is_empty() {
            components.sap_codes.keys().cloned().collect()
        } else {
            let canonical: Vec<String> = care_content
                .keys()
                .filter(|k| canonical_colorway(k).is_some())
                .map(str::to_string)
                .collect();
            if canonical.is_empty() {
                care_content.keys().map(str::to_string).collect()
            } else {
                canonical
            }
        };

        debug!(
            components = components.len(),
            care_keys = care_content.len(),
            colorways = colorways.len(),
            "Built BOM indexes"
        );

        Self {
            document,
            components,
            care_content,
            colorways,
        }
    }

    pub fn style(&self) -> &str {
        &self.document.metadata.style
    }

    fn supplier(&self, code: &str) -> Option<String> {
        self.document.supplier_index.resolve(code).map(|entry| entry.name)
    }
}

/// Caller-chosen label components, as `"<component> - <id>"` tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSelection {
    pub main_label: Option<String>,
    pub care_label: Option<String>,
}

/// A selection token split on its last `" - "`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionToken {
    pub lookup_name: String,
    pub display_id: String,
}

impl SelectionToken {
    pub fn parse(token: &str) -> Self {
        match token.rsplit_once(" - ") {
            Some((name, id)) => Self {
                lookup_name: name.trim().to_string(),
                display_id: id.trim().to_string(),
            },
            None => Self {
                lookup_name: token.trim().to_string(),
                display_id: String::new(),
            },
        }
    }
}

/// Case-insensitive substring match in either direction; a blank side
/// always matches.
pub fn style_matches(buyer: &str, document: &str) -> bool {
    let buyer = buyer.trim().to_uppercase();
    let document = document.trim().to_uppercase();
    if buyer.is_empty() || document.is_empty() {
        return true;
    }
    buyer.contains(&document) || document.contains(&buyer)
}

fn value_or_missing(value: Option<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => NOT_FOUND.to_string(),
    }
}

/// Per-row orchestrator: style check, colorway resolution, field fill and
/// status classification. Holds no per-row state.
#[derive(Debug, Clone)]
pub struct RowValidator {
    colorways: ColorwayMatcher,
    components: ComponentMatcher,
    fields: FieldSourceConfig,
    labels: LabelSelection,
}

impl RowValidator {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            colorways: ColorwayMatcher::new(&config.matching),
            components: ComponentMatcher::new(&config.matching),
            fields: config.fields.clone(),
            labels: LabelSelection::default(),
        }
    }

    pub fn with_labels(mut self, labels: LabelSelection) -> Self {
        self.labels = labels;
        self
    }

    fn component<'i>(&self, name: &str, indexes: &'i BomIndexes<'_>) -> Option<&'i ComponentEntry> {
        self.components.find(name, &indexes.components)
    }

    /// Component chosen by a selection token, or the configured default,
    /// plus the token's display id.
    fn label_component<'i>(
        &self,
        token: Option<&String>,
        default_name: &str,
        indexes: &'i BomIndexes<'_>,
    ) -> (Option<&'i ComponentEntry>, String) {
        match token.filter(|t| !t.trim().is_empty()) {
            Some(token) => {
                let token = SelectionToken::parse(token);
                (self.component(&token.lookup_name, indexes), token.display_id)
            }
            None => (self.component(default_name, indexes), String::new()),
        }
    }

    fn supplier_for(
        &self,
        component: Option<&ComponentEntry>,
        fallback_code: &str,
        indexes: &BomIndexes<'_>,
    ) -> Option<String> {
        let code = component
            .map(|c| c.material_code.as_str())
            .filter(|c| !c.is_empty())
            .unwrap_or(fallback_code);
        if code.is_empty() {
            return None;
        }
        indexes.supplier(code)
    }

    pub fn validate_row(&self, row: &ComparisonRow, indexes: &BomIndexes<'_>) -> ResolvedRow {
        let unresolved = |status: ValidationStatus| ResolvedRow {
            row: row.clone(),
            colorway: None,
            fields: BTreeMap::new(),
            status,
        };

        if !style_matches(&row.buyer_style, indexes.style()) {
            return unresolved(ValidationStatus::StyleMismatch {
                buyer: row.buyer_style.trim().to_uppercase(),
                document: indexes.style().trim().to_uppercase(),
            });
        }

        let colorway = match self.colorways.normalize_colorway(&row.color_option, &indexes.colorways) {
            Some(key) => key,
            None => {
                return unresolved(ValidationStatus::UnknownColorway {
                    raw: row.color_option.trim().to_string(),
                })
            }
        };

        let fields = self.fill_fields(&colorway, indexes);
        let missing = fields.values().filter(|v| v.as_str() == NOT_FOUND).count();
        let status = if missing == 0 {
            ValidationStatus::Validated
        } else if missing < OutputField::ALL.len() {
            ValidationStatus::Partial
        } else {
            ValidationStatus::NoBomData
        };

        debug!(row = row.index, colorway = %colorway, missing, status = %status, "Row resolved");

        ResolvedRow {
            row: row.clone(),
            colorway: Some(colorway),
            fields,
            status,
        }
    }

    fn fill_fields(&self, colorway: &str, indexes: &BomIndexes<'_>) -> BTreeMap<OutputField, String> {
        let care: CareContentEntry = indexes.care_content.lookup(colorway).unwrap_or_default();
        let description = |c: Option<&ComponentEntry>| c.map(|c| c.description.clone());
        let color = |c: Option<&ComponentEntry>| c.map(|c| c.colorway_value(colorway).to_string());

        let (main, main_id) = self.label_component(self.labels.main_label.as_ref(), &self.fields.main_label, indexes);
        let (care_label, care_id) =
            self.label_component(self.labels.care_label.as_ref(), &self.fields.care_label, indexes);
        let additional = self.component(&self.fields.additional_main_label, indexes);
        let hangtag = self.component(&self.fields.hangtag, indexes);
        let rfid_hangtag = self.component(&self.fields.rfid_hangtag, indexes);
        let rfid_sticker = self.component(&self.fields.rfid_sticker, indexes);
        let upc = self.component(&self.fields.upc_sticker, indexes);

        let care_label_text = description(care_label)
            .filter(|d| !d.trim().is_empty())
            .or_else(|| Some(care.english_instructions.clone()));

        let values = [
            (OutputField::MainLabel, description(main)),
            (OutputField::MainLabelColor, color(main)),
            (OutputField::MainLabelSupplier, self.supplier_for(main, &main_id, indexes)),
            (OutputField::AdditionalMainLabel, description(additional)),
            (OutputField::AdditionalMainLabelColor, color(additional)),
            (OutputField::CareLabel, care_label_text),
            (OutputField::CareLabelColor, color(care_label)),
            (OutputField::CareLabelSupplier, self.supplier_for(care_label, &care_id, indexes)),
            (OutputField::ContentCode, Some(care.content_code.clone())),
            (OutputField::TpFc, Some(care.shell_composition.clone())),
            (OutputField::CareCode, Some(care.care_code.clone())),
            (OutputField::Hangtag, description(hangtag)),
            (OutputField::HangtagSupplier, self.supplier_for(hangtag, "", indexes)),
            (OutputField::HangtagRfid, description(rfid_hangtag)),
            (OutputField::HangtagRfidSupplier, self.supplier_for(rfid_hangtag, "", indexes)),
            (OutputField::RfidSticker, description(rfid_sticker)),
            (OutputField::RfidStickerSupplier, self.supplier_for(rfid_sticker, "", indexes)),
            (OutputField::UpcSticker, description(upc)),
            (OutputField::UpcStickerSupplier, self.supplier_for(upc, "", indexes)),
        ];

        values
            .into_iter()
            .map(|(field, value)| (field, value_or_missing(value)))
            .collect()
    }

    /// Validates rows in order.
    pub fn validate_rows(&self, rows: &[ComparisonRow], indexes: &BomIndexes<'_>) -> Vec<ResolvedRow> {
        let resolved: Vec<ResolvedRow> = rows.iter().map(|row| self.validate_row(row, indexes)).collect();
        log_summary(&resolved);
        resolved
    }

    /// Same result as [`validate_rows`](Self::validate_rows), computed on
    /// the rayon pool.
    pub fn validate_rows_parallel(&self, rows: &[ComparisonRow], indexes: &BomIndexes<'_>) -> Vec<ResolvedRow> {
        let resolved: Vec<ResolvedRow> = rows.par_iter().map(|row| self.validate_row(row, indexes)).collect();
        log_summary(&resolved);
        resolved
    }
}

fn log_summary(rows: &[ResolvedRow]) {
    let validated = rows.iter().filter(|r| r.status == ValidationStatus::Validated).count();
    let errors = rows.iter().filter(|r| r.status.is_error()).count();
    info!(
        rows = rows.len(),
        validated,
        partial = rows.len() - validated - errors,
        errors,
        "Validation complete"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bom::pdf_source::MemoryDocument;
    use crate::bom::segmenter::parse_document;
    use crate::config::ExtractionConfig;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn document() -> ParsedDocument {
        let source = MemoryDocument::new()
            .with_page(
                "Color BOM\nStyle: CL2880    Season: F25",
                vec![grid(&[
                    &["Component", "Details", "Usage", "010-Black", "224-Camel Brown"],
                    &["Label Logo 1", "Logo label (075660)", "Back", "Black", "Camel"],
                    &["Hangtag Package Part", "Hangtag (097305)", "", "White", "White"],
                    &["RFID Sticker", "RFID label (121612)", "", "White", "White"],
                    &["Packaging 3", "UPC sticker (980010)", "", "Clear", "Clear"],
                ])],
            )
            .with_page(
                "Costing BOM Detail",
                vec![grid(&[
                    &["Component", "Material", "Supplier"],
                    &["Label Logo 1", "075660", "Avery Dennison"],
                    &["Hangtag", "097305", "Avery"],
                    &["RFID", "121612", "Checkpoint"],
                    &["UPC", "980010", "SML"],
                    &["Label 1", "003287", "Y K K"],
                ])],
            )
            .with_page(
                "Care Report",
                vec![grid(&[
                    &["Colorway Number", "Care Code", "English Instructions"],
                    &["010", "3000", "Hand Wash Cold"],
                ])],
            )
            .with_page(
                "Content Report",
                vec![grid(&[
                    &["Colorway Number", "Content Code", "Composition"],
                    &["010", "R8T", "Shell: 100% Acrylic"],
                ])],
            );

        parse_document(&source, &ExtractionConfig::default()).unwrap()
    }

    fn row(style: &str, color: &str) -> ComparisonRow {
        ComparisonRow::new(0, style, color)
    }

    #[test]
    fn test_selection_token_splits_on_last_separator() {
        let token = SelectionToken::parse("Label - Woven 1 - 003287");
        assert_eq!(token.lookup_name, "Label - Woven 1");
        assert_eq!(token.display_id, "003287");
        assert_eq!(SelectionToken::parse("Label 1").display_id, "");
    }

    #[test]
    fn test_style_matches() {
        assert!(style_matches("cl2880", "CL2880"));
        assert!(style_matches("CL28", "CL2880"));
        assert!(style_matches("", "CL2880"));
        assert!(!style_matches("XX9999", "CL2880"));
    }

    #[test]
    fn test_missing_main_label_is_partial() {
        let document = document();
        let config = AppConfig::default();
        let indexes = BomIndexes::build(&document, &config.matching);

        let resolved = RowValidator::new(&config).validate_row(&row("CL2880", "010"), &indexes);

        assert_eq!(resolved.colorway.as_deref(), Some("010-Black"));
        assert_eq!(resolved.field(OutputField::MainLabel), Some("N/A"));
        assert_eq!(resolved.field(OutputField::CareLabel), Some("Hand Wash Cold"));
        assert_eq!(resolved.field(OutputField::ContentCode), Some("R8T"));
        assert_eq!(resolved.field(OutputField::TpFc), Some("100% Acrylic"));
        assert_eq!(resolved.field(OutputField::HangtagSupplier), Some("Avery"));
        assert_eq!(resolved.field(OutputField::UpcStickerSupplier), Some("SML"));
        assert_eq!(resolved.status, ValidationStatus::Partial);
        assert_eq!(resolved.status.to_string(), "⚠️ Partial");
    }

    #[test]
    fn test_selection_id_backs_supplier_lookup() {
        let document = document();
        let config = AppConfig::default();
        let indexes = BomIndexes::build(&document, &config.matching);
        let validator = RowValidator::new(&config).with_labels(LabelSelection {
            main_label: Some("Label 1 - 003287".to_string()),
            care_label: None,
        });

        let resolved = validator.validate_row(&row("CL2880", "010"), &indexes);
        assert_eq!(resolved.field(OutputField::MainLabel), Some("N/A"));
        assert_eq!(resolved.field(OutputField::MainLabelSupplier), Some("YKK"));
    }

    #[test]
    fn test_style_mismatch_leaves_fields_unset() {
        let document = document();
        let config = AppConfig::default();
        let indexes = BomIndexes::build(&document, &config.matching);

        let resolved = RowValidator::new(&config).validate_row(&row("XX9999", "010"), &indexes);
        assert_eq!(resolved.status.to_string(), "❌ Error: Style mismatch (XX9999 vs CL2880)");
        assert!(resolved.fields.is_empty());
        assert!(resolved.colorway.is_none());
    }

    #[test]
    fn test_unknown_colorway() {
        let document = document();
        let config = AppConfig::default();
        let indexes = BomIndexes::build(&document, &config.matching);

        let resolved = RowValidator::new(&config).validate_row(&row("CL2880", "Neon Pink"), &indexes);
        assert_eq!(resolved.status.to_string(), "❌ Error: Unknown colorway 'Neon Pink'");
        assert!(resolved.fields.is_empty());
    }

    #[test]
    fn test_empty_document_yields_no_bom_data() {
        let source = MemoryDocument::new().with_page("Style: CL2880", vec![]);
        let document = parse_document(&source, &ExtractionConfig::default()).unwrap();
        let config = AppConfig::default();
        let mut indexes = BomIndexes::build(&document, &config.matching);
        indexes.colorways = vec!["010-Black".to_string()];

        let resolved = RowValidator::new(&config).validate_row(&row("CL2880", "010"), &indexes);
        assert_eq!(resolved.status, ValidationStatus::NoBomData);
        assert_eq!(resolved.fields.len(), OutputField::ALL.len());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let document = document();
        let config = AppConfig::default();
        let indexes = BomIndexes::build(&document, &config.matching);
        let validator = RowValidator::new(&config);
        let rows: Vec<ComparisonRow> = [("CL2880", "010"), ("XX9999", "224"), ("CL2880", "Camel Brown")]
            .iter()
            .enumerate()
            .map(|(i, (s, c))| ComparisonRow::new(i, *s, *c))
            .collect();

        assert_eq!(
            validator.validate_rows(&rows, &indexes),
            validator.validate_rows_parallel(&rows, &indexes)
        );
    }
}
