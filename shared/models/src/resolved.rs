//! Output fields and per-row verdicts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::comparison::ComparisonRow;

/// Value written to a field whose lookup found nothing.
pub const NOT_FOUND: &str = "N/A";

pub const STATUS_HEADER: &str = "Validation Status";

/// Derived output columns, in export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OutputField {
    MainLabel,
    MainLabelColor,
    MainLabelSupplier,
    AdditionalMainLabel,
    AdditionalMainLabelColor,
    CareLabel,
    CareLabelColor,
    CareLabelSupplier,
    ContentCode,
    TpFc,
    CareCode,
    Hangtag,
    HangtagSupplier,
    HangtagRfid,
    HangtagRfidSupplier,
    RfidSticker,
    RfidStickerSupplier,
    UpcSticker,
    UpcStickerSupplier,
}

impl OutputField {
    pub const ALL: [OutputField; 19] = [
        OutputField::MainLabel,
        OutputField::MainLabelColor,
        OutputField::MainLabelSupplier,
        OutputField::AdditionalMainLabel,
        OutputField::AdditionalMainLabelColor,
        OutputField::CareLabel,
        OutputField::CareLabelColor,
        OutputField::CareLabelSupplier,
        OutputField::ContentCode,
        OutputField::TpFc,
        OutputField::CareCode,
        OutputField::Hangtag,
        OutputField::HangtagSupplier,
        OutputField::HangtagRfid,
        OutputField::HangtagRfidSupplier,
        OutputField::RfidSticker,
        OutputField::RfidStickerSupplier,
        OutputField::UpcSticker,
        OutputField::UpcStickerSupplier,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            Self::MainLabel => "Main Label",
            Self::MainLabelColor => "Main Label Color",
            Self::MainLabelSupplier => "Main Label Supplier",
            Self::AdditionalMainLabel => "Additional Main Label",
            Self::AdditionalMainLabelColor => "Additional Main Label Color",
            Self::CareLabel => "Care Label",
            Self::CareLabelColor => "Care Label Color",
            Self::CareLabelSupplier => "Care Label Supplier",
            Self::ContentCode => "Content Code",
            Self::TpFc => "TP FC",
            Self::CareCode => "Care Code",
            Self::Hangtag => "Hangtag",
            Self::HangtagSupplier => "Hangtag Supplier",
            Self::HangtagRfid => "Hangtag (RFID)",
            Self::HangtagRfidSupplier => "Hangtag (RFID) Supplier",
            Self::RfidSticker => "RFID Sticker",
            Self::RfidStickerSupplier => "RFID Sticker Supplier",
            Self::UpcSticker => "UPC Sticker (Polybag)",
            Self::UpcStickerSupplier => "UPC Sticker Supplier",
        }
    }

    /// All twenty export headers, status last.
    pub fn export_headers() -> Vec<&'static str> {
        Self::ALL
            .iter()
            .map(|f| f.header())
            .chain(std::iter::once(STATUS_HEADER))
            .collect()
    }
}

/// Overall verdict for one comparison row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationStatus {
    Validated,
    Partial,
    StyleMismatch { buyer: String, document: String },
    UnknownColorway { raw: String },
    NoBomData,
}

impl ValidationStatus {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::StyleMismatch { .. } | Self::UnknownColorway { .. } | Self::NoBomData
        )
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validated => write!(f, "✅ Validated"),
            Self::Partial => write!(f, "⚠️ Partial"),
            Self::StyleMismatch { buyer, document } => {
                write!(f, "❌ Error: Style mismatch ({} vs {})", buyer, document)
            }
            Self::UnknownColorway { raw } => write!(f, "❌ Error: Unknown colorway '{}'", raw),
            Self::NoBomData => write!(f, "❌ Error: No BOM data matched"),
        }
    }
}

/// A comparison row plus every derived field and its verdict.
///
/// Rows that fail identity checks carry no fields at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRow {
    pub row: ComparisonRow,
    /// Colorway key the row resolved to, when it got that far.
    pub colorway: Option<String>,
    pub fields: BTreeMap<OutputField, String>,
    pub status: ValidationStatus,
}

impl ResolvedRow {
    pub fn field(&self, field: OutputField) -> Option<&str> {
        self.fields.get(&field).map(|v| v.as_str())
    }

    /// Twenty export values in header order; unset fields are empty.
    pub fn output_values(&self) -> Vec<String> {
        OutputField::ALL
            .iter()
            .map(|f| self.field(*f).unwrap_or("").to_string())
            .chain(std::iter::once(self.status.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_headers_are_ordered() {
        let headers = OutputField::export_headers();
        assert_eq!(headers.len(), 20);
        assert_eq!(headers[0], "Main Label");
        assert_eq!(headers[9], "TP FC");
        assert_eq!(headers[19], "Validation Status");
    }

    #[test]
    fn test_status_strings() {
        let status = ValidationStatus::StyleMismatch {
            buyer: "XX9999".to_string(),
            document: "CL2880".to_string(),
        };
        assert_eq!(status.to_string(), "❌ Error: Style mismatch (XX9999 vs CL2880)");
        assert!(status.is_error());
        assert!(!ValidationStatus::Partial.is_error());
    }
}
