use bomfill_models::PageExtractionError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum BomFillError {
    #[error("Document has no pages")]
    EmptyDocument,

    #[error("PDF extraction error: {message}")]
    PdfExtraction { message: String },

    #[error("Page extraction error: {0}")]
    PageExtraction(PageExtractionError),

    #[error("Column mapping error: {message}")]
    ColumnMapping { message: String },

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Export error: {message}")]
    Export { message: String },

    #[error("I/O error: {message}")]
    Io { message: String },
}

impl BomFillError {
    pub fn pdf_extraction(message: impl Into<String>) -> Self {
        Self::PdfExtraction {
            message: message.into(),
        }
    }

    pub fn column_mapping(message: impl Into<String>) -> Self {
        Self::ColumnMapping {
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn export(message: impl Into<String>) -> Self {
        Self::Export {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyDocument => "EMPTY_DOCUMENT",
            Self::PdfExtraction { .. } => "PDF_EXTRACTION_ERROR",
            Self::PageExtraction(_) => "PAGE_EXTRACTION_ERROR",
            Self::ColumnMapping { .. } => "COLUMN_MAPPING_ERROR",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Export { .. } => "EXPORT_ERROR",
            Self::Io { .. } => "IO_ERROR",
        }
    }

    /// Only an empty document aborts a parse; everything else is local.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::EmptyDocument | Self::PdfExtraction { .. })
    }
}

pub type BomFillResult<T> = Result<T, BomFillError>;

impl From<PageExtractionError> for BomFillError {
    fn from(error: PageExtractionError) -> Self {
        Self::PageExtraction(error)
    }
}

impl From<std::io::Error> for BomFillError {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for BomFillError {
    fn from(error: csv::Error) -> Self {
        Self::export(error.to_string())
    }
}

impl From<serde_json::Error> for BomFillError {
    fn from(error: serde_json::Error) -> Self {
        Self::export(error.to_string())
    }
}

impl From<config::ConfigError> for BomFillError {
    fn from(error: config::ConfigError) -> Self {
        Self::configuration(error.to_string())
    }
}
