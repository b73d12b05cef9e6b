use crate::error::{BomFillError, BomFillResult};
use validator::{Validate, ValidationErrors};

/// File extensions accepted for BOM reports.
pub const PDF_TYPES: &[&str] = &["pdf"];

/// File extensions accepted for comparison spreadsheets.
pub const COMPARISON_TYPES: &[&str] = &["csv", "xlsx", "xls"];

pub fn validate_model<T: Validate>(model: &T) -> BomFillResult<()> {
    match model.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let error_messages = format_validation_errors(&errors);
            Err(BomFillError::validation("model", error_messages))
        }
    }
}

pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();

    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            let message = match &error.code {
                std::borrow::Cow::Borrowed("length") => {
                    format!("Length validation failed for field '{}'", field)
                }
                std::borrow::Cow::Borrowed("range") => {
                    format!("Value out of range for field '{}'", field)
                }
                _ => format!("Validation failed for field '{}': {}", field, error.code),
            };
            messages.push(message);
        }
    }

    // Nested sections report through `errors()` rather than `field_errors()`.
    if messages.is_empty() && !errors.errors().is_empty() {
        messages.push(errors.to_string());
    }

    messages.join(", ")
}

pub fn validate_file_type(file_name: &str, allowed_types: &[&str]) -> BomFillResult<()> {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    if !allowed_types.contains(&extension.to_lowercase().as_str()) {
        return Err(BomFillError::validation(
            "file_type",
            format!(
                "File type '{}' not allowed. Allowed types: {}",
                extension,
                allowed_types.join(", ")
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_model(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_out_of_range_config_is_rejected() {
        let mut config = AppConfig::default();
        config.extraction.header_scan_rows = 0;
        config.comparison.header_fill_ratio = 1.5;

        let error = validate_model(&config).unwrap_err();
        assert_eq!(error.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_validate_file_type() {
        assert!(validate_file_type("bom.PDF", PDF_TYPES).is_ok());
        assert!(validate_file_type("compare.xlsx", COMPARISON_TYPES).is_ok());
        assert!(validate_file_type("compare.txt", COMPARISON_TYPES).is_err());
    }
}
