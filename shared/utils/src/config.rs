use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    #[validate]
    pub logging: LoggingConfig,
    #[validate]
    pub extraction: ExtractionConfig,
    #[validate]
    pub matching: MatchingConfig,
    pub fields: FieldSourceConfig,
    #[validate]
    pub comparison: ComparisonConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoggingConfig {
    #[validate(length(min = 1, message = "Log level must not be empty"))]
    pub level: String,
    pub format: String,
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExtractionConfig {
    /// Leading rows considered when picking a table's header row.
    #[validate(range(min = 1, max = 50))]
    pub header_scan_rows: usize,
    /// Non-empty lines at the top of a page treated as its heading area.
    #[validate(range(min = 1, max = 20))]
    pub heading_lines: usize,
    /// Rows of a stitched section with fewer non-empty cells are banners.
    #[validate(range(min = 1, max = 10))]
    pub min_data_cells: usize,
    /// Share of undecodable characters above which a page is rejected.
    #[validate(range(min = 0.0, max = 1.0))]
    pub max_garbled_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentAlias {
    pub canonical: String,
    pub aliases: Vec<String>,
}

impl ComponentAlias {
    fn new(canonical: &str, aliases: &[&str]) -> Self {
        Self {
            canonical: canonical.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MatchingConfig {
    pub component_aliases: Vec<ComponentAlias>,
    pub stop_words: Vec<String>,
    pub null_sentinels: Vec<String>,
    /// Words that may precede a colorway number, as in `COL-464`.
    pub colorway_prefixes: Vec<String>,
    /// Labels that split a fiber composition into named sections.
    pub fiber_sections: Vec<String>,
    #[validate(range(min = 1, max = 10))]
    pub min_shared_token_len: usize,
}

/// BOM component names feeding each component-backed output field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSourceConfig {
    pub main_label: String,
    pub care_label: String,
    pub additional_main_label: String,
    pub hangtag: String,
    pub rfid_hangtag: String,
    pub rfid_sticker: String,
    pub upc_sticker: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ComparisonConfig {
    /// Minimum share of filled cells for a row to count as the header.
    #[validate(range(min = 0.0, max = 1.0))]
    pub header_fill_ratio: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub min_mapping_confidence: f64,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Layers built-in defaults, `config/*` files, an optional explicit file
    /// and `BOMFILL__*` environment variables, in that order.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let mut builder = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(
                File::with_name(&format!(
                    "config/{}",
                    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            .add_source(File::with_name("config/local").required(false));

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder
            .add_source(Environment::with_prefix("BOMFILL").separator("__"))
            .build()?
            .try_deserialize()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            extraction: ExtractionConfig::default(),
            matching: MatchingConfig::default(),
            fields: FieldSourceConfig::default(),
            comparison: ComparisonConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
            file_path: None,
        }
    }
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            header_fill_ratio: 0.5,
            min_mapping_confidence: 0.5,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            header_scan_rows: 5,
            heading_lines: 3,
            min_data_cells: 2,
            max_garbled_ratio: 0.3,
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            component_aliases: vec![
                ComponentAlias::new("Label 1", &["main label", "label1", "label 1", "care label"]),
                ComponentAlias::new(
                    "Label Logo 1",
                    &["logo label", "label logo", "logo 1", "additional main label"],
                ),
                ComponentAlias::new("Shell 1", &["shell", "main shell", "shell1", "shell 1"]),
                ComponentAlias::new("Shell 2", &["faux fur", "fur shell", "shell 2", "shell2"]),
                ComponentAlias::new("Insulation 1", &["insulation", "fill", "pompom", "pom pom"]),
                ComponentAlias::new("Hangtag Package Part", &["hangtag", "hang tag", "ht"]),
                ComponentAlias::new("RFID Sticker", &["rfid sticker", "rfid label", "rfid tag"]),
                ComponentAlias::new("Packaging 1", &["swing hook", "dh-blm", "packaging 1"]),
                ComponentAlias::new("Packaging 2", &["polybag", "poly bag", "packaging 2"]),
                ComponentAlias::new("Packaging 3", &["upc sticker", "upc bag sticker", "packaging 3"]),
                ComponentAlias::new("Packaging 4", &["outer carton", "carton", "packaging 4"]),
            ],
            stop_words: ["the", "and", "a", "an", "of", "with", "in", "color", "colour", "colorway"]
                .iter()
                .map(|w| w.to_string())
                .collect(),
            null_sentinels: ["n/a", "nan", "none", "null"]
                .iter()
                .map(|w| w.to_string())
                .collect(),
            colorway_prefixes: ["col", "color", "colour", "cw", "clr", "opt", "option"]
                .iter()
                .map(|w| w.to_string())
                .collect(),
            fiber_sections: [
                "Shell", "Lining", "Fill", "Insulation", "Trim", "Body", "Contrast", "Pocketing",
                "Rib", "Faux Fur", "Pile", "Backing", "Sleeve Lining", "Hood Lining",
            ]
            .iter()
            .map(|w| w.to_string())
            .collect(),
            min_shared_token_len: 3,
        }
    }
}

impl Default for FieldSourceConfig {
    fn default() -> Self {
        Self {
            main_label: "Label 1".to_string(),
            care_label: "Label 1".to_string(),
            additional_main_label: "Label Logo 1".to_string(),
            hangtag: "Hangtag Package Part".to_string(),
            rfid_hangtag: "Hangtag Package Part".to_string(),
            rfid_sticker: "RFID Sticker".to_string(),
            upc_sticker: "Packaging 3".to_string(),
        }
    }
}
