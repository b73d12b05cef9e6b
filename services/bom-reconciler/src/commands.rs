//! Subcommand bodies.

use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use bomfill_models::{ColumnMapping, ParsedDocument};
use bomfill_utils::{
    comparison_rows, export_resolved, export_sections, parse_document, validate_file_type,
    AppConfig, ComparisonReader, DocumentCatalog, DocumentReport, ExtractionConfig, LabelSelection,
    PdfDocument, RowValidator, StatusSummary, COMPARISON_TYPES, PDF_TYPES,
};

use crate::cli::{InspectArgs, ReconcileArgs};

/// Printed after a reconcile run.
#[derive(Debug, Serialize)]
struct RunSummary {
    output: PathBuf,
    documents: Vec<String>,
    rows: usize,
    mapping: ColumnMapping,
    statuses: StatusSummary,
    /// Reports that could not be loaded, with the reason.
    skipped: Vec<String>,
}

fn load_document(path: &Path, config: &ExtractionConfig) -> Result<ParsedDocument> {
    validate_file_type(&path.to_string_lossy(), PDF_TYPES)?;
    let source = PdfDocument::open(path, config)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let document = parse_document(&source, config)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    if !document.warnings.is_empty() {
        warn!(
            file = %path.display(),
            skipped = document.warnings.len(),
            "Some pages could not be read"
        );
    }
    Ok(document)
}

/// Loads every report on the rayon pool. A report that fails is logged and
/// returned in the second list as `"<path>: <reason>"`; input order is kept.
fn load_documents<F>(paths: &[PathBuf], load: F) -> (Vec<ParsedDocument>, Vec<String>)
where
    F: Fn(&Path) -> Result<ParsedDocument> + Sync,
{
    let results: Vec<(&PathBuf, Result<ParsedDocument>)> =
        paths.par_iter().map(|path| (path, load(path))).collect();

    let mut documents = Vec::new();
    let mut skipped = Vec::new();
    for (path, result) in results {
        match result {
            Ok(document) => documents.push(document),
            Err(error) => {
                warn!(file = %path.display(), error = %format!("{:#}", error), "Skipping report");
                skipped.push(format!("{}: {:#}", path.display(), error));
            }
        }
    }
    (documents, skipped)
}

pub fn inspect(config: &AppConfig, args: InspectArgs) -> Result<()> {
    let document = load_document(&args.pdf, &config.extraction)?;
    let report = DocumentReport::build(&document, &config.matching);

    if let Some(dir) = &args.export_dir {
        let written = export_sections(&document, dir)?;
        report.write_json(&dir.join("report.json"))?;
        info!(dir = %dir.display(), sections = written.len(), "Inspection exported");
    }

    println!("{}", report.to_json()?);
    Ok(())
}

pub fn reconcile(config: &AppConfig, args: ReconcileArgs) -> Result<()> {
    validate_file_type(&args.comparison.to_string_lossy(), COMPARISON_TYPES)?;

    let (documents, skipped) =
        load_documents(&args.pdfs, |path| load_document(path, &config.extraction));
    if documents.is_empty() {
        bail!("No BOM report could be loaded: {}", skipped.join("; "));
    }

    let mut catalog = DocumentCatalog::new();
    for document in documents {
        catalog.add(document);
    }

    let reader = ComparisonReader::new(&config.comparison);
    let table = reader.read_path(&args.comparison)?;
    let mapping = reader.resolve_mapping(
        &table,
        args.style_column.as_deref(),
        args.color_column.as_deref(),
    )?;
    let rows = comparison_rows(&table, &mapping)?;

    let validator = RowValidator::new(config).with_labels(LabelSelection {
        main_label: args.main_label,
        care_label: args.care_label,
    });
    let resolved = catalog.validate(&validator, &rows, &config.matching, args.parallel)?;
    export_resolved(&args.output, &table.headers, &resolved)?;

    let summary = RunSummary {
        output: args.output,
        documents: catalog
            .documents()
            .iter()
            .map(|d| d.metadata.style.clone())
            .collect(),
        rows: resolved.len(),
        mapping,
        statuses: StatusSummary::from_rows(&resolved),
        skipped,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
