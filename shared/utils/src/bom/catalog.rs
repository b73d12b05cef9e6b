//! Several parsed documents reconciled against one comparison file.

use tracing::{debug, warn};

use bomfill_models::{ComparisonRow, ParsedDocument, ResolvedRow};

use super::validator::{style_matches, BomIndexes, RowValidator};
use crate::config::MatchingConfig;
use crate::error::{BomFillError, BomFillResult};

/// Parsed documents in upload order.
#[derive(Debug, Default)]
pub struct DocumentCatalog {
    documents: Vec<ParsedDocument>,
}

impl DocumentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, document: ParsedDocument) {
        if self
            .documents
            .iter()
            .any(|d| !d.metadata.style.is_empty() && d.metadata.style == document.metadata.style)
        {
            warn!(style = %document.metadata.style, "Several documents share a style; the first one wins");
        }
        self.documents.push(document);
    }

    pub fn documents(&self) -> &[ParsedDocument] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Position of the document a row with `buyer_style` belongs to: an
    /// exact style, then the substring rule, then the first document.
    pub fn route(&self, buyer_style: &str) -> Option<usize> {
        if self.documents.is_empty() {
            return None;
        }
        let buyer = buyer_style.trim();
        if buyer.is_empty() {
            return Some(0);
        }

        self.documents
            .iter()
            .position(|d| d.metadata.style.trim().eq_ignore_ascii_case(buyer))
            .or_else(|| {
                self.documents.iter().position(|d| {
                    !d.metadata.style.trim().is_empty() && style_matches(buyer, &d.metadata.style)
                })
            })
            .or(Some(0))
    }

    /// Validates `rows`, each against the document it routes to. Indexes
    /// are built once per document.
    pub fn validate(
        &self,
        validator: &RowValidator,
        rows: &[ComparisonRow],
        config: &MatchingConfig,
        parallel: bool,
    ) -> BomFillResult<Vec<ResolvedRow>> {
        if self.documents.is_empty() {
            return Err(BomFillError::validation("documents", "No BOM documents were parsed"));
        }

        let indexes: Vec<BomIndexes<'_>> = self
            .documents
            .iter()
            .map(|d| BomIndexes::build(d, config))
            .collect();

        let mut groups: Vec<Vec<ComparisonRow>> = vec![Vec::new(); indexes.len()];
        for row in rows {
            let target = self.route(&row.buyer_style).unwrap_or(0);
            groups[target].push(row.clone());
        }

        let mut resolved = Vec::with_capacity(rows.len());
        for (group, index) in groups.iter().zip(&indexes) {
            if group.is_empty() {
                continue;
            }
            debug!(style = %index.style(), rows = group.len(), "Validating rows against document");
            if parallel {
                resolved.extend(validator.validate_rows_parallel(group, index));
            } else {
                resolved.extend(validator.validate_rows(group, index));
            }
        }

        resolved.sort_by_key(|r| r.row.index);
        Ok(resolved)
    }
}
