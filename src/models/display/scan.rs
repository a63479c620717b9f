//! Scan display models and helpers

use serde::Serialize;
use tabled::Tabled;

use super::common::{format_relative_time, short_id, truncate};
use crate::client::models::{AnalysisOutcome, IngredientVerdict, ScanRecord};

/// Widest a reasoning cell gets before truncation
const REASONING_WIDTH: usize = 48;

/// Scan display model for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct ScanRow {
    /// Shortened scan ID
    #[tabled(rename = "SCAN ID")]
    pub id: String,

    /// Scan kind (photo, barcode)
    #[tabled(rename = "TYPE")]
    pub kind: String,

    /// Scan lifecycle status
    #[tabled(rename = "STATUS")]
    pub status: String,

    /// Analysis sub-step status
    #[tabled(rename = "ANALYSIS")]
    pub analysis: String,

    /// Extracted product name
    #[tabled(rename = "PRODUCT")]
    pub product: String,

    /// Overall verdict (or why there is none)
    #[tabled(rename = "VERDICT")]
    pub verdict: String,

    /// When the scan was created (e.g., "2h ago")
    #[tabled(rename = "SCANNED")]
    pub scanned: String,
}

impl From<&ScanRecord> for ScanRow {
    fn from(record: &ScanRecord) -> Self {
        let product = record
            .product_info
            .as_ref()
            .and_then(|p| p.name.as_deref())
            .unwrap_or("--")
            .to_string();

        Self {
            id: short_id(&record.id),
            kind: record.scan_type.clone().unwrap_or_else(|| "--".to_string()),
            status: record.status.clone(),
            analysis: record
                .analysis_status
                .clone()
                .unwrap_or_else(|| "--".to_string()),
            product,
            verdict: verdict_cell(record),
            scanned: format_relative_time(&record.created_at),
        }
    }
}

impl From<ScanRecord> for ScanRow {
    fn from(record: ScanRecord) -> Self {
        ScanRow::from(&record)
    }
}

/// Render the three-valued analysis outcome for a table cell
fn verdict_cell(record: &ScanRecord) -> String {
    match record.outcome() {
        AnalysisOutcome::NotYetAnalyzed => "pending".to_string(),
        AnalysisOutcome::NoPreferencesConfigured => "no preferences".to_string(),
        AnalysisOutcome::Verdict { verdict, .. } => verdict.to_string(),
    }
}

/// Per-ingredient verdict row for the scan detail view.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct IngredientRow {
    #[tabled(rename = "INGREDIENT")]
    pub ingredient: String,

    #[tabled(rename = "VERDICT")]
    pub verdict: String,

    /// Family members whose preferences the ingredient conflicts with
    #[tabled(rename = "AFFECTS")]
    pub affects: String,

    #[tabled(rename = "REASONING")]
    pub reasoning: String,
}

impl From<&IngredientVerdict> for IngredientRow {
    fn from(verdict: &IngredientVerdict) -> Self {
        let affects = if verdict.members_affected.is_empty() {
            "--".to_string()
        } else {
            verdict.members_affected.join(", ")
        };

        Self {
            ingredient: verdict.ingredient.clone(),
            verdict: verdict.match_verdict.clone(),
            affects,
            reasoning: verdict
                .reasoning
                .as_deref()
                .map(|r| truncate(r, REASONING_WIDTH))
                .unwrap_or_else(|| "--".to_string()),
        }
    }
}
