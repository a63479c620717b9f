//! Test fixtures and builders for API model types
//!
//! Provides builder patterns for creating test data with sensible defaults.
//! Import via `use crate::client::fixtures::*` in test modules.

#![allow(dead_code)] // Builder methods are available for future tests

use super::models::{AnalysisResult, IngredientEntry, IngredientVerdict, ProductInfo, ScanRecord};

/// Builder for creating test ScanRecord instances.
///
/// # Example
/// ```ignore
/// let record = ScanRecordBuilder::new("scan-1")
///     .analysis_status("complete")
///     .verdict("match")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ScanRecordBuilder {
    id: String,
    status: String,
    analysis_status: Option<String>,
    product_name: Option<String>,
    ingredients: Vec<String>,
    analysis_result: Option<AnalysisResult>,
    latest_guidance: Option<String>,
}

impl ScanRecordBuilder {
    /// Create a new builder with the given scan id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: "processing".to_string(),
            analysis_status: None,
            product_name: None,
            ingredients: Vec::new(),
            analysis_result: None,
            latest_guidance: None,
        }
    }

    /// Set the scan lifecycle status.
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Set the analysis sub-step status.
    pub fn analysis_status(mut self, status: impl Into<String>) -> Self {
        self.analysis_status = Some(status.into());
        self
    }

    /// Set the extracted product name.
    pub fn product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    /// Add an extracted ingredient.
    pub fn ingredient(mut self, name: impl Into<String>) -> Self {
        self.ingredients.push(name.into());
        self
    }

    /// Set a capture guidance hint.
    pub fn guidance(mut self, hint: impl Into<String>) -> Self {
        self.latest_guidance = Some(hint.into());
        self
    }

    /// Attach an analysis result with the given overall verdict.
    pub fn verdict(mut self, overall_match: impl Into<String>) -> Self {
        self.analysis_result = Some(AnalysisResult {
            overall_analysis: Some("Looks fine overall.".to_string()),
            overall_match: Some(overall_match.into()),
            ingredient_analysis: vec![IngredientVerdict {
                ingredient: "sugar".to_string(),
                match_verdict: "match".to_string(),
                reasoning: None,
                members_affected: Vec::new(),
            }],
            is_stale: false,
        });
        self
    }

    /// Attach a skipped analysis result (null verdict; no preferences).
    pub fn skipped_analysis(mut self) -> Self {
        self.analysis_result = Some(AnalysisResult {
            overall_analysis: None,
            overall_match: None,
            ingredient_analysis: Vec::new(),
            is_stale: false,
        });
        self
    }

    /// Build the ScanRecord.
    pub fn build(self) -> ScanRecord {
        let product_info = if self.product_name.is_some() || !self.ingredients.is_empty() {
            Some(ProductInfo {
                name: self.product_name,
                brand: None,
                ingredients: self
                    .ingredients
                    .into_iter()
                    .map(IngredientEntry::Name)
                    .collect(),
                images: None,
                net_quantity: None,
            })
        } else {
            None
        };

        ScanRecord {
            id: self.id,
            scan_type: Some("photo".to_string()),
            status: self.status,
            product_info,
            analysis_status: self.analysis_status,
            analysis_result: self.analysis_result,
            latest_guidance: self.latest_guidance,
            created_at: "2024-11-02T10:15:00Z".to_string(),
            last_activity_at: None,
        }
    }
}
