//! Scan record and analysis wire models
//!
//! All types mirror the backend's snake_case JSON. The scan lifecycle tags
//! (`status`, `overall_match`) stay open strings rather than closed enums:
//! the server is free to add values and the client must pass them through.

use serde::{Deserialize, Serialize};

/// Terminal value of `analysis_status`; the polling loop stops once it
/// observes this.
pub const ANALYSIS_COMPLETE: &str = "complete";

/// Acknowledgment returned by the image upload endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadAck {
    /// Whether the image was accepted into the analysis queue
    pub queued: bool,

    /// Position in the analysis queue at accept time
    pub queue_position: u32,

    /// Server-computed hash of the uploaded bytes
    #[serde(default)]
    pub content_hash: Option<String>,
}

/// A server-reported snapshot of one scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    /// Scan ID (matches the client-generated id used for the upload)
    pub id: String,

    /// Scan kind reported by the server (e.g. "photo", "barcode")
    #[serde(default)]
    pub scan_type: Option<String>,

    /// Scan lifecycle tag (open string; e.g. "queued", "processing", "idle")
    pub status: String,

    /// Extracted product snapshot, present once OCR/extraction succeeds
    #[serde(default)]
    pub product_info: Option<ProductInfo>,

    /// Status of the ingredient-analysis sub-step; `"complete"` is terminal
    #[serde(default)]
    pub analysis_status: Option<String>,

    /// Analysis outcome, present once analysis has run (or been skipped)
    #[serde(default)]
    pub analysis_result: Option<AnalysisResult>,

    /// Human-readable capture hint (e.g. "ensure better lighting")
    #[serde(default)]
    pub latest_guidance: Option<String>,

    /// Creation timestamp, opaque pass-through
    pub created_at: String,

    /// Last-activity timestamp, opaque pass-through
    #[serde(default)]
    pub last_activity_at: Option<String>,
}

impl ScanRecord {
    /// Whether the analysis sub-step has reached its terminal state
    pub fn analysis_complete(&self) -> bool {
        self.analysis_status.as_deref() == Some(ANALYSIS_COMPLETE)
    }

    /// Classify the analysis outcome at the decoding boundary.
    ///
    /// With `nullable_analysis=true` the server distinguishes "not yet
    /// computed" (no `analysis_result`) from "skipped because the user has no
    /// preferences configured" (`analysis_result` present, `overall_match`
    /// null). Callers must branch on this, never on raw nullability.
    pub fn outcome(&self) -> AnalysisOutcome<'_> {
        match &self.analysis_result {
            None => AnalysisOutcome::NotYetAnalyzed,
            Some(result) => match result.overall_match.as_deref() {
                None => AnalysisOutcome::NoPreferencesConfigured,
                Some(verdict) => AnalysisOutcome::Verdict {
                    verdict,
                    result,
                },
            },
        }
    }
}

/// Three-valued analysis state derived from a decoded record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisOutcome<'a> {
    /// The server has not produced an analysis result yet
    NotYetAnalyzed,

    /// Analysis was skipped: the user has no dietary preferences configured
    NoPreferencesConfigured,

    /// Analysis ran and produced a verdict
    Verdict {
        verdict: &'a str,
        result: &'a AnalysisResult,
    },
}

/// Extracted product snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductInfo {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub brand: Option<String>,

    /// Extracted ingredient list; may be empty before extraction finishes
    #[serde(default)]
    pub ingredients: Vec<IngredientEntry>,

    #[serde(default)]
    pub images: Option<Vec<ProductImage>>,

    /// Declared net quantity, when legible on the label
    #[serde(default)]
    pub net_quantity: Option<String>,
}

/// Ingredient entry as it appears on the wire.
///
/// Older backend versions emit bare strings, newer ones emit objects; both
/// must decode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum IngredientEntry {
    Name(String),
    Detailed { name: String },
}

impl IngredientEntry {
    pub fn name(&self) -> &str {
        match self {
            IngredientEntry::Name(name) => name,
            IngredientEntry::Detailed { name } => name,
        }
    }
}

/// Reference to a product image stored server-side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImage {
    #[serde(default)]
    pub url: Option<String>,
}

/// Result of comparing the product's ingredients against the user's
/// configured dietary preferences
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisResult {
    /// Overall narrative produced by the analysis step
    #[serde(default)]
    pub overall_analysis: Option<String>,

    /// Overall verdict tag (open string; null means analysis was skipped)
    #[serde(default)]
    pub overall_match: Option<String>,

    /// Per-ingredient verdicts
    #[serde(default)]
    pub ingredient_analysis: Vec<IngredientVerdict>,

    /// True when preferences changed after this result was computed; a
    /// reanalyze call produces a fresh verdict
    #[serde(default)]
    pub is_stale: bool,
}

/// Per-ingredient verdict with reasoning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngredientVerdict {
    pub ingredient: String,

    /// Verdict tag for this ingredient (open string)
    #[serde(rename = "match")]
    pub match_verdict: String,

    #[serde(default)]
    pub reasoning: Option<String>,

    /// Family members whose preferences this ingredient conflicts with
    #[serde(default)]
    pub members_affected: Vec<String>,
}
