use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The fixed set of label fields the verification engine knows how to check,
/// declared in check order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VerificationField {
    BrandName,
    ProductType,
    AlcoholContent,
    NetContents,
    GovernmentWarning,
}

/// Static per-field verification settings.
#[derive(Debug, Clone, Copy)]
pub struct FieldConfig {
    /// Name shown in human-readable messages.
    pub display_name: &'static str,
    /// Whether similarity-based matching may be applied when the caller
    /// opts in. The numeric fields use structural patterns instead.
    pub allows_fuzzy_match: bool,
}

impl VerificationField {
    pub const fn config(self) -> FieldConfig {
        match self {
            VerificationField::BrandName => FieldConfig {
                display_name: "Brand Name",
                allows_fuzzy_match: true,
            },
            VerificationField::ProductType => FieldConfig {
                display_name: "Product Type",
                allows_fuzzy_match: true,
            },
            VerificationField::AlcoholContent => FieldConfig {
                display_name: "Alcohol Content",
                allows_fuzzy_match: false,
            },
            VerificationField::NetContents => FieldConfig {
                display_name: "Net Contents",
                allows_fuzzy_match: false,
            },
            VerificationField::GovernmentWarning => FieldConfig {
                display_name: "Government Warning",
                allows_fuzzy_match: true,
            },
        }
    }

    pub fn display_name(self) -> &'static str {
        self.config().display_name
    }

    pub fn allows_fuzzy_match(self) -> bool {
        self.config().allows_fuzzy_match
    }
}

/// Similarity thresholds shared by every checking strategy.
pub struct MatchThresholds;

impl MatchThresholds {
    /// High-confidence acceptance ratio for fuzzy matching.
    pub const FUZZY_MATCH: f64 = 0.8;
    /// Lower ratio at which a phrase is still worth reporting as a near miss.
    pub const CLOSE_MATCH: f64 = 0.5;
    /// Close-match suggestions retained per field.
    pub const MAX_CLOSE_MATCHES: usize = 3;

    pub fn is_fuzzy_match(ratio: f64) -> bool {
        ratio >= Self::FUZZY_MATCH
    }

    pub fn is_close_match(ratio: f64) -> bool {
        ratio >= Self::CLOSE_MATCH
    }
}

/// Result of verifying claimed label fields against OCR text.
///
/// Only fields that were actually checked appear in `matches`: net contents
/// is omitted when not supplied, government warning unless requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub success: bool,
    pub matches: BTreeMap<VerificationField, bool>,
    /// Failed fields, in the order they were checked.
    pub mismatches: Vec<VerificationField>,
    pub raw_ocr_text: String,
    pub message: String,
    /// Near-miss phrases found for failed fields, to explain *why* a field
    /// failed rather than returning a bare boolean.
    #[serde(default)]
    pub close_matches: BTreeMap<VerificationField, Vec<String>>,
    /// Attached by the HTTP layer, never by the engine.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_info: Option<ImageInfo>,
}

/// Metadata about the uploaded image, reported back for operator context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub size_bytes: usize,
}
