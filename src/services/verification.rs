//! Label verification matching engine.
//!
//! Takes the claimed label fields plus the raw OCR text blob and produces an
//! explainable per-field verdict. Matching must tolerate OCR noise (glyph
//! confusions, line-wrap artifacts, irregular spacing) while staying strict
//! enough to serve as a compliance check: the textual fields lean on
//! variant-substring and similarity matching, the numeric fields on
//! structural patterns. The whole pass is pure and synchronous — same
//! inputs, same output, no shared state.

use std::collections::{BTreeMap, BTreeSet};

use tracing::info;

use crate::models::label::LabelData;
use crate::models::verification::{MatchThresholds, VerificationField, VerificationResult};
use crate::services::{patterns, similarity, text};

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// The upstream OCR pass produced nothing usable. Fatal to the call.
    #[error("No text detected in image")]
    NoTextDetected,

    /// A pattern failed to compile. A defect, not a field mismatch.
    #[error("Pattern construction failed: {0}")]
    Pattern(#[from] regex::Error),
}

/// Outcome of a single field check: did it match, and if not, the best
/// near-miss phrase found in the OCR text (if any).
struct CheckOutcome {
    matched: bool,
    close_match: Option<String>,
}

impl CheckOutcome {
    fn pass() -> Self {
        Self {
            matched: true,
            close_match: None,
        }
    }

    fn fail(close_match: Option<String>) -> Self {
        Self {
            matched: false,
            close_match,
        }
    }
}

/// Verify the claimed label fields against the OCR text.
///
/// Fields are checked in a fixed order: brand name, product type, alcohol
/// content, net contents (when supplied), government warning (when
/// requested). `fuzzy_match` opts eligible textual fields into
/// similarity-based acceptance; the exact variant-substring path is used
/// otherwise.
pub fn verify_label(
    label: &LabelData,
    ocr_text: &str,
    fuzzy_match: bool,
    check_government_warning: bool,
) -> Result<VerificationResult, VerifyError> {
    if ocr_text.trim().is_empty() {
        return Err(VerifyError::NoTextDetected);
    }

    let normalized_ocr = text::normalize(ocr_text);
    let variants = text::ocr_variants(&normalized_ocr);

    let mut matches = BTreeMap::new();
    let mut mismatches = Vec::new();
    let mut close_matches: BTreeMap<VerificationField, Vec<String>> = BTreeMap::new();

    let mut record = |field: VerificationField, outcome: CheckOutcome| {
        info!(
            field = %field,
            matched = outcome.matched,
            close = outcome.close_match.as_deref(),
            "field checked"
        );
        matches.insert(field, outcome.matched);
        if !outcome.matched {
            mismatches.push(field);
            if let Some(close) = outcome.close_match {
                let suggestions = close_matches.entry(field).or_default();
                if suggestions.len() < MatchThresholds::MAX_CLOSE_MATCHES {
                    suggestions.push(close);
                }
            }
        }
    };

    record(
        VerificationField::BrandName,
        check_text_field(
            VerificationField::BrandName,
            &label.brand_name,
            &normalized_ocr,
            &variants,
            fuzzy_match,
        ),
    );
    record(
        VerificationField::ProductType,
        check_text_field(
            VerificationField::ProductType,
            &label.product_type,
            &normalized_ocr,
            &variants,
            fuzzy_match,
        ),
    );
    record(
        VerificationField::AlcoholContent,
        check_alcohol_content(label.alcohol_content, &normalized_ocr)?,
    );
    if let Some(net_contents) = label.net_contents.as_deref().filter(|v| !v.is_empty()) {
        record(
            VerificationField::NetContents,
            check_net_contents(net_contents, &normalized_ocr)?,
        );
    }
    if check_government_warning {
        record(
            VerificationField::GovernmentWarning,
            check_warning_statement(&normalized_ocr),
        );
    }
    drop(record);

    let success = mismatches.is_empty();
    let message = if success {
        "All fields successfully verified on the label".to_string()
    } else {
        format!(
            "Verification failed for: {}",
            mismatches
                .iter()
                .map(|field| field.display_name())
                .collect::<Vec<_>>()
                .join(", ")
        )
    };

    Ok(VerificationResult {
        success,
        matches,
        mismatches,
        raw_ocr_text: ocr_text.to_string(),
        message,
        close_matches,
        image_info: None,
    })
}

/// Shared strategy for brand name and product type.
///
/// Without fuzzy matching, the normalized expected value must appear as a
/// literal substring of some OCR variant; no close match is reported.
/// With fuzzy matching, a sliding-window search at the acceptance threshold
/// runs over the plain text and then every variant; only when all of that
/// fails is the close-match search performed, plain text first.
fn check_text_field(
    field: VerificationField,
    expected: &str,
    normalized_ocr: &str,
    variants: &BTreeSet<String>,
    fuzzy_match: bool,
) -> CheckOutcome {
    let expected_norm = text::normalize(expected);

    if !fuzzy_match || !field.allows_fuzzy_match() {
        let matched = variants.iter().any(|v| v.contains(&expected_norm));
        return if matched {
            CheckOutcome::pass()
        } else {
            CheckOutcome::fail(None)
        };
    }

    let accepted = |body: &str| {
        !similarity::find_close_matches(&expected_norm, body, MatchThresholds::FUZZY_MATCH)
            .is_empty()
    };
    if accepted(normalized_ocr) || variants.iter().any(|v| accepted(v)) {
        return CheckOutcome::pass();
    }

    let mut close =
        similarity::find_close_matches(&expected_norm, normalized_ocr, MatchThresholds::CLOSE_MATCH);
    if close.is_empty() {
        for variant in variants {
            close =
                similarity::find_close_matches(&expected_norm, variant, MatchThresholds::CLOSE_MATCH);
            if !close.is_empty() {
                break;
            }
        }
    }
    CheckOutcome::fail(close.into_iter().next())
}

/// Render an ABV percentage the way labels print it: no forced decimal.
fn format_abv(value: f64) -> String {
    format!("{value}")
}

fn check_alcohol_content(expected_abv: f64, normalized_ocr: &str) -> Result<CheckOutcome, VerifyError> {
    let content = format_abv(expected_abv);
    let accepted = patterns::alcohol_content_patterns(&content)?;
    if accepted.iter().any(|p| p.is_match(normalized_ocr)) {
        return Ok(CheckOutcome::pass());
    }

    // First percentage mention in scan order, kept for behavioral
    // compatibility with the shipped service.
    let close = patterns::ALCOHOL_GENERAL
        .find(normalized_ocr)
        .map(|m| format!("Found {} (expected {}%)", m.as_str(), content));
    Ok(CheckOutcome::fail(close))
}

fn check_net_contents(form_value: &str, normalized_ocr: &str) -> Result<CheckOutcome, VerifyError> {
    let Some(caps) = patterns::NET_CONTENTS_FORM.captures(form_value) else {
        // A malformed expected value is the caller's doing, not the OCR's;
        // fail the field without hunting for an explanation.
        return Ok(CheckOutcome::fail(None));
    };
    let amount = &caps[1];
    let unit = caps[2].to_lowercase();

    let accepted = patterns::net_contents_patterns(amount, &unit)?;
    if accepted.iter().any(|p| p.is_match(normalized_ocr)) {
        return Ok(CheckOutcome::pass());
    }

    let close = patterns::VOLUME_GENERAL
        .find(normalized_ocr)
        .map(|m| format!("Found {} (expected {})", m.as_str(), form_value));
    Ok(CheckOutcome::fail(close))
}

const WARNING_PHRASE: &str = "government warning";

fn check_warning_statement(normalized_ocr: &str) -> CheckOutcome {
    if normalized_ocr.contains(WARNING_PHRASE) {
        return CheckOutcome::pass();
    }
    let close =
        similarity::find_close_matches(WARNING_PHRASE, normalized_ocr, MatchThresholds::CLOSE_MATCH);
    CheckOutcome::fail(close.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_label() -> LabelData {
        LabelData {
            brand_name: "Old Oak".to_string(),
            product_type: "Bourbon Whiskey".to_string(),
            alcohol_content: 45.0,
            net_contents: Some("750 mL".to_string()),
        }
    }

    const CLEAN_OCR: &str =
        "OLD OAK BOURBON WHISKEY 45% ALC/VOL 750mL GOVERNMENT WARNING: (1) According to \
         the Surgeon General, women should not drink alcoholic beverages during pregnancy.";

    #[test]
    fn abv_renders_without_forced_decimal() {
        assert_eq!(format_abv(45.0), "45");
        assert_eq!(format_abv(45.5), "45.5");
    }

    #[test]
    fn alcohol_close_match_reports_first_mention() {
        let outcome = check_alcohol_content(40.0, "aged 12% then bottled at 43% alc/vol").unwrap();
        assert!(!outcome.matched);
        assert_eq!(
            outcome.close_match.as_deref(),
            Some("Found 12% (expected 40%)")
        );
    }

    #[test]
    fn net_contents_malformed_expected_value_fails_silently() {
        let outcome = check_net_contents("seven-fifty ml", "750ml on the label").unwrap();
        assert!(!outcome.matched);
        assert!(outcome.close_match.is_none());
    }

    #[test]
    fn net_contents_close_match_reports_found_volume() {
        let outcome = check_net_contents("750 mL", "contains 700 ml of whiskey").unwrap();
        assert!(!outcome.matched);
        assert_eq!(
            outcome.close_match.as_deref(),
            Some("Found 700 ml (expected 750 mL)")
        );
    }

    #[test]
    fn warning_statement_close_match_on_misspelling() {
        let outcome = check_warning_statement("goverment warning: do not operate machinery");
        assert!(!outcome.matched);
        assert_eq!(outcome.close_match.as_deref(), Some("goverment warning:"));
    }

    #[test]
    fn exact_variant_substring_accepts_digit_misreads() {
        let label = sample_label();
        let ocr = "0LD 0AK BOURBON WHISKEY 45% ALC/VOL 750ml GOVERNMENT WARNING: ...";
        let result = verify_label(&label, ocr, false, true).unwrap();
        assert_eq!(
            result.matches.get(&VerificationField::BrandName),
            Some(&true)
        );
        assert!(result.success);
    }

    #[test]
    fn fuzzy_success_reports_no_close_match() {
        let label = sample_label();
        let ocr = "OLDE OAK BOURBON WHISKEY 45% ALC/VOL 750ml GOVERNMENT WARNING: ...";
        let result = verify_label(&label, ocr, true, true).unwrap();
        assert_eq!(
            result.matches.get(&VerificationField::BrandName),
            Some(&true)
        );
        assert!(!result
            .close_matches
            .contains_key(&VerificationField::BrandName));
    }

    #[test]
    fn fuzzy_failure_reports_best_close_match() {
        let label = sample_label();
        let ocr = "OLD YEW BOURBON WHISKEY 45% ALC/VOL 750ml GOVERNMENT WARNING: ...";
        let result = verify_label(&label, ocr, true, true).unwrap();
        assert!(!result.success);
        assert_eq!(result.mismatches, vec![VerificationField::BrandName]);
        assert_eq!(
            result.close_matches.get(&VerificationField::BrandName),
            Some(&vec!["old yew".to_string()])
        );
    }

    #[test]
    fn message_lists_display_names_in_check_order() {
        let label = LabelData {
            brand_name: "Silver Birch".to_string(),
            product_type: "London Dry Gin".to_string(),
            alcohol_content: 40.0,
            net_contents: None,
        };
        let result = verify_label(&label, CLEAN_OCR, false, false).unwrap();
        assert_eq!(
            result.mismatches,
            vec![
                VerificationField::BrandName,
                VerificationField::ProductType,
                VerificationField::AlcoholContent,
            ]
        );
        assert_eq!(
            result.message,
            "Verification failed for: Brand Name, Product Type, Alcohol Content"
        );
    }

    #[test]
    fn all_fields_verified_message_on_success() {
        let result = verify_label(&sample_label(), CLEAN_OCR, false, true).unwrap();
        assert!(result.success);
        assert_eq!(result.message, "All fields successfully verified on the label");
    }
}
