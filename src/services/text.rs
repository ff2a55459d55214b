//! Text normalization for OCR-derived label text.

use std::collections::BTreeSet;

/// Single-glyph confusions OCR commonly makes on label typefaces.
/// Symmetric per pair so either misread direction is recoverable.
const OCR_SUBSTITUTIONS: &[(char, char)] = &[
    ('o', '0'),
    ('0', 'o'),
    ('i', '1'),
    ('1', 'i'),
    ('s', '5'),
    ('5', 's'),
];

/// Lowercase and collapse whitespace runs to single spaces, trimming the
/// ends. Idempotent.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Expand the lower-cased text into the set of plausible OCR misreads.
///
/// Each substitution replaces every occurrence of the old character, and the
/// work-set loop runs until no new variant appears, so variants reflecting
/// multiple simultaneous substitutions are reachable ("iso" yields "150").
/// The table is tiny and replacements are global, so the closure stays small
/// even on long OCR blobs.
pub fn ocr_variants(text: &str) -> BTreeSet<String> {
    let mut variants = BTreeSet::new();
    variants.insert(text.to_lowercase());

    loop {
        let mut added = BTreeSet::new();
        for &(old, new) in OCR_SUBSTITUTIONS {
            for variant in &variants {
                if variant.contains(old) {
                    let replaced = variant.replace(old, &new.to_string());
                    if !variants.contains(&replaced) {
                        added.insert(replaced);
                    }
                }
            }
        }
        if added.is_empty() {
            break;
        }
        variants.extend(added);
    }

    variants
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace_and_case() {
        assert_eq!(normalize("  OLD   Oak\n Bourbon\t"), "old oak bourbon");
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize("  Mixed \t CASE   text ");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn variants_substitute_letter_to_digit_and_back() {
        let from_letters = ocr_variants("old oak");
        assert!(from_letters.contains("0ld 0ak"));

        let from_digits = ocr_variants("0ld 0ak");
        assert!(from_digits.contains("old oak"));
    }

    #[test]
    fn variants_always_contain_the_input() {
        let variants = ocr_variants("Bourbon");
        assert!(variants.contains("bourbon"));
    }

    #[test]
    fn variants_reach_multi_substitution_fixed_point() {
        // i->1, s->5, o->0 stacked on one word.
        let variants = ocr_variants("iso");
        assert!(variants.contains("150"));
    }

    #[test]
    fn variants_without_confusable_chars_are_singleton() {
        assert_eq!(ocr_variants("grey hen").len(), 1);
    }
}
