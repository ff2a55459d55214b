//! Normalized string similarity and sliding-window fuzzy search.

use strsim::normalized_levenshtein;

use crate::models::verification::MatchThresholds;

/// Similarity ratio in [0, 1] over lower-cased inputs. Identical strings
/// score 1.0; small edits move the score down proportionally.
pub fn ratio(a: &str, b: &str) -> f64 {
    normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase())
}

/// Slide a window of `target`'s token count across `text` (step 1) and
/// return the phrases scoring at least `threshold`, best first.
///
/// The threshold is inclusive. Ties keep original window order, and the
/// result is truncated to `MatchThresholds::MAX_CLOSE_MATCHES`. Texts with
/// fewer tokens than the target produce no matches.
pub fn find_close_matches(target: &str, text: &str, threshold: f64) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let window_size = target.split_whitespace().count();
    if window_size == 0 || words.len() < window_size {
        return Vec::new();
    }

    let mut scored: Vec<(String, f64)> = Vec::new();
    for window in words.windows(window_size) {
        let phrase = window.join(" ");
        let similarity = ratio(target, &phrase);
        if similarity >= threshold {
            scored.push((phrase, similarity));
        }
    }

    // Stable sort keeps earlier windows ahead on equal scores.
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored
        .into_iter()
        .take(MatchThresholds::MAX_CLOSE_MATCHES)
        .map(|(phrase, _)| phrase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_one() {
        assert_eq!(ratio("Bourbon Whiskey", "bourbon whiskey"), 1.0);
    }

    #[test]
    fn small_edits_lower_the_score_monotonically() {
        let clean = ratio("old oak", "old oak");
        let one_edit = ratio("old oak", "old oak!");
        let two_edits = ratio("old oak", "olde oak!");
        assert!(clean > one_edit);
        assert!(one_edit > two_edits);
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        // "abcd" vs "abxy": 2 edits over 4 chars = exactly 0.5.
        assert_eq!(ratio("abcd", "abxy"), 0.5);
        let hits = find_close_matches("abcd", "abxy zz", 0.5);
        assert_eq!(hits, vec!["abxy".to_string()]);
    }

    #[test]
    fn scores_below_threshold_are_excluded() {
        // "abcd" vs "axyz": 3 edits over 4 chars = 0.25.
        assert!(ratio("abcd", "axyz") < 0.5);
        assert!(find_close_matches("abcd", "axyz qq", 0.5).is_empty());
    }

    #[test]
    fn text_shorter_than_target_yields_nothing() {
        assert!(find_close_matches("two words", "one", 0.1).is_empty());
    }

    #[test]
    fn best_window_comes_first() {
        let hits = find_close_matches("old oak", "old yew and old oak", 0.5);
        assert_eq!(hits.first().map(String::as_str), Some("old oak"));
    }

    #[test]
    fn results_truncated_to_configured_maximum() {
        let hits = find_close_matches("a", "a a a a a", 0.5);
        assert_eq!(hits.len(), MatchThresholds::MAX_CLOSE_MATCHES);
    }

    #[test]
    fn ties_keep_original_window_order() {
        let hits = find_close_matches("ab", "ax ay", 0.5);
        assert_eq!(hits, vec!["ax".to_string(), "ay".to_string()]);
    }
}
