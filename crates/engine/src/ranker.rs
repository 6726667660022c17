//! Deterministic ranking: stable descending sort on predicted rating,
//! per-item de-duplication, top-N truncation.

use recommerce_core::types::Recommendation;
use std::collections::HashSet;

pub const DEFAULT_TOP_N: usize = 10;

/// Rank scored items into the final recommendation list.
///
/// The sort is stable, so items with equal scores keep their input order;
/// NaN scores compare as equal rather than poisoning the order. After the
/// sort, the first occurrence of each item wins (which is its
/// highest-scored occurrence) and the list is cut to `top_n`. Fewer than
/// `top_n` distinct items yields a shorter list, never padding.
pub fn rank(mut scored: Vec<(String, f64)>, top_n: usize) -> Vec<Recommendation> {
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut seen = HashSet::new();
    let mut ranked = Vec::with_capacity(top_n.min(scored.len()));
    for (item_id, predicted_rating) in scored {
        if ranked.len() == top_n {
            break;
        }
        if !seen.insert(item_id.clone()) {
            continue;
        }
        ranked.push(Recommendation {
            item_id,
            predicted_rating,
        });
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(pairs: &[(&str, f64)]) -> Vec<(String, f64)> {
        pairs
            .iter()
            .map(|&(id, score)| (id.to_string(), score))
            .collect()
    }

    #[test]
    fn sorts_descending_by_predicted_rating() {
        let ranked = rank(scored(&[("a", 1.0), ("b", 4.5), ("c", 3.0)]), 10);
        let scores: Vec<f64> = ranked.iter().map(|r| r.predicted_rating).collect();
        assert_eq!(scores, vec![4.5, 3.0, 1.0]);
        for pair in ranked.windows(2) {
            assert!(pair[0].predicted_rating >= pair[1].predicted_rating);
        }
    }

    #[test]
    fn equal_scores_keep_input_order() {
        let ranked = rank(scored(&[("A", 5.0), ("B", 5.0), ("C", 3.0)]), 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].item_id, "A");
        assert_eq!(ranked[1].item_id, "B");
    }

    #[test]
    fn duplicate_items_keep_their_highest_score() {
        let ranked = rank(scored(&[("X", 4.0), ("Y", 4.5), ("X", 4.2)]), 10);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].item_id, "Y");
        assert_eq!(ranked[0].predicted_rating, 4.5);
        assert_eq!(ranked[1].item_id, "X");
        assert_eq!(ranked[1].predicted_rating, 4.2);
    }

    #[test]
    fn equal_scored_duplicates_keep_the_first_occurrence() {
        let ranked = rank(scored(&[("X", 4.0), ("X", 4.0), ("Y", 2.0)]), 10);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].item_id, "X");
    }

    #[test]
    fn truncates_to_top_n_distinct_items() {
        let input = scored(&[("a", 5.0), ("b", 4.0), ("a", 3.0), ("c", 2.0), ("d", 1.0)]);
        assert_eq!(rank(input.clone(), 3).len(), 3);
        // min(top_n, distinct): four distinct items, top_n of ten.
        assert_eq!(rank(input, 10).len(), 4);
    }

    #[test]
    fn empty_input_is_an_empty_list() {
        assert!(rank(Vec::new(), 10).is_empty());
    }

    #[test]
    fn nan_scores_do_not_poison_the_ranking() {
        let ranked = rank(scored(&[("a", f64::NAN), ("b", 2.0), ("c", 1.0)]), 10);
        // All three items survive, still de-duplicated, no panic.
        assert_eq!(ranked.len(), 3);
        let ids: HashSet<&str> = ranked.iter().map(|r| r.item_id.as_str()).collect();
        assert_eq!(ids.len(), 3);
    }
}
