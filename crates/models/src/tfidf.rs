//! Tf-idf vectorization of short free-text features.
//!
//! Tokenization is whitespace splitting over text that preprocessing has
//! already lowercased and stripped of punctuation; tokens shorter than two
//! characters are ignored. Inverse document frequency is smoothed,
//! `ln((1 + n) / (1 + df)) + 1`, and each output row is L2-normalized.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

fn tokens(document: &str) -> impl Iterator<Item = &str> {
    document
        .split_whitespace()
        .filter(|token| token.chars().count() >= 2)
}

impl TfidfVectorizer {
    /// Build the vocabulary and idf weights from `documents`.
    ///
    /// When more than `max_features` distinct terms exist, the most
    /// frequent terms across the corpus are kept (ties broken
    /// alphabetically); the surviving vocabulary is indexed in
    /// alphabetical order.
    pub fn fit<S: AsRef<str>>(documents: &[S], max_features: usize) -> Self {
        let n_docs = documents.len();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        let mut corpus_freq: HashMap<&str, usize> = HashMap::new();

        for document in documents {
            let mut seen_in_doc: HashSet<&str> = HashSet::new();
            for token in tokens(document.as_ref()) {
                *corpus_freq.entry(token).or_insert(0) += 1;
                if seen_in_doc.insert(token) {
                    *doc_freq.entry(token).or_insert(0) += 1;
                }
            }
        }

        let mut terms: Vec<&str> = corpus_freq.keys().copied().collect();
        if terms.len() > max_features && max_features > 0 {
            terms.sort_by(|a, b| {
                corpus_freq[b]
                    .cmp(&corpus_freq[a])
                    .then_with(|| a.cmp(b))
            });
            terms.truncate(max_features);
        }
        terms.sort_unstable();

        let vocabulary: HashMap<String, usize> = terms
            .iter()
            .enumerate()
            .map(|(index, term)| (term.to_string(), index))
            .collect();

        let mut idf = vec![0.0; terms.len()];
        for (term, &index) in &vocabulary {
            let df = doc_freq.get(term.as_str()).copied().unwrap_or(0);
            idf[index] = ((1.0 + n_docs as f64) / (1.0 + df as f64)).ln() + 1.0;
        }

        Self { vocabulary, idf }
    }

    /// Sparse `(column, weight)` entries for one document, sorted by
    /// column, L2-normalized. Out-of-vocabulary tokens are ignored.
    pub fn transform(&self, document: &str) -> Vec<(usize, f64)> {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for token in tokens(document) {
            if let Some(&index) = self.vocabulary.get(token) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();
        entries.sort_unstable_by_key(|&(index, _)| index);

        let norm: f64 = entries
            .iter()
            .map(|&(_, weight)| weight * weight)
            .sum::<f64>()
            .sqrt();
        if norm > 0.0 {
            for entry in &mut entries {
                entry.1 /= norm;
            }
        }
        entries
    }

    pub fn vocabulary_len(&self) -> usize {
        self.idf.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_is_alphabetical_and_filters_short_tokens() {
        let vectorizer = TfidfVectorizer::fit(&["good cable", "a bad cable"], 100);
        // "a" is dropped by the two-character minimum.
        assert_eq!(vectorizer.vocabulary_len(), 3);
        let entries = vectorizer.transform("bad cable");
        // "bad" < "cable" < "good" alphabetically.
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, 0);
        assert_eq!(entries[1].0, 1);
    }

    #[test]
    fn rows_are_l2_normalized() {
        let vectorizer = TfidfVectorizer::fit(&["fast charger", "slow charger"], 100);
        let entries = vectorizer.transform("fast fast charger");
        let norm: f64 = entries.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
        // Rarer term outweighs the common one.
        assert!(entries.iter().map(|&(_, w)| w).fold(0.0, f64::max) > 0.5);
    }

    #[test]
    fn rare_terms_get_higher_idf_weight() {
        let vectorizer =
            TfidfVectorizer::fit(&["cable cable", "cable charger", "cable adapter"], 100);
        let common = vectorizer.transform("cable");
        let rare = vectorizer.transform("adapter");
        // Single-token documents normalize to weight 1; compare raw idf via
        // a mixed document instead.
        assert_eq!(common.len(), 1);
        assert_eq!(rare.len(), 1);
        let mixed = vectorizer.transform("cable adapter");
        let weights: Vec<f64> = mixed.iter().map(|&(_, w)| w).collect();
        // "adapter" (df=1) must outweigh "cable" (df=3).
        assert_eq!(mixed.len(), 2);
        assert!(weights[0] > weights[1]);
    }

    #[test]
    fn max_features_keeps_most_frequent_terms() {
        let vectorizer = TfidfVectorizer::fit(
            &["cable cable cable", "cable adapter", "cable charger charger"],
            2,
        );
        assert_eq!(vectorizer.vocabulary_len(), 2);
        // "adapter" (corpus frequency 1) is the term that gets cut.
        assert!(vectorizer.transform("adapter").is_empty());
        assert!(!vectorizer.transform("cable").is_empty());
        assert!(!vectorizer.transform("charger").is_empty());
    }

    #[test]
    fn unknown_tokens_are_ignored() {
        let vectorizer = TfidfVectorizer::fit(&["known words only"], 100);
        assert!(vectorizer.transform("completely novel").is_empty());
    }
}
