//! Content-based rating pipeline: numeric standardization and text tf-idf
//! feeding a gradient-boosted regressor. The pipeline scores items by their
//! own attributes only; it carries no notion of user identity.

use crate::boosting::GradientBoostedRegressor;
use crate::scaler::StandardScaler;
use crate::tfidf::TfidfVectorizer;
use recommerce_core::config::ContentConfig;
use recommerce_core::types::InteractionDataset;
use recommerce_core::{RecError, RecResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// One item feature row submitted for scoring: the item's numeric and text
/// attributes, with rating and user identity already stripped.
#[derive(Debug, Clone, Copy)]
pub struct FeatureRow<'a> {
    pub numeric: &'a HashMap<String, f64>,
    pub text: &'a HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentPipeline {
    numeric_features: Vec<String>,
    text_feature: String,
    scaler: StandardScaler,
    vectorizer: TfidfVectorizer,
    regressor: GradientBoostedRegressor,
}

impl ContentPipeline {
    /// Fit the preprocessing stages and the regressor on the training
    /// split, using `rating` as the target.
    pub fn fit(train: &InteractionDataset, config: &ContentConfig) -> RecResult<Self> {
        if train.is_empty() {
            return Err(RecError::Training(
                "cannot fit content pipeline on an empty dataset".to_string(),
            ));
        }
        for column in &config.numeric_features {
            if !train.numeric_columns.contains(column) {
                return Err(RecError::Config(format!(
                    "numeric feature column '{column}' is not present in the dataset"
                )));
            }
        }
        if !train.text_columns.contains(&config.text_feature) {
            return Err(RecError::Config(format!(
                "text feature column '{}' is not present in the dataset",
                config.text_feature
            )));
        }

        // One-hot columns ride along with the configured numerics.
        let numeric_features: Vec<String> = config
            .numeric_features
            .iter()
            .cloned()
            .chain(
                train
                    .numeric_columns
                    .iter()
                    .filter(|column| !config.numeric_features.contains(column))
                    .cloned(),
            )
            .collect();

        let mut numeric_rows = Vec::with_capacity(train.len());
        let mut documents = Vec::with_capacity(train.len());
        let mut targets = Vec::with_capacity(train.len());
        for (index, row) in train.interactions.iter().enumerate() {
            let mut numeric = Vec::with_capacity(numeric_features.len());
            for column in &numeric_features {
                let value = row.numeric.get(column).copied().ok_or_else(|| {
                    RecError::Config(format!(
                        "training row {index} is missing numeric column '{column}'"
                    ))
                })?;
                numeric.push(value);
            }
            let document = row.text.get(&config.text_feature).ok_or_else(|| {
                RecError::Config(format!(
                    "training row {index} is missing text column '{}'",
                    config.text_feature
                ))
            })?;
            numeric_rows.push(numeric);
            documents.push(document.clone());
            targets.push(row.rating);
        }

        let scaler = StandardScaler::fit(&numeric_rows, numeric_features.len());
        let vectorizer = TfidfVectorizer::fit(&documents, config.max_features);

        let matrix: Vec<Vec<f64>> = numeric_rows
            .iter()
            .zip(documents.iter())
            .map(|(numeric, document)| {
                assemble(
                    &scaler.transform_row(numeric),
                    &vectorizer.transform(document),
                    vectorizer.vocabulary_len(),
                )
            })
            .collect();

        let regressor = GradientBoostedRegressor::fit(
            &matrix,
            &targets,
            config.n_estimators,
            config.learning_rate,
            config.max_depth,
        )?;

        info!(
            rows = train.len(),
            numeric = numeric_features.len(),
            vocabulary = vectorizer.vocabulary_len(),
            "Content pipeline trained"
        );

        Ok(Self {
            numeric_features,
            text_feature: config.text_feature.clone(),
            scaler,
            vectorizer,
            regressor,
        })
    }

    /// Score a batch of feature rows. Output index `i` corresponds to
    /// input row `i`.
    ///
    /// Every row is validated against the pipeline's declared feature
    /// columns before any model math runs; a missing column is a
    /// configuration error naming the column, not a downstream panic.
    pub fn predict_batch(&self, rows: &[FeatureRow<'_>]) -> RecResult<Vec<f64>> {
        for (index, row) in rows.iter().enumerate() {
            for column in &self.numeric_features {
                if !row.numeric.contains_key(column) {
                    return Err(RecError::Config(format!(
                        "feature row {index} is missing numeric column '{column}'"
                    )));
                }
            }
            if !row.text.contains_key(&self.text_feature) {
                return Err(RecError::Config(format!(
                    "feature row {index} is missing text column '{}'",
                    self.text_feature
                )));
            }
        }

        Ok(rows
            .iter()
            .map(|row| {
                let numeric: Vec<f64> = self
                    .numeric_features
                    .iter()
                    .map(|column| row.numeric[column])
                    .collect();
                let document = &row.text[&self.text_feature];
                let features = assemble(
                    &self.scaler.transform_row(&numeric),
                    &self.vectorizer.transform(document),
                    self.vectorizer.vocabulary_len(),
                );
                self.regressor.predict_row(&features)
            })
            .collect())
    }
}

/// Dense feature vector: scaled numerics followed by the tf-idf block.
fn assemble(scaled: &[f64], sparse_text: &[(usize, f64)], vocabulary_len: usize) -> Vec<f64> {
    let mut features = Vec::with_capacity(scaled.len() + vocabulary_len);
    features.extend_from_slice(scaled);
    features.resize(scaled.len() + vocabulary_len, 0.0);
    for &(index, weight) in sparse_text {
        features[scaled.len() + index] = weight;
    }
    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use recommerce_core::types::Interaction;

    fn row(item: &str, rating: f64, price: f64, title: &str) -> Interaction {
        let mut numeric = HashMap::new();
        numeric.insert("discounted_price".to_string(), price);
        numeric.insert("discount_percentage".to_string(), 50.0);
        let mut text = HashMap::new();
        text.insert("review_title".to_string(), title.to_string());
        Interaction {
            user_id: "u1".to_string(),
            item_id: item.to_string(),
            rating,
            numeric,
            text,
        }
    }

    fn train_data() -> InteractionDataset {
        InteractionDataset {
            interactions: vec![
                row("p1", 5.0, 100.0, "excellent quality cable"),
                row("p2", 5.0, 120.0, "excellent cable"),
                row("p3", 1.0, 900.0, "broke immediately"),
                row("p4", 1.0, 950.0, "broke after one day"),
                row("p5", 4.5, 150.0, "good quality"),
                row("p6", 1.5, 800.0, "stopped working"),
            ],
            numeric_columns: vec![
                "discounted_price".to_string(),
                "discount_percentage".to_string(),
            ],
            text_columns: vec!["review_title".to_string()],
        }
    }

    fn small_config() -> ContentConfig {
        ContentConfig {
            numeric_features: vec![
                "discounted_price".to_string(),
                "discount_percentage".to_string(),
            ],
            text_feature: "review_title".to_string(),
            max_features: 100,
            n_estimators: 30,
            learning_rate: 0.2,
            max_depth: 3,
        }
    }

    #[test]
    fn separates_well_reviewed_cheap_items_from_bad_expensive_ones() {
        let pipeline = ContentPipeline::fit(&train_data(), &small_config()).unwrap();
        let good = row("x", 0.0, 110.0, "excellent quality");
        let bad = row("y", 0.0, 920.0, "broke");
        let scores = pipeline
            .predict_batch(&[
                FeatureRow {
                    numeric: &good.numeric,
                    text: &good.text,
                },
                FeatureRow {
                    numeric: &bad.numeric,
                    text: &bad.text,
                },
            ])
            .unwrap();
        assert!(scores[0] > scores[1]);
    }

    #[test]
    fn batch_output_preserves_row_order() {
        let pipeline = ContentPipeline::fit(&train_data(), &small_config()).unwrap();
        let a = row("a", 0.0, 100.0, "excellent quality cable");
        let b = row("b", 0.0, 900.0, "broke immediately");

        let forward = pipeline
            .predict_batch(&[
                FeatureRow {
                    numeric: &a.numeric,
                    text: &a.text,
                },
                FeatureRow {
                    numeric: &b.numeric,
                    text: &b.text,
                },
            ])
            .unwrap();
        let reversed = pipeline
            .predict_batch(&[
                FeatureRow {
                    numeric: &b.numeric,
                    text: &b.text,
                },
                FeatureRow {
                    numeric: &a.numeric,
                    text: &a.text,
                },
            ])
            .unwrap();

        assert_eq!(forward.len(), 2);
        assert_eq!(forward[0], reversed[1]);
        assert_eq!(forward[1], reversed[0]);
    }

    #[test]
    fn missing_numeric_column_is_a_config_error() {
        let pipeline = ContentPipeline::fit(&train_data(), &small_config()).unwrap();
        let mut incomplete = row("x", 0.0, 100.0, "fine");
        incomplete.numeric.remove("discount_percentage");
        let err = pipeline
            .predict_batch(&[FeatureRow {
                numeric: &incomplete.numeric,
                text: &incomplete.text,
            }])
            .unwrap_err();
        match err {
            RecError::Config(message) => assert!(message.contains("discount_percentage")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn missing_text_column_is_a_config_error() {
        let pipeline = ContentPipeline::fit(&train_data(), &small_config()).unwrap();
        let mut incomplete = row("x", 0.0, 100.0, "fine");
        incomplete.text.clear();
        let err = pipeline
            .predict_batch(&[FeatureRow {
                numeric: &incomplete.numeric,
                text: &incomplete.text,
            }])
            .unwrap_err();
        assert!(matches!(err, RecError::Config(_)));
    }

    #[test]
    fn fit_rejects_unknown_feature_columns() {
        let mut config = small_config();
        config.numeric_features.push("nonexistent".to_string());
        let err = ContentPipeline::fit(&train_data(), &config).unwrap_err();
        assert!(matches!(err, RecError::Config(_)));
    }
}
