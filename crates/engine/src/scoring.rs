//! Scoring adapters: pointwise collaborative scoring and batched
//! content-based scoring, both producing `(item_id, score)` pairs.

use rayon::prelude::*;
use recommerce_core::types::{Interaction, InteractionDataset};
use recommerce_core::RecResult;
use recommerce_models::{ContentPipeline, FeatureRow, SvdModel};
use std::collections::HashSet;
use tracing::debug;

/// Score every candidate with one pointwise model call per `(user, item)`
/// pair. The calls are pure and run in parallel; `collect` restores the
/// candidate order. Cold-start pairs surface whatever estimate the model
/// falls back to.
pub fn score_collaborative(
    model: &SvdModel,
    user_id: &str,
    candidates: &[String],
) -> Vec<(String, f64)> {
    debug!(candidates = candidates.len(), "Scoring with collaborative model");
    candidates
        .par_iter()
        .map(|item_id| (item_id.clone(), model.predict(user_id, item_id)))
        .collect()
}

/// Score candidates by item content in one batched pipeline call.
///
/// Every interaction row whose item is in the candidate pool contributes a
/// feature row (so an item can appear more than once; the ranker
/// de-duplicates). Rating and user identity never reach the pipeline —
/// only each row's feature maps are passed. Scores are zipped back to item
/// ids by position, relying on the pipeline's order-preserving contract.
pub fn score_content_based(
    pipeline: &ContentPipeline,
    dataset: &InteractionDataset,
    candidates: &[String],
) -> RecResult<Vec<(String, f64)>> {
    let candidate_set: HashSet<&str> = candidates.iter().map(String::as_str).collect();
    let rows: Vec<&Interaction> = dataset
        .interactions
        .iter()
        .filter(|row| candidate_set.contains(row.item_id.as_str()))
        .collect();

    debug!(
        candidates = candidates.len(),
        feature_rows = rows.len(),
        "Scoring with content-based pipeline"
    );

    let features: Vec<FeatureRow<'_>> = rows
        .iter()
        .map(|row| FeatureRow {
            numeric: &row.numeric,
            text: &row.text,
        })
        .collect();
    let scores = pipeline.predict_batch(&features)?;

    Ok(rows
        .iter()
        .zip(scores)
        .map(|(row, score)| (row.item_id.clone(), score))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use recommerce_core::config::CollaborativeConfig;
    use recommerce_core::types::Interaction;
    use std::collections::HashMap;

    fn dataset(rows: &[(&str, &str, f64)]) -> InteractionDataset {
        InteractionDataset {
            interactions: rows
                .iter()
                .map(|&(user, item, rating)| Interaction {
                    user_id: user.to_string(),
                    item_id: item.to_string(),
                    rating,
                    numeric: HashMap::new(),
                    text: HashMap::new(),
                })
                .collect(),
            numeric_columns: vec![],
            text_columns: vec![],
        }
    }

    #[test]
    fn collaborative_scores_keep_candidate_order_and_count() {
        let data = dataset(&[
            ("u1", "p1", 5.0),
            ("u2", "p2", 3.0),
            ("u2", "p3", 1.0),
        ]);
        let config = CollaborativeConfig {
            n_factors: 2,
            n_epochs: 10,
            ..CollaborativeConfig::default()
        };
        let model = SvdModel::fit(&data, &config, 42).unwrap();

        let candidates = vec!["p3".to_string(), "p1".to_string(), "p2".to_string()];
        let scored = score_collaborative(&model, "u1", &candidates);

        assert_eq!(scored.len(), 3);
        let ids: Vec<&str> = scored.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["p3", "p1", "p2"]);
        // Cold-start pairs still surface a score.
        let unseen = score_collaborative(&model, "ghost", &candidates);
        assert!(unseen.iter().all(|(_, score)| score.is_finite()));
    }
}
