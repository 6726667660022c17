//! Collaborative filtering: biased matrix factorization trained with SGD.
//!
//! Rating estimate for a `(user, item)` pair:
//!
//! ```text
//! r̂ = μ + b_u + b_i + p_u · q_i
//! ```
//!
//! where μ is the global rating mean, `b_u`/`b_i` are user and item biases
//! and `p_u`/`q_i` are latent factor rows. Unknown users or items fall back
//! to the terms that are known, bottoming out at the global mean.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use recommerce_core::config::CollaborativeConfig;
use recommerce_core::types::InteractionDataset;
use recommerce_core::{RecError, RecResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvdModel {
    global_mean: f64,
    rating_min: f64,
    rating_max: f64,
    user_index: HashMap<String, usize>,
    item_index: HashMap<String, usize>,
    user_biases: Vec<f64>,
    item_biases: Vec<f64>,
    user_factors: Array2<f64>,
    item_factors: Array2<f64>,
}

impl SvdModel {
    /// Train on every interaction in `dataset` with the given parameters.
    pub fn fit(
        dataset: &InteractionDataset,
        config: &CollaborativeConfig,
        seed: u64,
    ) -> RecResult<Self> {
        if dataset.is_empty() {
            return Err(RecError::Training(
                "cannot fit collaborative model on an empty dataset".to_string(),
            ));
        }
        if config.n_factors == 0 {
            return Err(RecError::Config("n_factors must be positive".to_string()));
        }

        // Index users and items in first-appearance order.
        let mut user_index: HashMap<String, usize> = HashMap::new();
        let mut item_index: HashMap<String, usize> = HashMap::new();
        let mut triples: Vec<(usize, usize, f64)> = Vec::with_capacity(dataset.len());
        for row in &dataset.interactions {
            let next_user = user_index.len();
            let u = *user_index.entry(row.user_id.clone()).or_insert(next_user);
            let next_item = item_index.len();
            let i = *item_index.entry(row.item_id.clone()).or_insert(next_item);
            triples.push((u, i, row.rating));
        }

        let n_users = user_index.len();
        let n_items = item_index.len();
        let n_factors = config.n_factors;
        let global_mean =
            triples.iter().map(|&(_, _, r)| r).sum::<f64>() / triples.len() as f64;

        let normal = Normal::new(0.0, config.init_std)
            .map_err(|e| RecError::Config(format!("invalid init_std: {e}")))?;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut user_factors =
            Array2::from_shape_fn((n_users, n_factors), |_| normal.sample(&mut rng));
        let mut item_factors =
            Array2::from_shape_fn((n_items, n_factors), |_| normal.sample(&mut rng));
        let mut user_biases = vec![0.0; n_users];
        let mut item_biases = vec![0.0; n_items];

        let lr = config.lr_all;
        let reg = config.reg_all;
        for epoch in 0..config.n_epochs {
            let mut sq_err = 0.0;
            for &(u, i, rating) in &triples {
                let mut dot = 0.0;
                for f in 0..n_factors {
                    dot += user_factors[[u, f]] * item_factors[[i, f]];
                }
                let err = rating - (global_mean + user_biases[u] + item_biases[i] + dot);
                sq_err += err * err;

                user_biases[u] += lr * (err - reg * user_biases[u]);
                item_biases[i] += lr * (err - reg * item_biases[i]);
                for f in 0..n_factors {
                    let puf = user_factors[[u, f]];
                    let qif = item_factors[[i, f]];
                    user_factors[[u, f]] += lr * (err * qif - reg * puf);
                    item_factors[[i, f]] += lr * (err * puf - reg * qif);
                }
            }
            debug!(
                epoch,
                rmse = (sq_err / triples.len() as f64).sqrt(),
                "SGD epoch complete"
            );
        }

        info!(
            users = n_users,
            items = n_items,
            factors = n_factors,
            epochs = config.n_epochs,
            "Collaborative model trained"
        );

        Ok(Self {
            global_mean,
            rating_min: config.rating_min,
            rating_max: config.rating_max,
            user_index,
            item_index,
            user_biases,
            item_biases,
            user_factors,
            item_factors,
        })
    }

    /// Point rating estimate for a `(user, item)` pair.
    ///
    /// Never fails: an unknown user drops the user bias and factor terms,
    /// an unknown item drops the item terms, and a pair unseen on both
    /// sides falls back to the global mean. The estimate is clipped to the
    /// rating scale.
    pub fn predict(&self, user_id: &str, item_id: &str) -> f64 {
        let user = self.user_index.get(user_id).copied();
        let item = self.item_index.get(item_id).copied();

        let mut estimate = self.global_mean;
        if let Some(u) = user {
            estimate += self.user_biases[u];
        }
        if let Some(i) = item {
            estimate += self.item_biases[i];
        }
        if let (Some(u), Some(i)) = (user, item) {
            estimate += self.user_factors.row(u).dot(&self.item_factors.row(i));
        }
        estimate.clamp(self.rating_min, self.rating_max)
    }

    pub fn global_mean(&self) -> f64 {
        self.global_mean
    }

    pub fn n_users(&self) -> usize {
        self.user_index.len()
    }

    pub fn n_items(&self) -> usize {
        self.item_index.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recommerce_core::types::Interaction;

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

    fn small_config() -> CollaborativeConfig {
        CollaborativeConfig {
            n_factors: 4,
            n_epochs: 60,
            lr_all: 0.01,
            reg_all: 0.02,
            rating_min: 0.0,
            rating_max: 5.0,
            init_std: 0.1,
        }
    }

    #[test]
    fn fits_observed_ratings() {
        let data = dataset(&[
            ("u1", "p1", 5.0),
            ("u1", "p2", 1.0),
            ("u2", "p1", 5.0),
            ("u2", "p2", 1.0),
            ("u3", "p1", 4.0),
        ]);
        let model = SvdModel::fit(&data, &small_config(), 42).unwrap();

        // Both items have consistent ratings, so the fit should separate them.
        assert!(model.predict("u1", "p1") > model.predict("u1", "p2"));
        assert!(model.predict("u3", "p1") > 3.0);
    }

    #[test]
    fn unknown_user_and_item_fall_back_to_global_mean() {
        let data = dataset(&[("u1", "p1", 4.0), ("u2", "p2", 2.0)]);
        let model = SvdModel::fit(&data, &small_config(), 1).unwrap();
        let estimate = model.predict("stranger", "unseen-item");
        assert!((estimate - model.global_mean()).abs() < 1e-12);
    }

    #[test]
    fn cold_start_never_panics_and_stays_in_scale() {
        let data = dataset(&[("u1", "p1", 5.0), ("u2", "p1", 5.0)]);
        let model = SvdModel::fit(&data, &small_config(), 9).unwrap();
        for (user, item) in [("u1", "nope"), ("ghost", "p1"), ("ghost", "nope")] {
            let estimate = model.predict(user, item);
            assert!((0.0..=5.0).contains(&estimate));
        }
    }

    #[test]
    fn training_is_deterministic_for_a_seed() {
        let data = dataset(&[
            ("u1", "p1", 5.0),
            ("u2", "p2", 3.0),
            ("u3", "p3", 1.0),
            ("u1", "p2", 4.0),
        ]);
        let a = SvdModel::fit(&data, &small_config(), 123).unwrap();
        let b = SvdModel::fit(&data, &small_config(), 123).unwrap();
        assert_eq!(a.predict("u1", "p3"), b.predict("u1", "p3"));
    }

    #[test]
    fn empty_dataset_is_a_training_error() {
        let err = SvdModel::fit(&dataset(&[]), &small_config(), 0).unwrap_err();
        assert!(matches!(err, RecError::Training(_)));
    }

    #[test]
    fn survives_serde_round_trip() {
        let data = dataset(&[("u1", "p1", 4.0), ("u2", "p2", 2.0)]);
        let model = SvdModel::fit(&data, &small_config(), 5).unwrap();
        let json = serde_json::to_string(&model).unwrap();
        let restored: SvdModel = serde_json::from_str(&json).unwrap();
        assert_eq!(model.predict("u1", "p2"), restored.predict("u1", "p2"));
    }
}
