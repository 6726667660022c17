//! Gradient-boosted regression trees over dense feature matrices.
//!
//! Squared-error boosting: start from the target mean, then repeatedly fit
//! a depth-limited regression tree to the current residuals and fold its
//! predictions in scaled by the learning rate.

use recommerce_core::{RecError, RecResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    root: Node,
}

impl RegressionTree {
    fn fit(x: &[Vec<f64>], targets: &[f64], indices: &[usize], max_depth: usize) -> Self {
        Self {
            root: grow(x, targets, indices, max_depth),
        }
    }

    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row.get(*feature).copied().unwrap_or(0.0) <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

fn mean(targets: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| targets[i]).sum::<f64>() / indices.len() as f64
}

fn grow(x: &[Vec<f64>], targets: &[f64], indices: &[usize], depth_left: usize) -> Node {
    if depth_left == 0 || indices.len() < 2 {
        return Node::Leaf {
            value: mean(targets, indices),
        };
    }

    match best_split(x, targets, indices) {
        None => Node::Leaf {
            value: mean(targets, indices),
        },
        Some((feature, threshold)) => {
            let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .copied()
                .partition(|&i| x[i][feature] <= threshold);
            Node::Split {
                feature,
                threshold,
                left: Box::new(grow(x, targets, &left_indices, depth_left - 1)),
                right: Box::new(grow(x, targets, &right_indices, depth_left - 1)),
            }
        }
    }
}

/// Exhaustive best split by summed squared error. Returns `None` when no
/// feature separates the rows (all values identical).
fn best_split(x: &[Vec<f64>], targets: &[f64], indices: &[usize]) -> Option<(usize, f64)> {
    let n_features = x.first().map(Vec::len).unwrap_or(0);
    let n = indices.len() as f64;
    let total_sum: f64 = indices.iter().map(|&i| targets[i]).sum();
    let total_sq: f64 = indices.iter().map(|&i| targets[i] * targets[i]).sum();

    let mut best: Option<(f64, usize, f64)> = None;
    let mut order = indices.to_vec();
    for feature in 0..n_features {
        order.sort_by(|&a, &b| {
            x[a][feature]
                .partial_cmp(&x[b][feature])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for position in 0..order.len() - 1 {
            let i = order[position];
            left_sum += targets[i];
            left_sq += targets[i] * targets[i];

            let here = x[i][feature];
            let next = x[order[position + 1]][feature];
            if here == next {
                continue;
            }

            let left_n = (position + 1) as f64;
            let right_n = n - left_n;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let sse = (left_sq - left_sum * left_sum / left_n)
                + (right_sq - right_sum * right_sum / right_n);

            let threshold = (here + next) / 2.0;
            if best.map_or(true, |(best_sse, _, _)| sse < best_sse) {
                best = Some((sse, feature, threshold));
            }
        }
    }

    best.map(|(_, feature, threshold)| (feature, threshold))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostedRegressor {
    init: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
}

impl GradientBoostedRegressor {
    pub fn fit(
        x: &[Vec<f64>],
        y: &[f64],
        n_estimators: usize,
        learning_rate: f64,
        max_depth: usize,
    ) -> RecResult<Self> {
        if x.is_empty() || x.len() != y.len() {
            return Err(RecError::Training(format!(
                "boosted regressor needs matching non-empty x/y, got {}x{} rows",
                x.len(),
                y.len()
            )));
        }

        let init = y.iter().sum::<f64>() / y.len() as f64;
        let indices: Vec<usize> = (0..x.len()).collect();
        let mut predictions = vec![init; y.len()];
        let mut trees = Vec::with_capacity(n_estimators);

        for round in 0..n_estimators {
            let residuals: Vec<f64> = y
                .iter()
                .zip(predictions.iter())
                .map(|(target, prediction)| target - prediction)
                .collect();

            let tree = RegressionTree::fit(x, &residuals, &indices, max_depth);
            for (row, prediction) in x.iter().zip(predictions.iter_mut()) {
                *prediction += learning_rate * tree.predict_row(row);
            }
            trees.push(tree);

            if round % 10 == 0 {
                let mse: f64 = y
                    .iter()
                    .zip(predictions.iter())
                    .map(|(target, prediction)| (target - prediction).powi(2))
                    .sum::<f64>()
                    / y.len() as f64;
                debug!(round, mse, "Boosting round complete");
            }
        }

        info!(
            trees = trees.len(),
            learning_rate, max_depth, "Boosted regressor trained"
        );

        Ok(Self {
            init,
            learning_rate,
            trees,
        })
    }

    pub fn predict_row(&self, row: &[f64]) -> f64 {
        self.init
            + self.learning_rate
                * self
                    .trees
                    .iter()
                    .map(|tree| tree.predict_row(row))
                    .sum::<f64>()
    }
}
