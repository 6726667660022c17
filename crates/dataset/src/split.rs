//! Seeded train/test split of the interaction table.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use recommerce_core::types::InteractionDataset;
use recommerce_core::{RecError, RecResult};
use tracing::info;

/// Shuffle the rows with a seeded RNG and split off a `test_size` fraction.
/// Deterministic for a given `(dataset, test_size, seed)`.
pub fn train_test_split(
    dataset: &InteractionDataset,
    test_size: f64,
    seed: u64,
) -> RecResult<(InteractionDataset, InteractionDataset)> {
    if !(0.0..1.0).contains(&test_size) {
        return Err(RecError::Config(format!(
            "test_size must be in [0, 1), got {test_size}"
        )));
    }

    let mut indices: Vec<usize> = (0..dataset.interactions.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = (dataset.interactions.len() as f64 * test_size).round() as usize;
    let (test_indices, train_indices) = indices.split_at(n_test);

    let subset = |picked: &[usize]| InteractionDataset {
        interactions: picked
            .iter()
            .map(|&i| dataset.interactions[i].clone())
            .collect(),
        numeric_columns: dataset.numeric_columns.clone(),
        text_columns: dataset.text_columns.clone(),
    };

    let train = subset(train_indices);
    let test = subset(test_indices);
    info!(train = train.len(), test = test.len(), "Split interaction data");
    Ok((train, test))
}
