//! Candidate selection: the unseen-item pool for a user.

use recommerce_core::types::InteractionDataset;

/// Items the user has not interacted with, in catalog (first-appearance)
/// order.
///
/// Matching is exact, case-sensitive string equality on the user id, so an
/// id that differs only in case or whitespace counts as a brand-new user
/// and receives the full catalog. Pure function of its inputs.
pub fn select_candidates(user_id: &str, dataset: &InteractionDataset) -> Vec<String> {
    let seen = dataset.items_seen_by(user_id);
    dataset
        .item_ids()
        .into_iter()
        .filter(|item| !seen.contains(item))
        .map(str::to_string)
        .collect()
}
