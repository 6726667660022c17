//! Feature engineering: reviewer fan-out, category extraction and one-hot
//! encoding into the finalized interaction table.

use recommerce_core::types::{CleanListing, Interaction, InteractionDataset};
use std::collections::{BTreeSet, HashMap};
use tracing::info;

pub const COL_DISCOUNTED_PRICE: &str = "discounted_price";
pub const COL_DISCOUNT_PERCENTAGE: &str = "discount_percentage";
pub const COL_REVIEW_TITLE: &str = "review_title";
const ONE_HOT_PREFIX: &str = "first_category_";

/// Fan a listing out into one row per reviewer.
///
/// `user_id`, `user_name` and `review_title` are parallel comma-separated
/// lists; zipping stops at the shortest list. A single raw listing thus
/// becomes several interaction rows, one per reviewer.
pub fn split_reviewers(listing: &CleanListing) -> Vec<CleanListing> {
    let ids: Vec<&str> = listing.user_id.split(',').collect();
    let names: Vec<&str> = listing.user_name.split(',').collect();
    let titles: Vec<&str> = listing.review_title.split(',').collect();

    let count = ids.len().min(names.len()).min(titles.len());
    (0..count)
        .map(|i| {
            let mut row = listing.clone();
            row.user_id = ids[i].to_string();
            row.user_name = names[i].to_string();
            row.review_title = titles[i].to_string();
            row
        })
        .collect()
}

/// First and last segment of a `|`-separated category path.
pub fn first_last_category(category: &str) -> (String, String) {
    let mut segments = category.split('|');
    let first = segments.next().unwrap_or_default().to_string();
    let last = segments.last().unwrap_or_else(|| first.as_str()).to_string();
    (first, last)
}

/// Build the finalized interaction table from per-reviewer rows.
///
/// The first category segment is one-hot encoded into
/// `first_category_<value>` columns (sorted for a stable column order);
/// `discounted_price` and `discount_percentage` are carried as numeric
/// features and `review_title` as the text feature. Everything else the
/// models do not consume is dropped here.
pub fn encode_dataset(rows: &[CleanListing]) -> InteractionDataset {
    let categories: BTreeSet<String> = rows
        .iter()
        .map(|row| first_last_category(&row.category).0)
        .collect();

    let mut numeric_columns = vec![
        COL_DISCOUNTED_PRICE.to_string(),
        COL_DISCOUNT_PERCENTAGE.to_string(),
    ];
    numeric_columns.extend(
        categories
            .iter()
            .map(|category| format!("{ONE_HOT_PREFIX}{category}")),
    );

    let interactions: Vec<Interaction> = rows
        .iter()
        .map(|row| {
            let (first, _last) = first_last_category(&row.category);
            let mut numeric = HashMap::with_capacity(numeric_columns.len());
            numeric.insert(COL_DISCOUNTED_PRICE.to_string(), row.discounted_price);
            numeric.insert(
                COL_DISCOUNT_PERCENTAGE.to_string(),
                row.discount_percentage,
            );
            for category in &categories {
                let value = if *category == first { 1.0 } else { 0.0 };
                numeric.insert(format!("{ONE_HOT_PREFIX}{category}"), value);
            }

            let mut text = HashMap::with_capacity(1);
            text.insert(COL_REVIEW_TITLE.to_string(), row.review_title.clone());

            Interaction {
                user_id: row.user_id.clone(),
                item_id: row.product_id.clone(),
                rating: row.rating,
                numeric,
                text,
            }
        })
        .collect();

    info!(
        rows = interactions.len(),
        numeric_columns = numeric_columns.len(),
        "Encoded interaction dataset"
    );

    InteractionDataset {
        interactions,
        numeric_columns,
        text_columns: vec![COL_REVIEW_TITLE.to_string()],
    }
}
