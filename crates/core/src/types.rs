//! Shared data model: raw and cleaned listing rows, the interaction
//! dataset consumed by the models, and the recommendation output types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use uuid::Uuid;

/// Scoring strategy selected explicitly by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Collaborative,
    ContentBased,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Collaborative => write!(f, "collaborative"),
            Strategy::ContentBased => write!(f, "content_based"),
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "collaborative" | "cf" => Ok(Strategy::Collaborative),
            "content_based" | "content-based" | "cbf" => Ok(Strategy::ContentBased),
            other => Err(format!(
                "unknown strategy '{other}' (expected 'collaborative' or 'content_based')"
            )),
        }
    }
}

/// One row of the raw product listing export, exactly as it appears in the
/// source CSV. Prices and counts are unparsed strings; `user_id`,
/// `user_name` and `review_title` hold comma-separated per-reviewer lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawListing {
    pub product_id: String,
    pub product_name: String,
    pub category: String,
    pub discounted_price: String,
    pub actual_price: String,
    pub discount_percentage: String,
    pub rating: String,
    pub rating_count: String,
    pub about_product: String,
    pub user_id: String,
    pub user_name: String,
    pub review_id: String,
    pub review_title: String,
    pub review_content: String,
    pub img_link: String,
    pub product_link: String,
}

/// A listing row after cleaning: currency and percent markers stripped,
/// numerics parsed, free text lowercased with punctuation removed. The
/// per-reviewer list fields are still unsplit at this stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanListing {
    pub product_id: String,
    pub product_name: String,
    pub category: String,
    pub discounted_price: f64,
    pub actual_price: f64,
    pub discount_percentage: f64,
    pub rating: f64,
    pub rating_count: u64,
    pub about_product: String,
    pub user_id: String,
    pub user_name: String,
    pub review_id: String,
    pub review_title: String,
    pub review_content: String,
}

/// One observed user-item interaction with its engineered features.
///
/// `numeric` holds the model-facing numeric columns (including one-hot
/// category indicators); `text` holds the free-text feature columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub user_id: String,
    pub item_id: String,
    pub rating: f64,
    pub numeric: HashMap<String, f64>,
    pub text: HashMap<String, String>,
}

/// The finalized interaction table: one row per user-item interaction,
/// with a fixed set of feature columns. Immutable once built; the serving
/// side only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionDataset {
    pub interactions: Vec<Interaction>,
    /// Ordered numeric feature column names shared by every row.
    pub numeric_columns: Vec<String>,
    /// Ordered text feature column names shared by every row.
    pub text_columns: Vec<String>,
}

impl InteractionDataset {
    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    /// Distinct item ids, in first-appearance order.
    pub fn item_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.interactions
            .iter()
            .filter(|row| seen.insert(row.item_id.as_str()))
            .map(|row| row.item_id.as_str())
            .collect()
    }

    /// Items the given user has interacted with. Matching is exact,
    /// case-sensitive string equality on the user id.
    pub fn items_seen_by(&self, user_id: &str) -> HashSet<&str> {
        self.interactions
            .iter()
            .filter(|row| row.user_id == user_id)
            .map(|row| row.item_id.as_str())
            .collect()
    }
}

/// A single ranked recommendation. Produced fresh per request, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub item_id: String,
    pub predicted_rating: f64,
}

/// Envelope around one recommendation request's results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub request_id: Uuid,
    pub user_id: String,
    pub strategy: Strategy,
    pub items: Vec<Recommendation>,
    pub generated_at: DateTime<Utc>,
}
