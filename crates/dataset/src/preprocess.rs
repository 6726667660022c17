//! Row cleaning: currency and numeric parsing plus text normalization.
//!
//! Rows with unparseable numerics or missing identifiers are dropped, the
//! way the upstream export job drops incomplete rows.

use recommerce_core::types::{CleanListing, RawListing};
use regex::Regex;
use std::sync::OnceLock;
use tracing::info;

fn punctuation() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s]").expect("static pattern"))
}

// `review_title` still carries its comma-separated per-reviewer list at this
// stage; the commas must survive until the fan-out splits on them.
fn punctuation_except_commas() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s,]").expect("static pattern"))
}

fn parse_price(raw: &str) -> Option<f64> {
    raw.trim().replace('₹', "").replace(',', "").parse().ok()
}

fn parse_percent(raw: &str) -> Option<f64> {
    raw.trim().trim_end_matches('%').replace(',', "").parse().ok()
}

fn parse_count(raw: &str) -> Option<u64> {
    raw.trim().replace(',', "").parse().ok()
}

/// Lowercase and strip punctuation from a free-text field.
fn normalize_text(raw: &str) -> String {
    punctuation().replace_all(raw, "").to_lowercase()
}

/// Clean a single raw row. `None` means the row is dropped.
pub fn clean_listing(raw: &RawListing) -> Option<CleanListing> {
    if raw.product_id.is_empty()
        || raw.user_id.is_empty()
        || raw.category.is_empty()
        || raw.review_title.is_empty()
    {
        return None;
    }

    let rating: f64 = raw.rating.trim().parse().ok()?;
    if !rating.is_finite() {
        return None;
    }

    Some(CleanListing {
        product_id: raw.product_id.clone(),
        product_name: raw.product_name.to_lowercase(),
        category: raw.category.clone(),
        discounted_price: parse_price(&raw.discounted_price)?,
        actual_price: parse_price(&raw.actual_price)?,
        discount_percentage: parse_percent(&raw.discount_percentage)?,
        rating,
        rating_count: parse_count(&raw.rating_count)?,
        about_product: normalize_text(&raw.about_product),
        user_id: raw.user_id.clone(),
        user_name: raw.user_name.clone(),
        review_id: raw.review_id.clone(),
        review_title: punctuation_except_commas()
            .replace_all(&raw.review_title, "")
            .to_lowercase(),
        review_content: normalize_text(&raw.review_content),
    })
}

/// Clean every row, dropping the ones that fail parsing.
pub fn clean_listings(raw: Vec<RawListing>) -> Vec<CleanListing> {
    let total = raw.len();
    let cleaned: Vec<CleanListing> = raw.iter().filter_map(clean_listing).collect();
    info!(
        kept = cleaned.len(),
        dropped = total - cleaned.len(),
        "Preprocessed listings"
    );
    cleaned
}
