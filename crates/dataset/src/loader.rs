//! CSV ingestion for the raw product listing export.

use recommerce_core::types::RawListing;
use recommerce_core::{RecError, RecResult};
use std::path::Path;
use tracing::info;

/// Read the raw listing export at `path`. A missing or unreadable file is
/// reported as `DataUnavailable`; the caller decides what to do about it.
pub fn read_listings(path: &Path) -> RecResult<Vec<RawListing>> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| {
        RecError::DataUnavailable(format!("cannot open {}: {e}", path.display()))
    })?;

    let mut listings = Vec::new();
    for row in reader.deserialize() {
        let listing: RawListing = row
            .map_err(|e| RecError::DataUnavailable(format!("malformed row in {}: {e}", path.display())))?;
        listings.push(listing);
    }

    info!(path = %path.display(), rows = listings.len(), "Loaded raw listings");
    Ok(listings)
}
