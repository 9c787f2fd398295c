//! Record source: the built-in seed set or a JSON file.

use std::fs;
use std::path::Path;

use tracing::info;

use super::record::FileRecord;
use crate::{AskarError, Result};

const ICON_BASE: &str = "https://www.gstatic.com/images/icons/material/system/2x";

/// The built-in seed collection.
pub fn default_records() -> Vec<FileRecord> {
    vec![
        FileRecord::new(1, "AI Ethics Assignment.pdf")
            .with_owner("professor@aub.edu.lb")
            .with_location("My Drive")
            .with_date_uploaded("2025-11-05T00:00:00Z")
            .with_last_accessed_at("2023-11-10T00:00:00Z")
            .starred(true)
            .with_icon(format!("{ICON_BASE}/picture_as_pdf_black_24dp.png")),
        FileRecord::new(2, "Group Project Slides.pptx")
            .with_owner("teamleader@gmail.com")
            .with_location("Shared with me")
            .with_date_uploaded("2023-01-24T00:00:00Z")
            .with_last_accessed_at("2025-11-08T00:00:00Z")
            .with_icon(format!("{ICON_BASE}/slideshow_black_24dp.png")),
        FileRecord::new(3, "Research Data Sheet.xlsx")
            .with_owner("labassistant@aub.edu.lb")
            .with_location("My Drive")
            .with_date_uploaded("2025-10-05T00:00:00Z")
            .with_last_accessed_at("2025-11-11T00:00:00Z")
            .starred(true)
            .with_icon(format!("{ICON_BASE}/grid_on_black_24dp.png")),
        FileRecord::new(4, "Old Notes.txt")
            .with_owner("me")
            .with_location("My Drive")
            .with_date_uploaded("2022-05-15T00:00:00Z")
            .with_last_accessed_at("2022-05-15T00:00:00Z")
            .deleted(true)
            .with_icon(format!("{ICON_BASE}/description_black_24dp.png")),
    ]
}

/// Parse a JSON array of records.
pub fn parse_records(json: &str) -> Result<Vec<FileRecord>> {
    serde_json::from_str(json)
        .map_err(|e| AskarError::Validation(format!("invalid seed data: {e}")))
}

/// Load records from a JSON file.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<FileRecord>> {
    let content = fs::read_to_string(path.as_ref())?;
    parse_records(&content)
}

/// Records for a configured seed path; an empty path means the built-in set.
pub fn load_records(seed_path: &str) -> Result<Vec<FileRecord>> {
    if seed_path.trim().is_empty() {
        return Ok(default_records());
    }
    let records = load_from_file(seed_path)?;
    info!(path = seed_path, count = records.len(), "Loaded seed records");
    Ok(records)
}
