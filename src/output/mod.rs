//! Writers for detection results.
//!
//! - [`gff`]: pseudogene candidates as GFF3 `gene` features
//! - [`summary`]: plain-text run log with settings and counters

pub mod gff;
pub mod summary;

/// Timestamp format used in every output header
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time rendered with [`TIMESTAMP_FORMAT`]
#[must_use]
pub fn current_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}
