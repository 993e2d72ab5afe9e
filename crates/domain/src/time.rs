//! Time and timestamp helpers.

use chrono::{DateTime, SecondsFormat, Utc};

/// UTC timestamp used for `generated_at`, `modified_at` and backup names.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Format a timestamp the way the platform writes `modified_at`
/// (`2024-05-01T10:20:30.123456+00:00`).
#[must_use]
pub fn format_modified_at(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Suffix appended to backup copies (`20240501_102030`).
#[must_use]
pub fn format_backup_suffix(ts: Timestamp) -> String {
    ts.format("%Y%m%d_%H%M%S").to_string()
}
