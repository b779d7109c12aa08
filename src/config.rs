//! Application-level defaults shared by the dashboard and the generator.

pub const APP_NAME: &str = "Dental Clinic Dashboard";

/// CSV the generator writes and the dashboard reads when no path is given.
pub const DATA_FILE: &str = "dental_data.csv";

/// Environment variable overriding [`DATA_FILE`] for the dashboard.
pub const DATA_FILE_ENV: &str = "DENTAL_DATA_FILE";

/// Suggested file names for exports from the dashboard.
pub const FILTERED_EXPORT_FILE: &str = "filtered_dental_data.csv";
pub const SUMMARY_EXPORT_FILE: &str = "dental_summary.json";

/// Generator defaults.
pub const DEFAULT_ROWS: usize = 250;
pub const DEFAULT_WINDOW_DAYS: i64 = 180;
pub const FIRST_ID: u64 = 1000;

/// Upper bounds the generator accepts for `rows` and `window_days`.
pub const MAX_ROWS: usize = 1_000_000;
pub const MAX_WINDOW_DAYS: i64 = 36_500;
