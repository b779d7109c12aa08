use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use thiserror::Error;

use super::model::{AppointmentDataset, AppointmentRecord, COLUMNS};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Everything that can stop a file from producing a usable dataset.
///
/// None of these are fatal to the dashboard: callers show the message and
/// treat the dataset as empty.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data file not found at {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("CSV is missing the '{0}' column")]
    MissingColumn(&'static str),

    #[error("no valid appointment rows ({dropped} rows dropped)")]
    EmptyDataset { dropped: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load an appointment dataset from a `.csv` file.
pub fn load_file(path: &Path) -> Result<AppointmentDataset, LoadError> {
    if !path.exists() {
        return Err(LoadError::SourceMissing(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "csv" {
        return Err(LoadError::UnsupportedExtension(ext));
    }

    let file = std::fs::File::open(path)?;
    let dataset = load_reader(file)?;
    log::info!(
        "Loaded {} appointments from {} ({} rows dropped)",
        dataset.len(),
        path.display(),
        dataset.dropped_rows
    );
    Ok(dataset)
}

/// Parse CSV text from any reader.
///
/// Rows that fail to parse or validate are skipped and counted in
/// [`AppointmentDataset::dropped_rows`]. Later rows repeating an
/// `Appointment ID` are dropped as well.
pub fn load_reader<R: Read>(source: R) -> Result<AppointmentDataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    for column in COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(LoadError::MissingColumn(column));
        }
    }

    let mut records = Vec::new();
    let mut seen_ids = HashSet::new();
    let mut dropped = 0usize;

    for (row_no, result) in reader.deserialize::<RawRow>().enumerate() {
        let parsed = result
            .map_err(|e| e.to_string())
            .and_then(|raw| raw.into_record());

        match parsed {
            Ok(rec) if seen_ids.insert(rec.id) => records.push(rec),
            Ok(rec) => {
                log::debug!("CSV row {row_no}: duplicate appointment id {}", rec.id);
                dropped += 1;
            }
            Err(reason) => {
                log::debug!("CSV row {row_no}: dropped ({reason})");
                dropped += 1;
            }
        }
    }

    if dropped > 0 {
        log::warn!("Dropped {dropped} malformed appointment rows");
    }
    if records.is_empty() {
        return Err(LoadError::EmptyDataset { dropped });
    }

    let mut dataset = AppointmentDataset::from_records(records);
    dataset.dropped_rows = dropped;
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Row parsing
// ---------------------------------------------------------------------------

/// One CSV row before type coercion. Columns are matched by header name.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Appointment ID")]
    id: String,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Patient Name")]
    patient_name: String,
    #[serde(rename = "Patient Age")]
    patient_age: String,
    #[serde(rename = "Gender")]
    gender: String,
    #[serde(rename = "Doctor Name")]
    doctor: String,
    #[serde(rename = "Procedure Type")]
    procedure: String,
    #[serde(rename = "Appointment Status")]
    status: String,
    #[serde(rename = "Duration (minutes)")]
    duration_minutes: String,
    #[serde(rename = "Billing Amount ($)")]
    billing_amount: String,
    #[serde(rename = "Payment Status")]
    payment_status: String,
}

impl RawRow {
    fn into_record(self) -> Result<AppointmentRecord, String> {
        let record = AppointmentRecord {
            id: parse_whole(&self.id, "Appointment ID")?,
            date: parse_date(&self.date)?,
            patient_name: self.patient_name,
            patient_age: parse_whole(&self.patient_age, "Patient Age")?,
            gender: self.gender.parse().map_err(|e| format!("{e}"))?,
            doctor: self.doctor.parse().map_err(|e| format!("{e}"))?,
            procedure: self.procedure.parse().map_err(|e| format!("{e}"))?,
            status: self.status.parse().map_err(|e| format!("{e}"))?,
            duration_minutes: parse_whole(&self.duration_minutes, "Duration (minutes)")?,
            billing_amount: parse_amount(&self.billing_amount)?,
            payment_status: self.payment_status.parse().map_err(|e| format!("{e}"))?,
        };
        record.validate().map_err(|e| e.to_string())?;
        Ok(record)
    }
}

/// `YYYY-MM-DD`, optionally followed by a time of day which is discarded.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .map_err(|_| format!("'{s}' is not a date"))
}

/// Non-negative integer. An integral float spelling such as `34.0` is
/// accepted; exponent forms like `4.2e1` are not.
fn parse_whole<T>(s: &str, column: &str) -> Result<T, String>
where
    T: TryFrom<u64> + std::str::FromStr,
{
    if let Ok(v) = s.parse::<T>() {
        return Ok(v);
    }
    Some(s)
        .filter(|s| !s.contains(['e', 'E']))
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
        .and_then(|f| T::try_from(f as u64).ok())
        .ok_or_else(|| format!("{column}: '{s}' is not a whole number"))
}

fn parse_amount(s: &str) -> Result<f64, String> {
    s.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .ok_or_else(|| format!("Billing Amount ($): '{s}' is not a number"))
}
