use std::collections::BTreeSet;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Closed domains for the enumerated columns
// ---------------------------------------------------------------------------

/// A label that is not a member of its declared domain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{value}' is not a valid {domain}")]
pub struct ParseDomainError {
    pub domain: &'static str,
    pub value: String,
}

/// A closed set of string labels backed by an enum.
///
/// Variants are declared in lexicographic label order, so the derived `Ord`
/// agrees with sorting by label.
pub trait Domain: Copy + Ord + 'static {
    /// Human readable name of the domain, used in error messages.
    const NAME: &'static str;
    /// Every member, in label order.
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;

    fn parse_label(s: &str) -> Result<Self, ParseDomainError> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ParseDomainError {
                domain: Self::NAME,
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Gender {
    Female,
    Male,
}

impl Domain for Gender {
    const NAME: &'static str = "gender";
    const ALL: &'static [Self] = &[Gender::Female, Gender::Male];

    fn as_str(self) -> &'static str {
        match self {
            Gender::Female => "Female",
            Gender::Male => "Male",
        }
    }
}

/// The clinic's doctor roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Doctor {
    #[serde(rename = "Dr. Ayesha")]
    Ayesha,
    #[serde(rename = "Dr. Bilal")]
    Bilal,
    #[serde(rename = "Dr. Zara")]
    Zara,
}

impl Domain for Doctor {
    const NAME: &'static str = "doctor";
    const ALL: &'static [Self] = &[Doctor::Ayesha, Doctor::Bilal, Doctor::Zara];

    fn as_str(self) -> &'static str {
        match self {
            Doctor::Ayesha => "Dr. Ayesha",
            Doctor::Bilal => "Dr. Bilal",
            Doctor::Zara => "Dr. Zara",
        }
    }
}

/// Procedure catalog. Each entry carries the duration and billing ranges a
/// record of that type must fall in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ProcedureType {
    #[serde(rename = "Braces Consultation")]
    BracesConsultation,
    #[serde(rename = "Check-up")]
    CheckUp,
    Cleaning,
    Extraction,
    Filling,
    #[serde(rename = "Root Canal")]
    RootCanal,
    Whitening,
}

impl Domain for ProcedureType {
    const NAME: &'static str = "procedure type";
    const ALL: &'static [Self] = &[
        ProcedureType::BracesConsultation,
        ProcedureType::CheckUp,
        ProcedureType::Cleaning,
        ProcedureType::Extraction,
        ProcedureType::Filling,
        ProcedureType::RootCanal,
        ProcedureType::Whitening,
    ];

    fn as_str(self) -> &'static str {
        match self {
            ProcedureType::BracesConsultation => "Braces Consultation",
            ProcedureType::CheckUp => "Check-up",
            ProcedureType::Cleaning => "Cleaning",
            ProcedureType::Extraction => "Extraction",
            ProcedureType::Filling => "Filling",
            ProcedureType::RootCanal => "Root Canal",
            ProcedureType::Whitening => "Whitening",
        }
    }
}

impl ProcedureType {
    /// Allowed appointment length in minutes.
    pub fn duration_range(self) -> RangeInclusive<u32> {
        match self {
            ProcedureType::BracesConsultation => 45..=60,
            ProcedureType::CheckUp => 15..=30,
            ProcedureType::Cleaning => 30..=45,
            ProcedureType::Extraction => 30..=60,
            ProcedureType::Filling => 45..=75,
            ProcedureType::RootCanal => 60..=120,
            ProcedureType::Whitening => 60..=90,
        }
    }

    /// Allowed billing amount in dollars.
    pub fn billing_range(self) -> RangeInclusive<f64> {
        match self {
            ProcedureType::BracesConsultation => 80.0..=150.0,
            ProcedureType::CheckUp => 30.0..=70.0,
            ProcedureType::Cleaning => 50.0..=100.0,
            ProcedureType::Extraction => 150.0..=350.0,
            ProcedureType::Filling => 100.0..=250.0,
            ProcedureType::RootCanal => 300.0..=800.0,
            ProcedureType::Whitening => 250.0..=500.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AppointmentStatus {
    Cancelled,
    Completed,
    #[serde(rename = "No-show")]
    NoShow,
}

impl Domain for AppointmentStatus {
    const NAME: &'static str = "appointment status";
    const ALL: &'static [Self] = &[
        AppointmentStatus::Cancelled,
        AppointmentStatus::Completed,
        AppointmentStatus::NoShow,
    ];

    fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Cancelled => "Cancelled",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::NoShow => "No-show",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PaymentStatus {
    Paid,
    Pending,
}

impl Domain for PaymentStatus {
    const NAME: &'static str = "payment status";
    const ALL: &'static [Self] = &[PaymentStatus::Paid, PaymentStatus::Pending];

    fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Pending => "Pending",
        }
    }
}

macro_rules! domain_text_impls {
    ($($ty:ty),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            impl FromStr for $ty {
                type Err = ParseDomainError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    <$ty as Domain>::parse_label(s)
                }
            }
        )*
    };
}

domain_text_impls!(Gender, Doctor, ProcedureType, AppointmentStatus, PaymentStatus);

// ---------------------------------------------------------------------------
// AppointmentRecord – one row of the CSV
// ---------------------------------------------------------------------------

/// CSV header, in the fixed column order used for both reading and writing.
pub const COLUMNS: [&str; 11] = [
    "Appointment ID",
    "Date",
    "Patient Name",
    "Patient Age",
    "Gender",
    "Doctor Name",
    "Procedure Type",
    "Appointment Status",
    "Duration (minutes)",
    "Billing Amount ($)",
    "Payment Status",
];

pub const MAX_PATIENT_AGE: u32 = 120;

/// A single appointment. Field order matches [`COLUMNS`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppointmentRecord {
    #[serde(rename = "Appointment ID")]
    pub id: u64,
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Patient Name")]
    pub patient_name: String,
    #[serde(rename = "Patient Age")]
    pub patient_age: u32,
    #[serde(rename = "Gender")]
    pub gender: Gender,
    #[serde(rename = "Doctor Name")]
    pub doctor: Doctor,
    #[serde(rename = "Procedure Type")]
    pub procedure: ProcedureType,
    #[serde(rename = "Appointment Status")]
    pub status: AppointmentStatus,
    #[serde(rename = "Duration (minutes)")]
    pub duration_minutes: u32,
    #[serde(rename = "Billing Amount ($)", serialize_with = "serialize_cents")]
    pub billing_amount: f64,
    #[serde(rename = "Payment Status")]
    pub payment_status: PaymentStatus,
}

/// Why a parsed row was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("duration {minutes} min outside {procedure} range")]
    DurationOutOfRange {
        procedure: ProcedureType,
        minutes: u32,
    },
    #[error("billing {amount:.2} outside {procedure} range")]
    BillingOutOfRange { procedure: ProcedureType, amount: f64 },
    #[error("patient age {0} is not plausible")]
    ImplausibleAge(u32),
}

impl AppointmentRecord {
    /// Check the record against its procedure's configured ranges.
    pub fn validate(&self) -> Result<(), RecordError> {
        if !self.procedure.duration_range().contains(&self.duration_minutes) {
            return Err(RecordError::DurationOutOfRange {
                procedure: self.procedure,
                minutes: self.duration_minutes,
            });
        }
        if !self.billing_amount.is_finite()
            || !self.procedure.billing_range().contains(&self.billing_amount)
        {
            return Err(RecordError::BillingOutOfRange {
                procedure: self.procedure,
                amount: self.billing_amount,
            });
        }
        if self.patient_age > MAX_PATIENT_AGE {
            return Err(RecordError::ImplausibleAge(self.patient_age));
        }
        Ok(())
    }

    /// Label of this record for a grouping dimension.
    pub fn label(&self, dimension: Dimension) -> &'static str {
        match dimension {
            Dimension::Doctor => self.doctor.as_str(),
            Dimension::Procedure => self.procedure.as_str(),
            Dimension::Status => self.status.as_str(),
        }
    }
}

/// Round a currency amount to whole cents.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

fn serialize_cents<S: Serializer>(amount: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{amount:.2}"))
}

// ---------------------------------------------------------------------------
// Dimension – a field records can be grouped and filtered by
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    Doctor,
    Procedure,
    Status,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Doctor, Dimension::Procedure, Dimension::Status];

    /// Column header of the field in the CSV.
    pub fn column(self) -> &'static str {
        match self {
            Dimension::Doctor => "Doctor Name",
            Dimension::Procedure => "Procedure Type",
            Dimension::Status => "Appointment Status",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Doctor => "Doctor",
            Dimension::Procedure => "Procedure",
            Dimension::Status => "Status",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// AppointmentDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The loaded, immutable table with pre-computed distinct values.
#[derive(Debug, Clone, Default)]
pub struct AppointmentDataset {
    /// All records, in file order.
    pub records: Vec<AppointmentRecord>,
    pub doctors: BTreeSet<Doctor>,
    pub procedures: BTreeSet<ProcedureType>,
    pub statuses: BTreeSet<AppointmentStatus>,
    /// Earliest and latest appointment date, `None` when empty.
    pub date_bounds: Option<(NaiveDate, NaiveDate)>,
    /// Rows discarded while loading because they failed to parse or validate.
    pub dropped_rows: usize,
}

impl AppointmentDataset {
    /// Build the distinct-value indices from the loaded records.
    pub fn from_records(records: Vec<AppointmentRecord>) -> Self {
        let mut doctors = BTreeSet::new();
        let mut procedures = BTreeSet::new();
        let mut statuses = BTreeSet::new();
        let mut date_bounds: Option<(NaiveDate, NaiveDate)> = None;

        for rec in &records {
            doctors.insert(rec.doctor);
            procedures.insert(rec.procedure);
            statuses.insert(rec.status);
            date_bounds = Some(match date_bounds {
                None => (rec.date, rec.date),
                Some((lo, hi)) => (lo.min(rec.date), hi.max(rec.date)),
            });
        }

        AppointmentDataset {
            records,
            doctors,
            procedures,
            statuses,
            date_bounds,
            dropped_rows: 0,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct labels present for a dimension, in label order.
    pub fn labels(&self, dimension: Dimension) -> Vec<&'static str> {
        match dimension {
            Dimension::Doctor => self.doctors.iter().map(|d| d.as_str()).collect(),
            Dimension::Procedure => self.procedures.iter().map(|p| p.as_str()).collect(),
            Dimension::Status => self.statuses.iter().map(|s| s.as_str()).collect(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    /// A valid record with the given varying fields.
    pub(crate) fn record(
        id: u64,
        day: &str,
        doctor: Doctor,
        procedure: ProcedureType,
        status: AppointmentStatus,
        billing: f64,
    ) -> AppointmentRecord {
        AppointmentRecord {
            id,
            date: date(day),
            patient_name: "Sana Tariq".to_string(),
            patient_age: 34,
            gender: Gender::Female,
            doctor,
            procedure,
            status,
            duration_minutes: *procedure.duration_range().start(),
            billing_amount: billing,
            payment_status: PaymentStatus::Paid,
        }
    }

    #[test]
    fn labels_round_trip_through_from_str() {
        for p in ProcedureType::ALL {
            assert_eq!(p.as_str().parse::<ProcedureType>().unwrap(), *p);
        }
        assert_eq!("No-show".parse::<AppointmentStatus>().unwrap(), AppointmentStatus::NoShow);
        assert_eq!("Dr. Zara".parse::<Doctor>().unwrap(), Doctor::Zara);
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = "Dr. Who".parse::<Doctor>().unwrap_err();
        assert_eq!(err.domain, "doctor");
        assert_eq!(err.to_string(), "'Dr. Who' is not a valid doctor");
        assert!("no-show".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn derived_order_matches_label_order() {
        fn check<T: Domain>() {
            let mut labels: Vec<&str> = T::ALL.iter().map(|v| v.as_str()).collect();
            let declared = labels.clone();
            labels.sort();
            assert_eq!(labels, declared, "{} is not declared in label order", T::NAME);
        }
        check::<Gender>();
        check::<Doctor>();
        check::<ProcedureType>();
        check::<AppointmentStatus>();
        check::<PaymentStatus>();
    }

    #[test]
    fn validate_enforces_procedure_ranges() {
        let mut rec = record(
            1,
            "2025-03-01",
            Doctor::Bilal,
            ProcedureType::RootCanal,
            AppointmentStatus::Completed,
            450.0,
        );
        assert!(rec.validate().is_ok());

        rec.duration_minutes = 30;
        assert!(matches!(rec.validate(), Err(RecordError::DurationOutOfRange { .. })));

        rec.duration_minutes = 90;
        rec.billing_amount = 99.99;
        assert!(matches!(rec.validate(), Err(RecordError::BillingOutOfRange { .. })));

        rec.billing_amount = f64::NAN;
        assert!(rec.validate().is_err());
    }

    #[test]
    fn dataset_indexes_distinct_values_and_bounds() {
        let ds = AppointmentDataset::from_records(vec![
            record(1, "2025-02-10", Doctor::Zara, ProcedureType::Cleaning, AppointmentStatus::Completed, 60.0),
            record(2, "2025-01-05", Doctor::Ayesha, ProcedureType::Cleaning, AppointmentStatus::NoShow, 70.0),
            record(3, "2025-03-20", Doctor::Zara, ProcedureType::Filling, AppointmentStatus::Completed, 120.0),
        ]);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.date_bounds, Some((date("2025-01-05"), date("2025-03-20"))));
        assert_eq!(ds.labels(Dimension::Doctor), vec!["Dr. Ayesha", "Dr. Zara"]);
        assert_eq!(ds.labels(Dimension::Procedure), vec!["Cleaning", "Filling"]);
        assert_eq!(ds.labels(Dimension::Status), vec!["Completed", "No-show"]);

        assert!(AppointmentDataset::from_records(Vec::new()).date_bounds.is_none());
    }
}
