use chrono::{NaiveDate, TimeDelta};
use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use super::model::{
    round_cents, AppointmentRecord, AppointmentStatus, Doctor, Domain, Gender, PaymentStatus,
    ProcedureType,
};
use crate::config;

pub const PATIENT_NAMES: [&str; 20] = [
    "Ali Khan",
    "Fatima Ahmed",
    "Usman Butt",
    "Sana Tariq",
    "Imran Malik",
    "Ayesha Zafar",
    "Bilal Hussain",
    "Zara Nadeem",
    "Omer Farooq",
    "Hina Javed",
    "Kamran Ali",
    "Maryam Raza",
    "Asad Mehmood",
    "Nazia Saleem",
    "Faisal Shah",
    "Sara Khan",
    "Junaid Anwar",
    "Mehwish Iqbal",
    "Adnan Siddiqui",
    "Nida Fatima",
];

pub const PATIENT_AGES: std::ops::RangeInclusive<u32> = 5..=80;

/// Completed / Cancelled / No-show.
const STATUS_WEIGHTS: [(AppointmentStatus, u32); 3] = [
    (AppointmentStatus::Completed, 85),
    (AppointmentStatus::Cancelled, 10),
    (AppointmentStatus::NoShow, 5),
];

/// Paid / Pending for completed appointments. Others are a coin flip.
const COMPLETED_PAYMENT_WEIGHTS: [(PaymentStatus, u32); 2] =
    [(PaymentStatus::Paid, 90), (PaymentStatus::Pending, 10)];

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("row count {rows} exceeds the maximum of {max}")]
    TooManyRows { rows: usize, max: usize },

    #[error("window of {days} days is outside 0..={max}")]
    WindowOutOfRange { days: i64, max: i64 },

    #[error("window of {days} days reaches before the earliest representable date")]
    StartOutOfRange { days: i64 },

    #[error("invalid sampling weights: {0}")]
    Weights(#[from] WeightedError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub rows: usize,
    /// Appointments fall in `[end - window_days, end]`.
    pub window_days: i64,
    /// Ids start at `first_id + 1`.
    pub first_id: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            rows: config::DEFAULT_ROWS,
            window_days: config::DEFAULT_WINDOW_DAYS,
            first_id: config::FIRST_ID,
        }
    }
}

/// Generate `config.rows` independent synthetic appointments ending on `end`.
pub fn generate<R: Rng + ?Sized>(
    config: &GeneratorConfig,
    end: NaiveDate,
    rng: &mut R,
) -> Result<Vec<AppointmentRecord>, GenerateError> {
    if config.rows > config::MAX_ROWS {
        return Err(GenerateError::TooManyRows {
            rows: config.rows,
            max: config::MAX_ROWS,
        });
    }
    let window = config.window_days;
    if !(0..=config::MAX_WINDOW_DAYS).contains(&window) {
        return Err(GenerateError::WindowOutOfRange {
            days: window,
            max: config::MAX_WINDOW_DAYS,
        });
    }
    let start = TimeDelta::try_days(window)
        .and_then(|span| end.checked_sub_signed(span))
        .ok_or(GenerateError::StartOutOfRange { days: window })?;

    let status_dist = WeightedIndex::new(STATUS_WEIGHTS.iter().map(|(_, w)| *w))?;
    let paid_dist = WeightedIndex::new(COMPLETED_PAYMENT_WEIGHTS.iter().map(|(_, w)| *w))?;

    let mut records = Vec::with_capacity(config.rows);
    for i in 0..config.rows {
        // start + offset never passes `end`.
        let offset = rng.gen_range(0..=window);
        let procedure = pick(ProcedureType::ALL, rng);
        let status = STATUS_WEIGHTS[status_dist.sample(rng)].0;
        let payment_status = if status == AppointmentStatus::Completed {
            COMPLETED_PAYMENT_WEIGHTS[paid_dist.sample(rng)].0
        } else {
            pick(PaymentStatus::ALL, rng)
        };

        records.push(AppointmentRecord {
            id: config.first_id + i as u64 + 1,
            date: start + TimeDelta::days(offset),
            patient_name: PATIENT_NAMES
                .choose(rng)
                .copied()
                .unwrap_or(PATIENT_NAMES[0])
                .to_string(),
            patient_age: rng.gen_range(PATIENT_AGES),
            gender: pick(Gender::ALL, rng),
            doctor: pick(Doctor::ALL, rng),
            procedure,
            status,
            duration_minutes: rng.gen_range(procedure.duration_range()),
            billing_amount: round_cents(rng.gen_range(procedure.billing_range())),
            payment_status,
        });
    }
    Ok(records)
}

fn pick<T: Domain, R: Rng + ?Sized>(domain: &'static [T], rng: &mut R) -> T {
    domain[rng.gen_range(0..domain.len())]
}
