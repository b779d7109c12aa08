use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::model::{
    AppointmentDataset, AppointmentRecord, AppointmentStatus, Dimension, Doctor, ProcedureType,
};

// ---------------------------------------------------------------------------
// Filter criteria: a conjunction of four predicates
// ---------------------------------------------------------------------------

/// Which appointments are currently selected.
///
/// A record passes when its date lies in `date_range` (inclusive) and its
/// doctor, procedure and status are each in the corresponding set. An empty
/// set selects nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub date_range: (NaiveDate, NaiveDate),
    pub doctors: BTreeSet<Doctor>,
    pub procedures: BTreeSet<ProcedureType>,
    pub statuses: BTreeSet<AppointmentStatus>,
}

impl FilterCriteria {
    /// Criteria selecting every record of `dataset` (the initial UI state).
    pub fn from_dataset(dataset: &AppointmentDataset) -> Self {
        FilterCriteria {
            date_range: dataset
                .date_bounds
                .unwrap_or((NaiveDate::MIN, NaiveDate::MAX)),
            doctors: dataset.doctors.clone(),
            procedures: dataset.procedures.clone(),
            statuses: dataset.statuses.clone(),
        }
    }

    pub fn matches(&self, record: &AppointmentRecord) -> bool {
        let (start, end) = self.date_range;
        start <= record.date
            && record.date <= end
            && self.doctors.contains(&record.doctor)
            && self.procedures.contains(&record.procedure)
            && self.statuses.contains(&record.status)
    }

    /// Number of selected values for a dimension.
    pub fn selected_count(&self, dimension: Dimension) -> usize {
        match dimension {
            Dimension::Doctor => self.doctors.len(),
            Dimension::Procedure => self.procedures.len(),
            Dimension::Status => self.statuses.len(),
        }
    }

    /// Whether the value with this label is selected.
    pub fn is_selected(&self, dimension: Dimension, label: &str) -> bool {
        match dimension {
            Dimension::Doctor => label.parse::<Doctor>().is_ok_and(|d| self.doctors.contains(&d)),
            Dimension::Procedure => label
                .parse::<ProcedureType>()
                .is_ok_and(|p| self.procedures.contains(&p)),
            Dimension::Status => label
                .parse::<AppointmentStatus>()
                .is_ok_and(|s| self.statuses.contains(&s)),
        }
    }

    /// Select or deselect the value with this label. Unknown labels are ignored.
    pub fn set_selected(&mut self, dimension: Dimension, label: &str, selected: bool) {
        match dimension {
            Dimension::Doctor => {
                if let Ok(d) = label.parse::<Doctor>() {
                    set_membership(&mut self.doctors, d, selected);
                }
            }
            Dimension::Procedure => {
                if let Ok(p) = label.parse::<ProcedureType>() {
                    set_membership(&mut self.procedures, p, selected);
                }
            }
            Dimension::Status => {
                if let Ok(s) = label.parse::<AppointmentStatus>() {
                    set_membership(&mut self.statuses, s, selected);
                }
            }
        }
    }

    /// Select every value of `dimension` present in the dataset.
    pub fn select_all(&mut self, dimension: Dimension, dataset: &AppointmentDataset) {
        match dimension {
            Dimension::Doctor => self.doctors = dataset.doctors.clone(),
            Dimension::Procedure => self.procedures = dataset.procedures.clone(),
            Dimension::Status => self.statuses = dataset.statuses.clone(),
        }
    }

    pub fn select_none(&mut self, dimension: Dimension) {
        match dimension {
            Dimension::Doctor => self.doctors.clear(),
            Dimension::Procedure => self.procedures.clear(),
            Dimension::Status => self.statuses.clear(),
        }
    }
}

fn set_membership<T: Ord>(set: &mut BTreeSet<T>, value: T, selected: bool) {
    if selected {
        set.insert(value);
    } else {
        set.remove(&value);
    }
}

// ---------------------------------------------------------------------------
// Applying criteria
// ---------------------------------------------------------------------------

/// Records passing `criteria`, in source order.
pub fn filter_records<'a>(
    records: &'a [AppointmentRecord],
    criteria: &FilterCriteria,
) -> Vec<&'a AppointmentRecord> {
    records.iter().filter(|r| criteria.matches(r)).collect()
}

/// Return indices of records that pass `criteria`.
pub fn filtered_indices(dataset: &AppointmentDataset, criteria: &FilterCriteria) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| criteria.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

/// Reorder a filtered view by date, most recent first. Ties keep id order.
pub fn newest_first<'a>(records: &[&'a AppointmentRecord]) -> Vec<&'a AppointmentRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| b.date.cmp(&a.date).then(a.id.cmp(&b.id)));
    sorted
}
