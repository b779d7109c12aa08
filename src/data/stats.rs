use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};
use serde::Serialize;

use super::model::{round_cents, AppointmentRecord, AppointmentStatus, Dimension};

// ---------------------------------------------------------------------------
// Headline metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Kpis {
    pub total_appointments: usize,
    /// Sum of billing amounts, rounded to cents.
    pub total_revenue: f64,
    /// Percentage of appointments that were no-shows, 2 decimal places.
    pub no_show_rate: f64,
    pub appointments_today: usize,
}

/// Compute the KPIs of a filtered view. `today` decides which appointments
/// count towards `appointments_today`.
pub fn compute_kpis(records: &[&AppointmentRecord], today: NaiveDate) -> Kpis {
    let total_appointments = records.len();
    if total_appointments == 0 {
        return Kpis::default();
    }

    let revenue: f64 = records.iter().map(|r| r.billing_amount).sum();
    let no_shows = records
        .iter()
        .filter(|r| r.status == AppointmentStatus::NoShow)
        .count();
    let rate = no_shows as f64 / total_appointments as f64 * 100.0;

    Kpis {
        total_appointments,
        total_revenue: round_cents(revenue),
        no_show_rate: (rate * 100.0).round() / 100.0,
        appointments_today: records.iter().filter(|r| r.date == today).count(),
    }
}

/// [`compute_kpis`] against the machine's local calendar date.
pub fn compute_kpis_now(records: &[&AppointmentRecord]) -> Kpis {
    compute_kpis(records, Local::now().date_naive())
}

// ---------------------------------------------------------------------------
// Groupings
// ---------------------------------------------------------------------------

/// Total billing for one value of a dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregate {
    pub key: &'static str,
    pub total: f64,
}

/// Sum billing per value of `dimension`, largest total first. Equal totals
/// are ordered by label.
pub fn aggregate_by(records: &[&AppointmentRecord], dimension: Dimension) -> Vec<Aggregate> {
    let mut sums: BTreeMap<&'static str, f64> = BTreeMap::new();
    for rec in records {
        *sums.entry(rec.label(dimension)).or_default() += rec.billing_amount;
    }

    let mut groups: Vec<Aggregate> = sums
        .into_iter()
        .map(|(key, total)| Aggregate {
            key,
            total: round_cents(total),
        })
        .collect();
    groups.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.key.cmp(b.key)));
    groups
}

/// Number of appointments per status. Statuses with no appointments are absent.
pub fn status_distribution(records: &[&AppointmentRecord]) -> BTreeMap<AppointmentStatus, usize> {
    let mut counts = BTreeMap::new();
    for rec in records {
        *counts.entry(rec.status).or_insert(0) += 1;
    }
    counts
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// Appointments per calendar day, oldest first. Days without appointments
/// are omitted rather than zero-filled.
pub fn time_series(records: &[&AppointmentRecord]) -> Vec<DailyCount> {
    let mut days: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for rec in records {
        *days.entry(rec.date).or_insert(0) += 1;
    }
    days.into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect()
}

// ---------------------------------------------------------------------------
// Everything the dashboard shows, in one value
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DashboardSummary {
    /// Day `kpis.appointments_today` was evaluated for.
    pub as_of: Option<NaiveDate>,
    pub kpis: Kpis,
    pub revenue_by_doctor: Vec<Aggregate>,
    pub revenue_by_procedure: Vec<Aggregate>,
    pub status_counts: BTreeMap<AppointmentStatus, usize>,
    pub daily: Vec<DailyCount>,
}

impl DashboardSummary {
    pub fn compute(records: &[&AppointmentRecord], today: NaiveDate) -> Self {
        DashboardSummary {
            as_of: Some(today),
            kpis: compute_kpis(records, today),
            revenue_by_doctor: aggregate_by(records, Dimension::Doctor),
            revenue_by_procedure: aggregate_by(records, Dimension::Procedure),
            status_counts: status_distribution(records),
            daily: time_series(records),
        }
    }

    /// Pretty-printed JSON for export.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filter_records, FilterCriteria};
    use crate::data::model::tests::{date, record};
    use crate::data::model::AppointmentDataset;
    use crate::data::model::AppointmentStatus::{Cancelled, Completed, NoShow};
    use crate::data::model::Doctor::{Ayesha, Bilal, Zara};
    use crate::data::model::ProcedureType::{CheckUp, Cleaning, Filling, RootCanal};

    /// 17 completed (150.00), 2 cancelled (40.00), 1 no-show (10.00).
    fn twenty_appointments() -> Vec<AppointmentRecord> {
        let mut records = Vec::new();
        for i in 0..16 {
            let day = format!("2025-02-{:02}", i + 1);
            records.push(record(i, &day, Ayesha, CheckUp, Completed, 9.0));
        }
        records.push(record(16, "2025-02-17", Bilal, CheckUp, Completed, 6.0));
        records.push(record(17, "2025-02-18", Zara, CheckUp, Cancelled, 20.0));
        records.push(record(18, "2025-02-18", Zara, CheckUp, Cancelled, 20.0));
        records.push(record(19, "2025-02-20", Bilal, CheckUp, NoShow, 10.0));
        records
    }

    #[test]
    fn no_show_rate_is_a_percentage() {
        let records = twenty_appointments();
        let refs: Vec<&AppointmentRecord> = records.iter().collect();
        let kpis = compute_kpis(&refs, date("2025-02-18"));
        assert_eq!(kpis.total_appointments, 20);
        assert_eq!(kpis.no_show_rate, 5.00);
        assert_eq!(kpis.total_revenue, 200.00);
        assert_eq!(kpis.appointments_today, 2);
    }

    #[test]
    fn no_show_rate_rounds_to_two_decimals() {
        let records = [
            record(1, "2025-02-01", Ayesha, Cleaning, NoShow, 60.0),
            record(2, "2025-02-01", Ayesha, Cleaning, Completed, 60.0),
            record(3, "2025-02-01", Ayesha, Cleaning, Completed, 60.0),
        ];
        let refs: Vec<&AppointmentRecord> = records.iter().collect();
        assert_eq!(compute_kpis(&refs, date("2025-01-01")).no_show_rate, 33.33);
    }

    #[test]
    fn empty_view_has_zero_kpis() {
        let records = twenty_appointments();
        let ds = AppointmentDataset::from_records(records);
        let mut criteria = FilterCriteria::from_dataset(&ds);
        criteria.doctors.clear();
        let filtered = filter_records(&ds.records, &criteria);
        assert!(filtered.is_empty());

        let kpis = compute_kpis(&filtered, date("2025-02-18"));
        assert_eq!(
            kpis,
            Kpis {
                total_appointments: 0,
                total_revenue: 0.0,
                no_show_rate: 0.0,
                appointments_today: 0,
            }
        );
        assert_eq!(compute_kpis_now(&filtered), Kpis::default());
        assert!(aggregate_by(&filtered, Dimension::Doctor).is_empty());
        assert!(status_distribution(&filtered).is_empty());
        assert!(time_series(&filtered).is_empty());
    }

    #[test]
    fn aggregate_by_status_is_descending() {
        let records = twenty_appointments();
        let refs: Vec<&AppointmentRecord> = records.iter().collect();
        let groups = aggregate_by(&refs, Dimension::Status);
        assert_eq!(
            groups,
            vec![
                Aggregate { key: "Completed", total: 150.00 },
                Aggregate { key: "Cancelled", total: 40.00 },
                Aggregate { key: "No-show", total: 10.00 },
            ]
        );
    }

    #[test]
    fn aggregate_ties_break_by_label() {
        let records = [
            record(1, "2025-02-01", Zara, Filling, Completed, 120.0),
            record(2, "2025-02-01", Bilal, Filling, Completed, 120.0),
            record(3, "2025-02-01", Ayesha, RootCanal, Completed, 500.0),
        ];
        let refs: Vec<&AppointmentRecord> = records.iter().collect();
        let keys: Vec<&str> = aggregate_by(&refs, Dimension::Doctor)
            .iter()
            .map(|g| g.key)
            .collect();
        assert_eq!(keys, vec!["Dr. Ayesha", "Dr. Bilal", "Dr. Zara"]);

        let by_procedure = aggregate_by(&refs, Dimension::Procedure);
        assert_eq!(by_procedure[0], Aggregate { key: "Root Canal", total: 500.0 });
        assert_eq!(by_procedure[1], Aggregate { key: "Filling", total: 240.0 });
    }

    #[test]
    fn status_distribution_counts() {
        let records = twenty_appointments();
        let refs: Vec<&AppointmentRecord> = records.iter().collect();
        let counts = status_distribution(&refs);
        assert_eq!(counts[&Completed], 17);
        assert_eq!(counts[&Cancelled], 2);
        assert_eq!(counts[&NoShow], 1);
    }

    #[test]
    fn time_series_is_sparse_sorted_and_within_range() {
        let records = twenty_appointments();
        let ds = AppointmentDataset::from_records(records);
        let mut criteria = FilterCriteria::from_dataset(&ds);
        criteria.date_range = (date("2025-02-10"), date("2025-02-19"));
        let filtered = filter_records(&ds.records, &criteria);

        let series = time_series(&filtered);
        assert!(series.windows(2).all(|w| w[0].date < w[1].date));
        assert!(series
            .iter()
            .all(|d| d.date >= criteria.date_range.0 && d.date <= criteria.date_range.1));
        assert_eq!(series.first().map(|d| d.date), Some(date("2025-02-10")));
        // 2025-02-19 has no appointments and is not zero-filled.
        assert_eq!(series.last(), Some(&DailyCount { date: date("2025-02-18"), count: 2 }));
        assert_eq!(series.iter().map(|d| d.count).sum::<usize>(), filtered.len());
    }

    #[test]
    fn summary_serializes_to_json() {
        let records = twenty_appointments();
        let refs: Vec<&AppointmentRecord> = records.iter().collect();
        let summary = DashboardSummary::compute(&refs, date("2025-02-20"));
        assert_eq!(summary.kpis.appointments_today, 1);
        assert_eq!(summary.revenue_by_doctor[0].key, "Dr. Ayesha");

        let json: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
        assert_eq!(json["kpis"]["total_appointments"], 20);
        assert_eq!(json["status_counts"]["No-show"], 1);
        assert_eq!(json["daily"][0]["date"], "2025-02-01");
        assert_eq!(json["as_of"], "2025-02-20");
    }
}
