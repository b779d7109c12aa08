use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};

use crate::color::ColorMap;
use crate::data::cache::DatasetCache;
use crate::data::filter::{filtered_indices, FilterCriteria};
use crate::data::model::{AppointmentDataset, AppointmentRecord, Dimension};
use crate::data::stats::DashboardSummary;
use crate::data::writer;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// CSV the dashboard reads from.
    pub data_path: PathBuf,

    /// Memoized parse of `data_path`.
    cache: DatasetCache,

    /// Loaded dataset (None when the file is missing or has no valid rows).
    pub dataset: Option<Arc<AppointmentDataset>>,

    /// Current filter selections.
    pub criteria: FilterCriteria,

    /// Indices of records passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Aggregates over the visible records.
    pub summary: DashboardSummary,

    /// Stable chart colours per dimension.
    pub color_maps: BTreeMap<Dimension, ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(data_path: PathBuf) -> Self {
        Self {
            data_path,
            cache: DatasetCache::new(),
            dataset: None,
            criteria: FilterCriteria::from_dataset(&AppointmentDataset::default()),
            visible_indices: Vec::new(),
            summary: DashboardSummary::default(),
            color_maps: BTreeMap::new(),
            status_message: None,
        }
    }

    /// Switch to another CSV and load it.
    pub fn load_path(&mut self, path: PathBuf) {
        self.data_path = path;
        self.reload();
    }

    /// (Re)load `data_path`. Unchanged files come from the cache.
    pub fn reload(&mut self) {
        match self.cache.get_or_load(&self.data_path) {
            Ok(dataset) => {
                let unchanged = self
                    .dataset
                    .as_ref()
                    .is_some_and(|current| Arc::ptr_eq(current, &dataset));
                if !unchanged {
                    self.set_dataset(dataset);
                }
            }
            Err(e) => {
                log::warn!("No data to display: {e}");
                self.dataset = None;
                self.criteria = FilterCriteria::from_dataset(&AppointmentDataset::default());
                self.visible_indices.clear();
                self.summary = DashboardSummary::default();
                self.color_maps.clear();
                self.status_message = Some(format!(
                    "{e}. Generate it first with `generate_data` or open another file."
                ));
            }
        }
    }

    /// Ingest a newly loaded dataset and reset filters to show everything.
    pub fn set_dataset(&mut self, dataset: Arc<AppointmentDataset>) {
        self.criteria = FilterCriteria::from_dataset(&dataset);
        self.color_maps = Dimension::ALL
            .into_iter()
            .map(|dim| (dim, ColorMap::new(&dataset.labels(dim))))
            .collect();
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute `visible_indices` and the summary after a filter change.
    pub fn refilter(&mut self) {
        self.refilter_on(Local::now().date_naive());
    }

    /// [`AppState::refilter`] with an explicit "today".
    pub fn refilter_on(&mut self, today: NaiveDate) {
        if let Some(ds) = &self.dataset {
            self.visible_indices = filtered_indices(ds, &self.criteria);
        }
        let summary = DashboardSummary::compute(&self.visible_records(), today);
        self.summary = summary;
    }

    /// Recompute when the calendar day has moved on since the last summary,
    /// so "appointments today" follows the wall clock.
    pub fn refresh_if_day_changed(&mut self, today: NaiveDate) -> bool {
        if self.dataset.is_none() || self.summary.as_of == Some(today) {
            return false;
        }
        self.refilter_on(today);
        true
    }

    /// Records passing the current filters, in file order.
    pub fn visible_records(&self) -> Vec<&AppointmentRecord> {
        match &self.dataset {
            Some(ds) => self.visible_indices.iter().map(|&i| &ds.records[i]).collect(),
            None => Vec::new(),
        }
    }

    /// Toggle a single value in a dimension's filter.
    pub fn toggle(&mut self, dimension: Dimension, label: &str) {
        let selected = self.criteria.is_selected(dimension, label);
        self.criteria.set_selected(dimension, label, !selected);
        self.refilter();
    }

    /// Select all values of a dimension.
    pub fn select_all(&mut self, dimension: Dimension) {
        if let Some(ds) = &self.dataset {
            self.criteria.select_all(dimension, ds);
            self.refilter();
        }
    }

    /// Deselect all values of a dimension.
    pub fn select_none(&mut self, dimension: Dimension) {
        self.criteria.select_none(dimension);
        self.refilter();
    }

    /// Set the date range, clamped to the dataset's first and last day.
    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) {
        let (start, end) = match self.dataset.as_ref().and_then(|ds| ds.date_bounds) {
            Some((lo, hi)) => (start.clamp(lo, hi), end.clamp(lo, hi)),
            None => (start, end),
        };
        if self.criteria.date_range != (start, end) {
            self.criteria.date_range = (start, end);
            self.refilter();
        }
    }

    /// Back to the identity filter.
    pub fn reset_filters(&mut self) {
        if let Some(ds) = &self.dataset {
            self.criteria = FilterCriteria::from_dataset(ds);
            self.refilter();
        }
    }

    /// Write the visible records as CSV. Returns the number of rows written.
    pub fn export_filtered(&self, path: &Path) -> Result<usize> {
        writer::write_file(path, self.visible_records())
            .with_context(|| format!("exporting filtered appointments to {}", path.display()))
    }

    /// Write the current summary as pretty JSON.
    pub fn export_summary(&self, path: &Path) -> Result<()> {
        let json = self.summary.to_json().context("serializing summary")?;
        std::fs::write(path, json)
            .with_context(|| format!("writing summary to {}", path.display()))?;
        log::info!("Wrote dashboard summary to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_file;

    const CSV: &str = "Appointment ID,Date,Patient Name,Patient Age,Gender,Doctor Name,\
Procedure Type,Appointment Status,Duration (minutes),Billing Amount ($),Payment Status
1001,2025-04-02,Ali Khan,42,Male,Dr. Ayesha,Cleaning,Completed,35,75.50,Paid
1002,2025-04-03,Fatima Ahmed,29,Female,Dr. Bilal,Root Canal,No-show,90,420.00,Pending
1003,2025-04-03,Usman Butt,61,Male,Dr. Zara,Check-up,Cancelled,20,45.10,Paid
1004,2025-04-05,Sana Tariq,8,Female,Dr. Ayesha,Braces Consultation,Completed,50,99.99,Paid
";

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn loaded_state(dir: &tempfile::TempDir) -> AppState {
        let path = dir.path().join("dental_data.csv");
        std::fs::write(&path, CSV).unwrap();
        let mut state = AppState::new(path);
        state.reload();
        state
    }

    #[test]
    fn load_shows_everything() {
        let dir = tempfile::tempdir().unwrap();
        let state = loaded_state(&dir);
        assert!(state.status_message.is_none());
        assert_eq!(state.visible_indices, vec![0, 1, 2, 3]);
        assert_eq!(state.summary.kpis.total_appointments, 4);
        assert_eq!(state.summary.kpis.total_revenue, 640.59);
        assert_eq!(state.color_maps.len(), 3);
    }

    #[test]
    fn missing_file_is_an_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(dir.path().join("nope.csv"));
        state.reload();
        assert!(state.dataset.is_none());
        assert!(state.visible_records().is_empty());
        assert_eq!(state.summary.kpis.total_appointments, 0);
        assert!(state.status_message.as_deref().unwrap().contains("not found"));
    }

    #[test]
    fn toggles_and_select_none_refilter() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = loaded_state(&dir);

        state.toggle(Dimension::Doctor, "Dr. Ayesha");
        assert_eq!(state.visible_indices, vec![1, 2]);
        assert_eq!(state.summary.kpis.no_show_rate, 50.0);

        state.toggle(Dimension::Doctor, "Dr. Ayesha");
        assert_eq!(state.visible_indices.len(), 4);

        state.select_none(Dimension::Status);
        assert!(state.visible_indices.is_empty());
        assert_eq!(state.summary.kpis.total_revenue, 0.0);

        state.select_all(Dimension::Status);
        assert_eq!(state.visible_indices.len(), 4);
    }

    #[test]
    fn date_range_is_clamped_and_reset() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = loaded_state(&dir);

        state.set_date_range(day("2025-01-01"), day("2025-04-03"));
        assert_eq!(state.criteria.date_range, (day("2025-04-02"), day("2025-04-03")));
        assert_eq!(state.visible_indices, vec![0, 1, 2]);

        state.reset_filters();
        assert_eq!(state.criteria.date_range, (day("2025-04-02"), day("2025-04-05")));
        assert_eq!(state.visible_indices.len(), 4);
    }

    #[test]
    fn today_is_recomputed_when_the_day_changes() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = loaded_state(&dir);

        state.refilter_on(day("2025-04-02"));
        assert_eq!(state.summary.kpis.appointments_today, 1);
        assert!(!state.refresh_if_day_changed(day("2025-04-02")));

        assert!(state.refresh_if_day_changed(day("2025-04-03")));
        assert_eq!(state.summary.kpis.appointments_today, 2);
        assert_eq!(state.summary.as_of, Some(day("2025-04-03")));
    }

    #[test]
    fn export_filtered_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = loaded_state(&dir);
        state.toggle(Dimension::Procedure, "Root Canal");

        let out = dir.path().join("filtered_dental_data.csv");
        assert_eq!(state.export_filtered(&out).unwrap(), 3);

        let reloaded = load_file(&out).unwrap();
        let visible: Vec<AppointmentRecord> =
            state.visible_records().into_iter().cloned().collect();
        assert_eq!(reloaded.records, visible);
    }

    #[test]
    fn export_summary_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let state = loaded_state(&dir);
        let out = dir.path().join("dental_summary.json");
        state.export_summary(&out).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(json["kpis"]["total_appointments"], 4);
        assert_eq!(json["revenue_by_doctor"][0]["key"], "Dr. Bilal");
    }
}
