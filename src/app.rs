use std::path::PathBuf;

use chrono::Local;
use eframe::egui;

use dental_dash::state::AppState;

use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DentalDashApp {
    pub state: AppState,
}

impl DentalDashApp {
    /// Start with `data_path` loaded; a missing file leaves an empty dashboard.
    pub fn new(data_path: PathBuf) -> Self {
        let mut state = AppState::new(data_path);
        state.reload();
        Self { state }
    }
}

impl eframe::App for DentalDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.refresh_if_day_changed(Local::now().date_naive());

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: KPIs, charts, table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            charts::dashboard(ui, &self.state);
        });
    }
}
