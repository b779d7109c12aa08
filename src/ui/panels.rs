use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use dental_dash::config;
use dental_dash::data::model::Dimension;
use dental_dash::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Appointments");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Date range ----
            if let Some((min_date, max_date)) = dataset.date_bounds {
                ui.strong("Date range");
                let (mut start, mut end) = state.criteria.date_range;
                let mut changed = false;
                egui::Grid::new("date_range_grid")
                    .num_columns(2)
                    .show(ui, |ui: &mut Ui| {
                        ui.label("From");
                        changed |= ui
                            .add(DatePickerButton::new(&mut start).id_salt("date_start"))
                            .changed();
                        ui.end_row();
                        ui.label("To");
                        changed |= ui
                            .add(DatePickerButton::new(&mut end).id_salt("date_end"))
                            .changed();
                        ui.end_row();
                    });
                ui.small(format!("Data covers {min_date} to {max_date}"));
                if changed {
                    state.set_date_range(start, end);
                }
                ui.separator();
            }

            // ---- Per-dimension checkbox lists (collapsible) ----
            for dim in Dimension::ALL {
                let labels = dataset.labels(dim);
                let n_selected = state.criteria.selected_count(dim);
                let header_text = format!("{dim}  ({n_selected}/{})", labels.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(dim.column())
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(dim);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(dim);
                            }
                        });

                        for label in labels {
                            let mut text = RichText::new(label);
                            if let Some(cm) = state.color_maps.get(&dim) {
                                text = text.color(cm.color_for(label));
                            }
                            let mut checked = state.criteria.is_selected(dim, label);
                            if ui.checkbox(&mut checked, text).changed() {
                                state.toggle(dim, label);
                            }
                        }
                    });
            }

            ui.separator();
            if ui.button("Reset filters").clicked() {
                state.reset_filters();
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
            ui.separator();
            let has_data = state.dataset.is_some();
            if ui
                .add_enabled(has_data, egui::Button::new("Export filtered CSV…"))
                .clicked()
            {
                export_filtered_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(has_data, egui::Button::new("Export summary JSON…"))
                .clicked()
            {
                export_summary_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} appointments loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
            if ds.dropped_rows > 0 {
                ui.label(
                    RichText::new(format!("({} malformed rows skipped)", ds.dropped_rows))
                        .color(Color32::GRAY),
                );
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open appointment data")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(path);
        if let Some(ds) = &state.dataset {
            log::info!(
                "Showing {} appointments from {}",
                ds.len(),
                state.data_path.display()
            );
        }
    }
}

fn export_filtered_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered appointments")
        .set_file_name(config::FILTERED_EXPORT_FILE)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match state.export_filtered(&path) {
            Ok(n) => {
                log::info!("Exported {n} filtered appointments");
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

fn export_summary_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export dashboard summary")
        .set_file_name(config::SUMMARY_EXPORT_FILE)
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.export_summary(&path) {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
