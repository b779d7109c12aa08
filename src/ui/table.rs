use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use dental_dash::data::filter::newest_first;
use dental_dash::data::model::{AppointmentRecord, Domain, COLUMNS};

use super::charts::format_currency;

const ROW_HEIGHT: f32 = 18.0;

/// Filtered appointments, most recent first.
pub fn appointments_table(ui: &mut Ui, records: &[&AppointmentRecord]) {
    let rows = newest_first(records);

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .columns(Column::auto().at_least(60.0), COLUMNS.len())
        .min_scrolled_height(0.0)
        .max_scroll_height(360.0)
        .header(22.0, |mut header| {
            for name in COLUMNS {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                let rec = rows[row.index()];
                let cells = [
                    rec.id.to_string(),
                    rec.date.to_string(),
                    rec.patient_name.clone(),
                    rec.patient_age.to_string(),
                    rec.gender.as_str().to_string(),
                    rec.doctor.as_str().to_string(),
                    rec.procedure.as_str().to_string(),
                    rec.status.as_str().to_string(),
                    rec.duration_minutes.to_string(),
                    format_currency(rec.billing_amount),
                    rec.payment_status.as_str().to_string(),
                ];
                for text in cells {
                    row.col(|ui| {
                        ui.label(text);
                    });
                }
            });
        });
}
