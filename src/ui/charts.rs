use chrono::{Datelike, NaiveDate};
use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, GridMark, Line, Plot, PlotPoints, Points};

use dental_dash::color::ColorMap;
use dental_dash::data::model::{Dimension, Domain};
use dental_dash::data::stats::{Aggregate, DailyCount, Kpis};
use dental_dash::state::AppState;

use super::table;

const CHART_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render KPIs, charts and the filtered table.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No appointment data. Generate dental_data.csv or use File → Open…");
        });
        return;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Key Performance Indicators");
            kpi_row(ui, &state.summary.kpis);

            if state.visible_indices.is_empty() {
                ui.label(
                    RichText::new("No data available for the selected filters.")
                        .color(Color32::LIGHT_BLUE),
                );
                return;
            }

            ui.add_space(8.0);
            ui.heading("Visualizations");
            ui.columns(2, |cols| {
                cols[0].strong("Revenue by Procedure Type");
                revenue_chart(
                    &mut cols[0],
                    "revenue_by_procedure",
                    &state.summary.revenue_by_procedure,
                    state.color_maps.get(&Dimension::Procedure),
                );
                cols[1].strong("Revenue by Doctor");
                revenue_chart(
                    &mut cols[1],
                    "revenue_by_doctor",
                    &state.summary.revenue_by_doctor,
                    state.color_maps.get(&Dimension::Doctor),
                );
            });
            ui.columns(2, |cols| {
                cols[0].strong("Appointment Status Breakdown");
                status_chart(&mut cols[0], state);
                cols[1].strong("Appointments Over Time");
                daily_chart(&mut cols[1], &state.summary.daily);
            });

            ui.add_space(8.0);
            ui.heading("Filtered Appointment Details");
            table::appointments_table(ui, &state.visible_records());
        });
}

// ---------------------------------------------------------------------------
// KPI cards
// ---------------------------------------------------------------------------

fn kpi_row(ui: &mut Ui, kpis: &Kpis) {
    ui.columns(4, |cols| {
        kpi_card(&mut cols[0], "Total Appointments", format_count(kpis.total_appointments));
        kpi_card(&mut cols[1], "Total Revenue", format_currency(kpis.total_revenue));
        kpi_card(&mut cols[2], "No-Show Rate", format!("{:.2}%", kpis.no_show_rate));
        kpi_card(&mut cols[3], "Appointments Today", format_count(kpis.appointments_today));
    });
}

fn kpi_card(ui: &mut Ui, label: &str, value: String) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        ui.vertical_centered(|ui: &mut Ui| {
            ui.label(RichText::new(label).color(Color32::GRAY));
            ui.label(RichText::new(value).size(26.0).strong());
        });
    });
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

/// Horizontal bars, largest group on top.
fn revenue_chart(ui: &mut Ui, id: &str, groups: &[Aggregate], colors: Option<&ColorMap>) {
    let n = groups.len();
    let bars: Vec<Bar> = groups
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let color = colors.map_or(Color32::LIGHT_BLUE, |cm| cm.color_for(g.key));
            Bar::new((n - 1 - i) as f64, g.total)
                .name(format!("{}: {}", g.key, format_currency(g.total)))
                .fill(color)
                .width(0.7)
        })
        .collect();

    let labels: Vec<&'static str> = groups.iter().rev().map(|g| g.key).collect();
    Plot::new(id.to_string())
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .x_axis_label("Total Revenue ($)")
        .y_axis_formatter(move |mark, _range| category_label(&labels, mark))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

fn status_chart(ui: &mut Ui, state: &AppState) {
    let counts = &state.summary.status_counts;
    let total: usize = counts.values().sum();
    let colors = state.color_maps.get(&Dimension::Status);

    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(i, (status, count))| {
            let color = colors.map_or(Color32::LIGHT_BLUE, |cm| cm.color_for(status.as_str()));
            Bar::new(i as f64, *count as f64)
                .name(status.as_str())
                .fill(color)
                .width(0.6)
        })
        .collect();
    let labels: Vec<&'static str> = counts.keys().map(|s| s.as_str()).collect();

    Plot::new("status_breakdown")
        .height(CHART_HEIGHT - 40.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .y_axis_label("Appointments")
        .x_axis_formatter(move |mark, _range| category_label(&labels, mark))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });

    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (status, count) in counts {
            let color = colors.map_or(Color32::LIGHT_BLUE, |cm| cm.color_for(status.as_str()));
            ui.label(
                RichText::new(format!("{status}: {count} ({:.1}%)", share(*count, total)))
                    .color(color),
            );
        }
    });
}

/// Sparse daily counts; days without appointments are not drawn as zero.
fn daily_chart(ui: &mut Ui, daily: &[DailyCount]) {
    let points: Vec<[f64; 2]> = daily
        .iter()
        .map(|d| [day_number(d.date), d.count as f64])
        .collect();

    Plot::new("daily_appointments")
        .height(CHART_HEIGHT)
        .x_axis_label("Date")
        .y_axis_label("Appointments")
        .x_axis_formatter(|mark, _range| {
            NaiveDate::from_num_days_from_ce_opt(mark.value.round() as i32)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        })
        .label_formatter(|_name, point| {
            let day = NaiveDate::from_num_days_from_ce_opt(point.x.round() as i32)
                .map(|d| d.to_string())
                .unwrap_or_default();
            format!("{day}\n{} appointments", point.y)
        })
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::new(points.clone()))
                    .name("Appointments")
                    .color(Color32::LIGHT_BLUE)
                    .width(1.5),
            );
            plot_ui.points(
                Points::new(PlotPoints::new(points))
                    .radius(3.0)
                    .color(Color32::LIGHT_BLUE),
            );
        });
}

fn category_label(labels: &[&str], mark: GridMark) -> String {
    let v = mark.value;
    if (v - v.round()).abs() > 1e-6 || v < 0.0 {
        return String::new();
    }
    labels.get(v.round() as usize).map(|l| l.to_string()).unwrap_or_default()
}

fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

// ---------------------------------------------------------------------------
// Number formatting
// ---------------------------------------------------------------------------

/// `1234567` → `1,234,567`.
pub fn format_count(n: usize) -> String {
    group_thousands(&n.to_string())
}

/// `12345.6` → `$12,345.60`.
pub fn format_currency(amount: f64) -> String {
    let cents = format!("{:.2}", amount.abs());
    let (whole, frac) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}${}.{frac}", group_thousands(whole))
}

fn share(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
