mod app;
mod ui;

use std::path::PathBuf;

use app::DentalDashApp;
use clap::Parser;
use dental_dash::config;
use eframe::egui;

/// Dental clinic appointment dashboard.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Appointment CSV to open on start-up.
    #[arg(short, long, env = config::DATA_FILE_ENV, default_value = config::DATA_FILE)]
    data_file: PathBuf,
}

fn main() -> eframe::Result {
    env_logger::init();
    let args = Args::parse();
    log::info!("Starting dashboard with {}", args.data_file.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        config::APP_NAME,
        options,
        Box::new(|_cc| Ok(Box::new(DentalDashApp::new(args.data_file)))),
    )
}
