use clap::Parser;
use eframe::egui;

use mobility_dashboard::app::DashboardApp;
use mobility_dashboard::config::Config;

fn main() -> eframe::Result {
    env_logger::init();
    let config = Config::parse();
    log::info!("Starting dashboard with data file {}", config.data.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.width, config.height])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Urban Mobility Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(DashboardApp::new(&config)))),
    )
}
