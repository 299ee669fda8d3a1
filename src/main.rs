#![allow(dead_code)]

mod app;
mod config;
mod data;
mod engine;
mod gui;
mod log;

use app::RamanApp;

fn main() -> eframe::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    ::log::info!("Starting Raman Studio v{}", env!("CARGO_PKG_VERSION"));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("Raman Studio")
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Raman Studio",
        options,
        Box::new(|cc| Ok(Box::new(RamanApp::new(cc)))),
    )
}
