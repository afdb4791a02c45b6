mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::KeyscopeApp;
use clap::Parser;
use config::Config;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();
    let config = Config::parse();
    log::info!("Starting with dataset {}", config.data.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.width, config.height])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Key and Tonality Analysis",
        options,
        Box::new(move |_cc| Ok(Box::new(KeyscopeApp::new(&config)))),
    )
}
