mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;
mod worker;

use anyhow::Context;
use app::SigmetMapApp;
use config::Config;
use eframe::egui;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Config::from_env().context("reading configuration from environment")?;
    log::info!("advisory source: {}", config.api_base);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Aviation Weather Map – SIGMET / AIR SIGMET",
        options,
        Box::new(move |cc| Ok(Box::new(SigmetMapApp::new(cc, &config)))),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {e}"))
}
