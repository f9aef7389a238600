use anyhow::anyhow;
use clap::Parser;
use eframe::egui;

use titanic_dashboard::app::TitanicDashboardApp;
use titanic_dashboard::config::Config;
use titanic_dashboard::{artifacts, report};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = Config::parse();

    let artifacts = artifacts::init(&config.data, &config.model).inspect_err(|e| {
        log::error!("Start-up failed: {e:#}");
    })?;

    if config.report {
        print!("{}", report::render(artifacts)?);
        return Ok(());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 900.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Titanic Survival Prediction",
        options,
        Box::new(move |_cc| Ok(Box::new(TitanicDashboardApp::new(artifacts)))),
    )
    .map_err(|e| anyhow!("window error: {e}"))
}
