use std::path::Path;

use credit_risk_lens::app::CreditRiskApp;
use credit_risk_lens::config::{DashboardConfig, CONFIG_FILE};
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::load(Path::new(CONFIG_FILE));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Credit Risk Insights",
        options,
        Box::new(|_cc| Ok(Box::new(CreditRiskApp::new(config)))),
    )
}
