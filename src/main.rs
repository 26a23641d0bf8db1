mod app;
mod state;
mod ui;

use std::path::PathBuf;

use app::ImbalanceViewerApp;
use clap::Parser;
use eframe::egui;
use imbalance_viewer::config::AppConfig;
use state::AppState;

/// Desktop viewer for class-imbalance analysis.
#[derive(Parser)]
#[command(name = "imbalance-viewer", version, about)]
struct Args {
    /// Dataset to open at startup (.csv, .json, .parquet).
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Column holding the class labels (overrides the config).
    #[arg(long, value_name = "COLUMN")]
    target_column: Option<String>,
}

fn main() -> eframe::Result {
    env_logger::init();
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref()).unwrap_or_else(|e| {
        log::error!("{e:#}; using default configuration");
        AppConfig::default()
    });
    if let Some(column) = args.target_column {
        config.analysis.target_column = column;
    }

    let mut state = AppState::new(config);
    if let Some(path) = &args.file {
        state.open(path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Imbalance Viewer",
        options,
        Box::new(|cc| {
            // Install image loaders so egui can show the rendered pie chart.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(ImbalanceViewerApp::new(state)))
        }),
    )
}
