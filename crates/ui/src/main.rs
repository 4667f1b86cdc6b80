use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Parser;
use flameview_core::ViewerConfig;
use flameview_ui::FlameApp;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "flameview-gui", version, about = "Interactive flame graphs")]
struct Cli {
    /// Collapsed stack file to open at startup.
    stacks: Option<PathBuf>,

    /// Viewer config JSON. Keys it leaves out use the defaults.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            ViewerConfig::from_json(&text)?
        }
        None => ViewerConfig::default(),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("flameview")
            .with_inner_size([1024.0, 640.0])
            .with_min_inner_size([320.0, 200.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "flameview",
        options,
        Box::new(move |cc| {
            let mut app = FlameApp::new(cc, config);
            if let Some(path) = &cli.stacks {
                app.open_path(path);
            }
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
