mod editor;
mod input;
mod renderer;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context as _, Result};
use clap::Parser;
use flameview_core::{ViewError, ViewerConfig, Views};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "flameview", version, about = "Interactive flame graphs in the terminal")]
struct Cli {
    /// Collapsed stack file (`frame;frame;... count` per line).
    stacks: PathBuf,

    /// Viewer config JSON. Keys it leaves out use the defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs here; the terminal itself is taken by the viewer.
    #[arg(long)]
    log: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(path) = &cli.log {
        init_logging(path)?;
    }

    let config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            ViewerConfig::from_json(&text)?
        }
        None => terminal_config(),
    };

    let data = std::fs::read(&cli.stacks)
        .with_context(|| format!("reading {}", cli.stacks.display()))?;
    let tree = flameview_profile::parse_collapsed(&data)?;

    let mut views = Views::new(config);
    let id = match views.view(&tree, flameview_profile::warm) {
        Ok(id) => id,
        Err(ViewError::NothingToShow) => {
            eprintln!("{}: nothing to show", cli.stacks.display());
            return Ok(());
        }
    };

    let title = cli
        .stacks
        .file_name()
        .map_or_else(|| cli.stacks.display().to_string(), |n| n.to_string_lossy().into_owned());
    renderer::run(&mut views, id, &title)?;
    views.close_all();
    Ok(())
}

/// Terminal defaults: one wheel notch is one scroll unit, a surface pixel is
/// half a character cell, and the hover label goes to the status line.
fn terminal_config() -> ViewerConfig {
    let mut config = ViewerConfig::default();
    config.interaction.scroll_zoom_per_unit = 0.2;
    config.interaction.pan_pixels_per_unit = 8.0;
    config.interaction.min_drag_pixels = 2.0;
    config.render.overlay_labels = false;
    config
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
