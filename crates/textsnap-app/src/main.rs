use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use textsnap_config::Config;
use textsnap_config::overlay::RegionMode;
use textsnap_ocr::{CaptureDevice, ImageFileDevice, TesseractRecognizer};
use tracing_subscriber::EnvFilter;

mod context;
mod controller;
mod events;
mod io;
mod presenter;
mod profile;
mod state;
mod status;

#[cfg(test)]
mod tests;

use self::context::DeviceFactory;
use self::controller::AppController;
use self::state::AppState;

#[derive(Parser)]
#[command(version, about = "Read text out of a captured image region")]
struct Cli {
    /// Profile file (defaults to ./textsnap.json when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Image file standing in for the camera
    #[arg(long)]
    source: Option<PathBuf>,

    /// Binarization threshold, values strictly above become white
    #[arg(long)]
    threshold: Option<u8>,

    /// Region mode: band, selection or fixed
    #[arg(long)]
    mode: Option<RegionMode>,

    /// Log as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Write a profile with the current defaults to this path and exit
    #[arg(long)]
    init_profile: Option<PathBuf>,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.with_ansi(atty::is(atty::Stream::Stderr)).init();
    }
}

/// Command line flags win over the profile
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(source) = &cli.source {
        config.capture.source = Some(source.clone());
    }
    if let Some(threshold) = cli.threshold {
        config.ocr.threshold = threshold;
    }
    if let Some(mode) = cli.mode {
        config.overlay.mode = mode;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    if let Some(path) = &cli.init_profile {
        profile::write_default_profile(path, "default")?;
        return Ok(());
    }

    let mut config = profile::resolve_config(cli.config.as_deref())?;
    apply_overrides(&mut config, &cli);

    if !config.ocr.enabled {
        bail!("OCR is disabled in the active profile");
    }
    let Some(source) = config.capture.source.clone() else {
        bail!("No capture source, pass --source or set TEXTSNAP_SOURCE");
    };

    tracing::info!(
        "textsnap v{} starting: source={}, language={}, threshold={}, mode={:?}",
        env!("CARGO_PKG_VERSION"),
        source.display(),
        config.ocr.language,
        config.ocr.threshold,
        config.overlay.mode
    );

    let recognizer = Arc::new(TesseractRecognizer::new(
        config.ocr.tesseract_path.clone(),
        config.ocr.language.clone(),
    ));
    let devices: DeviceFactory = Arc::new(move || {
        Box::new(ImageFileDevice::new(&source)) as Box<dyn CaptureDevice>
    });

    let state = Arc::new(AppState::new(config));
    let controller = AppController::new(state);
    let mut tasks = controller.spawn_tasks(recognizer, devices);
    controller
        .spawn_input()
        .context("Failed to start input watcher")?;

    let mut failed = false;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown requested");
                controller.shutdown();
                break;
            }
            joined = tasks.join_next() => match joined {
                // Both loops stop on their own after Quit
                Some(Ok(Ok(()))) => tracing::debug!("Task finished"),
                Some(Ok(Err(e))) => {
                    tracing::error!("Task failed: {:#}", e);
                    failed = true;
                    controller.shutdown();
                }
                Some(Err(e)) => {
                    tracing::error!("Task panicked: {}", e);
                    failed = true;
                    controller.shutdown();
                }
                None => break,
            },
        }
    }

    while let Some(joined) = tasks.join_next().await {
        if let Ok(Err(e)) = joined {
            tracing::error!("Task failed during shutdown: {:#}", e);
        }
    }

    if failed {
        bail!("textsnap stopped after a task failure");
    }
    Ok(())
}
