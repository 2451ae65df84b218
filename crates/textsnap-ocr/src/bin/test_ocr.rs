//! Simple pipeline test - run with: cargo run -p textsnap-ocr --bin test_ocr -- <image>

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::Parser;
use textsnap_core::{Preprocessor, ThresholdPreprocessor, overlay_band};
use textsnap_ocr::{
    CaptureSession, ImageFileDevice, Orientation, PreviewSettings, TesseractRecognizer,
    encode_png, recognize_with_timeout,
};
use textsnap_types::Region;

#[derive(Parser)]
#[command(about = "Run one capture through the OCR pipeline")]
struct Args {
    /// Image file used as the capture source
    image: PathBuf,

    /// Crop region as left,top,right,bottom (defaults to the centered band)
    #[arg(long, value_parser = parse_region)]
    region: Option<Region>,

    #[arg(long, default_value_t = 128)]
    threshold: u8,

    #[arg(long, default_value = "eng")]
    language: String,

    /// Where to write the binarized crop
    #[arg(long, default_value = "test_capture.png")]
    save: PathBuf,

    /// Stop after preprocessing
    #[arg(long)]
    no_ocr: bool,
}

fn parse_region(s: &str) -> Result<Region, String> {
    let parts: Vec<i32> = s
        .split(',')
        .map(|p| p.trim().parse::<i32>().map_err(|e| format!("{p}: {e}")))
        .collect::<Result<_, _>>()?;
    match parts.as_slice() {
        [left, top, right, bottom] => Ok(Region::new(*left, *top, *right, *bottom)),
        _ => Err("expected left,top,right,bottom".to_string()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .init();

    let args = Args::parse();
    tracing::debug!("=== OCR Test ===");

    // 1. Open the capture source
    let mut session = CaptureSession::start(
        ImageFileDevice::new(&args.image),
        PreviewSettings {
            width: 1920,
            height: 1080,
        },
    )
    .context("Failed to start capture session")?;

    // 2. Capture one still
    let start = Instant::now();
    let frame = session.capture()?;
    tracing::debug!(
        "Captured {}x{} in {:?}",
        frame.width(),
        frame.height(),
        start.elapsed()
    );

    // 3. Preprocess
    let region = args
        .region
        .unwrap_or_else(|| overlay_band(frame.width(), frame.height(), 0.25));
    let preprocessor = ThresholdPreprocessor {
        threshold: args.threshold,
        rounding: Default::default(),
    };
    let start = Instant::now();
    let binary = preprocessor.process(&frame, region)?;
    tracing::debug!(
        "Preprocessed {} in {:?}, {:.1}% white",
        region,
        start.elapsed(),
        binary.white_ratio() * 100.0
    );

    // 4. Save for inspection
    std::fs::write(&args.save, encode_png(binary.as_image())?)?;
    tracing::debug!("Saved to {}", args.save.display());

    if args.no_ocr {
        return Ok(());
    }

    // 5. Run OCR
    let recognizer = TesseractRecognizer::new("tesseract", &args.language);
    let start = Instant::now();
    match recognize_with_timeout(
        &recognizer,
        &binary,
        Orientation::Deg0,
        Duration::from_secs(30),
    )
    .await
    {
        Ok(text) => {
            tracing::debug!("{:?} - {} chars", start.elapsed(), text.len());
            for line in text.lines().take(5) {
                tracing::debug!("> {}", line);
            }
        }
        Err(e) => bail!("OCR failed: {e}"),
    }

    tracing::debug!("=== Done ===");
    Ok(())
}
