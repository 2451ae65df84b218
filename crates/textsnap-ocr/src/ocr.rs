use std::io;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, GrayImage, ImageEncoder, imageops};
use textsnap_core::BinaryFrame;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Clockwise rotation the recognizer applies before reading the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Orientation {
    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees % 360 {
            0 => Some(Self::Deg0),
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            _ => None,
        }
    }

    pub fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecognitionError {
    #[error("Failed to start recognizer '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Recognizer I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("Recognizer exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Recognizer output is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("Recognition timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Service(String),
}

/// Text recognition service
#[async_trait]
pub trait Recognizer: Send + Sync {
    fn name(&self) -> &str;

    async fn recognize(
        &self,
        image: &BinaryFrame,
        orientation: Orientation,
    ) -> Result<String, RecognitionError>;
}

/// Run `recognizer` but give up after `timeout`
pub async fn recognize_with_timeout<R: Recognizer + ?Sized>(
    recognizer: &R,
    image: &BinaryFrame,
    orientation: Orientation,
    timeout: Duration,
) -> Result<String, RecognitionError> {
    match tokio::time::timeout(timeout, recognizer.recognize(image, orientation)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("{} did not answer within {:?}", recognizer.name(), timeout);
            Err(RecognitionError::Timeout(timeout))
        }
    }
}

/// Binary frame rotated as the orientation hint asks
pub fn oriented(image: &BinaryFrame, orientation: Orientation) -> GrayImage {
    let image = image.as_image();
    match orientation {
        Orientation::Deg0 => image.clone(),
        Orientation::Deg90 => imageops::rotate90(image),
        Orientation::Deg180 => imageops::rotate180(image),
        Orientation::Deg270 => imageops::rotate270(image),
    }
}

pub fn encode_png(image: &GrayImage) -> Result<Vec<u8>, RecognitionError> {
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::L8,
    )?;
    Ok(buffer)
}

/// Recognizer backed by the `tesseract` command line tool.
///
/// The frame is piped in as PNG on stdin and the text read back from stdout.
pub struct TesseractRecognizer {
    program: String,
    language: String,
}

impl TesseractRecognizer {
    pub fn new(program: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            language: language.into(),
        }
    }
}

#[async_trait]
impl Recognizer for TesseractRecognizer {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn recognize(
        &self,
        image: &BinaryFrame,
        orientation: Orientation,
    ) -> Result<String, RecognitionError> {
        let png = encode_png(&oriented(image, orientation))?;
        tracing::debug!(
            "Sending {} byte PNG ({}x{}, {}°) to {}",
            png.len(),
            image.width(),
            image.height(),
            orientation.degrees(),
            self.program
        );

        let mut child = Command::new(&self.program)
            .args(["stdin", "stdout", "-l", self.language.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RecognitionError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| RecognitionError::Service("recognizer stdin unavailable".to_string()))?;

        // Feed stdin while draining stdout so neither pipe fills up
        let writer = async move {
            stdin.write_all(&png).await?;
            stdin.shutdown().await
        };
        let (written, output) = tokio::join!(writer, child.wait_with_output());
        let output = output?;

        if !output.status.success() {
            return Err(RecognitionError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written?;

        let text = String::from_utf8(output.stdout)?;
        Ok(text.trim().to_string())
    }
}
