//! Binarization pipeline run on the captured region before recognition.
//!
//! crop → grayscale → fixed global threshold. Every stage takes an immutable
//! buffer and returns a new one; [`preprocess`] runs all three in a single pass.

use image::{GrayImage, Luma, imageops};
use textsnap_config::ocr::{LumaRounding, OcrConfig};
use textsnap_types::Region;

use crate::error::PreprocessError;
use crate::frame::{BinaryFrame, Frame, GrayFrame};
use crate::region::check_bounds;

/// Perceptual weights for R, G and B
pub const LUMA_WEIGHTS: [f64; 3] = [0.2989, 0.5870, 0.1140];

pub const DEFAULT_THRESHOLD: u8 = 128;

/// Weighted luminance of one pixel. Non-decreasing in every channel.
pub fn luminance(rgb: [u8; 3], rounding: LumaRounding) -> u8 {
    let [r, g, b] = rgb;
    let sum = LUMA_WEIGHTS[0] * r as f64 + LUMA_WEIGHTS[1] * g as f64 + LUMA_WEIGHTS[2] * b as f64;
    let value = match rounding {
        LumaRounding::Round => sum.round(),
        LumaRounding::Truncate => sum.trunc(),
    };
    value.clamp(0.0, 255.0) as u8
}

/// White only when strictly above the threshold
#[inline]
fn threshold_value(luma: u8, threshold: u8) -> u8 {
    if luma > threshold {
        BinaryFrame::WHITE
    } else {
        BinaryFrame::BLACK
    }
}

/// Copy the sub-grid under `region`. Rejects the region before touching any pixel.
pub fn crop(frame: &Frame, region: Region) -> Result<Frame, PreprocessError> {
    check_bounds(region, frame.width(), frame.height())?;
    let cropped = imageops::crop_imm(
        frame.as_image(),
        region.left as u32,
        region.top as u32,
        region.width() as u32,
        region.height() as u32,
    )
    .to_image();
    Ok(Frame::new(cropped))
}

pub fn grayscale(frame: &Frame, rounding: LumaRounding) -> GrayFrame {
    let image = GrayImage::from_fn(frame.width(), frame.height(), |x, y| {
        Luma([luminance(frame.rgb(x, y), rounding)])
    });
    GrayFrame::new(image)
}

pub fn binarize(gray: &GrayFrame, threshold: u8) -> BinaryFrame {
    let image = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        Luma([threshold_value(gray.luma(x, y), threshold)])
    });
    BinaryFrame::from_binarized(image)
}

/// Crop, grayscale and binarize in one pass over the region.
///
/// Output is identical to `binarize(&grayscale(&crop(frame, region)?, rounding), threshold)`.
pub fn preprocess(
    frame: &Frame,
    region: Region,
    threshold: u8,
    rounding: LumaRounding,
) -> Result<BinaryFrame, PreprocessError> {
    check_bounds(region, frame.width(), frame.height())?;

    let (left, top) = (region.left as u32, region.top as u32);
    let (width, height) = (region.width() as u32, region.height() as u32);
    tracing::trace!(%region, width, height, threshold, "Preprocessing region");

    let image = GrayImage::from_fn(width, height, |x, y| {
        let luma = luminance(frame.rgb(left + x, top + y), rounding);
        Luma([threshold_value(luma, threshold)])
    });
    Ok(BinaryFrame::from_binarized(image))
}

pub trait Preprocessor {
    fn threshold(&self) -> u8 {
        DEFAULT_THRESHOLD
    }

    fn rounding(&self) -> LumaRounding {
        LumaRounding::Round
    }

    fn process(&self, frame: &Frame, region: Region) -> Result<BinaryFrame, PreprocessError> {
        preprocess(frame, region, self.threshold(), self.rounding())
    }
}

pub struct DefaultPreprocessor;
impl Preprocessor for DefaultPreprocessor {}

/// Preprocessor carrying user-tuned threshold and rounding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdPreprocessor {
    pub threshold: u8,
    pub rounding: LumaRounding,
}

impl ThresholdPreprocessor {
    pub fn from_config(config: &OcrConfig) -> Self {
        Self {
            threshold: config.threshold,
            rounding: config.luma_rounding,
        }
    }
}

impl Preprocessor for ThresholdPreprocessor {
    fn threshold(&self) -> u8 {
        self.threshold
    }

    fn rounding(&self) -> LumaRounding {
        self.rounding
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};

    use super::*;

    /// Deterministic gradient so every pixel differs from its neighbours
    fn gradient(width: u32, height: u32) -> Frame {
        Frame::new(RgbImage::from_fn(width, height, |x, y| {
            Rgb([
                ((x * 37 + y * 11) % 256) as u8,
                ((x * 5 + y * 53) % 256) as u8,
                ((x * 101 + y * 7) % 256) as u8,
            ])
        }))
    }

    #[test]
    fn white_pixel_stays_white() {
        assert_eq!(luminance([255, 255, 255], LumaRounding::Round), 255);
        let out = DefaultPreprocessor
            .process(&Frame::filled(1, 1, [255, 255, 255]), Region::new(0, 0, 1, 1))
            .unwrap();
        assert_eq!(out.value(0, 0), 255);
    }

    #[test]
    fn black_pixel_stays_black() {
        assert_eq!(luminance([0, 0, 0], LumaRounding::Round), 0);
        let out = DefaultPreprocessor
            .process(&Frame::filled(1, 1, [0, 0, 0]), Region::new(0, 0, 1, 1))
            .unwrap();
        assert_eq!(out.value(0, 0), 0);
    }

    #[test]
    fn truncation_keeps_reference_behaviour() {
        assert_eq!(luminance([255, 255, 255], LumaRounding::Truncate), 254);
        assert_eq!(luminance([100, 150, 200], LumaRounding::Truncate), 140);
        assert_eq!(luminance([100, 150, 200], LumaRounding::Round), 141);
    }

    #[test]
    fn luminance_128_maps_to_black() {
        assert_eq!(luminance([128, 128, 128], LumaRounding::Round), 128);

        let gray = GrayFrame::new(GrayImage::from_fn(2, 1, |x, _| Luma([128 + x as u8])));
        let binary = binarize(&gray, DEFAULT_THRESHOLD);
        assert_eq!(binary.value(0, 0), 0);
        assert_eq!(binary.value(1, 0), 255);
    }

    #[test]
    fn luminance_is_monotonic_per_channel() {
        for rounding in [LumaRounding::Round, LumaRounding::Truncate] {
            for base in (0..=255u16).step_by(17) {
                for channel in 0..3 {
                    let mut rgb = [base as u8, (255 - base) as u8, (base / 2) as u8];
                    let mut previous = 0;
                    for v in 0..=255u8 {
                        rgb[channel] = v;
                        let luma = luminance(rgb, rounding);
                        if v > 0 {
                            assert!(luma >= previous, "{rgb:?} dropped below {previous}");
                        }
                        previous = luma;
                    }
                }
            }
        }
    }

    #[test]
    fn output_has_region_dimensions_and_two_values() {
        let frame = gradient(64, 48);
        let region = Region::new(5, 7, 45, 30);

        let out = DefaultPreprocessor.process(&frame, region).unwrap();
        assert_eq!(out.dimensions(), (40, 23));
        assert!(out.as_image().pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    #[test]
    fn fused_pass_matches_staged_pipeline() {
        let frame = gradient(50, 40);
        let region = Region::new(3, 4, 47, 33);

        for rounding in [LumaRounding::Round, LumaRounding::Truncate] {
            for threshold in [0, 64, 128, 200, 255] {
                let staged = binarize(
                    &grayscale(&crop(&frame, region).unwrap(), rounding),
                    threshold,
                );
                let fused = preprocess(&frame, region, threshold, rounding).unwrap();
                assert_eq!(staged, fused);
            }
        }
    }

    #[test]
    fn binarizing_binary_frame_is_identity() {
        let binary = DefaultPreprocessor
            .process(&gradient(20, 20), Region::new(0, 0, 20, 20))
            .unwrap();
        assert_eq!(binarize(&binary.to_gray(), DEFAULT_THRESHOLD), binary);
    }

    #[test]
    fn grayscale_does_not_touch_source() {
        let frame = gradient(8, 8);
        let before = frame.clone();
        let gray = grayscale(&frame, LumaRounding::Round);
        assert_eq!(frame, before);
        assert_eq!(gray.dimensions(), frame.dimensions());
    }

    #[test]
    fn crop_copies_the_right_pixels() {
        let frame = gradient(10, 10);
        let cropped = crop(&frame, Region::new(2, 3, 6, 9)).unwrap();
        assert_eq!(cropped.dimensions(), (4, 6));
        assert_eq!(cropped.rgb(0, 0), frame.rgb(2, 3));
        assert_eq!(cropped.rgb(3, 5), frame.rgb(5, 8));
    }

    #[test]
    fn inverted_region_is_rejected() {
        let frame = gradient(30, 30);
        let region = Region::new(10, 10, 5, 20);
        assert_eq!(
            DefaultPreprocessor.process(&frame, region),
            Err(PreprocessError::Inverted { region })
        );
        assert_eq!(crop(&frame, region), Err(PreprocessError::Inverted { region }));
    }

    #[test]
    fn region_wider_than_frame_is_rejected() {
        let frame = gradient(30, 30);
        let region = Region::new(0, 0, 31, 10);
        assert_eq!(
            DefaultPreprocessor.process(&frame, region),
            Err(PreprocessError::OutOfBounds {
                region,
                width: 30,
                height: 30
            })
        );
    }

    #[test]
    fn threshold_preprocessor_uses_config() {
        let mut config = OcrConfig::default();
        config.threshold = 10;
        let preprocessor = ThresholdPreprocessor::from_config(&config);

        // luminance 20: black at the default threshold, white at 10
        let frame = Frame::filled(1, 1, [20, 20, 20]);
        let region = Region::new(0, 0, 1, 1);
        assert_eq!(DefaultPreprocessor.process(&frame, region).unwrap().value(0, 0), 0);
        assert_eq!(preprocessor.process(&frame, region).unwrap().value(0, 0), 255);
    }
}
