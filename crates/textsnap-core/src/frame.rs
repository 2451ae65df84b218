use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, RgbaImage};

use crate::error::PreprocessError;

/// Captured RGB pixel grid. Never modified once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    /// Build from tightly packed RGB bytes, row-major
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, PreprocessError> {
        let size_error = PreprocessError::BufferSize {
            len: data.len(),
            width,
            height,
            channels: 3,
        };
        if data.len() as u64 != width as u64 * height as u64 * 3 {
            return Err(size_error);
        }
        RgbImage::from_raw(width, height, data)
            .map(Self::new)
            .ok_or(size_error)
    }

    /// Drop the alpha channel of an RGBA capture
    pub fn from_rgba(image: &RgbaImage) -> Self {
        let image = RgbImage::from_fn(image.width(), image.height(), |x, y| {
            let [r, g, b, _] = image.get_pixel(x, y).0;
            Rgb([r, g, b])
        });
        Self { image }
    }

    pub fn from_dynamic(image: &DynamicImage) -> Self {
        Self::new(image.to_rgb8())
    }

    /// Solid frame, mostly useful for tests and placeholders
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        Self::new(RgbImage::from_pixel(width, height, Rgb(rgb)))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// `None` outside the frame
    pub fn get_rgb(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        self.image.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// Panics if `(x, y)` is outside the frame
    pub(crate) fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        self.image.get_pixel(x, y).0
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }
}

/// Single-channel luminance grid derived from a [`Frame`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayFrame {
    image: GrayImage,
}

impl GrayFrame {
    pub fn new(image: GrayImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn get_luma(&self, x: u32, y: u32) -> Option<u8> {
        self.image.get_pixel_checked(x, y).map(|p| p.0[0])
    }

    pub(crate) fn luma(&self, x: u32, y: u32) -> u8 {
        self.image.get_pixel(x, y).0[0]
    }

    /// Expand to an RGB frame with R = G = B = luminance
    pub fn to_rgb(&self) -> Frame {
        Frame::new(RgbImage::from_fn(self.width(), self.height(), |x, y| {
            let l = self.luma(x, y);
            Rgb([l, l, l])
        }))
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }
}

/// Pure black and white grid: every value is exactly 0 or 255.
///
/// Produced by binarization. [`BinaryFrame::from_gray_checked`] is the only other
/// way in and it refuses anything with a third value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryFrame {
    image: GrayImage,
}

impl BinaryFrame {
    pub const BLACK: u8 = 0;
    pub const WHITE: u8 = 255;

    pub(crate) fn from_binarized(image: GrayImage) -> Self {
        debug_assert!(
            image
                .pixels()
                .all(|p| p.0[0] == Self::BLACK || p.0[0] == Self::WHITE)
        );
        Self { image }
    }

    pub fn from_gray_checked(image: GrayImage) -> Result<Self, PreprocessError> {
        if let Some((x, y, Luma([value]))) = image
            .enumerate_pixels()
            .find(|(_, _, p)| p.0[0] != Self::BLACK && p.0[0] != Self::WHITE)
        {
            return Err(PreprocessError::NotBinary {
                x,
                y,
                value: *value,
            });
        }
        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn get_value(&self, x: u32, y: u32) -> Option<u8> {
        self.image.get_pixel_checked(x, y).map(|p| p.0[0])
    }

    /// `None` outside the frame
    pub fn is_white(&self, x: u32, y: u32) -> Option<bool> {
        self.get_value(x, y).map(|v| v == Self::WHITE)
    }

    pub(crate) fn value(&self, x: u32, y: u32) -> u8 {
        self.image.get_pixel(x, y).0[0]
    }

    /// Share of white pixels, 0.0 for an empty frame
    pub fn white_ratio(&self) -> f64 {
        let total = self.image.pixels().len();
        if total == 0 {
            return 0.0;
        }
        let white = self.image.pixels().filter(|p| p.0[0] == Self::WHITE).count();
        white as f64 / total as f64
    }

    /// View as a grayscale frame, e.g. to run it through binarization again
    pub fn to_gray(&self) -> GrayFrame {
        GrayFrame::new(self.image.clone())
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }

    pub fn into_image(self) -> GrayImage {
        self.image
    }
}
