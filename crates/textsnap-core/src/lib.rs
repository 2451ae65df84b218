pub mod error;
pub mod frame;
pub mod preprocess;
pub mod region;
pub mod text;

pub use error::PreprocessError;
pub use frame::{BinaryFrame, Frame, GrayFrame};
pub use preprocess::{
    DefaultPreprocessor, Preprocessor, ThresholdPreprocessor, binarize, crop, grayscale,
    luminance, preprocess,
};
pub use region::{SelectionTracker, check_bounds, map_to_frame, overlay_band};
pub use text::{DefaultTextCleaner, TextCleaner};
