mod capture;
mod ocr;
mod session;

pub use capture::{
    CaptureDevice, DeviceError, ImageFileDevice, Permission, PreviewSettings, StaticDevice,
};
pub use ocr::{
    Orientation, RecognitionError, Recognizer, TesseractRecognizer, encode_png, oriented,
    recognize_with_timeout,
};
pub use session::{CaptureSession, SessionError, SessionState};
