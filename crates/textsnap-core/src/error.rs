use textsnap_types::Region;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreprocessError {
    #[error("Region {region} is inverted")]
    Inverted { region: Region },

    #[error("Region {region} has no area")]
    Empty { region: Region },

    #[error("Region {region} exceeds frame bounds {width}x{height}")]
    OutOfBounds {
        region: Region,
        width: u32,
        height: u32,
    },

    #[error("Pixel buffer of {len} bytes does not match {width}x{height} with {channels} channels")]
    BufferSize {
        len: usize,
        width: u32,
        height: u32,
        channels: u8,
    },

    #[error("Pixel value {value} at ({x}, {y}) is neither 0 nor 255")]
    NotBinary { x: u32, y: u32, value: u8 },
}
