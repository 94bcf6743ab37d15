/// Errors produced by quantization, extraction and viewport operations.
#[derive(Debug, thiserror::Error)]
pub enum EyeColorError {
    #[error("no eligible pixels to quantize")]
    EmptyInput,

    #[error(
        "crop square at ({x}, {y}) of side {side} does not intersect the {width}x{height} image"
    )]
    OutOfBounds {
        x: i64,
        y: i64,
        side: u32,
        width: u32,
        height: u32,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("pixel buffer holds {actual} pixels, expected {width}x{height}")]
    BufferSize { width: u32, height: u32, actual: usize },

    #[error("invalid viewport state: {0}")]
    InvalidState(&'static str),

    #[error("quantization cancelled")]
    Cancelled,

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, EyeColorError>;
