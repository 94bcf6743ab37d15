//! Image loading and saving for the CLI.

use std::path::Path;

use eyecolor_core::{EyeColorError, SourceImage};

/// Load an image from disk as 8-bit RGBA.
///
/// Supports the formats enabled in the `image` crate (PNG, JPEG, ...).
pub fn load_image(path: &Path) -> Result<SourceImage, ImageLoadError> {
    let bytes = std::fs::read(path)?;
    let rgba = image::load_from_memory(&bytes)
        .map_err(ImageLoadError::Decode)?
        .to_rgba8();
    let image = SourceImage::from_rgba(&rgba)?;
    tracing::debug!("decoded {} ({}x{})", path.display(), image.width(), image.height());
    Ok(image)
}

/// Write `image` as PNG (format chosen from the extension).
pub fn save_image(image: &SourceImage, path: &Path) -> Result<(), EyeColorError> {
    image.to_rgba_image()?.save(path)?;
    Ok(())
}

/// Errors that can occur during image loading.
#[derive(Debug, thiserror::Error)]
pub enum ImageLoadError {
    #[error("failed to decode image: {0}")]
    Decode(image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Pixels(#[from] EyeColorError),
}
