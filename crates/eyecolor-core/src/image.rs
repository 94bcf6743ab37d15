//! Image representation for the measurement pipeline.

use image::RgbaImage;

use crate::error::{EyeColorError, Result};

/// A fully transparent pixel.
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Source image, always stored as RGBA8 in row-major order.
///
/// The pixel buffer is validated at construction and never mutated
/// afterwards; derived images (crops, composites) are new values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl SourceImage {
    /// Wrap a pixel buffer. Fails when the buffer does not hold exactly
    /// `width * height` pixels.
    pub fn new(width: u32, height: u32, pixels: Vec<[u8; 4]>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(EyeColorError::BufferSize {
                width,
                height,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Image of the given size with every pixel set to `color`.
    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    /// Image of the given size with every pixel transparent.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self::filled(width, height, TRANSPARENT)
    }

    /// Convert from an `image` crate RGBA buffer.
    pub fn from_rgba(rgba: &RgbaImage) -> Result<Self> {
        let (width, height) = rgba.dimensions();
        let pixels: &[[u8; 4]] = bytemuck::try_cast_slice(rgba.as_raw())
            .map_err(|_| EyeColorError::InvalidArgument("RGBA buffer is not a multiple of 4 bytes"))?;
        Self::new(width, height, pixels.to_vec())
    }

    /// Convert into an `image` crate RGBA buffer (e.g. for saving a crop).
    pub fn to_rgba_image(&self) -> Result<RgbaImage> {
        let raw: Vec<u8> = bytemuck::cast_slice(&self.pixels).to_vec();
        RgbaImage::from_raw(self.width, self.height, raw).ok_or(EyeColorError::BufferSize {
            width: self.width,
            height: self.height,
            actual: self.pixels.len(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major RGBA pixels.
    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }

    /// Pixels of row `y`.
    pub fn row(&self, y: u32) -> &[[u8; 4]] {
        let start = y as usize * self.width as usize;
        &self.pixels[start..start + self.width as usize]
    }

    /// Pixel at `(x, y)`, or `None` outside the image.
    pub fn get(&self, x: i64, y: i64) -> Option<[u8; 4]> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Build an image by evaluating `f` at every pixel coordinate.
    pub(crate) fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 4]) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_short_buffer() {
        let err = SourceImage::new(2, 2, vec![[0, 0, 0, 255]; 3]).unwrap_err();
        assert!(matches!(err, EyeColorError::BufferSize { actual: 3, .. }));
    }

    #[test]
    fn test_get_outside_returns_none() {
        let image = SourceImage::filled(3, 2, [1, 2, 3, 255]);
        assert_eq!(image.get(2, 1), Some([1, 2, 3, 255]));
        assert_eq!(image.get(3, 0), None);
        assert_eq!(image.get(-1, 0), None);
    }

    #[test]
    fn test_rgba_conversion_preserves_pixels() {
        let image = SourceImage::new(
            2,
            1,
            vec![[255, 0, 0, 255], [0, 0, 255, 128]],
        )
        .unwrap();
        let rgba = image.to_rgba_image().unwrap();
        assert_eq!(rgba.get_pixel(1, 0).0, [0, 0, 255, 128]);
        let back = SourceImage::from_rgba(&rgba).unwrap();
        assert_eq!(back, image);
    }

    #[test]
    fn test_row_slices_by_width() {
        let image = SourceImage::from_fn(3, 2, |x, y| [x as u8, y as u8, 0, 255]);
        assert_eq!(image.row(1)[2], [2, 1, 0, 255]);
    }
}
