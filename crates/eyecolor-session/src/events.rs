//! Messages passed between the palette worker and the session.

use eyecolor_core::region::Composite;
use eyecolor_core::{EyeColorError, Palette};
use glam::DVec2;
use palette::Srgb;
use serde::{Deserialize, Serialize};

/// What a palette request measured.
#[derive(Debug, Clone, PartialEq)]
pub enum MeasureTarget {
    /// The whole source image (no usable face points).
    WholeImage,
    /// Circular crops around the face points, merged side by side.
    Eyes(Composite),
}

/// Result of one background quantization.
#[derive(Debug)]
pub struct PaletteUpdate {
    /// Request generation; stale generations are dropped before delivery.
    pub generation: u64,
    pub result: Result<Palette, EyeColorError>,
}

/// A palette color located on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaletteMarker {
    /// Index into the palette.
    pub entry: usize,
    pub color: Srgb<u8>,
    /// View-space position of the pixels that make up the entry.
    pub center: DVec2,
    /// Diameter in view units; grows with the entry's dominance.
    pub size: f64,
}

/// Palette marker diameter is this fraction of the image height, plus the
/// same amount again scaled by the entry's dominance.
pub const PALETTE_MARKER_BASE: f64 = 0.1;

/// Palette marker diameter in image pixels for an entry with `dominance`
/// percent of the pixels.
pub fn palette_marker_size(image_height: f64, dominance: f64) -> f64 {
    let base = PALETTE_MARKER_BASE * image_height;
    base + dominance * base / 100.0
}
