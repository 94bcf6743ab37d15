//! Eyecolor Core — domain layer for eye color measurement.
//!
//! This crate contains palette quantization, circular region extraction,
//! viewport geometry and the face/marker model. No async runtime or UI
//! framework dependencies.

pub mod color;
pub mod error;
pub mod face;
pub mod geometry;
pub mod image;
pub mod palette;
pub mod quantize;
pub mod region;
pub mod viewport;

// Re-exports for convenience.
pub use error::{EyeColorError, Result};
pub use face::{Detection, Face, FacePoint, Landmarks, Marker, MarkerConfig};
pub use geometry::Rect;
pub use crate::image::SourceImage;
pub use crate::palette::{Palette, PaletteEntry};
pub use quantize::{QuantizeOptions, quantize, quantize_with};
pub use region::{Composite, RegionCrop, extract_circular_region, merge_side_by_side};
pub use viewport::{ViewportConfig, ViewportState, ZoomBounds, compute_zoom_bounds};
