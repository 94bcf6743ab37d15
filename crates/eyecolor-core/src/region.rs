//! Circular region extraction and side-by-side composition.
//!
//! Out-of-bounds policy: pad with transparency. The crop square is neither
//! moved nor clipped to the source; parts of it that fall outside the source
//! read as transparent, so they are skipped by the quantizer. Only a square
//! with no overlap at all is an error.

use glam::{DVec2, I64Vec2};

use crate::error::{EyeColorError, Result};
use crate::image::{SourceImage, TRANSPARENT};

/// A circular crop and the source position of its top-left pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionCrop {
    pub image: SourceImage,
    pub origin: I64Vec2,
}

/// Crop a `diameter`-sized square centred on `center` and mask everything
/// outside its inscribed circle.
pub fn extract_circular_region(
    image: &SourceImage,
    center: DVec2,
    diameter: f64,
) -> Result<SourceImage> {
    crop_circle(image, center, diameter).map(|crop| crop.image)
}

/// Like [`extract_circular_region`], keeping the crop origin.
pub fn crop_circle(image: &SourceImage, center: DVec2, diameter: f64) -> Result<RegionCrop> {
    if !diameter.is_finite() || !center.is_finite() {
        return Err(EyeColorError::InvalidArgument("crop center and diameter must be finite"));
    }
    let side_f = diameter.round();
    if side_f < 1.0 || side_f > u32::MAX as f64 {
        return Err(EyeColorError::InvalidArgument("crop diameter must round to at least 1 pixel"));
    }
    let side = side_f as u32;

    let origin = (center - DVec2::splat(side_f / 2.0)).round().as_i64vec2();
    let (width, height) = (image.width() as i64, image.height() as i64);
    if origin.x >= width
        || origin.y >= height
        || origin.x + side as i64 <= 0
        || origin.y + side as i64 <= 0
    {
        return Err(EyeColorError::OutOfBounds {
            x: origin.x,
            y: origin.y,
            side,
            width: image.width(),
            height: image.height(),
        });
    }

    let radius = side_f / 2.0;
    let crop = SourceImage::from_fn(side, side, |x, y| {
        let offset = DVec2::new(x as f64 + 0.5 - radius, y as f64 + 0.5 - radius);
        if offset.length_squared() > radius * radius {
            return TRANSPARENT;
        }
        image
            .get(origin.x + x as i64, origin.y + y as i64)
            .unwrap_or(TRANSPARENT)
    });

    Ok(RegionCrop { image: crop, origin })
}

/// Draw `left` at the origin and `right` immediately to its right.
///
/// The result is as wide as both inputs and as tall as the taller one;
/// uncovered pixels are transparent. Without `right`, `left` is returned
/// unchanged.
pub fn merge_side_by_side(left: &SourceImage, right: Option<&SourceImage>) -> SourceImage {
    let Some(right) = right else {
        return left.clone();
    };
    let split = left.width();
    SourceImage::from_fn(
        left.width() + right.width(),
        left.height().max(right.height()),
        |x, y| {
            let px = if x < split {
                left.get(x as i64, y as i64)
            } else {
                right.get((x - split) as i64, y as i64)
            };
            px.unwrap_or(TRANSPARENT)
        },
    )
}

/// Placement of one crop inside a [`Composite`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositePart {
    pub offset_x: u32,
    pub width: u32,
    pub height: u32,
    pub source_origin: I64Vec2,
}

/// Crops merged left to right, remembering where each one came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    pub image: SourceImage,
    pub parts: Vec<CompositePart>,
}

impl Composite {
    pub fn from_crops(crops: &[RegionCrop]) -> Result<Self> {
        let Some((first, rest)) = crops.split_first() else {
            return Err(EyeColorError::EmptyInput);
        };

        let mut parts = vec![CompositePart {
            offset_x: 0,
            width: first.image.width(),
            height: first.image.height(),
            source_origin: first.origin,
        }];
        let mut image = first.image.clone();
        for crop in rest {
            parts.push(CompositePart {
                offset_x: image.width(),
                width: crop.image.width(),
                height: crop.image.height(),
                source_origin: crop.origin,
            });
            image = merge_side_by_side(&image, Some(&crop.image));
        }

        Ok(Self { image, parts })
    }

    /// Map a composite pixel coordinate to source image coordinates.
    pub fn to_source(&self, pixel: DVec2) -> Option<DVec2> {
        self.parts.iter().find_map(|part| {
            let local = DVec2::new(pixel.x - part.offset_x as f64, pixel.y);
            let inside = local.x >= 0.0
                && local.y >= 0.0
                && local.x < part.width as f64
                && local.y < part.height as f64;
            inside.then(|| part.source_origin.as_dvec2() + local)
        })
    }
}
