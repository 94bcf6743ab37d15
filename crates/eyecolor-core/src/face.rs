//! Faces, eye points and their on-screen markers.
//!
//! Landmark detection itself is an injected collaborator ([`Landmarks`]).
//! Markers are plain data recomputed from the points and the viewport; the
//! presentation layer diffs and draws them.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::Rect;
use crate::image::SourceImage;
use crate::region::{Composite, crop_circle};
use crate::viewport::ViewportState;

/// A point of interest (e.g. an eye centre) in image pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FacePoint {
    pub id: Option<i64>,
    pub face_id: Option<i64>,
    pub position: DVec2,
}

impl FacePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            position: DVec2::new(x, y),
            ..Self::default()
        }
    }

    /// Move by a drag translation measured in view units.
    pub fn drag(&mut self, translation: DVec2, zoom_scale: f64) {
        self.position += translation / zoom_scale;
    }
}

/// An eye as reported by a bottom-left-origin detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeFeature {
    pub position: DVec2,
    pub closed: bool,
}

/// A detected face with its points of interest.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Face {
    pub id: Option<i64>,
    /// Face bounds in image space (top-left origin).
    pub bounds: Rect,
    pub points: Vec<FacePoint>,
}

impl Face {
    /// Build a face from detector output whose origin is the bottom-left
    /// corner. Absent or closed eyes are dropped.
    pub fn from_eye_features(
        image_height: f64,
        bounds: Rect,
        left_eye: Option<EyeFeature>,
        right_eye: Option<EyeFeature>,
    ) -> Self {
        let points = [left_eye, right_eye]
            .into_iter()
            .flatten()
            .filter(|eye| !eye.closed)
            .map(|eye| FacePoint::new(eye.position.x, image_height - eye.position.y))
            .collect();
        Self {
            id: None,
            bounds: bounds.flip_y(image_height),
            points,
        }
    }
}

/// Outcome of landmark detection. An absent face is a normal result.
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    Absent,
    Found(Face),
}

impl Detection {
    /// The first face wins; later ones are ignored.
    pub fn from_faces(faces: Vec<Face>) -> Self {
        faces.into_iter().next().map_or(Self::Absent, Self::Found)
    }
}

/// Face/landmark detector collaborator.
pub trait Landmarks {
    /// Detect faces in `image`. An empty result is valid.
    fn detect(&self, image: &SourceImage) -> Vec<Face>;
}

/// Marker and eye-crop sizing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerConfig {
    /// Marker diameter in image pixels when no face is known.
    pub default_size: f64,
    /// Marker diameter is the face width divided by this.
    pub face_width_divisor: f64,
    /// Inset applied on each side of the marker when cropping an eye.
    pub crop_inset: f64,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            default_size: 36.0,
            face_width_divisor: 12.2,
            crop_inset: 15.0,
        }
    }
}

impl MarkerConfig {
    /// Marker diameter in image pixels.
    pub fn marker_size(&self, face: Option<&Face>) -> f64 {
        match face {
            Some(face) if face.bounds.width() > 0.0 => face.bounds.width() / self.face_width_divisor,
            _ => self.default_size,
        }
    }

    /// Diameter of the circular eye crop, at least one pixel.
    pub fn crop_diameter(&self, face: Option<&Face>) -> f64 {
        (self.marker_size(face) - 2.0 * self.crop_inset).max(1.0)
    }
}

/// A point marker placed in view space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Index of the point in its face.
    pub index: usize,
    pub id: Option<i64>,
    pub center: DVec2,
    /// Diameter in view units.
    pub size: f64,
}

impl Marker {
    pub fn frame(&self) -> Rect {
        Rect::from_center(self.center, DVec2::splat(self.size))
    }
}

/// Place one marker per point. `size` is in image pixels and scales with the
/// zoom.
pub fn marker_layout(points: &[FacePoint], viewport: &ViewportState, size: f64) -> Vec<Marker> {
    points
        .iter()
        .enumerate()
        .map(|(index, point)| Marker {
            index,
            id: point.id,
            center: viewport.image_to_view(point.position),
            size: size * viewport.zoom_scale(),
        })
        .collect()
}

/// Crop a circle around each point and merge the crops left to right.
pub fn eye_composite(image: &SourceImage, points: &[FacePoint], diameter: f64) -> Result<Composite> {
    let crops = points
        .iter()
        .map(|point| crop_circle(image, point.position, diameter))
        .collect::<Result<Vec<_>>>()?;
    Composite::from_crops(&crops)
}
