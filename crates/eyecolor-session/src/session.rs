//! The measurement session.
//!
//! Flow: load an image, detect a face, then either measure the eye crops
//! or, when no usable eye points exist, the whole image. Dragging a point
//! moves it; ending the touch re-measures. Every measurement supersedes the
//! previous one.

use std::sync::Arc;

use eyecolor_core::face::{eye_composite, marker_layout};
use eyecolor_core::quantize::QuantizeOptions;
use eyecolor_core::viewport::FACE_FILL;
use eyecolor_core::{
    Detection, EyeColorError, Face, Landmarks, Marker, MarkerConfig, Palette, SourceImage, ViewportConfig,
    ViewportState,
};
use glam::DVec2;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;

use crate::error::{Result, SessionError};
use crate::events::{MeasureTarget, PaletteMarker, PaletteUpdate, palette_marker_size};
use crate::worker::PaletteWorker;

/// Session configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    pub quantize: QuantizeOptions,
    pub markers: MarkerConfig,
    pub viewport: ViewportConfig,
}

struct Pending {
    generation: u64,
    target: MeasureTarget,
}

pub struct MeasurementSession {
    config: SessionConfig,
    detector: Box<dyn Landmarks>,
    worker: PaletteWorker,
    image: Option<Arc<SourceImage>>,
    face: Option<Face>,
    viewport: ViewportState,
    pending: Option<Pending>,
    palette: Option<Palette>,
    /// What the current palette was computed from.
    measured: Option<MeasureTarget>,
}

impl MeasurementSession {
    pub fn new(config: SessionConfig, detector: Box<dyn Landmarks>, runtime: Handle) -> Self {
        Self {
            config,
            detector,
            worker: PaletteWorker::new(runtime),
            image: None,
            face: None,
            viewport: ViewportState::new(config.viewport),
            pending: None,
            palette: None,
            measured: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn image(&self) -> Option<&SourceImage> {
        self.image.as_deref()
    }

    pub fn face(&self) -> Option<&Face> {
        self.face.as_ref()
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    /// Direct access for pan/zoom gestures.
    pub fn viewport_mut(&mut self) -> &mut ViewportState {
        &mut self.viewport
    }

    /// Latest delivered palette.
    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    /// What the latest palette was measured on.
    pub fn measured(&self) -> Option<&MeasureTarget> {
        self.measured.as_ref()
    }

    pub fn is_measuring(&self) -> bool {
        self.pending.is_some()
    }

    /// Replace the image. Everything derived from the previous one is
    /// discarded and any measurement in flight is cancelled.
    ///
    /// A rejected image leaves the session untouched.
    pub fn load_image(&mut self, image: SourceImage) -> Result<()> {
        if image.is_empty() {
            return Err(EyeColorError::EmptyInput.into());
        }
        let mut viewport = self.viewport.clone();
        viewport.display(DVec2::new(image.width() as f64, image.height() as f64))?;

        self.worker.cancel();
        self.pending = None;
        self.palette = None;
        self.measured = None;
        self.face = None;
        self.viewport = viewport;
        tracing::info!("image loaded ({}x{})", image.width(), image.height());
        self.image = Some(Arc::new(image));
        Ok(())
    }

    /// Run the injected detector and start measuring.
    ///
    /// With no face, the whole image is measured instead.
    pub fn detect(&mut self) -> Result<Detection> {
        let image = self.image.clone().ok_or(SessionError::NoImage)?;
        let detection = Detection::from_faces(self.detector.detect(&image));
        match &detection {
            Detection::Absent => {
                tracing::info!("no face detected, measuring the whole image");
                self.face = None;
                self.measure_whole_image()?;
            }
            Detection::Found(face) => self.set_face(face.clone())?,
        }
        Ok(detection)
    }

    /// Use `face` (detected or user supplied), focus on it and measure.
    pub fn set_face(&mut self, face: Face) -> Result<()> {
        if self.image.is_none() {
            return Err(SessionError::NoImage);
        }
        if face.bounds.width() > 0.0 && face.bounds.height() > 0.0 {
            self.viewport.focus_rect(face.bounds, FACE_FILL)?;
        }
        tracing::info!("face with {} points", face.points.len());
        self.face = Some(face);
        self.measure()?;
        Ok(())
    }

    /// Measure the eye crops, or the whole image when there are no points.
    /// Returns the request generation.
    pub fn measure(&mut self) -> Result<u64> {
        let image = self.image.clone().ok_or(SessionError::NoImage)?;
        let points = match &self.face {
            Some(face) if !face.points.is_empty() => &face.points,
            _ => {
                tracing::info!("no eye points, measuring the whole image");
                return self.measure_whole_image();
            }
        };

        let diameter = self.config.markers.crop_diameter(self.face.as_ref());
        let composite = eye_composite(&image, points, diameter)?;
        let crop = Arc::new(composite.image.clone());
        let generation = self.worker.request(crop, self.config.quantize);
        self.pending = Some(Pending {
            generation,
            target: MeasureTarget::Eyes(composite),
        });
        Ok(generation)
    }

    fn measure_whole_image(&mut self) -> Result<u64> {
        let image = self.image.clone().ok_or(SessionError::NoImage)?;
        let generation = self.worker.request(image, self.config.quantize);
        self.pending = Some(Pending {
            generation,
            target: MeasureTarget::WholeImage,
        });
        Ok(generation)
    }

    /// Move point `index` by a drag translation in view units.
    pub fn drag_point(&mut self, index: usize, translation: DVec2) -> Result<()> {
        let zoom = self.viewport.zoom_scale();
        let face = self.face.as_mut().ok_or(SessionError::NoFace)?;
        let len = face.points.len();
        let point = face
            .points
            .get_mut(index)
            .ok_or(SessionError::PointIndex { index, len })?;
        point.drag(translation, zoom);
        Ok(())
    }

    /// A point drag finished: re-measure with the moved points.
    pub fn end_touch(&mut self) -> Result<u64> {
        self.measure()
    }

    /// The view bounds changed.
    pub fn resize_view(&mut self, view_size: DVec2) -> Result<()> {
        self.viewport.resize(view_size)?;
        Ok(())
    }

    /// Apply a delivered update, if any. Returns whether the palette changed.
    pub fn poll(&mut self) -> Result<bool> {
        match self.worker.try_next() {
            Some(update) => self.apply(update).map(|_| true),
            None => Ok(false),
        }
    }

    /// Wait for the measurement in flight and apply it.
    pub async fn wait_for_palette(&mut self) -> Result<&Palette> {
        if self.pending.is_none() {
            return Err(SessionError::NothingPending);
        }
        loop {
            let Some(update) = self.worker.next().await else {
                return Err(SessionError::NothingPending);
            };
            if self
                .pending
                .as_ref()
                .is_some_and(|p| p.generation == update.generation)
            {
                self.apply(update)?;
                break;
            }
        }
        self.palette.as_ref().ok_or(SessionError::NothingPending)
    }

    /// Apply one update. Updates for anything but the pending request are
    /// ignored; a failed measurement is returned as an error.
    pub fn apply(&mut self, update: PaletteUpdate) -> Result<()> {
        let Some(pending) = self.pending.take_if(|p| p.generation == update.generation) else {
            tracing::debug!("ignoring palette update {} with no matching request", update.generation);
            return Ok(());
        };

        match update.result {
            Ok(palette) => {
                if let Some(entry) = palette.dominant() {
                    tracing::info!(
                        "palette ready: {} colors, dominant {} ({:.1}%)",
                        palette.len(),
                        entry.hex(),
                        entry.dominance
                    );
                }
                self.palette = Some(palette);
                self.measured = Some(pending.target);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("palette measurement failed: {e}");
                Err(e.into())
            }
        }
    }

    /// Point markers in view space.
    pub fn markers(&self) -> Vec<Marker> {
        let Some(face) = &self.face else {
            return Vec::new();
        };
        let size = self.config.markers.marker_size(Some(face));
        marker_layout(&face.points, &self.viewport, size)
    }

    /// Palette colors located on screen, for decoration markers. Marker size
    /// follows dominance and scales with the zoom.
    pub fn palette_markers(&self) -> Vec<PaletteMarker> {
        let (Some(palette), Some(target), Some(image)) =
            (&self.palette, &self.measured, &self.image)
        else {
            return Vec::new();
        };

        let (anchors, composite) = match target {
            MeasureTarget::WholeImage => (palette.anchors(image, &self.config.quantize), None),
            MeasureTarget::Eyes(composite) => (
                palette.anchors(&composite.image, &self.config.quantize),
                Some(composite),
            ),
        };

        let zoom = self.viewport.zoom_scale();
        let height = image.height() as f64;
        anchors
            .into_iter()
            .zip(palette.iter())
            .enumerate()
            .filter_map(|(entry, (anchor, palette_entry))| {
                let anchor = anchor?;
                let source = match composite {
                    Some(composite) => composite.to_source(anchor)?,
                    None => anchor,
                };
                Some(PaletteMarker {
                    entry,
                    color: palette_entry.color,
                    center: self.viewport.image_to_view(source),
                    size: palette_marker_size(height, palette_entry.dominance) * zoom,
                })
            })
            .collect()
    }
}
