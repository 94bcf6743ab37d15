//! Zoom and pan geometry for the image viewer.
//!
//! Image space is the source pixel grid. View space is the visible window:
//! content is scaled by `zoom_scale`, centred on any axis where it is
//! smaller than the view, and scrolled by `content_offset` otherwise.
//!
//! ```text
//! view  = image × zoom + frame_origin − content_offset
//! image = (view + content_offset − frame_origin) / zoom
//! ```

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::{EyeColorError, Result};
use crate::geometry::Rect;

/// Maximum zoom as a multiple of the minimum (fit) zoom.
pub const DEFAULT_MAX_SCALE_FACTOR: f64 = 5.0;
/// Double-tap zooms in to this multiple of the minimum zoom.
pub const DOUBLE_TAP_ZOOM_FACTOR: f64 = 2.0;
/// Share of the view width/height a focused face should fill.
pub const FACE_FILL: DVec2 = DVec2::new(0.6, 0.65);
/// Zoom within this distance of the minimum counts as "at minimum".
const MIN_SCALE_EPSILON: f64 = 1e-9;

/// Allowed zoom range for an image inside a view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomBounds {
    pub min: f64,
    pub max: f64,
}

impl ZoomBounds {
    pub fn clamp(&self, scale: f64) -> f64 {
        scale.clamp(self.min, self.max)
    }
}

/// Compute the minimum (fit) and maximum zoom.
///
/// When image and view are both portrait or both landscape the image fills
/// the view width; otherwise the smaller of the width/height fits is used so
/// the whole image stays visible. The maximum is `max_scale_factor × min`,
/// and the minimum never exceeds it.
///
/// Sizes must be positive.
pub fn compute_zoom_bounds(image_size: DVec2, view_size: DVec2, max_scale_factor: f64) -> ZoomBounds {
    let x_scale = view_size.x / image_size.x;
    let y_scale = view_size.y / image_size.y;

    let image_portrait = image_size.y > image_size.x;
    let view_portrait = view_size.y >= view_size.x;
    let mut min = if image_portrait == view_portrait {
        x_scale
    } else {
        x_scale.min(y_scale)
    };

    let max = max_scale_factor * min;
    if min > max {
        min = max;
    }
    ZoomBounds { min, max }
}

/// Viewer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// Size of the visible window in view units.
    pub view_size: DVec2,
    pub max_scale_factor: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            view_size: DVec2::new(375.0, 667.0),
            max_scale_factor: DEFAULT_MAX_SCALE_FACTOR,
        }
    }
}

/// What the viewer is currently doing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    Idle,
    /// A pinch gesture is in progress.
    Zooming,
    /// View bounds are changing. Holds the image point that was centred and
    /// the absolute zoom to restore (`0.0` means "the new minimum").
    Resizing { center: DVec2, scale: f64 },
}

/// Zoom/pan state of the viewer.
///
/// Every public mutation leaves `min_zoom_scale ≤ zoom_scale ≤ max_zoom_scale`
/// and the content offset inside its scrollable range.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportState {
    image_size: DVec2,
    view_size: DVec2,
    zoom_scale: f64,
    bounds: ZoomBounds,
    content_offset: DVec2,
    max_scale_factor: f64,
    interaction: Interaction,
}

impl ViewportState {
    /// Empty viewer. Zoom is fixed at 1 until an image is displayed.
    pub fn new(config: ViewportConfig) -> Self {
        Self {
            image_size: DVec2::ZERO,
            view_size: config.view_size,
            zoom_scale: 1.0,
            bounds: ZoomBounds { min: 1.0, max: 1.0 },
            content_offset: DVec2::ZERO,
            max_scale_factor: config.max_scale_factor,
            interaction: Interaction::Idle,
        }
    }

    /// Show a new image at minimum zoom, scrolled to the top-left.
    pub fn display(&mut self, image_size: DVec2) -> Result<()> {
        if !is_positive_size(image_size) {
            return Err(EyeColorError::InvalidArgument("image size must be finite and positive"));
        }
        check_view(self.view_size, self.max_scale_factor)?;
        self.image_size = image_size;
        self.bounds = compute_zoom_bounds(image_size, self.view_size, self.max_scale_factor);
        self.zoom_scale = self.bounds.min;
        self.content_offset = DVec2::ZERO;
        self.interaction = Interaction::Idle;
        Ok(())
    }

    pub fn has_image(&self) -> bool {
        self.image_size.x > 0.0 && self.image_size.y > 0.0
    }

    pub fn image_size(&self) -> DVec2 {
        self.image_size
    }

    pub fn view_size(&self) -> DVec2 {
        self.view_size
    }

    pub fn zoom_scale(&self) -> f64 {
        self.zoom_scale
    }

    pub fn min_zoom_scale(&self) -> f64 {
        self.bounds.min
    }

    pub fn max_zoom_scale(&self) -> f64 {
        self.bounds.max
    }

    pub fn zoom_bounds(&self) -> ZoomBounds {
        self.bounds
    }

    pub fn content_offset(&self) -> DVec2 {
        self.content_offset
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    /// Size of the scaled image.
    pub fn content_size(&self) -> DVec2 {
        self.image_size * self.zoom_scale
    }

    /// Centering correction for content smaller than the view.
    pub fn frame_origin(&self) -> DVec2 {
        let content = self.content_size();
        let center = |content: f64, view: f64| {
            if content < view { (view - content) / 2.0 } else { 0.0 }
        };
        DVec2::new(
            center(content.x, self.view_size.x),
            center(content.y, self.view_size.y),
        )
    }

    pub fn image_to_view(&self, point: DVec2) -> DVec2 {
        point * self.zoom_scale + self.frame_origin() - self.content_offset
    }

    pub fn view_to_image(&self, point: DVec2) -> DVec2 {
        (point + self.content_offset - self.frame_origin()) / self.zoom_scale
    }

    /// Largest scroll offset; zero on axes where the content fits.
    pub fn max_content_offset(&self) -> DVec2 {
        (self.content_size() - self.view_size).max(DVec2::ZERO)
    }

    pub fn set_content_offset(&mut self, offset: DVec2) {
        self.content_offset = offset.clamp(DVec2::ZERO, self.max_content_offset());
    }

    /// Scroll by a drag translation in view units.
    pub fn pan_by(&mut self, translation: DVec2) {
        self.set_content_offset(self.content_offset - translation);
    }

    /// Set the zoom, keeping the image point at the view centre fixed.
    pub fn set_zoom_scale(&mut self, scale: f64) {
        self.zoom_about(scale, self.view_size / 2.0);
    }

    /// Set the zoom, keeping the image point under `anchor` fixed where the
    /// scroll range allows.
    pub fn zoom_about(&mut self, scale: f64, anchor: DVec2) {
        let image_point = self.view_to_image(anchor);
        self.zoom_scale = self.bounds.clamp(scale);
        let offset = image_point * self.zoom_scale + self.frame_origin() - anchor;
        self.set_content_offset(offset);
    }

    /// Image-space rectangle that fills the view at `scale`, centred on
    /// `center`.
    pub fn zoom_rect_for_scale(&self, scale: f64, center: DVec2) -> Rect {
        Rect::from_center(center, self.view_size / scale)
    }

    /// Zoom and scroll so `rect` (image space) fills the view as far as the
    /// zoom bounds allow, centred.
    pub fn zoom_to_rect(&mut self, rect: Rect) -> Result<()> {
        if !(rect.width() > 0.0 && rect.height() > 0.0) {
            return Err(EyeColorError::InvalidArgument("zoom rect must have a positive size"));
        }
        let scale = (self.view_size.x / rect.width()).min(self.view_size.y / rect.height());
        self.zoom_scale = self.bounds.clamp(scale);
        let offset = rect.center() * self.zoom_scale + self.frame_origin() - self.view_size / 2.0;
        self.set_content_offset(offset);
        Ok(())
    }

    /// Toggle between minimum zoom and a close-up around the tapped point.
    pub fn double_tap(&mut self, view_point: DVec2) -> Result<()> {
        if self.zoom_scale >= self.bounds.max / 2.0 {
            self.set_zoom_scale(self.bounds.min);
            return Ok(());
        }
        let center = self.view_to_image(view_point);
        let rect = self.zoom_rect_for_scale(DOUBLE_TAP_ZOOM_FACTOR * self.bounds.min, center);
        self.zoom_to_rect(rect)
    }

    /// Zoom so `rect` covers `fill` (fractions of view width/height), using
    /// whichever axis is tighter, centred on the rect.
    pub fn focus_rect(&mut self, rect: Rect, fill: DVec2) -> Result<()> {
        let current = rect.size * self.zoom_scale;
        if !(current.x > 0.0 && current.y > 0.0) {
            return Err(EyeColorError::InvalidArgument("focus rect must have a positive size"));
        }
        let optimal = self.view_size * fill;
        let correction = (optimal.x / current.x).min(optimal.y / current.y);
        let target = self.zoom_rect_for_scale(self.zoom_scale * correction, rect.center());
        self.zoom_to_rect(target)
    }

    pub fn begin_zoom(&mut self) -> Result<()> {
        if self.interaction != Interaction::Idle {
            return Err(EyeColorError::InvalidState("zoom gesture started while not idle"));
        }
        self.interaction = Interaction::Zooming;
        Ok(())
    }

    pub fn end_zoom(&mut self) -> Result<()> {
        if self.interaction != Interaction::Zooming {
            return Err(EyeColorError::InvalidState("zoom gesture ended without starting"));
        }
        self.interaction = Interaction::Idle;
        Ok(())
    }

    /// Remember the centred image point and absolute zoom before the view
    /// bounds change.
    pub fn begin_resize(&mut self) -> Result<()> {
        if self.interaction != Interaction::Idle {
            return Err(EyeColorError::InvalidState("resize started while not idle"));
        }
        let center = self.view_to_image(self.view_size / 2.0);
        let scale = if self.zoom_scale <= self.bounds.min + MIN_SCALE_EPSILON {
            0.0
        } else {
            self.zoom_scale
        };
        self.interaction = Interaction::Resizing { center, scale };
        Ok(())
    }

    /// Apply new view bounds and restore the remembered zoom and centre.
    pub fn finish_resize(&mut self, view_size: DVec2) -> Result<()> {
        let Interaction::Resizing { center, scale } = self.interaction else {
            return Err(EyeColorError::InvalidState("resize finished without starting"));
        };
        check_view(view_size, self.max_scale_factor)?;

        self.view_size = view_size;
        self.bounds = compute_zoom_bounds(self.image_size, view_size, self.max_scale_factor);
        self.zoom_scale = self.bounds.clamp(scale.max(self.bounds.min));
        let offset = center * self.zoom_scale + self.frame_origin() - view_size / 2.0;
        self.set_content_offset(offset);
        self.interaction = Interaction::Idle;
        Ok(())
    }

    /// Change the view bounds in one step. Without an image only the size is
    /// stored.
    pub fn resize(&mut self, view_size: DVec2) -> Result<()> {
        if view_size == self.view_size {
            return Ok(());
        }
        check_view(view_size, self.max_scale_factor)?;
        if !self.has_image() {
            self.view_size = view_size;
            return Ok(());
        }
        self.begin_resize()?;
        self.finish_resize(view_size)
    }
}

fn is_positive_size(size: DVec2) -> bool {
    size.is_finite() && size.x > 0.0 && size.y > 0.0
}

/// View sizes and the zoom factor must be finite and positive, otherwise the
/// zoom bounds stop being ordered.
fn check_view(view_size: DVec2, max_scale_factor: f64) -> Result<()> {
    if !is_positive_size(view_size) {
        return Err(EyeColorError::InvalidArgument("view size must be finite and positive"));
    }
    if !(max_scale_factor.is_finite() && max_scale_factor > 0.0) {
        return Err(EyeColorError::InvalidArgument("max scale factor must be finite and positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn viewer(image: (f64, f64), view: (f64, f64)) -> ViewportState {
        let mut state = ViewportState::new(ViewportConfig {
            view_size: DVec2::new(view.0, view.1),
            max_scale_factor: DEFAULT_MAX_SCALE_FACTOR,
        });
        state.display(DVec2::new(image.0, image.1)).unwrap();
        state
    }

    fn assert_invariant(state: &ViewportState) {
        assert!(state.min_zoom_scale() <= state.zoom_scale() + EPSILON);
        assert!(state.zoom_scale() <= state.max_zoom_scale() + EPSILON);
        let max = state.max_content_offset();
        let off = state.content_offset();
        assert!(off.x >= 0.0 && off.y >= 0.0 && off.x <= max.x + EPSILON && off.y <= max.y + EPSILON);
    }

    #[test]
    fn test_bounds_same_orientation_fill_width() {
        let bounds = compute_zoom_bounds(DVec2::new(1000.0, 2000.0), DVec2::new(300.0, 600.0), 5.0);
        assert!((bounds.min - 0.3).abs() < EPSILON);
        assert!((bounds.max - 1.5).abs() < EPSILON);
    }

    #[test]
    fn test_bounds_mixed_orientation_fit_smaller() {
        // Landscape image in a portrait view.
        let bounds = compute_zoom_bounds(DVec2::new(2000.0, 1000.0), DVec2::new(300.0, 600.0), 5.0);
        assert!((bounds.min - 0.15).abs() < EPSILON);
        assert!((bounds.max - 0.75).abs() < EPSILON);
    }

    #[test]
    fn test_bounds_min_never_exceeds_max() {
        let bounds = compute_zoom_bounds(DVec2::new(10.0, 20.0), DVec2::new(300.0, 600.0), 0.5);
        assert!(bounds.min <= bounds.max);
        assert!((bounds.min - bounds.max).abs() < EPSILON);
    }

    #[test]
    fn test_display_starts_at_min_zoom() {
        let state = viewer((1000.0, 2000.0), (300.0, 600.0));
        assert_eq!(state.zoom_scale(), state.min_zoom_scale());
        assert_eq!(state.content_offset(), DVec2::ZERO);
        assert_eq!(state.interaction(), Interaction::Idle);
    }

    #[test]
    fn test_small_content_is_centred() {
        // 2000x1000 at 0.15 is 300x150 inside a 300x600 view.
        let state = viewer((2000.0, 1000.0), (300.0, 600.0));
        let origin = state.frame_origin();
        assert!(origin.x.abs() < EPSILON);
        assert!((origin.y - 225.0).abs() < EPSILON);
        let top_left = state.image_to_view(DVec2::ZERO);
        assert!((top_left.y - 225.0).abs() < EPSILON);
    }

    #[test]
    fn test_view_image_round_trip() {
        let mut state = viewer((1200.0, 1600.0), (390.0, 844.0));
        let scales = [state.min_zoom_scale(), 0.7, 1.3, state.max_zoom_scale()];
        let anchors = [DVec2::new(10.0, 10.0), DVec2::new(195.0, 422.0), DVec2::new(380.0, 800.0)];
        for scale in scales {
            for anchor in anchors {
                state.zoom_about(scale, anchor);
                assert_invariant(&state);
                for p in [DVec2::new(0.0, 0.0), DVec2::new(600.0, 800.0), DVec2::new(1199.0, 1599.0)] {
                    let back = state.view_to_image(state.image_to_view(p));
                    assert!((back - p).length() < 1e-3, "{p} -> {back}");
                }
                let v = DVec2::new(123.0, 456.0);
                let round = state.image_to_view(state.view_to_image(v));
                assert!((round - v).length() < 1e-3, "{v} -> {round}");
            }
        }
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut state = viewer((1000.0, 2000.0), (300.0, 600.0));
        state.set_zoom_scale(100.0);
        assert_eq!(state.zoom_scale(), state.max_zoom_scale());
        state.set_zoom_scale(0.0001);
        assert_eq!(state.zoom_scale(), state.min_zoom_scale());
    }

    #[test]
    fn test_zoom_about_keeps_anchor_point() {
        let mut state = viewer((1000.0, 2000.0), (300.0, 600.0));
        let anchor = DVec2::new(150.0, 300.0);
        let before = state.view_to_image(anchor);
        state.zoom_about(1.0, anchor);
        let after = state.view_to_image(anchor);
        assert!((before - after).length() < 1e-6);
    }

    #[test]
    fn test_zoom_rect_for_scale() {
        let state = viewer((1000.0, 2000.0), (300.0, 600.0));
        let rect = state.zoom_rect_for_scale(2.0, DVec2::new(500.0, 500.0));
        assert_eq!(rect.size, DVec2::new(150.0, 300.0));
        assert_eq!(rect.center(), DVec2::new(500.0, 500.0));
    }

    #[test]
    fn test_zoom_to_rect_centres_rect() {
        let mut state = viewer((1000.0, 2000.0), (300.0, 600.0));
        let rect = state.zoom_rect_for_scale(1.0, DVec2::new(500.0, 1000.0));
        state.zoom_to_rect(rect).unwrap();
        assert!((state.zoom_scale() - 1.0).abs() < EPSILON);
        let centre = state.view_to_image(state.view_size() / 2.0);
        assert!((centre - DVec2::new(500.0, 1000.0)).length() < 1e-6);
    }

    #[test]
    fn test_double_tap_toggles() {
        let mut state = viewer((1000.0, 2000.0), (300.0, 600.0));
        state.double_tap(DVec2::new(150.0, 300.0)).unwrap();
        assert!((state.zoom_scale() - 2.0 * state.min_zoom_scale()).abs() < EPSILON);
        state.set_zoom_scale(state.max_zoom_scale());
        state.double_tap(DVec2::new(150.0, 300.0)).unwrap();
        assert_eq!(state.zoom_scale(), state.min_zoom_scale());
    }

    #[test]
    fn test_focus_rect_fills_view_fraction() {
        let mut state = viewer((1000.0, 1000.0), (400.0, 400.0));
        let face = Rect::new(400.0, 400.0, 200.0, 200.0);
        state.focus_rect(face, FACE_FILL).unwrap();
        // 0.6 × 400 / 200 = 1.2, within [0.4, 2.0].
        assert!((state.zoom_scale() - 1.2).abs() < 1e-6);
        let centre = state.view_to_image(state.view_size() / 2.0);
        assert!((centre - face.center()).length() < 1e-6);
    }

    #[test]
    fn test_pan_is_clamped_to_content() {
        let mut state = viewer((1000.0, 1000.0), (400.0, 400.0));
        state.set_zoom_scale(1.0);
        state.pan_by(DVec2::new(10_000.0, 10_000.0));
        assert_eq!(state.content_offset(), DVec2::ZERO);
        state.pan_by(DVec2::new(-10_000.0, -10_000.0));
        assert_eq!(state.content_offset(), DVec2::new(600.0, 600.0));
    }

    #[test]
    fn test_zoom_gesture_transitions() {
        let mut state = viewer((1000.0, 1000.0), (400.0, 400.0));
        assert!(state.end_zoom().is_err());
        state.begin_zoom().unwrap();
        assert_eq!(state.interaction(), Interaction::Zooming);
        assert!(state.begin_resize().is_err());
        state.end_zoom().unwrap();
        assert_eq!(state.interaction(), Interaction::Idle);
    }

    #[test]
    fn test_resize_restores_absolute_zoom_and_centre() {
        let mut state = viewer((1000.0, 1000.0), (400.0, 400.0));
        state.set_zoom_scale(1.0);
        let centre = state.view_to_image(state.view_size() / 2.0);

        state.begin_resize().unwrap();
        assert!(matches!(state.interaction(), Interaction::Resizing { .. }));
        state.finish_resize(DVec2::new(500.0, 400.0)).unwrap();

        assert_eq!(state.interaction(), Interaction::Idle);
        assert!((state.min_zoom_scale() - 0.5).abs() < EPSILON);
        assert!((state.zoom_scale() - 1.0).abs() < EPSILON);
        let restored = state.view_to_image(state.view_size() / 2.0);
        assert!((restored - centre).length() < 1e-6, "{centre} vs {restored}");
    }

    #[test]
    fn test_resize_at_minimum_stays_at_new_minimum() {
        let mut state = viewer((1000.0, 2000.0), (300.0, 600.0));
        state.resize(DVec2::new(600.0, 1200.0)).unwrap();
        assert!((state.min_zoom_scale() - 0.6).abs() < EPSILON);
        assert_eq!(state.zoom_scale(), state.min_zoom_scale());
    }

    #[test]
    fn test_resize_clamps_restored_zoom() {
        let mut state = viewer((1000.0, 2000.0), (300.0, 600.0));
        state.set_zoom_scale(1.4);
        state.resize(DVec2::new(600.0, 300.0)).unwrap();
        // Portrait image in a landscape view: min 0.15, max 0.75.
        assert!((state.zoom_scale() - 0.75).abs() < EPSILON);
        assert_invariant(&state);
    }

    #[test]
    fn test_finish_resize_without_begin_is_rejected() {
        let mut state = viewer((100.0, 100.0), (50.0, 50.0));
        assert!(matches!(
            state.finish_resize(DVec2::new(60.0, 60.0)),
            Err(EyeColorError::InvalidState(_))
        ));
    }

    #[test]
    fn test_degenerate_config_is_rejected() {
        for factor in [f64::NAN, 0.0, -2.0, f64::INFINITY] {
            let mut state = ViewportState::new(ViewportConfig {
                view_size: DVec2::new(400.0, 800.0),
                max_scale_factor: factor,
            });
            let err = state.display(DVec2::new(100.0, 200.0)).unwrap_err();
            assert!(matches!(err, EyeColorError::InvalidArgument(_)), "factor {factor}: {err}");
            assert!(!state.has_image(), "factor {factor} must not leave an image displayed");
        }

        for view in [DVec2::new(f64::INFINITY, 800.0), DVec2::new(400.0, f64::NAN)] {
            let mut state = ViewportState::new(ViewportConfig {
                view_size: view,
                ..ViewportConfig::default()
            });
            assert!(state.display(DVec2::new(100.0, 200.0)).is_err(), "view {view}");
        }
    }

    #[test]
    fn test_non_finite_resize_is_rejected() {
        let mut state = viewer((100.0, 200.0), (400.0, 800.0));
        let before = state.clone();
        assert!(state.resize(DVec2::new(f64::INFINITY, 800.0)).is_err());
        assert_eq!(state.view_size(), before.view_size());
        assert_eq!(state.zoom_scale(), before.zoom_scale());
        assert_eq!(state.interaction(), Interaction::Idle);

        let mut empty = ViewportState::new(ViewportConfig::default());
        assert!(empty.resize(DVec2::new(0.0, 10.0)).is_err());
        assert_eq!(empty.view_size(), ViewportConfig::default().view_size);
    }

    #[test]
    fn test_round_trip_holds_after_display() {
        let mut state = viewer((100.0, 200.0), (400.0, 800.0));
        state.set_zoom_scale(2.0 * state.min_zoom_scale());
        assert_invariant(&state);
        let p = DVec2::new(37.0, 81.5);
        assert!(state.view_to_image(state.image_to_view(p)).distance(p) < 1e-3);
    }
}
