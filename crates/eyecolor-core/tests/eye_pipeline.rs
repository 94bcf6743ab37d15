//! End-to-end eye measurement without a session: crop both eyes, merge,
//! quantize, then locate the palette colors back in the source image.
//!
//! Run with: `cargo test -p eyecolor-core`

use eyecolor_core::face::{FacePoint, eye_composite};
use eyecolor_core::{
    MarkerConfig, QuantizeOptions, SourceImage, ViewportConfig, ViewportState, quantize_with,
};
use glam::DVec2;
use palette::Srgb;

const WHITE: [u8; 4] = [255, 255, 255, 255];
const BLUE_IRIS: [u8; 4] = [40, 90, 160, 255];
const GREEN_IRIS: [u8; 4] = [60, 140, 70, 255];

/// 120x60 white image with a blue iris at (30, 30) and a green one at
/// (90, 30), both of radius 8.
fn portrait() -> SourceImage {
    let irises = [
        (DVec2::new(30.0, 30.0), BLUE_IRIS),
        (DVec2::new(90.0, 30.0), GREEN_IRIS),
    ];
    let mut pixels = Vec::with_capacity(120 * 60);
    for y in 0..60 {
        for x in 0..120 {
            let p = DVec2::new(x as f64 + 0.5, y as f64 + 0.5);
            let color = irises
                .iter()
                .find(|(center, _)| center.distance_squared(p) <= 64.0)
                .map_or(WHITE, |(_, color)| *color);
            pixels.push(color);
        }
    }
    SourceImage::new(120, 60, pixels).expect("pixel count matches")
}

fn eyes() -> Vec<FacePoint> {
    vec![FacePoint::new(30.0, 30.0), FacePoint::new(90.0, 30.0)]
}

#[test]
fn test_two_eyes_give_two_equal_colors() {
    let composite = eye_composite(&portrait(), &eyes(), 16.0).unwrap();
    assert_eq!(composite.image.width(), 32);
    assert_eq!(composite.image.height(), 16);

    let palette = quantize_with(&composite.image, &QuantizeOptions::default()).unwrap();
    assert_eq!(palette.len(), 2);
    // Equal counts fall back to ascending RGB.
    assert_eq!(palette.entries()[0].color, Srgb::new(40, 90, 160));
    assert_eq!(palette.entries()[1].color, Srgb::new(60, 140, 70));
    for entry in &palette {
        assert!((entry.dominance - 50.0).abs() < 1e-9, "{} at {}", entry.hex(), entry.dominance);
    }
}

#[test]
fn test_anchors_map_back_to_the_eyes() {
    let image = portrait();
    let options = QuantizeOptions::default();
    let composite = eye_composite(&image, &eyes(), 16.0).unwrap();
    let palette = quantize_with(&composite.image, &options).unwrap();

    let sources: Vec<DVec2> = palette
        .anchors(&composite.image, &options)
        .into_iter()
        .map(|anchor| composite.to_source(anchor.expect("every entry has pixels")).unwrap())
        .collect();

    assert!(sources[0].distance(DVec2::new(30.0, 30.0)) < 1e-9, "blue at {}", sources[0]);
    assert!(sources[1].distance(DVec2::new(90.0, 30.0)) < 1e-9, "green at {}", sources[1]);
}

#[test]
fn test_eye_positions_follow_the_viewport() {
    let mut viewport = ViewportState::new(ViewportConfig {
        view_size: DVec2::new(240.0, 240.0),
        ..ViewportConfig::default()
    });
    viewport.display(DVec2::new(120.0, 60.0)).unwrap();

    let eye = DVec2::new(30.0, 30.0);
    let view = viewport.image_to_view(eye);
    assert!(viewport.view_to_image(view).distance(eye) < 1e-9);

    viewport.set_zoom_scale(viewport.max_zoom_scale());
    let zoomed = viewport.image_to_view(eye);
    assert!(viewport.view_to_image(zoomed).distance(eye) < 1e-9);
    assert_ne!(view, zoomed);

    // Dragging a marker by one view unit moves the point by 1/zoom pixels.
    let mut point = FacePoint::new(eye.x, eye.y);
    point.drag(DVec2::X, viewport.zoom_scale());
    assert!((point.position.x - (eye.x + 1.0 / viewport.zoom_scale())).abs() < 1e-12);
}

#[test]
fn test_eye_at_the_edge_is_padded_with_transparency() {
    let image = portrait();
    let edge = [FacePoint::new(2.0, 2.0)];
    let composite = eye_composite(&image, &edge, 16.0).unwrap();
    assert_eq!(composite.parts[0].source_origin.x, -6);

    // Only white is in range, and white is ignored by default.
    let err = quantize_with(&composite.image, &QuantizeOptions::default()).unwrap_err();
    assert!(matches!(err, eyecolor_core::EyeColorError::EmptyInput));

    let kept = quantize_with(&composite.image, &QuantizeOptions::new(4, false)).unwrap();
    assert_eq!(kept.dominant().unwrap().color, Srgb::new(255, 255, 255));
}

#[test]
fn test_crop_diameter_from_face_width() {
    let config = MarkerConfig {
        default_size: 36.0,
        face_width_divisor: 2.0,
        crop_inset: 6.0,
    };
    let face = eyecolor_core::Face {
        bounds: eyecolor_core::Rect::new(0.0, 0.0, 56.0, 56.0),
        points: eyes(),
        ..Default::default()
    };
    let diameter = config.crop_diameter(Some(&face));
    assert_eq!(diameter, 16.0);
    assert!(eye_composite(&portrait(), &face.points, diameter).is_ok());
}
