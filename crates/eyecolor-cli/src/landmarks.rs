//! Landmarks supplied on the command line instead of by a detector.

use eyecolor_core::{Face, FacePoint, Landmarks, Rect, SourceImage};
use glam::DVec2;

/// Reports the face given by `--eye`/`--face`, or nothing.
#[derive(Debug, Clone, Default)]
pub struct ManualLandmarks {
    pub eyes: Vec<DVec2>,
    pub bounds: Option<Rect>,
}

impl Landmarks for ManualLandmarks {
    fn detect(&self, image: &SourceImage) -> Vec<Face> {
        if self.eyes.is_empty() && self.bounds.is_none() {
            return Vec::new();
        }
        let frame = Rect::new(0.0, 0.0, image.width() as f64, image.height() as f64);
        let points = self
            .eyes
            .iter()
            .filter(|p| {
                let keep = frame.contains(**p);
                if !keep {
                    tracing::warn!("eye point ({}, {}) is outside the image, ignoring", p.x, p.y);
                }
                keep
            })
            .map(|p| FacePoint::new(p.x, p.y))
            .collect();
        vec![Face {
            id: Some(0),
            bounds: self.bounds.unwrap_or_default(),
            points,
        }]
    }
}

/// Parse `X,Y`.
pub fn parse_point(s: &str) -> Result<DVec2, String> {
    match parse_numbers(s)?.as_slice() {
        [x, y] => Ok(DVec2::new(*x, *y)),
        _ => Err(format!("expected X,Y, got `{s}`")),
    }
}

/// Parse `X,Y,W,H` with a positive size.
pub fn parse_rect(s: &str) -> Result<Rect, String> {
    match parse_numbers(s)?.as_slice() {
        [x, y, w, h] if *w > 0.0 && *h > 0.0 => Ok(Rect::new(*x, *y, *w, *h)),
        [_, _, _, _] => Err(format!("face size must be positive, got `{s}`")),
        _ => Err(format!("expected X,Y,W,H, got `{s}`")),
    }
}

fn parse_numbers(s: &str) -> Result<Vec<f64>, String> {
    s.split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| format!("`{part}` is not a number"))
        })
        .collect()
}
