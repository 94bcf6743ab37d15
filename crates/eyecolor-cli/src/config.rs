//! Application configuration for the CLI.

use std::str::FromStr;

use eyecolor_core::quantize::DEFAULT_MAX_COLORS;
use eyecolor_core::{QuantizeOptions, ViewportConfig};
use eyecolor_session::SessionConfig;
use glam::DVec2;

/// Default view width, matching a phone-sized viewer.
const DEFAULT_VIEW_WIDTH: f64 = 375.0;
/// Default view height.
const DEFAULT_VIEW_HEIGHT: f64 = 667.0;

/// Runtime configuration, seeded from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Palette size requested from the quantizer.
    pub max_colors: usize,
    /// Skip near-white pixels (specular highlights, sclera).
    pub ignore_near_white: bool,
    /// Viewer size used to place markers, in view units.
    pub view_size: DVec2,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_colors: env_or("EYECOLOR_MAX_COLORS", DEFAULT_MAX_COLORS),
            ignore_near_white: true,
            view_size: DVec2::new(
                view_extent(env("EYECOLOR_VIEW_WIDTH").as_deref(), DEFAULT_VIEW_WIDTH),
                view_extent(env("EYECOLOR_VIEW_HEIGHT").as_deref(), DEFAULT_VIEW_HEIGHT),
            ),
        }
    }
}

impl AppConfig {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            quantize: QuantizeOptions::new(self.max_colors, self.ignore_near_white),
            viewport: ViewportConfig {
                view_size: self.view_size,
                ..ViewportConfig::default()
            },
            ..SessionConfig::default()
        }
    }
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    parse_or(env(name).as_deref(), default)
}

/// A view extent must be finite and positive; anything else keeps `default`.
fn view_extent(value: Option<&str>, default: f64) -> f64 {
    let extent = parse_or(value, default);
    if extent.is_finite() && extent > 0.0 {
        extent
    } else {
        tracing::warn!("ignoring view extent {extent}, using {default}");
        default
    }
}

fn parse_or<T: FromStr>(value: Option<&str>, default: T) -> T {
    value.and_then(|s| s.trim().parse().ok()).unwrap_or(default)
}
