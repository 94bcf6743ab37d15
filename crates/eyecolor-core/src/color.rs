//! Color helpers shared by the quantizer and the presentation layer.
//!
//! Palette colors are `palette::Srgb<u8>`; charts label entries by their
//! `#RRGGBB` hex string and map a selected label back to a color.

use palette::{Srgb, Srgba};

/// Fallback for labels that are not a six digit hex code.
pub const FALLBACK_GRAY: Srgb<u8> = Srgb::new(128, 128, 128);

/// Format a color as `#RRGGBB`.
pub fn to_hex(color: Srgb<u8>) -> String {
    format!("#{:02X}{:02X}{:02X}", color.red, color.green, color.blue)
}

/// Parse a `#RRGGBB` (or `RRGGBB`) label. Anything else maps to mid gray.
pub fn from_hex_or_gray(hex: &str) -> Srgb<u8> {
    let code = hex.trim();
    let code = code.strip_prefix('#').unwrap_or(code);
    if code.len() != 6 || !code.bytes().all(|b| b.is_ascii_hexdigit()) {
        return FALLBACK_GRAY;
    }
    code.parse::<Srgb<u8>>().unwrap_or(FALLBACK_GRAY)
}

/// Color from a packed `0xRRGGBB` value.
pub fn from_rgb_u32(rgb: u32) -> Srgb<u8> {
    Srgb::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

/// Color from a packed `0xAARRGGBB` value.
pub fn from_argb_u32(argb: u32) -> Srgba<u8> {
    Srgba::new((argb >> 16) as u8, (argb >> 8) as u8, argb as u8, (argb >> 24) as u8)
}

/// Squared Euclidean distance in 8-bit RGB.
pub fn distance_sq(a: Srgb<u8>, b: Srgb<u8>) -> u32 {
    let dr = a.red.abs_diff(b.red) as u32;
    let dg = a.green.abs_diff(b.green) as u32;
    let db = a.blue.abs_diff(b.blue) as u32;
    dr * dr + dg * dg + db * db
}
