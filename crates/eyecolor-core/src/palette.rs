//! Palette produced by the quantizer.

use glam::DVec2;
use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::color;
use crate::image::SourceImage;
use crate::quantize::QuantizeOptions;

/// One representative color and the share of sampled pixels it covers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaletteEntry {
    /// Average color of the bucket.
    pub color: Srgb<u8>,
    /// Percentage of eligible pixels in the bucket, in `[0, 100]`.
    pub dominance: f64,
}

impl PaletteEntry {
    /// `#RRGGBB` label used by charts.
    pub fn hex(&self) -> String {
        color::to_hex(self.color)
    }
}

/// Ordered palette, most dominant entry first.
///
/// A palette is never edited in place; recomputation replaces it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
}

impl Palette {
    pub(crate) fn from_entries(entries: Vec<PaletteEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most dominant entry. Presenters default their color swatch to it.
    pub fn dominant(&self) -> Option<&PaletteEntry> {
        self.entries.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PaletteEntry> {
        self.entries.iter()
    }

    /// Index of the entry closest to `color`. Ties go to the earlier entry.
    pub fn nearest(&self, color: Srgb<u8>) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .min_by_key(|(_, entry)| color::distance_sq(entry.color, color))
            .map(|(idx, _)| idx)
    }

    /// Locate each entry inside `image`.
    ///
    /// Every eligible pixel is assigned to its nearest entry; the result holds
    /// the centroid (pixel-centre coordinates) of each entry's pixels, or
    /// `None` when no pixel was assigned to it.
    pub fn anchors(&self, image: &SourceImage, options: &QuantizeOptions) -> Vec<Option<DVec2>> {
        let mut sums = vec![(DVec2::ZERO, 0u64); self.entries.len()];

        for y in 0..image.height() {
            for (x, px) in image.row(y).iter().enumerate() {
                if !options.is_eligible(*px) {
                    continue;
                }
                let Some(idx) = self.nearest(Srgb::new(px[0], px[1], px[2])) else {
                    continue;
                };
                sums[idx].0 += DVec2::new(x as f64 + 0.5, y as f64 + 0.5);
                sums[idx].1 += 1;
            }
        }

        sums.into_iter()
            .map(|(sum, count)| (count > 0).then(|| sum / count as f64))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a PaletteEntry;
    type IntoIter = std::slice::Iter<'a, PaletteEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_color_palette() -> Palette {
        Palette::from_entries(vec![
            PaletteEntry { color: Srgb::new(200, 0, 0), dominance: 75.0 },
            PaletteEntry { color: Srgb::new(0, 0, 200), dominance: 25.0 },
        ])
    }

    #[test]
    fn test_nearest_picks_closest_entry() {
        let palette = two_color_palette();
        assert_eq!(palette.nearest(Srgb::new(250, 10, 10)), Some(0));
        assert_eq!(palette.nearest(Srgb::new(10, 10, 150)), Some(1));
        assert_eq!(Palette::default().nearest(Srgb::new(0, 0, 0)), None);
    }

    #[test]
    fn test_anchors_are_centroids_of_assigned_pixels() {
        // Left column red, right column blue.
        let image = SourceImage::from_fn(2, 2, |x, _| {
            if x == 0 { [200, 0, 0, 255] } else { [0, 0, 200, 255] }
        });
        let anchors = two_color_palette().anchors(&image, &QuantizeOptions::default());
        assert_eq!(anchors[0], Some(DVec2::new(0.5, 1.0)));
        assert_eq!(anchors[1], Some(DVec2::new(1.5, 1.0)));
    }

    #[test]
    fn test_anchor_none_when_no_pixel_assigned() {
        let image = SourceImage::filled(2, 2, [200, 0, 0, 255]);
        let anchors = two_color_palette().anchors(&image, &QuantizeOptions::default());
        assert!(anchors[0].is_some());
        assert_eq!(anchors[1], None);
    }

    #[test]
    fn test_entry_serializes_color_and_dominance() {
        let entry = PaletteEntry { color: Srgb::new(1, 2, 3), dominance: 50.0 };
        let json = serde_json::to_value(entry).unwrap();
        assert_eq!(json["dominance"], 50.0);
        assert_eq!(json["color"]["red"], 1);
    }
}
