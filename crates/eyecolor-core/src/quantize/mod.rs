//! Median-cut color quantization.
//!
//! Builds a 15-bit histogram of the eligible pixels and recursively splits
//! the populated color space until the requested number of buckets exists.
//! Splitting first favours the most populated boxes, then (for the last
//! quarter of the palette) boxes that are both populated and large, so
//! small but distinct colors still get a bucket.

pub mod histogram;
pub mod vbox;

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::{EyeColorError, Result};
use crate::image::SourceImage;
use crate::palette::{Palette, PaletteEntry};

use self::histogram::ColorHistogram;
use self::vbox::ColorBox;

/// Palette size used when the caller does not ask for one.
pub const DEFAULT_MAX_COLORS: usize = 10;
/// Largest palette the quantizer will produce.
pub const MAX_PALETTE_SIZE: usize = 256;
/// Pixels with lower alpha are not sampled.
pub const MIN_ALPHA: u8 = 125;
/// Channel value above which a pixel counts as near-white.
pub const WHITE_THRESHOLD: u8 = 250;
/// Share of the palette built by splitting on population alone.
const FRACT_BY_POPULATION: f64 = 0.75;

/// Quantizer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantizeOptions {
    /// Upper bound on palette entries, in `1..=256`.
    pub max_colors: usize,
    /// Skip pixels whose channels are all above [`WHITE_THRESHOLD`].
    pub ignore_near_white: bool,
    /// Count every n-th eligible pixel. `1` samples all of them.
    pub sample_stride: usize,
}

impl Default for QuantizeOptions {
    fn default() -> Self {
        Self {
            max_colors: DEFAULT_MAX_COLORS,
            ignore_near_white: true,
            sample_stride: 1,
        }
    }
}

impl QuantizeOptions {
    pub fn new(max_colors: usize, ignore_near_white: bool) -> Self {
        Self {
            max_colors,
            ignore_near_white,
            ..Self::default()
        }
    }

    /// Whether a pixel takes part in quantization.
    pub fn is_eligible(&self, px: [u8; 4]) -> bool {
        if px[3] < MIN_ALPHA {
            return false;
        }
        let near_white =
            px[0] > WHITE_THRESHOLD && px[1] > WHITE_THRESHOLD && px[2] > WHITE_THRESHOLD;
        !(self.ignore_near_white && near_white)
    }

    fn validate(&self) -> Result<()> {
        if self.max_colors == 0 {
            return Err(EyeColorError::InvalidArgument("max_colors must be at least 1"));
        }
        if self.max_colors > MAX_PALETTE_SIZE {
            return Err(EyeColorError::InvalidArgument("max_colors must be at most 256"));
        }
        if self.sample_stride == 0 {
            return Err(EyeColorError::InvalidArgument("sample_stride must be at least 1"));
        }
        Ok(())
    }
}

/// Quantize `image` into at most `max_colors` entries.
pub fn quantize(image: &SourceImage, max_colors: usize, ignore_near_white: bool) -> Result<Palette> {
    quantize_with(image, &QuantizeOptions::new(max_colors, ignore_near_white))
}

/// Quantize with explicit options.
pub fn quantize_with(image: &SourceImage, options: &QuantizeOptions) -> Result<Palette> {
    quantize_cancellable(image, options, || true)
}

/// Quantize, polling `should_continue` once per image row.
///
/// Returns [`EyeColorError::Cancelled`] as soon as the predicate reports
/// false; no partial palette is ever produced.
pub fn quantize_cancellable(
    image: &SourceImage,
    options: &QuantizeOptions,
    should_continue: impl Fn() -> bool,
) -> Result<Palette> {
    options.validate()?;
    let start = Instant::now();

    let hist = build_histogram(image, options, &should_continue)?;
    if hist.is_empty() {
        return Err(EyeColorError::EmptyInput);
    }
    let Some(root) = ColorBox::enclosing(&hist) else {
        return Err(EyeColorError::EmptyInput);
    };

    let mut boxes = vec![root];
    let population_target = (options.max_colors as f64 * FRACT_BY_POPULATION).ceil() as usize;
    split_boxes(&mut boxes, &hist, population_target.max(1), |b| b.count())?;
    if !should_continue() {
        return Err(EyeColorError::Cancelled);
    }
    split_boxes(&mut boxes, &hist, options.max_colors, |b| b.count() * b.volume())?;

    let palette = to_palette(&boxes, hist.total());
    tracing::debug!(
        "quantized {} pixels into {} colors in {:.1?}",
        hist.total(),
        palette.len(),
        start.elapsed()
    );
    Ok(palette)
}

fn build_histogram(
    image: &SourceImage,
    options: &QuantizeOptions,
    should_continue: &impl Fn() -> bool,
) -> Result<ColorHistogram> {
    let mut hist = ColorHistogram::default();
    let mut eligible = 0usize;

    for y in 0..image.height() {
        if !should_continue() {
            return Err(EyeColorError::Cancelled);
        }
        for &px in image.row(y) {
            if !options.is_eligible(px) {
                continue;
            }
            if eligible % options.sample_stride == 0 {
                hist.add([px[0], px[1], px[2]]);
            }
            eligible += 1;
        }
    }

    Ok(hist)
}

/// Split the highest-priority splittable box until `target` boxes exist or
/// nothing can be split. Ties go to the earliest box.
fn split_boxes(
    boxes: &mut Vec<ColorBox>,
    hist: &ColorHistogram,
    target: usize,
    priority: impl Fn(&ColorBox) -> u64,
) -> Result<()> {
    while boxes.len() < target {
        let mut best: Option<(usize, u64)> = None;
        for (idx, b) in boxes.iter().enumerate() {
            if !b.is_splittable() {
                continue;
            }
            let p = priority(b);
            if best.is_none_or(|(_, best_p)| p > best_p) {
                best = Some((idx, p));
            }
        }

        let Some((idx, _)) = best else {
            break;
        };
        let Some((left, right)) = boxes[idx].split(hist) else {
            return Err(EyeColorError::InvalidState("splittable box produced an empty half"));
        };
        boxes[idx] = left;
        boxes.push(right);
    }
    Ok(())
}

/// Convert boxes to entries, most populated first; ties by RGB.
fn to_palette(boxes: &[ColorBox], total: u64) -> Palette {
    let mut ranked: Vec<(u64, [u8; 3])> = boxes
        .iter()
        .map(|b| {
            let c = b.average();
            (b.count(), [c.red, c.green, c.blue])
        })
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    let entries = ranked
        .into_iter()
        .map(|(count, [r, g, b])| PaletteEntry {
            color: palette::Srgb::new(r, g, b),
            dominance: count as f64 / total as f64 * 100.0,
        })
        .collect();
    Palette::from_entries(entries)
}
