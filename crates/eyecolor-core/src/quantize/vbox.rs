//! Boxes of histogram cells split by the median-cut quantizer.

use palette::Srgb;

use super::histogram::{ColorHistogram, LEVELS};

/// An axis-aligned box in quantized color space, shrunk to the populated
/// cells it contains. Bounds are inclusive.
#[derive(Debug, Clone)]
pub struct ColorBox {
    lo: [usize; 3],
    hi: [usize; 3],
    count: u64,
    sum: [u64; 3],
}

impl ColorBox {
    /// Box covering every populated cell, or `None` for an empty histogram.
    pub fn enclosing(hist: &ColorHistogram) -> Option<Self> {
        Self::shrink(hist, [0; 3], [LEVELS - 1; 3])
    }

    /// Smallest box inside `lo..=hi` holding all its populated cells.
    fn shrink(hist: &ColorHistogram, lo: [usize; 3], hi: [usize; 3]) -> Option<Self> {
        let mut min = [usize::MAX; 3];
        let mut max = [0usize; 3];
        let mut count = 0u64;
        let mut sum = [0u64; 3];

        for r in lo[0]..=hi[0] {
            for g in lo[1]..=hi[1] {
                for b in lo[2]..=hi[2] {
                    let bin = hist.get(r, g, b);
                    if bin.count == 0 {
                        continue;
                    }
                    let at = [r, g, b];
                    for c in 0..3 {
                        min[c] = min[c].min(at[c]);
                        max[c] = max[c].max(at[c]);
                        sum[c] += bin.sum[c];
                    }
                    count += bin.count;
                }
            }
        }

        (count > 0).then_some(Self {
            lo: min,
            hi: max,
            count,
            sum,
        })
    }

    /// Pixels inside the box.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Number of cells spanned by the box.
    pub fn volume(&self) -> u64 {
        (0..3).map(|c| (self.hi[c] - self.lo[c] + 1) as u64).product()
    }

    /// A box spanning a single cell cannot be split further.
    pub fn is_splittable(&self) -> bool {
        (0..3).any(|c| self.hi[c] > self.lo[c])
    }

    /// Channel with the largest extent. Ties prefer red, then green.
    fn widest_channel(&self) -> usize {
        let ranges = [
            self.hi[0] - self.lo[0],
            self.hi[1] - self.lo[1],
            self.hi[2] - self.lo[2],
        ];
        if ranges[0] >= ranges[1] && ranges[0] >= ranges[2] {
            0
        } else if ranges[1] >= ranges[2] {
            1
        } else {
            2
        }
    }

    /// Cut along the widest channel at the population median.
    ///
    /// Both halves are non-empty: the cut never passes the last populated
    /// level, and the first populated level always lands on the left.
    pub fn split(&self, hist: &ColorHistogram) -> Option<(ColorBox, ColorBox)> {
        if !self.is_splittable() {
            return None;
        }
        let ch = self.widest_channel();

        let mut marginal = vec![0u64; self.hi[ch] - self.lo[ch] + 1];
        for r in self.lo[0]..=self.hi[0] {
            for g in self.lo[1]..=self.hi[1] {
                for b in self.lo[2]..=self.hi[2] {
                    let at = [r, g, b];
                    marginal[at[ch] - self.lo[ch]] += hist.get(r, g, b).count;
                }
            }
        }

        let mut cut = self.hi[ch] - 1;
        let mut cumulative = 0u64;
        for (offset, count) in marginal.iter().enumerate() {
            cumulative += count;
            if cumulative * 2 >= self.count {
                cut = (self.lo[ch] + offset).min(self.hi[ch] - 1);
                break;
            }
        }

        let mut left_hi = self.hi;
        left_hi[ch] = cut;
        let mut right_lo = self.lo;
        right_lo[ch] = cut + 1;

        let left = Self::shrink(hist, self.lo, left_hi)?;
        let right = Self::shrink(hist, right_lo, self.hi)?;
        Some((left, right))
    }

    /// Exact average of the pixels in the box.
    pub fn average(&self) -> Srgb<u8> {
        let avg = |sum: u64| ((sum + self.count / 2) / self.count).min(255) as u8;
        Srgb::new(avg(self.sum[0]), avg(self.sum[1]), avg(self.sum[2]))
    }
}
