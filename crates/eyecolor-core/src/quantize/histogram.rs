//! 15-bit color histogram (5 significant bits per channel).

/// Significant bits kept per channel.
pub const SIGBITS: u32 = 5;
/// Right shift applied to 8-bit channel values.
pub const RSHIFT: u32 = 8 - SIGBITS;
/// Number of levels per channel.
pub const LEVELS: usize = 1 << SIGBITS;

/// One populated histogram cell. Channel sums are kept so bucket averages
/// use the exact source colors rather than cell centres.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bin {
    pub count: u64,
    pub sum: [u64; 3],
}

/// Pixel counts per quantized `(r, g, b)` cell.
#[derive(Debug, Clone)]
pub struct ColorHistogram {
    bins: Vec<Bin>,
    total: u64,
}

impl Default for ColorHistogram {
    fn default() -> Self {
        Self {
            bins: vec![Bin::default(); LEVELS * LEVELS * LEVELS],
            total: 0,
        }
    }
}

impl ColorHistogram {
    /// Flat index for quantized channel levels.
    pub fn index(r: usize, g: usize, b: usize) -> usize {
        (r << (2 * SIGBITS)) | (g << SIGBITS) | b
    }

    /// Quantized levels of an 8-bit color.
    pub fn levels(rgb: [u8; 3]) -> [usize; 3] {
        [
            (rgb[0] >> RSHIFT) as usize,
            (rgb[1] >> RSHIFT) as usize,
            (rgb[2] >> RSHIFT) as usize,
        ]
    }

    pub fn add(&mut self, rgb: [u8; 3]) {
        let [r, g, b] = Self::levels(rgb);
        let bin = &mut self.bins[Self::index(r, g, b)];
        bin.count += 1;
        for c in 0..3 {
            bin.sum[c] += rgb[c] as u64;
        }
        self.total += 1;
    }

    pub fn get(&self, r: usize, g: usize, b: usize) -> &Bin {
        &self.bins[Self::index(r, g, b)]
    }

    /// Number of pixels added.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
