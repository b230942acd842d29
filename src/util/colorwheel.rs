//! Color wheel lookup table
//!
//! A cyclic palette encoding flow direction as hue. The wheel runs
//! red → yellow → green → cyan → blue → magenta → red in six segments whose
//! lengths follow perceptual similarity: more shades are distinguishable
//! between red and yellow than between yellow and green, so that segment
//! gets more entries.

use std::sync::OnceLock;

/// Red to yellow
pub const RY: usize = 15;
/// Yellow to green
pub const YG: usize = 6;
/// Green to cyan
pub const GC: usize = 4;
/// Cyan to blue
pub const CB: usize = 11;
/// Blue to magenta
pub const BM: usize = 13;
/// Magenta to red
pub const MR: usize = 6;

/// Total number of wheel entries
pub const NCOLS: usize = RY + YG + GC + CB + BM + MR;

/// Immutable hue table indexed cyclically
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorWheel {
    table: [[u8; 3]; NCOLS],
}

impl ColorWheel {
    /// Build the table
    pub fn new() -> Self {
        let mut table = [[0u8; 3]; NCOLS];
        let mut k = 0;

        // Ramps use integer division, so no entry reaches the next segment's
        // starting color.
        let ramp = |i: usize, n: usize| (255 * i / n) as u8;

        for i in 0..RY {
            table[k] = [255, ramp(i, RY), 0];
            k += 1;
        }
        for i in 0..YG {
            table[k] = [255 - ramp(i, YG), 255, 0];
            k += 1;
        }
        for i in 0..GC {
            table[k] = [0, 255, ramp(i, GC)];
            k += 1;
        }
        for i in 0..CB {
            table[k] = [0, 255 - ramp(i, CB), 255];
            k += 1;
        }
        for i in 0..BM {
            table[k] = [ramp(i, BM), 0, 255];
            k += 1;
        }
        for i in 0..MR {
            table[k] = [255, 0, 255 - ramp(i, MR)];
            k += 1;
        }

        debug_assert_eq!(k, NCOLS);
        ColorWheel { table }
    }

    /// Process-wide instance, built on first access
    pub fn shared() -> &'static ColorWheel {
        static WHEEL: OnceLock<ColorWheel> = OnceLock::new();
        WHEEL.get_or_init(ColorWheel::new)
    }

    /// RGB triple at a wheel position; indices wrap around
    pub fn color_at(&self, index: usize) -> [u8; 3] {
        self.table[index % NCOLS]
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        NCOLS
    }

    /// Always false; the wheel has a fixed size
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Raw table contents
    pub fn entries(&self) -> &[[u8; 3]] {
        &self.table
    }
}

impl Default for ColorWheel {
    fn default() -> Self {
        Self::new()
    }
}
