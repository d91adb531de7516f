//! Temperature → palette index mapping.
//!
//! Runs for every displayed pixel, so all work that depends only on the
//! scale is done once in `PaletteMapper::new` and the per-pixel path is a
//! couple of integer multiply/divides on deci-degree values.
//!
//! The palette is split at a movable centre: `[min, centre]` spreads over
//! the lower half of the palette and `(centre, max]` over the upper half.
//! Moving the centre toward `min` gives the hot end more colours.

use crate::config::{MAX_PALETTE_STEPS, TEMP_SCALE};
use crate::frame::{to_fixed, FrameStats};
use crate::settings::DisplaySettings;

/// Temperature range the palette is stretched over (°C).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScaleRange {
    pub min: f32,
    pub max: f32,
}

impl ScaleRange {
    pub fn span(&self) -> f32 {
        self.max - self.min
    }
}

/// Live range in auto mode, the configured one otherwise.
pub fn select_scale(settings: &DisplaySettings, stats: &FrameStats) -> ScaleRange {
    if settings.auto_scale {
        ScaleRange {
            min: stats.min,
            max: stats.max,
        }
    } else {
        ScaleRange {
            min: settings.manual_min,
            max: settings.manual_max,
        }
    }
}

/// One palette entry per deci-degree of span, at least one.
pub fn palette_steps(range: &ScaleRange) -> usize {
    let mut span = range.span();
    if !(span >= 0.001) {
        span = 1.0;
    }
    let steps = (span * TEMP_SCALE) as usize;
    steps.clamp(1, MAX_PALETTE_STEPS)
}

/// Precomputed split-linear mapping for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaletteMapper {
    min_s: i32,
    max_s: i32,
    center_s: i32,
    /// Palette size `N`.
    steps: i32,
    /// `N / 2`
    mid: i32,
}

impl PaletteMapper {
    pub fn new(range: &ScaleRange, center_percent: u8, steps: usize) -> Self {
        let pct = center_percent.min(100) as f32 / 100.0;
        let center = range.min + pct * (range.max - range.min);
        let steps = steps.clamp(1, MAX_PALETTE_STEPS) as i32;
        Self {
            min_s: to_fixed(range.min) as i32,
            max_s: to_fixed(range.max) as i32,
            center_s: to_fixed(center) as i32,
            steps,
            mid: steps / 2,
        }
    }

    pub fn steps(&self) -> usize {
        self.steps as usize
    }

    /// True when the centre sits on (or outside) an end of the range and the
    /// plain linear mapping is used.
    pub fn is_linear(&self) -> bool {
        self.center_s <= self.min_s || self.center_s >= self.max_s
    }

    /// Position along the palette, `0` = coldest, clamped to `[0, N-1]`.
    pub fn level(&self, v: i16) -> usize {
        let v = v as i32;
        let idx = if self.is_linear() {
            let span = self.max_s - self.min_s;
            if span <= 0 {
                0
            } else {
                (v - self.min_s) * self.steps / span
            }
        } else if v <= self.center_s {
            (v - self.min_s) * self.mid / (self.center_s - self.min_s)
        } else {
            self.mid + (v - self.center_s) * (self.steps - self.mid) / (self.max_s - self.center_s)
        };
        idx.clamp(0, self.steps - 1) as usize
    }

    /// Index into a generated palette table, which runs hot → cold.
    #[inline]
    pub fn index(&self, v: i16) -> usize {
        (self.steps as usize - 1) - self.level(v)
    }
}
