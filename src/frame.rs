//! Temperature frames and per-frame statistics.

use crate::config::{MAX_TEMP, MIN_TEMP, SENSOR_HEIGHT, SENSOR_PIXELS, SENSOR_WIDTH, TEMP_SCALE};

/// One sensor frame: row-major °C values, `SENSOR_WIDTH × SENSOR_HEIGHT`.
#[derive(Clone, PartialEq)]
pub struct Frame {
    pixels: [f32; SENSOR_PIXELS],
}

impl Frame {
    pub const fn filled(temp: f32) -> Self {
        Self {
            pixels: [temp; SENSOR_PIXELS],
        }
    }

    pub const fn from_pixels(pixels: [f32; SENSOR_PIXELS]) -> Self {
        Self { pixels }
    }

    #[inline]
    pub fn at(&self, col: usize, row: usize) -> f32 {
        self.pixels[row * SENSOR_WIDTH + col]
    }

    #[inline]
    pub fn set(&mut self, col: usize, row: usize, temp: f32) {
        self.pixels[row * SENSOR_WIDTH + col] = temp;
    }

    pub fn pixels(&self) -> &[f32; SENSOR_PIXELS] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [f32; SENSOR_PIXELS] {
        &mut self.pixels
    }

    pub fn row(&self, row: usize) -> &[f32] {
        &self.pixels[row * SENSOR_WIDTH..(row + 1) * SENSOR_WIDTH]
    }

    pub fn column(&self, col: usize) -> impl Iterator<Item = f32> + '_ {
        (0..SENSOR_HEIGHT).map(move |row| self.at(col, row))
    }

    /// Convert to fixed-point deci-degrees for the upscaler and mapper.
    ///
    /// Non-finite samples become the sensor floor so they render as the
    /// coldest colour instead of poisoning interpolation.
    pub fn to_fixed(&self, out: &mut [i16; SENSOR_PIXELS]) {
        for (dst, &t) in out.iter_mut().zip(self.pixels.iter()) {
            let t = if t.is_finite() { t } else { MIN_TEMP };
            *dst = to_fixed(t);
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::filled(0.0)
    }
}

/// °C to deci-degrees, saturating at the `i16` range.
#[inline]
pub fn to_fixed(temp: f32) -> i16 {
    let v = temp * TEMP_SCALE;
    if v >= i16::MAX as f32 {
        i16::MAX
    } else if v <= i16::MIN as f32 {
        i16::MIN
    } else {
        v as i16
    }
}

/// A cell of the sensor grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GridPos {
    pub col: u8,
    pub row: u8,
}

/// Derived per-frame values.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameStats {
    /// Coldest finite sample, clamped to the sensor range.
    pub min: f32,
    /// Hottest finite sample, clamped to the sensor range.
    pub max: f32,
    pub min_at: GridPos,
    pub max_at: GridPos,
    /// Mean of the four pixels around the grid centre.
    pub center: f32,
}

impl FrameStats {
    /// `None` when the frame holds no finite sample at all.
    pub fn from_frame(frame: &Frame) -> Option<Self> {
        let mut found: Option<(f32, GridPos, f32, GridPos)> = None;

        for row in 0..SENSOR_HEIGHT {
            for col in 0..SENSOR_WIDTH {
                let t = frame.at(col, row);
                if !t.is_finite() {
                    continue;
                }
                let pos = GridPos {
                    col: col as u8,
                    row: row as u8,
                };
                match found.as_mut() {
                    None => found = Some((t, pos, t, pos)),
                    Some((min, min_at, max, max_at)) => {
                        if t < *min {
                            *min = t;
                            *min_at = pos;
                        }
                        if t > *max {
                            *max = t;
                            *max_at = pos;
                        }
                    }
                }
            }
        }

        let (min, min_at, max, max_at) = found?;
        let min = min.clamp(MIN_TEMP, MAX_TEMP);
        let max = max.clamp(MIN_TEMP, MAX_TEMP);

        let cx = SENSOR_WIDTH / 2;
        let cy = SENSOR_HEIGHT / 2;
        let mut sum = 0.0;
        let mut n = 0u8;
        for (col, row) in [(cx - 1, cy - 1), (cx, cy - 1), (cx - 1, cy), (cx, cy)] {
            let t = frame.at(col, row);
            if t.is_finite() {
                sum += t;
                n += 1;
            }
        }
        let center = if n > 0 { sum / n as f32 } else { (min + max) / 2.0 };

        Some(Self {
            min,
            max,
            min_at,
            max_at,
            center,
        })
    }

    /// True if this frame's range lies inside `[lo, hi]`.
    pub fn fits_within(&self, lo: f32, hi: f32) -> bool {
        self.min >= lo && self.max <= hi
    }
}

/// Display unit for temperatures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TempUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TempUnit {
    pub fn convert(self, celsius: f32) -> f32 {
        match self {
            TempUnit::Celsius => celsius,
            TempUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            TempUnit::Celsius => TempUnit::Fahrenheit,
            TempUnit::Fahrenheit => TempUnit::Celsius,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TempUnit::Celsius => "C",
            TempUnit::Fahrenheit => "F",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> Frame {
        let mut f = Frame::filled(25.0);
        f.set(3, 4, 10.0);
        f.set(30, 20, 42.5);
        f
    }

    #[test]
    fn stats_find_extremes_and_positions() {
        let s = FrameStats::from_frame(&gradient()).unwrap();
        assert_eq!(s.min, 10.0);
        assert_eq!(s.min_at, GridPos { col: 3, row: 4 });
        assert_eq!(s.max, 42.5);
        assert_eq!(s.max_at, GridPos { col: 30, row: 20 });
        assert_eq!(s.center, 25.0);
    }

    #[test]
    fn stats_skip_non_finite_samples() {
        let mut f = gradient();
        f.set(0, 0, f32::NAN);
        f.set(1, 0, f32::INFINITY);
        f.set(2, 0, f32::NEG_INFINITY);
        let s = FrameStats::from_frame(&f).unwrap();
        assert_eq!(s.min, 10.0);
        assert_eq!(s.max, 42.5);
    }

    #[test]
    fn stats_clamp_to_sensor_range() {
        let mut f = Frame::filled(20.0);
        f.set(0, 0, -80.0);
        f.set(5, 5, 900.0);
        let s = FrameStats::from_frame(&f).unwrap();
        assert_eq!(s.min, MIN_TEMP);
        assert_eq!(s.max, MAX_TEMP);
    }

    #[test]
    fn stats_stay_ordered_outside_sensor_range() {
        let hot = FrameStats::from_frame(&Frame::filled(400.0)).unwrap();
        assert_eq!((hot.min, hot.max), (MAX_TEMP, MAX_TEMP));

        let cold = FrameStats::from_frame(&Frame::filled(-60.0)).unwrap();
        assert_eq!((cold.min, cold.max), (MIN_TEMP, MIN_TEMP));
    }

    #[test]
    fn all_nan_frame_has_no_stats() {
        assert!(FrameStats::from_frame(&Frame::filled(f32::NAN)).is_none());
    }

    #[test]
    fn center_averages_four_middle_pixels() {
        let mut f = Frame::filled(0.0);
        f.set(15, 11, 10.0);
        f.set(16, 11, 20.0);
        f.set(15, 12, 30.0);
        f.set(16, 12, 40.0);
        let s = FrameStats::from_frame(&f).unwrap();
        assert_eq!(s.center, 25.0);
    }

    #[test]
    fn fixed_point_conversion() {
        let mut out = [0i16; SENSOR_PIXELS];
        let mut f = Frame::filled(21.37);
        f.set(0, 0, f32::NAN);
        f.to_fixed(&mut out);
        assert_eq!(out[1], 213);
        assert_eq!(out[0], (MIN_TEMP * TEMP_SCALE) as i16);
        assert_eq!(to_fixed(1.0e6), i16::MAX);
    }

    #[test]
    fn fahrenheit_conversion() {
        assert_eq!(TempUnit::Fahrenheit.convert(100.0), 212.0);
        assert_eq!(TempUnit::Fahrenheit.convert(-40.0), -40.0);
        assert_eq!(TempUnit::Celsius.convert(36.6), 36.6);
        assert_eq!(TempUnit::Celsius.toggled(), TempUnit::Fahrenheit);
    }

    #[test]
    fn row_and_column_views() {
        let f = gradient();
        assert_eq!(f.row(4)[3], 10.0);
        assert_eq!(f.column(30).nth(20), Some(42.5));
        assert_eq!(f.column(0).count(), SENSOR_HEIGHT);
    }
}
