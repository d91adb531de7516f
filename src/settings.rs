//! Persisted display settings and their flash record format.
//!
//! The record is a fixed-size little-endian blob with a leading version
//! byte. Decoding validates every field so a record from incompatible
//! firmware (or a torn write) falls back to defaults instead of producing
//! out-of-range state.
//!
//! Record layout (version 1, 16 bytes):
//!
//! | Offset | Size | Field                                         |
//! |--------|------|-----------------------------------------------|
//! | 0      | 1    | version                                       |
//! | 1      | 1    | flags: bit0 auto, bit1 analysis, bit2 markers |
//! | 2      | 4    | manual_min (f32)                              |
//! | 6      | 4    | manual_max (f32)                              |
//! | 10     | 1    | palette                                       |
//! | 11     | 1    | palette_center_percent                        |
//! | 12     | 1    | sensor_rate                                   |
//! | 13     | 1    | crosshair_col                                 |
//! | 14     | 1    | crosshair_row                                 |
//! | 15     | 1    | brightness                                    |

use crate::config::{
    DEFAULT_BRIGHTNESS, MAX_BRIGHTNESS, MAX_TEMP, MIN_SCALE_DELTA, MIN_TEMP, SENSOR_HEIGHT,
    SENSOR_WIDTH,
};
use crate::error::{CodecError, Error};

pub const RECORD_VERSION: u8 = 1;
pub const RECORD_LEN: usize = 16;

const FLAG_AUTO_SCALE: u8 = 1 << 0;
const FLAG_ANALYSIS: u8 = 1 << 1;
const FLAG_MARKERS: u8 = 1 << 2;

/// False-colour palettes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Palette {
    #[default]
    Iron,
    Rainbow,
    WhiteHot,
    BlackHot,
    Lava,
    Arctic,
}

impl Palette {
    pub const ALL: [Palette; 6] = [
        Palette::Iron,
        Palette::Rainbow,
        Palette::WhiteHot,
        Palette::BlackHot,
        Palette::Lava,
        Palette::Arctic,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(i: u8) -> Option<Self> {
        Self::ALL.get(i as usize).copied()
    }

    /// Next palette, wrapping.
    pub fn next(self) -> Self {
        Self::ALL[(self as usize + 1) % Self::ALL.len()]
    }

    /// Previous palette, wrapping.
    pub fn prev(self) -> Self {
        Self::ALL[(self as usize + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn name(self) -> &'static str {
        match self {
            Palette::Iron => "Iron",
            Palette::Rainbow => "Rainbow",
            Palette::WhiteHot => "White hot",
            Palette::BlackHot => "Black hot",
            Palette::Lava => "Lava",
            Palette::Arctic => "Arctic",
        }
    }
}

/// MLX90640 refresh rates (the register encoding is the enum index).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorRate {
    Hz0_5,
    Hz1,
    Hz2,
    Hz4,
    #[default]
    Hz8,
    Hz16,
    Hz32,
    Hz64,
}

impl SensorRate {
    pub const ALL: [SensorRate; 8] = [
        SensorRate::Hz0_5,
        SensorRate::Hz1,
        SensorRate::Hz2,
        SensorRate::Hz4,
        SensorRate::Hz8,
        SensorRate::Hz16,
        SensorRate::Hz32,
        SensorRate::Hz64,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn hz(self) -> f32 {
        match self {
            SensorRate::Hz0_5 => 0.5,
            SensorRate::Hz1 => 1.0,
            SensorRate::Hz2 => 2.0,
            SensorRate::Hz4 => 4.0,
            SensorRate::Hz8 => 8.0,
            SensorRate::Hz16 => 16.0,
            SensorRate::Hz32 => 32.0,
            SensorRate::Hz64 => 64.0,
        }
    }

    /// Period between two frames in milliseconds.
    pub fn period_ms(self) -> u64 {
        (1000.0 / self.hz()) as u64
    }

    /// At high rates bilinear upscaling cannot keep up; use nearest-neighbour.
    pub fn prefers_fast_upscale(self) -> bool {
        self >= SensorRate::Hz16
    }

    /// One step faster, saturating.
    pub fn faster(self) -> Self {
        Self::from_code(self.code() + 1).unwrap_or(self)
    }

    /// One step slower, saturating.
    pub fn slower(self) -> Self {
        match self.code() {
            0 => self,
            c => Self::from_code(c - 1).unwrap_or(self),
        }
    }
}

/// User-adjustable display parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplaySettings {
    /// Scale follows the live frame range when set; otherwise `manual_min..manual_max`.
    pub auto_scale: bool,
    pub manual_min: f32,
    pub manual_max: f32,
    pub palette: Palette,
    /// Where the palette midpoint sits inside the scale, 0..=100.
    pub palette_center_percent: u8,
    pub realtime_analysis: bool,
    pub sensor_rate: SensorRate,
    pub crosshair_col: u8,
    pub crosshair_row: u8,
    pub temp_markers: bool,
    pub brightness: u8,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            auto_scale: true,
            manual_min: 20.0,
            manual_max: 40.0,
            palette: Palette::Iron,
            palette_center_percent: 50,
            realtime_analysis: true,
            sensor_rate: SensorRate::Hz8,
            crosshair_col: (SENSOR_WIDTH / 2) as u8,
            crosshair_row: (SENSOR_HEIGHT / 2) as u8,
            temp_markers: true,
            brightness: DEFAULT_BRIGHTNESS,
        }
    }
}

/// Serialize settings into a flash record.
pub fn encode(s: &DisplaySettings) -> [u8; RECORD_LEN] {
    let mut buf = [0u8; RECORD_LEN];
    let mut flags = 0;
    if s.auto_scale {
        flags |= FLAG_AUTO_SCALE;
    }
    if s.realtime_analysis {
        flags |= FLAG_ANALYSIS;
    }
    if s.temp_markers {
        flags |= FLAG_MARKERS;
    }

    buf[0] = RECORD_VERSION;
    buf[1] = flags;
    buf[2..6].copy_from_slice(&s.manual_min.to_le_bytes());
    buf[6..10].copy_from_slice(&s.manual_max.to_le_bytes());
    buf[10] = s.palette.index();
    buf[11] = s.palette_center_percent;
    buf[12] = s.sensor_rate.code();
    buf[13] = s.crosshair_col;
    buf[14] = s.crosshair_row;
    buf[15] = s.brightness;
    buf
}

/// Parse a flash record, rejecting anything out of range.
pub fn decode(data: &[u8]) -> Result<DisplaySettings, CodecError> {
    if data.len() < RECORD_LEN {
        return Err(CodecError::Truncated);
    }
    if data[0] != RECORD_VERSION {
        return Err(CodecError::Version(data[0]));
    }

    let flags = data[1];
    let manual_min = f32::from_le_bytes([data[2], data[3], data[4], data[5]]);
    let manual_max = f32::from_le_bytes([data[6], data[7], data[8], data[9]]);
    if !(manual_min.is_finite() && manual_max.is_finite())
        || manual_min < MIN_TEMP
        || manual_max > MAX_TEMP
        || manual_max - manual_min < MIN_SCALE_DELTA
    {
        return Err(CodecError::Field);
    }

    let palette = Palette::from_index(data[10]).ok_or(CodecError::Field)?;
    let palette_center_percent = data[11];
    let sensor_rate = SensorRate::from_code(data[12]).ok_or(CodecError::Field)?;
    let crosshair_col = data[13];
    let crosshair_row = data[14];
    let brightness = data[15];

    if palette_center_percent > 100
        || crosshair_col as usize >= SENSOR_WIDTH
        || crosshair_row as usize >= SENSOR_HEIGHT
        || brightness > MAX_BRIGHTNESS
    {
        return Err(CodecError::Field);
    }

    Ok(DisplaySettings {
        auto_scale: flags & FLAG_AUTO_SCALE != 0,
        manual_min,
        manual_max,
        palette,
        palette_center_percent,
        realtime_analysis: flags & FLAG_ANALYSIS != 0,
        sensor_rate,
        crosshair_col,
        crosshair_row,
        temp_markers: flags & FLAG_MARKERS != 0,
        brightness,
    })
}

/// Persistent home of `DisplaySettings`.
#[allow(async_fn_in_trait)]
pub trait SettingsStore {
    /// Stored settings. `Ok(None)` when nothing has been saved yet.
    async fn load(&mut self) -> Result<Option<DisplaySettings>, Error>;

    async fn save(&mut self, settings: &DisplaySettings) -> Result<(), Error>;
}

impl<T: SettingsStore> SettingsStore for &mut T {
    async fn load(&mut self) -> Result<Option<DisplaySettings>, Error> {
        (**self).load().await
    }

    async fn save(&mut self, settings: &DisplaySettings) -> Result<(), Error> {
        (**self).save(settings).await
    }
}

/// RAM-backed store holding one encoded record.
///
/// Used when the flash is unavailable and by host tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub(crate) record: Option<[u8; RECORD_LEN]>,
    /// Number of successful saves.
    pub writes: u32,
    /// Make every operation fail with `Error::Storage`.
    pub fail: bool,
}

impl MemoryStore {
    pub const fn new() -> Self {
        Self {
            record: None,
            writes: 0,
            fail: false,
        }
    }

    /// Raw record, for tests that corrupt it.
    pub fn record_mut(&mut self) -> Option<&mut [u8; RECORD_LEN]> {
        self.record.as_mut()
    }
}

impl SettingsStore for MemoryStore {
    async fn load(&mut self) -> Result<Option<DisplaySettings>, Error> {
        if self.fail {
            return Err(Error::Storage);
        }
        match &self.record {
            Some(rec) => Ok(Some(decode(rec)?)),
            None => Ok(None),
        }
    }

    async fn save(&mut self, settings: &DisplaySettings) -> Result<(), Error> {
        if self.fail {
            return Err(Error::Storage);
        }
        self.record = Some(encode(settings));
        self.writes += 1;
        Ok(())
    }
}
