//! Application-wide constants and compile-time configuration.
//!
//! All hardware pin assignments, timing parameters, calibration defaults
//! and layout constants live here so they can be tuned in one place.

// Sensor

/// MLX90640 grid width (columns).
pub const SENSOR_WIDTH: usize = 32;

/// MLX90640 grid height (rows).
pub const SENSOR_HEIGHT: usize = 24;

/// Pixels per frame.
pub const SENSOR_PIXELS: usize = SENSOR_WIDTH * SENSOR_HEIGHT;

/// Lowest temperature the sensor can report (°C). Frame minima are clamped to it.
pub const MIN_TEMP: f32 = -40.0;

/// Highest temperature the sensor can report (°C). Frame maxima are clamped to it.
pub const MAX_TEMP: f32 = 300.0;

/// Fixed-point factor between °C and the integer units used by the
/// upscaler and the palette mapper (deci-degrees).
pub const TEMP_SCALE: f32 = 10.0;

/// Upper bound on generated palette steps: the full sensor range in deci-degrees.
pub const MAX_PALETTE_STEPS: usize = ((MAX_TEMP - MIN_TEMP) * TEMP_SCALE) as usize;

/// Smallest span the manual scale may be narrowed to (°C).
pub const MIN_SCALE_DELTA: f32 = 2.0;

// Display (ST7789, 240×240)

pub const SCREEN_WIDTH: u32 = 240;
pub const SCREEN_HEIGHT: u32 = 240;

/// Title bar height (palette name, scale lock, unit).
pub const TOP_BAR_HEIGHT: u32 = 20;

/// Data bar height (max/min/center, strip plot, FPS).
pub const BOTTOM_BAR_HEIGHT: u32 = 55;

/// Left gutter used for the focus indicator.
pub const IMAGE_X: u32 = 10;
pub const IMAGE_Y: u32 = TOP_BAR_HEIGHT;
pub const IMAGE_WIDTH: u32 = SCREEN_WIDTH - 20;
pub const IMAGE_HEIGHT: u32 = SCREEN_HEIGHT - TOP_BAR_HEIGHT - BOTTOM_BAR_HEIGHT;

/// Backlight range. 0 is off.
pub const MAX_BRIGHTNESS: u8 = 100;
pub const BRIGHTNESS_STEP: u8 = 10;
pub const DEFAULT_BRIGHTNESS: u8 = 70;

// GPIO pin assignments (custom carrier board, nRF52840 module)
//
// These are logical names; actual `embassy_nrf::peripherals::*` types are
// selected in `main.rs`.  Adjust for your PCB revision.
//
//   Encoder A        → P0.02
//   Encoder B        → P0.03
//   Encoder switch   → P0.28 (also the System OFF wake pin)
//   Wheel divider    → P0.29 / AIN5
//   Display SCK/MOSI → P0.13 / P0.14
//   Display CS/DC    → P0.15 / P0.16, RST → P0.11
//   Backlight PWM    → P0.12
//   Sensor SDA/SCL   → P0.26 / P0.27
//   QSPI SCK/CSN     → P0.19 / P0.17
//   QSPI IO0..IO3    → P0.20 / P0.21 / P0.22 / P0.23

// Input sampling

/// Quadrature sampling period (ms).
pub const ENCODER_SAMPLE_PERIOD_MS: u64 = 2;

/// Quadrature steps per mechanical detent.
pub const ENCODER_STEPS_PER_DETENT: i8 = 4;

/// Samples without movement before the direction resets to neutral (~100 ms).
pub const ENCODER_IDLE_SAMPLES: u16 = 50;

/// Encoder push-switch debounce time (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 50;

/// Wheel ADC sampling period (ms).
pub const WHEEL_SAMPLE_PERIOD_MS: u64 = 20;

/// Minimum spacing between two emitted wheel events (ms).
pub const WHEEL_DEBOUNCE_MS: u64 = 200;

/// Wheel divider voltages measured on the reference board (mV).
/// Board revisions override these through `WheelCalibration`.
pub const WHEEL_IDLE_MV: i32 = 1768;
pub const WHEEL_LEFT_MV: i32 = 1090;
pub const WHEEL_PRESS_MV: i32 = 560;
pub const WHEEL_RIGHT_MV: i32 = 1420;
pub const WHEEL_TOLERANCE_MV: i32 = 75;

// UI timing

/// Toast lifetimes (ms).
pub const TOAST_SHORT_MS: u64 = 400;
pub const TOAST_MS: u64 = 600;
pub const TOAST_LONG_MS: u64 = 900;

/// Lifetime of a temporary scale lock (ms).
pub const SCALE_LOCK_MS: u64 = 5_000;

/// Extension granted when the scene still fits the locked range (ms).
pub const SCALE_LOCK_EXTEND_MS: u64 = 1_000;

/// Frames-per-second meter window (ms).
pub const FPS_WINDOW_MS: u64 = 1_000;

/// Pixel depth of stored screenshots (8 or 16).
pub const CAPTURE_BIT_DEPTH: u8 = 16;

// Power

/// Enable automatic light sleep after inactivity.
pub const AUTO_SLEEP_ENABLED: bool = true;

/// Inactivity timeout before light sleep (seconds).
pub const INACTIVITY_SLEEP_SECS: u64 = 300;

/// Render task wakeup period when no frame or input arrives (ms).
/// Drives toast expiry and the inactivity check.
pub const UI_TICK_MS: u64 = 100;

/// Delay between panel power-on and backlight restore (ms).
pub const DISPLAY_WAKE_DELAY_MS: u64 = 20;

// Flash layout (external QSPI NOR, 4 KB sectors)

pub const FLASH_SECTOR_SIZE: u32 = 4096;

/// External flash size (MX25R6435F, 8 MB).
pub const QSPI_FLASH_CAPACITY: u32 = 8 * 1024 * 1024;

/// Settings map: two sectors so sequential-storage can garbage-collect.
pub const SETTINGS_FLASH_START: u32 = 0;
pub const SETTINGS_FLASH_END: u32 = SETTINGS_FLASH_START + 2 * FLASH_SECTOR_SIZE;

/// Screenshot queue: 128 sectors (512 KB).
pub const CAPTURE_FLASH_START: u32 = 0x0001_0000;
pub const CAPTURE_FLASH_END: u32 = CAPTURE_FLASH_START + 128 * FLASH_SECTOR_SIZE;
