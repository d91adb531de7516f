//! Analog three-way wheel classification.
//!
//! The wheel switches different resistors into a divider, so each position
//! settles at its own voltage. A reading is classified against calibrated
//! bands; the wheel re-arms once the voltage leaves every band (normally
//! back at the idle reference).

use super::WheelEvent;
use crate::config::{
    WHEEL_DEBOUNCE_MS, WHEEL_IDLE_MV, WHEEL_LEFT_MV, WHEEL_PRESS_MV, WHEEL_RIGHT_MV,
    WHEEL_TOLERANCE_MV,
};

/// Band centres and tolerance in millivolts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WheelCalibration {
    pub idle_mv: i32,
    pub left_mv: i32,
    pub press_mv: i32,
    pub right_mv: i32,
    pub tolerance_mv: i32,
    pub debounce_ms: u64,
}

impl Default for WheelCalibration {
    fn default() -> Self {
        Self {
            idle_mv: WHEEL_IDLE_MV,
            left_mv: WHEEL_LEFT_MV,
            press_mv: WHEEL_PRESS_MV,
            right_mv: WHEEL_RIGHT_MV,
            tolerance_mv: WHEEL_TOLERANCE_MV,
            debounce_ms: WHEEL_DEBOUNCE_MS,
        }
    }
}

/// SAADC full-scale input with gain 1/6 and the internal 0.6 V reference.
pub const SAADC_FULL_SCALE_MV: i32 = 3600;

/// SAADC resolution (12-bit).
pub const SAADC_MAX_COUNT: i32 = 4096;

/// Convert a raw single-ended SAADC result to millivolts. Negative results
/// are noise below ground and yield `None`.
pub fn saadc_to_mv(raw: i16) -> Option<i32> {
    if raw < 0 {
        return None;
    }
    Some(raw as i32 * SAADC_FULL_SCALE_MV / SAADC_MAX_COUNT)
}

/// What a single reading means.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reading {
    Idle,
    Event(WheelEvent),
    /// Between bands, usually while the contact is settling.
    Unknown,
}

impl WheelCalibration {
    fn near(&self, mv: i32, centre: i32) -> bool {
        (mv - centre).abs() <= self.tolerance_mv
    }

    pub fn classify(&self, mv: i32) -> Reading {
        if self.near(mv, self.left_mv) {
            Reading::Event(WheelEvent::Left)
        } else if self.near(mv, self.press_mv) {
            Reading::Event(WheelEvent::Press)
        } else if self.near(mv, self.right_mv) {
            Reading::Event(WheelEvent::Right)
        } else if self.near(mv, self.idle_mv) {
            Reading::Idle
        } else {
            Reading::Unknown
        }
    }
}

/// Debouncing classifier fed one ADC reading per period.
#[derive(Debug)]
pub struct WheelClassifier {
    cal: WheelCalibration,
    last: Option<WheelEvent>,
    last_emit_ms: Option<u64>,
}

impl WheelClassifier {
    pub fn new(cal: WheelCalibration) -> Self {
        Self {
            cal,
            last: None,
            last_emit_ms: None,
        }
    }

    pub fn calibration(&self) -> &WheelCalibration {
        &self.cal
    }

    /// Feed one reading (`None` when the conversion failed).
    pub fn sample(&mut self, reading_mv: Option<i32>, now_ms: u64) -> Option<WheelEvent> {
        let mv = reading_mv?;

        let event = match self.cal.classify(mv) {
            Reading::Event(ev) => ev,
            Reading::Idle | Reading::Unknown => {
                self.last = None;
                return None;
            }
        };

        if self.last == Some(event) {
            return None;
        }

        if let Some(t) = self.last_emit_ms {
            if now_ms.saturating_sub(t) < self.cal.debounce_ms {
                return None;
            }
        }

        self.last = Some(event);
        self.last_emit_ms = Some(now_ms);
        Some(event)
    }
}

impl Default for WheelClassifier {
    fn default() -> Self {
        Self::new(WheelCalibration::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saadc_counts_to_millivolts() {
        assert_eq!(saadc_to_mv(0), Some(0));
        assert_eq!(saadc_to_mv(2048), Some(1800));
        assert_eq!(saadc_to_mv(4095), Some(3599));
        assert_eq!(saadc_to_mv(-3), None);
    }

    #[test]
    fn bands_classify() {
        let cal = WheelCalibration::default();
        assert_eq!(cal.classify(1768), Reading::Idle);
        assert_eq!(cal.classify(1090 + 75), Reading::Event(WheelEvent::Left));
        assert_eq!(cal.classify(1090 - 76), Reading::Unknown);
        assert_eq!(cal.classify(560), Reading::Event(WheelEvent::Press));
        assert_eq!(cal.classify(1420), Reading::Event(WheelEvent::Right));
        assert_eq!(cal.classify(3000), Reading::Unknown);
    }

    #[test]
    fn held_position_emits_once() {
        let mut wheel = WheelClassifier::default();
        let mut count = 0;
        for t in (0..1_000).step_by(20) {
            if wheel.sample(Some(1100), t).is_some() {
                count += 1;
            }
        }
        assert_eq!(count, 1);
    }

    #[test]
    fn idle_rearms_after_debounce() {
        let mut wheel = WheelClassifier::default();
        assert_eq!(wheel.sample(Some(1090), 0), Some(WheelEvent::Left));
        assert_eq!(wheel.sample(Some(1768), 50), None);
        // Same band again, but inside the debounce window.
        assert_eq!(wheel.sample(Some(1090), 100), None);
        assert_eq!(wheel.sample(Some(1090), 200), Some(WheelEvent::Left));
    }

    #[test]
    fn different_band_waits_for_debounce() {
        let mut wheel = WheelClassifier::default();
        assert_eq!(wheel.sample(Some(1420), 0), Some(WheelEvent::Right));
        assert_eq!(wheel.sample(Some(560), 120), None);
        assert_eq!(wheel.sample(Some(560), 220), Some(WheelEvent::Press));
    }

    #[test]
    fn failed_and_out_of_band_reads_never_emit() {
        let mut wheel = WheelClassifier::default();
        assert_eq!(wheel.sample(None, 0), None);
        assert_eq!(wheel.sample(Some(1300), 20), None);
        assert_eq!(wheel.sample(Some(4000), 30), None);
        assert_eq!(wheel.sample(Some(1420), 40), Some(WheelEvent::Right));
        // A failed read keeps the wheel armed on the held position.
        assert_eq!(wheel.sample(None, 300), None);
        assert_eq!(wheel.sample(Some(1420), 320), None);
    }

    #[test]
    fn sparse_sampling_of_a_short_push_emits_once() {
        let mut wheel = WheelClassifier::default();
        // Pushed left between 400 and 700 ms, sampled every 500 ms.
        let level = |t: u64| if (400..700).contains(&t) { 1090 } else { 1768 };
        let events = (0..3_000)
            .step_by(500)
            .filter_map(|t| wheel.sample(Some(level(t)), t))
            .count();
        assert_eq!(events, 1);
    }

    #[test]
    fn custom_calibration_is_used() {
        let cal = WheelCalibration {
            left_mv: 900,
            ..WheelCalibration::default()
        };
        let mut wheel = WheelClassifier::new(cal);
        assert_eq!(wheel.sample(Some(1090), 0), None);
        assert_eq!(wheel.sample(Some(905), 20), Some(WheelEvent::Left));
    }
}
