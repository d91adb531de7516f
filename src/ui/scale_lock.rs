//! Temporary scale lock.
//!
//! Locking pins the colour scale to the range of the frame on screen, so a
//! hot object entering the view does not wash out the rest of the image.
//! The lock lasts `SCALE_LOCK_MS`. When it runs out it is kept alive in
//! `SCALE_LOCK_EXTEND_MS` steps for as long as the scene still fits the
//! locked range; once it no longer fits the previous scale comes back.
//!
//! Only the in-memory settings change. `persisted_view` gives the copy that
//! may be written to flash while a lock is active.

use crate::config::{SCALE_LOCK_EXTEND_MS, SCALE_LOCK_MS, TOAST_LONG_MS, TOAST_MS};
use crate::frame::FrameStats;
use crate::mapping::ScaleRange;
use crate::settings::DisplaySettings;
use crate::ui::toast::Toast;

/// Scale settings in force before the lock.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SavedScale {
    auto_scale: bool,
    manual_min: f32,
    manual_max: f32,
}

impl SavedScale {
    fn capture(s: &DisplaySettings) -> Self {
        Self {
            auto_scale: s.auto_scale,
            manual_min: s.manual_min,
            manual_max: s.manual_max,
        }
    }

    fn apply(&self, s: &mut DisplaySettings) {
        s.auto_scale = self.auto_scale;
        s.manual_min = self.manual_min;
        s.manual_max = self.manual_max;
    }
}

/// What a lock operation did.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LockOutcome {
    /// Lock set (or refreshed) to this range.
    Locked(ScaleRange),
    /// No frame to take a range from.
    NoFrame,
    /// Lock running, nothing to do.
    Holding,
    /// Expired but the scene still fits; extended.
    Retained,
    /// Expired and the previous scale is back.
    Restored,
    /// No lock.
    Inactive,
}

impl LockOutcome {
    /// Overlay message for outcomes the user should see.
    pub fn toast(&self, now_ms: u64) -> Option<Toast> {
        match self {
            LockOutcome::Locked(r) => Some(Toast::with_value(
                "Scale locked",
                format_args!("{:.1} .. {:.1}", r.min, r.max),
                now_ms,
                TOAST_LONG_MS,
            )),
            LockOutcome::NoFrame => Some(Toast::new("Scale lock", "no frame yet", now_ms, TOAST_MS)),
            LockOutcome::Retained => Some(Toast::new("Scale lock", "retained", now_ms, TOAST_MS)),
            LockOutcome::Restored => Some(Toast::new("Scale lock", "restored", now_ms, TOAST_MS)),
            LockOutcome::Holding | LockOutcome::Inactive => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct ScaleLock {
    saved: Option<SavedScale>,
    locked: Option<ScaleRange>,
    expires_at_ms: u64,
}

impl ScaleLock {
    pub const fn new() -> Self {
        Self {
            saved: None,
            locked: None,
            expires_at_ms: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.locked.is_some()
    }

    pub fn locked_range(&self) -> Option<ScaleRange> {
        self.locked
    }

    pub fn expires_at_ms(&self) -> u64 {
        self.expires_at_ms
    }

    /// Pin the scale to the live frame range. A second activation refreshes
    /// range and expiry but keeps the scale saved by the first.
    pub fn activate(
        &mut self,
        settings: &mut DisplaySettings,
        live: Option<&FrameStats>,
        now_ms: u64,
    ) -> LockOutcome {
        let Some(stats) = live else {
            return LockOutcome::NoFrame;
        };

        if self.saved.is_none() {
            self.saved = Some(SavedScale::capture(settings));
        }

        let range = ScaleRange {
            min: stats.min,
            max: stats.max,
        };
        settings.auto_scale = false;
        settings.manual_min = range.min;
        settings.manual_max = range.max;

        self.locked = Some(range);
        self.expires_at_ms = now_ms + SCALE_LOCK_MS;
        LockOutcome::Locked(range)
    }

    /// Per-frame expiry check.
    pub fn tick(
        &mut self,
        settings: &mut DisplaySettings,
        live: &FrameStats,
        now_ms: u64,
    ) -> LockOutcome {
        let Some(range) = self.locked else {
            return LockOutcome::Inactive;
        };
        if now_ms < self.expires_at_ms {
            return LockOutcome::Holding;
        }

        if live.fits_within(range.min, range.max) {
            self.expires_at_ms = now_ms + SCALE_LOCK_EXTEND_MS;
            LockOutcome::Retained
        } else {
            self.release(settings)
        }
    }

    /// Drop the lock now and put the previous scale back.
    pub fn release(&mut self, settings: &mut DisplaySettings) -> LockOutcome {
        if self.locked.take().is_none() {
            return LockOutcome::Inactive;
        }
        if let Some(saved) = self.saved.take() {
            saved.apply(settings);
        }
        LockOutcome::Restored
    }

    /// Settings as they should be stored: the locked scale is replaced by
    /// the one it overrides.
    pub fn persisted_view(&self, settings: &DisplaySettings) -> DisplaySettings {
        let mut out = *settings;
        if let Some(saved) = self.saved {
            saved.apply(&mut out);
        }
        out
    }
}
