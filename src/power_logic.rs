//! Light-sleep state and the auto-sleep policy.
//!
//! Kept free of hardware so the sequencing can be tested on the host; the
//! hardware side lives in `power` and is reached through `PowerHooks`.

use core::sync::atomic::{AtomicBool, Ordering};

/// Hardware actions taken on sleep transitions.
pub trait PowerHooks {
    /// Pause (`true`) or resume the sensor. Returns the previous state.
    fn pause_sensor(&mut self, paused: bool) -> bool;

    /// Panel and backlight on or off. Turning on restores the saved brightness.
    fn set_display(&mut self, on: bool);

    /// Start the one-shot task that waits for input and ends the sleep.
    fn start_wake_watcher(&mut self);

    /// Ask the render task to draw one frame.
    fn request_redraw(&mut self);
}

/// Light-sleep flag shared by the render task and the wake watcher.
pub struct SleepState {
    sleeping: AtomicBool,
}

impl SleepState {
    pub const fn new() -> Self {
        Self {
            sleeping: AtomicBool::new(false),
        }
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleeping.load(Ordering::Acquire)
    }

    /// Enter light sleep. Returns false (and does nothing) if already asleep.
    pub fn enter(&self, hooks: &mut impl PowerHooks) -> bool {
        if self.sleeping.swap(true, Ordering::AcqRel) {
            return false;
        }
        hooks.pause_sensor(true);
        hooks.set_display(false);
        hooks.start_wake_watcher();
        true
    }

    /// Leave light sleep. Returns false (and does nothing) if awake.
    pub fn exit(&self, hooks: &mut impl PowerHooks) -> bool {
        if !self.sleeping.swap(false, Ordering::AcqRel) {
            return false;
        }
        hooks.pause_sensor(false);
        hooks.set_display(true);
        hooks.request_redraw();
        true
    }
}

impl Default for SleepState {
    fn default() -> Self {
        Self::new()
    }
}

/// Decide whether inactivity should put the device to sleep.
pub fn should_auto_sleep(
    enabled: bool,
    sleeping: bool,
    idle_ms: u64,
    timeout_secs: u64,
) -> bool {
    if !enabled || sleeping {
        return false;
    }

    idle_ms >= timeout_secs * 1000
}
