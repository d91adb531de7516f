//! Push-switch debounce with time-based edge detection.
//!
//! Contact bounce on the encoder switch would otherwise register several
//! presses per click. Time is passed in explicitly (milliseconds since boot)
//! so the logic runs the same on target and on the host.

/// Debounce state for one active-low switch.
#[derive(Debug)]
pub struct ButtonState {
    was_pressed: bool,
    last_change_ms: Option<u64>,
    debounce_ms: u64,
}

impl ButtonState {
    /// Create a new button state (not pressed).
    pub const fn new(debounce_ms: u64) -> Self {
        Self {
            was_pressed: false,
            last_change_ms: None,
            debounce_ms,
        }
    }

    /// Returns true only on the idle→pressed edge.
    ///
    /// Level changes closer than the debounce time to the previous accepted
    /// change are ignored, so bounce on either edge cannot re-trigger.
    pub fn just_pressed(&mut self, pressed: bool, now_ms: u64) -> bool {
        if pressed == self.was_pressed {
            return false;
        }

        if let Some(last) = self.last_change_ms {
            if now_ms.saturating_sub(last) < self.debounce_ms {
                return false;
            }
        }

        self.was_pressed = pressed;
        self.last_change_ms = Some(now_ms);
        pressed
    }

    pub fn is_pressed(&self) -> bool {
        self.was_pressed
    }
}
