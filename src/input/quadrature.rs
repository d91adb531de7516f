//! Quadrature decoding for the rotary encoder.
//!
//! The A/B phases are sampled every `ENCODER_SAMPLE_PERIOD_MS`. Each sample
//! forms a 2-bit state `(A << 1) | B`; the pair (previous, current) indexes
//! a transition table giving -1, 0 or +1. Illegal jumps (both phases
//! changing at once) and repeats contribute 0, so contact noise averages
//! out instead of producing steps.

use super::debounce::ButtonState;
use super::EncoderEvent;
use crate::config::{BUTTON_DEBOUNCE_MS, ENCODER_IDLE_SAMPLES, ENCODER_STEPS_PER_DETENT};

/// Delta for each `(prev << 2) | curr` transition.
pub const TRANSITIONS: [i8; 16] = [0, -1, 1, 0, 1, 0, 0, -1, -1, 0, 0, 1, 0, 1, -1, 0];

/// Direction of the last detent-sized movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Neutral,
    Left,
    Right,
}

/// Combine phase levels into a 2-bit state.
#[inline]
pub const fn phase(a: bool, b: bool) -> u8 {
    ((a as u8) << 1) | b as u8
}

/// Rotary encoder state: phase, step accumulator and switch debounce.
#[derive(Debug)]
pub struct QuadratureDecoder {
    prev: u8,
    accum: i8,
    direction: Direction,
    idle_samples: u16,
    steps_per_detent: i8,
    idle_limit: u16,
    switch: ButtonState,
}

impl QuadratureDecoder {
    /// Start from the current pin levels so the first sample is not a step.
    pub const fn new(a: bool, b: bool) -> Self {
        Self::with_detent(a, b, ENCODER_STEPS_PER_DETENT, ENCODER_IDLE_SAMPLES)
    }

    pub const fn with_detent(a: bool, b: bool, steps_per_detent: i8, idle_limit: u16) -> Self {
        Self {
            prev: phase(a, b),
            accum: 0,
            direction: Direction::Neutral,
            idle_samples: 0,
            steps_per_detent,
            idle_limit,
            switch: ButtonState::new(BUTTON_DEBOUNCE_MS),
        }
    }

    /// Feed one A/B sample. Returns `Left`/`Right` when a full detent has
    /// accumulated.
    pub fn sample(&mut self, a: bool, b: bool) -> Option<EncoderEvent> {
        let curr = phase(a, b);
        let delta = TRANSITIONS[((self.prev << 2) | curr) as usize];
        self.prev = curr;

        if delta == 0 {
            if self.idle_samples < self.idle_limit {
                self.idle_samples += 1;
                if self.idle_samples == self.idle_limit {
                    // Quiet long enough: forget the direction, keep the phase.
                    self.direction = Direction::Neutral;
                }
            }
            return None;
        }

        self.idle_samples = 0;
        self.accum += delta;

        if self.accum >= self.steps_per_detent {
            self.accum = 0;
            self.direction = Direction::Right;
            Some(EncoderEvent::Right)
        } else if self.accum <= -self.steps_per_detent {
            self.accum = 0;
            self.direction = Direction::Left;
            Some(EncoderEvent::Left)
        } else {
            None
        }
    }

    /// Feed one switch sample (`pressed` = pin low). Emits `Press` on the
    /// debounced idle→pressed edge only.
    pub fn sample_switch(&mut self, pressed: bool, now_ms: u64) -> Option<EncoderEvent> {
        self.switch
            .just_pressed(pressed, now_ms)
            .then_some(EncoderEvent::Press)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Steps accumulated toward the next detent.
    pub fn pending_steps(&self) -> i8 {
        self.accum
    }
}
