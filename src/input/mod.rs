//! Physical input decoding.
//!
//! Two controls feed the UI:
//!   - a SIQ-02 rotary encoder (quadrature A/B plus a push switch)
//!   - an analog three-way wheel read through a resistor divider on the SAADC
//!
//! The decoders are plain state machines fed one sample at a time so they
//! can be tested on the host. The sampler task (embedded only) reads the
//! pins, drives the decoders and publishes onto the event bus.

pub mod debounce;
pub mod quadrature;
pub mod wheel;

#[cfg(feature = "embedded")]
pub mod sampler;

use crate::event_bus::EventBits;

/// Logical encoder events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncoderEvent {
    /// One detent counter-clockwise.
    Left,
    /// One detent clockwise.
    Right,
    /// Shaft switch pressed.
    Press,
}

impl EncoderEvent {
    /// Bus bit published for this event.
    pub const fn bus_bits(self) -> EventBits {
        match self {
            EncoderEvent::Left => EventBits::UP,
            EncoderEvent::Right => EventBits::DOWN,
            EncoderEvent::Press => EventBits::ENCODER_PRESS,
        }
    }
}

/// Logical wheel events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WheelEvent {
    Left,
    Press,
    Right,
}

impl WheelEvent {
    /// Bus bit published for this event.
    pub const fn bus_bits(self) -> EventBits {
        match self {
            WheelEvent::Left => EventBits::BACK,
            WheelEvent::Press => EventBits::WHEEL_PRESS,
            WheelEvent::Right => EventBits::CONFIRM,
        }
    }
}
