//! Library interface for thermocam.
//!
//! Everything that does not touch a peripheral lives here and is tested on
//! the host: input decoding, the event bus, navigation, scale selection,
//! palettes, rendering onto any `DrawTarget`, settings records and the
//! sleep sequencing.
//!
//! Usage: `cargo test --lib` (host) or `cargo build --features embedded`
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main].
//! The hardware modules (`power`, `storage`, the panel driver and the
//! sampler tasks) only exist with the `embedded` feature.

#![cfg_attr(not(test), no_std)]

// ═══════════════════════════════════════════════════════════════════════════
// Core
// ═══════════════════════════════════════════════════════════════════════════

pub mod config;
pub mod error;
pub mod event_bus;

// ═══════════════════════════════════════════════════════════════════════════
// Image pipeline
// ═══════════════════════════════════════════════════════════════════════════

pub mod frame;
pub mod mapping;
pub mod palette;
pub mod upscale;

// ═══════════════════════════════════════════════════════════════════════════
// Collaborators
// ═══════════════════════════════════════════════════════════════════════════

pub mod capture;
pub mod panel;
pub mod sensor;
pub mod settings;

// ═══════════════════════════════════════════════════════════════════════════
// Input, UI and power
// ═══════════════════════════════════════════════════════════════════════════

pub mod camera;
pub mod input;
pub mod power_logic;
pub mod ui;

#[cfg(feature = "embedded")]
pub mod power;
#[cfg(feature = "embedded")]
pub mod storage;

pub use error::Error;

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════
