//! Unified error type for thermocam.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Storage
    /// Flash read/write/erase failed.
    Storage,

    /// A stored record was truncated, had the wrong version or an out-of-range field.
    Codec(CodecError),

    // Collaborators
    /// The screenshot could not be written.
    Capture,

    /// No frame has been produced yet (or the sensor is paused).
    SensorUnavailable,

    /// SPI transaction to the display failed.
    Display,

    // Generic
    /// Buffer too small for the requested operation.
    BufferOverflow,

    /// Operation timed out.
    Timeout,
}

/// Why a settings record was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// Fewer bytes than a full record.
    Truncated,
    /// Record written by an incompatible firmware.
    Version(u8),
    /// A field decoded to a value outside its domain.
    Field,
}

// Convenience conversions

impl From<CodecError> for Error {
    fn from(e: CodecError) -> Self {
        Error::Codec(e)
    }
}
