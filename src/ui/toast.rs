//! Short-lived two-line overlay messages.

use core::fmt::Write;

use heapless::String;

pub const TOAST_LINE_LEN: usize = 24;
pub type ToastLine = String<TOAST_LINE_LEN>;

/// Overlay message shown until `expires_at_ms`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub line1: ToastLine,
    pub line2: ToastLine,
    pub expires_at_ms: u64,
}

fn truncated(s: &str) -> ToastLine {
    let mut out = ToastLine::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

impl Toast {
    pub fn new(line1: &str, line2: &str, now_ms: u64, ttl_ms: u64) -> Self {
        Self {
            line1: truncated(line1),
            line2: truncated(line2),
            expires_at_ms: now_ms + ttl_ms,
        }
    }

    /// Toast whose second line is a formatted value.
    pub fn with_value(
        line1: &str,
        value: core::fmt::Arguments<'_>,
        now_ms: u64,
        ttl_ms: u64,
    ) -> Self {
        let mut toast = Self::new(line1, "", now_ms, ttl_ms);
        // Overlong values are cut at capacity.
        let _ = toast.line2.write_fmt(value);
        toast
    }

    #[inline]
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at_ms
    }
}
