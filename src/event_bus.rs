//! Bitmask event bus between the producer tasks and the render task.
//!
//! Producers (input sampler, sensor task, power manager) set bits from
//! their own context. A waiter blocks on a mask and, when any of those
//! bits is set, takes and clears exactly the requested bits that were
//! pending. Bits outside the mask stay pending for a later wait.
//!
//! Bits set between two wakeups are delivered together: `UP | DOWN`
//! arriving in one take means both happened, which the navigation layer
//! treats as a single compound gesture.

use core::cell::RefCell;
use core::future::poll_fn;
use core::ops::{BitAnd, BitOr, BitOrAssign};
use core::task::{Context, Poll};

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::waitqueue::MultiWakerRegistration;

/// Maximum number of tasks that may wait on the bus at the same time
/// (render task, sleep watcher, plus headroom).
const MAX_WAITERS: usize = 4;

/// A set of bus bits.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventBits(u32);

impl EventBits {
    pub const NONE: Self = Self(0);

    /// Sensor finished writing frame slot 0.
    pub const FRAME_0: Self = Self(1 << 0);
    /// Sensor finished writing frame slot 1.
    pub const FRAME_1: Self = Self(1 << 1);

    /// Encoder turned left one detent.
    pub const UP: Self = Self(1 << 2);
    /// Encoder turned right one detent.
    pub const DOWN: Self = Self(1 << 3);
    /// Wheel pushed left.
    pub const BACK: Self = Self(1 << 4);
    /// Wheel pushed right.
    pub const CONFIRM: Self = Self(1 << 5);
    /// Wheel pressed in.
    pub const WHEEL_PRESS: Self = Self(1 << 6);
    /// Encoder shaft pressed.
    pub const ENCODER_PRESS: Self = Self(1 << 7);

    pub const FRAMES: Self = Self::FRAME_0.union(Self::FRAME_1);
    pub const PRESS: Self = Self::WHEEL_PRESS.union(Self::ENCODER_PRESS);
    pub const INPUT: Self = Self::UP
        .union(Self::DOWN)
        .union(Self::BACK)
        .union(Self::CONFIRM)
        .union(Self::PRESS);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if every bit of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if any bit of `other` is set.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl BitOr for EventBits {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for EventBits {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for EventBits {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

struct BusState {
    pending: u32,
    waiters: MultiWakerRegistration<MAX_WAITERS>,
}

/// Mutex-guarded bitset with a multi-waiter registration.
///
/// `M` is `CriticalSectionRawMutex` on target so producers in any
/// executor or interrupt context can publish.
pub struct EventBus<M: RawMutex> {
    state: Mutex<M, RefCell<BusState>>,
}

impl<M: RawMutex> EventBus<M> {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(BusState {
                pending: 0,
                waiters: MultiWakerRegistration::new(),
            })),
        }
    }

    /// Set `bits` and wake every waiter so each can re-check its mask.
    pub fn set(&self, bits: EventBits) {
        if bits.is_empty() {
            return;
        }
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            s.pending |= bits.0;
            s.waiters.wake();
        });
    }

    /// Drop pending bits without delivering them.
    pub fn clear(&self, bits: EventBits) {
        self.state.lock(|s| s.borrow_mut().pending &= !bits.0);
    }

    /// Pending bits, without consuming them.
    pub fn pending(&self) -> EventBits {
        self.state.lock(|s| EventBits(s.borrow().pending))
    }

    /// Take and clear the pending bits within `mask`, if any.
    pub fn try_take(&self, mask: EventBits) -> Option<EventBits> {
        self.state.lock(|s| take_locked(&mut s.borrow_mut(), mask))
    }

    /// Wait until any bit in `mask` is pending, then take and clear the
    /// pending bits within `mask`.
    pub async fn wait(&self, mask: EventBits) -> EventBits {
        debug_assert!(!mask.is_empty(), "waiting on an empty mask never completes");
        poll_fn(|cx| self.poll_take(mask, cx)).await
    }

    fn poll_take(&self, mask: EventBits, cx: &mut Context<'_>) -> Poll<EventBits> {
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            match take_locked(&mut s, mask) {
                Some(bits) => Poll::Ready(bits),
                None => {
                    s.waiters.register(cx.waker());
                    Poll::Pending
                }
            }
        })
    }
}

impl<M: RawMutex> Default for EventBus<M> {
    fn default() -> Self {
        Self::new()
    }
}

fn take_locked(state: &mut BusState, mask: EventBits) -> Option<EventBits> {
    let hit = state.pending & mask.0;
    if hit == 0 {
        return None;
    }
    state.pending &= !hit;
    Some(EventBits(hit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, NoopRawMutex};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn take_returns_only_requested_bits() {
        let bus: EventBus<NoopRawMutex> = EventBus::new();
        bus.set(EventBits::UP | EventBits::FRAME_0);

        assert_eq!(bus.try_take(EventBits::INPUT), Some(EventBits::UP));
        assert_eq!(bus.pending(), EventBits::FRAME_0);
        assert_eq!(bus.try_take(EventBits::INPUT), None);
        assert_eq!(bus.try_take(EventBits::FRAMES), Some(EventBits::FRAME_0));
        assert!(bus.pending().is_empty());
    }

    #[test]
    fn bits_set_between_waits_are_coalesced() {
        let bus: EventBus<NoopRawMutex> = EventBus::new();
        bus.set(EventBits::UP);
        bus.set(EventBits::DOWN);
        bus.set(EventBits::UP);

        let got = block_on(bus.wait(EventBits::INPUT));
        assert!(got.contains(EventBits::UP | EventBits::DOWN));
        assert_eq!(got, EventBits::UP | EventBits::DOWN);
    }

    #[test]
    fn clear_discards_pending() {
        let bus: EventBus<NoopRawMutex> = EventBus::new();
        bus.set(EventBits::CONFIRM | EventBits::BACK);
        bus.clear(EventBits::BACK);
        assert_eq!(bus.pending(), EventBits::CONFIRM);
    }

    #[test]
    fn setting_no_bits_is_ignored() {
        let bus: EventBus<NoopRawMutex> = EventBus::new();
        bus.set(EventBits::NONE);
        assert!(bus.pending().is_empty());
    }

    #[test]
    fn waiter_is_released_by_another_thread() {
        static BUS: EventBus<CriticalSectionRawMutex> = EventBus::new();

        let producer = thread::spawn(|| {
            thread::sleep(Duration::from_millis(20));
            BUS.set(EventBits::FRAME_1);
            BUS.set(EventBits::CONFIRM);
        });

        let got = block_on(BUS.wait(EventBits::CONFIRM));
        producer.join().unwrap();

        assert_eq!(got, EventBits::CONFIRM);
        // The frame bit was outside the mask and stays pending.
        assert_eq!(BUS.pending(), EventBits::FRAME_1);
    }

    #[test]
    fn event_bits_set_algebra() {
        let bits = EventBits::UP | EventBits::BACK;
        assert!(bits.intersects(EventBits::INPUT));
        assert!(!bits.intersects(EventBits::FRAMES));
        assert!(!bits.contains(EventBits::UP | EventBits::DOWN));
        assert_eq!(bits.without(EventBits::UP), EventBits::BACK);
        assert_eq!((bits & EventBits::UP).bits(), 1 << 2);
    }
}
