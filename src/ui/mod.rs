//! User interface subsystem - live view navigation, menu and overlays.
//!
//! The render task owns one `UiState` and feeds it the input bits taken
//! from the event bus. Every state change happens in `navigation::transition`;
//! side effects that need hardware (flash, capture, sleep) are returned as
//! `Effects` for the caller to carry out.
//!
//! ## Components
//!
//! - **Navigation**: focus ring, sub-item ring and modals
//! - **Menu**: full-screen settings list
//! - **Scale lock**: temporary manual scale that expires
//! - **Toast**: two-line overlay message with a lifetime
//! - **Display**: drawing onto any `DrawTarget<Color = Rgb565>`

pub mod display;
pub mod input_logic;
pub mod menu;
pub mod navigation;
pub mod scale_lock;
pub mod toast;

use heapless::Vec;

use crate::event_bus::EventBits;

/// Live-view regions the focus cursor moves between.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Section {
    Title,
    Image,
    Lock,
    Data,
}

impl Section {
    pub const RING: [Section; 4] = [Section::Title, Section::Image, Section::Lock, Section::Data];

    pub fn position(self) -> usize {
        self as usize
    }
}

/// Entry inside the title or data bar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SubItem {
    #[default]
    Left,
    Center,
    Right,
}

impl SubItem {
    pub const RING: [SubItem; 3] = [SubItem::Left, SubItem::Center, SubItem::Right];

    pub fn next(self) -> Self {
        Self::RING[input_logic::ring_next(self as usize, Self::RING.len())]
    }

    pub fn prev(self) -> Self {
        Self::RING[input_logic::ring_prev(self as usize, Self::RING.len())]
    }
}

/// Logical input after splitting a bus wakeup into individual gestures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NavEvent {
    Up,
    Down,
    Confirm,
    Back,
    /// Wheel or encoder press.
    Press,
    /// `UP` and `DOWN` delivered in the same wakeup.
    UpDown,
}

/// Split input bits into gestures, in the order they are applied.
///
/// `UP | DOWN` together is one compound gesture, not two steps.
pub fn nav_events(bits: EventBits) -> Vec<NavEvent, 5> {
    let mut out = Vec::new();
    let both = EventBits::UP | EventBits::DOWN;

    if bits.contains(both) {
        let _ = out.push(NavEvent::UpDown);
    } else if bits.contains(EventBits::UP) {
        let _ = out.push(NavEvent::Up);
    } else if bits.contains(EventBits::DOWN) {
        let _ = out.push(NavEvent::Down);
    }
    if bits.contains(EventBits::CONFIRM) {
        let _ = out.push(NavEvent::Confirm);
    }
    if bits.contains(EventBits::BACK) {
        let _ = out.push(NavEvent::Back);
    }
    if bits.intersects(EventBits::PRESS) {
        let _ = out.push(NavEvent::Press);
    }
    out
}
