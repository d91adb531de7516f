//! Frame acquisition: the double buffer between the sensor task and the
//! render task, and the built-in demo scene used as the frame producer.
//!
//! The producer alternates between two slots and announces each write with
//! the slot's bus bit (`FRAME_0` / `FRAME_1`). The consumer copies a slot
//! out under the mutex, so neither side ever sees a half-written frame.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
#[allow(unused_imports)]
use micromath::F32Ext;

use crate::config::{SENSOR_HEIGHT, SENSOR_WIDTH};
use crate::error::Error;
use crate::event_bus::EventBits;
use crate::frame::Frame;
use crate::settings::SensorRate;

/// Control surface of the frame producer.
pub trait FrameSource {
    /// Pause (`true`) or resume acquisition. Returns the previous state.
    fn pause(&self, paused: bool) -> bool;

    fn is_paused(&self) -> bool;

    fn set_rate(&self, rate: SensorRate);

    /// Copy the frame held in `slot` into `out`.
    fn read(&self, slot: usize, out: &mut Frame) -> Result<(), Error>;
}

/// Bus bit announcing a write to `slot`.
pub fn slot_bit(slot: usize) -> EventBits {
    if slot & 1 == 0 {
        EventBits::FRAME_0
    } else {
        EventBits::FRAME_1
    }
}

pub struct SharedFrames<M: RawMutex> {
    slots: Mutex<M, RefCell<[Frame; 2]>>,
    /// Bit per slot that has been written at least once.
    filled: AtomicU8,
    newest: AtomicU8,
    paused: AtomicBool,
    rate: AtomicU8,
}

impl<M: RawMutex> SharedFrames<M> {
    pub const fn new() -> Self {
        Self {
            slots: Mutex::new(RefCell::new([Frame::filled(0.0), Frame::filled(0.0)])),
            filled: AtomicU8::new(0),
            newest: AtomicU8::new(0),
            paused: AtomicBool::new(false),
            rate: AtomicU8::new(SensorRate::Hz8 as u8),
        }
    }

    /// Store `frame` in `slot`. Returns the bit to set on the bus.
    pub fn publish(&self, slot: usize, frame: &Frame) -> EventBits {
        let slot = slot & 1;
        self.slots.lock(|s| s.borrow_mut()[slot].clone_from(frame));
        self.filled.fetch_or(1 << slot, Ordering::Release);
        self.newest.store(slot as u8, Ordering::Release);
        slot_bit(slot)
    }

    /// Slot to read for a set of frame bits. With both bits pending the
    /// more recent write wins.
    pub fn slot_for(&self, bits: EventBits) -> Option<usize> {
        match (
            bits.contains(EventBits::FRAME_0),
            bits.contains(EventBits::FRAME_1),
        ) {
            (true, true) => Some(self.newest.load(Ordering::Acquire) as usize),
            (true, false) => Some(0),
            (false, true) => Some(1),
            (false, false) => None,
        }
    }

    pub fn rate(&self) -> SensorRate {
        SensorRate::from_code(self.rate.load(Ordering::Relaxed)).unwrap_or_default()
    }
}

impl<M: RawMutex> Default for SharedFrames<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> FrameSource for SharedFrames<M> {
    fn pause(&self, paused: bool) -> bool {
        self.paused.swap(paused, Ordering::AcqRel)
    }

    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    fn set_rate(&self, rate: SensorRate) {
        self.rate.store(rate.code(), Ordering::Relaxed);
    }

    fn read(&self, slot: usize, out: &mut Frame) -> Result<(), Error> {
        let slot = slot & 1;
        if self.filled.load(Ordering::Acquire) & (1 << slot) == 0 {
            return Err(Error::SensorUnavailable);
        }
        self.slots.lock(|s| out.clone_from(&s.borrow()[slot]));
        Ok(())
    }
}

/// Synthetic scene: a warm room with a hot spot orbiting the centre and a
/// cold patch in one corner.
#[derive(Clone, Copy, Debug)]
pub struct DemoScene {
    pub ambient: f32,
    pub hot: f32,
    pub cold: f32,
}

impl Default for DemoScene {
    fn default() -> Self {
        Self {
            ambient: 22.0,
            hot: 48.0,
            cold: 12.0,
        }
    }
}

impl DemoScene {
    pub fn render(&self, t_ms: u64, out: &mut Frame) {
        let t = (t_ms % 60_000) as f32 / 1000.0;
        let cx = SENSOR_WIDTH as f32 / 2.0 + 8.0 * (t * 0.6).cos();
        let cy = SENSOR_HEIGHT as f32 / 2.0 + 5.0 * (t * 0.6).sin();
        let drift = 0.5 * (t * 0.2).sin();

        for row in 0..SENSOR_HEIGHT {
            for col in 0..SENSOR_WIDTH {
                let dx = col as f32 - cx;
                let dy = row as f32 - cy;
                let spot = (self.hot - self.ambient) / (1.0 + (dx * dx + dy * dy) / 6.0);

                let ex = col as f32 - 2.0;
                let ey = row as f32 - 2.0;
                let patch = (self.cold - self.ambient) / (1.0 + (ex * ex + ey * ey) / 4.0);

                out.set(col, row, self.ambient + drift + spot + patch);
            }
        }
    }
}

#[cfg(feature = "embedded")]
mod task {
    use defmt::info;
    use embassy_sync::blocking_mutex::raw::RawMutex;
    use embassy_time::{Instant, Timer};

    use super::{DemoScene, FrameSource, SharedFrames};
    use crate::event_bus::EventBus;
    use crate::frame::Frame;

    const PAUSED_POLL_MS: u64 = 100;

    /// Produce frames at the configured rate until the end of time.
    pub async fn run<M: RawMutex>(frames: &SharedFrames<M>, bus: &EventBus<M>) -> ! {
        let scene = DemoScene::default();
        let start = Instant::now();
        let mut frame = Frame::default();
        let mut slot = 0;
        let mut was_paused = false;

        info!("Sensor: demo scene at {} Hz", frames.rate().hz());

        loop {
            if frames.is_paused() {
                if !was_paused {
                    info!("Sensor: paused");
                    was_paused = true;
                }
                Timer::after_millis(PAUSED_POLL_MS).await;
                continue;
            }
            if was_paused {
                info!("Sensor: resumed");
                was_paused = false;
            }

            Timer::after_millis(frames.rate().period_ms()).await;
            scene.render(start.elapsed().as_millis(), &mut frame);
            bus.set(frames.publish(slot, &frame));
            slot ^= 1;
        }
    }
}

#[cfg(feature = "embedded")]
pub use task::run;
