//! Power management - light and deep sleep on the nRF52840.
//!
//! Implements:
//! - Light sleep: sensor paused, panel and backlight off, CPU idles in
//!   System ON until any input edge
//! - Deep sleep: System OFF, wake on the encoder switch (full reset)
//!
//! nRF52840 power modes:
//! - System ON: Normal operation (~6 mA with sensor and panel active)
//! - System ON Idle: CPU sleeping, RTC and GPIOTE active (~1.5 mA)
//! - System OFF: Deep sleep, wake on GPIO SENSE (~0.4 µA)
//!
//! The sequencing lives in `power_logic::SleepState`; this module only
//! supplies the hardware side.

use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_nrf::pac;
use embassy_nrf::pac::gpio::vals;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use crate::event_bus::{EventBits, EventBus};
use crate::panel::Panel;
use crate::power_logic::{PowerHooks, SleepState};
use crate::sensor::{FrameSource, SharedFrames};

/// Encoder switch pin on port 0, also the System OFF wake source.
const WAKE_PIN: usize = 28;

/// Light-sleep flag shared by the render task and the wake watcher.
pub static SLEEP: SleepState = SleepState::new();

/// Panel on/off requests, applied by the task that owns the panel.
pub static DISPLAY_POWER: Signal<CriticalSectionRawMutex, bool> = Signal::new();

type Bus = EventBus<CriticalSectionRawMutex>;
type Frames = SharedFrames<CriticalSectionRawMutex>;

/// `PowerHooks` for the board.
pub struct BoardPower {
    spawner: Spawner,
    bus: &'static Bus,
    frames: &'static Frames,
}

impl BoardPower {
    pub fn new(spawner: Spawner, bus: &'static Bus, frames: &'static Frames) -> Self {
        Self {
            spawner,
            bus,
            frames,
        }
    }
}

impl PowerHooks for BoardPower {
    fn pause_sensor(&mut self, paused: bool) -> bool {
        self.frames.pause(paused)
    }

    fn set_display(&mut self, on: bool) {
        DISPLAY_POWER.signal(on);
    }

    fn start_wake_watcher(&mut self) {
        if self
            .spawner
            .spawn(wake_watcher(self.spawner, self.bus, self.frames))
            .is_err()
        {
            warn!("Power: wake watcher already running");
        }
    }

    fn request_redraw(&mut self) {
        self.bus.set(EventBits::FRAME_0);
    }
}

/// Swallow the first input after light sleep and wake the device with it.
#[embassy_executor::task]
async fn wake_watcher(spawner: Spawner, bus: &'static Bus, frames: &'static Frames) {
    let bits = bus.wait(EventBits::INPUT).await;
    info!("Power: wake on input {=u32:#x}", bits.bits());
    SLEEP.exit(&mut BoardPower::new(spawner, bus, frames));
}

/// Power everything down and enter System OFF. The encoder switch resets
/// the chip; it never returns.
pub async fn deep_sleep(panel: &mut impl Panel, frames: &Frames) -> ! {
    info!("Power: entering System OFF");

    frames.pause(true);
    panel.set_brightness(0);
    if let Err(e) = panel.set_display_on(false).await {
        warn!("Power: panel did not sleep: {:?}", e);
    }

    pac::P0.pin_cnf(WAKE_PIN).write(|w| {
        w.set_dir(vals::Dir::INPUT);
        w.set_input(vals::Input::CONNECT);
        w.set_pull(vals::Pull::PULLUP);
        w.set_sense(vals::Sense::LOW);
    });

    pac::POWER.systemoff().write(|w| w.set_systemoff(true));

    // System OFF takes effect once pending writes complete.
    loop {
        cortex_m::asm::wfe();
    }
}
