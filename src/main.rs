//! thermocam firmware for nRF52840.
//!
//! Displays a false-color MLX90640 image on a 240×240 ST7789 panel.
//!
//! # Architecture
//!
//! Four tasks share two statics:
//! - `EVENT_BUS`: bitset of pending frame and input events
//! - `FRAMES`: double-buffered sensor frames
//!
//! The encoder and wheel tasks publish input bits, the sensor task
//! publishes frame bits, and the render task owns the UI state, the
//! framebuffer and the panel. Light sleep spawns a one-shot wake watcher
//! that swallows the first input (see `power`).
//!
//! # Controls
//!
//! - **Encoder turn**: move focus / change value
//! - **Encoder or wheel press**: enter, confirm, or open the menu
//! - **Wheel left/right**: back / confirm

#![no_std]
#![no_main]

use defmt::{error, info, warn};
use embassy_executor::Spawner;
use embassy_futures::select::{select3, Either3};
use embassy_nrf::gpio::{AnyPin, Level, Output, OutputDrive, Pin as _};
use embassy_nrf::peripherals::{QSPI, SPI3};
use embassy_nrf::pwm::SimplePwm;
use embassy_nrf::qspi::{self, Qspi};
use embassy_nrf::saadc::{self, Saadc};
use embassy_nrf::{bind_interrupts, spim};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Instant, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use thermocam::camera::Camera;
use thermocam::config::{QSPI_FLASH_CAPACITY, UI_TICK_MS};
use thermocam::event_bus::{EventBits, EventBus};
use thermocam::frame::Frame;
use thermocam::input::sampler;
use thermocam::panel::{Panel, St7789Panel};
use thermocam::power::{self, BoardPower, DISPLAY_POWER, SLEEP};
use thermocam::sensor::{self, FrameSource, SharedFrames};
use thermocam::storage::{FlashCaptures, FlashSettings, SharedFlash};
use thermocam::ui::display::Framebuffer;
use thermocam::ui::navigation::PowerRequest;

bind_interrupts!(struct Irqs {
    SPIM3 => spim::InterruptHandler<SPI3>;
    SAADC => saadc::InterruptHandler;
    QSPI => qspi::InterruptHandler<QSPI>;
});

type Flash = Qspi<'static, QSPI>;
type Cam = Camera<FlashSettings<Flash>, FlashCaptures<Flash>>;

// =============================================================================
// Shared state
// =============================================================================

static EVENT_BUS: EventBus<CriticalSectionRawMutex> = EventBus::new();
static FRAMES: SharedFrames<CriticalSectionRawMutex> = SharedFrames::new();

static FLASH: StaticCell<SharedFlash<Flash>> = StaticCell::new();
static CAMERA: StaticCell<Cam> = StaticCell::new();
static FRAMEBUFFER: StaticCell<Framebuffer> = StaticCell::new();
static PANEL: StaticCell<St7789Panel<'static>> = StaticCell::new();

// =============================================================================
// Tasks
// =============================================================================

#[embassy_executor::task]
async fn encoder_task(a: AnyPin, b: AnyPin, sw: AnyPin) {
    sampler::encoder_task(a, b, sw, &EVENT_BUS).await
}

#[embassy_executor::task]
async fn wheel_task(adc: Saadc<'static, 1>) {
    sampler::wheel_task(adc, &EVENT_BUS).await
}

#[embassy_executor::task]
async fn sensor_task() {
    sensor::run(&FRAMES, &EVENT_BUS).await
}

/// Owns the UI: applies input, takes frames, draws and pushes to the panel.
#[embassy_executor::task]
async fn render_task(
    spawner: Spawner,
    camera: &'static mut Cam,
    fb: &'static mut Framebuffer,
    panel: &'static mut St7789Panel<'static>,
) {
    match camera.restore().await {
        Ok(true) => info!("Settings: restored"),
        Ok(false) => info!("Settings: using defaults"),
        Err(e) => warn!("Settings: load failed ({}), using defaults", e),
    }
    FRAMES.set_rate(camera.settings.sensor_rate);
    panel.set_brightness(camera.settings.brightness);

    let mut hooks = BoardPower::new(spawner, &EVENT_BUS, &FRAMES);
    let mut frame = Frame::default();
    let mut redraw = true;

    loop {
        if redraw && !SLEEP.is_sleeping() {
            if camera.render(fb).is_ok() {
                if let Err(e) = panel.commit(fb).await {
                    warn!("Render: commit failed: {}", e);
                }
            }
            redraw = false;
        }

        // While asleep the wake watcher owns the input bits.
        let mask = if SLEEP.is_sleeping() {
            EventBits::FRAMES
        } else {
            EventBits::FRAMES | EventBits::INPUT
        };

        let woke = select3(
            EVENT_BUS.wait(mask),
            DISPLAY_POWER.wait(),
            Timer::after_millis(UI_TICK_MS),
        )
        .await;
        let now = Instant::now().as_millis();

        match woke {
            Either3::First(bits) => {
                let input = bits & EventBits::INPUT;
                if !input.is_empty() {
                    let out = camera.handle_input(input, now).await;
                    if let Some(Err(e)) = out.saved {
                        error!("Settings: save failed: {}", e);
                    }
                    if let Some(Err(e)) = out.captured {
                        error!("Capture: failed: {}", e);
                    }
                    if out.effects.apply_rate {
                        FRAMES.set_rate(camera.settings.sensor_rate);
                        info!("Sensor: rate {} Hz", camera.settings.sensor_rate.hz());
                    }
                    if out.effects.apply_brightness {
                        panel.set_brightness(camera.settings.brightness);
                    }
                    match out.effects.power {
                        Some(PowerRequest::LightSleep) => {
                            info!("Power: light sleep requested");
                            SLEEP.enter(&mut hooks);
                        }
                        Some(PowerRequest::DeepSleep) => {
                            power::deep_sleep(panel, &FRAMES).await
                        }
                        None => {}
                    }
                    redraw = true;
                }

                if let Some(slot) = FRAMES.slot_for(bits) {
                    match FRAMES.read(slot, &mut frame) {
                        Ok(()) => redraw |= camera.on_frame(&frame, now),
                        Err(e) => warn!("Sensor: slot {} unreadable: {}", slot, e),
                    }
                }
            }
            Either3::Second(on) => {
                if let Err(e) = panel.set_display_on(on).await {
                    warn!("Display: power change failed: {}", e);
                }
                if on {
                    panel.set_brightness(camera.settings.brightness);
                }
                redraw |= camera.on_display_power(on, now);
            }
            Either3::Third(()) => {
                if camera.should_sleep(SLEEP.is_sleeping(), now) {
                    info!("Power: idle for {} ms, sleeping", camera.idle_ms(now));
                    SLEEP.enter(&mut hooks);
                }
            }
        }

        redraw |= camera.expire_toast(now);
    }
}

// =============================================================================
// Entry point
// =============================================================================

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("thermocam starting...");
    let p = embassy_nrf::init(Default::default());

    // External flash for settings and captures
    let mut qcfg = qspi::Config::default();
    qcfg.capacity = QSPI_FLASH_CAPACITY;
    qcfg.frequency = qspi::Frequency::M16;
    qcfg.read_opcode = qspi::ReadOpcode::READ4IO;
    qcfg.write_opcode = qspi::WriteOpcode::PP4IO;
    qcfg.write_page_size = qspi::WritePageSize::_256BYTES;
    let qspi = Qspi::new(
        p.QSPI, Irqs, p.P0_19, p.P0_17, p.P0_20, p.P0_21, p.P0_22, p.P0_23, qcfg,
    );
    let flash: &'static SharedFlash<Flash> = FLASH.init(Mutex::new(qspi));

    let settings = FlashSettings::new(flash);
    let captures = FlashCaptures::open(flash).await;
    let camera = CAMERA.init_with(|| Camera::new(settings, captures));

    // Display: SPIM3 at 32 MHz, TX only
    let mut spi_cfg = spim::Config::default();
    spi_cfg.frequency = spim::Frequency::M32;
    let spi = spim::Spim::new_txonly(p.SPI3, Irqs, p.P0_13, p.P0_14, spi_cfg);
    let cs = Output::new(p.P0_15, Level::High, OutputDrive::Standard);
    let dc = Output::new(p.P0_16, Level::Low, OutputDrive::Standard);
    let rst = Output::new(p.P0_11, Level::High, OutputDrive::Standard);
    let backlight = SimplePwm::new_1ch(p.PWM0, p.P0_12);

    let panel = PANEL.init(St7789Panel::new(spi, dc, cs, rst, backlight));
    if let Err(e) = panel.init().await {
        error!("Display: init failed: {}", e);
    }
    let fb = FRAMEBUFFER.init_with(Framebuffer::new);

    // Wheel divider on AIN5
    let channel = saadc::ChannelConfig::single_ended(p.P0_29);
    let adc = Saadc::new(p.SAADC, Irqs, saadc::Config::default(), [channel]);

    spawner
        .spawn(encoder_task(
            p.P0_02.degrade(),
            p.P0_03.degrade(),
            p.P0_28.degrade(),
        ))
        .unwrap();
    spawner.spawn(wheel_task(adc)).unwrap();
    spawner.spawn(sensor_task()).unwrap();
    spawner
        .spawn(render_task(spawner, camera, fb, panel))
        .unwrap();

    info!("All tasks spawned");
}
