//! Pin and ADC sampling loops.
//!
//! Each control is polled at a fixed period and fed through its decoder;
//! decoded events are published as bus bits for the render task.
//!
//! Encoder (active-low with internal pull-ups):
//!   - A/B    - quadrature, sampled every `ENCODER_SAMPLE_PERIOD_MS`
//!   - switch - shaft push, debounced in `ButtonState`
//!
//! Wheel: one SAADC channel on the divider, sampled every
//! `WHEEL_SAMPLE_PERIOD_MS`.

use defmt::{debug, info};
use embassy_nrf::gpio::{AnyPin, Input, Pull};
use embassy_nrf::saadc::Saadc;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Duration, Instant, Ticker};

use super::quadrature::QuadratureDecoder;
use super::wheel::{saadc_to_mv, WheelClassifier};
use crate::config::{ENCODER_SAMPLE_PERIOD_MS, WHEEL_SAMPLE_PERIOD_MS};
use crate::event_bus::EventBus;

/// Run the encoder polling loop.
pub async fn encoder_task(
    pin_a: AnyPin,
    pin_b: AnyPin,
    pin_sw: AnyPin,
    bus: &'static EventBus<CriticalSectionRawMutex>,
) -> ! {
    let a = Input::new(pin_a, Pull::Up);
    let b = Input::new(pin_b, Pull::Up);
    let sw = Input::new(pin_sw, Pull::Up);

    let mut decoder = QuadratureDecoder::new(a.is_high(), b.is_high());
    let mut ticker = Ticker::every(Duration::from_millis(ENCODER_SAMPLE_PERIOD_MS));
    info!("Encoder: sampling every {} ms", ENCODER_SAMPLE_PERIOD_MS);

    loop {
        ticker.next().await;
        let now = Instant::now().as_millis();

        if let Some(ev) = decoder.sample(a.is_high(), b.is_high()) {
            debug!("Encoder: {}", ev);
            bus.set(ev.bus_bits());
        }
        if let Some(ev) = decoder.sample_switch(sw.is_low(), now) {
            debug!("Encoder: {}", ev);
            bus.set(ev.bus_bits());
        }
    }
}

/// Run the wheel polling loop on a one-channel SAADC.
pub async fn wheel_task(
    mut adc: Saadc<'static, 1>,
    bus: &'static EventBus<CriticalSectionRawMutex>,
) -> ! {
    adc.calibrate().await;

    let mut wheel = WheelClassifier::default();
    let mut ticker = Ticker::every(Duration::from_millis(WHEEL_SAMPLE_PERIOD_MS));
    info!("Wheel: calibration {}", wheel.calibration());

    loop {
        ticker.next().await;

        let mut raw = [0i16; 1];
        adc.sample(&mut raw).await;

        if let Some(ev) = wheel.sample(saadc_to_mv(raw[0]), Instant::now().as_millis()) {
            debug!("Wheel: {} ({} raw)", ev, raw[0]);
            bus.set(ev.bus_bits());
        }
    }
}
