//! Integration tests for thermocam host-testable logic.

use embassy_futures::block_on;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use thermocam::camera::Camera;
use thermocam::capture::MemoryCapture;
use thermocam::config::{SCALE_LOCK_MS, WHEEL_IDLE_MV, WHEEL_LEFT_MV, WHEEL_SAMPLE_PERIOD_MS};
use thermocam::event_bus::{EventBits, EventBus};
use thermocam::frame::Frame;
use thermocam::input::quadrature::QuadratureDecoder;
use thermocam::input::wheel::WheelClassifier;
use thermocam::input::{EncoderEvent, WheelEvent};
use thermocam::settings::{DisplaySettings, MemoryStore, SettingsStore};
use thermocam::ui::navigation::{Modal, PowerRequest};
use thermocam::ui::{Section, SubItem};

type Bus = EventBus<CriticalSectionRawMutex>;

fn scene(base: f32, hot: f32) -> Frame {
    let mut f = Frame::filled(base);
    f.set(10, 10, hot);
    f
}

#[test]
fn four_quadrature_steps_make_one_right_turn() {
    let bus = Bus::new();
    let mut dec = QuadratureDecoder::new(false, false);

    for (a, b) in [(true, false), (true, true), (false, true), (false, false)] {
        if let Some(ev) = dec.sample(a, b) {
            bus.set(ev.bus_bits());
        }
    }

    assert_eq!(bus.try_take(EventBits::INPUT), Some(EventBits::DOWN));
    assert_eq!(EncoderEvent::Right.bus_bits(), EventBits::DOWN);
}

#[test]
fn held_wheel_emits_once_until_released() {
    let mut wheel = WheelClassifier::default();
    let mut events = Vec::new();
    let mut now = 0;

    // Held left for 500 ms.
    while now < 500 {
        events.extend(wheel.sample(Some(WHEEL_LEFT_MV), now));
        now += WHEEL_SAMPLE_PERIOD_MS;
    }
    assert_eq!(events, [WheelEvent::Left]);

    // Released, then pushed left again.
    events.extend(wheel.sample(Some(WHEEL_IDLE_MV), now));
    now += WHEEL_SAMPLE_PERIOD_MS;
    events.extend(wheel.sample(Some(WHEEL_LEFT_MV), now));
    assert_eq!(events, [WheelEvent::Left, WheelEvent::Left]);
}

#[test]
fn bus_coalesces_inputs_between_wakeups() {
    let bus = Bus::new();
    bus.set(EventBits::UP);
    bus.set(EventBits::CONFIRM);
    bus.set(EventBits::FRAME_1);

    let input = bus.try_take(EventBits::INPUT);
    assert_eq!(input, Some(EventBits::UP | EventBits::CONFIRM));
    assert_eq!(bus.pending(), EventBits::FRAME_1);
    assert_eq!(bus.try_take(EventBits::INPUT), None);
}

#[test]
fn scale_lock_is_retained_while_scene_fits_then_restored() {
    let mut cam = Camera::new(MemoryStore::new(), MemoryCapture::default());
    cam.on_frame(&scene(20.0, 30.0), 0);

    // Image -> Lock, then lock.
    block_on(cam.handle_input(EventBits::DOWN, 10));
    assert_eq!(cam.ui.nav.focus, Section::Lock);
    block_on(cam.handle_input(EventBits::CONFIRM, 20));
    assert!(cam.ui.lock.is_active());
    assert!(!cam.settings.auto_scale);

    // Expired, scene still inside the locked range.
    cam.on_frame(&scene(22.0, 29.0), 20 + SCALE_LOCK_MS);
    assert!(cam.ui.lock.is_active());

    // Scene leaves the range after the extension.
    cam.on_frame(&scene(22.0, 45.0), 20 + 2 * SCALE_LOCK_MS);
    assert!(!cam.ui.lock.is_active());
    assert!(cam.settings.auto_scale);
}

#[test]
fn data_sub_items_wrap_after_three_steps() {
    let mut cam = Camera::new(MemoryStore::new(), MemoryCapture::default());

    block_on(cam.handle_input(EventBits::DOWN, 0));
    block_on(cam.handle_input(EventBits::DOWN, 0));
    assert_eq!(cam.ui.nav.focus, Section::Data);

    block_on(cam.handle_input(EventBits::CONFIRM, 0));
    assert!(cam.ui.nav.sub_item_mode);
    assert_eq!(cam.ui.nav.data_sub, SubItem::Left);

    for _ in 0..3 {
        block_on(cam.handle_input(EventBits::DOWN, 0));
    }
    assert_eq!(cam.ui.nav.data_sub, SubItem::Left);
}

/// Focus the title bar and open the palette selector.
fn open_palette_select<S: SettingsStore>(cam: &mut Camera<S, MemoryCapture>) {
    block_on(cam.handle_input(EventBits::UP, 0));
    assert_eq!(cam.ui.nav.focus, Section::Title);
    block_on(cam.handle_input(EventBits::CONFIRM, 0));
    block_on(cam.handle_input(EventBits::CONFIRM, 0));
    assert!(matches!(cam.ui.nav.modal, Some(Modal::PaletteSelect { .. })));
}

#[test]
fn committed_palette_survives_a_restart() {
    let mut store = MemoryStore::new();
    let chosen = DisplaySettings::default().palette.next();

    {
        let mut cam = Camera::new(&mut store, MemoryCapture::default());
        open_palette_select(&mut cam);
        block_on(cam.handle_input(EventBits::DOWN, 0));
        let out = block_on(cam.handle_input(EventBits::CONFIRM, 0));
        assert!(out.effects.persist);
        assert_eq!(out.saved, Some(Ok(())));
        assert_eq!(cam.ui.nav.modal, None);
        assert!(cam.ui.nav.sub_item_mode);
    }
    assert_eq!(store.writes, 1);

    let mut cam = Camera::new(&mut store, MemoryCapture::default());
    assert_eq!(block_on(cam.restore()), Ok(true));
    assert_eq!(cam.settings.palette, chosen);
}

#[test]
fn cancelled_palette_leaves_store_untouched() {
    let mut cam = Camera::new(MemoryStore::new(), MemoryCapture::default());
    let original = cam.settings.palette;

    open_palette_select(&mut cam);
    block_on(cam.handle_input(EventBits::DOWN, 0));
    assert_ne!(cam.settings.palette, original);

    let out = block_on(cam.handle_input(EventBits::BACK, 0));
    assert!(!out.effects.persist);
    assert_eq!(cam.settings.palette, original);
    assert_eq!(cam.store().writes, 0);
}

#[test]
fn menu_sleep_requests_light_sleep() {
    let mut cam = Camera::new(MemoryStore::new(), MemoryCapture::default());

    // Back from focus mode opens the menu. Sleep is the second-to-last
    // row, two steps up through the wrap.
    block_on(cam.handle_input(EventBits::BACK, 0));
    assert!(cam.ui.menu.is_some());
    block_on(cam.handle_input(EventBits::UP, 0));
    block_on(cam.handle_input(EventBits::UP, 0));

    let out = block_on(cam.handle_input(EventBits::CONFIRM, 0));
    assert_eq!(out.effects.power, Some(PowerRequest::LightSleep));
    assert!(cam.ui.menu.is_none());
}

#[test]
fn screenshot_from_live_view_is_numbered() {
    let mut cam = Camera::new(MemoryStore::new(), MemoryCapture::default());
    cam.on_frame(&scene(20.0, 30.0), 0);

    let out = block_on(cam.handle_input(EventBits::WHEEL_PRESS, 5));
    assert_eq!(out.captured, Some(Ok(1)));
    assert_eq!(cam.capture_sink().count, 1);
    assert_eq!(
        cam.ui.toast.as_ref().map(|t| t.line1.as_str()),
        Some("Saved")
    );
}
