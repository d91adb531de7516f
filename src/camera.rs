//! The render-side owner of all camera state.
//!
//! `Camera` holds the settings, the UI state and the latest frame, and is
//! driven by the render task with three calls: `handle_input` for bus input
//! bits, `on_frame` for a new sensor frame, and `render` to draw the screen.
//! Hardware effects that are not storage or capture (sleep, rate,
//! brightness) come back to the caller in `Effects`.

use embedded_graphics::pixelcolor::{Rgb565, Rgb888};
use embedded_graphics::prelude::*;

use crate::capture::CaptureSink;
use crate::config::{
    AUTO_SLEEP_ENABLED, CAPTURE_BIT_DEPTH, FPS_WINDOW_MS, INACTIVITY_SLEEP_SECS,
    MAX_PALETTE_STEPS, SENSOR_PIXELS, TOAST_LONG_MS, TOAST_MS,
};
use crate::error::Error;
use crate::event_bus::EventBits;
use crate::frame::{Frame, FrameStats};
use crate::mapping::{palette_steps, select_scale, PaletteMapper};
use crate::palette;
use crate::power_logic::should_auto_sleep;
use crate::settings::{DisplaySettings, SettingsStore};
use crate::ui::display::{draw_live, draw_menu, draw_toast, draw_waiting, LiveView};
use crate::ui::navigation::{transition, Effects, UiState};
use crate::ui::toast::Toast;
use crate::upscale::{Bilinear, Nearest};

/// Rendered frames per second, recomputed once per window.
#[derive(Clone, Copy, Debug, Default)]
pub struct FpsMeter {
    window_start_ms: Option<u64>,
    frames: u32,
    fps: f32,
}

impl FpsMeter {
    pub const fn new() -> Self {
        Self {
            window_start_ms: None,
            frames: 0,
            fps: 0.0,
        }
    }

    /// Count one frame at `now_ms`. Returns the current reading.
    pub fn tick(&mut self, now_ms: u64) -> f32 {
        let Some(start) = self.window_start_ms else {
            self.window_start_ms = Some(now_ms);
            return self.fps;
        };

        self.frames += 1;
        let elapsed = now_ms.saturating_sub(start);
        if elapsed >= FPS_WINDOW_MS {
            self.fps = self.frames as f32 * 1000.0 / elapsed as f32;
            self.frames = 0;
            self.window_start_ms = Some(now_ms);
        }
        self.fps
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

/// What one input wakeup did.
#[derive(Debug, PartialEq)]
pub struct InputOutcome {
    pub effects: Effects,
    /// Result of the settings write, if one was due.
    pub saved: Option<Result<(), Error>>,
    /// Result of the screenshot, if one was requested.
    pub captured: Option<Result<u32, Error>>,
}

pub struct Camera<S, C> {
    pub settings: DisplaySettings,
    pub ui: UiState,
    store: S,
    capture: C,
    frame: Frame,
    stats: Option<FrameStats>,
    fixed: [i16; SENSOR_PIXELS],
    palette: [Rgb888; MAX_PALETTE_STEPS],
    fps: FpsMeter,
    last_input_ms: u64,
}

impl<S: SettingsStore, C: CaptureSink> Camera<S, C> {
    pub fn new(store: S, capture: C) -> Self {
        Self {
            settings: DisplaySettings::default(),
            ui: UiState::new(),
            store,
            capture,
            frame: Frame::default(),
            stats: None,
            fixed: [0; SENSOR_PIXELS],
            palette: [Rgb888::BLACK; MAX_PALETTE_STEPS],
            fps: FpsMeter::new(),
            last_input_ms: 0,
        }
    }

    /// Replace the defaults with the stored settings.
    ///
    /// `Ok(false)` when nothing is stored. On error the defaults stay.
    pub async fn restore(&mut self) -> Result<bool, Error> {
        match self.store.load().await? {
            Some(stored) => {
                self.settings = stored;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn capture_sink(&self) -> &C {
        &self.capture
    }

    /// Statistics of the last valid frame.
    pub fn stats(&self) -> Option<&FrameStats> {
        self.stats.as_ref()
    }

    pub fn fps(&self) -> f32 {
        self.fps.fps()
    }

    /// Restart the inactivity timer, e.g. after a wake from sleep whose
    /// input was consumed by the wake watcher.
    pub fn note_activity(&mut self, now_ms: u64) {
        self.last_input_ms = now_ms;
    }

    /// Track a display power change. Returns true when the screen came
    /// back on and needs a full repaint.
    pub fn on_display_power(&mut self, on: bool, now_ms: u64) -> bool {
        if on {
            self.note_activity(now_ms);
        }
        on
    }

    pub fn idle_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_input_ms)
    }

    /// Inactivity check for automatic light sleep.
    pub fn should_sleep(&self, sleeping: bool, now_ms: u64) -> bool {
        should_auto_sleep(
            AUTO_SLEEP_ENABLED,
            sleeping,
            self.idle_ms(now_ms),
            INACTIVITY_SLEEP_SECS,
        )
    }

    /// Run the input bits of one wakeup through navigation, then save and
    /// capture as requested.
    pub async fn handle_input(&mut self, bits: EventBits, now_ms: u64) -> InputOutcome {
        self.last_input_ms = now_ms;
        let effects = transition(
            &mut self.ui,
            &mut self.settings,
            bits,
            self.stats.as_ref(),
            now_ms,
        );

        let saved = if effects.persist {
            Some(self.persist().await)
        } else {
            None
        };
        let captured = if effects.capture {
            Some(self.screenshot(now_ms).await)
        } else {
            None
        };

        InputOutcome {
            effects,
            saved,
            captured,
        }
    }

    /// Write the settings, without any active scale lock.
    pub async fn persist(&mut self) -> Result<(), Error> {
        let stored = self.ui.persisted_view(&self.settings);
        self.store.save(&stored).await
    }

    async fn screenshot(&mut self, now_ms: u64) -> Result<u32, Error> {
        let Some(stats) = self.stats else {
            self.ui.show(Some(Toast::new("Capture failed", "no frame", now_ms, TOAST_MS)));
            return Err(Error::SensorUnavailable);
        };

        let res = self
            .capture
            .save_screenshot(&self.frame, &stats, CAPTURE_BIT_DEPTH)
            .await;
        let toast = match res {
            Ok(n) => Toast::with_value(
                "Saved",
                format_args!("capture #{}", n),
                now_ms,
                TOAST_LONG_MS,
            ),
            Err(_) => Toast::new("Capture failed", "storage error", now_ms, TOAST_MS),
        };
        self.ui.show(Some(toast));
        res
    }

    /// Take a new sensor frame. Returns false, and keeps the previous frame,
    /// when it holds no finite sample.
    pub fn on_frame(&mut self, frame: &Frame, now_ms: u64) -> bool {
        let Some(stats) = FrameStats::from_frame(frame) else {
            return false;
        };
        self.frame.clone_from(frame);
        self.stats = Some(stats);

        let out = self.ui.lock.tick(&mut self.settings, &stats, now_ms);
        self.ui.show(out.toast(now_ms));
        self.fps.tick(now_ms);
        true
    }

    pub fn expire_toast(&mut self, now_ms: u64) -> bool {
        self.ui.expire_toast(now_ms)
    }

    /// Draw the menu, the live view, or a placeholder, then any toast.
    pub fn render<D>(&mut self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        if let Some(menu) = &self.ui.menu {
            draw_menu(target, menu, &self.settings)?;
        } else if let Some(stats) = self.stats {
            let range = select_scale(&self.settings, &stats);
            let n = palette::generate(
                self.settings.palette,
                palette_steps(&range),
                &mut self.palette,
            );
            let mapper = PaletteMapper::new(&range, self.settings.palette_center_percent, n);
            self.frame.to_fixed(&mut self.fixed);

            let view = LiveView {
                settings: &self.settings,
                nav: &self.ui.nav,
                frame: &self.frame,
                fixed: &self.fixed,
                stats: &stats,
                mapper: &mapper,
                palette: &self.palette[..n],
                locked: self.ui.lock.is_active(),
                fps: self.fps.fps(),
            };
            if self.settings.sensor_rate.prefers_fast_upscale() {
                draw_live(target, &Nearest, &view)?;
            } else {
                draw_live(target, &Bilinear, &view)?;
            }
        } else {
            draw_waiting(target)?;
        }

        if let Some(toast) = &self.ui.toast {
            draw_toast(target, toast)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::boxed::Box;

    use embassy_futures::block_on;

    use super::*;
    use crate::capture::MemoryCapture;
    use crate::config::{IMAGE_X, IMAGE_Y, SCALE_LOCK_MS};
    use crate::settings::MemoryStore;
    use crate::ui::display::Framebuffer;
    use crate::ui::Section;

    fn camera() -> Box<Camera<MemoryStore, MemoryCapture>> {
        Box::new(Camera::new(MemoryStore::new(), MemoryCapture::default()))
    }

    fn scene(min: f32, max: f32) -> Frame {
        let mut f = Frame::filled((min + max) / 2.0);
        f.set(0, 0, min);
        f.set(31, 23, max);
        f
    }

    #[test]
    fn fps_meter_counts_per_window() {
        let mut m = FpsMeter::new();
        for i in 0..=10 {
            m.tick(i * 100);
        }
        assert_eq!(m.fps(), 10.0);
        m.tick(1_500);
        assert_eq!(m.fps(), 10.0);
        m.tick(3_000);
        assert_eq!(m.fps(), 1.0);
    }

    #[test]
    fn restore_keeps_defaults_without_record() {
        let mut cam = camera();
        assert_eq!(block_on(cam.restore()), Ok(false));
        assert_eq!(cam.settings, DisplaySettings::default());
    }

    #[test]
    fn restore_failure_keeps_defaults() {
        let mut cam = Box::new(Camera::new(
            MemoryStore {
                fail: true,
                ..MemoryStore::new()
            },
            MemoryCapture::default(),
        ));
        assert_eq!(block_on(cam.restore()), Err(Error::Storage));
        assert_eq!(cam.settings, DisplaySettings::default());
    }

    #[test]
    fn invalid_frame_is_skipped() {
        let mut cam = camera();
        assert!(!cam.on_frame(&Frame::filled(f32::NAN), 0));
        assert!(cam.stats().is_none());
        assert!(cam.on_frame(&scene(20.0, 30.0), 10));
        assert!(!cam.on_frame(&Frame::filled(f32::NAN), 20));
        assert_eq!(cam.stats().map(|s| s.max), Some(30.0));
    }

    #[test]
    fn press_on_image_saves_capture() {
        let mut cam = camera();
        let out = block_on(cam.handle_input(EventBits::WHEEL_PRESS, 5));
        assert_eq!(out.captured, Some(Err(Error::SensorUnavailable)));
        assert!(cam.ui.toast.is_some());

        cam.on_frame(&scene(20.0, 30.0), 10);
        let out = block_on(cam.handle_input(EventBits::ENCODER_PRESS, 20));
        assert_eq!(out.captured, Some(Ok(1)));
        assert_eq!(cam.capture_sink().count, 1);
    }

    #[test]
    fn capture_failure_only_toasts() {
        let mut cam = Box::new(Camera::new(
            MemoryStore::new(),
            MemoryCapture {
                fail: true,
                ..MemoryCapture::default()
            },
        ));
        cam.on_frame(&scene(20.0, 30.0), 0);
        let before = cam.ui.nav;
        let out = block_on(cam.handle_input(EventBits::WHEEL_PRESS, 1));
        assert_eq!(out.captured, Some(Err(Error::Capture)));
        assert_eq!(cam.ui.nav, before);
        assert_eq!(cam.ui.toast.as_ref().map(|t| t.line1.as_str()), Some("Capture failed"));
    }

    #[test]
    fn lock_is_never_persisted() {
        let mut cam = camera();
        cam.on_frame(&scene(20.0, 35.0), 0);
        cam.ui.nav.focus = Section::Lock;
        block_on(cam.handle_input(EventBits::CONFIRM, 1));
        assert!(!cam.settings.auto_scale);

        block_on(cam.persist()).unwrap();
        let stored = block_on(cam.store.load()).unwrap().unwrap();
        assert!(stored.auto_scale);
    }

    #[test]
    fn lock_expires_on_frames() {
        let mut cam = camera();
        cam.on_frame(&scene(20.0, 35.0), 0);
        cam.ui.nav.focus = Section::Lock;
        block_on(cam.handle_input(EventBits::CONFIRM, 0));
        cam.on_frame(&scene(18.0, 40.0), SCALE_LOCK_MS);
        assert!(!cam.ui.lock.is_active());
        assert!(cam.settings.auto_scale);
    }

    #[test]
    fn idle_time_tracks_input() {
        let mut cam = camera();
        let timeout = INACTIVITY_SLEEP_SECS * 1000;
        assert!(cam.should_sleep(false, timeout));
        block_on(cam.handle_input(EventBits::DOWN, timeout));
        assert!(!cam.should_sleep(false, timeout + 1));
        assert!(cam.should_sleep(false, 2 * timeout));
        assert!(!cam.should_sleep(true, 2 * timeout));

        cam.note_activity(2 * timeout);
        assert_eq!(cam.idle_ms(2 * timeout + 5), 5);
    }

    #[test]
    fn display_on_requests_repaint_and_restarts_idle_timer() {
        let mut cam = camera();
        let timeout = INACTIVITY_SLEEP_SECS * 1000;

        assert!(!cam.on_display_power(false, timeout));
        assert!(cam.should_sleep(false, timeout));

        assert!(cam.on_display_power(true, 2 * timeout));
        assert_eq!(cam.idle_ms(2 * timeout), 0);
        assert!(!cam.should_sleep(false, 2 * timeout + 1));
    }

    #[test]
    fn render_draws_live_view_and_menu() {
        let mut cam = camera();
        let mut fb = Box::new(Framebuffer::new());

        cam.render(fb.as_mut()).unwrap();
        cam.on_frame(&scene(20.0, 30.0), 0);
        cam.render(fb.as_mut()).unwrap();
        let px = fb.pixel(IMAGE_X + 50, IMAGE_Y + 50).unwrap();
        assert_ne!(px, Rgb565::BLACK);

        block_on(cam.handle_input(EventBits::BACK, 1));
        assert!(cam.ui.menu.is_some());
        cam.render(fb.as_mut()).unwrap();
        assert_eq!(fb.pixel(230, 120), Some(Rgb565::BLACK));
    }
}
