//! Live-view navigation state machine.
//!
//! Three layers, innermost wins:
//!
//! 1. **Modal** - palette select, unit select, plot channel select or
//!    crosshair move. At most one at a time (`Option<Modal>`).
//! 2. **Sub-item mode** - cycling the three entries of the title or data bar.
//! 3. **Focus mode** - cycling the four live-view sections.
//!
//! The settings menu sits above all of them while open.
//!
//! `transition` is the only entry point. It mutates `UiState` and the
//! in-memory settings and reports hardware work through `Effects`.

use crate::config::{SENSOR_HEIGHT, SENSOR_WIDTH, TOAST_LONG_MS, TOAST_MS, TOAST_SHORT_MS};
use crate::event_bus::EventBits;
use crate::frame::{FrameStats, TempUnit};
use crate::settings::{DisplaySettings, Palette};
use crate::ui::input_logic::{ring_next, ring_prev, step_clamped};
use crate::ui::menu::{Menu, MenuOutcome};
use crate::ui::scale_lock::ScaleLock;
use crate::ui::toast::Toast;
use crate::ui::{nav_events, NavEvent, Section, SubItem};

/// Modal overlays on the live view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Modal {
    /// Palette preview; `original` is put back on cancel.
    PaletteSelect { original: Palette },
    TempUnitSelect,
    ChannelSelect,
    CrosshairMove,
}

/// Power transition requested from the UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerRequest {
    LightSleep,
    DeepSleep,
}

/// Work the caller has to carry out after a transition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Effects {
    /// Write the settings to the store.
    pub persist: bool,
    /// Save a screenshot.
    pub capture: bool,
    /// Sensor refresh rate changed.
    pub apply_rate: bool,
    /// Backlight level changed.
    pub apply_brightness: bool,
    pub power: Option<PowerRequest>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NavigationState {
    pub focus: Section,
    pub sub_item_mode: bool,
    pub title_sub: SubItem,
    pub data_sub: SubItem,
    pub modal: Option<Modal>,
    /// Crosshair moves along rows when set, along columns otherwise.
    pub crosshair_axis_is_row: bool,
    pub unit: TempUnit,
    /// Strip plot shows the crosshair row when set, its column otherwise.
    pub plot_channel_is_row: bool,
}

impl NavigationState {
    pub const fn new() -> Self {
        Self {
            focus: Section::Image,
            sub_item_mode: false,
            title_sub: SubItem::Left,
            data_sub: SubItem::Left,
            modal: None,
            crosshair_axis_is_row: false,
            unit: TempUnit::Celsius,
            plot_channel_is_row: true,
        }
    }

    /// Sub-selection of the focused bar, if the focus is on one.
    pub fn active_sub(&self) -> Option<SubItem> {
        match self.focus {
            Section::Title => Some(self.title_sub),
            Section::Data => Some(self.data_sub),
            Section::Image | Section::Lock => None,
        }
    }

    fn move_focus(&mut self, forward: bool) {
        let n = Section::RING.len();
        let pos = self.focus.position();
        let next = if forward { ring_next(pos, n) } else { ring_prev(pos, n) };

        match self.focus {
            Section::Title => self.title_sub = SubItem::Left,
            Section::Data => self.data_sub = SubItem::Left,
            Section::Image | Section::Lock => {}
        }
        self.focus = Section::RING[next];
    }

    fn move_sub(&mut self, forward: bool) {
        let sub = match self.focus {
            Section::Title => &mut self.title_sub,
            Section::Data => &mut self.data_sub,
            Section::Image | Section::Lock => return,
        };
        *sub = if forward { sub.next() } else { sub.prev() };
    }

    fn open_modal(&mut self, modal: Modal) {
        self.modal = Some(modal);
        self.sub_item_mode = false;
    }

    /// Leave the modal back into the sub-item ring it was opened from.
    fn close_to_sub_items(&mut self) {
        self.modal = None;
        self.sub_item_mode = true;
    }
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the render task keeps about the UI between wakeups.
#[derive(Debug, Default)]
pub struct UiState {
    pub nav: NavigationState,
    pub lock: ScaleLock,
    pub toast: Option<Toast>,
    pub menu: Option<Menu>,
}

impl UiState {
    pub const fn new() -> Self {
        Self {
            nav: NavigationState::new(),
            lock: ScaleLock::new(),
            toast: None,
            menu: None,
        }
    }

    pub fn show(&mut self, toast: Option<Toast>) {
        if toast.is_some() {
            self.toast = toast;
        }
    }

    /// Drop the toast once its time is up. Returns true if one was removed.
    pub fn expire_toast(&mut self, now_ms: u64) -> bool {
        match &self.toast {
            Some(t) if t.is_expired(now_ms) => {
                self.toast = None;
                true
            }
            _ => false,
        }
    }

    /// Settings as they may be written to flash.
    pub fn persisted_view(&self, settings: &DisplaySettings) -> DisplaySettings {
        self.lock.persisted_view(settings)
    }
}

/// Apply one bus wakeup's worth of input.
pub fn transition(
    ui: &mut UiState,
    settings: &mut DisplaySettings,
    bits: EventBits,
    live: Option<&FrameStats>,
    now_ms: u64,
) -> Effects {
    let mut fx = Effects::default();
    for ev in nav_events(bits) {
        step(ui, settings, ev, live, now_ms, &mut fx);
    }
    fx
}

fn step(
    ui: &mut UiState,
    settings: &mut DisplaySettings,
    ev: NavEvent,
    live: Option<&FrameStats>,
    now_ms: u64,
    fx: &mut Effects,
) {
    if let Some(menu) = ui.menu.as_mut() {
        if menu.handle(ev, settings, now_ms, fx, &mut ui.toast) == MenuOutcome::Close {
            ui.menu = None;
            ui.nav.sub_item_mode = false;
        }
        return;
    }

    if let Some(modal) = ui.nav.modal {
        modal_step(ui, settings, modal, ev, now_ms, fx);
    } else if ev == NavEvent::UpDown {
        ui.nav.unit = ui.nav.unit.toggled();
        ui.show(Some(unit_toast(ui.nav.unit, now_ms)));
    } else if ui.nav.sub_item_mode {
        sub_item_step(ui, settings, ev, live, now_ms);
    } else {
        focus_step(ui, settings, ev, live, now_ms, fx);
    }
}

fn focus_step(
    ui: &mut UiState,
    settings: &mut DisplaySettings,
    ev: NavEvent,
    live: Option<&FrameStats>,
    now_ms: u64,
    fx: &mut Effects,
) {
    match ev {
        NavEvent::Up => ui.nav.move_focus(false),
        NavEvent::Down => ui.nav.move_focus(true),
        NavEvent::Confirm => match ui.nav.focus {
            Section::Image => {
                ui.nav.open_modal(Modal::CrosshairMove);
                ui.show(Some(crosshair_toast(&ui.nav, now_ms)));
            }
            Section::Lock => {
                let out = ui.lock.activate(settings, live, now_ms);
                ui.show(out.toast(now_ms));
            }
            Section::Title | Section::Data => ui.nav.sub_item_mode = true,
        },
        NavEvent::Back => {
            // The menu edits the scale directly; a lock would fight it.
            ui.lock.release(settings);
            ui.menu = Some(Menu::new());
        }
        NavEvent::Press => {
            if ui.nav.focus == Section::Image {
                fx.capture = true;
            }
        }
        NavEvent::UpDown => {}
    }
}

fn sub_item_step(
    ui: &mut UiState,
    settings: &mut DisplaySettings,
    ev: NavEvent,
    live: Option<&FrameStats>,
    now_ms: u64,
) {
    match ev {
        NavEvent::Up => ui.nav.move_sub(false),
        NavEvent::Down => ui.nav.move_sub(true),
        NavEvent::Back => ui.nav.sub_item_mode = false,
        NavEvent::Confirm => match (ui.nav.focus, ui.nav.active_sub()) {
            (Section::Title, Some(SubItem::Left)) => {
                ui.nav.open_modal(Modal::PaletteSelect {
                    original: settings.palette,
                });
                ui.show(Some(palette_toast(settings.palette, now_ms)));
            }
            (Section::Title, Some(SubItem::Center)) => {
                let out = ui.lock.activate(settings, live, now_ms);
                ui.show(out.toast(now_ms));
            }
            (Section::Title, Some(SubItem::Right)) => {
                ui.nav.open_modal(Modal::TempUnitSelect);
                ui.show(Some(unit_toast(ui.nav.unit, now_ms)));
            }
            (Section::Data, Some(SubItem::Right)) => {
                ui.nav.open_modal(Modal::ChannelSelect);
                ui.show(Some(channel_toast(ui.nav.plot_channel_is_row, now_ms)));
            }
            // Data-Left and Data-Center have no action.
            _ => {}
        },
        NavEvent::Press | NavEvent::UpDown => {}
    }
}

fn modal_step(
    ui: &mut UiState,
    settings: &mut DisplaySettings,
    modal: Modal,
    ev: NavEvent,
    now_ms: u64,
    fx: &mut Effects,
) {
    let nav = &mut ui.nav;
    let toast = match (modal, ev) {
        (Modal::PaletteSelect { .. }, NavEvent::Up) => {
            settings.palette = settings.palette.prev();
            Some(palette_toast(settings.palette, now_ms))
        }
        (Modal::PaletteSelect { .. }, NavEvent::Down) => {
            settings.palette = settings.palette.next();
            Some(palette_toast(settings.palette, now_ms))
        }
        (Modal::PaletteSelect { .. }, NavEvent::Confirm) => {
            nav.close_to_sub_items();
            fx.persist = true;
            Some(Toast::new("Palette saved", settings.palette.name(), now_ms, TOAST_MS))
        }
        (Modal::PaletteSelect { original }, NavEvent::Back) => {
            settings.palette = original;
            nav.close_to_sub_items();
            Some(Toast::new("Palette", "unchanged", now_ms, TOAST_SHORT_MS))
        }

        (Modal::TempUnitSelect, NavEvent::Up | NavEvent::Down) => {
            nav.unit = nav.unit.toggled();
            Some(unit_toast(nav.unit, now_ms))
        }
        (Modal::TempUnitSelect, NavEvent::Confirm | NavEvent::Back) => {
            nav.close_to_sub_items();
            Some(unit_toast(nav.unit, now_ms))
        }

        (Modal::ChannelSelect, NavEvent::Up | NavEvent::Down) => {
            nav.plot_channel_is_row = !nav.plot_channel_is_row;
            Some(channel_toast(nav.plot_channel_is_row, now_ms))
        }
        (Modal::ChannelSelect, NavEvent::Confirm | NavEvent::Back) => {
            nav.close_to_sub_items();
            Some(channel_toast(nav.plot_channel_is_row, now_ms))
        }

        (Modal::CrosshairMove, NavEvent::Confirm) => {
            nav.crosshair_axis_is_row = !nav.crosshair_axis_is_row;
            Some(crosshair_toast(nav, now_ms))
        }
        (Modal::CrosshairMove, NavEvent::Up | NavEvent::Down) => {
            let forward = ev == NavEvent::Down;
            if nav.crosshair_axis_is_row {
                settings.crosshair_row = step_clamped(settings.crosshair_row, forward, SENSOR_HEIGHT);
            } else {
                settings.crosshair_col = step_clamped(settings.crosshair_col, forward, SENSOR_WIDTH);
            }
            None
        }
        (Modal::CrosshairMove, NavEvent::Back) => {
            nav.modal = None;
            nav.sub_item_mode = false;
            fx.persist = true;
            Some(Toast::with_value(
                "Crosshair saved",
                format_args!("col {} row {}", settings.crosshair_col, settings.crosshair_row),
                now_ms,
                TOAST_MS,
            ))
        }

        (_, NavEvent::Press | NavEvent::UpDown) => None,
    };
    ui.show(toast);
}

fn palette_toast(palette: Palette, now_ms: u64) -> Toast {
    Toast::new("Palette", palette.name(), now_ms, TOAST_SHORT_MS)
}

fn unit_toast(unit: TempUnit, now_ms: u64) -> Toast {
    let name = match unit {
        TempUnit::Celsius => "Celsius",
        TempUnit::Fahrenheit => "Fahrenheit",
    };
    Toast::new("Unit", name, now_ms, TOAST_SHORT_MS)
}

fn channel_toast(is_row: bool, now_ms: u64) -> Toast {
    let axis = if is_row { "row" } else { "column" };
    Toast::new("Plot channel", axis, now_ms, TOAST_SHORT_MS)
}

fn crosshair_toast(nav: &NavigationState, now_ms: u64) -> Toast {
    let axis = if nav.crosshair_axis_is_row { "move: row" } else { "move: column" };
    Toast::new("Crosshair", axis, now_ms, TOAST_LONG_MS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::GridPos;

    fn stats(min: f32, max: f32) -> FrameStats {
        FrameStats {
            min,
            max,
            min_at: GridPos::default(),
            max_at: GridPos::default(),
            center: (min + max) / 2.0,
        }
    }

    fn run(ui: &mut UiState, s: &mut DisplaySettings, bits: EventBits) -> Effects {
        transition(ui, s, bits, Some(&stats(20.0, 30.0)), 0)
    }

    #[test]
    fn focus_ring_wraps_both_ways() {
        let mut ui = UiState::new();
        let mut s = DisplaySettings::default();
        assert_eq!(ui.nav.focus, Section::Image);
        run(&mut ui, &mut s, EventBits::DOWN);
        assert_eq!(ui.nav.focus, Section::Lock);
        run(&mut ui, &mut s, EventBits::DOWN);
        assert_eq!(ui.nav.focus, Section::Data);
        run(&mut ui, &mut s, EventBits::DOWN);
        assert_eq!(ui.nav.focus, Section::Title);
        run(&mut ui, &mut s, EventBits::UP);
        assert_eq!(ui.nav.focus, Section::Data);
    }

    #[test]
    fn leaving_a_bar_resets_its_sub_selection() {
        let mut ui = UiState::new();
        let mut s = DisplaySettings::default();
        ui.nav.focus = Section::Data;
        run(&mut ui, &mut s, EventBits::CONFIRM);
        run(&mut ui, &mut s, EventBits::DOWN);
        assert_eq!(ui.nav.data_sub, SubItem::Center);
        run(&mut ui, &mut s, EventBits::BACK);
        assert!(!ui.nav.sub_item_mode);
        run(&mut ui, &mut s, EventBits::DOWN);
        assert_eq!(ui.nav.focus, Section::Title);
        assert_eq!(ui.nav.data_sub, SubItem::Left);
    }

    #[test]
    fn palette_preview_cancel_restores() {
        let mut ui = UiState::new();
        let mut s = DisplaySettings::default();
        ui.nav.focus = Section::Title;
        run(&mut ui, &mut s, EventBits::CONFIRM);
        run(&mut ui, &mut s, EventBits::CONFIRM);
        assert_eq!(ui.nav.modal, Some(Modal::PaletteSelect { original: Palette::Iron }));
        assert!(!ui.nav.sub_item_mode);

        run(&mut ui, &mut s, EventBits::DOWN);
        assert_eq!(s.palette, Palette::Rainbow);
        let fx = run(&mut ui, &mut s, EventBits::BACK);
        assert!(!fx.persist);
        assert_eq!(s.palette, Palette::Iron);
        assert_eq!(ui.nav.modal, None);
        assert!(ui.nav.sub_item_mode);
    }

    #[test]
    fn palette_confirm_persists() {
        let mut ui = UiState::new();
        let mut s = DisplaySettings::default();
        ui.nav.focus = Section::Title;
        ui.nav.sub_item_mode = true;
        run(&mut ui, &mut s, EventBits::CONFIRM);
        run(&mut ui, &mut s, EventBits::UP);
        assert_eq!(s.palette, Palette::Arctic);
        let fx = run(&mut ui, &mut s, EventBits::CONFIRM);
        assert!(fx.persist);
        assert_eq!(s.palette, Palette::Arctic);
        assert!(ui.toast.is_some());
    }

    #[test]
    fn title_center_locks_and_stays_in_sub_items() {
        let mut ui = UiState::new();
        let mut s = DisplaySettings::default();
        ui.nav.focus = Section::Title;
        ui.nav.sub_item_mode = true;
        ui.nav.title_sub = SubItem::Center;
        let fx = run(&mut ui, &mut s, EventBits::CONFIRM);
        assert!(ui.lock.is_active());
        assert!(ui.nav.sub_item_mode);
        assert!(!fx.persist);
        assert!(!s.auto_scale);
    }

    #[test]
    fn lock_section_confirm_activates_lock() {
        let mut ui = UiState::new();
        let mut s = DisplaySettings::default();
        ui.nav.focus = Section::Lock;
        run(&mut ui, &mut s, EventBits::CONFIRM);
        assert!(ui.lock.is_active());
        assert_eq!(ui.nav.modal, None);
        assert!(!ui.nav.sub_item_mode);
    }

    #[test]
    fn unit_modal_toggles() {
        let mut ui = UiState::new();
        let mut s = DisplaySettings::default();
        ui.nav.focus = Section::Title;
        ui.nav.sub_item_mode = true;
        ui.nav.title_sub = SubItem::Right;
        run(&mut ui, &mut s, EventBits::CONFIRM);
        assert_eq!(ui.nav.modal, Some(Modal::TempUnitSelect));
        run(&mut ui, &mut s, EventBits::DOWN);
        assert_eq!(ui.nav.unit, TempUnit::Fahrenheit);
        let fx = run(&mut ui, &mut s, EventBits::CONFIRM);
        assert_eq!(fx, Effects::default());
        assert!(ui.nav.sub_item_mode);
        assert_eq!(ui.nav.unit, TempUnit::Fahrenheit);
    }

    #[test]
    fn channel_modal_toggles_without_persisting() {
        let mut ui = UiState::new();
        let mut s = DisplaySettings::default();
        ui.nav.focus = Section::Data;
        ui.nav.sub_item_mode = true;
        ui.nav.data_sub = SubItem::Right;
        run(&mut ui, &mut s, EventBits::CONFIRM);
        assert_eq!(ui.nav.modal, Some(Modal::ChannelSelect));
        run(&mut ui, &mut s, EventBits::UP);
        assert!(!ui.nav.plot_channel_is_row);
        let fx = run(&mut ui, &mut s, EventBits::BACK);
        assert!(!fx.persist);
        assert_eq!(ui.nav.modal, None);
    }

    #[test]
    fn data_left_and_center_have_no_action() {
        let mut ui = UiState::new();
        let mut s = DisplaySettings::default();
        ui.nav.focus = Section::Data;
        ui.nav.sub_item_mode = true;
        for sub in [SubItem::Left, SubItem::Center] {
            ui.nav.data_sub = sub;
            let fx = run(&mut ui, &mut s, EventBits::CONFIRM);
            assert_eq!(fx, Effects::default());
            assert_eq!(ui.nav.modal, None);
            assert!(ui.nav.sub_item_mode);
        }
    }

    #[test]
    fn crosshair_moves_clamped_and_persists_on_exit() {
        let mut ui = UiState::new();
        let mut s = DisplaySettings::default();
        run(&mut ui, &mut s, EventBits::CONFIRM);
        assert_eq!(ui.nav.modal, Some(Modal::CrosshairMove));

        for _ in 0..40 {
            run(&mut ui, &mut s, EventBits::DOWN);
        }
        assert_eq!(s.crosshair_col as usize, SENSOR_WIDTH - 1);

        run(&mut ui, &mut s, EventBits::CONFIRM);
        assert!(ui.nav.crosshair_axis_is_row);
        for _ in 0..40 {
            run(&mut ui, &mut s, EventBits::UP);
        }
        assert_eq!(s.crosshair_row, 0);
        assert_eq!(ui.nav.modal, Some(Modal::CrosshairMove));

        let fx = run(&mut ui, &mut s, EventBits::BACK);
        assert!(fx.persist);
        assert_eq!(ui.nav.modal, None);
        assert!(!ui.nav.sub_item_mode);
        assert_eq!(ui.nav.focus, Section::Image);
    }

    #[test]
    fn press_captures_only_on_image_focus() {
        let mut ui = UiState::new();
        let mut s = DisplaySettings::default();
        assert!(run(&mut ui, &mut s, EventBits::WHEEL_PRESS).capture);
        assert!(run(&mut ui, &mut s, EventBits::ENCODER_PRESS).capture);
        ui.nav.focus = Section::Lock;
        assert!(!run(&mut ui, &mut s, EventBits::WHEEL_PRESS).capture);
        ui.nav.focus = Section::Image;
        run(&mut ui, &mut s, EventBits::CONFIRM);
        assert!(!run(&mut ui, &mut s, EventBits::WHEEL_PRESS).capture);
    }

    #[test]
    fn up_down_together_toggles_unit_outside_modals() {
        let mut ui = UiState::new();
        let mut s = DisplaySettings::default();
        run(&mut ui, &mut s, EventBits::UP | EventBits::DOWN);
        assert_eq!(ui.nav.unit, TempUnit::Fahrenheit);
        assert_eq!(ui.nav.focus, Section::Image);

        run(&mut ui, &mut s, EventBits::CONFIRM);
        run(&mut ui, &mut s, EventBits::UP | EventBits::DOWN);
        assert_eq!(ui.nav.unit, TempUnit::Fahrenheit);
    }

    #[test]
    fn back_opens_menu_and_releases_lock() {
        let mut ui = UiState::new();
        let mut s = DisplaySettings::default();
        ui.nav.focus = Section::Lock;
        run(&mut ui, &mut s, EventBits::CONFIRM);
        assert!(ui.lock.is_active());
        run(&mut ui, &mut s, EventBits::BACK);
        assert!(ui.menu.is_some());
        assert!(!ui.lock.is_active());
        assert!(s.auto_scale);
    }

    #[test]
    fn toast_expiry() {
        let mut ui = UiState::new();
        let mut s = DisplaySettings::default();
        ui.nav.focus = Section::Title;
        ui.nav.sub_item_mode = true;
        transition(&mut ui, &mut s, EventBits::CONFIRM, None, 1_000);
        assert!(ui.toast.is_some());
        assert!(!ui.expire_toast(1_000 + TOAST_SHORT_MS - 1));
        assert!(ui.expire_toast(1_000 + TOAST_SHORT_MS));
        assert!(ui.toast.is_none());
    }
}
