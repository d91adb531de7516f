//! Full-screen settings menu.
//!
//! `UP`/`DOWN` move through the list (wrapping), `CONFIRM` toggles an
//! option or opens an inline adjuster, `BACK` leaves. In an adjuster
//! `UP`/`DOWN` change a draft value, `CONFIRM` commits and persists it and
//! `BACK` drops it.

use core::fmt::Write;

use heapless::String;

use crate::config::{
    BRIGHTNESS_STEP, MAX_BRIGHTNESS, MAX_TEMP, MIN_SCALE_DELTA, MIN_TEMP, TOAST_MS,
};
use crate::settings::{DisplaySettings, SensorRate};
use crate::ui::input_logic::{ring_next, ring_prev};
use crate::ui::navigation::{Effects, PowerRequest};
use crate::ui::toast::Toast;
use crate::ui::NavEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuItem {
    OpenCamera,
    AutoScale,
    MinTemp,
    PaletteCenter,
    MaxTemp,
    PaletteNext,
    RealtimeAnalysis,
    TempMarkers,
    SensorRate,
    Brightness,
    Sleep,
    PowerOff,
}

impl MenuItem {
    pub const ALL: [MenuItem; 12] = [
        MenuItem::OpenCamera,
        MenuItem::AutoScale,
        MenuItem::MinTemp,
        MenuItem::PaletteCenter,
        MenuItem::MaxTemp,
        MenuItem::PaletteNext,
        MenuItem::RealtimeAnalysis,
        MenuItem::TempMarkers,
        MenuItem::SensorRate,
        MenuItem::Brightness,
        MenuItem::Sleep,
        MenuItem::PowerOff,
    ];
}

/// Draft value of an open adjuster.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Adjust {
    MinTemp(f32),
    MaxTemp(f32),
    PaletteCenter(u8),
    Rate(SensorRate),
    Brightness(u8),
}

impl Adjust {
    fn open(item: MenuItem, s: &DisplaySettings) -> Option<Self> {
        match item {
            MenuItem::MinTemp => Some(Adjust::MinTemp(s.manual_min)),
            MenuItem::MaxTemp => Some(Adjust::MaxTemp(s.manual_max)),
            MenuItem::PaletteCenter => Some(Adjust::PaletteCenter(s.palette_center_percent)),
            MenuItem::SensorRate => Some(Adjust::Rate(s.sensor_rate)),
            MenuItem::Brightness => Some(Adjust::Brightness(s.brightness)),
            _ => None,
        }
    }

    /// One step up (`UP`) or down (`DOWN`), kept inside the allowed range.
    fn step(self, up: bool, s: &DisplaySettings) -> Self {
        let dir = if up { 1.0 } else { -1.0 };
        match self {
            Adjust::MinTemp(v) => {
                Adjust::MinTemp((v + dir).min(s.manual_max - MIN_SCALE_DELTA).max(MIN_TEMP))
            }
            Adjust::MaxTemp(v) => {
                Adjust::MaxTemp((v + dir).max(s.manual_min + MIN_SCALE_DELTA).min(MAX_TEMP))
            }
            Adjust::PaletteCenter(v) => Adjust::PaletteCenter(if up {
                (v + 1).min(100)
            } else {
                v.saturating_sub(1)
            }),
            Adjust::Rate(r) => Adjust::Rate(if up { r.faster() } else { r.slower() }),
            Adjust::Brightness(b) => Adjust::Brightness(if up {
                b.saturating_add(BRIGHTNESS_STEP).min(MAX_BRIGHTNESS)
            } else {
                b.saturating_sub(BRIGHTNESS_STEP)
            }),
        }
    }

    fn commit(self, s: &mut DisplaySettings, fx: &mut Effects, now_ms: u64) -> Toast {
        match self {
            Adjust::MinTemp(v) => {
                s.manual_min = v;
                Toast::with_value("Min temp set", format_args!("{:.1}C", v), now_ms, TOAST_MS)
            }
            Adjust::MaxTemp(v) => {
                s.manual_max = v;
                Toast::with_value("Max temp set", format_args!("{:.1}C", v), now_ms, TOAST_MS)
            }
            Adjust::PaletteCenter(v) => {
                s.palette_center_percent = v;
                Toast::with_value("Palette centre", format_args!("{}%", v), now_ms, TOAST_MS)
            }
            Adjust::Rate(r) => {
                s.sensor_rate = r;
                fx.apply_rate = true;
                Toast::with_value("Sensor rate", format_args!("{} Hz", r.hz()), now_ms, TOAST_MS)
            }
            Adjust::Brightness(b) => {
                s.brightness = b;
                fx.apply_brightness = true;
                Toast::with_value("Brightness", format_args!("{}%", b), now_ms, TOAST_MS)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuOutcome {
    Stay,
    Close,
}

/// Menu cursor and open adjuster.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Menu {
    selected: usize,
    adjust: Option<Adjust>,
}

pub type MenuLabel = String<40>;

impl Menu {
    pub const fn new() -> Self {
        Self {
            selected: 0,
            adjust: None,
        }
    }

    pub fn selected(&self) -> MenuItem {
        MenuItem::ALL[self.selected]
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn adjust(&self) -> Option<Adjust> {
        self.adjust
    }

    pub fn handle(
        &mut self,
        ev: NavEvent,
        settings: &mut DisplaySettings,
        now_ms: u64,
        fx: &mut Effects,
        toast: &mut Option<Toast>,
    ) -> MenuOutcome {
        if let Some(draft) = self.adjust {
            match ev {
                NavEvent::Up | NavEvent::Down => {
                    self.adjust = Some(draft.step(ev == NavEvent::Up, settings));
                }
                NavEvent::Confirm => {
                    *toast = Some(draft.commit(settings, fx, now_ms));
                    fx.persist = true;
                    self.adjust = None;
                }
                NavEvent::Back => self.adjust = None,
                NavEvent::Press | NavEvent::UpDown => {}
            }
            return MenuOutcome::Stay;
        }

        let n = MenuItem::ALL.len();
        match ev {
            NavEvent::Up => self.selected = ring_prev(self.selected, n),
            NavEvent::Down => self.selected = ring_next(self.selected, n),
            NavEvent::Back => return MenuOutcome::Close,
            NavEvent::Confirm => return self.activate(settings, now_ms, fx, toast),
            NavEvent::Press | NavEvent::UpDown => {}
        }
        MenuOutcome::Stay
    }

    fn activate(
        &mut self,
        s: &mut DisplaySettings,
        now_ms: u64,
        fx: &mut Effects,
        toast: &mut Option<Toast>,
    ) -> MenuOutcome {
        let item = self.selected();
        let on_off = |v: bool| if v { "on" } else { "off" };

        match item {
            MenuItem::OpenCamera => return MenuOutcome::Close,
            MenuItem::AutoScale => {
                s.auto_scale = !s.auto_scale;
                fx.persist = true;
                *toast = Some(Toast::new("Auto scale", on_off(s.auto_scale), now_ms, TOAST_MS));
            }
            MenuItem::RealtimeAnalysis => {
                s.realtime_analysis = !s.realtime_analysis;
                fx.persist = true;
                *toast = Some(Toast::new("Analysis", on_off(s.realtime_analysis), now_ms, TOAST_MS));
            }
            MenuItem::TempMarkers => {
                s.temp_markers = !s.temp_markers;
                fx.persist = true;
                *toast = Some(Toast::new("Markers", on_off(s.temp_markers), now_ms, TOAST_MS));
            }
            MenuItem::PaletteNext => {
                s.palette = s.palette.next();
                fx.persist = true;
                *toast = Some(Toast::new("Palette", s.palette.name(), now_ms, TOAST_MS));
            }
            MenuItem::Sleep => {
                fx.power = Some(PowerRequest::LightSleep);
                return MenuOutcome::Close;
            }
            MenuItem::PowerOff => {
                fx.power = Some(PowerRequest::DeepSleep);
                return MenuOutcome::Close;
            }
            MenuItem::MinTemp
            | MenuItem::MaxTemp
            | MenuItem::PaletteCenter
            | MenuItem::SensorRate
            | MenuItem::Brightness => self.adjust = Adjust::open(item, s),
        }
        MenuOutcome::Stay
    }

    /// Text for one row, showing the draft value if that row is being adjusted.
    pub fn label(&self, item: MenuItem, s: &DisplaySettings) -> MenuLabel {
        let mut out = MenuLabel::new();
        let draft = if item == self.selected() { self.adjust } else { None };
        let on_off = |v: bool| if v { "On" } else { "Off" };

        let _ = match (item, draft) {
            (MenuItem::OpenCamera, _) => write!(out, "Open Camera"),
            (MenuItem::AutoScale, _) => write!(out, "Auto Scale: {}", on_off(s.auto_scale)),
            (MenuItem::MinTemp, Some(Adjust::MinTemp(v))) => write!(out, "> Min Temp: {:.1}C", v),
            (MenuItem::MinTemp, _) => write!(out, "Min Temp: {:.1}C", s.manual_min),
            (MenuItem::PaletteCenter, Some(Adjust::PaletteCenter(v))) => {
                write!(out, "> Palette Center: {}%", v)
            }
            (MenuItem::PaletteCenter, _) => {
                write!(out, "Palette Center: {}%", s.palette_center_percent)
            }
            (MenuItem::MaxTemp, Some(Adjust::MaxTemp(v))) => write!(out, "> Max Temp: {:.1}C", v),
            (MenuItem::MaxTemp, _) => write!(out, "Max Temp: {:.1}C", s.manual_max),
            (MenuItem::PaletteNext, _) => write!(out, "Palette: {}", s.palette.name()),
            (MenuItem::RealtimeAnalysis, _) => {
                write!(out, "Real-time Analysis: {}", on_off(s.realtime_analysis))
            }
            (MenuItem::TempMarkers, _) => write!(out, "Temp Markers: {}", on_off(s.temp_markers)),
            (MenuItem::SensorRate, Some(Adjust::Rate(r))) => {
                write!(out, "> Sensor Rate: {} Hz", r.hz())
            }
            (MenuItem::SensorRate, _) => write!(out, "Sensor Rate: {} Hz", s.sensor_rate.hz()),
            (MenuItem::Brightness, Some(Adjust::Brightness(b))) => {
                write!(out, "> Brightness: {}%", b)
            }
            (MenuItem::Brightness, _) => write!(out, "Brightness: {}%", s.brightness),
            (MenuItem::Sleep, _) => write!(out, "Sleep"),
            (MenuItem::PowerOff, _) => write!(out, "Power Off"),
        };
        out
    }
}
