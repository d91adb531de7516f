//! Screen rendering onto any `DrawTarget<Color = Rgb565>`.
//!
//! Layout (240×240):
//!
//! ```text
//!  0 ┌───────────────────────────────┐
//!    │ palette    AUTO/LOCK      unit│  title bar
//! 20 ├─┬─────────────────────────────┤
//!    │•│                             │
//!    │ │   false-colour image,       │
//!    │ │   mirrored horizontally     │
//!    │ │                             │
//!185 ├─┴───────┬─────────┬───────────┤
//!    │ Max/Min │  strip  │ Atr / Set │  data bar
//!    │ Ctr     │  plot   │ FPS       │
//!240 └─────────┴─────────┴───────────┘
//! ```
//!
//! The dot in the left gutter marks the focused section.

use core::fmt::Write;

use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_8X13};
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::pixelcolor::{Rgb565, Rgb888};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Text};
use heapless::{String, Vec};

use crate::config::{
    IMAGE_HEIGHT, IMAGE_WIDTH, IMAGE_X, IMAGE_Y, SCREEN_HEIGHT, SCREEN_WIDTH, SENSOR_HEIGHT,
    SENSOR_PIXELS, SENSOR_WIDTH, TOP_BAR_HEIGHT,
};
use crate::frame::{Frame, FrameStats, GridPos};
use crate::mapping::PaletteMapper;
use crate::settings::DisplaySettings;
use crate::ui::menu::{Menu, MenuItem};
use crate::ui::navigation::{Modal, NavigationState};
use crate::ui::toast::Toast;
use crate::ui::{Section, SubItem};
use crate::upscale::Upscaler;

const HIGHLIGHT: Rgb565 = Rgb565::new(0, 200 >> 2, 255 >> 3);
const MIN_MARKER: Rgb565 = Rgb565::new(0, 200 >> 2, 245 >> 3);
const DIM: Rgb565 = Rgb565::new(12, 24, 12);

const TEXT: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&FONT_6X10, Rgb565::WHITE);
const TEXT_HL: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&FONT_6X10, HIGHLIGHT);
const TEXT_SHADOW: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&FONT_6X10, Rgb565::BLACK);
const TITLE: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&FONT_8X13, Rgb565::WHITE);
const TITLE_HL: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&FONT_8X13, HIGHLIGHT);

const DATA_TOP: i32 = (SCREEN_HEIGHT - crate::config::BOTTOM_BAR_HEIGHT) as i32;
const DATA_LINES: [i32; 3] = [DATA_TOP + 14, DATA_TOP + 29, DATA_TOP + 44];
const PLOT_BOX: Rectangle = Rectangle::new(Point::new(75, 190), Size::new(90, 45));
const FPS_X: i32 = 170;

const TOAST_BOX: Rectangle = Rectangle::new(
    Point::new(
        (SCREEN_WIDTH as i32 - 172) / 2,
        IMAGE_Y as i32 + (IMAGE_HEIGHT as i32 - 36) / 2,
    ),
    Size::new(172, 36),
);

const MENU_FIRST_Y: i32 = 34;
const MENU_ROW_HEIGHT: i32 = 17;

/// Everything the live view needs for one frame.
pub struct LiveView<'a> {
    pub settings: &'a DisplaySettings,
    pub nav: &'a NavigationState,
    pub frame: &'a Frame,
    pub fixed: &'a [i16; SENSOR_PIXELS],
    pub stats: &'a FrameStats,
    pub mapper: &'a PaletteMapper,
    /// Generated palette, hot first.
    pub palette: &'a [Rgb888],
    pub locked: bool,
    pub fps: f32,
}

/// Draw the full live view.
pub fn draw_live<D, U>(target: &mut D, up: &U, view: &LiveView<'_>) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
    U: Upscaler,
{
    target.clear(Rgb565::BLACK)?;
    draw_title_bar(target, view)?;
    draw_image(target, up, view.fixed, view.mapper, view.palette)?;

    let moving = view.nav.modal == Some(Modal::CrosshairMove);
    if view.settings.realtime_analysis || moving {
        draw_crosshair(target, view.settings, moving)?;
    }
    if view.settings.temp_markers {
        draw_markers(target, view)?;
    }
    draw_data_bar(target, view)?;
    draw_focus_dot(target, view.nav.focus, view.locked)
}

/// Upscale and colour the sensor grid into the image area, one row at a time.
pub fn draw_image<D, U>(
    target: &mut D,
    up: &U,
    fixed: &[i16],
    mapper: &PaletteMapper,
    palette: &[Rgb888],
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
    U: Upscaler,
{
    let mut line = [0i16; IMAGE_WIDTH as usize];
    for y in 0..IMAGE_HEIGHT {
        up.scale_row(
            fixed,
            SENSOR_WIDTH,
            SENSOR_HEIGHT,
            y as usize,
            IMAGE_HEIGHT as usize,
            &mut line,
        );
        let area = Rectangle::new(
            Point::new(IMAGE_X as i32, (IMAGE_Y + y) as i32),
            Size::new(IMAGE_WIDTH, 1),
        );
        // The sensor faces away from the viewer.
        let colors = line.iter().rev().map(|&v| {
            palette
                .get(mapper.index(v))
                .map_or(Rgb565::BLACK, |c| Rgb565::from(*c))
        });
        target.fill_contiguous(&area, colors)?;
    }
    Ok(())
}

/// Screen position of the centre of a sensor cell, mirrored like the image.
pub fn grid_point(col: usize, row: usize) -> Point {
    let mcol = SENSOR_WIDTH - 1 - col.min(SENSOR_WIDTH - 1);
    let row = row.min(SENSOR_HEIGHT - 1);
    let x = IMAGE_X as usize + (mcol * 2 + 1) * IMAGE_WIDTH as usize / (2 * SENSOR_WIDTH);
    let y = IMAGE_Y as usize + (row * 2 + 1) * IMAGE_HEIGHT as usize / (2 * SENSOR_HEIGHT);
    Point::new(x as i32, y as i32)
}

fn title_anchor(sub: SubItem) -> (Point, Alignment) {
    match sub {
        SubItem::Left => (Point::new(IMAGE_X as i32 + 4, 14), Alignment::Left),
        SubItem::Center => (Point::new(SCREEN_WIDTH as i32 / 2, 14), Alignment::Center),
        SubItem::Right => (Point::new(SCREEN_WIDTH as i32 - 14, 14), Alignment::Right),
    }
}

fn title_cell(sub: SubItem) -> Rectangle {
    let x = match sub {
        SubItem::Left => IMAGE_X as i32,
        SubItem::Center => 85,
        SubItem::Right => 160,
    };
    Rectangle::new(Point::new(x, 1), Size::new(72, TOP_BAR_HEIGHT - 2))
}

fn data_cell(sub: SubItem) -> Rectangle {
    match sub {
        SubItem::Left => Rectangle::new(Point::new(6, DATA_TOP + 2), Size::new(66, 52)),
        SubItem::Center => PLOT_BOX,
        SubItem::Right => Rectangle::new(Point::new(FPS_X - 3, DATA_TOP + 2), Size::new(68, 52)),
    }
}

/// Outline the selected entry of a bar while its sub-items or a modal are active.
fn sub_outline(nav: &NavigationState, bar: Section) -> Option<SubItem> {
    if nav.focus != bar || !(nav.sub_item_mode || nav.modal.is_some()) {
        return None;
    }
    nav.active_sub()
}

fn draw_title_bar<D>(target: &mut D, view: &LiveView<'_>) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let s = view.settings;
    let nav = view.nav;

    let scale = if view.locked {
        "LOCK"
    } else if s.auto_scale {
        "AUTO"
    } else {
        "MAN"
    };
    let mut unit: String<8> = String::new();
    let _ = write!(unit, "Unit {}", nav.unit.symbol());

    for (sub, text) in [
        (SubItem::Left, s.palette.name()),
        (SubItem::Center, scale),
        (SubItem::Right, unit.as_str()),
    ] {
        let lit = nav.focus == Section::Title && nav.title_sub == sub;
        let style = if lit { TITLE_HL } else { TITLE };
        let (at, align) = title_anchor(sub);
        Text::with_alignment(text, at, style, align).draw(target)?;
    }

    if let Some(sub) = sub_outline(nav, Section::Title) {
        title_cell(sub)
            .into_styled(PrimitiveStyle::with_stroke(HIGHLIGHT, 1))
            .draw(target)?;
    }
    Ok(())
}

fn draw_crosshair<D>(target: &mut D, s: &DisplaySettings, moving: bool) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let c = grid_point(s.crosshair_col as usize, s.crosshair_row as usize);
    let color = if moving { HIGHLIGHT } else { Rgb565::WHITE };
    let style = PrimitiveStyle::with_stroke(color, 1);
    Line::new(c - Point::new(6, 0), c + Point::new(6, 0))
        .into_styled(style)
        .draw(target)?;
    Line::new(c - Point::new(0, 6), c + Point::new(0, 6))
        .into_styled(style)
        .draw(target)?;
    Ok(())
}

fn draw_cross<D>(target: &mut D, at: GridPos, diagonal: bool, color: Rgb565) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let c = grid_point(at.col as usize, at.row as usize);
    let (a, b) = if diagonal {
        (Point::new(4, 4), Point::new(4, -4))
    } else {
        (Point::new(5, 0), Point::new(0, 5))
    };

    // Shadow first, offset by one pixel.
    for (offset, color) in [(Point::new(1, 1), Rgb565::BLACK), (Point::zero(), color)] {
        let style = PrimitiveStyle::with_stroke(color, 2);
        let p = c + offset;
        Line::new(p - a, p + a).into_styled(style).draw(target)?;
        Line::new(p - b, p + b).into_styled(style).draw(target)?;
    }
    Ok(())
}

fn draw_markers<D>(target: &mut D, view: &LiveView<'_>) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let stats = view.stats;
    draw_cross(target, stats.max_at, false, Rgb565::RED)?;
    draw_cross(target, stats.min_at, true, MIN_MARKER)?;

    let mut text: String<16> = String::new();
    let _ = write!(text, "{:.1}", view.nav.unit.convert(stats.center));
    let at = Point::new(
        (IMAGE_X + IMAGE_WIDTH / 2) as i32,
        (IMAGE_Y + IMAGE_HEIGHT / 2) as i32 + 4,
    );
    Text::with_alignment(&text, at + Point::new(1, 1), TEXT_SHADOW, Alignment::Center)
        .draw(target)?;
    Text::with_alignment(&text, at, TEXT, Alignment::Center).draw(target)?;
    Ok(())
}

fn draw_data_bar<D>(target: &mut D, view: &LiveView<'_>) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let nav = view.nav;
    let unit = nav.unit;
    let lit = |sub: SubItem| nav.focus == Section::Data && nav.data_sub == sub;

    let left_style = if lit(SubItem::Left) { TEXT_HL } else { TEXT };
    let mut line: String<24> = String::new();
    for (label, value, y) in [
        ("Max", view.stats.max, DATA_LINES[0]),
        ("Min", view.stats.min, DATA_LINES[1]),
        ("Ctr", view.stats.center, DATA_LINES[2]),
    ] {
        line.clear();
        let _ = write!(line, "{}:{:.1}{}", label, unit.convert(value), unit.symbol());
        Text::new(&line, Point::new(10, y), left_style).draw(target)?;
    }

    let box_color = if lit(SubItem::Center) { HIGHLIGHT } else { DIM };
    PLOT_BOX
        .into_styled(PrimitiveStyle::with_stroke(box_color, 1))
        .draw(target)?;
    if view.settings.realtime_analysis {
        draw_strip_plot(target, view)?;
    }

    let right_style = if lit(SubItem::Right) { TEXT_HL } else { TEXT };
    line.clear();
    let _ = write!(line, "Atr:{:.1}", view.fps);
    Text::new(&line, Point::new(FPS_X, DATA_LINES[0]), right_style).draw(target)?;
    line.clear();
    let _ = write!(line, "Set:{:.1}", view.settings.sensor_rate.hz());
    Text::new(&line, Point::new(FPS_X, DATA_LINES[1]), right_style).draw(target)?;
    let channel = if nav.plot_channel_is_row { "FPS  row" } else { "FPS  col" };
    Text::new(channel, Point::new(FPS_X, DATA_LINES[2]), right_style).draw(target)?;

    if let Some(sub) = sub_outline(nav, Section::Data) {
        if sub != SubItem::Center {
            data_cell(sub)
                .into_styled(PrimitiveStyle::with_stroke(HIGHLIGHT, 1))
                .draw(target)?;
        }
    }
    Ok(())
}

/// Temperature profile through the crosshair, scaled to the frame range.
fn draw_strip_plot<D>(target: &mut D, view: &LiveView<'_>) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let s = view.settings;
    let mut samples: Vec<f32, SENSOR_WIDTH> = Vec::new();
    if view.nav.plot_channel_is_row {
        // Same left-right order as the mirrored image.
        for &t in view.frame.row(s.crosshair_row as usize).iter().rev() {
            let _ = samples.push(t);
        }
    } else {
        for t in view.frame.column(s.crosshair_col as usize) {
            let _ = samples.push(t);
        }
    }
    if samples.len() < 2 {
        return Ok(());
    }

    let min = view.stats.min;
    let span = (view.stats.max - min).max(0.1);
    let inner = PLOT_BOX.offset(-2);
    let w = inner.size.width as i32 - 1;
    let h = inner.size.height as i32 - 1;
    let last = samples.len() as i32 - 1;

    let point = |i: usize, t: f32| {
        let t = if t.is_finite() { t } else { min };
        let level = ((t - min) / span).clamp(0.0, 1.0);
        inner.top_left + Point::new(i as i32 * w / last, h - (level * h as f32) as i32)
    };

    let style = PrimitiveStyle::with_stroke(Rgb565::YELLOW, 1);
    for (i, pair) in samples.windows(2).enumerate() {
        Line::new(point(i, pair[0]), point(i + 1, pair[1]))
            .into_styled(style)
            .draw(target)?;
    }
    Ok(())
}

fn focus_y(section: Section) -> i32 {
    match section {
        Section::Title => TOP_BAR_HEIGHT as i32 / 2,
        Section::Image => (IMAGE_Y + IMAGE_HEIGHT / 3) as i32,
        Section::Lock => (IMAGE_Y + 2 * IMAGE_HEIGHT / 3) as i32,
        Section::Data => DATA_TOP + 27,
    }
}

fn draw_focus_dot<D>(target: &mut D, focus: Section, locked: bool) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    if locked {
        Rectangle::new(Point::new(2, focus_y(Section::Lock) - 3), Size::new(6, 6))
            .into_styled(PrimitiveStyle::with_stroke(HIGHLIGHT, 1))
            .draw(target)?;
    }
    Circle::with_center(Point::new(5, focus_y(focus)), 8)
        .into_styled(PrimitiveStyle::with_fill(Rgb565::YELLOW))
        .draw(target)?;
    Ok(())
}

/// Two-line overlay box over the middle of the image.
pub fn draw_toast<D>(target: &mut D, toast: &Toast) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    TOAST_BOX
        .into_styled(PrimitiveStyle::with_fill(Rgb565::BLACK))
        .draw(target)?;
    TOAST_BOX
        .into_styled(PrimitiveStyle::with_stroke(Rgb565::WHITE, 1))
        .draw(target)?;

    let cx = TOAST_BOX.center().x;
    let top = TOAST_BOX.top_left.y;
    Text::with_alignment(&toast.line1, Point::new(cx, top + 15), TEXT_HL, Alignment::Center)
        .draw(target)?;
    Text::with_alignment(&toast.line2, Point::new(cx, top + 29), TEXT, Alignment::Center)
        .draw(target)?;
    Ok(())
}

/// Full-screen settings list.
pub fn draw_menu<D>(target: &mut D, menu: &Menu, settings: &DisplaySettings) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    target.clear(Rgb565::BLACK)?;
    Text::with_alignment(
        "Settings",
        Point::new(SCREEN_WIDTH as i32 / 2, 14),
        TITLE_HL,
        Alignment::Center,
    )
    .draw(target)?;

    for (i, item) in MenuItem::ALL.iter().enumerate() {
        let y = MENU_FIRST_Y + i as i32 * MENU_ROW_HEIGHT;
        let selected = i == menu.selected_index();
        let style = if selected { TEXT_HL } else { TEXT };
        let label = menu.label(*item, settings);
        Text::new(&label, Point::new(18, y), style).draw(target)?;
        if selected {
            Circle::with_center(Point::new(8, y - 3), 7)
                .into_styled(PrimitiveStyle::with_fill(Rgb565::YELLOW))
                .draw(target)?;
        }
    }
    Ok(())
}

/// Placeholder until the first valid frame arrives.
pub fn draw_waiting<D>(target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    target.clear(Rgb565::BLACK)?;
    Text::with_alignment(
        "Waiting for sensor",
        Point::new(SCREEN_WIDTH as i32 / 2, SCREEN_HEIGHT as i32 / 2),
        TEXT,
        Alignment::Center,
    )
    .draw(target)?;
    Ok(())
}

// Framebuffer

const FB_WIDTH: usize = SCREEN_WIDTH as usize;
const FB_HEIGHT: usize = SCREEN_HEIGHT as usize;
pub const FRAMEBUFFER_LEN: usize = FB_WIDTH * FB_HEIGHT * 2;

/// Screen-sized RGB565 buffer in panel byte order (big-endian).
pub struct Framebuffer {
    buf: [u8; FRAMEBUFFER_LEN],
}

impl Framebuffer {
    pub const fn new() -> Self {
        Self {
            buf: [0; FRAMEBUFFER_LEN],
        }
    }

    /// Bytes ready for `RAMWR`.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb565> {
        if x as usize >= FB_WIDTH || y as usize >= FB_HEIGHT {
            return None;
        }
        let idx = (y as usize * FB_WIDTH + x as usize) * 2;
        let raw = u16::from_be_bytes([self.buf[idx], self.buf[idx + 1]]);
        Some(Rgb565::from(RawU16::new(raw)))
    }

    #[inline]
    fn put(&mut self, x: usize, y: usize, color: Rgb565) {
        let idx = (y * FB_WIDTH + x) * 2;
        let raw: RawU16 = color.into();
        let bytes = raw.into_inner().to_be_bytes();
        self.buf[idx] = bytes[0];
        self.buf[idx + 1] = bytes[1];
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}

impl DrawTarget for Framebuffer {
    type Color = Rgb565;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, color) in pixels {
            if p.x >= 0 && (p.x as usize) < FB_WIDTH && p.y >= 0 && (p.y as usize) < FB_HEIGHT {
                self.put(p.x as usize, p.y as usize, color);
            }
        }
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        // Colours cover the whole requested area; skip the clipped ones.
        let clip = self.bounding_box();
        let mut colors = colors.into_iter();
        for y in area.rows() {
            for x in area.columns() {
                let Some(color) = colors.next() else {
                    return Ok(());
                };
                if clip.contains(Point::new(x, y)) {
                    self.put(x as usize, y as usize, color);
                }
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        if area.size == Size::zero() {
            return Ok(());
        }
        let raw: RawU16 = color.into();
        let bytes = raw.into_inner().to_be_bytes();
        let x0 = area.top_left.x as usize;
        let x1 = x0 + area.size.width as usize;
        for y in area.rows() {
            let row = &mut self.buf[y as usize * FB_WIDTH * 2..][x0 * 2..x1 * 2];
            for px in row.chunks_exact_mut(2) {
                px.copy_from_slice(&bytes);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::boxed::Box;

    use super::*;
    use crate::mapping::ScaleRange;
    use crate::palette;
    use crate::settings::Palette;
    use crate::upscale::Nearest;

    fn framebuffer() -> Box<Framebuffer> {
        Box::new(Framebuffer::new())
    }

    #[test]
    fn framebuffer_stores_big_endian() {
        let mut fb = framebuffer();
        Pixel(Point::new(1, 0), Rgb565::RED).draw(fb.as_mut()).unwrap();
        assert_eq!(&fb.as_bytes()[2..4], &[0xF8, 0x00]);
        assert_eq!(fb.pixel(1, 0), Some(Rgb565::RED));
        assert_eq!(fb.pixel(SCREEN_WIDTH, 0), None);
    }

    #[test]
    fn fill_solid_is_clipped() {
        let mut fb = framebuffer();
        Rectangle::new(Point::new(230, 230), Size::new(20, 20))
            .into_styled(PrimitiveStyle::with_fill(Rgb565::GREEN))
            .draw(fb.as_mut())
            .unwrap();
        assert_eq!(fb.pixel(239, 239), Some(Rgb565::GREEN));
        assert_eq!(fb.pixel(229, 239), Some(Rgb565::BLACK));
    }

    #[test]
    fn image_is_mirrored() {
        let mut fixed = [200i16; SENSOR_PIXELS];
        for row in 0..SENSOR_HEIGHT {
            fixed[row * SENSOR_WIDTH] = 300;
        }
        let range = ScaleRange { min: 20.0, max: 30.0 };
        let mapper = PaletteMapper::new(&range, 50, 100);
        let mut table = [Rgb888::BLACK; 100];
        palette::generate(Palette::Iron, 100, &mut table);

        let mut fb = framebuffer();
        draw_image(fb.as_mut(), &Nearest, &fixed, &mapper, &table).unwrap();

        let hot = Rgb565::from(table[0]);
        let cold = Rgb565::from(table[99]);
        assert_ne!(hot, cold);
        let right = IMAGE_X + IMAGE_WIDTH - 1;
        assert_eq!(fb.pixel(right, IMAGE_Y), Some(hot));
        assert_eq!(fb.pixel(IMAGE_X, IMAGE_Y), Some(cold));
        assert_eq!(fb.pixel(IMAGE_X - 1, IMAGE_Y), Some(Rgb565::BLACK));
    }

    #[test]
    fn grid_point_mirrors_columns() {
        let left = grid_point(SENSOR_WIDTH - 1, 0);
        let right = grid_point(0, SENSOR_HEIGHT - 1);
        assert!(left.x < right.x);
        assert!(left.y < right.y);
        assert!(left.x >= IMAGE_X as i32);
        assert!(right.y < (IMAGE_Y + IMAGE_HEIGHT) as i32);
    }

    #[test]
    fn toast_box_has_border() {
        let mut fb = framebuffer();
        let toast = Toast::new("Palette", "Iron", 0, 100);
        draw_toast(fb.as_mut(), &toast).unwrap();
        let tl = TOAST_BOX.top_left;
        assert_eq!(fb.pixel(tl.x as u32, tl.y as u32), Some(Rgb565::WHITE));
    }

    #[test]
    fn menu_marks_selection() {
        let mut fb = framebuffer();
        let menu = Menu::new();
        draw_menu(fb.as_mut(), &menu, &DisplaySettings::default()).unwrap();
        assert_eq!(fb.pixel(8, (MENU_FIRST_Y - 3) as u32), Some(Rgb565::YELLOW));
        assert_eq!(
            fb.pixel(8, (MENU_FIRST_Y + MENU_ROW_HEIGHT - 3) as u32),
            Some(Rgb565::BLACK)
        );
    }
}
