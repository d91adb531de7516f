//! False-colour palette tables.
//!
//! Each palette is a short list of colour stops from cold to hot. A table
//! of any length is produced by linear interpolation between stops. Tables
//! are written hot-first: entry 0 is the hottest colour, matching
//! `PaletteMapper::index`.

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

use crate::settings::Palette;

const fn rgb(r: u8, g: u8, b: u8) -> Rgb888 {
    Rgb888::new(r, g, b)
}

const IRON: &[Rgb888] = &[
    rgb(0, 0, 0),
    rgb(32, 0, 140),
    rgb(204, 0, 119),
    rgb(255, 165, 0),
    rgb(255, 255, 255),
];

const RAINBOW: &[Rgb888] = &[
    rgb(0, 0, 140),
    rgb(0, 0, 255),
    rgb(0, 255, 255),
    rgb(0, 255, 0),
    rgb(255, 255, 0),
    rgb(255, 0, 0),
];

const WHITE_HOT: &[Rgb888] = &[rgb(0, 0, 0), rgb(255, 255, 255)];

const BLACK_HOT: &[Rgb888] = &[rgb(255, 255, 255), rgb(0, 0, 0)];

const LAVA: &[Rgb888] = &[
    rgb(0, 0, 0),
    rgb(120, 0, 0),
    rgb(230, 30, 0),
    rgb(255, 140, 0),
    rgb(255, 240, 80),
];

const ARCTIC: &[Rgb888] = &[
    rgb(0, 0, 60),
    rgb(0, 60, 200),
    rgb(0, 200, 245),
    rgb(180, 255, 255),
    rgb(255, 255, 255),
];

/// Colour stops, cold → hot.
pub fn stops(palette: Palette) -> &'static [Rgb888] {
    match palette {
        Palette::Iron => IRON,
        Palette::Rainbow => RAINBOW,
        Palette::WhiteHot => WHITE_HOT,
        Palette::BlackHot => BLACK_HOT,
        Palette::Lava => LAVA,
        Palette::Arctic => ARCTIC,
    }
}

/// Fixed-point resolution of the gradient position.
const ONE: u32 = 1 << 12;

fn lerp(a: u8, b: u8, frac: u32) -> u8 {
    let a = a as i32;
    let b = b as i32;
    (a + ((b - a) * frac as i32) / ONE as i32) as u8
}

/// Colour at gradient position `pos` in `0..=ONE` (0 = cold).
fn sample(stops: &[Rgb888], pos: u32) -> Rgb888 {
    let segments = (stops.len() - 1) as u32;
    let scaled = pos.min(ONE) * segments;
    let seg = (scaled / ONE).min(segments - 1) as usize;
    let frac = scaled - seg as u32 * ONE;
    let (a, b) = (stops[seg], stops[seg + 1]);
    Rgb888::new(
        lerp(a.r(), b.r(), frac),
        lerp(a.g(), b.g(), frac),
        lerp(a.b(), b.b(), frac),
    )
}

/// Fill `out[..steps]` with `palette`, hottest first.
///
/// Returns the number of entries written, which is `steps` limited to the
/// length of `out`.
pub fn generate(palette: Palette, steps: usize, out: &mut [Rgb888]) -> usize {
    let n = steps.min(out.len());
    let stops = stops(palette);

    match n {
        0 => {}
        1 => out[0] = stops[stops.len() - 1],
        _ => {
            let last = (n - 1) as u32;
            for (i, slot) in out[..n].iter_mut().enumerate() {
                let pos = (last - i as u32) * ONE / last;
                *slot = sample(stops, pos);
            }
        }
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_runs_hot_to_cold() {
        let mut buf = [Rgb888::new(1, 2, 3); 64];
        let n = generate(Palette::WhiteHot, 64, &mut buf);
        assert_eq!(n, 64);
        assert_eq!(buf[0], Rgb888::new(255, 255, 255));
        assert_eq!(buf[63], Rgb888::new(0, 0, 0));
        // Monotonic for a two-stop grey ramp.
        assert!(buf.windows(2).all(|w| w[0].r() >= w[1].r()));
    }

    #[test]
    fn endpoints_match_stops_for_every_palette() {
        let mut buf = [Rgb888::new(0, 0, 0); 300];
        for p in Palette::ALL {
            let s = stops(p);
            let n = generate(p, 300, &mut buf);
            assert_eq!(buf[0], s[s.len() - 1], "{:?}", p);
            assert_eq!(buf[n - 1], s[0], "{:?}", p);
        }
    }

    #[test]
    fn output_length_is_bounded_by_buffer() {
        let mut buf = [Rgb888::new(0, 0, 0); 8];
        assert_eq!(generate(Palette::Iron, 100, &mut buf), 8);
        assert_eq!(generate(Palette::Iron, 0, &mut buf), 0);
        assert_eq!(generate(Palette::Rainbow, 1, &mut buf), 1);
        assert_eq!(buf[0], Rgb888::new(255, 0, 0));
    }

    #[test]
    fn interior_stop_is_hit_exactly() {
        // Five stops over nine entries put the middle stop at entry 4.
        let mut buf = [Rgb888::new(0, 0, 0); 9];
        generate(Palette::Iron, 9, &mut buf);
        assert_eq!(buf[4], Rgb888::new(204, 0, 119));
    }
}
