//! Sensor grid → screen upscaling on fixed-point deci-degree values.
//!
//! Works one output row at a time so the renderer never needs a full
//! screen-sized temperature buffer.

/// Resamples a `src_w × src_h` grid to an output of `dst.len() × dst_h`.
pub trait Upscaler {
    fn scale_row(
        &self,
        src: &[i16],
        src_w: usize,
        src_h: usize,
        row: usize,
        dst_h: usize,
        dst: &mut [i16],
    );
}

/// Fixed-point fraction bits for source coordinates.
const FRAC_BITS: u32 = 8;
const FRAC_ONE: i32 = 1 << FRAC_BITS;

/// Source coordinate (fixed-point) for output index `i` of `n`, aligning
/// the first and last samples of both grids.
#[inline]
fn src_coord(i: usize, n: usize, src_n: usize) -> i32 {
    if n <= 1 || src_n <= 1 {
        return 0;
    }
    ((i * (src_n - 1)) as i32 * FRAC_ONE) / (n - 1) as i32
}

/// Nearest-neighbour: cheap, blocky.
#[derive(Clone, Copy, Debug, Default)]
pub struct Nearest;

impl Upscaler for Nearest {
    fn scale_row(
        &self,
        src: &[i16],
        src_w: usize,
        src_h: usize,
        row: usize,
        dst_h: usize,
        dst: &mut [i16],
    ) {
        let sy = (row * src_h / dst_h.max(1)).min(src_h - 1);
        let line = &src[sy * src_w..(sy + 1) * src_w];
        let dst_w = dst.len();
        for (x, out) in dst.iter_mut().enumerate() {
            let sx = (x * src_w / dst_w).min(src_w - 1);
            *out = line[sx];
        }
    }
}

/// Bilinear interpolation between the four surrounding samples.
#[derive(Clone, Copy, Debug, Default)]
pub struct Bilinear;

impl Upscaler for Bilinear {
    fn scale_row(
        &self,
        src: &[i16],
        src_w: usize,
        src_h: usize,
        row: usize,
        dst_h: usize,
        dst: &mut [i16],
    ) {
        let fy = src_coord(row, dst_h, src_h);
        let y0 = ((fy >> FRAC_BITS) as usize).min(src_h - 1);
        let y1 = (y0 + 1).min(src_h - 1);
        let wy = fy & (FRAC_ONE - 1);

        let top = &src[y0 * src_w..(y0 + 1) * src_w];
        let bottom = &src[y1 * src_w..(y1 + 1) * src_w];
        let dst_w = dst.len();

        for (x, out) in dst.iter_mut().enumerate() {
            let fx = src_coord(x, dst_w, src_w);
            let x0 = ((fx >> FRAC_BITS) as usize).min(src_w - 1);
            let x1 = (x0 + 1).min(src_w - 1);
            let wx = fx & (FRAC_ONE - 1);

            let t = top[x0] as i32 * (FRAC_ONE - wx) + top[x1] as i32 * wx;
            let b = bottom[x0] as i32 * (FRAC_ONE - wx) + bottom[x1] as i32 * wx;
            let v = (t * (FRAC_ONE - wy) + b * wy) >> (2 * FRAC_BITS);
            *out = v as i16;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: usize = 4;
    const H: usize = 3;

    fn ramp() -> [i16; W * H] {
        // Value = 100 * col + 1000 * row
        let mut g = [0i16; W * H];
        for r in 0..H {
            for c in 0..W {
                g[r * W + c] = (100 * c + 1000 * r) as i16;
            }
        }
        g
    }

    #[test]
    fn bilinear_keeps_corners_and_interpolates() {
        let src = ramp();
        let mut row = [0i16; 7];
        Bilinear.scale_row(&src, W, H, 0, 5, &mut row);
        assert_eq!(row[0], 0);
        assert_eq!(row[6], 300);
        assert_eq!(row[2], 100);
        assert_eq!(row[3], 150);

        Bilinear.scale_row(&src, W, H, 4, 5, &mut row);
        assert_eq!(row[0], 2000);
        assert_eq!(row[6], 2300);

        Bilinear.scale_row(&src, W, H, 1, 5, &mut row);
        assert_eq!(row[0], 500);
    }

    #[test]
    fn nearest_repeats_source_cells() {
        let src = ramp();
        let mut row = [0i16; 8];
        Nearest.scale_row(&src, W, H, 0, 6, &mut row);
        assert_eq!(row, [0, 0, 100, 100, 200, 200, 300, 300]);
        Nearest.scale_row(&src, W, H, 5, 6, &mut row);
        assert_eq!(row[0], 2000);
    }

    #[test]
    fn negative_values_survive_interpolation() {
        let src = [-400i16; W * H];
        let mut row = [0i16; 9];
        Bilinear.scale_row(&src, W, H, 3, 7, &mut row);
        assert!(row.iter().all(|&v| v == -400));
    }
}
