//! Screenshot capture.
//!
//! A capture is the raw sensor frame, not the rendered screen: it stays
//! re-renderable with any palette or scale. Records are small enough to
//! append to a flash queue.
//!
//! Record layout (little-endian):
//!
//! | Offset | Size | Field                        |
//! |--------|------|------------------------------|
//! | 0      | 2    | magic `TC`                   |
//! | 2      | 1    | record version               |
//! | 3      | 1    | bit depth (8 or 16)          |
//! | 4      | 1    | width                        |
//! | 5      | 1    | height                       |
//! | 6      | 2    | frame min, deci-degrees      |
//! | 8      | 2    | frame max, deci-degrees      |
//! | 10     | 2    | centre, deci-degrees         |
//! | 12     | n    | pixels, row-major            |
//!
//! 16-bit pixels are deci-degrees; 8-bit pixels are levels between min and
//! max.

use crate::config::{SENSOR_HEIGHT, SENSOR_PIXELS, SENSOR_WIDTH};
use crate::error::Error;
use crate::frame::{to_fixed, Frame, FrameStats};

pub const CAPTURE_MAGIC: [u8; 2] = *b"TC";
pub const CAPTURE_VERSION: u8 = 1;
pub const CAPTURE_HEADER_LEN: usize = 12;
pub const MAX_CAPTURE_LEN: usize = CAPTURE_HEADER_LEN + SENSOR_PIXELS * 2;

/// Bytes needed for a record at `bit_depth`.
pub fn capture_len(bit_depth: u8) -> Option<usize> {
    match bit_depth {
        8 => Some(CAPTURE_HEADER_LEN + SENSOR_PIXELS),
        16 => Some(CAPTURE_HEADER_LEN + SENSOR_PIXELS * 2),
        _ => None,
    }
}

/// Serialize a frame. Returns the record length.
pub fn encode_capture(
    frame: &Frame,
    stats: &FrameStats,
    bit_depth: u8,
    out: &mut [u8],
) -> Result<usize, Error> {
    let len = capture_len(bit_depth).ok_or(Error::Capture)?;
    if out.len() < len {
        return Err(Error::BufferOverflow);
    }

    let min = to_fixed(stats.min);
    let max = to_fixed(stats.max);

    out[0..2].copy_from_slice(&CAPTURE_MAGIC);
    out[2] = CAPTURE_VERSION;
    out[3] = bit_depth;
    out[4] = SENSOR_WIDTH as u8;
    out[5] = SENSOR_HEIGHT as u8;
    out[6..8].copy_from_slice(&min.to_le_bytes());
    out[8..10].copy_from_slice(&max.to_le_bytes());
    out[10..12].copy_from_slice(&to_fixed(stats.center).to_le_bytes());

    let mut fixed = [0i16; SENSOR_PIXELS];
    frame.to_fixed(&mut fixed);
    let body = &mut out[CAPTURE_HEADER_LEN..len];

    if bit_depth == 16 {
        for (dst, v) in body.chunks_exact_mut(2).zip(fixed.iter()) {
            dst.copy_from_slice(&v.to_le_bytes());
        }
    } else {
        let span = (max as i32 - min as i32).max(1);
        for (dst, &v) in body.iter_mut().zip(fixed.iter()) {
            let level = ((v as i32 - min as i32) * 255 / span).clamp(0, 255);
            *dst = level as u8;
        }
    }
    Ok(len)
}

/// Destination for screenshots.
#[allow(async_fn_in_trait)]
pub trait CaptureSink {
    /// Store one capture. Returns its sequence number.
    async fn save_screenshot(
        &mut self,
        frame: &Frame,
        stats: &FrameStats,
        bit_depth: u8,
    ) -> Result<u32, Error>;
}

/// Keeps only the most recent record in RAM.
#[derive(Debug, Default)]
pub struct MemoryCapture {
    pub count: u32,
    pub last: heapless::Vec<u8, MAX_CAPTURE_LEN>,
    pub fail: bool,
}

impl CaptureSink for MemoryCapture {
    async fn save_screenshot(
        &mut self,
        frame: &Frame,
        stats: &FrameStats,
        bit_depth: u8,
    ) -> Result<u32, Error> {
        if self.fail {
            return Err(Error::Capture);
        }
        let mut buf = [0u8; MAX_CAPTURE_LEN];
        let len = encode_capture(frame, stats, bit_depth, &mut buf)?;
        self.last.clear();
        self.last
            .extend_from_slice(&buf[..len])
            .map_err(|_| Error::BufferOverflow)?;
        self.count += 1;
        Ok(self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> (Frame, FrameStats) {
        let mut f = Frame::filled(20.0);
        f.set(0, 0, 10.0);
        f.set(1, 0, 30.0);
        let s = FrameStats::from_frame(&f).unwrap();
        (f, s)
    }

    #[test]
    fn sixteen_bit_record_holds_deci_degrees() {
        let (f, s) = scene();
        let mut buf = [0u8; MAX_CAPTURE_LEN];
        let len = encode_capture(&f, &s, 16, &mut buf).unwrap();
        assert_eq!(len, MAX_CAPTURE_LEN);
        assert_eq!(&buf[0..2], b"TC");
        assert_eq!(buf[3], 16);
        assert_eq!(i16::from_le_bytes([buf[6], buf[7]]), 100);
        assert_eq!(i16::from_le_bytes([buf[8], buf[9]]), 300);
        assert_eq!(i16::from_le_bytes([buf[12], buf[13]]), 100);
        assert_eq!(i16::from_le_bytes([buf[14], buf[15]]), 300);
        assert_eq!(i16::from_le_bytes([buf[16], buf[17]]), 200);
    }

    #[test]
    fn eight_bit_record_holds_levels() {
        let (f, s) = scene();
        let mut buf = [0u8; MAX_CAPTURE_LEN];
        let len = encode_capture(&f, &s, 8, &mut buf).unwrap();
        assert_eq!(len, CAPTURE_HEADER_LEN + SENSOR_PIXELS);
        assert_eq!(buf[12], 0);
        assert_eq!(buf[13], 255);
        assert_eq!(buf[14], 127);
    }

    #[test]
    fn rejects_bad_depth_and_small_buffers() {
        let (f, s) = scene();
        let mut buf = [0u8; 64];
        assert_eq!(encode_capture(&f, &s, 12, &mut buf), Err(Error::Capture));
        assert_eq!(encode_capture(&f, &s, 8, &mut buf), Err(Error::BufferOverflow));
    }

    #[test]
    fn memory_sink_counts() {
        let (f, s) = scene();
        let mut sink = MemoryCapture::default();
        assert_eq!(embassy_futures::block_on(sink.save_screenshot(&f, &s, 16)), Ok(1));
        assert_eq!(embassy_futures::block_on(sink.save_screenshot(&f, &s, 8)), Ok(2));
        assert_eq!(sink.last.len(), CAPTURE_HEADER_LEN + SENSOR_PIXELS);
        sink.fail = true;
        assert_eq!(
            embassy_futures::block_on(sink.save_screenshot(&f, &s, 8)),
            Err(Error::Capture)
        );
    }
}
