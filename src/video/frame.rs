//! Decoded frame and stream geometry types.

use crate::error::{Error, Result};
use serde::Serialize;

/// Exact frame rate as a rational number of frames per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameRate {
    /// Numerator.
    pub num: i32,
    /// Denominator.
    pub den: i32,
}

impl FrameRate {
    /// Create a frame rate of `num / den` frames per second.
    pub const fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    /// Whether both terms are positive.
    pub const fn is_valid(self) -> bool {
        self.num > 0 && self.den > 0
    }

    /// Frames per second as a float.
    pub fn as_f64(self) -> f64 {
        if self.den == 0 {
            return 0.0;
        }
        f64::from(self.num) / f64::from(self.den)
    }

    /// Closest rate whose terms are both at most `max`.
    ///
    /// Walks the continued-fraction convergents of `num / den` and takes the
    /// best semiconvergent once a term would exceed `max`. Exact rates that
    /// already fit are only reduced to lowest terms.
    pub fn limited(self, max: i32) -> Self {
        if !self.is_valid() || max < 1 {
            return self;
        }
        let divisor = gcd(self.num, self.den);
        let (num, den) = (i64::from(self.num / divisor), i64::from(self.den / divisor));
        let max = i64::from(max);
        if num <= max && den <= max {
            return Self::from_terms(num, den);
        }

        let (mut prev_n, mut prev_d) = (0_i64, 1_i64);
        let (mut best_n, mut best_d) = (1_i64, 0_i64);
        let (mut n, mut d) = (num, den);
        while d != 0 {
            let quotient = n / d;
            let (next_n, next_d) = (quotient * best_n + prev_n, quotient * best_d + prev_d);
            if next_n > max || next_d > max {
                let mut k = quotient;
                if best_n > 0 {
                    k = k.min((max - prev_n) / best_n);
                }
                if best_d > 0 {
                    k = k.min((max - prev_d) / best_d);
                }
                let (semi_n, semi_d) = (k * best_n + prev_n, k * best_d + prev_d);
                if k > 0 && (best_d == 0 || closer(num, den, (semi_n, semi_d), (best_n, best_d))) {
                    (best_n, best_d) = (semi_n, semi_d);
                }
                break;
            }
            (prev_n, prev_d, best_n, best_d) = (best_n, best_d, next_n, next_d);
            (n, d) = (d, n - quotient * d);
        }
        Self::from_terms(best_n, best_d)
    }

    fn from_terms(num: i64, den: i64) -> Self {
        Self {
            num: i32::try_from(num).unwrap_or(i32::MAX),
            den: i32::try_from(den).unwrap_or(i32::MAX),
        }
    }
}

fn gcd(mut a: i32, mut b: i32) -> i32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Whether `a` approximates `num / den` strictly better than `b`.
fn closer(num: i64, den: i64, a: (i64, i64), b: (i64, i64)) -> bool {
    let error = |(n, d): (i64, i64)| {
        (i128::from(num) * i128::from(d) - i128::from(den) * i128::from(n)).abs()
    };
    error(a) * i128::from(b.1) < error(b) * i128::from(a.1)
}

impl std::fmt::Display for FrameRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

/// Resolution and frame rate of a video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VideoGeometry {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frame rate.
    pub frame_rate: FrameRate,
}

impl VideoGeometry {
    /// Build a geometry, rejecting zero dimensions or a non-positive rate.
    pub fn new(width: u32, height: u32, frame_rate: FrameRate) -> Result<Self> {
        if width == 0 || height == 0 || !frame_rate.is_valid() {
            return Err(Error::InvalidGeometry {
                width,
                height,
                fps_num: frame_rate.num,
                fps_den: frame_rate.den,
            });
        }
        Ok(Self {
            width,
            height,
            frame_rate,
        })
    }

    /// Byte length of one packed RGB24 frame.
    pub const fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

/// A single decoded frame, packed RGB24, row-major, no stride padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    /// Sequential index in the stream, starting at 0.
    pub index: u64,
}

impl Frame {
    /// Wrap an RGB24 buffer, checking its length against the dimensions.
    pub fn new(width: u32, height: u32, data: Vec<u8>, index: u64) -> Result<Self> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(Error::FrameBufferSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            index,
        })
    }

    /// Frame width in pixels.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGB24 bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// RGB value at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 3;
        Some([
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
        ])
    }

    /// Check the frame against a stream geometry.
    pub fn check_geometry(&self, geometry: &VideoGeometry) -> Result<()> {
        if self.width != geometry.width || self.height != geometry.height {
            return Err(Error::FrameGeometryMismatch {
                width: geometry.width,
                height: geometry.height,
                actual_width: self.width,
                actual_height: self.height,
            });
        }
        Ok(())
    }

    /// Move the pixel buffer out, leaving the frame empty until it is restored
    /// with [`Frame::restore_data`].
    pub(crate) fn take_data(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.data)
    }

    /// Put back a buffer taken with [`Frame::take_data`].
    pub(crate) fn restore_data(&mut self, data: Vec<u8>) {
        debug_assert_eq!(
            data.len(),
            self.width as usize * self.height as usize * 3,
            "restored buffer must keep the frame size"
        );
        self.data = data;
    }
}
