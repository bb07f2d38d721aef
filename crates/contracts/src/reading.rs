//! Reading - sensor output
//!
//! Raw readings produced by `Sensor::get()` and the sequenced `Sample`
//! wrapper published through the freshness buffers.

use std::fmt;
use std::time::Instant;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Frame resolution in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
pub struct Resolution {
    /// Frame width
    #[validate(range(min = 1))]
    pub width: u32,

    /// Frame height
    #[validate(range(min = 1))]
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// Packed 8-bit RGB, 3 bytes per pixel
    Rgb8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgb8 => 3,
        }
    }
}

/// Image frame
///
/// Pixel bytes are shared, so cloning a frame into the last-known cache does
/// not copy the image.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Frame width
    pub width: u32,

    /// Frame height
    pub height: u32,

    /// Pixel format
    pub format: PixelFormat,

    /// Row-major pixel data
    pub data: Bytes,
}

impl Frame {
    /// Build a frame, checking the buffer length against the resolution
    pub fn new(resolution: Resolution, data: impl Into<Bytes>) -> Option<Self> {
        let data = data.into();
        let expected = resolution.area() * PixelFormat::Rgb8.bytes_per_pixel();
        (data.len() == expected).then_some(Self {
            width: resolution.width,
            height: resolution.height,
            format: PixelFormat::Rgb8,
            data,
        })
    }

    /// All-black frame, the zero value of a camera reading
    pub fn black(resolution: Resolution) -> Self {
        let len = resolution.area() * PixelFormat::Rgb8.bytes_per_pixel();
        Self {
            width: resolution.width,
            height: resolution.height,
            format: PixelFormat::Rgb8,
            data: Bytes::from(vec![0u8; len]),
        }
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    /// RGB value at (x, y), `None` outside the frame
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        self.data
            .get(idx..idx + 3)
            .map(|p| [p[0], p[1], p[2]])
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Sensor reading
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reading {
    /// Monotonic counter from a numeric generator
    Counter(u64),

    /// Image from a camera source
    Frame(Frame),
}

impl Reading {
    pub fn as_counter(&self) -> Option<u64> {
        match self {
            Reading::Counter(v) => Some(*v),
            Reading::Frame(_) => None,
        }
    }

    pub fn as_frame(&self) -> Option<&Frame> {
        match self {
            Reading::Frame(frame) => Some(frame),
            Reading::Counter(_) => None,
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Counter(v) => write!(f, "{v}"),
            Reading::Frame(frame) => write!(f, "frame {}", frame.resolution()),
        }
    }
}

/// Reading stamped by its acquisition loop
#[derive(Debug, Clone)]
pub struct Sample {
    /// Per-sensor publish sequence, starts at 1 and strictly increases
    pub seq: u64,

    /// When `Sensor::get()` returned
    pub captured_at: Instant,

    /// Payload
    pub reading: Reading,
}

impl Sample {
    pub fn new(seq: u64, reading: Reading) -> Self {
        Self {
            seq,
            captured_at: Instant::now(),
            reading,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_length_checked() {
        let res = Resolution::new(4, 2);
        assert!(Frame::new(res, vec![0u8; 24]).is_some());
        assert!(Frame::new(res, vec![0u8; 23]).is_none());
    }

    #[test]
    fn test_black_frame_pixels() {
        let frame = Frame::black(Resolution::new(3, 3));
        assert_eq!(frame.pixel(2, 2), Some([0, 0, 0]));
        assert_eq!(frame.pixel(3, 0), None);
    }

    #[test]
    fn test_reading_display() {
        assert_eq!(Reading::Counter(42).to_string(), "42");
        let frame = Frame::black(Resolution::new(640, 480));
        assert_eq!(Reading::Frame(frame).to_string(), "frame 640x480");
    }
}
