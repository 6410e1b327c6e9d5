use std::fmt::{Display, Formatter};

use bytes::Bytes;
use serde::Deserialize;

/// Pixel encoding tag declared by the capture side for each frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelEncoding {
    /// Packed 8:8:8:8 BGRA, no compression.
    Bgra,
    /// Planar YUV 4:2:0, chroma planes at half resolution.
    Yuv420,
}

impl Display for PixelEncoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            PixelEncoding::Bgra => write!(f, "bgra"),
            PixelEncoding::Yuv420 => write!(f, "yuv420"),
        }
    }
}

/// Layout of a decoder's output buffer. The pipeline only validates that it
/// knows the layout; it never converts between them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputLayout {
    PackedBgra,
    PlanarYuv420,
}

/// Declared format of an incoming raw frame.
///
/// Compared field-by-field to detect a mid-stream format change; replaced
/// wholesale by the pipeline, never mutated in place.
#[derive(Clone, Debug)]
pub struct FrameFormat {
    pub encoding: PixelEncoding,
    pub width: u32,
    pub height: u32,
    /// Pixels per source row, including any capture padding.
    pub stride: u32,
    /// Bytes per source row of the luma (or packed) plane.
    pub pitch: u32,
    pub bpp: u32,
}

impl PartialEq for FrameFormat {
    fn eq(&self, other: &Self) -> bool {
        self.encoding == other.encoding
            && self.width == other.width
            && self.height == other.height
            && self.stride == other.stride
            && self.pitch == other.pitch
            && self.bpp == other.bpp
    }
}

impl Eq for FrameFormat {}

impl FrameFormat {
    /// Expected byte length of one raw source frame in this format.
    pub fn source_len(&self) -> usize {
        let pitch = self.pitch as usize;
        let height = self.height as usize;
        match self.encoding {
            PixelEncoding::Bgra => pitch * height,
            // luma plane plus two half-resolution chroma planes
            PixelEncoding::Yuv420 => pitch * height + (pitch / 2) * (height / 2) * 2,
        }
    }
}

/// One captured frame: declared format plus the raw pixel payload.
#[derive(Clone, Debug)]
pub struct RawFrame {
    pub format: FrameFormat,
    pub data: Bytes,
}

impl RawFrame {
    pub fn new(format: FrameFormat, data: Vec<u8>) -> Self {
        Self {
            format,
            data: Bytes::from(data),
        }
    }
}

impl Display for RawFrame {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(
            f,
            "RawFrame {{ {} {}x{}, {} bytes }}",
            self.format.encoding,
            self.format.width,
            self.format.height,
            self.data.len()
        )
    }
}

/// Severity of an alert forwarded by the capture collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertLevel {
    Info,
    Success,
    Warning,
    Error,
}
