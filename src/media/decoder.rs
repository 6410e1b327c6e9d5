use std::collections::HashMap;

use crate::media::{
    error::{PipeError, Result},
    types::{FrameFormat, OutputLayout, PixelEncoding},
};

/// Pluggable decoding strategy: turns one raw captured frame into a
/// canonical, tightly-packed output buffer.
///
/// `decode` must be callable repeatedly without reallocating as long as the
/// format is unchanged; strategy-private resources are released on drop.
pub trait Decoder: Send {
    fn name(&self) -> &'static str;

    /// Binds the strategy to a declared format. Called once per binding,
    /// before any decode.
    fn initialize(&mut self, format: &FrameFormat) -> Result<()>;

    /// Consumes one raw frame, updating the output buffer in place.
    fn decode(&mut self, raw: &[u8], src_pitch: usize) -> Result<()>;

    /// Layout of the output buffer. Used by the pipeline to validate
    /// support only; no conversion is performed.
    fn output_layout(&self) -> OutputLayout;

    /// Bytes per row of the *output* buffer.
    fn frame_pitch(&self) -> usize;

    /// Current decoded buffer, or `NotReady` if nothing has been decoded
    /// since initialization.
    fn buffer(&self) -> Result<&[u8]>;
}

pub type DecoderFactory = Box<dyn Fn() -> Result<Box<dyn Decoder>> + Send + Sync>;

/// Maps a declared pixel encoding to the strategy that decodes it.
///
/// New strategies are added by registering a factory; the pipeline itself
/// never changes.
pub struct DecoderRegistry {
    factories: HashMap<PixelEncoding, DecoderFactory>,
}

impl DecoderRegistry {
    /// Empty registry: every encoding is unsupported until registered.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with the built-in strategies bound to their encodings.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(PixelEncoding::Bgra, || {
            Ok(Box::new(IdentityDecoder::new()) as Box<dyn Decoder>)
        });
        registry.register(PixelEncoding::Yuv420, || {
            Ok(Box::new(Yuv420Decoder::new()) as Box<dyn Decoder>)
        });
        registry
    }

    pub fn register<F>(&mut self, encoding: PixelEncoding, factory: F)
    where
        F: Fn() -> Result<Box<dyn Decoder>> + Send + Sync + 'static,
    {
        self.factories.insert(encoding, Box::new(factory));
    }

    /// Creates a fresh strategy state for the encoding.
    pub fn create(&self, encoding: PixelEncoding) -> Result<Box<dyn Decoder>> {
        let factory = self
            .factories
            .get(&encoding)
            .ok_or(PipeError::UnsupportedFormat(encoding))?;
        factory()
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ============================================================================
// Built-in strategies
// ============================================================================

/// Passthrough strategy for packed BGRA: rows are copied out of the source
/// pitch into a tightly-packed buffer, nothing else.
pub struct IdentityDecoder {
    row_bytes: usize,
    height: usize,
    buf: Vec<u8>,
    decoded: bool,
}

impl IdentityDecoder {
    pub fn new() -> Self {
        Self {
            row_bytes: 0,
            height: 0,
            buf: Vec::new(),
            decoded: false,
        }
    }
}

impl Default for IdentityDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for IdentityDecoder {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn initialize(&mut self, format: &FrameFormat) -> Result<()> {
        if format.width == 0 || format.height == 0 {
            return Err(PipeError::InitFailed(format!(
                "invalid dimensions {}x{}",
                format.width, format.height
            )));
        }
        if format.bpp % 8 != 0 || format.bpp == 0 {
            return Err(PipeError::InitFailed(format!(
                "unsupported bits per pixel: {}",
                format.bpp
            )));
        }

        self.row_bytes = format.width as usize * (format.bpp as usize / 8);
        self.height = format.height as usize;
        self.buf = vec![0u8; self.row_bytes * self.height];
        self.decoded = false;
        Ok(())
    }

    fn decode(&mut self, raw: &[u8], src_pitch: usize) -> Result<()> {
        if self.height == 0 {
            return Err(PipeError::DecodeFailed("decoder not initialized".to_string()));
        }
        if src_pitch < self.row_bytes {
            return Err(PipeError::DecodeFailed(format!(
                "source pitch {} smaller than row size {}",
                src_pitch, self.row_bytes
            )));
        }
        let needed = src_pitch * (self.height - 1) + self.row_bytes;
        if raw.len() < needed {
            return Err(PipeError::DecodeFailed(format!(
                "short frame: got {} bytes, need {}",
                raw.len(),
                needed
            )));
        }

        for row in 0..self.height {
            let src = &raw[row * src_pitch..row * src_pitch + self.row_bytes];
            let dst = &mut self.buf[row * self.row_bytes..(row + 1) * self.row_bytes];
            dst.copy_from_slice(src);
        }
        self.decoded = true;
        Ok(())
    }

    fn output_layout(&self) -> OutputLayout {
        OutputLayout::PackedBgra
    }

    fn frame_pitch(&self) -> usize {
        self.row_bytes
    }

    fn buffer(&self) -> Result<&[u8]> {
        if !self.decoded {
            return Err(PipeError::NotReady);
        }
        Ok(&self.buf)
    }
}

/// Chroma-subsampled strategy for planar YUV 4:2:0: repacks the padded
/// source planes (Y, then U, then V at half pitch) into tightly-packed
/// planes in a single buffer.
pub struct Yuv420Decoder {
    width: usize,
    height: usize,
    buf: Vec<u8>,
    decoded: bool,
}

impl Yuv420Decoder {
    pub fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            buf: Vec::new(),
            decoded: false,
        }
    }
}

impl Default for Yuv420Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for Yuv420Decoder {
    fn name(&self) -> &'static str {
        "yuv420"
    }

    fn initialize(&mut self, format: &FrameFormat) -> Result<()> {
        if format.width == 0 || format.height == 0 {
            return Err(PipeError::InitFailed(format!(
                "invalid dimensions {}x{}",
                format.width, format.height
            )));
        }
        // 4:2:0 subsampling needs even dimensions
        if format.width % 2 != 0 || format.height % 2 != 0 {
            return Err(PipeError::InitFailed(format!(
                "yuv420 requires even dimensions, got {}x{}",
                format.width, format.height
            )));
        }

        self.width = format.width as usize;
        self.height = format.height as usize;
        self.buf = vec![0u8; self.width * self.height * 3 / 2];
        self.decoded = false;
        Ok(())
    }

    fn decode(&mut self, raw: &[u8], src_pitch: usize) -> Result<()> {
        let (w, h) = (self.width, self.height);
        if h == 0 {
            return Err(PipeError::DecodeFailed("decoder not initialized".to_string()));
        }
        if src_pitch < w {
            return Err(PipeError::DecodeFailed(format!(
                "source pitch {} smaller than width {}",
                src_pitch, w
            )));
        }
        let chroma_pitch = src_pitch / 2;
        let y_src = src_pitch * h;
        let c_src = chroma_pitch * (h / 2);
        if raw.len() < y_src + c_src * 2 {
            return Err(PipeError::DecodeFailed(format!(
                "short frame: got {} bytes, need {}",
                raw.len(),
                y_src + c_src * 2
            )));
        }

        // luma, packed to width
        for row in 0..h {
            let src = &raw[row * src_pitch..row * src_pitch + w];
            self.buf[row * w..(row + 1) * w].copy_from_slice(src);
        }
        // chroma planes, packed to width/2
        let (cw, ch) = (w / 2, h / 2);
        for (plane, base) in [(0, y_src), (1, y_src + c_src)] {
            let dst_base = w * h + plane * cw * ch;
            for row in 0..ch {
                let src = &raw[base + row * chroma_pitch..base + row * chroma_pitch + cw];
                self.buf[dst_base + row * cw..dst_base + (row + 1) * cw].copy_from_slice(src);
            }
        }
        self.decoded = true;
        Ok(())
    }

    fn output_layout(&self) -> OutputLayout {
        OutputLayout::PlanarYuv420
    }

    fn frame_pitch(&self) -> usize {
        // one luma row plus the matching half-row of each chroma plane
        self.width * 3 / 2
    }

    fn buffer(&self) -> Result<&[u8]> {
        if !self.decoded {
            return Err(PipeError::NotReady);
        }
        Ok(&self.buf)
    }
}

#[cfg(test)]
#[path = "decoder_test.rs"]
mod decoder_test;
