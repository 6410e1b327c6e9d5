use std::sync::LazyLock;

use serde::Deserialize;

use crate::media::types::{FrameFormat, PixelEncoding};

/// Geometry of the raw frames arriving on stdin. The inbound stream carries
/// no self-description, so this is the out-of-band channel.
#[derive(Clone, Debug, Deserialize)]
pub struct InputFormat {
    pub encoding: PixelEncoding,
    pub width: u32,
    pub height: u32,
    /// Pixels per source row; defaults to `width`.
    pub stride: Option<u32>,
    /// Bytes per source row; defaults to the packed row size.
    pub pitch: Option<u32>,
    /// Defaults per encoding: 32 for bgra, 12 for yuv420.
    pub bpp: Option<u32>,
}

impl InputFormat {
    pub fn to_frame_format(&self) -> FrameFormat {
        let bpp = self.bpp.unwrap_or(match self.encoding {
            PixelEncoding::Bgra => 32,
            PixelEncoding::Yuv420 => 12,
        });
        let pitch = self.pitch.unwrap_or(match self.encoding {
            PixelEncoding::Bgra => self.width * (bpp / 8),
            PixelEncoding::Yuv420 => self.width,
        });
        FrameFormat {
            encoding: self.encoding,
            width: self.width,
            height: self.height,
            stride: self.stride.unwrap_or(self.width),
            pitch,
            bpp,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ViewConfig {
    pub input: InputFormat,
    /// Flush tick period in milliseconds.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

fn default_tick_ms() -> u64 {
    33
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            input: InputFormat {
                encoding: PixelEncoding::Bgra,
                width: 640,
                height: 480,
                stride: None,
                pitch: None,
                bpp: None,
            },
            tick_ms: default_tick_ms(),
        }
    }
}

impl ViewConfig {
    /// Loads the config from the JSON file named by `RAWVIEW_CONFIG`, or
    /// falls back to defaults when the variable is unset.
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var("RAWVIEW_CONFIG") {
            Ok(path) => {
                let raw = std::fs::read_to_string(&path)?;
                Ok(serde_json::from_str(&raw)?)
            }
            Err(_) => Ok(Self::default()),
        }
    }
}

pub fn config() -> &'static ViewConfig {
    static CONFIG: LazyLock<ViewConfig> = LazyLock::new(|| {
        ViewConfig::load().unwrap_or_else(|e| {
            log::warn!("failed to load config, using defaults: {:#}", e);
            ViewConfig::default()
        })
    });
    &CONFIG
}
