use std::sync::Mutex;

use crate::media::{
    decoder::{Decoder, DecoderRegistry},
    error::{PipeError, Result},
    sink::Sink,
    types::{AlertLevel, FrameFormat, OutputLayout, RawFrame},
};

/// Live decoder binding: strategy state plus the derived delivery size.
/// Exactly zero or one of these exists at a time; `generation` ties pending
/// updates to the binding whose decode produced them.
struct Binding {
    decoder: Box<dyn Decoder>,
    tex_size: usize,
    generation: u64,
}

/// Format domain: declared format, reconfigure latch and the decoder
/// binding. Held across the whole reconfiguration sequence and across
/// buffer retrieval + delivery, so a reconfigure can never swap the decoder
/// out from under a delivery in progress.
struct FormatState {
    format: Option<FrameFormat>,
    reconfigure: bool,
    binding: Option<Binding>,
    generation: u64,
    closed: bool,
}

/// Data domain: the single-slot pending-update flag plus the generation of
/// the binding that decoded it. Serializes the decode call against flush's
/// clear-and-check step.
struct DataState {
    frame_update: bool,
    generation: u64,
}

/// Frame-consumption pipeline: accepts raw captured frames on one thread,
/// flushes the latest decoded buffer to a sink on another.
///
/// There is no frame queue. A frame accepted before the previous one was
/// flushed supersedes it; the pipeline favors latest-frame delivery over
/// completeness.
pub struct Pipe {
    registry: DecoderRegistry,
    format: Mutex<FormatState>,
    sync: Mutex<DataState>,
}

impl Pipe {
    pub fn new(registry: DecoderRegistry) -> Self {
        Self {
            registry,
            format: Mutex::new(FormatState {
                format: None,
                reconfigure: false,
                binding: None,
                generation: 0,
                closed: false,
            }),
            sync: Mutex::new(DataState {
                frame_update: false,
                generation: 0,
            }),
        }
    }

    /// Surface setup hook for the display collaborator. Nothing to do for a
    /// byte-stream sink.
    pub fn initialize(&self) -> Result<()> {
        Ok(())
    }

    /// Tears down the active decoder binding and marks the pipeline
    /// unusable. Safe to call repeatedly, configured or not.
    pub fn deinitialize(&self) {
        let mut fs = self.format.lock().unwrap();
        // dropping the binding releases the strategy state exactly once
        fs.binding = None;
        fs.format = None;
        fs.reconfigure = false;
        fs.closed = true;
        drop(fs);

        self.sync.lock().unwrap().frame_update = false;
    }

    /// Accepts one captured frame.
    ///
    /// A frame whose declared format differs from the stored one only
    /// records the change and sets the reconfigure latch; it is dropped,
    /// not decoded, since decoding it needs the new decoder to exist first.
    /// Frames arriving while a reconfigure is pending are dropped too.
    pub fn accept_frame(&self, format: &FrameFormat, raw: &[u8]) -> Result<()> {
        {
            let mut fs = self.format.lock().unwrap();
            if fs.closed {
                return Err(PipeError::InvalidState);
            }
            if fs.reconfigure {
                // a reconfigure may sit unresolved across many frames when
                // it keeps failing; keep the stored format current so the
                // next attempt negotiates the latest declaration
                if fs.format.as_ref() != Some(format) {
                    fs.format = Some(format.clone());
                }
                return Ok(());
            }
            if fs.binding.is_none() || fs.format.as_ref() != Some(format) {
                fs.format = Some(format.clone());
                fs.reconfigure = true;
                return Ok(());
            }
        }

        // lock order: data before format, matching the decode path below
        let mut ds = self.sync.lock().unwrap();
        let mut fs = self.format.lock().unwrap();
        let binding = fs.binding.as_mut().ok_or(PipeError::InvalidState)?;
        binding.decoder.decode(raw, format.pitch as usize)?;
        ds.frame_update = true;
        ds.generation = binding.generation;
        Ok(())
    }

    /// Convenience entry point for the capture collaborator.
    pub fn on_frame_event(&self, frame: &RawFrame) -> Result<()> {
        self.accept_frame(&frame.format, &frame.data)
    }

    /// Flushes the pending decoded buffer, if any, to the sink.
    ///
    /// Runs the lazy reconfiguration first when the latch is set; a failed
    /// reconfiguration is logged and reported as success, leaving the latch
    /// set so the next flush retries (known busy-retry behavior). A pending
    /// update decoded by a binding that a reconfigure has since torn down
    /// is discarded, never delivered.
    pub fn flush(&self, sink: &mut dyn Sink) -> Result<()> {
        match self.configure() {
            Ok(()) => {}
            Err(PipeError::InvalidState) => return Err(PipeError::InvalidState),
            Err(e) => {
                log::error!("decoder reconfiguration failed: {}", e);
                return Ok(());
            }
        }

        let pending_generation = {
            let mut ds = self.sync.lock().unwrap();
            if !ds.frame_update {
                return Ok(());
            }
            ds.frame_update = false;
            ds.generation
        };

        let fs = self.format.lock().unwrap();
        let binding = fs.binding.as_ref().ok_or(PipeError::InvalidState)?;
        if binding.generation != pending_generation {
            // the pending buffer belonged to a binding torn down by a
            // reconfigure since; it is superseded, not an error
            return Ok(());
        }
        let data = binding.decoder.buffer()?;
        let data = data.get(..binding.tex_size).ok_or(PipeError::NotReady)?;
        sink.deliver(data)?;
        Ok(())
    }

    /// Rebuilds the decoder binding if the reconfigure latch is set.
    ///
    /// Any failure leaves the pipeline unconfigured with the latch still
    /// set; the latch is cleared only on success.
    fn configure(&self) -> Result<()> {
        let mut fs = self.format.lock().unwrap();
        if fs.closed {
            return Err(PipeError::InvalidState);
        }
        if !fs.reconfigure {
            return Ok(());
        }

        // tear down the previous binding before building the new one
        fs.binding = None;

        let format = fs.format.clone().ok_or(PipeError::InvalidState)?;
        let mut decoder = self.registry.create(format.encoding)?;
        decoder.initialize(&format)?;

        // every layout the enum can name is deliverable as raw bytes; the
        // exhaustive match keeps this honest when a layout is added
        match decoder.output_layout() {
            OutputLayout::PackedBgra | OutputLayout::PlanarYuv420 => {}
        }

        let tex_size = format.height as usize * decoder.frame_pitch();
        log::info!(
            "using decoder: {} ({} {}x{}, {} bytes/frame)",
            decoder.name(),
            format.encoding,
            format.width,
            format.height,
            tex_size
        );

        fs.generation += 1;
        fs.binding = Some(Binding {
            decoder,
            tex_size,
            generation: fs.generation,
        });
        fs.reconfigure = false;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Pass-through notifications from the capture collaborator
    // ------------------------------------------------------------------------

    pub fn on_resize(&self, width: u32, height: u32) {
        log::info!("new render window size: {}x{}", width, height);
    }

    pub fn on_mouse_shape(
        &self,
        _width: u32,
        _height: u32,
        _pitch: u32,
        _data: &[u8],
    ) -> Result<()> {
        Ok(())
    }

    pub fn on_mouse_event(&self, _visible: bool, _x: i32, _y: i32) -> Result<()> {
        Ok(())
    }

    pub fn on_alert(&self, level: AlertLevel, message: &str) {
        match level {
            AlertLevel::Info | AlertLevel::Success => log::info!("alert: {}", message),
            AlertLevel::Warning => log::warn!("alert: {}", message),
            AlertLevel::Error => log::error!("alert: {}", message),
        }
    }
}

#[cfg(test)]
#[path = "pipe_test.rs"]
mod pipe_test;
