use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;

mod config;
mod media;

use media::{decoder::DecoderRegistry, pipe::Pipe, sink::StdoutSink, types::FrameFormat};

fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .filter_module("rawview", log::LevelFilter::Debug)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let config = config::config();
    let format = config.input.to_frame_format();
    log::info!(
        "rawview: {} {}x{} in, flushing every {}ms",
        format.encoding,
        format.width,
        format.height,
        config.tick_ms
    );

    let pipe = Arc::new(Pipe::new(DecoderRegistry::with_defaults()));
    pipe.initialize()?;

    let cancel = CancellationToken::new();

    let reader = tokio::spawn(read_frames(pipe.clone(), format, cancel.clone()));
    let render = tokio::spawn(render_loop(pipe.clone(), config.tick_ms, cancel.clone()));

    tokio::select! {
        _ = cancel.cancelled() => {}
        _ = tokio::signal::ctrl_c() => {
            cancel.cancel();
        }
    }

    let _ = reader.await;
    let _ = render.await;
    pipe.deinitialize();
    Ok(())
}

/// Reads headerless raw frames from stdin and feeds them to the pipeline.
/// Frame geometry comes from the config; the stream itself carries none.
async fn read_frames(pipe: Arc<Pipe>, format: FrameFormat, cancel: CancellationToken) {
    let mut stdin = tokio::io::stdin();
    let mut buf = vec![0u8; format.source_len()];

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            read = stdin.read_exact(&mut buf) => {
                match read {
                    Ok(_) => {
                        if let Err(e) = pipe.accept_frame(&format, &buf) {
                            log::error!("accept frame failed: {}", e);
                        }
                    }
                    Err(e) => {
                        if e.kind() != std::io::ErrorKind::UnexpectedEof {
                            log::error!("stdin read failed: {}", e);
                        }
                        cancel.cancel();
                        break;
                    }
                }
            }
        }
    }
}

/// Drives the periodic flush tick against the stdout sink.
async fn render_loop(pipe: Arc<Pipe>, tick_ms: u64, cancel: CancellationToken) {
    let mut sink = StdoutSink::new();
    let mut tick = tokio::time::interval(Duration::from_millis(tick_ms));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tick.tick() => {
                if let Err(e) = pipe.flush(&mut sink) {
                    log::error!("flush failed: {}", e);
                }
            }
        }
    }

    // drain whatever was decoded after the last tick
    if let Err(e) = pipe.flush(&mut sink) {
        log::debug!("final flush: {}", e);
    }
}
