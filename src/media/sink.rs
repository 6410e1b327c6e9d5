use std::{
    io::{self, Write},
    pin::Pin,
    sync::{Arc, Mutex},
    task::{Context, Poll},
};

use bytes::Bytes;
use futures::Stream;

/// Consumer of decoded frame bytes. `deliver` is invoked once per successful
/// flush with exactly one tightly-packed output buffer.
///
/// It runs inside the pipeline's format critical section, so implementations
/// must not block unboundedly; slow consumers belong behind `ByteSinkSource`.
pub trait Sink: Send {
    fn deliver(&mut self, data: &[u8]) -> io::Result<()>;
}

/// Writes each delivered buffer straight to stdout, no framing. The reader
/// on the other end must already know width/height/layout out-of-band.
pub struct StdoutSink {
    out: io::Stdout,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for StdoutSink {
    fn deliver(&mut self, data: &[u8]) -> io::Result<()> {
        let mut lock = self.out.lock();
        lock.write_all(data)?;
        lock.flush()
    }
}

/// Channel-backed sink bridging the flush thread to an async consumer.
///
/// Delivery never blocks: when the consumer lags behind the channel
/// capacity, the frame is dropped (latest-frame delivery, no backpressure).
pub struct ByteSinkSource {
    pub writer: tokio::sync::mpsc::Sender<Bytes>,
    inner: Mutex<tokio::sync::mpsc::Receiver<Bytes>>,
}

impl ByteSinkSource {
    pub fn new() -> Self {
        Self::with_capacity(32)
    }

    pub fn with_capacity(buffer_size: usize) -> Self {
        let (writer, receiver) = tokio::sync::mpsc::channel(buffer_size);
        Self {
            writer,
            inner: Mutex::new(receiver),
        }
    }
}

impl Default for ByteSinkSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ByteSinkSource {
    fn deliver(&mut self, data: &[u8]) -> io::Result<()> {
        deliver_via(&self.writer, data)
    }
}

impl Sink for Arc<ByteSinkSource> {
    fn deliver(&mut self, data: &[u8]) -> io::Result<()> {
        deliver_via(&self.writer, data)
    }
}

fn deliver_via(writer: &tokio::sync::mpsc::Sender<Bytes>, data: &[u8]) -> io::Result<()> {
    use tokio::sync::mpsc::error::TrySendError;

    match writer.try_send(Bytes::copy_from_slice(data)) {
        Ok(()) => Ok(()),
        Err(TrySendError::Full(_)) => {
            log::warn!("sink channel full, dropping {} bytes", data.len());
            Ok(())
        }
        Err(TrySendError::Closed(_)) => Err(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "sink consumer gone",
        )),
    }
}

/// Wrapper to use `Arc<ByteSinkSource>` as Stream (orphan rule workaround).
pub struct ByteSinkSourceStream(pub Arc<ByteSinkSource>);

impl Stream for ByteSinkSourceStream {
    type Item = Bytes;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut guard = self.0.inner.lock().unwrap();
        guard.poll_recv(cx)
    }
}

impl ByteSinkSource {
    /// Returns a stream of delivered buffers. Use this when you have
    /// `Arc<ByteSinkSource>`.
    pub fn as_stream(this: Arc<Self>) -> ByteSinkSourceStream {
        ByteSinkSourceStream(this)
    }
}
