use thiserror::Error;

use crate::media::types::PixelEncoding;

/// Errors surfaced by the frame pipeline and decoder strategies.
#[derive(Debug, Error)]
pub enum PipeError {
    /// Strategy-private state could not be allocated.
    #[error("failed to allocate decoder state")]
    AllocationFailed,

    /// No decoder strategy is registered for the declared encoding.
    #[error("unknown/unsupported compression type: {0}")]
    UnsupportedFormat(PixelEncoding),

    /// The decoder rejected the declared format during initialization.
    #[error("failed to initialize decoder: {0}")]
    InitFailed(String),

    /// One raw frame could not be decoded; the decoder itself stays usable.
    #[error("decode returned failure: {0}")]
    DecodeFailed(String),

    /// Delivery was attempted with no decoded buffer available.
    #[error("no decoded buffer is ready")]
    NotReady,

    /// The pipeline has been torn down or is otherwise unusable.
    #[error("pipeline is not in a usable state")]
    InvalidState,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipeError>;
