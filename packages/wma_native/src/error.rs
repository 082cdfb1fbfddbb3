use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while configuring the decoder or decoding packets.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The stream parameters or codec-private data can not be used. The
    /// decoder instance must not be used after this error.
    #[error("Decoder initialization failed: {0}")]
    InitFailed(String),

    /// The bitstream is malformed. Only the current frame is lost; the bit
    /// reservoir is cleared and the next packet is decoded normally.
    #[error("Corrupt stream: {0}")]
    CorruptStream(String),

    /// The packet is shorter than one coded unit.
    #[error("Insufficient input: got {got} bytes, need {needed}")]
    InsufficientInput { got: usize, needed: usize },

    /// The caller supplied PCM buffer can not hold the decoded samples.
    #[error("Output buffer too small: got {got} samples, need {needed}")]
    OutputBufferTooSmall { got: usize, needed: usize },
}

impl Error {
    /// Returns `true` when the stream can continue with the next packet.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InitFailed(_))
    }
}
