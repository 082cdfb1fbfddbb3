//! Packet-level decoder owning all mutable state of one stream.

use log::{debug, warn};

use crate::{
    config::{CodecParams, DecoderConfig},
    error::{Error, Result},
    frame::FrameDecoder,
    superframe::{BitReservoir, MAX_FRAMES_PER_SUPERFRAME, decode_single_frame, decode_superframe},
};

/// What one [`Decoder::decode`] call produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOutput {
    /// Interleaved `i16` values written to the output buffer.
    pub samples: usize,
    pub frames: usize,
    /// Input bytes taken from the packet.
    pub bytes_consumed: usize,
    /// Bytes carried over in the bit reservoir for the next packet.
    pub reservoir_len: usize,
}

/// WMA v1/v2 decoder.
///
/// Output is always two interleaved slots per sample; mono streams are
/// written to both.
#[derive(Debug)]
pub struct Decoder {
    frames: FrameDecoder,
    reservoir: BitReservoir,
}

impl Decoder {
    /// # Errors
    ///
    /// * `InitFailed` - If `params` describe an unsupported stream or the
    ///   shared tables could not be built
    pub fn new(params: &CodecParams) -> Result<Self> {
        let config = DecoderConfig::from_params(params)?;
        let frames = FrameDecoder::new(&config)?;
        Ok(Self {
            frames,
            reservoir: BitReservoir::new(),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &DecoderConfig {
        self.frames.config()
    }

    /// Size of an output buffer that fits any single packet.
    #[must_use]
    pub const fn max_output_samples(&self) -> usize {
        let config = self.frames.config();
        let frames = if config.use_bit_reservoir {
            MAX_FRAMES_PER_SUPERFRAME
        } else {
            1
        };
        frames * config.frame_len * 2
    }

    /// Decodes one packet into interleaved 16-bit PCM.
    ///
    /// Only the first `block_align` bytes are used. An empty packet marks the
    /// end of the stream and drops any partial frame held over.
    ///
    /// # Errors
    ///
    /// * `InsufficientInput` - If the packet is shorter than `block_align`;
    ///   nothing changes
    /// * `OutputBufferTooSmall` - If `output` cannot hold the packet's frames;
    ///   nothing changes
    /// * `CorruptStream` - If the packet is malformed; the bit reservoir is
    ///   dropped and the next packet decodes normally
    pub fn decode(&mut self, packet: &[u8], output: &mut [i16]) -> Result<DecodeOutput> {
        if packet.is_empty() {
            if !self.reservoir.is_empty() {
                debug!(
                    "End of stream, dropping {} reservoir bytes",
                    self.reservoir.len()
                );
            }
            self.reservoir.clear();
            return Ok(DecodeOutput::default());
        }

        let block_align = self.frames.config().block_align;
        if packet.len() < block_align {
            return Err(Error::InsufficientInput {
                got: packet.len(),
                needed: block_align,
            });
        }
        let packet = &packet[..block_align];

        let result = if self.frames.config().use_bit_reservoir {
            decode_superframe(&mut self.frames, &mut self.reservoir, packet, output)
        } else {
            decode_single_frame(&mut self.frames, packet, output)
        };

        match result {
            Ok(decoded) => Ok(DecodeOutput {
                samples: decoded.frames * self.frames.config().frame_len * 2,
                frames: decoded.frames,
                bytes_consumed: block_align,
                reservoir_len: self.reservoir.len(),
            }),
            Err(e @ Error::CorruptStream(_)) => {
                warn!(
                    "Discarding packet ({e}), dropping {} reservoir bytes",
                    self.reservoir.len()
                );
                self.reservoir.clear();
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Returns the decoder to its freshly created state, as on a seek: the
    /// bit reservoir, overlap buffers, envelopes, block lengths and noise
    /// position are all reset.
    pub fn flush(&mut self) {
        debug!("Flushing decoder state");
        self.reservoir.clear();
        self.frames.reset();
    }

    /// Bytes currently held in the bit reservoir.
    #[must_use]
    pub fn reservoir_len(&self) -> usize {
        self.reservoir.len()
    }
}
