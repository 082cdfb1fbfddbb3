//! Superframe parsing and the bit reservoir.
//!
//! With the bit reservoir enabled, a packet starts with a small header and
//! frames may straddle packet boundaries. The tail of each packet is kept and
//! completed by the leading `bit_offset` bits of the next one. A packet in
//! which no frame ends is appended to the reservoir whole.

use log::{debug, trace};

use crate::{
    bitstream::BitReader,
    config::MAX_CODED_SUPERFRAME_SIZE,
    error::{Error, Result},
    frame::FrameDecoder,
};

/// Upper bound on frames a single superframe can yield.
pub const MAX_FRAMES_PER_SUPERFRAME: usize = 15;

/// Bytes of a partial frame carried over from the previous packet.
#[derive(Debug, Clone, Default)]
pub struct BitReservoir {
    bytes: Vec<u8>,
    /// Bits to skip at the start of `bytes`, `0..8`.
    bit_offset: usize,
}

impl BitReservoir {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bytes: Vec::with_capacity(MAX_CODED_SUPERFRAME_SIZE + 8),
            bit_offset: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[must_use]
    pub const fn bit_offset(&self) -> usize {
        self.bit_offset
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
        self.bit_offset = 0;
    }

    /// Appends `count` bits read from `reader`, MSB first, zero padding the
    /// last byte.
    #[allow(clippy::cast_possible_truncation)]
    fn append_bits(&mut self, reader: &mut BitReader<'_>, count: usize) -> Result<()> {
        if self.bytes.len() + count.div_ceil(8) > MAX_CODED_SUPERFRAME_SIZE {
            return Err(Error::CorruptStream(format!(
                "bit reservoir overflow: {} + {count} bits",
                self.bytes.len()
            )));
        }
        let mut left = count;
        while left >= 8 {
            self.bytes.push(reader.read_bits(8)? as u8);
            left -= 8;
        }
        if left > 0 {
            let bits = left as u32;
            self.bytes.push((reader.read_bits(bits)? << (8 - bits)) as u8);
        }
        Ok(())
    }

    fn extend(&mut self, bytes: &[u8]) -> Result<()> {
        if self.bytes.len() + bytes.len() > MAX_CODED_SUPERFRAME_SIZE {
            return Err(Error::CorruptStream(format!(
                "bit reservoir overflow: {} + {} bytes",
                self.bytes.len(),
                bytes.len()
            )));
        }
        self.bytes.extend_from_slice(bytes);
        Ok(())
    }

    fn store(&mut self, tail: &[u8], bit_offset: usize) -> Result<()> {
        if tail.len() > MAX_CODED_SUPERFRAME_SIZE {
            return Err(Error::CorruptStream(format!(
                "superframe tail of {} bytes exceeds the reservoir",
                tail.len()
            )));
        }
        self.bytes.clear();
        self.bytes.extend_from_slice(tail);
        self.bit_offset = bit_offset;
        Ok(())
    }
}

/// Parsed superframe header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuperframeHeader {
    /// Frames that end in this packet, counting one completed from the
    /// reservoir.
    pub frames_ending: usize,
    /// Bits at the start of the frame data that belong to the carried frame.
    /// Absent, and zero, when no frame ends in the packet.
    pub bit_offset: usize,
    /// Width of the header in bits.
    pub header_bits: usize,
}

impl SuperframeHeader {
    /// `carried` tells whether a partial frame is held in the reservoir.
    ///
    /// # Errors
    ///
    /// * `CorruptStream` - If the frame count is zero with nothing carried or
    ///   the header does not fit in the packet
    pub fn parse(reader: &mut BitReader<'_>, byte_offset_bits: u32, carried: bool) -> Result<Self> {
        reader.skip_bits(4)?;
        let frames_ending = reader.read_bits(4)? as usize;
        if frames_ending == 0 && !carried {
            return Err(Error::CorruptStream(
                "superframe declares no frames".to_string(),
            ));
        }
        if frames_ending == usize::from(!carried) {
            if reader.bits_left() <= 8 {
                return Err(Error::CorruptStream(format!(
                    "continuation packet of {} bits is too short",
                    reader.bits_consumed() + reader.bits_left()
                )));
            }
            return Ok(Self {
                frames_ending,
                bit_offset: 0,
                header_bits: reader.bits_consumed(),
            });
        }
        let bit_offset = reader.read_bits(byte_offset_bits + 3)? as usize;
        let header_bits = reader.bits_consumed();
        if bit_offset > reader.bits_left() {
            return Err(Error::CorruptStream(format!(
                "superframe bit offset {bit_offset} exceeds the packet"
            )));
        }
        Ok(Self {
            frames_ending,
            bit_offset,
            header_bits,
        })
    }

    /// Frames decodable from this packet given whether a partial frame is
    /// held in the reservoir.
    #[must_use]
    pub const fn frame_count(&self, carried: bool) -> usize {
        if carried {
            self.frames_ending
        } else {
            self.frames_ending.saturating_sub(1)
        }
    }
}

/// Result of decoding one packet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuperframeOutput {
    pub frames: usize,
}

fn check_output(frames: usize, frame_samples: usize, out: &[i16]) -> Result<()> {
    let needed = frames * frame_samples;
    if out.len() < needed {
        return Err(Error::OutputBufferTooSmall {
            got: out.len(),
            needed,
        });
    }
    Ok(())
}

/// Decodes a superframe packet of exactly `block_align` bytes.
///
/// # Errors
///
/// * `OutputBufferTooSmall` - If `out` cannot hold every frame; no state is
///   changed
/// * `CorruptStream` - If the packet is malformed; the caller drops the
///   reservoir
pub fn decode_superframe(
    frames: &mut FrameDecoder,
    reservoir: &mut BitReservoir,
    packet: &[u8],
    out: &mut [i16],
) -> Result<SuperframeOutput> {
    let config = frames.config();
    let frame_samples = config.frame_len * 2;
    let byte_offset_bits = config.byte_offset_bits;

    let mut reader = BitReader::new(packet);
    let carried = !reservoir.is_empty();
    let header = SuperframeHeader::parse(&mut reader, byte_offset_bits, carried)?;
    let frame_count = header.frame_count(carried);

    if frame_count == 0 {
        reservoir.extend(&packet[header.header_bits >> 3..])?;
        debug!(
            "Superframe ends no frame, {} bytes carried",
            reservoir.len()
        );
        return Ok(SuperframeOutput { frames: 0 });
    }
    check_output(frame_count, frame_samples, out)?;

    trace!(
        "Superframe: {} frames ending, bit offset {}, reservoir {} bytes",
        header.frames_ending,
        header.bit_offset,
        reservoir.len()
    );

    let mut decoded = 0;

    if carried {
        let stored_bytes = reservoir.len();
        reservoir.append_bits(&mut reader, header.bit_offset)?;
        let mut carried_reader =
            BitReader::with_bit_len(&reservoir.bytes, stored_bytes * 8 + header.bit_offset);
        carried_reader.skip_bits(reservoir.bit_offset)?;
        frames.decode_frame(&mut carried_reader, &mut out[..frame_samples])?;
        decoded += 1;
    }

    let start = header.bit_offset + header.header_bits;
    let base = start & !7;
    let mut sub = BitReader::new(&packet[base >> 3..]);
    sub.skip_bits(start & 7)?;
    frames.set_reset_block_lengths();

    while decoded < frame_count {
        let from = decoded * frame_samples;
        frames.decode_frame(&mut sub, &mut out[from..from + frame_samples])?;
        decoded += 1;
    }

    let tail_start = sub.bits_consumed() + base;
    reservoir.store(&packet[tail_start >> 3..], tail_start & 7)?;

    debug!(
        "Decoded superframe: {decoded} frames, {} bytes carried",
        reservoir.len()
    );
    Ok(SuperframeOutput { frames: decoded })
}

/// Decodes a packet holding exactly one frame, without a superframe header.
///
/// # Errors
///
/// * `OutputBufferTooSmall` - If `out` cannot hold the frame
/// * `CorruptStream` - If the frame is malformed
pub fn decode_single_frame(
    frames: &mut FrameDecoder,
    packet: &[u8],
    out: &mut [i16],
) -> Result<SuperframeOutput> {
    let frame_samples = frames.config().frame_len * 2;
    check_output(1, frame_samples, out)?;

    let mut reader = BitReader::new(packet);
    frames.decode_frame(&mut reader, &mut out[..frame_samples])?;
    trace!("Decoded single frame in {} bits", reader.bits_consumed());
    Ok(SuperframeOutput { frames: 1 })
}
