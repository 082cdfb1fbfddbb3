#![allow(dead_code)]

use moosicbox_wma_native::{
    CodecParams, Decoder, DecoderConfig, WMAV1_TAG, WMAV2_TAG,
    bands::BandLayout,
    config::{Channels, WmaVersion},
    tables::{COEF_CODEBOOKS, EXPONENT_BITS, EXPONENT_CODES},
    vlc::{COEF_END_OF_BLOCK, EXPONENT_DELTA_BIAS, canonical_codes},
};

pub const BLOCK_ALIGN: usize = 4096;
pub const FRAME_LEN: usize = 2048;

/// MSB-first bit packer for synthetic packets.
#[derive(Debug, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_bits(&mut self, value: u32, count: u32) {
        for i in (0..count).rev() {
            self.write_bit((value >> i) & 1 == 1);
        }
    }

    pub fn write_bit(&mut self, bit: bool) {
        if self.bit_len.is_multiple_of(8) {
            self.bytes.push(0);
        }
        if bit {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= 0x80 >> (self.bit_len % 8);
        }
        self.bit_len += 1;
    }

    pub fn write_slice(&mut self, bits: &[bool]) {
        for &bit in bits {
            self.write_bit(bit);
        }
    }

    pub fn align_to_byte(&mut self) {
        while !self.bit_len.is_multiple_of(8) {
            self.write_bit(false);
        }
    }

    pub const fn bit_len(&self) -> usize {
        self.bit_len
    }

    pub fn bits(&self) -> Vec<bool> {
        (0..self.bit_len)
            .map(|i| self.bytes[i / 8] & (0x80 >> (i % 8)) != 0)
            .collect()
    }

    pub fn into_padded(mut self, len: usize) -> Vec<u8> {
        assert!(self.bytes.len() <= len);
        self.bytes.resize(len, 0);
        self.bytes
    }

    /// Fills the rest of a `len` byte packet with set bits.
    pub fn into_padded_with_ones(mut self, len: usize) -> Vec<u8> {
        assert!(self.bit_len <= len * 8);
        while self.bit_len < len * 8 {
            self.write_bit(true);
        }
        self.bytes
    }
}

/// v2, 44.1 kHz stereo, 128 kbit/s, every flag on.
pub fn reservoir_params() -> CodecParams {
    CodecParams::new(44_100, 2, 128_000, 4096, WMAV2_TAG, vec![0x00, 0x00, 0x1F, 0x00])
}

/// v2, 44.1 kHz mono, exponent VLC only: one full-length block per packet.
pub fn mono_params() -> CodecParams {
    CodecParams::new(44_100, 1, 128_000, 4096, WMAV2_TAG, vec![0x00, 0x00, 0x01, 0x00])
}

/// v2, 22.05 kHz mono, 20 kbit/s: noise coding on, no reservoir.
pub fn noise_params() -> CodecParams {
    CodecParams::new(22_050, 1, 20_000, 512, WMAV2_TAG, vec![0x00, 0x00, 0x01, 0x00])
}

/// v1, 44.1 kHz stereo, 128 kbit/s, exponent VLC only.
pub fn v1_stereo_params() -> CodecParams {
    CodecParams::new(44_100, 2, 128_000, 4096, WMAV1_TAG, vec![0x00, 0x00, 0x01, 0x00])
}

pub fn superframe_header(writer: &mut BitWriter, frames_field: u32, bit_offset: u32) {
    writer.write_bits(0, 4);
    writer.write_bits(frames_field, 4);
    writer.write_bits(bit_offset, 13);
}

/// A stereo frame of full-length blocks with no channel coded, starting with
/// the three block-length selectors read after a reset.
pub fn silent_stereo_frame(writer: &mut BitWriter) {
    writer.write_bits(0, 3);
    writer.write_bits(0, 3);
    writer.write_bits(0, 3);
    writer.write_bit(false);
    writer.write_bits(0, 2);
}

/// Superframe holding one silent frame and nothing else.
pub fn silent_superframe() -> Vec<u8> {
    let mut writer = BitWriter::new();
    superframe_header(&mut writer, 2, 0);
    silent_stereo_frame(&mut writer);
    writer.into_padded(BLOCK_ALIGN)
}

/// Writes one full-length block in which every channel flagged in `coded`
/// carries a single unit coefficient at its first coded bin under a flat
/// envelope. Starts at the mid/side flag, after any block-length selectors.
pub fn write_impulse_block(
    writer: &mut BitWriter,
    config: &DecoderConfig,
    ms_stereo: bool,
    coded: &[bool],
) {
    let layout = BandLayout::new(config);
    let block = layout.block(0).unwrap();
    let stereo = config.channels == Channels::Stereo;

    if stereo {
        writer.write_bit(ms_stereo);
    }
    for &flag in coded {
        writer.write_bit(flag);
    }
    if !coded.contains(&true) {
        return;
    }
    writer.write_bits(99, 7);

    if config.use_noise_coding {
        for _ in coded.iter().filter(|&&flag| flag) {
            writer.write_bits(0, u32::try_from(block.exponent_high_bands.len()).unwrap());
        }
    }

    for _ in coded.iter().filter(|&&flag| flag) {
        if !config.use_exp_vlc {
            // every LSP index zero
            writer.write_slice(&[false; 37]);
            continue;
        }
        let mut widths = block.exponent_bands.iter();
        let mut pos = 0;
        if config.version == WmaVersion::V1 {
            // 26 + 10 matches the v2 starting exponent
            writer.write_bits(26, 5);
            pos += widths.next().unwrap();
        }
        #[allow(clippy::cast_sign_loss)]
        let zero_delta = EXPONENT_DELTA_BIAS as usize;
        while pos < block.block_len {
            let Some(width) = widths.next() else {
                break;
            };
            writer.write_bits(
                EXPONENT_CODES[zero_delta],
                u32::from(EXPONENT_BITS[zero_delta]),
            );
            pos += width;
        }
    }

    for (ch, &flag) in coded.iter().enumerate() {
        if flag {
            let book = &COEF_CODEBOOKS[config.coef_rate_class][usize::from(ch == 1 && ms_stereo)];
            let codes = canonical_codes(book.bits).unwrap();
            writer.write_bits(codes[2], u32::from(book.bits[2]));
            writer.write_bit(true);
            let eob = usize::from(COEF_END_OF_BLOCK);
            writer.write_bits(codes[eob], u32::from(book.bits[eob]));
        }
        if config.version == WmaVersion::V1 && stereo {
            writer.align_to_byte();
        }
    }
}

/// A mono frame carrying a single unit coefficient at bin 0 with a flat
/// envelope.
pub fn impulse_mono_packet(decoder: &Decoder) -> Vec<u8> {
    let config = decoder.config();
    let mut writer = BitWriter::new();
    write_impulse_block(&mut writer, config, false, &[true]);
    writer.into_padded(config.block_align)
}

pub fn silent_mono_packet() -> Vec<u8> {
    vec![0; BLOCK_ALIGN]
}

/// Packet of `len` bytes starting with `header`, then `bits`, then set
/// bits to the end.
pub fn packet_from_bits(header: &BitWriter, bits: &[bool], len: usize) -> Vec<u8> {
    let mut writer = BitWriter::new();
    writer.write_slice(&header.bits());
    writer.write_slice(bits);
    writer.into_padded_with_ones(len)
}

/// Splits interleaved output into its two slots.
pub fn deinterleave(pcm: &[i16]) -> (Vec<i16>, Vec<i16>) {
    pcm.chunks_exact(2).map(|pair| (pair[0], pair[1])).unzip()
}

/// Splits one frame that starts a stream across `block_align` byte packets.
/// Each packet but the last carries `block_align - 1` bytes of it behind a
/// one byte header; the last ends it at its bit offset.
pub fn split_frame(bits: &[bool], block_align: usize) -> Vec<Vec<u8>> {
    let chunk = (block_align - 1) * 8;
    let last_max = block_align * 8 - 21;
    assert!(bits.len() > last_max);

    let mut packets = Vec::new();
    let mut rest = bits;
    while rest.len() > last_max {
        let take = chunk.min(rest.len());
        let mut header = BitWriter::new();
        header.write_bits(0, 4);
        header.write_bits(u32::from(packets.is_empty()), 4);
        packets.push(packet_from_bits(&header, &rest[..take], block_align));
        rest = &rest[take..];
    }

    let mut header = BitWriter::new();
    superframe_header(&mut header, 1, u32::try_from(rest.len()).unwrap());
    packets.push(packet_from_bits(&header, rest, block_align));
    packets
}
