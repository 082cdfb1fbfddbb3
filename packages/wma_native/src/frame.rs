//! Frame and block decoding.
//!
//! A frame covers `frame_len` samples per channel and is split into blocks
//! whose lengths are signalled in the bitstream. Each block is dequantized,
//! inverse transformed and overlap-added into the channel's frame buffer.

use log::{debug, trace};

use crate::{
    bands::BandLayout,
    bitstream::BitReader,
    config::{Channels, DecoderConfig, WmaVersion},
    error::{Error, Result},
    fft::Complex,
    fixed::Gain,
    lsp::decode_exponents_lsp,
    mdct::imdct_for_block,
    pcm::write_interleaved,
    spectrum::{
        BlockScale, HighBands, NoiseGenerator, coef_nb_bits, decode_exponents_vlc,
        decode_run_level, dequantize, mid_side_to_left_right, read_total_gain,
    },
    vlc::{Codebooks, codebooks},
    window::{BlockShape, overlap_add},
};

/// Per-channel buffers and envelope state.
#[derive(Debug, Clone)]
pub struct ChannelState {
    /// Quantized levels of the current block.
    pub coefs_q: Vec<i32>,
    /// Dequantized spectrum of the current block.
    pub coefs: Vec<i32>,
    /// Spectral envelope as Q30 ratios of its peak.
    pub exponents: Vec<u32>,
    /// Block size index the envelope was decoded for.
    pub exponents_bsize: usize,
    pub exponents_initialized: bool,
    pub high_bands: HighBands,
    pub coded: bool,
    /// Two frames of overlap-add output; the first half is emitted per frame.
    pub frame_out: Vec<i32>,
}

impl ChannelState {
    fn new(frame_len: usize) -> Self {
        Self {
            coefs_q: vec![0; frame_len],
            coefs: vec![0; frame_len],
            exponents: vec![0; frame_len],
            exponents_bsize: 0,
            exponents_initialized: false,
            high_bands: HighBands::default(),
            coded: false,
            frame_out: vec![0; frame_len * 2],
        }
    }

    fn reset(&mut self) {
        self.coefs_q.fill(0);
        self.coefs.fill(0);
        self.exponents.fill(0);
        self.exponents_bsize = 0;
        self.exponents_initialized = false;
        self.high_bands = HighBands::default();
        self.coded = false;
        self.frame_out.fill(0);
    }
}

/// Block-length state carried across blocks and frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockState {
    pub prev_block_len_bits: u32,
    pub block_len_bits: u32,
    pub next_block_len_bits: u32,
    pub reset_block_lengths: bool,
    pub block_pos: usize,
    pub block_len: usize,
    pub ms_stereo: bool,
}

impl BlockState {
    const fn new(frame_len_bits: u32) -> Self {
        Self {
            prev_block_len_bits: frame_len_bits,
            block_len_bits: frame_len_bits,
            next_block_len_bits: frame_len_bits,
            reset_block_lengths: true,
            block_pos: 0,
            block_len: 1 << frame_len_bits,
            ms_stereo: false,
        }
    }
}

#[derive(Debug)]
pub struct FrameDecoder {
    config: DecoderConfig,
    layout: BandLayout,
    books: &'static Codebooks,
    noise: NoiseGenerator,
    state: BlockState,
    channels: Vec<ChannelState>,
    /// Inverse transform output of one block, shared by the channels.
    output: Vec<i32>,
    scratch: Vec<Complex>,
    curve: Vec<Gain>,
}

impl FrameDecoder {
    /// # Errors
    ///
    /// * `InitFailed` - If the shared tables could not be built
    pub fn new(config: &DecoderConfig) -> Result<Self> {
        let books = codebooks()?;
        for bits in 0..config.nb_block_sizes {
            #[allow(clippy::cast_possible_truncation)]
            imdct_for_block(config.frame_len_bits - bits as u32)?;
        }

        let frame_len = config.frame_len;
        let layout = BandLayout::new(config);
        debug!(
            "Frame decoder ready: {} channels, frame_len {frame_len}, {} block sizes",
            config.channel_count(),
            layout.block_count()
        );

        Ok(Self {
            config: config.clone(),
            layout,
            books,
            noise: NoiseGenerator::new(config.noise_mult_recip),
            state: BlockState::new(config.frame_len_bits),
            channels: (0..config.channel_count())
                .map(|_| ChannelState::new(frame_len))
                .collect(),
            output: vec![0; frame_len * 2],
            scratch: vec![Complex::default(); frame_len / 2],
            curve: vec![Gain::ZERO; frame_len],
        })
    }

    #[must_use]
    pub const fn config(&self) -> &DecoderConfig {
        &self.config
    }

    #[must_use]
    pub const fn block_state(&self) -> &BlockState {
        &self.state
    }

    #[must_use]
    pub fn channels(&self) -> &[ChannelState] {
        &self.channels
    }

    /// Makes the next frame read both the previous and current block lengths.
    pub const fn set_reset_block_lengths(&mut self) {
        self.state.reset_block_lengths = true;
    }

    /// Returns every piece of per-stream state to how [`FrameDecoder::new`]
    /// left it. The shared tables and band layout are kept.
    pub fn reset(&mut self) {
        self.state = BlockState::new(self.config.frame_len_bits);
        for channel in &mut self.channels {
            channel.reset();
        }
        self.noise.reset();
    }

    /// Decodes one frame and writes `frame_len` interleaved stereo samples
    /// (`2 * frame_len` values) to `pcm`.
    ///
    /// # Errors
    ///
    /// * `CorruptStream` - If the frame's bitstream is invalid or truncated
    pub fn decode_frame(&mut self, reader: &mut BitReader<'_>, pcm: &mut [i16]) -> Result<()> {
        let frame_len = self.config.frame_len;
        self.state.block_pos = 0;

        let mut blocks = 0;
        while !self.decode_block(reader)? {
            blocks += 1;
        }
        trace!(
            "Frame decoded in {} blocks, {} bits consumed",
            blocks + 1,
            reader.bits_consumed()
        );

        let left = &self.channels[0].frame_out[..frame_len];
        let right = match self.config.channels {
            Channels::Mono => None,
            Channels::Stereo => Some(&self.channels[1].frame_out[..frame_len]),
        };
        write_interleaved(left, right, pcm);

        for channel in &mut self.channels {
            channel.frame_out.copy_within(frame_len.., 0);
            channel.frame_out[frame_len..].fill(0);
        }
        Ok(())
    }

    fn read_block_len_bits(&self, reader: &mut BitReader<'_>) -> Result<u32> {
        let value = reader.read_bits(self.config.block_size_selector_bits())?;
        if value as usize >= self.config.nb_block_sizes {
            return Err(Error::CorruptStream(format!(
                "block size index {value} out of range (< {})",
                self.config.nb_block_sizes
            )));
        }
        Ok(self.config.frame_len_bits - value)
    }

    /// Returns `true` when the block completes the frame.
    fn decode_block(&mut self, reader: &mut BitReader<'_>) -> Result<bool> {
        let frame_len_bits = self.config.frame_len_bits;

        if self.config.use_variable_block_len {
            if self.state.reset_block_lengths {
                self.state.reset_block_lengths = false;
                self.state.prev_block_len_bits = self.read_block_len_bits(reader)?;
                self.state.block_len_bits = self.read_block_len_bits(reader)?;
            } else {
                self.state.prev_block_len_bits = self.state.block_len_bits;
                self.state.block_len_bits = self.state.next_block_len_bits;
            }
            self.state.next_block_len_bits = self.read_block_len_bits(reader)?;
        } else {
            self.state.prev_block_len_bits = frame_len_bits;
            self.state.block_len_bits = frame_len_bits;
            self.state.next_block_len_bits = frame_len_bits;
        }

        let block_len_bits = self.state.block_len_bits;
        let block_len = 1_usize << block_len_bits;
        self.state.block_len = block_len;
        if self.state.block_pos + block_len > self.config.frame_len {
            return Err(Error::CorruptStream(format!(
                "block of {block_len} at {} overruns the frame",
                self.state.block_pos
            )));
        }
        let bsize = (frame_len_bits - block_len_bits) as usize;

        self.state.ms_stereo = self.config.channels == Channels::Stereo && reader.read_bit()?;
        let mut any_coded = false;
        for channel in &mut self.channels {
            channel.coded = reader.read_bit()?;
            any_coded |= channel.coded;
        }

        if any_coded {
            self.decode_spectrum(reader, bsize)?;
        }

        self.synthesize(bsize)?;

        self.state.block_pos += block_len;
        Ok(self.state.block_pos >= self.config.frame_len)
    }

    fn decode_spectrum(&mut self, reader: &mut BitReader<'_>, bsize: usize) -> Result<()> {
        let layout = &self.layout;
        let bands = layout.block(bsize).ok_or_else(|| {
            Error::CorruptStream(format!("no band layout for block size index {bsize}"))
        })?;
        let block_len = bands.block_len;

        let total_gain = read_total_gain(reader)?;
        let coef_nb_bits = coef_nb_bits(total_gain);

        let coded_count = bands.coefs_end - layout.coefs_start;
        let mut nb_coefs = [coded_count; 2];

        if self.config.use_noise_coding {
            for (channel, nb) in self.channels.iter_mut().zip(&mut nb_coefs) {
                if channel.coded {
                    *nb -= channel
                        .high_bands
                        .read_flags(reader, &bands.exponent_high_bands)?;
                }
            }
            for channel in &mut self.channels {
                if channel.coded {
                    channel.high_bands.read_values(reader, &self.books.hgain)?;
                }
            }
        }

        let full_block = self.state.block_len_bits == self.config.frame_len_bits;
        if full_block || reader.read_bit()? {
            for channel in &mut self.channels {
                if !channel.coded {
                    continue;
                }
                let exponents = &mut channel.exponents[..block_len];
                if self.config.use_exp_vlc {
                    decode_exponents_vlc(
                        reader,
                        &self.books.exponent,
                        self.config.version,
                        &bands.exponent_bands,
                        exponents,
                    )?;
                } else {
                    decode_exponents_lsp(reader, layout.lsp_cos(), &mut self.curve, exponents)?;
                }
                channel.exponents_bsize = bsize;
                channel.exponents_initialized = true;
            }
        }

        if self
            .channels
            .iter()
            .any(|channel| channel.coded && !channel.exponents_initialized)
        {
            return Err(Error::CorruptStream(
                "coded channel has no exponents".to_string(),
            ));
        }

        let coef_books = &self.books.coefs[self.config.coef_rate_class];
        let side_book = self.state.ms_stereo;
        for (ch, channel) in self.channels.iter_mut().enumerate() {
            if channel.coded {
                let book = &coef_books[usize::from(ch == 1 && side_book)];
                decode_run_level(
                    reader,
                    book,
                    coef_nb_bits,
                    self.config.frame_len_bits,
                    nb_coefs[ch],
                    &mut channel.coefs_q[..block_len],
                )?;
            }
            if self.config.version == WmaVersion::V1
                && self.config.channels == Channels::Stereo
            {
                reader.align_to_byte();
            }
        }

        let scale = BlockScale {
            bands,
            coefs_start: layout.coefs_start,
            bsize,
            total_gain,
            mdct_norm: BlockScale::mdct_norm(self.config.version, self.state.block_len_bits),
            noise_mult_recip: self.config.noise_mult_recip,
            use_noise_coding: self.config.use_noise_coding,
        };
        for channel in &mut self.channels {
            if channel.coded {
                dequantize(
                    &scale,
                    &channel.coefs_q,
                    &channel.exponents,
                    channel.exponents_bsize,
                    &channel.high_bands,
                    &mut self.noise,
                    &mut channel.coefs,
                );
            }
        }

        if self.state.ms_stereo && self.channels[1].coded {
            let (first, second) = self.channels.split_at_mut(1);
            let (mid, side) = (&mut first[0], &mut second[0]);
            if !mid.coded {
                mid.coefs[..block_len].fill(0);
                mid.coded = true;
            }
            mid_side_to_left_right(&mut mid.coefs[..block_len], &mut side.coefs[..block_len]);
        }

        trace!(
            "Block {block_len} at {}: gain {total_gain}, ms {}, coded {:?}",
            self.state.block_pos,
            self.state.ms_stereo,
            self.channels.iter().map(|c| c.coded).collect::<Vec<_>>()
        );
        Ok(())
    }

    /// Inverse transforms each channel's block and overlap-adds it.
    fn synthesize(&mut self, bsize: usize) -> Result<()> {
        let block_len = self.state.block_len;
        let imdct = imdct_for_block(self.state.block_len_bits)?;
        let shape = BlockShape {
            prev_bits: self.state.prev_block_len_bits,
            bits: self.state.block_len_bits,
            next_bits: self.state.next_block_len_bits,
        };
        let start = self.config.frame_len / 2 + self.state.block_pos - block_len / 2;
        let output = &mut self.output[..2 * block_len];

        for (ch, channel) in self.channels.iter_mut().enumerate() {
            if channel.coded {
                imdct.imdct_full(output, &channel.coefs[..block_len], &mut self.scratch);
            } else if !(self.state.ms_stereo && ch == 1) {
                output.fill(0);
            }
            overlap_add(&mut channel.frame_out[start..], output, shape);
        }

        trace!("Synthesized block size index {bsize} at {start}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        bitstream::BitWriter,
        config::{CodecParams, WMAV2_TAG},
    };

    fn decoder(flags: u8, channels: u8) -> FrameDecoder {
        let params = CodecParams::new(44_100, channels, 128_000, 4096, WMAV2_TAG, vec![0, 0, flags, 0]);
        FrameDecoder::new(&DecoderConfig::from_params(&params).unwrap()).unwrap()
    }

    #[test_log::test]
    fn test_silent_frame() {
        let mut frames = decoder(0x1F, 2);
        let mut writer = BitWriter::new();
        writer.write_bits(0, 3);
        writer.write_bits(0, 3);
        writer.write_bits(0, 3);
        writer.write_bit(false);
        writer.write_bits(0, 2);
        let bytes = writer.into_padded(8);

        let mut reader = BitReader::new(&bytes);
        let mut pcm = vec![1_i16; 4096];
        frames.decode_frame(&mut reader, &mut pcm).unwrap();
        assert_eq!(reader.bits_consumed(), 12);
        assert!(pcm.iter().all(|&s| s == 0));
        assert!(!frames.block_state().reset_block_lengths);
    }

    #[test]
    fn test_short_blocks_fill_frame() {
        let mut frames = decoder(0x1F, 1);
        let mut writer = BitWriter::new();
        // prev = 512, current = 512, then the remaining three blocks of 512
        writer.write_bits(2, 3);
        writer.write_bits(2, 3);
        for _ in 0..4 {
            writer.write_bits(2, 3);
            writer.write_bit(false);
        }
        let bytes = writer.into_padded(8);

        let mut reader = BitReader::new(&bytes);
        let mut pcm = vec![0_i16; 4096];
        frames.decode_frame(&mut reader, &mut pcm).unwrap();
        assert_eq!(reader.bits_consumed(), 22);
        assert_eq!(frames.block_state().block_len, 512);
        assert_eq!(frames.block_state().block_pos, 2048);
    }

    #[test]
    fn test_block_size_index_out_of_range() {
        let mut frames = decoder(0x1F, 2);
        let mut writer = BitWriter::new();
        writer.write_bits(5, 3);
        let bytes = writer.into_padded(8);

        let mut reader = BitReader::new(&bytes);
        let mut pcm = vec![0_i16; 4096];
        assert!(matches!(
            frames.decode_frame(&mut reader, &mut pcm),
            Err(Error::CorruptStream(_))
        ));
    }

    #[test]
    fn test_fixed_block_length_reads_no_selector() {
        let mut frames = decoder(0x03, 1);
        let bytes = [0x00];
        let mut reader = BitReader::new(&bytes);
        let mut pcm = vec![0_i16; 4096];
        frames.decode_frame(&mut reader, &mut pcm).unwrap();
        assert_eq!(reader.bits_consumed(), 1);
    }

    fn windowed_reference(coefs: &[i32], shape: BlockShape) -> Vec<f64> {
        let half = 1_usize << shape.bits;
        let n = 2 * half;
        #[allow(clippy::cast_precision_loss)]
        let sine = |i: usize, len: usize| {
            ((i as f64 + 0.5) * std::f64::consts::PI / (2.0 * len as f64)).sin()
        };

        (0..n)
            .map(|m| {
                #[allow(clippy::cast_precision_loss)]
                let y = -coefs
                    .iter()
                    .enumerate()
                    .map(|(k, &x)| {
                        let phase = std::f64::consts::TAU / n as f64
                            * (m as f64 + 0.5 + n as f64 / 4.0)
                            * (k as f64 + 0.5);
                        f64::from(x) * phase.cos()
                    })
                    .sum::<f64>();

                let w = if m < half {
                    let prev = 1_usize << shape.prev_bits;
                    let pad = half.saturating_sub(prev) / 2;
                    if shape.bits <= shape.prev_bits {
                        sine(m, half)
                    } else if m < pad {
                        0.0
                    } else if m < pad + prev {
                        sine(m - pad, prev)
                    } else {
                        1.0
                    }
                } else {
                    let j = m - half;
                    let next = 1_usize << shape.next_bits;
                    let pad = half.saturating_sub(next) / 2;
                    if shape.bits <= shape.next_bits {
                        sine(half - 1 - j, half)
                    } else if j < pad {
                        1.0
                    } else if j < pad + next {
                        sine(next - 1 - (j - pad), next)
                    } else {
                        0.0
                    }
                };
                y * w
            })
            .collect()
    }

    #[test]
    fn test_overlap_add_across_block_sizes() {
        let mut frames = decoder(0x1F, 1);
        let frame_len = frames.config.frame_len;
        let mut expected = vec![0.0_f64; 2 * frame_len];
        let mut seed = 0x2545_f491_u32;

        // One 1024 block followed by two 512 blocks.
        let blocks = [(10, 10, 9), (10, 9, 9), (9, 9, 9)];
        let mut block_pos = 0;
        for (prev_bits, bits, next_bits) in blocks {
            let block_len = 1_usize << bits;
            let coefs: Vec<i32> = (0..block_len)
                .map(|_| {
                    seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                    #[allow(clippy::cast_possible_wrap)]
                    let value = (seed as i32) >> 19;
                    value
                })
                .collect();

            frames.state.prev_block_len_bits = prev_bits;
            frames.state.block_len_bits = bits;
            frames.state.next_block_len_bits = next_bits;
            frames.state.block_len = block_len;
            frames.state.block_pos = block_pos;
            frames.channels[0].coded = true;
            frames.channels[0].coefs[..block_len].copy_from_slice(&coefs);
            frames
                .synthesize((frames.config.frame_len_bits - bits) as usize)
                .unwrap();

            let shape = BlockShape {
                prev_bits,
                bits,
                next_bits,
            };
            let start = frame_len / 2 + block_pos - block_len / 2;
            for (out, value) in expected[start..].iter_mut().zip(windowed_reference(&coefs, shape)) {
                *out += value;
            }
            block_pos += block_len;
        }

        let actual = &frames.channels[0].frame_out;
        let peak = expected.iter().fold(0.0_f64, |peak, v| peak.max(v.abs()));
        assert!(peak > 100_000.0, "peak {peak}");
        for (i, (&a, &e)) in actual.iter().zip(&expected).enumerate() {
            assert!((f64::from(a) - e).abs() < 2048.0, "frame_out[{i}] = {a}, expected {e}");
        }
    }

    #[test]
    fn test_reset_restores_new_state() {
        let mut frames = decoder(0x1F, 2);
        let mut writer = BitWriter::new();
        writer.write_bits(2, 3);
        writer.write_bits(2, 3);
        for _ in 0..4 {
            writer.write_bits(2, 3);
            writer.write_bit(false);
            writer.write_bits(0, 2);
        }
        let bytes = writer.into_padded(8);
        let mut reader = BitReader::new(&bytes);
        let mut pcm = vec![0_i16; 4096];
        frames.decode_frame(&mut reader, &mut pcm).unwrap();
        assert_eq!(frames.block_state().block_len_bits, 9);

        frames.reset();
        let fresh = decoder(0x1F, 2);
        assert_eq!(frames.block_state(), fresh.block_state());
        assert!(frames.block_state().reset_block_lengths);
        assert_eq!(frames.noise.index(), 0);
        for channel in frames.channels() {
            assert!(!channel.exponents_initialized);
            assert!(channel.frame_out.iter().all(|&v| v == 0));
        }
    }

    #[test]
    fn test_coded_channel_without_exponents() {
        let mut frames = decoder(0x1F, 1);
        let mut writer = BitWriter::new();
        // prev = current = 1024, next = 1024: not a full-frame block
        writer.write_bits(1, 3);
        writer.write_bits(1, 3);
        writer.write_bits(1, 3);
        writer.write_bit(true);
        writer.write_bits(10, 7);
        writer.write_bit(false);
        let bytes = writer.into_padded(8);

        let mut reader = BitReader::new(&bytes);
        let mut pcm = vec![0_i16; 4096];
        let err = frames.decode_frame(&mut reader, &mut pcm).unwrap_err();
        assert!(matches!(err, Error::CorruptStream(_)), "{err}");
        assert!(!frames.channels()[0].exponents_initialized);
    }
}
