//! Stream parameters and the immutable decoder configuration derived from them.

use std::cmp::Ordering;

use log::{debug, warn};

use crate::{
    error::{Error, Result},
    fixed::log2_floor,
};

pub const WMAV1_TAG: u32 = 0x160;
pub const WMAV2_TAG: u32 = 0x161;

/// Smallest transform block is `2^BLOCK_MIN_BITS` samples.
pub const BLOCK_MIN_BITS: u32 = 7;
/// Largest frame is `2^BLOCK_MAX_BITS` samples.
pub const BLOCK_MAX_BITS: u32 = 11;
pub const MAX_CHANNELS: usize = 2;
/// Largest packet the bit reservoir can carry over.
pub const MAX_CODED_SUPERFRAME_SIZE: usize = 16_384;

/// Widest header field the bitstream reader handles in one read.
const MAX_HEADER_FIELD_BITS: u32 = 25;

const BAD_ENCODER_FLAGS: u16 = 0x000d;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WmaVersion {
    V1 = 1,
    V2 = 2,
}

impl WmaVersion {
    /// # Errors
    ///
    /// * `InitFailed` - If `codec_tag` is not a WMA v1 or v2 tag
    pub fn from_codec_tag(codec_tag: u32) -> Result<Self> {
        match codec_tag {
            WMAV1_TAG => Ok(Self::V1),
            WMAV2_TAG => Ok(Self::V2),
            other => Err(Error::InitFailed(format!(
                "unsupported codec tag {other:#x}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    Mono = 1,
    Stereo = 2,
}

impl Channels {
    #[must_use]
    pub const fn count(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for Channels {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::Mono),
            2 => Ok(Self::Stereo),
            other => Err(Error::InitFailed(format!(
                "unsupported channel count {other}"
            ))),
        }
    }
}

/// Packed flag word from the codec-private data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamFlags(u16);

impl StreamFlags {
    pub const EXP_VLC: u16 = 0x0001;
    pub const BIT_RESERVOIR: u16 = 0x0002;
    pub const VARIABLE_BLOCK_LEN: u16 = 0x0004;

    #[must_use]
    pub const fn new(bits: u16) -> Self {
        Self(bits)
    }

    /// Extracts the flag word from codec-private data.
    ///
    /// # Errors
    ///
    /// * `InitFailed` - If fewer than two bytes are available
    pub fn from_extradata(version: WmaVersion, extradata: &[u8]) -> Result<Self> {
        let offset = match extradata.len() {
            len if version == WmaVersion::V2 && len >= 6 => 4,
            len if len >= 4 => 2,
            len if len >= 2 => 0,
            len => {
                return Err(Error::InitFailed(format!(
                    "codec-private data of {len} bytes does not hold a flag word"
                )));
            }
        };
        Ok(Self(u16::from_le_bytes([
            extradata[offset],
            extradata[offset + 1],
        ])))
    }

    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    #[must_use]
    pub const fn use_exp_vlc(self) -> bool {
        self.0 & Self::EXP_VLC != 0
    }

    #[must_use]
    pub const fn use_bit_reservoir(self) -> bool {
        self.0 & Self::BIT_RESERVOIR != 0
    }

    #[must_use]
    pub const fn use_variable_block_len(self) -> bool {
        self.0 & Self::VARIABLE_BLOCK_LEN != 0
    }

    /// Additional block sizes requested by the encoder (bits 3 and 4).
    #[must_use]
    pub const fn extra_block_sizes(self) -> u32 {
        ((self.0 >> 3) & 3) as u32
    }
}

/// Initialization parameters, normally taken from the container.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodecParams {
    pub sample_rate: u32,
    pub channels: u8,
    pub bit_rate: u32,
    pub block_align: u16,
    pub codec_tag: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub extradata: Vec<u8>,
}

impl CodecParams {
    #[must_use]
    pub const fn new(
        sample_rate: u32,
        channels: u8,
        bit_rate: u32,
        block_align: u16,
        codec_tag: u32,
        extradata: Vec<u8>,
    ) -> Self {
        Self {
            sample_rate,
            channels,
            bit_rate,
            block_align,
            codec_tag,
            extradata,
        }
    }

    #[must_use]
    pub const fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    #[must_use]
    pub const fn with_channels(mut self, channels: u8) -> Self {
        self.channels = channels;
        self
    }

    #[must_use]
    pub const fn with_bit_rate(mut self, bit_rate: u32) -> Self {
        self.bit_rate = bit_rate;
        self
    }

    #[must_use]
    pub const fn with_block_align(mut self, block_align: u16) -> Self {
        self.block_align = block_align;
        self
    }

    #[must_use]
    pub fn with_extradata(mut self, extradata: Vec<u8>) -> Self {
        self.extradata = extradata;
        self
    }
}

/// Average coded bits per output sample as an exact fraction.
#[derive(Debug, Clone, Copy)]
struct BitsPerSample {
    num: u64,
    den: u64,
}

impl BitsPerSample {
    fn cmp_milli(self, milli: u64) -> Ordering {
        (self.num * 1000).cmp(&(milli * self.den))
    }

    fn at_least(self, milli: u64) -> bool {
        self.cmp_milli(milli) != Ordering::Less
    }

    fn above(self, milli: u64) -> bool {
        self.cmp_milli(milli) == Ordering::Greater
    }
}

/// Per-stream decoding parameters. Built once and never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    pub version: WmaVersion,
    pub channels: Channels,
    pub sample_rate: u32,
    pub bit_rate: u32,
    pub block_align: usize,
    pub flags: StreamFlags,
    pub use_exp_vlc: bool,
    pub use_bit_reservoir: bool,
    pub use_variable_block_len: bool,
    pub use_noise_coding: bool,
    pub frame_len_bits: u32,
    pub frame_len: usize,
    pub nb_block_sizes: usize,
    pub byte_offset_bits: u32,
    /// Row of the coefficient codebook table, `0..3`.
    pub coef_rate_class: usize,
    /// Start of the noise-substituted region as a fraction of the block, in
    /// thousandths. `1000` when noise coding is off.
    pub high_band_permille: u32,
    /// Reciprocal of the noise amplitude multiplier.
    pub noise_mult_recip: u32,
}

impl DecoderConfig {
    /// Validates `params` and derives every stream constant.
    ///
    /// # Errors
    ///
    /// * `InitFailed` - If the codec tag, channel count, rates, block alignment
    ///   or codec-private data is unusable
    pub fn from_params(params: &CodecParams) -> Result<Self> {
        let version = WmaVersion::from_codec_tag(params.codec_tag)?;
        let channels = Channels::try_from(params.channels)?;

        if params.sample_rate == 0 || params.sample_rate > 96_000 {
            return Err(Error::InitFailed(format!(
                "unsupported sample rate {}",
                params.sample_rate
            )));
        }
        if params.bit_rate == 0 {
            return Err(Error::InitFailed("bit rate must be non-zero".to_string()));
        }
        let block_align = usize::from(params.block_align);
        if block_align == 0 || block_align > MAX_CODED_SUPERFRAME_SIZE {
            return Err(Error::InitFailed(format!(
                "unsupported block alignment {block_align}"
            )));
        }

        let flags = StreamFlags::from_extradata(version, &params.extradata)?;
        let mut use_variable_block_len = flags.use_variable_block_len();
        if version == WmaVersion::V2
            && params.extradata.len() >= 8
            && flags.bits() == BAD_ENCODER_FLAGS
            && use_variable_block_len
        {
            warn!("Disabling variable block length for known-bad encoder flags {BAD_ENCODER_FLAGS:#06x}");
            use_variable_block_len = false;
        }

        let sample_rate = params.sample_rate;
        let frame_len_bits = frame_len_bits(sample_rate, version);
        let frame_len = 1_usize << frame_len_bits;

        let nb_block_sizes = if use_variable_block_len {
            let mut nb = flags.extra_block_sizes() + 1;
            if params.bit_rate / u32::from(params.channels) >= 32_000 {
                nb += 2;
            }
            nb.min(frame_len_bits - BLOCK_MIN_BITS) as usize + 1
        } else {
            1
        };

        let channel_count = u64::from(params.channels);
        let bps = BitsPerSample {
            num: u64::from(params.bit_rate),
            den: channel_count * u64::from(sample_rate),
        };
        let bps1 = if channels == Channels::Stereo {
            BitsPerSample {
                num: bps.num * 16,
                den: bps.den * 10,
            }
        } else {
            bps
        };

        let frame_bytes = (2 * u64::from(params.bit_rate) * frame_len as u64 + 8 * bps.den)
            / (16 * bps.den);
        let byte_offset_bits = log2_floor(u32::try_from(frame_bytes).unwrap_or(u32::MAX)) + 2;
        if byte_offset_bits + 3 > MAX_HEADER_FIELD_BITS {
            return Err(Error::InitFailed(format!(
                "bit rate {} is too high for the superframe header",
                params.bit_rate
            )));
        }

        let (use_noise_coding, high_band_permille) =
            noise_policy(version, sample_rate, bps, bps1);

        let use_exp_vlc = flags.use_exp_vlc();
        let noise_mult_recip = if use_exp_vlc { 50 } else { 25 };

        let coef_rate_class = if sample_rate >= 32_000 {
            if !bps1.at_least(720) {
                0
            } else if !bps1.at_least(1160) {
                1
            } else {
                2
            }
        } else {
            2
        };

        let config = Self {
            version,
            channels,
            sample_rate,
            bit_rate: params.bit_rate,
            block_align,
            flags,
            use_exp_vlc,
            use_bit_reservoir: flags.use_bit_reservoir(),
            use_variable_block_len,
            use_noise_coding,
            frame_len_bits,
            frame_len,
            nb_block_sizes,
            byte_offset_bits,
            coef_rate_class,
            high_band_permille,
            noise_mult_recip,
        };

        debug!(
            "WMA{} config: {} Hz, {} ch, {} bps, flags {:#06x}, frame_len {}, {} block sizes, noise coding {}",
            version as u8,
            sample_rate,
            channels.count(),
            params.bit_rate,
            flags.bits(),
            frame_len,
            nb_block_sizes,
            use_noise_coding
        );

        Ok(config)
    }

    #[must_use]
    pub const fn channel_count(&self) -> usize {
        self.channels.count()
    }

    /// Width in bits of the block-length selector, `0` with a fixed block size.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn block_size_selector_bits(&self) -> u32 {
        if self.nb_block_sizes <= 1 {
            0
        } else {
            log2_floor((self.nb_block_sizes - 1) as u32) + 1
        }
    }

    /// Width in bits of the superframe header that precedes the frame data.
    #[must_use]
    pub const fn superframe_header_bits(&self) -> usize {
        (4 + 4 + self.byte_offset_bits + 3) as usize
    }
}

/// Picks the frame size for a sample rate.
#[must_use]
pub const fn frame_len_bits(sample_rate: u32, version: WmaVersion) -> u32 {
    if sample_rate <= 16_000 {
        9
    } else if sample_rate <= 22_050 || (sample_rate <= 32_000 && matches!(version, WmaVersion::V1))
    {
        10
    } else {
        BLOCK_MAX_BITS
    }
}

/// Decides whether high bands are noise substituted and where they start.
fn noise_policy(
    version: WmaVersion,
    sample_rate: u32,
    bps: BitsPerSample,
    bps1: BitsPerSample,
) -> (bool, u32) {
    let normalized = if version == WmaVersion::V2 {
        match sample_rate {
            r if r >= 44_100 => 44_100,
            r if r >= 22_050 => 22_050,
            r if r >= 16_000 => 16_000,
            r if r >= 11_025 => 11_025,
            r if r >= 8_000 => 8_000,
            r => r,
        }
    } else {
        sample_rate
    };

    match normalized {
        44_100 => {
            if bps1.at_least(610) {
                (false, 1000)
            } else {
                (true, 400)
            }
        }
        22_050 => {
            if bps1.at_least(1160) {
                (false, 1000)
            } else if bps1.at_least(720) {
                (true, 700)
            } else {
                (true, 600)
            }
        }
        16_000 => {
            if bps.above(500) {
                (true, 500)
            } else {
                (true, 300)
            }
        }
        11_025 => (true, 700),
        8_000 => {
            if !bps.above(625) {
                (true, 500)
            } else if bps.above(750) {
                (false, 1000)
            } else {
                (true, 650)
            }
        }
        _ => {
            if bps.at_least(800) {
                (true, 750)
            } else if bps.at_least(600) {
                (true, 600)
            } else {
                (true, 500)
            }
        }
    }
}
