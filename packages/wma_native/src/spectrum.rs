//! Spectral side information, quantized coefficients and dequantization.

use log::trace;

use crate::{
    bands::BlockBands,
    bitstream::BitReader,
    config::WmaVersion,
    error::{Error, Result},
    fixed::{Gain, isqrt32},
    tables::EXP10_NEG_Q30,
    vlc::{COEF_END_OF_BLOCK, COEF_ESCAPE, EXPONENT_DELTA_BIAS, HGAIN_DELTA_BIAS, RunLevelVlc, Vlc},
};

pub const NOISE_TAB_SIZE: usize = 8192;

/// Lowest and highest exponent (in 1/16 decades) a stream may code.
const EXPONENT_MIN: i32 = -60;
const EXPONENT_MAX: i32 = 155;

/// Fractional bits of noise samples and of noise-added coefficients.
const NOISE_FRAC_BITS: u32 = 16;

/// Output coefficients carry 10 fractional bits below the PCM sample unit.
pub const COEF_UNIT_SHIFT: i32 = 10;

/// Rolling pseudo-random noise used to fill uncoded bins.
#[derive(Debug, Clone)]
pub struct NoiseGenerator {
    table: Vec<i32>,
    index: usize,
}

impl NoiseGenerator {
    /// Builds the table of `NOISE_TAB_SIZE` uniform values with amplitude
    /// `sqrt(3) / noise_mult_recip`, Q16.
    #[must_use]
    pub fn new(noise_mult_recip: u32) -> Self {
        // sqrt(3) in Q15, doubled to Q16
        let amplitude = i64::from((isqrt32(3 << 30) << 1) / noise_mult_recip.max(1));
        let mut seed = 1_u32;
        let table = (0..NOISE_TAB_SIZE)
            .map(|_| {
                seed = seed.wrapping_mul(314_159).wrapping_add(1);
                #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
                let value = ((i64::from(seed as i32) * amplitude) >> 31) as i32;
                value
            })
            .collect();
        Self { table, index: 0 }
    }

    #[inline]
    pub fn next_sample(&mut self) -> i32 {
        let value = self.table[self.index];
        self.index = (self.index + 1) & (NOISE_TAB_SIZE - 1);
        value
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    pub const fn reset(&mut self) {
        self.index = 0;
    }
}

/// Reads the block gain: 7-bit chunks summed while a chunk is 127.
///
/// # Errors
///
/// * `CorruptStream` - If the reader runs out of bits before the last chunk
pub fn read_total_gain(reader: &mut BitReader<'_>) -> Result<i32> {
    let mut total_gain = 1;
    loop {
        let chunk = reader.read_bits(7)?;
        #[allow(clippy::cast_possible_wrap)]
        {
            total_gain += chunk as i32;
        }
        if chunk != 127 {
            return Ok(total_gain);
        }
    }
}

/// Width of escaped coefficient levels for a block gain.
#[must_use]
pub const fn coef_nb_bits(total_gain: i32) -> u32 {
    match total_gain {
        i32::MIN..15 => 13,
        15..32 => 12,
        32..40 => 11,
        40..45 => 10,
        _ => 9,
    }
}

/// Noise substitution flags and gains of one channel's high bands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighBands {
    pub coded: Vec<bool>,
    pub values: Vec<i32>,
}

impl HighBands {
    /// Reads one flag per high band. Returns the number of coefficients that
    /// are noise substituted and therefore not transmitted.
    ///
    /// # Errors
    ///
    /// * `CorruptStream` - If the reader runs out of bits
    pub fn read_flags(&mut self, reader: &mut BitReader<'_>, bands: &[usize]) -> Result<usize> {
        self.coded.clear();
        self.values.clear();
        self.values.resize(bands.len(), 0);

        let mut substituted = 0;
        for &width in bands {
            let coded = reader.read_bit()?;
            if coded {
                substituted += width;
            }
            self.coded.push(coded);
        }
        Ok(substituted)
    }

    /// Reads the gains of the flagged bands: an absolute value for the first,
    /// then deltas.
    ///
    /// # Errors
    ///
    /// * `CorruptStream` - If a gain code is invalid or the reader runs out of
    ///   bits
    pub fn read_values(&mut self, reader: &mut BitReader<'_>, hgain: &Vlc) -> Result<()> {
        let mut last: Option<i32> = None;
        for (value, _) in self
            .values
            .iter_mut()
            .zip(&self.coded)
            .filter(|(_, coded)| **coded)
        {
            let next = match last {
                None => {
                    #[allow(clippy::cast_possible_wrap)]
                    let first = reader.read_bits(7)? as i32;
                    first - 19
                }
                Some(previous) => previous + i32::from(hgain.decode(reader)?) - HGAIN_DELTA_BIAS,
            };
            *value = next;
            last = Some(next);
        }
        Ok(())
    }

    fn any_coded(&self) -> bool {
        self.coded.iter().any(|&coded| coded)
    }
}

/// Decodes a VLC-coded envelope over `bands` into Q30 ratios of its peak.
///
/// # Errors
///
/// * `CorruptStream` - If a code is invalid, an exponent leaves the coded
///   range, or the reader runs out of bits
pub fn decode_exponents_vlc(
    reader: &mut BitReader<'_>,
    vlc: &Vlc,
    version: WmaVersion,
    bands: &[usize],
    out: &mut [u32],
) -> Result<()> {
    let mut widths = bands.iter().copied();
    let mut pos = 0;
    let mut max = EXPONENT_MIN;
    let mut levels = [0_i32; 32];
    let mut band_count = 0;

    let mut last = if version == WmaVersion::V1 {
        #[allow(clippy::cast_possible_wrap)]
        let seed = reader.read_bits(5)? as i32 + 10;
        if let Some(width) = widths.next() {
            levels[band_count] = seed;
            band_count += 1;
            pos += width;
        }
        max = seed;
        seed
    } else {
        36
    };

    while pos < out.len() {
        let Some(width) = widths.next() else {
            break;
        };
        last += i32::from(vlc.decode(reader)?) - EXPONENT_DELTA_BIAS;
        if !(EXPONENT_MIN..=EXPONENT_MAX).contains(&last) {
            return Err(Error::CorruptStream(format!(
                "exponent {last} out of range"
            )));
        }
        max = max.max(last);
        if band_count < levels.len() {
            levels[band_count] = last;
        }
        band_count += 1;
        pos += width;
    }

    let mut start = 0;
    for (&width, &level) in bands.iter().zip(&levels[..band_count.min(levels.len())]) {
        let end = (start + width).min(out.len());
        #[allow(clippy::cast_sign_loss)]
        let ratio = EXP10_NEG_Q30[(max - level) as usize];
        out[start..end].fill(ratio);
        start = end;
    }
    out[start..].fill(0);

    trace!("Decoded {band_count} exponent bands, peak exponent {max}");
    Ok(())
}

/// Reads run/level coded coefficients into `out` (`block_len` entries,
/// cleared first).
///
/// # Errors
///
/// * `CorruptStream` - If a code is invalid, the runs overshoot `num_coefs`,
///   or the reader runs out of bits
pub fn decode_run_level(
    reader: &mut BitReader<'_>,
    book: &RunLevelVlc,
    coef_nb_bits: u32,
    frame_len_bits: u32,
    num_coefs: usize,
    out: &mut [i32],
) -> Result<()> {
    out.fill(0);
    let mask = out.len() - 1;
    let mut offset = 0;

    while offset < num_coefs {
        let code = book.vlc.decode(reader)?;
        let level = match code {
            COEF_END_OF_BLOCK => break,
            COEF_ESCAPE => {
                #[allow(clippy::cast_possible_wrap)]
                let level = reader.read_bits(coef_nb_bits)? as i32;
                offset += reader.read_bits(frame_len_bits)? as usize;
                level
            }
            code => {
                let code = usize::from(code);
                offset += usize::from(book.runs[code]);
                i32::from(book.levels[code])
            }
        };
        let positive = reader.read_bit()?;
        out[offset & mask] = if positive { level } else { -level };
        offset += 1;
    }

    if offset > num_coefs {
        return Err(Error::CorruptStream(format!(
            "coefficient run overflow ({offset} > {num_coefs})"
        )));
    }
    Ok(())
}

/// Per-block values shared by every channel's dequantization.
#[derive(Debug, Clone, Copy)]
pub struct BlockScale<'a> {
    pub bands: &'a BlockBands,
    pub coefs_start: usize,
    /// Block size index of the current block.
    pub bsize: usize,
    pub total_gain: i32,
    /// `1 / (block_len / 2)`, times `sqrt(block_len / 2)` for version 1.
    pub mdct_norm: Gain,
    pub noise_mult_recip: u32,
    pub use_noise_coding: bool,
}

impl BlockScale<'_> {
    #[must_use]
    pub fn mdct_norm(version: WmaVersion, block_len_bits: u32) -> Gain {
        #[allow(clippy::cast_possible_wrap)]
        let norm = Gain::ONE.scale_pow2(1 - block_len_bits as i32);
        match version {
            WmaVersion::V1 => norm.sqrt(),
            WmaVersion::V2 => norm,
        }
    }
}

#[inline]
fn exponent_at(exponents: &[u32], base: usize, i: usize, bsize: usize, esize: usize) -> i64 {
    i64::from(exponents.get(base + ((i << bsize) >> esize)).copied().unwrap_or(0))
}

/// Turns quantized levels into transform coefficients.
///
/// `exponents` were decoded for block size index `esize`; `out` receives
/// `block_len` coefficients.
#[allow(clippy::cast_possible_truncation)]
pub fn dequantize(
    scale: &BlockScale<'_>,
    coefs_q: &[i32],
    exponents: &[u32],
    esize: usize,
    high: &HighBands,
    noise: &mut NoiseGenerator,
    out: &mut [i32],
) {
    let bands = scale.bands;
    let bsize = scale.bsize;
    let block_len = bands.block_len;
    let out = &mut out[..block_len];
    let mult = Gain::db20(scale.total_gain)
        .mul_gain(scale.mdct_norm)
        .scale_pow2(COEF_UNIT_SHIFT);
    let q_frac = NOISE_FRAC_BITS + 30;

    if !scale.use_noise_coding {
        let coded = (bands.coefs_end - scale.coefs_start).min(block_len - scale.coefs_start);
        out[..scale.coefs_start].fill(0);
        for (i, (value, &q)) in out[scale.coefs_start..scale.coefs_start + coded]
            .iter_mut()
            .zip(coefs_q)
            .enumerate()
        {
            *value = mult.apply(i64::from(q) * exponent_at(exponents, 0, i, bsize, esize), 30);
        }
        out[scale.coefs_start + coded..].fill(0);
        return;
    }

    let mut pos = 0;
    for i in 0..scale.coefs_start {
        let x = i64::from(noise.next_sample()) * exponent_at(exponents, 0, i, bsize, esize);
        out[pos] = mult.apply(x, q_frac);
        pos += 1;
    }

    let mut powers = vec![0_u64; bands.exponent_high_bands.len()];
    let mut last_high_band = 0;
    if high.any_coded() {
        let mut base = (bands.high_band_start << bsize) >> esize;
        for (j, &width) in bands.exponent_high_bands.iter().enumerate() {
            if high.coded.get(j).copied().unwrap_or(false) {
                let sum: u128 = (0..width)
                    .map(|i| {
                        let e = exponent_at(exponents, base, i, bsize, esize).unsigned_abs();
                        u128::from(e) * u128::from(e)
                    })
                    .sum();
                powers[j] = (sum / width.max(1) as u128) as u64;
                last_high_band = j;
            }
            base += (width << bsize) >> esize;
        }
    }
    let last_power_recip = Gain::from_fraction(powers.get(last_high_band).copied().unwrap_or(0), 60)
        .recip();

    let mut coded_index = 0;
    let mut base = (scale.coefs_start << bsize) >> esize;
    let low_width = bands.high_band_start.saturating_sub(scale.coefs_start);
    let segments = std::iter::once((low_width, None)).chain(
        bands
            .exponent_high_bands
            .iter()
            .enumerate()
            .map(|(j, &width)| (width, Some(j))),
    );

    for (width, band) in segments {
        let substituted = band.and_then(|j| high.coded.get(j).copied()).unwrap_or(false);
        let width = width.min(block_len - pos);
        if substituted {
            let j = band.unwrap_or_default();
            let band_mult = Gain::from_fraction(powers[j], 60)
                .mul_gain(last_power_recip)
                .sqrt()
                .mul_gain(Gain::db20(high.values[j]))
                .mul_gain(Gain::from_int(scale.noise_mult_recip))
                .mul_gain(scale.mdct_norm)
                .scale_pow2(COEF_UNIT_SHIFT);
            for i in 0..width {
                let x = i64::from(noise.next_sample()) * exponent_at(exponents, base, i, bsize, esize);
                out[pos] = band_mult.apply(x, q_frac);
                pos += 1;
            }
        } else {
            for i in 0..width {
                let q = coefs_q.get(coded_index).copied().unwrap_or(0);
                coded_index += 1;
                let t = (i64::from(q) << NOISE_FRAC_BITS) + i64::from(noise.next_sample());
                out[pos] = mult.apply(t * exponent_at(exponents, base, i, bsize, esize), q_frac);
                pos += 1;
            }
        }
        base += (width << bsize) >> esize;
    }

    let tail_index = base as i64 + ((-(1_i64 << bsize)) >> esize);
    #[allow(clippy::cast_sign_loss)]
    let tail_exponent = i64::from(exponents.get(tail_index.max(0) as usize).copied().unwrap_or(0));
    for value in &mut out[pos..] {
        *value = mult.apply(i64::from(noise.next_sample()) * tail_exponent, q_frac);
    }
}

/// Converts mid/side channels back to left/right in place.
pub fn mid_side_to_left_right(mid: &mut [i32], side: &mut [i32]) {
    for (m, s) in mid.iter_mut().zip(side.iter_mut()) {
        let left = m.saturating_add(*s);
        let right = m.saturating_sub(*s);
        *m = left;
        *s = right;
    }
}
