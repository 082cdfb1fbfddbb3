//! Per-block-size band layout: exponent bands, coded coefficient range and
//! the noise-substituted high bands.

use log::trace;

use crate::{
    config::{BLOCK_MIN_BITS, DecoderConfig, WmaVersion},
    fixed::{ANGLE_HALF, cos_q31},
    tables::{CRITICAL_FREQS, EXPONENT_BANDS_22050, EXPONENT_BANDS_32000, EXPONENT_BANDS_44100},
};

/// Layout of one block size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockBands {
    pub block_len: usize,
    /// Exponent band widths, covering `0..block_len`.
    pub exponent_bands: Vec<usize>,
    /// One past the last coded coefficient.
    pub coefs_end: usize,
    /// First coefficient eligible for noise substitution.
    pub high_band_start: usize,
    /// Widths of the exponent bands clipped to `high_band_start..coefs_end`.
    pub exponent_high_bands: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandLayout {
    /// First coded coefficient, shared by every block size.
    pub coefs_start: usize,
    blocks: Vec<BlockBands>,
    lsp_cos: Vec<i32>,
}

impl BandLayout {
    #[must_use]
    pub fn new(config: &DecoderConfig) -> Self {
        let coefs_start = match config.version {
            WmaVersion::V1 => 3,
            WmaVersion::V2 => 0,
        };

        let blocks = (0..config.nb_block_sizes)
            .map(|k| {
                let block_len = config.frame_len >> k;
                let exponent_bands = exponent_bands(config, k, block_len);
                let coefs_end = (config.frame_len - config.frame_len * 9 / 100) >> k;
                let high_band_start =
                    (block_len * config.high_band_permille as usize + 500) / 1000;
                let exponent_high_bands =
                    clip_bands(&exponent_bands, high_band_start, coefs_end);

                trace!(
                    "Block size {block_len}: {} exponent bands, coefs_end {coefs_end}, high bands from {high_band_start} ({} bands)",
                    exponent_bands.len(),
                    exponent_high_bands.len()
                );

                BlockBands {
                    block_len,
                    exponent_bands,
                    coefs_end,
                    high_band_start,
                    exponent_high_bands,
                }
            })
            .collect();

        let lsp_cos = if config.use_exp_vlc {
            Vec::new()
        } else {
            lsp_cos_table(config.frame_len)
        };

        Self {
            coefs_start,
            blocks,
            lsp_cos,
        }
    }

    /// Layout for block size index `bsize` (`0` is the full frame).
    #[must_use]
    pub fn block(&self, bsize: usize) -> Option<&BlockBands> {
        self.blocks.get(bsize)
    }

    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// `2 * cos(pi * i / frame_len)` in Q28. Empty when exponents are VLC
    /// coded.
    #[must_use]
    pub fn lsp_cos(&self) -> &[i32] {
        &self.lsp_cos
    }
}

fn exponent_bands(config: &DecoderConfig, k: usize, block_len: usize) -> Vec<usize> {
    let sample_rate = config.sample_rate as usize;

    if config.version == WmaVersion::V1 {
        let mut bands = Vec::with_capacity(CRITICAL_FREQS.len());
        let mut last = 0;
        for &freq in &CRITICAL_FREQS {
            let pos = ((block_len * 2 * freq as usize + sample_rate / 2) / sample_rate)
                .min(block_len);
            bands.push(pos - last);
            if pos >= block_len {
                break;
            }
            last = pos;
        }
        cover_tail(&mut bands, block_len);
        return bands;
    }

    let row = (config.frame_len_bits - BLOCK_MIN_BITS).checked_sub(k as u32);
    let table = match row {
        Some(row) if row < 3 => {
            let row = row as usize;
            match config.sample_rate {
                r if r >= 44_100 => Some(EXPONENT_BANDS_44100[row]),
                r if r >= 32_000 => Some(EXPONENT_BANDS_32000[row]),
                r if r >= 22_050 => Some(EXPONENT_BANDS_22050[row]),
                _ => None,
            }
        }
        _ => None,
    };

    if let Some(table) = table {
        return table[1..=usize::from(table[0])]
            .iter()
            .map(|&width| usize::from(width))
            .collect();
    }

    let mut bands = Vec::with_capacity(CRITICAL_FREQS.len());
    let mut last = 0;
    for &freq in &CRITICAL_FREQS {
        let pos = (((block_len * 2 * freq as usize + 2 * sample_rate) / (4 * sample_rate)) << 2)
            .min(block_len);
        if pos > last {
            bands.push(pos - last);
        }
        if pos >= block_len {
            break;
        }
        last = pos;
    }
    cover_tail(&mut bands, block_len);
    bands
}

/// Rates above 49 kHz put the last critical frequency below the block end.
fn cover_tail(bands: &mut Vec<usize>, block_len: usize) {
    let covered: usize = bands.iter().sum();
    if covered < block_len {
        bands.push(block_len - covered);
    }
}

fn clip_bands(bands: &[usize], start: usize, end: usize) -> Vec<usize> {
    let mut clipped = Vec::new();
    let mut pos = 0;
    for &width in bands {
        let band_start = pos.max(start);
        pos += width;
        let band_end = pos.min(end);
        if band_end > band_start {
            clipped.push(band_end - band_start);
        }
    }
    clipped
}

#[allow(clippy::cast_possible_truncation)]
fn lsp_cos_table(frame_len: usize) -> Vec<i32> {
    let frame_len = frame_len as u32;
    (0..frame_len)
        .map(|i| cos_q31(ANGLE_HALF * i / frame_len).raw() >> 2)
        .collect()
}
