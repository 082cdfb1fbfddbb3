//! Spectral envelope from line spectral pairs.

use crate::{bitstream::BitReader, error::Result, fixed::Gain, tables::LSP_CODEBOOK_Q28};

pub const NB_LSP_COEFS: usize = 10;

const Q28_ONE: i64 = 1 << 28;
const Q28_TWO: i64 = 2 << 28;

/// Reads the ten quantized LSP values (`2 * cos(w)`, Q28).
///
/// # Errors
///
/// * `CorruptStream` - If the reader runs out of bits
pub fn read_lsp_coefs(reader: &mut BitReader<'_>) -> Result<[i32; NB_LSP_COEFS]> {
    let mut coefs = [0; NB_LSP_COEFS];
    for (i, coef) in coefs.iter_mut().enumerate() {
        let bits = if i == 0 || i >= 8 { 3 } else { 4 };
        let index = reader.read_bits(bits)? as usize;
        *coef = LSP_CODEBOOK_Q28[i][index];
    }
    Ok(coefs)
}

#[inline]
#[allow(clippy::cast_possible_truncation)]
fn mul_q28(a: i64, b: i64) -> i64 {
    ((i128::from(a) * i128::from(b)) >> 28) as i64
}

/// Evaluates `|A(w)|^(-1/2)` at the first `curve.len()` entries of `lsp_cos`.
///
/// Returns the largest value.
pub fn lsp_to_curve(lsp_cos: &[i32], lsp: &[i32; NB_LSP_COEFS], curve: &mut [Gain]) -> Gain {
    let mut max = Gain::ZERO;
    for (value, &w) in curve.iter_mut().zip(lsp_cos) {
        let w = i64::from(w);
        let mut p = Q28_ONE / 2;
        let mut q = Q28_ONE / 2;
        for pair in lsp.chunks_exact(2) {
            q = mul_q28(q, w - i64::from(pair[0]));
            p = mul_q28(p, w - i64::from(pair[1]));
        }
        let p = mul_q28(mul_q28(p, p), Q28_TWO - w);
        let q = mul_q28(mul_q28(q, q), Q28_TWO + w);

        #[allow(clippy::cast_sign_loss)]
        let power = (p + q).max(0) as u64;
        *value = Gain::from_fraction(power, 28).pow_m1_4();
        max = max.max(*value);
    }
    max
}

/// Decodes an LSP-coded envelope of `out.len()` bins into Q30 ratios of the
/// block peak.
///
/// `curve` is scratch space of at least `out.len()` entries.
///
/// # Errors
///
/// * `CorruptStream` - If the reader runs out of bits
pub fn decode_exponents_lsp(
    reader: &mut BitReader<'_>,
    lsp_cos: &[i32],
    curve: &mut [Gain],
    out: &mut [u32],
) -> Result<()> {
    let lsp = read_lsp_coefs(reader)?;
    let curve = &mut curve[..out.len()];
    let max = lsp_to_curve(lsp_cos, &lsp, curve);
    let inv_max = max.recip();

    for (ratio, value) in out.iter_mut().zip(curve.iter()) {
        #[allow(clippy::cast_sign_loss)]
        let q30 = value.mul_gain(inv_max).apply(1 << 30, 0).max(0) as u32;
        *ratio = q30;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitstream::BitWriter;

    fn cos_table(len: usize) -> Vec<i32> {
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
        (0..len)
            .map(|i| {
                (2.0 * (std::f64::consts::PI * i as f64 / len as f64).cos() * f64::from(1 << 28))
                    as i32
            })
            .collect()
    }

    #[test]
    fn test_read_lsp_coefs_field_widths() {
        let mut writer = BitWriter::new();
        writer.write_bits(7, 3);
        for i in 1..8 {
            writer.write_bits(i, 4);
        }
        writer.write_bits(0, 3);
        writer.write_bits(5, 3);
        let len = writer.bit_len();
        assert_eq!(len, 37);
        let bytes = writer.into_padded(8);

        let mut reader = BitReader::new(&bytes);
        let coefs = read_lsp_coefs(&mut reader).unwrap();
        assert_eq!(reader.bits_consumed(), 37);
        assert_eq!(coefs[0], LSP_CODEBOOK_Q28[0][7]);
        assert_eq!(coefs[3], LSP_CODEBOOK_Q28[3][3]);
        assert_eq!(coefs[9], LSP_CODEBOOK_Q28[9][5]);
    }

    #[test]
    fn test_curve_matches_float_evaluation() {
        let table = cos_table(256);
        let lsp = [
            LSP_CODEBOOK_Q28[0][2],
            LSP_CODEBOOK_Q28[1][5],
            LSP_CODEBOOK_Q28[2][8],
            LSP_CODEBOOK_Q28[3][1],
            LSP_CODEBOOK_Q28[4][9],
            LSP_CODEBOOK_Q28[5][4],
            LSP_CODEBOOK_Q28[6][11],
            LSP_CODEBOOK_Q28[7][0],
            LSP_CODEBOOK_Q28[8][6],
            LSP_CODEBOOK_Q28[9][3],
        ];
        let mut curve = vec![Gain::ZERO; 256];
        let max = lsp_to_curve(&table, &lsp, &mut curve);
        assert!(!max.is_zero());

        let to_f64 = |g: Gain| f64::from(g.mantissa()) / f64::from(1 << 30) * 2_f64.powi(g.exponent());
        let scale = f64::from(1 << 28);
        for (i, value) in curve.iter().enumerate().step_by(13) {
            let w = f64::from(table[i]) / scale;
            let (mut p, mut q) = (0.5, 0.5);
            for pair in lsp.chunks_exact(2) {
                q *= w - f64::from(pair[0]) / scale;
                p *= w - f64::from(pair[1]) / scale;
            }
            let expected = (p * p * (2.0 - w) + q * q * (2.0 + w)).powf(-0.25);
            let actual = to_f64(*value);
            assert!(
                ((actual - expected) / expected).abs() < 1e-2,
                "bin {i}: {actual} vs {expected}"
            );
        }
    }

    #[test]
    fn test_decoded_envelope_peaks_at_one() {
        let mut writer = BitWriter::new();
        writer.write_bits(3, 3);
        for _ in 1..8 {
            writer.write_bits(6, 4);
        }
        writer.write_bits(2, 3);
        writer.write_bits(2, 3);
        let bytes = writer.into_padded(8);

        let table = cos_table(128);
        let mut curve = vec![Gain::ZERO; 128];
        let mut out = vec![0_u32; 128];
        let mut reader = BitReader::new(&bytes);
        decode_exponents_lsp(&mut reader, &table, &mut curve, &mut out).unwrap();

        let peak = *out.iter().max().unwrap();
        assert!(peak.abs_diff(1 << 30) < 1 << 12, "peak {peak}");
        assert!(out.iter().all(|&v| v <= peak));
    }
}
