use std::sync::LazyLock;

use log::debug;

use crate::{
    config::{BLOCK_MAX_BITS, BLOCK_MIN_BITS},
    error::{Error, Result},
    fft::{Complex, Fft, cmul},
    fixed::{cos_q31, sin_q31},
};

/// Inverse MDCT of `n = 2^bits` output samples from `n / 2` coefficients.
///
/// Computes `y[m] = -sum_k X[k] * cos(2 pi / n * (m + 1/2 + n/4) * (k + 1/2))`
/// through an `n / 4` point complex FFT. No output scaling is applied.
#[derive(Debug, Clone)]
pub struct Imdct {
    bits: u32,
    tcos: Vec<i32>,
    tsin: Vec<i32>,
    fft: Fft,
}

impl Imdct {
    /// # Errors
    ///
    /// * `InitFailed` - If the quarter-size FFT cannot be built
    pub fn new(bits: u32) -> Result<Self> {
        if bits < 4 {
            return Err(Error::InitFailed(format!(
                "IMDCT of 2^{bits} points is unsupported"
            )));
        }
        let fft = Fft::new(bits - 2)?;
        let n = 1_u32 << bits;
        let n4 = n / 4;

        // -(cos, sin)(2 pi (k + 1/8) / n)
        let angle = |k: u32| 4096 * (8 * k + 1) / n;
        let tcos = (0..n4)
            .map(|k| cos_q31(angle(k)).raw().saturating_neg())
            .collect();
        let tsin = (0..n4)
            .map(|k| sin_q31(angle(k)).raw().saturating_neg())
            .collect();

        Ok(Self {
            bits,
            tcos,
            tsin,
            fft,
        })
    }

    /// Number of output samples.
    #[must_use]
    pub const fn len(&self) -> usize {
        1 << self.bits
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Computes the middle half of the output, `y[n/4 .. 3n/4]`.
    ///
    /// `input` and `output` hold `n / 2` values; `scratch` holds `n / 4`.
    pub fn imdct_half(&self, output: &mut [i32], input: &[i32], scratch: &mut [Complex]) {
        let n = self.len();
        let n2 = n / 2;
        let n4 = n / 4;
        let n8 = n / 8;
        let z = &mut scratch[..n4];
        let revtab = self.fft.revtab();

        for k in 0..n4 {
            let (re, im) = cmul(input[n2 - 1 - 2 * k], input[2 * k], self.tcos[k], self.tsin[k]);
            z[usize::from(revtab[k])] = Complex::new(re, im);
        }

        self.fft.transform(z);

        for k in 0..n8 {
            let a = n8 - k - 1;
            let b = n8 + k;
            let (r0, i1) = cmul(z[a].im, z[a].re, self.tsin[a], self.tcos[a]);
            let (r1, i0) = cmul(z[b].im, z[b].re, self.tsin[b], self.tcos[b]);
            z[a] = Complex::new(r0, i0);
            z[b] = Complex::new(r1, i1);
        }

        for (pair, value) in output[..n2].chunks_exact_mut(2).zip(z.iter()) {
            pair[0] = value.re;
            pair[1] = value.im;
        }
    }

    /// Computes all `n` output samples.
    ///
    /// `input` holds `n / 2` coefficients, `output` holds `n` samples and
    /// `scratch` holds `n / 4` values.
    pub fn imdct_full(&self, output: &mut [i32], input: &[i32], scratch: &mut [Complex]) {
        let n = self.len();
        let n2 = n / 2;
        let n4 = n / 4;

        self.imdct_half(&mut output[n4..n4 + n2], input, scratch);
        for k in 0..n4 {
            output[k] = output[n2 - k - 1].saturating_neg();
            output[n - k - 1] = output[n2 + k];
        }
    }
}

static TRANSFORMS: LazyLock<Result<Vec<Imdct>>> = LazyLock::new(|| {
    debug!("Building IMDCT tables for block sizes 2^{BLOCK_MIN_BITS}..=2^{BLOCK_MAX_BITS}");
    (BLOCK_MIN_BITS..=BLOCK_MAX_BITS)
        .map(|bits| Imdct::new(bits + 1))
        .collect()
});

/// Shared transform for blocks of `2^block_len_bits` coefficients.
///
/// # Errors
///
/// * `InitFailed` - If the transform tables failed to build or the size is
///   outside the supported block range
pub fn imdct_for_block(block_len_bits: u32) -> Result<&'static Imdct> {
    let transforms = TRANSFORMS.as_ref().map_err(Clone::clone)?;
    block_len_bits
        .checked_sub(BLOCK_MIN_BITS)
        .and_then(|index| transforms.get(index as usize))
        .ok_or_else(|| {
            Error::InitFailed(format!("no transform for 2^{block_len_bits} coefficients"))
        })
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn reference(input: &[i32], n: usize) -> Vec<f64> {
        #[allow(clippy::cast_precision_loss)]
        let nf = n as f64;
        (0..n)
            .map(|m| {
                #[allow(clippy::cast_precision_loss)]
                let mf = m as f64;
                -input
                    .iter()
                    .enumerate()
                    .map(|(k, &x)| {
                        #[allow(clippy::cast_precision_loss)]
                        let kf = k as f64;
                        f64::from(x)
                            * (std::f64::consts::TAU / nf * (mf + 0.5 + nf / 4.0) * (kf + 0.5))
                                .cos()
                    })
                    .sum::<f64>()
            })
            .collect()
    }

    #[test_case(5 ; "n_32")]
    #[test_case(8 ; "n_256")]
    #[test_case(9 ; "n_512")]
    #[test_case(12 ; "n_4096")]
    fn test_imdct_matches_direct_formula(bits: u32) {
        let imdct = Imdct::new(bits).unwrap();
        let n = imdct.len();
        let mut seed = 0x0bad_f00d_u32;
        let input: Vec<i32> = (0..n / 2)
            .map(|_| {
                seed = seed.wrapping_mul(69_069).wrapping_add(1);
                #[allow(clippy::cast_possible_wrap)]
                let value = (seed as i32) >> 15;
                value
            })
            .collect();

        let mut output = vec![0; n];
        let mut scratch = vec![Complex::default(); n / 4];
        imdct.imdct_full(&mut output, &input, &mut scratch);

        #[allow(clippy::cast_precision_loss)]
        let tolerance = n as f64;
        for (m, (actual, expected)) in output.iter().zip(reference(&input, n)).enumerate() {
            assert!(
                (f64::from(*actual) - expected).abs() < tolerance,
                "y[{m}] = {actual}, expected {expected}"
            );
        }
    }

    #[test]
    fn test_zero_input_gives_zero_output() {
        let imdct = imdct_for_block(7).unwrap();
        let input = vec![0; 128];
        let mut output = vec![1; 256];
        let mut scratch = vec![Complex::default(); 64];
        imdct.imdct_full(&mut output, &input, &mut scratch);
        assert!(output.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_shared_transforms_cover_block_range() {
        for bits in BLOCK_MIN_BITS..=BLOCK_MAX_BITS {
            assert_eq!(imdct_for_block(bits).unwrap().len(), 2 << bits);
        }
        assert!(imdct_for_block(BLOCK_MAX_BITS + 1).is_err());
        assert!(imdct_for_block(BLOCK_MIN_BITS - 1).is_err());
    }
}
