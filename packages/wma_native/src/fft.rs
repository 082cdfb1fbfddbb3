//! Fixed-point split-radix complex FFT.
//!
//! Input is expected in the order given by [`Fft::revtab`]; with that
//! permutation the transform computes `X[m] = sum_k x[k] * e^(+2 pi i k m / n)`.
//! Sizes 4, 8 and 16 are unrolled, larger sizes recurse as one half-size and
//! two quarter-size transforms followed by a twiddle pass.

use crate::{
    error::{Error, Result},
    fixed::{ANGLE_FULL, cos_q31, mac64, saturate_i32, sin_q31},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Complex {
    pub re: i32,
    pub im: i32,
}

impl Complex {
    #[must_use]
    pub const fn new(re: i32, im: i32) -> Self {
        Self { re, im }
    }
}

/// `a * b` with Q31 `b`, rounded down and saturated.
#[inline]
pub(crate) const fn cmul(are: i32, aim: i32, bre: i32, bim: i32) -> (i32, i32) {
    let re = mac64(-(aim as i64 * bim as i64), are, bre) >> 31;
    let im = mac64(aim as i64 * bre as i64, are, bim) >> 31;
    (saturate_i32(re), saturate_i32(im))
}

#[derive(Debug, Clone, Copy)]
struct Twiddle {
    cos: i32,
    sin: i32,
}

const FFT_MIN_BITS: u32 = 2;
const FFT_MAX_BITS: u32 = 12;

#[derive(Debug, Clone)]
pub struct Fft {
    bits: u32,
    revtab: Vec<u16>,
    /// `twiddles[b]` holds `(cos, sin)(2 pi k / 2^b)` for `k < 2^b / 4`.
    twiddles: Vec<Vec<Twiddle>>,
}

impl Fft {
    /// # Errors
    ///
    /// * `InitFailed` - If `bits` is outside `2..=12`
    pub fn new(bits: u32) -> Result<Self> {
        if !(FFT_MIN_BITS..=FFT_MAX_BITS).contains(&bits) {
            return Err(Error::InitFailed(format!(
                "FFT of 2^{bits} points is unsupported"
            )));
        }
        let n = 1_usize << bits;

        let mut revtab = vec![0_u16; n];
        #[allow(clippy::cast_possible_wrap)]
        let mask = (n - 1) as isize;
        for (i, _) in (0_u16..).zip(0..n) {
            let j = split_radix_permutation(usize::from(i), n);
            #[allow(clippy::cast_sign_loss)]
            let slot = (-j & mask) as usize;
            revtab[slot] = i;
        }

        let twiddles = (0..=bits)
            .map(|b| {
                if b < 5 {
                    return Vec::new();
                }
                let size = 1_u32 << b;
                let step = ANGLE_FULL / size;
                (0..size / 4)
                    .map(|k| Twiddle {
                        cos: cos_q31(step * k).raw(),
                        sin: sin_q31(step * k).raw(),
                    })
                    .collect()
            })
            .collect();

        Ok(Self {
            bits,
            revtab,
            twiddles,
        })
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        1 << self.bits
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Input permutation: element `k` of the natural-order input goes to
    /// `z[revtab[k]]`.
    #[must_use]
    pub fn revtab(&self) -> &[u16] {
        &self.revtab
    }

    /// Transforms `z` in place. `z.len()` must equal [`Fft::len`].
    pub fn transform(&self, z: &mut [Complex]) {
        debug_assert_eq!(z.len(), self.len());
        self.fft(z);
    }

    fn fft(&self, z: &mut [Complex]) {
        match z.len() {
            4 => fft4(z),
            8 => fft8(z),
            16 => fft16(z),
            n => {
                let (half, rest) = z.split_at_mut(n / 2);
                self.fft(half);
                let (q1, q2) = rest.split_at_mut(n / 4);
                self.fft(q1);
                self.fft(q2);
                pass(z, &self.twiddles[n.trailing_zeros() as usize]);
            }
        }
    }
}

/// Position of input `i` before the final negation, in `-n..n`.
fn split_radix_permutation(i: usize, n: usize) -> isize {
    if n <= 2 {
        return isize::from(i & 1 == 1);
    }
    let m = n >> 1;
    if i & m == 0 {
        return split_radix_permutation(i, m) * 2;
    }
    let m = m >> 1;
    if i & m == 0 {
        split_radix_permutation(i, m) * 4 + 1
    } else {
        split_radix_permutation(i, m) * 4 - 1
    }
}

#[inline]
#[allow(clippy::too_many_arguments)]
fn butterflies(z: &mut [Complex], a: [usize; 4], t1: i32, t2: i32, t5: i32, t6: i32) {
    let [a0, a1, a2, a3] = a;
    let t3 = t5.wrapping_sub(t1);
    let t5 = t5.wrapping_add(t1);
    z[a2].re = z[a0].re.wrapping_sub(t5);
    z[a0].re = z[a0].re.wrapping_add(t5);
    z[a3].im = z[a1].im.wrapping_sub(t3);
    z[a1].im = z[a1].im.wrapping_add(t3);
    let t4 = t2.wrapping_sub(t6);
    let t6 = t2.wrapping_add(t6);
    z[a3].re = z[a1].re.wrapping_sub(t4);
    z[a1].re = z[a1].re.wrapping_add(t4);
    z[a2].im = z[a0].im.wrapping_sub(t6);
    z[a0].im = z[a0].im.wrapping_add(t6);
}

#[inline]
fn transform(z: &mut [Complex], a: [usize; 4], wre: i32, wim: i32) {
    let (t1, t2) = cmul(z[a[2]].re, z[a[2]].im, wre, wim.saturating_neg());
    let (t5, t6) = cmul(z[a[3]].re, z[a[3]].im, wre, wim);
    butterflies(z, a, t1, t2, t5, t6);
}

#[inline]
fn transform_zero(z: &mut [Complex], a: [usize; 4]) {
    let (t1, t2) = (z[a[2]].re, z[a[2]].im);
    let (t5, t6) = (z[a[3]].re, z[a[3]].im);
    butterflies(z, a, t1, t2, t5, t6);
}

const SQRT_HALF_Q31: i32 = cos_q31(ANGLE_FULL / 8).raw();
const COS_16_1_Q31: i32 = cos_q31(ANGLE_FULL / 16).raw();
const COS_16_3_Q31: i32 = cos_q31(3 * ANGLE_FULL / 16).raw();

fn fft4(z: &mut [Complex]) {
    let t3 = z[0].re.wrapping_sub(z[1].re);
    let t1 = z[0].re.wrapping_add(z[1].re);
    let t8 = z[3].re.wrapping_sub(z[2].re);
    let t6 = z[3].re.wrapping_add(z[2].re);
    z[2].re = t1.wrapping_sub(t6);
    z[0].re = t1.wrapping_add(t6);
    let t4 = z[0].im.wrapping_sub(z[1].im);
    let t2 = z[0].im.wrapping_add(z[1].im);
    let t7 = z[2].im.wrapping_sub(z[3].im);
    let t5 = z[2].im.wrapping_add(z[3].im);
    z[3].im = t4.wrapping_sub(t8);
    z[1].im = t4.wrapping_add(t8);
    z[3].re = t3.wrapping_sub(t7);
    z[1].re = t3.wrapping_add(t7);
    z[2].im = t2.wrapping_sub(t5);
    z[0].im = t2.wrapping_add(t5);
}

fn fft8(z: &mut [Complex]) {
    fft4(&mut z[..4]);
    let t1 = z[4].re.wrapping_add(z[5].re);
    z[5].re = z[4].re.wrapping_sub(z[5].re);
    let t2 = z[4].im.wrapping_add(z[5].im);
    z[5].im = z[4].im.wrapping_sub(z[5].im);
    let t5 = z[6].re.wrapping_add(z[7].re);
    z[7].re = z[6].re.wrapping_sub(z[7].re);
    let t6 = z[6].im.wrapping_add(z[7].im);
    z[7].im = z[6].im.wrapping_sub(z[7].im);
    butterflies(z, [0, 2, 4, 6], t1, t2, t5, t6);
    transform(z, [1, 3, 5, 7], SQRT_HALF_Q31, SQRT_HALF_Q31);
}

fn fft16(z: &mut [Complex]) {
    fft8(&mut z[..8]);
    fft4(&mut z[8..12]);
    fft4(&mut z[12..]);
    transform_zero(z, [0, 4, 8, 12]);
    transform(z, [2, 6, 10, 14], SQRT_HALF_Q31, SQRT_HALF_Q31);
    transform(z, [1, 5, 9, 13], COS_16_1_Q31, COS_16_3_Q31);
    transform(z, [3, 7, 11, 15], COS_16_3_Q31, COS_16_1_Q31);
}

fn pass(z: &mut [Complex], twiddles: &[Twiddle]) {
    let quarter = z.len() / 4;
    transform_zero(z, [0, quarter, 2 * quarter, 3 * quarter]);
    for (k, w) in twiddles.iter().enumerate().take(quarter).skip(1) {
        transform(
            z,
            [k, quarter + k, 2 * quarter + k, 3 * quarter + k],
            w.cos,
            w.sin,
        );
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn pseudo_random(seed: &mut u32) -> i32 {
        *seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        #[allow(clippy::cast_possible_wrap)]
        let value = (*seed as i32) >> 11;
        value
    }

    #[test_case(2 ; "size_4")]
    #[test_case(3 ; "size_8")]
    #[test_case(4 ; "size_16")]
    #[test_case(5 ; "size_32")]
    #[test_case(6 ; "size_64")]
    #[test_case(8 ; "size_256")]
    fn test_fft_matches_direct_dft(bits: u32) {
        let fft = Fft::new(bits).unwrap();
        let n = fft.len();
        let mut seed = 0x1234_5678;
        let input: Vec<Complex> = (0..n)
            .map(|_| Complex::new(pseudo_random(&mut seed), pseudo_random(&mut seed)))
            .collect();

        let mut z = vec![Complex::default(); n];
        for (k, value) in input.iter().enumerate() {
            z[usize::from(fft.revtab()[k])] = *value;
        }
        fft.transform(&mut z);

        #[allow(clippy::cast_precision_loss)]
        for (m, out) in z.iter().enumerate() {
            let (mut re, mut im) = (0.0_f64, 0.0_f64);
            for (k, value) in input.iter().enumerate() {
                let angle = std::f64::consts::TAU * ((k * m) % n) as f64 / n as f64;
                re += f64::from(value.re) * angle.cos() - f64::from(value.im) * angle.sin();
                im += f64::from(value.re) * angle.sin() + f64::from(value.im) * angle.cos();
            }
            let tolerance = 4.0 * n as f64;
            assert!((f64::from(out.re) - re).abs() < tolerance, "re[{m}]");
            assert!((f64::from(out.im) - im).abs() < tolerance, "im[{m}]");
        }
    }

    #[test]
    fn test_revtab_is_permutation() {
        let fft = Fft::new(7).unwrap();
        let mut seen = vec![false; fft.len()];
        for &index in fft.revtab() {
            assert!(!seen[usize::from(index)]);
            seen[usize::from(index)] = true;
        }
    }

    #[test]
    fn test_every_supported_size_builds() {
        for bits in FFT_MIN_BITS..=FFT_MAX_BITS {
            let fft = Fft::new(bits).unwrap();
            let mut seen = vec![false; fft.len()];
            for &index in fft.revtab() {
                assert!(!seen[usize::from(index)], "bits {bits}: duplicate {index}");
                seen[usize::from(index)] = true;
            }
        }
    }

    #[test]
    fn test_permutation_of_small_sizes() {
        assert_eq!(Fft::new(2).unwrap().revtab(), &[0, 3, 1, 2]);
        assert_eq!(Fft::new(3).unwrap().revtab(), &[0, 6, 3, 5, 1, 7, 2, 4]);
    }

    #[test]
    fn test_unsupported_size() {
        assert!(Fft::new(1).is_err());
        assert!(Fft::new(13).is_err());
    }
}
