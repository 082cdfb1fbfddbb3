//! Conversion of overlap-added output to interleaved 16-bit PCM.

/// Fractional bits of decoder sample values below the 16-bit PCM unit.
pub const PCM_SHIFT: u32 = 10;

/// Rounds a decoder sample down to PCM and clips it to `i16`.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn to_pcm(sample: i32) -> i16 {
    let value = sample >> PCM_SHIFT;
    if value > i16::MAX as i32 {
        i16::MAX
    } else if value < i16::MIN as i32 {
        i16::MIN
    } else {
        value as i16
    }
}

/// Writes `left.len()` interleaved stereo frames to `out`.
///
/// A mono stream passes `None` for `right` and is duplicated into both
/// slots. `out` must hold at least `2 * left.len()` samples.
pub fn write_interleaved(left: &[i32], right: Option<&[i32]>, out: &mut [i16]) {
    let out = &mut out[..2 * left.len()];
    match right {
        Some(right) => {
            for ((pair, &l), &r) in out.chunks_exact_mut(2).zip(left).zip(right) {
                pair[0] = to_pcm(l);
                pair[1] = to_pcm(r);
            }
        }
        None => {
            for (pair, &l) in out.chunks_exact_mut(2).zip(left) {
                let sample = to_pcm(l);
                pair[0] = sample;
                pair[1] = sample;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::*;

    #[test_case(0, 0 ; "zero")]
    #[test_case(1023, 0 ; "below_one")]
    #[test_case(1024, 1 ; "one")]
    #[test_case(-1, -1 ; "floors_negative")]
    #[test_case(i32::MAX, i16::MAX ; "clips_high")]
    #[test_case(i32::MIN, i16::MIN ; "clips_low")]
    #[test_case(32_767 << 10, 32_767 ; "full_scale")]
    fn test_to_pcm(sample: i32, expected: i16) {
        assert_eq!(to_pcm(sample), expected);
    }

    #[test]
    fn test_stereo_interleave() {
        let mut out = [0_i16; 6];
        write_interleaved(&[1 << 10, 2 << 10, 3 << 10], Some(&[-1 << 10, -2 << 10, -3 << 10]), &mut out);
        assert_eq!(out, [1, -1, 2, -2, 3, -3]);
    }

    #[test]
    fn test_mono_is_duplicated() {
        let mut out = [9_i16; 6];
        write_interleaved(&[5 << 10, 6 << 10], None, &mut out);
        assert_eq!(out, [5, 5, 6, 6, 9, 9]);
    }
}
