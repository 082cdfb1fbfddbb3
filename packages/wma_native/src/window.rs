//! Sine windows and block overlap-add.

use std::sync::LazyLock;

use crate::{
    config::{BLOCK_MAX_BITS, BLOCK_MIN_BITS},
    fixed::{mul_q31, sin_q31},
};

/// `w[i] = sin((i + 1/2) * pi / (2 * len))` for `i < len`, in Q31.
fn sine_window(bits: u32) -> Vec<i32> {
    let len = 1_u32 << bits;
    (0..len)
        .map(|i| sin_q31(4096 * (2 * i + 1) / len).raw())
        .collect()
}

static WINDOWS: LazyLock<Vec<Vec<i32>>> =
    LazyLock::new(|| (BLOCK_MIN_BITS..=BLOCK_MAX_BITS).map(sine_window).collect());

/// Rising half of the window for blocks of `2^bits` samples.
///
/// `bits` must be within the supported block range.
#[must_use]
pub fn window(bits: u32) -> &'static [i32] {
    let index = bits.clamp(BLOCK_MIN_BITS, BLOCK_MAX_BITS) - BLOCK_MIN_BITS;
    &WINDOWS[index as usize]
}

/// Block lengths (as `log2`) around the block being overlapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockShape {
    pub prev_bits: u32,
    pub bits: u32,
    pub next_bits: u32,
}

/// Windows the `2 * block_len` transform output in `input` and adds it to
/// `out`, which starts at the block's left overlap edge.
///
/// Each side uses the slope of the shorter of the two neighbouring blocks;
/// where a longer block meets a shorter one the flat part is copied on the
/// left and zero on the right.
pub fn overlap_add(out: &mut [i32], input: &[i32], shape: BlockShape) {
    let block_len = 1_usize << shape.bits;

    let (left_out, right_out) = out[..2 * block_len].split_at_mut(block_len);
    let (left_in, right_in) = input[..2 * block_len].split_at(block_len);

    if shape.bits <= shape.prev_bits {
        let w = window(shape.bits);
        for ((o, &x), &w) in left_out.iter_mut().zip(left_in).zip(w) {
            *o = o.saturating_add(mul_q31(x, w));
        }
    } else {
        let prev_len = 1_usize << shape.prev_bits;
        let n = (block_len - prev_len) / 2;
        let w = window(shape.prev_bits);
        for ((o, &x), &w) in left_out[n..n + prev_len]
            .iter_mut()
            .zip(&left_in[n..n + prev_len])
            .zip(w)
        {
            *o = o.saturating_add(mul_q31(x, w));
        }
        left_out[n + prev_len..].copy_from_slice(&left_in[n + prev_len..]);
    }

    if shape.bits <= shape.next_bits {
        let w = window(shape.bits);
        for ((o, &x), &w) in right_out.iter_mut().zip(right_in).zip(w.iter().rev()) {
            *o = mul_q31(x, w);
        }
    } else {
        let next_len = 1_usize << shape.next_bits;
        let n = (block_len - next_len) / 2;
        let w = window(shape.next_bits);
        right_out[..n].copy_from_slice(&right_in[..n]);
        for ((o, &x), &w) in right_out[n..n + next_len]
            .iter_mut()
            .zip(&right_in[n..n + next_len])
            .zip(w.iter().rev())
        {
            *o = mul_q31(x, w);
        }
        right_out[n + next_len..].fill(0);
    }
}
