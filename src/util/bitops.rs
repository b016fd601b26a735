//! Word-level bit manipulation helpers.
//!
//! Storage in this crate is always a slice of 64-bit words. These helpers map
//! bit indices onto words, count set bits per word, and count non-zero lanes
//! when a word is carved into fixed-width counters.
//!
//! # Population count
//!
//! [`popcount`] is the branchless SWAR ("SIMD within a register") reduction:
//! pairwise sums of bits, then nibble sums, then byte sums folded into the top
//! byte by a single multiply. It is O(words), never O(bits).

#![allow(clippy::cast_possible_truncation)]

/// Bits per storage word.
pub const WORD_BITS: usize = 64;

const M1: u64 = 0x5555_5555_5555_5555;
const M2: u64 = 0x3333_3333_3333_3333;
const M4: u64 = 0x0f0f_0f0f_0f0f_0f0f;
const H01: u64 = 0x0101_0101_0101_0101;

/// Count set bits in a word using the SWAR reduction.
///
/// # Examples
///
/// ```
/// use sieve::util::bitops::popcount;
///
/// assert_eq!(popcount(0), 0);
/// assert_eq!(popcount(0b1011), 3);
/// assert_eq!(popcount(u64::MAX), 64);
/// ```
#[inline]
#[must_use]
pub const fn popcount(word: u64) -> u32 {
    let mut x = word;
    x -= (x >> 1) & M1;
    x = (x & M2) + ((x >> 2) & M2);
    x = (x + (x >> 4)) & M4;
    (x.wrapping_mul(H01) >> 56) as u32
}

/// Number of words needed to hold `bits` bits.
#[inline]
#[must_use]
pub const fn words_for_bits(bits: usize) -> usize {
    (bits + WORD_BITS - 1) / WORD_BITS
}

/// Index of the word holding bit `index`.
#[inline(always)]
#[must_use]
pub const fn word_index(index: usize) -> usize {
    index / WORD_BITS
}

/// Single-bit mask for bit `index` within its word.
#[inline(always)]
#[must_use]
pub const fn bit_mask(index: usize) -> u64 {
    1u64 << (index % WORD_BITS)
}

/// Mask of the valid bits in the last word of a `len`-bit array.
///
/// Returns `u64::MAX` when `len` is a multiple of 64.
///
/// ```
/// use sieve::util::bitops::tail_mask;
///
/// assert_eq!(tail_mask(64), u64::MAX);
/// assert_eq!(tail_mask(3), 0b111);
/// assert_eq!(tail_mask(130), 0b11);
/// ```
#[inline]
#[must_use]
pub const fn tail_mask(len: usize) -> u64 {
    match len % WORD_BITS {
        0 => u64::MAX,
        r => (1u64 << r) - 1,
    }
}

/// A word with only the lowest bit of every `width`-bit lane set.
///
/// `width` must divide 64.
#[inline]
#[must_use]
pub const fn lane_low_bits(width: u32) -> u64 {
    if width >= 64 {
        1
    } else {
        u64::MAX / ((1u64 << width) - 1)
    }
}

/// Count the `width`-bit lanes of `word` that hold a non-zero value.
///
/// Each lane is OR-folded into its lowest bit, then the low bits are counted.
///
/// ```
/// use sieve::util::bitops::count_nonzero_lanes;
///
/// // Two 8-bit lanes: 0x80 and 0x01; the rest are zero.
/// assert_eq!(count_nonzero_lanes(0x0000_0000_0080_0001, 8), 2);
/// assert_eq!(count_nonzero_lanes(u64::MAX, 16), 4);
/// ```
#[inline]
#[must_use]
pub const fn count_nonzero_lanes(word: u64, width: u32) -> u32 {
    let mut x = word;
    let mut shift = 1;
    while shift < width {
        x |= x >> shift;
        shift <<= 1;
    }
    popcount(x & lane_low_bits(width))
}
