//! Position generation by double hashing.
//!
//! Two base hashes per key stand in for `k` independent ones
//! (Kirsch & Mitzenmacher 2006):
//!
//! ```text
//! h₁ = FNV1a(key)
//! h₂ = FNV1a(le_bytes(h₁) ‖ key)
//! gᵢ = (h₁ + i·h₂) mod m        for i in 1..=k
//! ```
//!
//! All arithmetic wraps at 2⁶⁴ before the reduction. Positions are not
//! deduplicated; two of a key's `k` positions may coincide.
//!
//! # References
//!
//! - Kirsch, A., & Mitzenmacher, M. (2006). "Less Hashing, Same Performance: Building a Better Bloom Filter"

#![allow(clippy::cast_possible_truncation)]

use super::fnv::Fnv1a64;
use std::hash::Hasher;
use std::iter::FusedIterator;

/// The two base hashes of a key.
///
/// ```
/// use sieve::hash::KeyHashes;
///
/// let hashes = KeyHashes::of(b"ACGT");
/// let positions: Vec<usize> = hashes.indices(7, 1000).collect();
/// assert_eq!(positions.len(), 7);
/// assert!(positions.iter().all(|&p| p < 1000));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyHashes {
    /// `FNV1a(key)`.
    pub h1: u64,
    /// `FNV1a(le_bytes(h1) ‖ key)`.
    pub h2: u64,
}

impl KeyHashes {
    /// Hash a key. The second hash streams `h1`'s bytes and the key through one
    /// FNV state, so no concatenated buffer is built.
    #[inline]
    #[must_use]
    pub fn of(key: &[u8]) -> Self {
        let mut first = Fnv1a64::new();
        first.write(key);
        let h1 = first.finish();

        let mut second = Fnv1a64::new();
        second.write(&h1.to_le_bytes());
        second.write(key);

        Self {
            h1,
            h2: second.finish(),
        }
    }

    /// The `k` positions of this key in a table of `size` slots.
    ///
    /// # Panics
    ///
    /// Panics if `size` is 0.
    #[inline]
    #[must_use]
    pub fn indices(self, k: usize, size: usize) -> BitIndices {
        assert!(size > 0, "cannot index into an empty table");
        BitIndices {
            h1: self.h1,
            h2: self.h2,
            i: 1,
            k: k as u64,
            size: size as u64,
        }
    }
}

/// Iterator over a key's `k` positions. Allocation-free.
#[derive(Debug, Clone)]
pub struct BitIndices {
    h1: u64,
    h2: u64,
    i: u64,
    k: u64,
    size: u64,
}

impl Iterator for BitIndices {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.i > self.k {
            return None;
        }
        let combined = self.h1.wrapping_add(self.i.wrapping_mul(self.h2));
        self.i += 1;
        Some((combined % self.size) as usize)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.k + 1 - self.i) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BitIndices {}

impl FusedIterator for BitIndices {}

/// Positions of `key` for `k` hashes over `size` slots.
///
/// # Panics
///
/// Panics if `size` is 0.
#[inline]
#[must_use]
pub fn bit_indices(key: &[u8], k: usize, size: usize) -> BitIndices {
    KeyHashes::of(key).indices(k, size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::fnv::fnv1a64;

    // Construction

    #[test]
    fn test_second_hash_chains_first() {
        let key = b"ACGT";
        let hashes = KeyHashes::of(key);
        assert_eq!(hashes.h1, fnv1a64(key));

        let mut chained = hashes.h1.to_le_bytes().to_vec();
        chained.extend_from_slice(key);
        assert_eq!(hashes.h2, fnv1a64(&chained));
    }

    #[test]
    fn test_empty_key() {
        let hashes = KeyHashes::of(b"");
        assert_eq!(hashes.h1, 0xcbf2_9ce4_8422_2325);
        assert_eq!(bit_indices(b"", 3, 10).count(), 3);
    }

    // Formula

    #[test]
    fn test_positions_follow_formula() {
        let hashes = KeyHashes { h1: 10, h2: 3 };
        let got: Vec<usize> = hashes.indices(4, 7).collect();
        // (10 + 3i) mod 7 for i = 1..=4
        assert_eq!(got, vec![6, 2, 5, 1]);
    }

    #[test]
    fn test_positions_wrap_at_u64() {
        let hashes = KeyHashes {
            h1: u64::MAX,
            h2: 2,
        };
        let got: Vec<usize> = hashes.indices(2, 1000).collect();
        assert_eq!(got, vec![1, 3]);
    }

    #[test]
    fn test_k_of_one() {
        let hashes = KeyHashes::of(b"x");
        let got: Vec<usize> = hashes.indices(1, 64).collect();
        assert_eq!(got, vec![(hashes.h1.wrapping_add(hashes.h2) % 64) as usize]);
    }

    // Determinism Tests

    #[test]
    fn test_determinism() {
        let a: Vec<usize> = bit_indices(b"GATTACA", 7, 9586).collect();
        let b: Vec<usize> = bit_indices(b"GATTACA", 7, 9586).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_distinct_keys_differ() {
        let a: Vec<usize> = bit_indices(b"GATTACA", 7, 1 << 20).collect();
        let b: Vec<usize> = bit_indices(b"GATTACT", 7, 1 << 20).collect();
        assert_ne!(a, b);
    }

    // Iterator contract

    #[test]
    fn test_exact_size_and_fused() {
        let mut it = bit_indices(b"ACGT", 5, 100);
        assert_eq!(it.len(), 5);
        it.next();
        assert_eq!(it.len(), 4);
        for _ in 0..4 {
            it.next();
        }
        assert_eq!(it.len(), 0);
        assert_eq!(it.next(), None);
        assert_eq!(it.next(), None);
    }

    #[test]
    fn test_in_range_for_odd_sizes() {
        for size in [1, 2, 3, 63, 65, 9586] {
            assert!(bit_indices(b"TTTT", 64, size).all(|p| p < size));
        }
    }

    #[test]
    #[should_panic(expected = "empty table")]
    fn test_zero_size_panics() {
        let _ = bit_indices(b"ACGT", 3, 0);
    }
}
