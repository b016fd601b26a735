//! FNV-1a, 64-bit.
//!
//! Offset basis `0xcbf29ce484222325`, prime `0x100000001b3`, wrapping
//! arithmetic, no finalization. Each input byte is XORed in as an unsigned
//! value before the multiply.
//!
//! ```
//! use sieve::hash::fnv::fnv1a64;
//!
//! assert_eq!(fnv1a64(b""), 0xcbf29ce484222325);
//! assert_eq!(fnv1a64(b"a"), 0xaf63dc4c8601ec8c);
//! ```

use std::hash::{BuildHasherDefault, Hasher};

/// FNV-1a 64-bit offset basis.
pub const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

/// FNV-1a 64-bit prime.
pub const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Hash a byte slice in one call.
#[inline]
#[must_use]
pub fn fnv1a64(bytes: &[u8]) -> u64 {
    let mut hasher = Fnv1a64::new();
    hasher.write(bytes);
    hasher.finish()
}

/// Streaming FNV-1a state.
///
/// Feeding bytes in several `write` calls gives the same result as one call
/// over their concatenation.
///
/// ```
/// use sieve::hash::fnv::{fnv1a64, Fnv1a64};
/// use std::hash::Hasher;
///
/// let mut h = Fnv1a64::new();
/// h.write(b"foo");
/// h.write(b"bar");
/// assert_eq!(h.finish(), fnv1a64(b"foobar"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fnv1a64 {
    state: u64,
}

impl Fnv1a64 {
    /// Fresh state at the offset basis.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: FNV_OFFSET_BASIS,
        }
    }
}

impl Default for Fnv1a64 {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for Fnv1a64 {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        let mut hash = self.state;
        for &b in bytes {
            hash ^= u64::from(b);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        self.state = hash;
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.state
    }
}

/// `BuildHasher` for using FNV-1a with std collections.
pub type FnvBuildHasher = BuildHasherDefault<Fnv1a64>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_known_vectors() {
        assert_eq!(fnv1a64(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a64(b"a"), 0xaf63_dc4c_8601_ec8c);
        assert_eq!(fnv1a64(b"foobar"), 0x8594_4171_f739_67e8);
    }

    #[test]
    fn test_high_bytes_are_unsigned() {
        let expected = (FNV_OFFSET_BASIS ^ 0xff).wrapping_mul(FNV_PRIME);
        assert_eq!(fnv1a64(&[0xff]), expected);
    }

    #[test]
    fn test_streaming_matches_one_shot() {
        let mut h = Fnv1a64::default();
        for chunk in [&b"AC"[..], b"", b"GT"] {
            h.write(chunk);
        }
        assert_eq!(h.finish(), fnv1a64(b"ACGT"));
    }

    #[test]
    fn test_determinism() {
        assert_eq!(fnv1a64(b"ACGTACGT"), fnv1a64(b"ACGTACGT"));
        assert_ne!(fnv1a64(b"ACGT"), fnv1a64(b"ACGA"));
    }

    #[test]
    fn test_build_hasher_in_collection() {
        let mut set: HashSet<&str, FnvBuildHasher> = HashSet::default();
        set.insert("ACGT");
        assert!(set.contains("ACGT"));
    }
}
