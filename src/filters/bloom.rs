//! Bloom filter over a word-packed bit array.
//!
//! Each key maps to `k` bit positions by double hashing. `add` sets them;
//! `contains` checks that all are set. There are no false negatives. The false
//! positive rate grows with the number of insertions and is estimated by
//! [`BloomFilter::collision_probability`].
//!
//! `add` reports whether the key was *already* fully present. It uses the bit
//! array's atomic test-and-set so no separate query is needed to tell a first
//! insertion from a probable duplicate.
//!
//! # Examples
//!
//! ```
//! use sieve::BloomFilter;
//!
//! let filter = BloomFilter::with_capacity(1000, 0.01).unwrap();
//! assert_eq!(filter.len(), 9586);
//! assert_eq!(filter.num_hashes(), 7);
//!
//! assert!(!filter.add("ACGTACGT"));
//! assert!(filter.add("ACGTACGT"));
//! assert!(filter.contains("ACGTACGT"));
//! assert_eq!(filter.added(), 2);
//! ```
//!
//! ## Sharing across threads
//!
//! ```
//! use sieve::BloomFilter;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let filter = Arc::new(BloomFilter::with_capacity(10_000, 0.01).unwrap());
//! let handles: Vec<_> = (0..4)
//!     .map(|t| {
//!         let filter = Arc::clone(&filter);
//!         thread::spawn(move || {
//!             for i in 0..100 {
//!                 filter.add(&format!("{t}-{i}"));
//!             }
//!         })
//!     })
//!     .collect();
//! for h in handles {
//!     h.join().unwrap();
//! }
//! assert_eq!(filter.added(), 400);
//! assert!(filter.contains("3-99"));
//! ```

use crate::core::filter::ProbabilisticFilter;
use crate::core::params::{self, Capacity, FilterParams};
use crate::core::BitArray;
use crate::error::Result;
use crate::hash::KeyHashes;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Insert-and-query membership filter.
///
/// The bit array is owned and never handed out, so no caller holding a
/// shared reference can clear a bit.
///
/// ```compile_fail
/// use sieve::BloomFilter;
///
/// let filter = BloomFilter::with_size(64, 2).unwrap();
/// filter.bits().set_all(false);
/// ```
#[derive(Debug)]
pub struct BloomFilter {
    bits: BitArray,
    num_hashes: usize,
    added: AtomicU64,
}

impl BloomFilter {
    /// Build a filter sized by `capacity`.
    ///
    /// # Errors
    ///
    /// Any parameter error from [`FilterParams::resolve`].
    ///
    /// ```
    /// use sieve::{BloomFilter, Capacity};
    ///
    /// let filter = BloomFilter::new(Capacity::bytes("1K")).unwrap();
    /// assert_eq!(filter.to_string(), "Bloom(num_hashes=7, size=8192)");
    /// ```
    pub fn new(capacity: Capacity) -> Result<Self> {
        Self::from_params(FilterParams::resolve(&capacity)?)
    }

    /// Size for `expected_entries` insertions at `error_rate`.
    ///
    /// # Errors
    ///
    /// Zero entries or an error rate outside (0, 1).
    pub fn with_capacity(expected_entries: usize, error_rate: f64) -> Result<Self> {
        Self::new(Capacity::expected(expected_entries, error_rate))
    }

    /// Fixed bit count and hash count.
    ///
    /// # Errors
    ///
    /// Zero bits, or `num_hashes` outside `[1, 64]`.
    pub fn with_size(bits: usize, num_hashes: usize) -> Result<Self> {
        Self::new(Capacity::Explicit {
            size: bits,
            hashes: num_hashes,
        })
    }

    /// Fixed memory budget such as `"512K"`, with 7 hashes.
    ///
    /// # Errors
    ///
    /// An unparseable or zero budget.
    pub fn with_memory(budget: &str) -> Result<Self> {
        Self::new(Capacity::bytes(budget))
    }

    /// Build from already-resolved parameters.
    ///
    /// # Errors
    ///
    /// Zero size or a hash count outside `[1, 64]`.
    pub fn from_params(p: FilterParams) -> Result<Self> {
        params::validate_hash_count(p.num_hashes)?;
        let bits = BitArray::new(p.size)?;

        #[cfg(feature = "trace")]
        tracing::debug!(
            size = p.size,
            num_hashes = p.num_hashes,
            "BloomFilter::new"
        );

        Ok(Self {
            bits,
            num_hashes: p.num_hashes,
            added: AtomicU64::new(0),
        })
    }

    /// Insert a key. Returns `true` if every one of its bits was already set,
    /// i.e. the key was probably inserted before.
    ///
    /// All `k` bits are set regardless of the outcome and `added` always
    /// increments.
    #[inline]
    pub fn add<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> bool {
        #[cfg(feature = "trace")]
        tracing::trace!("BloomFilter::add");

        self.add_hashed(KeyHashes::of(key.as_ref()))
    }

    /// [`add`](Self::add) for a key whose base hashes are already known.
    ///
    /// Lets a caller hash a key once and feed several filters.
    ///
    /// ```
    /// use sieve::{BloomFilter, KeyHashes};
    ///
    /// let a = BloomFilter::with_size(1024, 3).unwrap();
    /// let b = BloomFilter::with_size(4096, 5).unwrap();
    /// let hashes = KeyHashes::of(b"ACGT");
    /// a.add_hashed(hashes);
    /// b.add_hashed(hashes);
    /// assert!(a.contains("ACGT") && b.contains("ACGT"));
    /// ```
    #[inline]
    pub fn add_hashed(&self, hashes: KeyHashes) -> bool {
        let mut present = true;
        for idx in hashes.indices(self.num_hashes, self.bits.len()) {
            present &= self.bits.try_set(idx, true);
        }
        self.added.fetch_add(1, Ordering::Relaxed);
        present
    }

    /// Whether a key may have been inserted.
    ///
    /// - `true`: possibly present (or a false positive)
    /// - `false`: definitely never inserted
    #[must_use]
    #[inline]
    pub fn contains<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> bool {
        self.contains_hashed(KeyHashes::of(key.as_ref()))
    }

    /// [`contains`](Self::contains) for precomputed base hashes.
    #[must_use]
    #[inline]
    pub fn contains_hashed(&self, hashes: KeyHashes) -> bool {
        hashes
            .indices(self.num_hashes, self.bits.len())
            .all(|idx| self.bits.get(idx))
    }

    /// Insert every key. Returns how many were not already present.
    pub fn add_batch<I, K>(&self, keys: I) -> usize
    where
        I: IntoIterator<Item = K>,
        K: AsRef<[u8]>,
    {
        keys.into_iter().filter(|k| !self.add(k)).count()
    }

    /// Query every key.
    #[must_use]
    pub fn contains_batch<K: AsRef<[u8]>>(&self, keys: &[K]) -> Vec<bool> {
        keys.iter().map(|k| self.contains(k)).collect()
    }

    /// Parallel [`add_batch`](Self::add_batch) (requires `rayon` feature).
    ///
    /// When a batch holds the same key twice, which copy counts as new depends
    /// on scheduling, but exactly one of them does unless the key was present
    /// before the batch.
    #[cfg(feature = "rayon")]
    pub fn par_add_batch<K: AsRef<[u8]> + Sync>(&self, keys: &[K]) -> usize {
        keys.par_iter().filter(|k| !self.add(*k)).count()
    }

    /// Number of set bits.
    #[must_use]
    pub fn bits_set(&self) -> usize {
        self.bits.count()
    }

    /// Bit-array length `m`.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Always `false` for a constructed filter.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Hash positions per key, `k`.
    #[must_use]
    #[inline]
    pub const fn num_hashes(&self) -> usize {
        self.num_hashes
    }

    /// Number of `add` calls, duplicates included.
    #[must_use]
    pub fn added(&self) -> u64 {
        self.added.load(Ordering::Relaxed)
    }

    /// Estimated false positive rate, `(1 - e^(-k × added / m))^k`.
    #[must_use]
    pub fn collision_probability(&self) -> f64 {
        params::collision_probability(self.len(), self.added(), self.num_hashes)
    }

    /// Fraction of bits set.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fill_ratio(&self) -> f64 {
        self.bits_set() as f64 / self.len() as f64
    }

    /// Heap bytes used by the bit array.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.bits.memory_usage()
    }
}

impl Clone for BloomFilter {
    fn clone(&self) -> Self {
        Self {
            bits: self.bits.clone(),
            num_hashes: self.num_hashes,
            added: AtomicU64::new(self.added()),
        }
    }
}

impl fmt::Display for BloomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bloom(num_hashes={}, size={})",
            self.num_hashes,
            self.len()
        )
    }
}

impl ProbabilisticFilter for BloomFilter {
    type Outcome = bool;

    fn add<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> bool {
        BloomFilter::add(self, key)
    }

    fn contains<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> bool {
        BloomFilter::contains(self, key)
    }

    fn len(&self) -> usize {
        BloomFilter::len(self)
    }

    fn num_hashes(&self) -> usize {
        self.num_hashes
    }

    fn added(&self) -> u64 {
        BloomFilter::added(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SieveError;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_capacity_mode_shape() {
        let filter = BloomFilter::with_capacity(1000, 0.01).unwrap();
        assert_eq!(filter.len(), 9586);
        assert_eq!(filter.num_hashes(), 7);
        assert_eq!(filter.added(), 0);
        assert_eq!(filter.bits_set(), 0);
        assert_eq!(filter.collision_probability(), 0.0);
    }

    #[test]
    fn test_fixed_size_defaults_to_seven_hashes() {
        let filter = BloomFilter::new(Capacity::size(4096)).unwrap();
        assert_eq!(filter.num_hashes(), 7);
        assert_eq!(filter.len(), 4096);

        let filter = BloomFilter::with_memory("512K").unwrap();
        assert_eq!(filter.len(), 4_194_304);
        assert_eq!(filter.num_hashes(), 7);
    }

    #[test]
    fn test_invalid_construction() {
        assert!(BloomFilter::with_capacity(0, 0.01)
            .unwrap_err()
            .is_invalid_parameters());
        assert!(matches!(
            BloomFilter::with_capacity(10, 1.0),
            Err(SieveError::FalsePositiveRateOutOfBounds { .. })
        ));
        assert!(matches!(
            BloomFilter::with_size(0, 3),
            Err(SieveError::InvalidFilterSize { size: 0 })
        ));
        assert!(matches!(
            BloomFilter::with_size(100, 0),
            Err(SieveError::InvalidHashCount { count: 0, .. })
        ));
        assert!(matches!(
            BloomFilter::with_memory("lots"),
            Err(SieveError::InvalidMemoryBudget { .. })
        ));
    }

    #[test]
    fn test_add_reports_prior_presence() {
        let filter = BloomFilter::with_capacity(100, 0.01).unwrap();
        assert!(!filter.add("ACGT"));
        assert!(filter.add("ACGT"));
        assert!(filter.contains("ACGT"));
        assert_eq!(filter.added(), 2);
    }

    #[test]
    fn test_add_sets_at_most_k_bits() {
        let filter = BloomFilter::with_size(1 << 16, 5).unwrap();
        filter.add(b"GATTACA");
        let set = filter.bits_set();
        assert!((1..=5).contains(&set));
        filter.add(b"GATTACA");
        assert_eq!(filter.bits_set(), set);
    }

    #[test]
    fn test_contains_absent_on_empty() {
        let filter = BloomFilter::with_capacity(100, 0.01).unwrap();
        assert!(!filter.contains("ACGT"));
        assert!(!filter.contains(""));
    }

    #[test]
    fn test_byte_and_str_keys_agree() {
        let filter = BloomFilter::with_capacity(100, 0.01).unwrap();
        filter.add("TTGA");
        assert!(filter.contains(b"TTGA"));
        assert!(filter.contains(&b"TTGA".to_vec()));
        assert!(filter.contains(&String::from("TTGA")));
    }

    #[test]
    fn test_no_false_negatives_at_capacity() {
        let filter = BloomFilter::with_capacity(1000, 0.01).unwrap();
        let keys: Vec<String> = (0..1000).map(|i| format!("key-{i}")).collect();
        for k in &keys {
            filter.add(k);
        }
        assert!(keys.iter().all(|k| filter.contains(k)));
        assert_eq!(filter.added(), 1000);
    }

    #[test]
    fn test_collision_probability_tracks_added() {
        let filter = BloomFilter::with_capacity(1000, 0.01).unwrap();
        for i in 0..1000 {
            filter.add(&format!("k{i}"));
        }
        let p = filter.collision_probability();
        assert!((p - 0.01).abs() < 0.002, "got {p}");

        // duplicates still count towards the estimate
        filter.add("k0");
        assert!(filter.collision_probability() > p);
    }

    #[test]
    fn test_add_batch_counts_new_keys() {
        let filter = BloomFilter::with_capacity(1000, 0.001).unwrap();
        let fresh = filter.add_batch(["a", "b", "c", "a"]);
        assert_eq!(fresh, 3);
        assert_eq!(filter.added(), 4);
        assert_eq!(filter.contains_batch(&["a", "zzz"]), vec![true, false]);
    }

    #[test]
    fn test_display() {
        let filter = BloomFilter::with_capacity(1000, 0.01).unwrap();
        assert_eq!(filter.to_string(), "Bloom(num_hashes=7, size=9586)");
    }

    #[test]
    fn test_clone_is_independent() {
        let filter = BloomFilter::with_capacity(100, 0.01).unwrap();
        filter.add("one");
        let copy = filter.clone();
        filter.add("two");
        assert!(copy.contains("one"));
        assert_eq!(copy.added(), 1);
        assert_eq!(filter.added(), 2);
    }

    #[test]
    fn test_trait_surface() {
        fn rate_of<F: ProbabilisticFilter>(f: &F) -> f64 {
            f.collision_probability()
        }
        let filter = BloomFilter::with_capacity(100, 0.01).unwrap();
        ProbabilisticFilter::add(&filter, "x");
        assert_eq!(rate_of(&filter), filter.collision_probability());
        assert!(filter.contains_all(["x"]));
        assert!(filter.contains_any(["y", "x"]));
    }

    #[test]
    fn test_shared_readers_never_lose_keys() {
        let filter = Arc::new(BloomFilter::with_capacity(1000, 0.01).unwrap());
        filter.add("ACGT");
        let before = filter.bits_set();

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let f = Arc::clone(&filter);
                thread::spawn(move || {
                    assert!(f.contains("ACGT"));
                    assert!(f.fill_ratio() > 0.0);
                    assert_eq!(f.contains_batch(&["ACGT"]), vec![true]);
                    f.add(&format!("reader-{t}"));
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert!(filter.contains("ACGT"));
        assert!(filter.bits_set() >= before);
        assert_eq!(filter.clone().bits_set(), filter.bits_set());
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BloomFilter>();
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn test_par_add_batch() {
        let filter = BloomFilter::with_capacity(10_000, 0.001).unwrap();
        let keys: Vec<String> = (0..5000).map(|i| format!("p{i}")).collect();
        let fresh = filter.par_add_batch(&keys);
        assert!(fresh <= 5000 && fresh > 4900);
        assert_eq!(filter.added(), 5000);
        assert!(keys.iter().all(|k| filter.contains(k)));
    }
}
