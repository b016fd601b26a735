//! The shared surface of both filter variants.
//!
//! [`BloomFilter`](crate::BloomFilter) and
//! [`CountingBloomFilter`](crate::CountingBloomFilter) differ in storage and in
//! what `add` reports, but agree on everything else: keys are opaque byte
//! sequences, queries never produce false negatives, and the collision
//! estimate follows from `len`, `num_hashes` and `added`.
//!
//! All methods take `&self`. Implementations are lock-free and `Send + Sync`,
//! so a filter can be shared across threads behind an `Arc` without a mutex.
//!
//! ```
//! use sieve::{BloomFilter, CountingBloomFilter, ProbabilisticFilter};
//!
//! fn load<F: ProbabilisticFilter>(filter: &F, keys: &[&str]) {
//!     for key in keys {
//!         filter.add(key);
//!     }
//! }
//!
//! let bloom = BloomFilter::with_capacity(100, 0.01).unwrap();
//! let counting = CountingBloomFilter::with_capacity(100, 0.01).unwrap();
//! load(&bloom, &["ACGT", "TTGA"]);
//! load(&counting, &["ACGT", "TTGA"]);
//! assert!(bloom.contains_all(["ACGT", "TTGA"]));
//! assert_eq!(counting.added(), 2);
//! ```

use crate::core::params;

/// Insert-and-query probabilistic set over byte-sequence keys.
pub trait ProbabilisticFilter: Send + Sync {
    /// What `add` reports about the key: "already present" for a Bloom filter,
    /// the minimum bucket count for a counting filter.
    type Outcome;

    /// Insert a key.
    fn add<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> Self::Outcome;

    /// Whether a key may have been inserted. Never `false` for an inserted key.
    fn contains<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> bool;

    /// Storage length (bits or buckets).
    fn len(&self) -> usize;

    /// Always `false` for a constructed filter.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hash positions per key.
    fn num_hashes(&self) -> usize;

    /// Number of `add` calls so far, duplicates included.
    fn added(&self) -> u64;

    /// Estimated false positive rate given the insertions so far.
    fn collision_probability(&self) -> f64 {
        params::collision_probability(self.len(), self.added(), self.num_hashes())
    }

    /// Whether every key may have been inserted.
    fn contains_all<I, K>(&self, keys: I) -> bool
    where
        I: IntoIterator<Item = K>,
        K: AsRef<[u8]>,
    {
        keys.into_iter().all(|k| self.contains(&k))
    }

    /// Whether any key may have been inserted.
    fn contains_any<I, K>(&self, keys: I) -> bool
    where
        I: IntoIterator<Item = K>,
        K: AsRef<[u8]>,
    {
        keys.into_iter().any(|k| self.contains(&k))
    }
}
