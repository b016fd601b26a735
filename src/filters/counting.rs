//! Counting Bloom filter with saturating counters.
//!
//! Each bit of a Bloom filter becomes a small counter. `add` increments the
//! key's `k` counters and returns the smallest of them. That value is a lower
//! bound on how many times the key was inserted, inflated only by other keys
//! sharing every one of its buckets. `estimate` answers the same question
//! without inserting.
//!
//! # Counter Width
//!
//! | `counter_bits` | `bucket_max` | Buckets per word |
//! |----------------|--------------|------------------|
//! | 1              | 1            | 64               |
//! | 2              | 3            | 32               |
//! | 4              | 15           | 16               |
//! | 8 (default)    | 255          | 8                |
//! | 16             | 65535        | 4                |
//!
//! # Saturation
//!
//! A counter at `bucket_max` absorbs further increments. Nothing wraps and
//! nothing errors. Counts at the ceiling are lower bounds only. Absorbed
//! increments are tallied in [`CountingBloomFilter::saturation_events`].
//!
//! # Conservative Update
//!
//! With conservative update enabled, `add` increments only the buckets that
//! currently hold the key's minimum. The returned minimum is the same, but
//! buckets shared with heavier keys grow more slowly, tightening the estimates
//! of light keys (Estan & Varghese 2002).
//!
//! # Examples
//!
//! ```
//! use sieve::CountingBloomFilter;
//!
//! let filter = CountingBloomFilter::with_capacity(1000, 0.01).unwrap();
//! assert_eq!(filter.bucket_max(), 255);
//!
//! assert_eq!(filter.add("ACGT"), 1);
//! assert_eq!(filter.add("ACGT"), 2);
//! assert_eq!(filter.estimate("ACGT"), 2);
//! assert_eq!(filter.estimate("TTTT"), 0);
//! ```
//!
//! # References
//!
//! - Fan, L., Cao, P., Almeida, J., & Broder, A. Z. (2000). "Summary Cache: A Scalable Wide-Area Web Cache Sharing Protocol"
//! - Estan, C., & Varghese, G. (2002). "New Directions in Traffic Measurement and Accounting"

use crate::core::filter::ProbabilisticFilter;
use crate::core::params::{self, Capacity, FilterParams, DEFAULT_COUNTER_BITS};
use crate::core::CounterArray;
use crate::error::Result;
use crate::hash::KeyHashes;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Frequency-estimating filter over packed saturating counters.
#[derive(Debug)]
pub struct CountingBloomFilter {
    counters: CounterArray,
    num_hashes: usize,
    conservative: bool,
    added: AtomicU64,
    saturated: AtomicU64,
}

impl CountingBloomFilter {
    /// Build a filter with 8-bit counters sized by `capacity`.
    ///
    /// A byte budget is split into 8-bit buckets.
    ///
    /// # Errors
    ///
    /// Any parameter error from [`FilterParams::resolve_buckets`].
    pub fn new(capacity: Capacity) -> Result<Self> {
        let p = FilterParams::resolve_buckets(&capacity, DEFAULT_COUNTER_BITS)?;
        Self::from_params(p, DEFAULT_COUNTER_BITS, false)
    }

    /// Size for `expected_entries` insertions at `error_rate`.
    ///
    /// # Errors
    ///
    /// Zero entries or an error rate outside (0, 1).
    pub fn with_capacity(expected_entries: usize, error_rate: f64) -> Result<Self> {
        Self::new(Capacity::expected(expected_entries, error_rate))
    }

    /// Fixed bucket count and hash count.
    ///
    /// # Errors
    ///
    /// Zero buckets, or `num_hashes` outside `[1, 64]`.
    pub fn with_size(buckets: usize, num_hashes: usize) -> Result<Self> {
        Self::new(Capacity::Explicit {
            size: buckets,
            hashes: num_hashes,
        })
    }

    /// Fixed memory budget such as `"1.5M"`, with 7 hashes.
    ///
    /// ```
    /// use sieve::CountingBloomFilter;
    ///
    /// let filter = CountingBloomFilter::with_memory("2K").unwrap();
    /// assert_eq!(filter.len(), 2048);
    /// ```
    ///
    /// # Errors
    ///
    /// An unparseable or too small budget.
    pub fn with_memory(budget: &str) -> Result<Self> {
        Self::new(Capacity::bytes(budget))
    }

    /// Build from resolved parameters, counter width and update policy.
    ///
    /// # Errors
    ///
    /// Zero buckets, a hash count outside `[1, 64]`, or an unsupported
    /// counter width.
    pub fn from_params(p: FilterParams, counter_bits: u32, conservative: bool) -> Result<Self> {
        params::validate_hash_count(p.num_hashes)?;
        let counters = CounterArray::new(p.size, counter_bits)?;

        #[cfg(feature = "trace")]
        tracing::debug!(
            size = p.size,
            num_hashes = p.num_hashes,
            counter_bits,
            conservative,
            "CountingBloomFilter::new"
        );

        Ok(Self {
            counters,
            num_hashes: p.num_hashes,
            conservative,
            added: AtomicU64::new(0),
            saturated: AtomicU64::new(0),
        })
    }

    /// Insert a key and return the minimum of its counters after the
    /// increment, a lower-bound estimate of its insertion count.
    ///
    /// Positions are not deduplicated. A bucket that appears more than once
    /// among the key's `k` positions is bumped once per appearance, and the
    /// returned minimum includes the value seen after its first bump, so it can
    /// be below a later [`estimate`](Self::estimate) of the same key.
    ///
    /// ```
    /// use sieve::CountingBloomFilter;
    ///
    /// // one bucket, three positions: all land on bucket 0
    /// let filter = CountingBloomFilter::with_size(1, 3).unwrap();
    /// assert_eq!(filter.add("ACGT"), 1);
    /// assert_eq!(filter.estimate("ACGT"), 3);
    /// ```
    #[inline]
    pub fn add<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> u32 {
        #[cfg(feature = "trace")]
        tracing::trace!("CountingBloomFilter::add");

        self.add_hashed(KeyHashes::of(key.as_ref()))
    }

    /// [`add`](Self::add) for precomputed base hashes.
    pub fn add_hashed(&self, hashes: KeyHashes) -> u32 {
        let indices = hashes.indices(self.num_hashes, self.counters.len());

        let min = if self.conservative {
            let floor = indices
                .clone()
                .map(|idx| self.counters.get(idx))
                .min()
                .unwrap_or(0);

            // A bucket listed twice is bumped once: its second visit no
            // longer sees `floor`.
            indices
                .map(|idx| {
                    let value = self.counters.get(idx);
                    if value == floor {
                        self.bump(idx)
                    } else {
                        value
                    }
                })
                .min()
        } else {
            indices.map(|idx| self.bump(idx)).min()
        };

        self.added.fetch_add(1, Ordering::Relaxed);
        min.unwrap_or(0)
    }

    #[inline]
    fn bump(&self, idx: usize) -> u32 {
        match self.counters.increment(idx) {
            Some(value) => value,
            None => {
                self.saturated.fetch_add(1, Ordering::Relaxed);

                #[cfg(feature = "trace")]
                tracing::debug!(
                    bucket = idx,
                    bucket_max = self.counters.bucket_max(),
                    "CountingBloomFilter bucket saturated"
                );

                self.counters.bucket_max()
            }
        }
    }

    /// Whether every one of the key's buckets is non-zero.
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
            .indices(self.num_hashes, self.counters.len())
            .all(|idx| self.counters.get(idx) != 0)
    }

    /// Minimum counter over the key's buckets. Zero means never inserted.
    #[must_use]
    pub fn estimate<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> u32 {
        self.estimate_hashed(KeyHashes::of(key.as_ref()))
    }

    /// [`estimate`](Self::estimate) for precomputed base hashes.
    #[must_use]
    pub fn estimate_hashed(&self, hashes: KeyHashes) -> u32 {
        hashes
            .indices(self.num_hashes, self.counters.len())
            .map(|idx| self.counters.get(idx))
            .min()
            .unwrap_or(0)
    }

    /// Insert every key, returning each key's post-insert minimum.
    pub fn add_batch<I, K>(&self, keys: I) -> Vec<u32>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<[u8]>,
    {
        keys.into_iter().map(|k| self.add(&k)).collect()
    }

    /// Parallel [`add_batch`](Self::add_batch) (requires `rayon` feature).
    ///
    /// Results line up with `keys`. A key repeated within the batch may see
    /// its copies' counts in any order.
    #[cfg(feature = "rayon")]
    pub fn par_add_batch<K: AsRef<[u8]> + Sync>(&self, keys: &[K]) -> Vec<u32> {
        keys.par_iter().map(|k| self.add(k)).collect()
    }

    /// Number of non-zero buckets.
    #[must_use]
    pub fn buckets_set(&self) -> usize {
        self.counters.count_nonzero()
    }

    /// Bucket count `m`.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    /// Always `false` for a constructed filter.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// Hash positions per key, `k`.
    #[must_use]
    #[inline]
    pub const fn num_hashes(&self) -> usize {
        self.num_hashes
    }

    /// Saturation ceiling of every bucket.
    #[must_use]
    pub const fn bucket_max(&self) -> u32 {
        self.counters.bucket_max()
    }

    /// Counter width in bits.
    #[must_use]
    pub const fn counter_bits(&self) -> u32 {
        self.counters.counter_bits()
    }

    /// Whether conservative update is enabled.
    #[must_use]
    pub const fn is_conservative(&self) -> bool {
        self.conservative
    }

    /// Number of `add` calls, duplicates included.
    #[must_use]
    pub fn added(&self) -> u64 {
        self.added.load(Ordering::Relaxed)
    }

    /// Increments absorbed by saturated buckets so far.
    #[must_use]
    pub fn saturation_events(&self) -> u64 {
        self.saturated.load(Ordering::Relaxed)
    }

    /// Estimated false positive rate of [`contains`](Self::contains).
    #[must_use]
    pub fn collision_probability(&self) -> f64 {
        params::collision_probability(self.len(), self.added(), self.num_hashes)
    }

    /// Heap bytes used by the counter storage.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.counters.memory_usage()
    }
}

impl Clone for CountingBloomFilter {
    fn clone(&self) -> Self {
        Self {
            counters: self.counters.clone(),
            num_hashes: self.num_hashes,
            conservative: self.conservative,
            added: AtomicU64::new(self.added()),
            saturated: AtomicU64::new(self.saturation_events()),
        }
    }
}

impl fmt::Display for CountingBloomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CountingBloom(num_hashes={}, size={}, bucket_max={})",
            self.num_hashes,
            self.len(),
            self.bucket_max()
        )
    }
}

impl ProbabilisticFilter for CountingBloomFilter {
    type Outcome = u32;

    fn add<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> u32 {
        CountingBloomFilter::add(self, key)
    }

    fn contains<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> bool {
        CountingBloomFilter::contains(self, key)
    }

    fn len(&self) -> usize {
        CountingBloomFilter::len(self)
    }

    fn num_hashes(&self) -> usize {
        self.num_hashes
    }

    fn added(&self) -> u64 {
        CountingBloomFilter::added(self)
    }
}
