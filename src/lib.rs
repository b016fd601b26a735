//! Sieve: bit-packed Bloom and counting Bloom filters for byte-sequence keys.
//!
//! Sieve targets high-volume insert/query workloads such as screening short
//! biological subsequences (k-mers), where storing the exact set is not an
//! option. Keys are opaque byte sequences; anything that implements
//! `AsRef<[u8]>` can be inserted or queried.
//!
//! # What is provided
//!
//! - [`BloomFilter`]: set membership with no false negatives. `add` reports
//!   whether the key was already present.
//! - [`CountingBloomFilter`]: saturating counters instead of bits. `add` and
//!   `estimate` report a lower-bound insertion count.
//! - [`BitArray`](core::BitArray) and [`CounterArray`](core::CounterArray):
//!   the lock-free word-packed storage behind them.
//!
//! # Quick Start
//!
//! ```
//! use sieve::{BloomFilter, CountingBloomFilter};
//!
//! // Capacity mode: 1000 keys at 1% false positives.
//! let filter = BloomFilter::with_capacity(1000, 0.01).unwrap();
//! assert!(!filter.add("GATTACA"));
//! assert!(filter.contains("GATTACA"));
//! assert!(!filter.contains("CATTAGA"));
//!
//! // Fixed-size mode: a 512 KiB budget split into 8-bit counters.
//! let counts = CountingBloomFilter::with_memory("512K").unwrap();
//! counts.add("GATTACA");
//! counts.add("GATTACA");
//! assert_eq!(counts.estimate("GATTACA"), 2);
//! ```
//!
//! # Sizing
//!
//! | Mode             | Caller supplies               | `m`                         | `k`                   |
//! |------------------|-------------------------------|-----------------------------|-----------------------|
//! | Capacity         | entries `n`, error rate `p`   | `⌈-n ln p / (ln 2)²⌉`       | `⌈(m / n) ln 2⌉`      |
//! | Memory budget    | `"512K"`, `"1.5M"`, `"2G"`    | bytes × 8 (÷ counter width) | 7 unless overridden   |
//! | Explicit         | `m`                           | as given                    | 7 unless overridden   |
//!
//! See [`core::params`] and [`builder`].
//!
//! # Hashing
//!
//! Keys are hashed with 64-bit FNV-1a. A second hash chains the first hash's
//! bytes in front of the key, and the `k` positions are `(h₁ + i·h₂) mod m`
//! for `i = 1..=k`. See [`hash`].
//!
//! # Concurrency
//!
//! Every operation takes `&self`. Bits are set with atomic `fetch_or`, and
//! counters are bumped with compare-and-swap loops that clamp at the ceiling.
//! Filters are `Send + Sync` and can be shared through an `Arc` without a lock.
//!
//! # Feature Flags
//!
//! | Feature | Default | Enables                                                 |
//! |---------|---------|---------------------------------------------------------|
//! | `trace` | yes     | `tracing` events on construction, insert and saturation |
//! | `rayon` | no      | `par_add_batch` on both filters                         |
//!
//! # Non-goals
//!
//! No persistence, no deletion, no resizing, and no cryptographic guarantees
//! from the hash function.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::bool_assert_comparison)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Type-state builders for both filters
pub mod builder;

/// Storage engines, sizing math and the shared filter trait
pub mod core;

/// Error types and result aliases
pub mod error;

/// Filter implementations
pub mod filters;

/// Key hashing and position generation
pub mod hash;

/// Word-level bit helpers
pub mod util;

pub use crate::builder::{BloomFilterBuilder, CountingBloomFilterBuilder};
pub use crate::core::filter::ProbabilisticFilter;
pub use crate::core::params::{Capacity, FilterParams};
pub use crate::error::{Result, SieveError};
pub use crate::filters::{BloomFilter, CountingBloomFilter};
pub use crate::hash::KeyHashes;

/// Prelude module for convenient imports.
///
/// ```
/// use sieve::prelude::*;
///
/// let filter = BloomFilterBuilder::new().expected_entries(100).build().unwrap();
/// filter.add("ACGT");
/// assert!(filter.contains_all(["ACGT"]));
/// ```
pub mod prelude {
    pub use crate::builder::{BloomFilterBuilder, CountingBloomFilterBuilder};
    pub use crate::core::filter::ProbabilisticFilter;
    pub use crate::core::params::{Capacity, FilterParams};
    pub use crate::error::{Result, SieveError};
    pub use crate::filters::{BloomFilter, CountingBloomFilter};
    pub use crate::hash::KeyHashes;
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use std::sync::Arc;

    #[test]
    fn test_prelude_imports() {
        let filter = BloomFilter::new(Capacity::entries(100)).unwrap();
        filter.add("test");
        assert!(filter.contains("test"));
    }

    #[test]
    fn test_trait_usage() {
        fn check<F: ProbabilisticFilter>(filter: &F) {
            filter.add("item");
            assert!(filter.contains("item"));
            assert!(filter.collision_probability() > 0.0);
        }

        check(&BloomFilter::with_capacity(100, 0.01).unwrap());
        check(&CountingBloomFilter::with_capacity(100, 0.01).unwrap());
    }

    #[test]
    fn test_shared_across_threads() {
        let filter = Arc::new(CountingBloomFilter::with_capacity(1000, 0.01).unwrap());
        filter.add("main");

        let filter_clone = Arc::clone(&filter);
        let handle = std::thread::spawn(move || {
            filter_clone.add("main");
            filter_clone.add("thread_item");
        });
        handle.join().unwrap();

        assert_eq!(filter.estimate("main"), 2);
        assert!(filter.contains("thread_item"));
    }

    #[test]
    fn test_errors_surface_at_construction() {
        let err = BloomFilter::new(Capacity::expected(100, 0.0)).unwrap_err();
        assert!(err.is_invalid_parameters());
    }
}
