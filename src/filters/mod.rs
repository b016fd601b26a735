//! Filter implementations.
//!
//! | Filter                  | Storage             | `add` returns                 | Extra query |
//! |-------------------------|---------------------|-------------------------------|-------------|
//! | [`BloomFilter`]         | 1 bit per slot      | whether the key was present   |             |
//! | [`CountingBloomFilter`] | w-bit counter/slot  | minimum count after insert    | `estimate`  |
//!
//! Both are insert-and-query only: there is no deletion and no resizing. Both
//! hash a key once into two base hashes and derive all `k` positions from them,
//! and both can be fed precomputed [`KeyHashes`](crate::hash::KeyHashes) so a
//! key hashed once can be inserted into several filters.
//!
//! # Examples
//!
//! ```
//! use sieve::filters::{BloomFilter, CountingBloomFilter};
//! use sieve::hash::KeyHashes;
//!
//! let seen = BloomFilter::with_capacity(10_000, 0.01).unwrap();
//! let counts = CountingBloomFilter::with_capacity(10_000, 0.01).unwrap();
//!
//! for kmer in ["ACGT", "CGTA", "ACGT"] {
//!     let hashes = KeyHashes::of(kmer.as_bytes());
//!     if seen.add_hashed(hashes) {
//!         counts.add_hashed(hashes);
//!     }
//! }
//! assert_eq!(counts.estimate("ACGT"), 1);
//! assert_eq!(counts.estimate("CGTA"), 0);
//! ```

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod bloom;
pub mod counting;

pub use bloom::BloomFilter;
pub use counting::CountingBloomFilter;
