//! Type-state builders for both filters.
//!
//! A builder starts in [`Initial`] and must pick exactly one sizing mode before
//! `build` becomes available:
//!
//! | Method              | Mode            | Hash count                         |
//! |---------------------|-----------------|------------------------------------|
//! | `expected_entries`  | capacity        | derived from the error rate        |
//! | `memory_budget`     | fixed size      | 7, or `num_hashes` if given        |
//! | `explicit_size`     | fixed size      | 7, or `num_hashes` if given        |
//!
//! Combinations that would derive `k` jointly from a caller-fixed size are
//! rejected at `build` time with [`SieveError::InvalidParameters`]:
//!
//! - `error_rate` together with a fixed size
//! - `num_hashes` together with `expected_entries`
//!
//! # Examples
//!
//! ```
//! use sieve::builder::{BloomFilterBuilder, CountingBloomFilterBuilder};
//!
//! let bloom = BloomFilterBuilder::new()
//!     .expected_entries(10_000)
//!     .error_rate(0.001)
//!     .build()
//!     .unwrap();
//! assert_eq!(bloom.num_hashes(), 10);
//!
//! let counting = CountingBloomFilterBuilder::new()
//!     .memory_budget("64K")
//!     .counter_bits(4)
//!     .num_hashes(5)
//!     .build()
//!     .unwrap();
//! assert_eq!(counting.len(), 64 * 1024 * 2);
//! assert_eq!(counting.bucket_max(), 15);
//!
//! let mixed = BloomFilterBuilder::new()
//!     .explicit_size(4096)
//!     .error_rate(0.01)
//!     .build();
//! assert!(mixed.is_err());
//! ```

#![allow(clippy::module_name_repetitions)]

pub mod bloom;
pub mod counting;

pub use bloom::BloomFilterBuilder;
pub use counting::CountingBloomFilterBuilder;

use crate::core::params::{self, Capacity, FilterParams, DEFAULT_ERROR_RATE};
use crate::error::{Result, SieveError};

/// Type-state marker: no sizing mode chosen yet.
#[derive(Debug, Clone, Copy)]
pub struct Initial;

/// Type-state marker: a sizing mode is set and `build` is available.
#[derive(Debug, Clone, Copy)]
pub struct Ready;

/// The sizing mode recorded by a builder.
#[derive(Debug, Clone, PartialEq)]
enum Sizing {
    Unset,
    Entries(usize),
    Budget(String),
    Bits(usize),
}

/// Optional knobs shared by both builders.
#[derive(Debug, Clone, Default)]
struct Knobs {
    error_rate: Option<f64>,
    num_hashes: Option<usize>,
}

mod validation {
    use super::*;

    /// Reject option combinations that mix the two sizing modes.
    pub fn validate_mode(sizing: &Sizing, knobs: &Knobs) -> Result<()> {
        match sizing {
            Sizing::Entries(_) if knobs.num_hashes.is_some() => {
                Err(SieveError::invalid_parameters(
                    "num_hashes cannot be combined with expected_entries; \
                     the hash count is derived from the error rate",
                ))
            }
            Sizing::Budget(_) | Sizing::Bits(_) if knobs.error_rate.is_some() => {
                Err(SieveError::invalid_parameters(
                    "error_rate cannot be combined with a fixed size",
                ))
            }
            _ => Ok(()),
        }
    }
}

impl Sizing {
    fn capacity(&self, knobs: &Knobs) -> Result<Capacity> {
        validation::validate_mode(self, knobs)?;
        match self {
            Self::Entries(n) => Ok(Capacity::expected(
                *n,
                knobs.error_rate.unwrap_or(DEFAULT_ERROR_RATE),
            )),
            Self::Budget(budget) => Ok(Capacity::bytes(budget.clone())),
            Self::Bits(size) => Ok(Capacity::size(*size)),
            Self::Unset => Err(SieveError::invalid_parameters("no sizing mode selected")),
        }
    }

    /// Resolve into filter parameters. `counter_bits` selects bucket sizing.
    fn resolve(&self, knobs: &Knobs, counter_bits: Option<u32>) -> Result<FilterParams> {
        let capacity = self.capacity(knobs)?;
        let mut resolved = match counter_bits {
            Some(bits) => FilterParams::resolve_buckets(&capacity, bits)?,
            None => FilterParams::resolve(&capacity)?,
        };

        if let Some(k) = knobs.num_hashes {
            params::validate_hash_count(k)?;
            resolved.num_hashes = k;
        }
        Ok(resolved)
    }
}
