//! Error types for sieve operations.
//!
//! Every failure in this crate is a local precondition violation detected at the
//! call that violated it. Nothing here is transient or retryable: there is no
//! I/O and no partially-applied state to recover from.
//!
//! Two families exist:
//!
//! - **Parameter errors** (sizes, hash counts, error rates, memory budgets) are
//!   raised at construction time and never deferred.
//!   [`SieveError::is_invalid_parameters`] reports membership in this family.
//! - **Index errors** ([`SieveError::IndexOutOfBounds`]) come from direct misuse
//!   of a [`BitArray`](crate::core::BitArray) through its checked accessors.
//!   Filters never produce them because `position mod size` is always in range.
//!
//! Counter saturation is *not* an error. A counting filter silently clamps at its
//! ceiling.
//!
//! # Error Propagation
//!
//! ```
//! use sieve::{Result, SieveError};
//! use sieve::core::params::{optimal_bit_count, optimal_hash_count};
//!
//! fn plan(n: usize, p: f64) -> Result<(usize, usize)> {
//!     let m = optimal_bit_count(n, p)?;
//!     let k = optimal_hash_count(m, n)?;
//!     Ok((m, k))
//! }
//! # assert!(plan(1000, 0.01).is_ok());
//! # assert!(plan(0, 0.01).is_err());
//! ```

#![allow(clippy::module_name_repetitions)]

use std::fmt;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SieveError>;

/// Errors that can occur while building or addressing a filter.
#[derive(Debug, Clone, PartialEq)]
pub enum SieveError {
    /// Parameters are individually valid but do not make sense together.
    InvalidParameters {
        /// Human-readable description of what's invalid.
        message: String,
    },

    /// Target false positive rate outside the open interval (0, 1).
    FalsePositiveRateOutOfBounds {
        /// The rejected rate.
        fp_rate: f64,
    },

    /// Expected insertion count of zero.
    InvalidItemCount {
        /// The rejected count.
        count: usize,
    },

    /// Storage size of zero, or too large to address.
    InvalidFilterSize {
        /// The rejected size (bits or buckets).
        size: usize,
    },

    /// Hash function count outside `[min, max]`.
    InvalidHashCount {
        /// The rejected count.
        count: usize,
        /// Minimum allowed value.
        min: usize,
        /// Maximum allowed value.
        max: usize,
    },

    /// Memory budget string that could not be parsed (e.g. `"12X"`).
    InvalidMemoryBudget {
        /// The rejected budget string.
        budget: String,
    },

    /// Counter width that does not pack evenly into a 64-bit word.
    InvalidCounterWidth {
        /// The rejected width in bits.
        bits: u32,
    },

    /// Bit or bucket index outside `[0, length)`.
    IndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// The valid length.
        length: usize,
    },
}

impl fmt::Display for SieveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameters { message } => {
                write!(f, "Invalid filter parameters: {}.", message)
            }
            Self::FalsePositiveRateOutOfBounds { fp_rate } => {
                write!(
                    f,
                    "False positive rate {} is out of bounds. Must be in range (0, 1).",
                    fp_rate
                )
            }
            Self::InvalidItemCount { count } => {
                write!(
                    f,
                    "Invalid item count: {}. Expected entries must be greater than 0.",
                    count
                )
            }
            Self::InvalidFilterSize { size } => {
                write!(
                    f,
                    "Invalid filter size: {}. Must be positive and addressable.",
                    size
                )
            }
            Self::InvalidHashCount { count, min, max } => {
                write!(
                    f,
                    "Invalid hash function count: {}. Must be in range [{}, {}].",
                    count, min, max
                )
            }
            Self::InvalidMemoryBudget { budget } => {
                write!(
                    f,
                    "Invalid memory budget {:?}. Expected a positive number with optional K, M or G suffix.",
                    budget
                )
            }
            Self::InvalidCounterWidth { bits } => {
                write!(
                    f,
                    "Invalid counter width: {} bits. Must be one of 1, 2, 4, 8 or 16.",
                    bits
                )
            }
            Self::IndexOutOfBounds { index, length } => {
                write!(
                    f,
                    "Index {} out of bounds for array of length {}",
                    index, length
                )
            }
        }
    }
}

impl std::error::Error for SieveError {}

impl SieveError {
    /// Create an `InvalidParameters` error.
    #[must_use]
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    /// Create a `FalsePositiveRateOutOfBounds` error.
    #[must_use]
    pub fn fp_rate_out_of_bounds(fp_rate: f64) -> Self {
        Self::FalsePositiveRateOutOfBounds { fp_rate }
    }

    /// Create an `InvalidItemCount` error.
    #[must_use]
    pub fn invalid_item_count(count: usize) -> Self {
        Self::InvalidItemCount { count }
    }

    /// Create an `InvalidFilterSize` error.
    #[must_use]
    pub fn invalid_filter_size(size: usize) -> Self {
        Self::InvalidFilterSize { size }
    }

    /// Create an `InvalidHashCount` error.
    #[must_use]
    pub fn invalid_hash_count(count: usize, min: usize, max: usize) -> Self {
        Self::InvalidHashCount { count, min, max }
    }

    /// Create an `InvalidMemoryBudget` error.
    #[must_use]
    pub fn invalid_memory_budget(budget: impl Into<String>) -> Self {
        Self::InvalidMemoryBudget {
            budget: budget.into(),
        }
    }

    /// Create an `InvalidCounterWidth` error.
    #[must_use]
    pub fn invalid_counter_width(bits: u32) -> Self {
        Self::InvalidCounterWidth { bits }
    }

    /// Create an `IndexOutOfBounds` error.
    #[must_use]
    pub fn index_out_of_bounds(index: usize, length: usize) -> Self {
        Self::IndexOutOfBounds { index, length }
    }

    /// Whether this error belongs to the parameter family, i.e. anything that
    /// is raised while a filter is being sized or configured.
    ///
    /// ```
    /// use sieve::SieveError;
    ///
    /// assert!(SieveError::invalid_item_count(0).is_invalid_parameters());
    /// assert!(!SieveError::index_out_of_bounds(9, 8).is_invalid_parameters());
    /// ```
    #[must_use]
    pub fn is_invalid_parameters(&self) -> bool {
        !matches!(self, Self::IndexOutOfBounds { .. })
    }
}
