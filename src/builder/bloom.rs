//! Builder for [`BloomFilter`].
//!
//! ```
//! use sieve::builder::BloomFilterBuilder;
//!
//! let filter = BloomFilterBuilder::new()
//!     .memory_budget("1.5M")
//!     .num_hashes(5)
//!     .build()
//!     .unwrap();
//! assert_eq!(filter.len(), 12_582_912);
//! assert_eq!(filter.num_hashes(), 5);
//! ```

use super::{Initial, Knobs, Ready, Sizing};
use crate::error::Result;
use crate::filters::BloomFilter;
use std::marker::PhantomData;

/// Builder for [`BloomFilter`] with a type-state sizing guarantee.
#[derive(Debug, Clone)]
pub struct BloomFilterBuilder<State = Initial> {
    sizing: Sizing,
    knobs: Knobs,
    _state: PhantomData<State>,
}

impl BloomFilterBuilder<Initial> {
    /// Start a builder with no sizing mode.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sizing: Sizing::Unset,
            knobs: Knobs::default(),
            _state: PhantomData,
        }
    }

    fn sized(self, sizing: Sizing) -> BloomFilterBuilder<Ready> {
        BloomFilterBuilder {
            sizing,
            knobs: self.knobs,
            _state: PhantomData,
        }
    }

    /// Size for an expected number of insertions (capacity mode).
    #[must_use]
    pub fn expected_entries(self, entries: usize) -> BloomFilterBuilder<Ready> {
        self.sized(Sizing::Entries(entries))
    }

    /// Size from a memory budget such as `"512K"` (fixed-size mode).
    #[must_use]
    pub fn memory_budget(self, budget: impl Into<String>) -> BloomFilterBuilder<Ready> {
        self.sized(Sizing::Budget(budget.into()))
    }

    /// Size to exactly `bits` bits (fixed-size mode).
    #[must_use]
    pub fn explicit_size(self, bits: usize) -> BloomFilterBuilder<Ready> {
        self.sized(Sizing::Bits(bits))
    }
}

impl Default for BloomFilterBuilder<Initial> {
    fn default() -> Self {
        Self::new()
    }
}

impl<State> BloomFilterBuilder<State> {
    /// Target false positive rate. Capacity mode only; defaults to 0.01.
    #[must_use]
    pub fn error_rate(mut self, error_rate: f64) -> Self {
        self.knobs.error_rate = Some(error_rate);
        self
    }

    /// Hash count. Fixed-size modes only; defaults to 7.
    #[must_use]
    pub fn num_hashes(mut self, num_hashes: usize) -> Self {
        self.knobs.num_hashes = Some(num_hashes);
        self
    }
}

impl BloomFilterBuilder<Ready> {
    /// Validate the configuration and allocate the filter.
    ///
    /// # Errors
    ///
    /// [`SieveError::InvalidParameters`](crate::SieveError::InvalidParameters)
    /// for mixed sizing modes, or any parameter error of the chosen mode.
    pub fn build(self) -> Result<BloomFilter> {
        let params = self.sizing.resolve(&self.knobs, None)?;
        BloomFilter::from_params(params)
    }
}
