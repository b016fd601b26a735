//! Builder for [`CountingBloomFilter`].
//!
//! On top of the sizing modes shared with the Bloom builder, a counting
//! builder chooses the counter width and the update policy:
//!
//! - `counter_bits(w)`: one of 1, 2, 4, 8 (default) or 16; `bucket_max = 2^w - 1`
//! - `conservative_update(true)`: increment only the buckets at the key's minimum
//!
//! A memory budget is divided among counters, so halving the width doubles the
//! bucket count.
//!
//! ```
//! use sieve::builder::CountingBloomFilterBuilder;
//!
//! let filter = CountingBloomFilterBuilder::new()
//!     .expected_entries(1000)
//!     .counter_bits(16)
//!     .conservative_update(true)
//!     .build()
//!     .unwrap();
//! assert_eq!(filter.len(), 9586);
//! assert_eq!(filter.bucket_max(), 65535);
//! assert!(filter.is_conservative());
//! ```

use super::{Initial, Knobs, Ready, Sizing};
use crate::core::params::DEFAULT_COUNTER_BITS;
use crate::error::Result;
use crate::filters::CountingBloomFilter;
use std::marker::PhantomData;

/// Builder for [`CountingBloomFilter`] with a type-state sizing guarantee.
#[derive(Debug, Clone)]
pub struct CountingBloomFilterBuilder<State = Initial> {
    sizing: Sizing,
    knobs: Knobs,
    counter_bits: u32,
    conservative: bool,
    _state: PhantomData<State>,
}

impl CountingBloomFilterBuilder<Initial> {
    /// Start a builder with 8-bit counters and plain updates.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sizing: Sizing::Unset,
            knobs: Knobs::default(),
            counter_bits: DEFAULT_COUNTER_BITS,
            conservative: false,
            _state: PhantomData,
        }
    }

    fn sized(self, sizing: Sizing) -> CountingBloomFilterBuilder<Ready> {
        CountingBloomFilterBuilder {
            sizing,
            knobs: self.knobs,
            counter_bits: self.counter_bits,
            conservative: self.conservative,
            _state: PhantomData,
        }
    }

    /// Size for an expected number of insertions (capacity mode).
    #[must_use]
    pub fn expected_entries(self, entries: usize) -> CountingBloomFilterBuilder<Ready> {
        self.sized(Sizing::Entries(entries))
    }

    /// Size from a memory budget such as `"512K"` (fixed-size mode).
    #[must_use]
    pub fn memory_budget(self, budget: impl Into<String>) -> CountingBloomFilterBuilder<Ready> {
        self.sized(Sizing::Budget(budget.into()))
    }

    /// Size to exactly `buckets` counters (fixed-size mode).
    #[must_use]
    pub fn explicit_size(self, buckets: usize) -> CountingBloomFilterBuilder<Ready> {
        self.sized(Sizing::Bits(buckets))
    }
}

impl Default for CountingBloomFilterBuilder<Initial> {
    fn default() -> Self {
        Self::new()
    }
}

impl<State> CountingBloomFilterBuilder<State> {
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

    /// Counter width in bits.
    #[must_use]
    pub fn counter_bits(mut self, bits: u32) -> Self {
        self.counter_bits = bits;
        self
    }

    /// Enable or disable conservative update.
    #[must_use]
    pub fn conservative_update(mut self, enabled: bool) -> Self {
        self.conservative = enabled;
        self
    }
}

impl CountingBloomFilterBuilder<Ready> {
    /// Validate the configuration and allocate the filter.
    ///
    /// # Errors
    ///
    /// Mixed sizing modes, an unsupported counter width, or any parameter
    /// error of the chosen mode.
    pub fn build(self) -> Result<CountingBloomFilter> {
        let params = self.sizing.resolve(&self.knobs, Some(self.counter_bits))?;
        CountingBloomFilter::from_params(params, self.counter_bits, self.conservative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SieveError;

    #[test]
    fn test_builder_defaults() {
        let filter = CountingBloomFilterBuilder::new()
            .expected_entries(1000)
            .build()
            .unwrap();
        assert_eq!(filter.counter_bits(), 8);
        assert_eq!(filter.bucket_max(), 255);
        assert!(!filter.is_conservative());
    }

    #[test]
    fn test_builder_budget_scales_with_width() {
        let wide = CountingBloomFilterBuilder::new()
            .memory_budget("4K")
            .counter_bits(16)
            .build()
            .unwrap();
        let narrow = CountingBloomFilterBuilder::new()
            .memory_budget("4K")
            .counter_bits(2)
            .build()
            .unwrap();
        assert_eq!(wide.len(), 2048);
        assert_eq!(narrow.len(), 16384);
        assert_eq!(wide.memory_usage(), narrow.memory_usage());
    }

    #[test]
    fn test_builder_explicit_buckets() {
        let filter = CountingBloomFilterBuilder::new()
            .counter_bits(4)
            .explicit_size(100)
            .num_hashes(2)
            .build()
            .unwrap();
        assert_eq!(filter.len(), 100);
        assert_eq!(filter.num_hashes(), 2);
        assert_eq!(filter.bucket_max(), 15);
    }

    #[test]
    fn test_builder_rejects_bad_width() {
        let err = CountingBloomFilterBuilder::new()
            .expected_entries(100)
            .counter_bits(12)
            .build()
            .unwrap_err();
        assert_eq!(err, SieveError::InvalidCounterWidth { bits: 12 });
    }

    #[test]
    fn test_builder_rejects_mixed_modes() {
        let err = CountingBloomFilterBuilder::new()
            .explicit_size(100)
            .error_rate(0.01)
            .build()
            .unwrap_err();
        assert!(err.is_invalid_parameters());
        assert!(matches!(err, SieveError::InvalidParameters { .. }));
    }

    #[test]
    fn test_builder_conservative_saturates() {
        let filter = CountingBloomFilterBuilder::new()
            .explicit_size(256)
            .counter_bits(4)
            .conservative_update(true)
            .build()
            .unwrap();
        for _ in 0..20 {
            filter.add("x");
        }
        assert_eq!(filter.estimate("x"), 15);
    }
}
