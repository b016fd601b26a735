//! Filter sizing: closed-form capacity math and memory budgets.
//!
//! A filter's shape is two numbers, the storage length `m` and the hash count
//! `k`. They come from one of two modes:
//!
//! - **Fixed size.** The caller names `m` directly, or a byte budget such as
//!   `"512K"` that is converted to bits. `k` defaults to
//!   [`DEFAULT_HASH_COUNT`] unless the caller supplies one.
//! - **Capacity / error rate.** The caller names the expected insertion count
//!   `n` and target false positive rate `p`:
//!   - `m = ⌈-n × ln(p) / (ln 2)²⌉`
//!   - `k = ⌈(m / n) × ln 2⌉`
//!
//! `k` is never derived jointly from a caller-fixed `m`.
//!
//! After `added` insertions the estimated false positive rate is
//! `(1 - e^(-k × added / m))^k`; see [`collision_probability`].
//!
//! # References
//!
//! - Bloom, Burton H. (1970). "Space/Time Trade-offs in Hash Coding with Allowable Errors"
//! - Kirsch & Mitzenmacher (2006). "Less Hashing, Same Performance: Building a Better Bloom Filter"

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

use crate::error::{Result, SieveError};
use std::f64::consts::LN_2;

const LN2_SQUARED: f64 = LN_2 * LN_2;

/// Hash count used by fixed-size filters when none is given.
pub const DEFAULT_HASH_COUNT: usize = 7;

/// Target false positive rate used by [`Capacity::entries`].
pub const DEFAULT_ERROR_RATE: f64 = 0.01;

/// Minimum number of hash functions.
pub const MIN_HASH_FUNCTIONS: usize = 1;

/// Maximum number of hash functions.
pub const MAX_HASH_FUNCTIONS: usize = 64;

/// Counter widths that pack evenly into a 64-bit word.
pub const COUNTER_WIDTHS: [u32; 5] = [1, 2, 4, 8, 16];

/// Counter width used by counting filters when none is given.
pub const DEFAULT_COUNTER_BITS: u32 = 8;

/// Optimal storage length for `n` insertions at false positive rate `fp_rate`.
///
/// `m = ⌈-n × ln(p) / (ln 2)²⌉`
///
/// # Errors
///
/// - [`SieveError::InvalidItemCount`] if `n == 0`
/// - [`SieveError::FalsePositiveRateOutOfBounds`] if `fp_rate` is not in (0, 1)
/// - [`SieveError::InvalidParameters`] if the result does not fit in `usize`
///
/// # Examples
///
/// ```
/// use sieve::core::params::optimal_bit_count;
///
/// assert_eq!(optimal_bit_count(1000, 0.01).unwrap(), 9586);
/// assert_eq!(optimal_bit_count(1000, 0.001).unwrap(), 14378);
/// ```
pub fn optimal_bit_count(n: usize, fp_rate: f64) -> Result<usize> {
    if n == 0 {
        return Err(SieveError::invalid_item_count(n));
    }

    // NaN fails both comparisons, so test for the valid range instead.
    if !(fp_rate > 0.0 && fp_rate < 1.0) {
        return Err(SieveError::fp_rate_out_of_bounds(fp_rate));
    }

    let m = (-(n as f64) * fp_rate.ln() / LN2_SQUARED).ceil();

    if !m.is_finite() || m >= usize::MAX as f64 {
        return Err(SieveError::invalid_parameters(format!(
            "calculated filter size {:.0} exceeds addressable memory",
            m
        )));
    }

    Ok((m as usize).max(1))
}

/// Optimal hash count for `m` storage slots holding `n` keys.
///
/// `k = ⌈(m / n) × ln 2⌉`, never below 1.
///
/// # Errors
///
/// - [`SieveError::InvalidFilterSize`] if `m == 0`
/// - [`SieveError::InvalidItemCount`] if `n == 0`
/// - [`SieveError::InvalidHashCount`] if the result exceeds [`MAX_HASH_FUNCTIONS`]
///
/// ```
/// use sieve::core::params::optimal_hash_count;
///
/// assert_eq!(optimal_hash_count(9586, 1000).unwrap(), 7);
/// ```
pub fn optimal_hash_count(m: usize, n: usize) -> Result<usize> {
    if m == 0 {
        return Err(SieveError::invalid_filter_size(m));
    }
    if n == 0 {
        return Err(SieveError::invalid_item_count(n));
    }

    let k = ((m as f64 / n as f64) * LN_2).ceil() as usize;
    let k = k.max(MIN_HASH_FUNCTIONS);
    validate_hash_count(k)?;
    Ok(k)
}

/// Both capacity-mode parameters at once, as `(m, k)`.
///
/// # Errors
///
/// See [`optimal_bit_count`] and [`optimal_hash_count`].
///
/// ```
/// use sieve::core::params::calculate_filter_params;
///
/// assert_eq!(calculate_filter_params(1000, 0.01).unwrap(), (9586, 7));
/// ```
pub fn calculate_filter_params(n: usize, fp_rate: f64) -> Result<(usize, usize)> {
    let m = optimal_bit_count(n, fp_rate)?;
    let k = optimal_hash_count(m, n)?;
    Ok((m, k))
}

/// Reject hash counts outside `[MIN_HASH_FUNCTIONS, MAX_HASH_FUNCTIONS]`.
///
/// # Errors
///
/// Returns [`SieveError::InvalidHashCount`].
pub fn validate_hash_count(k: usize) -> Result<()> {
    if !(MIN_HASH_FUNCTIONS..=MAX_HASH_FUNCTIONS).contains(&k) {
        return Err(SieveError::invalid_hash_count(
            k,
            MIN_HASH_FUNCTIONS,
            MAX_HASH_FUNCTIONS,
        ));
    }
    Ok(())
}

/// Reject counter widths that are not in [`COUNTER_WIDTHS`].
///
/// # Errors
///
/// Returns [`SieveError::InvalidCounterWidth`].
pub fn validate_counter_bits(bits: u32) -> Result<()> {
    if !COUNTER_WIDTHS.contains(&bits) {
        return Err(SieveError::invalid_counter_width(bits));
    }
    Ok(())
}

/// Estimated false positive rate of a filter with `m` slots and `k` hashes
/// after `added` insertions: `(1 - e^(-k × added / m))^k`.
///
/// Zero for an empty filter. `added` counts insertions, not distinct keys, so
/// repeated keys make this an overestimate.
///
/// ```
/// use sieve::core::params::collision_probability;
///
/// assert_eq!(collision_probability(9586, 0, 7), 0.0);
/// let p = collision_probability(9586, 1000, 7);
/// assert!((p - 0.01).abs() < 0.001);
/// ```
#[must_use]
pub fn collision_probability(m: usize, added: u64, k: usize) -> f64 {
    if added == 0 || m == 0 {
        return 0.0;
    }

    let k = k as f64;
    let fill = 1.0 - (-k * added as f64 / m as f64).exp();
    fill.powf(k).clamp(0.0, 1.0)
}

/// Parse a memory budget into a bit count.
///
/// The budget is a decimal number, fractions allowed, with an optional
/// case-insensitive `K`, `M` or `G` suffix (powers of 1024). A bare number is
/// a byte count. The byte count is truncated to a whole number and multiplied
/// by 8.
///
/// # Errors
///
/// - [`SieveError::InvalidMemoryBudget`] if the string is not a finite,
///   non-negative number with an optional suffix, or the result overflows
/// - [`SieveError::InvalidFilterSize`] if the budget rounds down to zero bits
///
/// # Examples
///
/// ```
/// use sieve::core::params::parse_memory_budget;
///
/// assert_eq!(parse_memory_budget("512K").unwrap(), 4_194_304);
/// assert_eq!(parse_memory_budget("1.5m").unwrap(), 12_582_912);
/// assert_eq!(parse_memory_budget("100").unwrap(), 800);
/// assert!(parse_memory_budget("12X").is_err());
/// ```
pub fn parse_memory_budget(budget: &str) -> Result<usize> {
    let trimmed = budget.trim();
    let (number, multiplier) = match trimmed.chars().last() {
        Some('k' | 'K') => (&trimmed[..trimmed.len() - 1], 1024.0),
        Some('m' | 'M') => (&trimmed[..trimmed.len() - 1], 1024.0 * 1024.0),
        Some('g' | 'G') => (&trimmed[..trimmed.len() - 1], 1024.0 * 1024.0 * 1024.0),
        Some(_) => (trimmed, 1.0),
        None => return Err(SieveError::invalid_memory_budget(budget)),
    };

    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| SieveError::invalid_memory_budget(budget))?;

    if !value.is_finite() || value < 0.0 {
        return Err(SieveError::invalid_memory_budget(budget));
    }

    let bytes = (value * multiplier).floor();
    if bytes >= (usize::MAX / 8) as f64 {
        return Err(SieveError::invalid_memory_budget(budget));
    }

    let bits = bytes as usize * 8;
    if bits == 0 {
        return Err(SieveError::invalid_filter_size(bits));
    }
    Ok(bits)
}

/// How a caller sizes a filter.
///
/// ```
/// use sieve::core::params::{Capacity, FilterParams};
///
/// let p = FilterParams::resolve(&Capacity::expected(1000, 0.01)).unwrap();
/// assert_eq!((p.size, p.num_hashes), (9586, 7));
///
/// let p = FilterParams::resolve(&Capacity::bytes("1K")).unwrap();
/// assert_eq!((p.size, p.num_hashes), (8192, 7));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Capacity {
    /// Caller-fixed storage length and hash count.
    Explicit {
        /// Bits (Bloom) or buckets (counting).
        size: usize,
        /// Hash functions per key.
        hashes: usize,
    },
    /// Memory budget such as `"512K"`, with [`DEFAULT_HASH_COUNT`] hashes.
    ByteBudget(String),
    /// Expected insertions and target false positive rate.
    Expected {
        /// Expected number of insertions.
        entries: usize,
        /// Target false positive rate in (0, 1).
        error_rate: f64,
    },
}

impl Capacity {
    /// Fixed size with the default hash count.
    #[must_use]
    pub fn size(size: usize) -> Self {
        Self::Explicit {
            size,
            hashes: DEFAULT_HASH_COUNT,
        }
    }

    /// Memory budget.
    #[must_use]
    pub fn bytes(budget: impl Into<String>) -> Self {
        Self::ByteBudget(budget.into())
    }

    /// Expected insertions and target false positive rate.
    #[must_use]
    pub fn expected(entries: usize, error_rate: f64) -> Self {
        Self::Expected {
            entries,
            error_rate,
        }
    }

    /// Expected insertions at [`DEFAULT_ERROR_RATE`].
    #[must_use]
    pub fn entries(entries: usize) -> Self {
        Self::expected(entries, DEFAULT_ERROR_RATE)
    }
}

/// Resolved filter shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterParams {
    /// Storage length: bits for a Bloom filter, buckets for a counting filter.
    pub size: usize,
    /// Hash functions per key.
    pub num_hashes: usize,
}

impl FilterParams {
    /// Resolve a capacity into a bit count and hash count.
    ///
    /// # Errors
    ///
    /// Any parameter error from the selected mode: zero size, hash count out of
    /// range, unparseable budget, zero entries, or an error rate outside (0, 1).
    pub fn resolve(capacity: &Capacity) -> Result<Self> {
        let params = match capacity {
            Capacity::Explicit { size, hashes } => Self {
                size: *size,
                num_hashes: *hashes,
            },
            Capacity::ByteBudget(budget) => Self {
                size: parse_memory_budget(budget)?,
                num_hashes: DEFAULT_HASH_COUNT,
            },
            Capacity::Expected {
                entries,
                error_rate,
            } => {
                let (size, num_hashes) = calculate_filter_params(*entries, *error_rate)?;
                Self { size, num_hashes }
            }
        };
        params.validate()
    }

    /// Resolve a capacity into a bucket count for `counter_bits`-wide counters.
    ///
    /// A byte budget is divided among counters (`bits / counter_bits`). Explicit
    /// sizes and capacity-mode results are bucket counts as-is.
    ///
    /// ```
    /// use sieve::core::params::{Capacity, FilterParams};
    ///
    /// let p = FilterParams::resolve_buckets(&Capacity::bytes("1K"), 8).unwrap();
    /// assert_eq!(p.size, 1024);
    /// ```
    ///
    /// # Errors
    ///
    /// As [`resolve`](Self::resolve), plus [`SieveError::InvalidCounterWidth`].
    pub fn resolve_buckets(capacity: &Capacity, counter_bits: u32) -> Result<Self> {
        validate_counter_bits(counter_bits)?;

        match capacity {
            Capacity::ByteBudget(budget) => Self {
                size: parse_memory_budget(budget)? / counter_bits as usize,
                num_hashes: DEFAULT_HASH_COUNT,
            }
            .validate(),
            other => Self::resolve(other),
        }
    }

    fn validate(self) -> Result<Self> {
        if self.size == 0 {
            return Err(SieveError::invalid_filter_size(self.size));
        }
        validate_hash_count(self.num_hashes)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ln2_squared_constant() {
        let expected = 0.480_453_013_918_201_4;
        assert!((LN2_SQUARED - expected).abs() < 1e-10);
    }

    #[test]
    fn test_optimal_bit_count_rounds_up() {
        assert_eq!(optimal_bit_count(1000, 0.01).unwrap(), 9586);
        assert_eq!(optimal_bit_count(100_000, 0.001).unwrap(), 1_437_759);
        assert_eq!(optimal_bit_count(1, 0.5).unwrap(), 2);
    }

    #[test]
    fn test_optimal_bit_count_zero_items_error() {
        assert_eq!(
            optimal_bit_count(0, 0.01),
            Err(SieveError::InvalidItemCount { count: 0 })
        );
    }

    #[test]
    fn test_optimal_bit_count_invalid_fp_rates() {
        for p in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            let err = optimal_bit_count(1000, p).unwrap_err();
            assert!(matches!(err, SieveError::FalsePositiveRateOutOfBounds { .. }));
        }
    }

    #[test]
    fn test_optimal_hash_count_rounds_up() {
        assert_eq!(optimal_hash_count(9586, 1000).unwrap(), 7);
        assert_eq!(optimal_hash_count(14378, 1000).unwrap(), 10);
        assert_eq!(optimal_hash_count(1, 1000).unwrap(), 1);
    }

    #[test]
    fn test_optimal_hash_count_above_max_error() {
        let err = optimal_hash_count(1_000_000, 10).unwrap_err();
        assert!(matches!(err, SieveError::InvalidHashCount { max: 64, .. }));
    }

    #[test]
    fn test_optimal_hash_count_zero_inputs() {
        assert!(matches!(
            optimal_hash_count(0, 10),
            Err(SieveError::InvalidFilterSize { size: 0 })
        ));
        assert!(matches!(
            optimal_hash_count(10, 0),
            Err(SieveError::InvalidItemCount { count: 0 })
        ));
    }

    #[test]
    fn test_collision_probability() {
        assert_eq!(collision_probability(100, 0, 7), 0.0);

        let p = collision_probability(9586, 1000, 7);
        assert!(p > 0.009 && p < 0.011, "got {p}");

        let lighter = collision_probability(9586, 500, 7);
        let heavier = collision_probability(9586, 5000, 7);
        assert!(lighter < p && p < heavier);
        assert!(heavier <= 1.0);
    }

    #[test]
    fn test_parse_memory_budget_suffixes() {
        assert_eq!(parse_memory_budget("512K").unwrap(), 512 * 1024 * 8);
        assert_eq!(parse_memory_budget("512k").unwrap(), 512 * 1024 * 8);
        assert_eq!(parse_memory_budget("2M").unwrap(), 2 * 1024 * 1024 * 8);
        assert_eq!(parse_memory_budget("1g").unwrap(), 1024 * 1024 * 1024 * 8);
        assert_eq!(parse_memory_budget("1.5M").unwrap(), 12_582_912);
        assert_eq!(parse_memory_budget(" 64 ").unwrap(), 512);
    }

    #[test]
    fn test_parse_memory_budget_truncates_fractional_bytes() {
        assert_eq!(parse_memory_budget("1.9").unwrap(), 8);
    }

    #[test]
    fn test_parse_memory_budget_rejects_garbage() {
        for bad in ["", "K", "12X", "-1K", "abc", "infK", "1e400"] {
            let err = parse_memory_budget(bad).unwrap_err();
            assert!(
                matches!(err, SieveError::InvalidMemoryBudget { .. }),
                "{bad:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_parse_memory_budget_zero_bits() {
        assert_eq!(
            parse_memory_budget("0.5"),
            Err(SieveError::InvalidFilterSize { size: 0 })
        );
        assert!(parse_memory_budget("0K").is_err());
    }

    #[test]
    fn test_capacity_constructors() {
        assert_eq!(
            Capacity::size(100),
            Capacity::Explicit {
                size: 100,
                hashes: 7
            }
        );
        assert_eq!(Capacity::entries(50), Capacity::expected(50, 0.01));
        assert_eq!(Capacity::bytes("1K"), Capacity::ByteBudget("1K".into()));
    }

    #[test]
    fn test_resolve_each_mode() {
        let p = FilterParams::resolve(&Capacity::Explicit {
            size: 1000,
            hashes: 3,
        })
        .unwrap();
        assert_eq!(p, FilterParams { size: 1000, num_hashes: 3 });

        let p = FilterParams::resolve(&Capacity::bytes("512K")).unwrap();
        assert_eq!(p, FilterParams { size: 4_194_304, num_hashes: 7 });

        let p = FilterParams::resolve(&Capacity::entries(1000)).unwrap();
        assert_eq!(p, FilterParams { size: 9586, num_hashes: 7 });
    }

    #[test]
    fn test_resolve_rejects_bad_explicit() {
        let err = FilterParams::resolve(&Capacity::size(0)).unwrap_err();
        assert!(err.is_invalid_parameters());

        let err = FilterParams::resolve(&Capacity::Explicit {
            size: 10,
            hashes: 0,
        })
        .unwrap_err();
        assert!(matches!(err, SieveError::InvalidHashCount { count: 0, .. }));

        let err = FilterParams::resolve(&Capacity::Explicit {
            size: 10,
            hashes: 65,
        })
        .unwrap_err();
        assert!(matches!(err, SieveError::InvalidHashCount { count: 65, .. }));
    }

    #[test]
    fn test_resolve_buckets() {
        let p = FilterParams::resolve_buckets(&Capacity::bytes("1K"), 4).unwrap();
        assert_eq!(p.size, 2048);

        let p = FilterParams::resolve_buckets(&Capacity::size(300), 16).unwrap();
        assert_eq!(p.size, 300);

        let err = FilterParams::resolve_buckets(&Capacity::size(300), 3).unwrap_err();
        assert_eq!(err, SieveError::InvalidCounterWidth { bits: 3 });

        let err = FilterParams::resolve_buckets(&Capacity::bytes("1"), 16).unwrap_err();
        assert_eq!(err, SieveError::InvalidFilterSize { size: 0 });
    }
}
