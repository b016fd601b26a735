//! Packed saturating counters.
//!
//! `CounterArray` stores `len` counters of `counter_bits` bits each, packed
//! into atomic 64-bit words (64 / `counter_bits` counters per word). A counter
//! ranges over `[0, 2^counter_bits - 1]` and clamps at the top instead of
//! wrapping.
//!
//! Increments are compare-and-swap loops on the containing word: load, clamp,
//! attempt the swap, retry with the observed word on conflict. Concurrent
//! increments of neighbouring counters in one word never lose updates and never
//! carry into each other.
//!
//! ```
//! use sieve::core::CounterArray;
//!
//! let counters = CounterArray::new(10, 2).unwrap();
//! assert_eq!(counters.bucket_max(), 3);
//! for _ in 0..5 {
//!     counters.increment(4);
//! }
//! assert_eq!(counters.get(4), 3);
//! assert_eq!(counters.count_nonzero(), 1);
//! ```

#![allow(clippy::cast_possible_truncation)]

use crate::core::params::validate_counter_bits;
use crate::error::{Result, SieveError};
use crate::util::bitops::{count_nonzero_lanes, WORD_BITS};
use std::sync::atomic::{AtomicU64, Ordering};

/// Fixed-length array of fixed-width saturating counters.
#[derive(Debug)]
pub struct CounterArray {
    words: Box<[AtomicU64]>,
    len: usize,
    counter_bits: u32,
    per_word: usize,
    max: u64,
}

impl CounterArray {
    /// Allocate `len` zeroed counters of `counter_bits` bits.
    ///
    /// # Errors
    ///
    /// - [`SieveError::InvalidFilterSize`] if `len` is 0
    /// - [`SieveError::InvalidCounterWidth`] if `counter_bits` is not 1, 2, 4, 8 or 16
    pub fn new(len: usize, counter_bits: u32) -> Result<Self> {
        validate_counter_bits(counter_bits)?;
        if len == 0 {
            return Err(SieveError::invalid_filter_size(len));
        }

        let per_word = WORD_BITS / counter_bits as usize;
        let num_words = (len + per_word - 1) / per_word;
        let words = (0..num_words)
            .map(|_| AtomicU64::new(0))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(Self {
            words,
            len,
            counter_bits,
            per_word,
            max: (1u64 << counter_bits) - 1,
        })
    }

    /// Number of counters.
    #[must_use]
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Always `false` for a constructed array.
    #[must_use]
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Width of each counter in bits.
    #[must_use]
    #[inline]
    pub const fn counter_bits(&self) -> u32 {
        self.counter_bits
    }

    /// Saturation ceiling, `2^counter_bits - 1`.
    #[must_use]
    #[inline]
    pub const fn bucket_max(&self) -> u32 {
        self.max as u32
    }

    /// Number of 64-bit storage words.
    #[must_use]
    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    /// Heap bytes held by the word storage.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.words.len() * std::mem::size_of::<AtomicU64>()
    }

    #[inline(always)]
    fn locate(&self, index: usize) -> (usize, u32) {
        assert!(
            index < self.len,
            "CounterArray index out of bounds: index={} len={}",
            index,
            self.len
        );
        let word = index / self.per_word;
        let shift = (index % self.per_word) as u32 * self.counter_bits;
        (word, shift)
    }

    /// Current value of counter `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[must_use]
    #[inline]
    pub fn get(&self, index: usize) -> u32 {
        let (word, shift) = self.locate(index);
        ((self.words[word].load(Ordering::Acquire) >> shift) & self.max) as u32
    }

    /// Add one to counter `index` unless it is already at the ceiling.
    ///
    /// Returns the new value, or `None` if the counter was saturated and the
    /// increment was absorbed.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[inline]
    pub fn increment(&self, index: usize) -> Option<u32> {
        let (word, shift) = self.locate(index);
        let cell = &self.words[word];
        let mut current = cell.load(Ordering::Acquire);

        loop {
            let value = (current >> shift) & self.max;
            if value == self.max {
                return None;
            }

            match cell.compare_exchange_weak(
                current,
                current + (1u64 << shift),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Some((value + 1) as u32),
                Err(actual) => current = actual,
            }
        }
    }

    /// Number of counters holding a non-zero value.
    #[must_use]
    pub fn count_nonzero(&self) -> usize {
        self.words
            .iter()
            .map(|w| count_nonzero_lanes(w.load(Ordering::Acquire), self.counter_bits) as usize)
            .sum()
    }
}

impl Clone for CounterArray {
    fn clone(&self) -> Self {
        let words = self
            .words
            .iter()
            .map(|w| AtomicU64::new(w.load(Ordering::Acquire)))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            words,
            len: self.len,
            counter_bits: self.counter_bits,
            per_word: self.per_word,
            max: self.max,
        }
    }
}
