//! Lock-free, word-packed bit array.
//!
//! `BitArray` is the storage engine behind [`BloomFilter`](crate::BloomFilter).
//! Bits live in a fixed `Box<[AtomicU64]>` allocated once at construction and
//! never resized.
//!
//! # Memory Layout
//!
//! Bits are packed little-endian within each word:
//!
//! ```text
//! Word 0: [bit 0][bit 1]...[bit 63]
//! Word 1: [bit 64][bit 65]...[bit 127]
//! ```
//!
//! Bits in the last word beyond `len()` are always zero. Every mutating
//! operation preserves this so that [`BitArray::count`] never needs a tail fixup.
//!
//! # Thread Safety
//!
//! Every mutation is a single atomic read-modify-write on one word, so
//! [`BitArray::try_set`] reports "already held this value" without races even
//! when many threads share the array through `&self`. Read-modify-writes
//! (`try_set`, `set_bit`, `block_set`, `block_unset`) use `AcqRel`, the plain
//! stores of `set_all` use `Release`, and reads use `Acquire`. An insert
//! observed by another thread is never seen as missing.
//!
//! # Indexing
//!
//! Indices are unsigned. Accessors panic on out-of-range indices the way slice
//! indexing does; [`BitArray::get_checked`] and [`BitArray::set_checked`] return
//! [`SieveError::IndexOutOfBounds`] instead.
//!
//! # Examples
//!
//! ```
//! use sieve::core::BitArray;
//!
//! let bits = BitArray::new(128).unwrap();
//! assert!(!bits.try_set(65, true));
//! assert!(bits.try_set(65, true));
//! assert!(bits.get(65));
//! assert_eq!(bits.count(), 1);
//! ```

use crate::error::{Result, SieveError};
use crate::util::bitops::{bit_mask, popcount, tail_mask, word_index, words_for_bits};
use std::sync::atomic::{AtomicU64, Ordering};

/// Fixed-size array of bits backed by atomic 64-bit words.
#[derive(Debug)]
pub struct BitArray {
    words: Box<[AtomicU64]>,
    len: usize,
}

impl BitArray {
    /// Allocate a zeroed array of `size` bits.
    ///
    /// # Errors
    ///
    /// Returns [`SieveError::InvalidFilterSize`] if `size` is 0.
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(SieveError::invalid_filter_size(size));
        }

        let words = (0..words_for_bits(size))
            .map(|_| AtomicU64::new(0))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(Self { words, len: size })
    }

    /// Number of addressable bits.
    #[must_use]
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Always `false` for a constructed array; present for API completeness.
    #[must_use]
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of 64-bit storage words.
    #[must_use]
    #[inline]
    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    /// Heap bytes held by the word storage.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.words.len() * std::mem::size_of::<AtomicU64>()
    }

    #[inline(always)]
    fn check_index(&self, index: usize) {
        assert!(
            index < self.len,
            "BitArray index out of bounds: index={} len={}",
            index,
            self.len
        );
    }

    /// Valid-bit mask for word `word`.
    #[inline]
    fn word_mask(&self, word: usize) -> u64 {
        if word + 1 == self.words.len() {
            tail_mask(self.len)
        } else {
            u64::MAX
        }
    }

    /// Read bit `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[must_use]
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        self.check_index(index);
        self.words[word_index(index)].load(Ordering::Acquire) & bit_mask(index) != 0
    }

    /// Unconditionally set (`true`) or clear (`false`) bit `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[inline]
    pub fn set_bit(&self, index: usize, value: bool) {
        let _ = self.try_set(index, value);
    }

    /// Write `value` into bit `index`, returning `true` if the bit already held
    /// `value` (no change) and `false` if this call flipped it.
    ///
    /// The read and the write are one atomic operation, so of several threads
    /// racing to set the same bit exactly one observes `false`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sieve::core::BitArray;
    ///
    /// let bits = BitArray::new(16).unwrap();
    /// assert!(!bits.try_set(3, true));
    /// assert!(bits.try_set(3, true));
    /// assert!(!bits.try_set(3, false));
    /// assert!(!bits.get(3));
    /// ```
    #[inline]
    pub fn try_set(&self, index: usize, value: bool) -> bool {
        self.check_index(index);
        let mask = bit_mask(index);
        let word = &self.words[word_index(index)];

        if value {
            word.fetch_or(mask, Ordering::AcqRel) & mask != 0
        } else {
            word.fetch_and(!mask, Ordering::AcqRel) & mask == 0
        }
    }

    #[inline]
    fn check_block(&self, word: usize, mask: u64) {
        assert!(
            word < self.words.len(),
            "BitArray word index out of bounds: word={} words={}",
            word,
            self.words.len()
        );
        assert!(
            mask & !self.word_mask(word) == 0,
            "BitArray mask {:#x} reaches past len={} (out of bounds)",
            mask,
            self.len
        );
    }

    /// Set every bit of `mask` in word `word`. Returns `true` if all masked bits
    /// were already set.
    ///
    /// # Panics
    ///
    /// Panics if `word >= num_words()` or `mask` names bits at or past `len()`.
    #[inline]
    pub fn block_set(&self, word: usize, mask: u64) -> bool {
        self.check_block(word, mask);
        self.words[word].fetch_or(mask, Ordering::AcqRel) & mask == mask
    }

    /// Clear every bit of `mask` in word `word`. Returns `true` if all masked
    /// bits were already clear.
    ///
    /// # Panics
    ///
    /// Same conditions as [`block_set`](Self::block_set).
    #[inline]
    pub fn block_unset(&self, word: usize, mask: u64) -> bool {
        self.check_block(word, mask);
        self.words[word].fetch_and(!mask, Ordering::AcqRel) & mask == 0
    }

    /// Total number of set bits, one SWAR popcount per word.
    #[must_use]
    pub fn count(&self) -> usize {
        self.words
            .iter()
            .map(|w| popcount(w.load(Ordering::Acquire)) as usize)
            .sum()
    }

    /// Set or clear every addressable bit. Tail bits past `len()` stay zero.
    pub fn set_all(&self, value: bool) {
        let last = self.words.len() - 1;
        for (i, word) in self.words.iter().enumerate() {
            let fill = match (value, i == last) {
                (false, _) => 0,
                (true, false) => u64::MAX,
                (true, true) => tail_mask(self.len),
            };
            word.store(fill, Ordering::Release);
        }
    }

    /// Read bits `[start, end)`.
    ///
    /// # Panics
    ///
    /// Panics if `start > end` or `end > len()`.
    ///
    /// ```
    /// use sieve::core::BitArray;
    ///
    /// let bits = BitArray::new(8).unwrap();
    /// bits.set_bit(1, true);
    /// assert_eq!(bits.get_range(0, 3), vec![false, true, false]);
    /// ```
    #[must_use]
    pub fn get_range(&self, start: usize, end: usize) -> Vec<bool> {
        assert!(start <= end, "start must be <= end: start={} end={}", start, end);
        assert!(
            end <= self.len,
            "BitArray range out of bounds: end={} len={}",
            end,
            self.len
        );
        (start..end).map(|i| self.get(i)).collect()
    }

    /// Bounds-checked [`get`](Self::get).
    ///
    /// # Errors
    ///
    /// Returns [`SieveError::IndexOutOfBounds`] if `index >= len()`.
    pub fn get_checked(&self, index: usize) -> Result<bool> {
        if index >= self.len {
            return Err(SieveError::index_out_of_bounds(index, self.len));
        }
        Ok(self.get(index))
    }

    /// Bounds-checked [`set_bit`](Self::set_bit).
    ///
    /// # Errors
    ///
    /// Returns [`SieveError::IndexOutOfBounds`] if `index >= len()`.
    pub fn set_checked(&self, index: usize, value: bool) -> Result<()> {
        if index >= self.len {
            return Err(SieveError::index_out_of_bounds(index, self.len));
        }
        self.set_bit(index, value);
        Ok(())
    }
}

impl Clone for BitArray {
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
        }
    }
}
