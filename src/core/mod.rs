//! Storage engines, sizing math and the shared filter trait.
//!
//! ```text
//! core/
//! ├── bitarray.rs  - Atomic word-packed bit array
//! ├── counters.rs  - Atomic packed saturating counters
//! ├── params.rs    - Capacity modes and closed-form sizing
//! ├── filter.rs    - ProbabilisticFilter trait
//! └── mod.rs       - This file
//! ```
//!
//! Both storage types allocate once, never resize, and mutate through `&self`
//! with single-word atomic operations. Filters own exactly one of them.
//!
//! # Examples
//!
//! ```
//! use sieve::core::{calculate_filter_params, BitArray};
//!
//! let (m, k) = calculate_filter_params(1000, 0.01).unwrap();
//! let bits = BitArray::new(m).unwrap();
//! assert_eq!(bits.len(), 9586);
//! assert_eq!(k, 7);
//! ```

#![allow(clippy::module_name_repetitions)]

pub mod bitarray;
pub mod counters;
pub mod filter;
pub mod params;

pub use bitarray::BitArray;
pub use counters::CounterArray;
pub use filter::ProbabilisticFilter;
pub use params::{
    calculate_filter_params, collision_probability, optimal_bit_count, optimal_hash_count,
    parse_memory_budget, Capacity, FilterParams,
};
