//! Low-level helpers shared by the storage engines.
//!
//! # Modules
//!
//! - [`bitops`] - Word addressing, SWAR popcount and lane counting

pub mod bitops;

pub use bitops::{count_nonzero_lanes, popcount};
