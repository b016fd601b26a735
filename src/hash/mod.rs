//! Key hashing and position generation.
//!
//! ```text
//! hash/
//! ├── fnv.rs         - FNV-1a 64-bit
//! ├── strategies.rs  - Double hashing into k positions
//! └── mod.rs         - This file
//! ```
//!
//! Both parts are pure functions of the key bytes and need no synchronization.
//! FNV-1a is not keyed and offers no resistance to adversarial inputs.

pub mod fnv;
pub mod strategies;

pub use fnv::{fnv1a64, Fnv1a64, FnvBuildHasher};
pub use strategies::{bit_indices, BitIndices, KeyHashes};
