//! Shared data generators and constants for the benchmarks
//!
//! Generators are seeded so repeated runs hash the same keys.
#![allow(dead_code)]

use rand::distributions::Alphanumeric;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Filter capacities exercised by size-scaling benchmarks
pub const SIZES: &[usize] = &[1_000, 10_000, 100_000, 1_000_000];

/// Target false positive rates
pub const FP_RATES: &[f64] = &[0.1, 0.01, 0.001];

/// Counter widths supported by the counting filter
pub const COUNTER_BITS: &[u32] = &[1, 2, 4, 8, 16];

const SEED: u64 = 0xB100_F11E;

fn rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(SEED)
}

/// Random alphanumeric keys of a fixed length
pub fn generate_strings(count: usize, len: usize) -> Vec<String> {
    let mut rng = rng();
    (0..count)
        .map(|_| {
            (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(len)
                .map(char::from)
                .collect()
        })
        .collect()
}

/// Sequential keys: "item_00000000", "item_00000001", ...
pub fn generate_sequential_strings(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("item_{:08}", i)).collect()
}

/// Random nucleotide sequence over ACGT
pub fn generate_sequence(len: usize) -> Vec<u8> {
    const BASES: &[u8; 4] = b"ACGT";
    let mut rng = rng();
    (0..len).map(|_| BASES[rng.gen_range(0..4)]).collect()
}

/// Every `k`-length window of a random sequence, `count` windows in total
pub fn generate_kmers(count: usize, k: usize) -> Vec<Vec<u8>> {
    let sequence = generate_sequence(count + k - 1);
    sequence.windows(k).map(<[u8]>::to_vec).collect()
}
