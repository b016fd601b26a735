//! Capacity planning for k-mer screening.
//!
//! Prints the filter shape each sizing mode produces, then fills one filter to
//! capacity and compares its estimated and observed false positive rates.
//!
//! Run with: cargo run --example capacity_planning

use sieve::core::params::{calculate_filter_params, collision_probability};
use sieve::{BloomFilter, CountingBloomFilterBuilder, Result};

fn main() -> Result<()> {
    println!("Capacity mode (expected entries, error rate)\n");
    println!("{:>12} {:>8} {:>14} {:>4} {:>12}", "entries", "p", "bits", "k", "memory");
    for (entries, p) in [
        (1_000, 0.01),
        (1_000, 0.001),
        (100_000, 0.001),
        (10_000_000, 0.01),
    ] {
        let (m, k) = calculate_filter_params(entries, p)?;
        println!(
            "{:>12} {:>8} {:>14} {:>4} {:>12}",
            entries,
            p,
            m,
            k,
            human_bytes((m + 7) / 8)
        );
    }

    println!("\nFixed-size mode (memory budget, 7 hashes)\n");
    for budget in ["512K", "1.5M", "64m"] {
        let filter = BloomFilter::with_memory(budget)?;
        let counting = CountingBloomFilterBuilder::new()
            .memory_budget(budget)
            .counter_bits(4)
            .build()?;
        println!(
            "{budget:>6}: {filter}  |  {counting}  ~{} keys at 1%",
            entries_at(filter.len(), filter.num_hashes(), 0.01)
        );
    }

    println!("\nFilled to capacity\n");
    let n = 50_000;
    let filter = BloomFilter::with_capacity(n, 0.01)?;
    let sequence = pseudo_sequence(n + 20);
    for kmer in sequence.windows(21) {
        filter.add(kmer);
    }
    let false_hits = (0..100_000u32)
        .filter(|i| filter.contains(&format!("absent-{i}")))
        .count();
    println!("{filter}");
    println!("  fill ratio     {:.3}", filter.fill_ratio());
    println!("  estimated FPR  {:.4}", filter.collision_probability());
    println!("  observed FPR   {:.4}", false_hits as f64 / 100_000.0);

    Ok(())
}

/// Largest insertion count that keeps the estimate at or below `target`.
fn entries_at(m: usize, k: usize, target: f64) -> u64 {
    let (mut lo, mut hi) = (0u64, m as u64);
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if collision_probability(m, mid, k) <= target {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    lo
}

/// Deterministic ACGT sequence from a linear congruential stream.
fn pseudo_sequence(len: usize) -> Vec<u8> {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            b"ACGT"[(state >> 62) as usize]
        })
        .collect()
}

fn human_bytes(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
