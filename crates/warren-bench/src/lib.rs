//! Benchmark fixtures for the warren container.
//!
//! Provides deterministic pre-built containers for the criterion
//! benches:
//!
//! - [`sequential`]: densely filled with ascending values
//! - [`shuffled`]: filled with seeded pseudo-random values
//! - [`churned`]: filled, then a seeded fraction of elements erased

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::{RngExt, SeedableRng};
use rand_chacha::ChaCha8Rng;
use warren::Warren;

/// Group capacity bounds used by every fixture. Small enough that the
/// 10K-element benches span a multi-group chain.
pub const GROUP_MIN: u16 = 64;

/// See [`GROUP_MIN`].
pub const GROUP_MAX: u16 = 2048;

/// A container densely filled with `0..count`.
pub fn sequential(count: usize) -> Warren<u64> {
    let mut warren = Warren::with_group_sizes(GROUP_MIN, GROUP_MAX);
    warren.extend(0..count as u64);
    warren
}

/// A container filled with `count` seeded pseudo-random values.
pub fn shuffled(count: usize, seed: u64) -> Warren<u64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut warren = Warren::with_group_sizes(GROUP_MIN, GROUP_MAX);
    for _ in 0..count {
        warren.insert(rng.random());
    }
    warren
}

/// A container filled with `0..count`, then roughly `erase_per_mille`
/// out of every 1000 elements erased at seeded positions.
///
/// The begin element is kept so traversal benches always have a first
/// element to start from.
pub fn churned(count: usize, erase_per_mille: u32, seed: u64) -> Warren<u64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut warren = Warren::with_group_sizes(GROUP_MIN, GROUP_MAX);
    let cursors: Vec<_> = (0..count as u64).map(|v| warren.insert(v)).collect();
    for cursor in cursors.into_iter().skip(1) {
        if rng.random_range(0..1000) < erase_per_mille {
            warren.erase(cursor);
        }
    }
    warren
}
