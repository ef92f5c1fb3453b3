use std::env;
use std::ops::RangeInclusive;

use once_cell::sync::Lazy;
use rand::distributions::Uniform;
use rand::prelude::*;
use zipf::ZipfDistribution;

/// Provides a set of patterns useful for testing and benchmarking sorting algorithms.
/// Currently limited to i32 values.

// --- Public ---

/// Uniformly distributed values over the whole `i32` range.
pub fn random(len: usize) -> Vec<i32> {
    //     .
    // : . : :
    // :.:::.::

    let mut rng = new_seeded_rng();
    (0..len).map(|_| rng.gen::<i32>()).collect()
}

/// Uniformly distributed values drawn from `range`, producing many duplicates for narrow ranges.
pub fn random_uniform(len: usize, range: RangeInclusive<i32>) -> Vec<i32> {
    // :.:.:.::

    let mut rng = new_seeded_rng();
    let dist = Uniform::from(range);
    (0..len).map(|_| dist.sample(&mut rng)).collect()
}

/// Zipfian distributed values, a few values are very common and most are rare.
pub fn random_zipf(len: usize, exponent: f64) -> Vec<i32> {
    // https://en.wikipedia.org/wiki/Zipf's_law

    if len == 0 {
        return Vec::new();
    }

    let mut rng = new_seeded_rng();
    let dist = ZipfDistribution::new(len, exponent).unwrap();
    (0..len).map(|_| dist.sample(&mut rng) as i32).collect()
}

/// Random values where the first `sorted_percent` of the elements are already in order.
pub fn random_sorted(len: usize, sorted_percent: f64) -> Vec<i32> {
    //     .:
    //   .:::. :
    // .::::::.::
    // [----][--]
    //  ^      ^
    //  |      |
    // sorted  |
    //     unsorted

    let mut v = random(len);
    let sorted_len = ((len as f64) * (sorted_percent / 100.0)).round() as usize;
    v[0..sorted_len.min(len)].sort_unstable();

    v
}

pub fn all_equal(len: usize) -> Vec<i32> {
    // ......
    // ::::::

    vec![66; len]
}

pub fn ascending(len: usize) -> Vec<i32> {
    //     .:
    //   .:::
    // .:::::

    (0..len as i32).collect()
}

pub fn descending(len: usize) -> Vec<i32> {
    // :.
    // :::.
    // :::::.

    (0..len as i32).rev().collect()
}

/// Alternating ascending and descending blocks of random length.
pub fn saw_mixed(len: usize, saw_count: usize) -> Vec<i32> {
    //   :.  :.    .::.    .:
    // :.:::.::  .::::::.:::

    if len == 0 {
        return Vec::new();
    }

    let mut rng = new_seeded_rng();
    let mut v = random(len);
    let chunk_len = (len / saw_count.max(1)).max(1);

    for chunk in v.chunks_mut(chunk_len) {
        if rng.gen::<bool>() {
            chunk.sort_unstable();
        } else {
            chunk.sort_unstable_by(|a, b| b.cmp(a));
        }
    }

    v
}

pub fn pipe_organ(len: usize) -> Vec<i32> {
    //   .:.
    // .:::::.

    let mut v = random(len);
    let first_half = &mut v[0..(len / 2)];
    first_half.sort_unstable();

    let second_half = &mut v[(len / 2)..len];
    second_half.sort_unstable_by(|a, b| b.cmp(a));

    v
}

/// The seed every pattern of this process is generated from.
///
/// Set `OVERRIDE_SEED` to reproduce a failure.
pub fn random_init_seed() -> u64 {
    *SEED_VALUE
}

// --- Private ---

static SEED_VALUE: Lazy<u64> = Lazy::new(|| {
    env::var("OVERRIDE_SEED")
        .ok()
        .and_then(|seed| seed.parse::<u64>().ok())
        .unwrap_or_else(|| thread_rng().gen())
});

fn new_seeded_rng() -> StdRng {
    StdRng::seed_from_u64(random_init_seed())
}
