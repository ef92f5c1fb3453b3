use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::env;
use std::process::ExitCode;
use std::time::Instant;

use rand::prelude::*;
use serde::Serialize;

// Digits of pi and phi.
const DEFAULT_SEED: (u64, u64) = (314_159_265, 1_618_033_989);

const DEFAULT_LEN: usize = 1_000;

#[derive(Serialize)]
struct Report {
    len: usize,
    seed: u64,
    timings_ns: BTreeMap<&'static str, u128>,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, String> {
    match env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|_| format!("{key}: can't parse '{val}'")),
        Err(_) => Ok(default),
    }
}

fn compare_u64(a: &[u8], b: &[u8], _ctx: &mut ()) -> i32 {
    let a = u64::from_ne_bytes([a[0], a[1], a[2], a[3], a[4], a[5], a[6], a[7]]);
    let b = u64::from_ne_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]);
    match a.cmp(&b) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

fn sort_generic(v: &mut [u64]) {
    let mut bytes = v.iter().flat_map(|x| x.to_ne_bytes()).collect::<Vec<_>>();
    ksort::generic::sort(&mut bytes, v.len(), 8, compare_u64, &mut ());

    for (dst, chunk) in v.iter_mut().zip(bytes.chunks_exact(8)) {
        *dst = u64::from_ne_bytes([
            chunk[0], chunk[1], chunk[2], chunk[3], chunk[4], chunk[5], chunk[6], chunk[7],
        ]);
    }
}

/// Sorts a fresh copy of `input` and returns the elapsed time, or `None` if the result is not
/// sorted.
fn time_sort(input: &[u64], sort: impl Fn(&mut [u64])) -> Option<u128> {
    let mut v = input.to_vec();

    let start = Instant::now();
    sort(&mut v);
    let elapsed = start.elapsed().as_nanos();

    v.windows(2).all(|w| w[0] <= w[1]).then_some(elapsed)
}

fn run() -> Result<Report, String> {
    let seed = env_or("KSORT_SEED", (DEFAULT_SEED.0 << 32) | DEFAULT_SEED.1)?;
    let len = env_or("KSORT_LEN", DEFAULT_LEN)?;

    // Pin the process to a single core to reduce timing noise.
    if let Some(core) = core_affinity::get_core_ids().and_then(|ids| ids.first().copied()) {
        core_affinity::set_for_current(core);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let input = (0..len).map(|_| rng.gen::<u64>()).collect::<Vec<_>>();

    let sorts: [(&'static str, fn(&mut [u64])); 8] = [
        ("generic", sort_generic),
        ("shell", ksort::shell::sort),
        ("binary_insertion", ksort::binary_insertion::sort),
        ("heap", ksort::heap::sort),
        ("quick", ksort::quick::sort),
        ("merge", ksort::merge::sort),
        ("selection", ksort::selection::sort),
        ("tim", ksort::tim::sort),
    ];

    let mut timings_ns = BTreeMap::new();
    for (name, sort) in sorts {
        let elapsed = time_sort(&input, sort).ok_or_else(|| format!("{name}: output not sorted"))?;
        timings_ns.insert(name, elapsed);
    }

    Ok(Report {
        len,
        seed,
        timings_ns,
    })
}

fn main() -> ExitCode {
    let report = match run() {
        Ok(report) => report,
        Err(err) => {
            eprintln!("ksort-timings: {err}");
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string(&report) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("ksort-timings: {err}");
            ExitCode::FAILURE
        }
    }
}
