use rand::prelude::*;

use ksort::tim::{self, collapse, find_run, force_collapse, min_run_length, Run, RunStack};
use sort_test_tools::patterns;

#[test]
fn min_run_length_small_inputs() {
    for n in 0..tim::MIN_MERGE {
        assert_eq!(min_run_length(n), n);
    }
}

#[test]
fn min_run_length_range() {
    let lens = (tim::MIN_MERGE..5_000).chain([1 << 20, (1 << 20) + 1, usize::MAX]);
    for n in lens {
        let min_run = min_run_length(n);
        assert!(
            (tim::MIN_MERGE / 2..=tim::MIN_MERGE).contains(&min_run),
            "min_run_length({n}) = {min_run}"
        );
    }

    // Powers of two split into exactly `MIN_MERGE / 2` sized runs.
    assert_eq!(min_run_length(1 << 16), tim::MIN_MERGE / 2);
    assert_eq!(min_run_length(64), 32);
    assert_eq!(min_run_length(65), 33);
}

#[test]
fn find_run_reverses_descending_prefix() {
    let mut v = [5, 4, 3, 2, 1, 6, 7, 8, 9, 10];

    let run_len = find_run(&mut v, &mut |a: &i32, b: &i32| a < b);
    assert_eq!(run_len, 5);
    assert_eq!(v[..5], [1, 2, 3, 4, 5]);

    let run_len = find_run(&mut v[5..], &mut |a: &i32, b: &i32| a < b);
    assert_eq!(run_len, 5);

    tim::sort(&mut v);
    assert_eq!(v, [1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
}

#[test]
fn find_run_edge_cases() {
    let is_less = &mut |a: &i32, b: &i32| a < b;

    assert_eq!(find_run::<i32, _>(&mut [], is_less), 0);
    assert_eq!(find_run(&mut [7], is_less), 1);

    // Equal elements never belong to a descending run, reversing them would break stability.
    let mut v = [3, 3, 2, 1];
    assert_eq!(find_run(&mut v, is_less), 2);
    assert_eq!(v, [3, 3, 2, 1]);

    let mut v = [3, 2, 2, 1];
    assert_eq!(find_run(&mut v, is_less), 2);
    assert_eq!(v, [2, 3, 2, 1]);

    let mut v = [4, 4, 4, 4];
    assert_eq!(find_run(&mut v, is_less), 4);
}

#[test]
fn run_stack_merge_at() {
    let mut runs = RunStack::new();
    assert!(runs.is_empty());

    runs.push(Run { start: 0, len: 10 });
    runs.push(Run { start: 10, len: 4 });
    runs.push(Run { start: 14, len: 3 });
    assert_eq!(runs.len(), 3);

    let merged = runs.merge_at(0);
    assert_eq!(merged, Run { start: 0, len: 14 });
    assert_eq!(
        runs.as_slice(),
        [Run { start: 0, len: 14 }, Run { start: 14, len: 3 }]
    );

    runs.merge_at(0);
    assert_eq!(runs.as_slice(), [Run { start: 0, len: 17 }]);
}

fn runs_from_lens(lens: &[usize]) -> Vec<Run> {
    let mut start = 0;
    lens.iter()
        .map(|&len| {
            let run = Run { start, len };
            start += len;
            run
        })
        .collect()
}

#[test]
fn collapse_decisions() {
    // Too few runs.
    assert_eq!(collapse(&runs_from_lens(&[])), None);
    assert_eq!(collapse(&runs_from_lens(&[5])), None);

    // runs[n - 2] <= runs[n - 1]
    assert_eq!(collapse(&runs_from_lens(&[5, 5])), Some(0));
    assert_eq!(collapse(&runs_from_lens(&[6, 5])), None);

    // runs[n - 3] <= runs[n - 2] + runs[n - 1], the smaller neighbour of the middle run is merged.
    assert_eq!(collapse(&runs_from_lens(&[10, 6, 5])), Some(1));
    assert_eq!(collapse(&runs_from_lens(&[10, 6, 12])), Some(0));

    // Invariants hold.
    assert_eq!(collapse(&runs_from_lens(&[30, 20, 5])), None);

    // The fourth run from the top is checked too.
    assert_eq!(collapse(&runs_from_lens(&[30, 20, 15, 4])), Some(2));

    assert_eq!(force_collapse(&runs_from_lens(&[5])), None);
    assert_eq!(force_collapse(&runs_from_lens(&[30, 20, 5])), Some(1));
    assert_eq!(force_collapse(&runs_from_lens(&[3, 20, 5])), Some(0));
}

#[test]
fn collapse_keeps_stack_shallow() {
    let mut rng = StdRng::seed_from_u64(patterns::random_init_seed());

    for _ in 0..100 {
        let mut runs = RunStack::new();
        let mut start = 0;
        let mut max_height = 0;

        for _ in 0..2_000 {
            let len = if rng.gen_bool(0.1) {
                rng.gen_range(1..10_000)
            } else {
                rng.gen_range(32..=64)
            };

            runs.push(Run { start, len });
            start += len;

            while let Some(r) = collapse(runs.as_slice()) {
                runs.merge_at(r);
            }
            max_height = max_height.max(runs.len());

            let lens = runs.as_slice().iter().map(|run| run.len).collect::<Vec<_>>();
            for i in 0..lens.len().saturating_sub(1) {
                assert!(lens[i] > lens[i + 1], "{lens:?}");
            }
            for i in 0..lens.len().saturating_sub(2) {
                assert!(lens[i] > lens[i + 1] + lens[i + 2], "{lens:?}");
            }
        }

        assert!(max_height <= tim::MAX_RUNS);

        while let Some(r) = force_collapse(runs.as_slice()) {
            runs.merge_at(r);
        }
        assert_eq!(runs.as_slice(), [Run { start: 0, len: start }]);
    }
}

#[test]
fn galloping_merges() {
    // Long interleaved blocks make one side win many times in a row.
    for block in [1, 7, 8, 50, 333] {
        let mut v = (0..4_000)
            .map(|i: i32| if (i / block) % 2 == 0 { i } else { -i })
            .collect::<Vec<_>>();
        let mut expected = v.clone();
        expected.sort();

        tim::sort(&mut v);
        assert_eq!(v, expected, "block {block}");
    }
}

#[test]
fn try_sort_reports_success() {
    let mut v = patterns::random(1_000);
    let mut expected = v.clone();
    expected.sort();

    assert_eq!(tim::try_sort(&mut v), Ok(()));
    assert_eq!(v, expected);

    assert_eq!(tim::try_sort_by(&mut v, |a, b| b.cmp(a)), Ok(()));
    expected.reverse();
    assert_eq!(v, expected);
}
