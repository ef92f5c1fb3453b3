use std::cell::Cell;

use ksort::shell;

#[test]
fn gaps_short_slices() {
    for len in 0..2 {
        assert_eq!(shell::gaps(len).count(), 0);
    }
    for len in 2..=4 {
        assert_eq!(shell::gaps(len).collect::<Vec<_>>(), [1]);
    }
    assert_eq!(shell::gaps(5).collect::<Vec<_>>(), [4, 1]);
    assert_eq!(shell::gaps(100).collect::<Vec<_>>(), [57, 23, 10, 4, 1]);
}

#[test]
fn gaps_extend_past_ciura() {
    assert_eq!(
        shell::gaps(10_000).collect::<Vec<_>>(),
        [8_858, 3_937, 1_750, 701, 301, 132, 57, 23, 10, 4, 1]
    );
}

#[test]
fn gaps_invariants() {
    let lens = (2..3_000).chain([1 << 20, usize::MAX / 2, usize::MAX]);
    for len in lens {
        let gaps = shell::gaps(len).collect::<Vec<_>>();

        assert_eq!(gaps.last(), Some(&1));
        assert!(gaps.iter().all(|&gap| gap < len));
        assert!(gaps.windows(2).all(|w| w[0] > w[1]), "{gaps:?}");
    }
}

#[test]
fn sorted_input_one_comparison_per_gap_step() {
    let comparisons = Cell::new(0usize);
    let len = 1_000;
    let mut v = (0..len).collect::<Vec<usize>>();

    shell::sort_by(&mut v, |a, b| {
        comparisons.set(comparisons.get() + 1);
        a.cmp(b)
    });

    let expected = shell::gaps(len).map(|gap| len - gap).sum::<usize>();
    assert_eq!(comparisons.get(), expected);
}
