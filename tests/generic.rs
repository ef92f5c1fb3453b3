use std::cmp::Ordering;

use ksort::generic::{self, ByteSpan};
use sort_test_tools::patterns;

fn to_bytes(v: &[u64]) -> Vec<u8> {
    v.iter().flat_map(|x| x.to_ne_bytes()).collect()
}

fn from_bytes(bytes: &[u8]) -> Vec<u64> {
    bytes
        .chunks_exact(8)
        .map(|chunk| u64::from_ne_bytes(chunk.try_into().unwrap()))
        .collect()
}

fn compare_u64(a: &[u8], b: &[u8], calls: &mut usize) -> i32 {
    *calls += 1;
    let a = u64::from_ne_bytes(a.try_into().unwrap());
    let b = u64::from_ne_bytes(b.try_into().unwrap());
    match a.cmp(&b) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

#[test]
fn byte_span_primitives() {
    let mut bytes = *b"aabbccddee";
    let mut span = ByteSpan::new(&mut bytes, 2);

    assert_eq!(span.len(), 5);
    assert_eq!(span.elem_size(), 2);
    assert_eq!(span.get(3), b"dd");

    span.swap(0, 4);
    assert_eq!(&bytes, b"eebbccddaa");

    let mut span = ByteSpan::new(&mut bytes, 2);
    span.swap(2, 2);
    span.rotate_right(1, 3);
    assert_eq!(&bytes, b"eeddbbccaa");

    let mut span = ByteSpan::new(&mut bytes, 2);
    span.copy_span(0, 3, 2);
    assert_eq!(&bytes, b"ccaabbccaa");

    // Overlapping, towards the end.
    let mut span = ByteSpan::new(&mut bytes, 2);
    span.copy_span(1, 0, 3);
    assert_eq!(&bytes, b"ccccaabbaa");
}

#[test]
fn byte_span_sub() {
    let mut bytes = *b"012345";
    let mut span = ByteSpan::new(&mut bytes, 1);

    let mut sub = span.sub(2, 5);
    assert_eq!(sub.len(), 3);
    sub.swap(0, 2);
    assert_eq!(sub.get(0), b"4");

    assert!(ByteSpan::new(&mut [], 3).is_empty());
}

#[test]
#[should_panic]
fn byte_span_rejects_partial_records() {
    let mut bytes = [0u8; 7];
    ByteSpan::new(&mut bytes, 2);
}

#[test]
#[should_panic]
fn byte_span_swap_out_of_bounds() {
    let mut bytes = [0u8; 8];
    ByteSpan::new(&mut bytes, 4).swap(0, 2);
}

#[test]
fn sort_u64_records() {
    for len in [0, 1, 2, 3, 20, 21, 64, 65, 1_000, 10_000] {
        let input = patterns::random(len)
            .into_iter()
            .map(|x| x as u64)
            .collect::<Vec<_>>();
        let mut expected = input.clone();
        expected.sort();

        let mut bytes = to_bytes(&input);
        let mut calls = 0;
        generic::sort(&mut bytes, len, 8, compare_u64, &mut calls);

        assert_eq!(from_bytes(&bytes), expected);
        if len < 2 {
            assert_eq!(calls, 0);
        }
    }
}

#[test]
fn sort_many_duplicates() {
    let input = patterns::random_uniform(50_000, 0..=3)
        .into_iter()
        .map(|x| x as u64)
        .collect::<Vec<_>>();
    let mut expected = input.clone();
    expected.sort();

    let mut bytes = to_bytes(&input);
    let mut calls = 0;
    generic::sort(&mut bytes, input.len(), 8, compare_u64, &mut calls);

    assert_eq!(from_bytes(&bytes), expected);
}

#[test]
fn ordered_inputs_stay_n_log_n() {
    for len in [1_000usize, 10_000] {
        let bound = 3 * len * len.ilog2() as usize / 2;
        let inputs = [
            patterns::ascending(len),
            patterns::descending(len),
            patterns::pipe_organ(len),
        ];

        for input in inputs {
            // Flipping the sign bit keeps the order of negative values.
            let input = input
                .into_iter()
                .map(|x| (x as u32 ^ 0x8000_0000) as u64)
                .collect::<Vec<_>>();
            let mut expected = input.clone();
            expected.sort();

            let mut bytes = to_bytes(&input);
            let mut calls = 0;
            generic::sort(&mut bytes, len, 8, compare_u64, &mut calls);

            assert_eq!(from_bytes(&bytes), expected);
            assert!(calls <= bound, "{calls} comparisons for {len} elements");
        }
    }
}

#[test]
fn sort_by_odd_sized_records() {
    // 5 byte records, keyed by the first byte in descending order.
    let mut bytes = Vec::new();
    for (idx, key) in [3u8, 250, 7, 7, 0, 99].into_iter().enumerate() {
        bytes.extend_from_slice(&[key, idx as u8, 0xAA, 0xBB, 0xCC]);
    }

    generic::sort_by(&mut bytes, 6, 5, |a, b| b[0].cmp(&a[0]));

    let keys = bytes.chunks_exact(5).map(|r| r[0]).collect::<Vec<_>>();
    assert_eq!(keys, [250, 99, 7, 7, 3, 0]);
    assert!(bytes.chunks_exact(5).all(|r| r[2..] == [0xAA, 0xBB, 0xCC]));
}

#[test]
fn only_the_first_count_records_are_touched() {
    let mut bytes = [9, 8, 7, 6, 5, 4, 3, 2, 1, 0];
    generic::sort_by(&mut bytes, 4, 2, |a, b| a.cmp(b));
    assert_eq!(bytes, [3, 2, 5, 4, 7, 6, 9, 8, 1, 0]);
}

#[test]
fn degenerate_inputs_are_no_ops() {
    let mut bytes = [3u8, 2, 1];
    let mut calls = 0usize;

    generic::sort(&mut bytes, 0, 1, |_, _, calls: &mut usize| {
        *calls += 1;
        0
    }, &mut calls);
    generic::sort_by(&mut bytes, 1, 3, |_, _| Ordering::Less);
    generic::sort_by(&mut bytes, 1_000, 0, |_, _| Ordering::Less);
    generic::sort_by(&mut [], 0, 16, |_, _| Ordering::Less);

    assert_eq!(bytes, [3, 2, 1]);
    assert_eq!(calls, 0);
}

#[test]
#[should_panic]
fn count_exceeding_buffer_panics() {
    let mut bytes = [0u8; 16];
    generic::sort_by(&mut bytes, 3, 8, |a, b| a.cmp(b));
}

#[test]
#[should_panic]
fn overflowing_span_panics() {
    let mut bytes = [0u8; 16];
    generic::sort_by(&mut bytes, usize::MAX, 2, |a, b| a.cmp(b));
}

#[test]
fn context_is_threaded_through() {
    struct Ctx {
        descending: bool,
        calls: usize,
    }

    fn compare(a: &[u8], b: &[u8], ctx: &mut Ctx) -> i32 {
        ctx.calls += 1;
        let ord = a[0] as i32 - b[0] as i32;
        if ctx.descending {
            -ord
        } else {
            ord
        }
    }

    let mut bytes = (0..100u8).collect::<Vec<_>>();
    let mut ctx = Ctx {
        descending: true,
        calls: 0,
    };
    generic::sort(&mut bytes, 100, 1, compare, &mut ctx);

    assert_eq!(bytes, (0..100u8).rev().collect::<Vec<_>>());
    assert!(ctx.calls > 0);
}
