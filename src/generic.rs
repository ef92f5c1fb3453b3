//! Comparator driven sort over records whose size is only known at runtime.
//!
//! The records live back to back in a byte buffer. Nothing is known about their type, so every
//! move is a byte-wise swap or rotation through [`ByteSpan`], and every comparison goes through
//! a single dynamically dispatched comparator. The strategy is the same introsort as
//! [`crate::quick`], so both produce the same order for equivalent comparators.

use std::cmp::Ordering;

/// Compares two records, `Less` means the first one sorts before the second one.
type Compare<'c> = dyn FnMut(&[u8], &[u8]) -> Ordering + 'c;

/// Strict weak ordering derived from [`Compare`].
type IsLess<'c> = dyn FnMut(&[u8], &[u8]) -> bool + 'c;

/// Sorts `count` records of `elem_size` bytes each, stored at the start of `base`.
///
/// `compare` receives two records and `ctx`, and returns a negative value, zero or a positive value
/// if the first record is respectively less than, equal to or greater than the second. It must
/// define a total order, otherwise the resulting order is unspecified (but `base` still holds the
/// same records).
///
/// This sort is unstable and does not allocate. `count < 2` and `elem_size == 0` are no-ops.
///
/// # Panics
///
/// Panics if `count * elem_size` overflows or exceeds `base.len()`.
///
/// # Examples
///
/// ```
/// fn by_key(a: &[u8], b: &[u8], calls: &mut usize) -> i32 {
///     *calls += 1;
///     a[0] as i32 - b[0] as i32
/// }
///
/// let mut records = *b"c1a2b3";
/// let mut calls = 0;
/// ksort::generic::sort(&mut records, 3, 2, by_key, &mut calls);
/// assert_eq!(&records, b"a2b3c1");
/// ```
pub fn sort<C>(
    base: &mut [u8],
    count: usize,
    elem_size: usize,
    compare: fn(&[u8], &[u8], &mut C) -> i32,
    ctx: &mut C,
) where
    C: ?Sized,
{
    sort_by(base, count, elem_size, |a, b| compare(a, b, ctx).cmp(&0));
}

/// Like [`sort`], but takes the comparator as a closure returning an [`Ordering`]. Captured state
/// takes the place of the context argument.
///
/// # Panics
///
/// Panics if `count * elem_size` overflows or exceeds `base.len()`.
pub fn sort_by<F>(base: &mut [u8], count: usize, elem_size: usize, mut compare: F)
where
    F: FnMut(&[u8], &[u8]) -> Ordering,
{
    let bytes = match count.checked_mul(elem_size) {
        Some(span_len) if span_len <= base.len() => &mut base[..span_len],
        _ => panic!(
            "{count} records of {elem_size} bytes do not fit into a buffer of {} bytes",
            base.len()
        ),
    };

    if elem_size == 0 || count < 2 {
        return;
    }

    introsort(ByteSpan::new(bytes, elem_size), &mut compare);
}

/// Mutable view of a byte buffer as a sequence of equally sized records.
///
/// All element granular moves of the generic sort go through this type, indices are in elements
/// and every access is bounds checked.
#[derive(Debug)]
pub struct ByteSpan<'a> {
    bytes: &'a mut [u8],
    size: usize,
}

impl<'a> ByteSpan<'a> {
    /// # Panics
    ///
    /// Panics if `size` is zero or `bytes.len()` is not a multiple of it.
    pub fn new(bytes: &'a mut [u8], size: usize) -> Self {
        assert!(size != 0, "record size must not be zero");
        assert!(
            bytes.len() % size == 0,
            "buffer length {} is not a multiple of the record size {size}",
            bytes.len()
        );

        ByteSpan { bytes, size }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.bytes.len() / self.size
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn elem_size(&self) -> usize {
        self.size
    }

    /// Bytes of record `i`.
    pub fn get(&self, i: usize) -> &[u8] {
        &self.bytes[i * self.size..(i + 1) * self.size]
    }

    /// Swaps records `i` and `j`.
    pub fn swap(&mut self, i: usize, j: usize) {
        if i == j {
            // Still bounds check, like `<[T]>::swap`.
            let _ = self.get(i);
            return;
        }

        let (lo, hi) = (i.min(j), i.max(j));
        let (head, tail) = self.bytes.split_at_mut(hi * self.size);
        head[lo * self.size..(lo + 1) * self.size].swap_with_slice(&mut tail[..self.size]);
    }

    /// Copies `count` records starting at `src` over the records starting at `dst`. The ranges
    /// may overlap.
    ///
    /// Not used by the sort itself, which only ever swaps and rotates. Offered for callers that
    /// build their own record operations on top of a span.
    pub fn copy_span(&mut self, dst: usize, src: usize, count: usize) {
        self.bytes.copy_within(
            src * self.size..(src + count) * self.size,
            dst * self.size,
        );
    }

    /// Moves record `to` to position `from`, shifting records `from..to` one position to the right.
    pub fn rotate_right(&mut self, from: usize, to: usize) {
        self.bytes[from * self.size..(to + 1) * self.size].rotate_right(self.size);
    }

    /// Reborrows records `start..end` as their own span.
    pub fn sub(&mut self, start: usize, end: usize) -> ByteSpan<'_> {
        ByteSpan {
            bytes: &mut self.bytes[start * self.size..end * self.size],
            size: self.size,
        }
    }
}

// Sub-spans of up to this length get sorted using insertion sort.
const MAX_INSERTION: usize = 20;

// Recursively select a pseudomedian if above this threshold.
const PSEUDO_MEDIAN_REC_THRESHOLD: usize = 64;

// Only the larger side of a partition is deferred, so every entry is at most half the size of the
// one below it.
const STACK_CAP: usize = usize::BITS as usize;

#[derive(Clone, Copy, Debug, Default)]
struct Task {
    start: usize,
    end: usize,
    limit: u32,
}

impl Task {
    fn len(&self) -> usize {
        self.end - self.start
    }
}

/// Budget left to the sub-slices of a partition of `task` whose smaller side has `smaller_len`
/// elements. Only splits leaving less than an eighth on one side use up budget.
fn split_limit(task: Task, smaller_len: usize) -> u32 {
    if smaller_len < task.len() / 8 {
        task.limit - 1
    } else {
        task.limit
    }
}

fn introsort(mut span: ByteSpan<'_>, compare: &mut Compare<'_>) {
    let mut is_less = |a: &[u8], b: &[u8]| compare(a, b) == Ordering::Less;
    let is_less: &mut IsLess<'_> = &mut is_less;

    // Allow `2 * floor(log2(len))` imbalanced partitions, see `split_limit`.
    let limit = 2 * (span.len() | 1).ilog2();

    let mut stack = [Task::default(); STACK_CAP];
    let mut stack_len = 0;

    let mut task = Task {
        start: 0,
        end: span.len(),
        limit,
    };

    loop {
        let next = if task.len() <= MAX_INSERTION {
            insertion_sort(&mut span.sub(task.start, task.end), is_less);
            None
        } else if task.limit == 0 {
            heapsort(&mut span.sub(task.start, task.end), is_less);
            None
        } else {
            let pivot_pos = choose_pivot(&span.sub(task.start, task.end), is_less);

            // The record before a pending sub-span is an earlier pivot that is not greater than
            // anything in it. If the new pivot equals it, the pivot is the minimum and everything
            // equal to it can be split off at once.
            let equals_ancestor = task.start > 0
                && !is_less(span.get(task.start - 1), span.get(task.start + pivot_pos));

            let mut w = span.sub(task.start, task.end);

            if equals_ancestor {
                let num_le = partition(&mut w, pivot_pos, &mut |a, b| !is_less(b, a));

                Some(Task {
                    start: task.start + num_le + 1,
                    end: task.end,
                    limit: split_limit(task, (num_le + 1).min(task.len() - num_le - 1)),
                })
            } else {
                let num_lt = partition(&mut w, pivot_pos, is_less);
                let limit = split_limit(task, num_lt.min(task.len() - num_lt - 1));

                let left = Task {
                    start: task.start,
                    end: task.start + num_lt,
                    limit,
                };
                let right = Task {
                    start: task.start + num_lt + 1,
                    end: task.end,
                    limit,
                };

                let (smaller, larger) = if left.len() <= right.len() {
                    (left, right)
                } else {
                    (right, left)
                };

                if larger.len() >= 2 {
                    stack[stack_len] = larger;
                    stack_len += 1;
                }
                Some(smaller)
            }
        };

        task = match next {
            Some(next) if next.len() >= 2 => next,
            _ => {
                if stack_len == 0 {
                    return;
                }
                stack_len -= 1;
                stack[stack_len]
            }
        };
    }
}

fn insertion_sort(span: &mut ByteSpan<'_>, is_less: &mut IsLess<'_>) {
    for i in 1..span.len() {
        let mut pos = i;
        while pos > 0 && is_less(span.get(i), span.get(pos - 1)) {
            pos -= 1;
        }

        if pos != i {
            span.rotate_right(pos, i);
        }
    }
}

fn heapsort(span: &mut ByteSpan<'_>, is_less: &mut IsLess<'_>) {
    let len = span.len();

    for node in (0..len / 2).rev() {
        sift_down(span, node, len, is_less);
    }

    for end in (1..len).rev() {
        span.swap(0, end);
        sift_down(span, 0, end, is_less);
    }
}

// Max-heap over records `..len`, `parent >= child`.
fn sift_down(span: &mut ByteSpan<'_>, mut node: usize, len: usize, is_less: &mut IsLess<'_>) {
    loop {
        let mut child = 2 * node + 1;
        if child >= len {
            break;
        }

        if child + 1 < len && is_less(span.get(child), span.get(child + 1)) {
            child += 1;
        }

        if !is_less(span.get(node), span.get(child)) {
            break;
        }

        span.swap(node, child);
        node = child;
    }
}

fn choose_pivot(span: &ByteSpan<'_>, is_less: &mut IsLess<'_>) -> usize {
    let len = span.len();
    debug_assert!(len >= 8);

    if len < PSEUDO_MEDIAN_REC_THRESHOLD {
        let n8 = len / 8;
        median3(span, 0, n8 * 4, n8 * 7, is_less)
    } else {
        let a = 0;
        let b = len / 2;
        let c = len - 1;

        let n8 = len / 8;

        let m1 = median3(span, a, a + n8, a + n8 * 2, is_less);
        let m2 = median3(span, b - n8, b, b + n8, is_less);
        let m3 = median3(span, c - n8 * 2, c - n8, c, is_less);

        median3(span, m1, m2, m3, is_less)
    }
}

fn median3(span: &ByteSpan<'_>, a: usize, b: usize, c: usize, is_less: &mut IsLess<'_>) -> usize {
    let candidates = [a, b, c];

    let x = is_less(span.get(b), span.get(a));
    let y = is_less(span.get(c), span.get(a));
    let z = is_less(span.get(c), span.get(b));

    candidates[(x == y) as usize + (y != z) as usize]
}

/// Moves the pivot to its final position, with every record less than it in front of it.
/// Returns that position.
fn partition(span: &mut ByteSpan<'_>, pivot_pos: usize, is_less: &mut IsLess<'_>) -> usize {
    // The pivot stays at the front while the rest is partitioned.
    span.swap(0, pivot_pos);

    // `1..left` is less than the pivot and `right..` is not.
    let mut left = 1;
    let mut right = span.len();

    loop {
        while left < right && is_less(span.get(left), span.get(0)) {
            left += 1;
        }

        while left < right && !is_less(span.get(right - 1), span.get(0)) {
            right -= 1;
        }

        if left >= right {
            break;
        }

        right -= 1;
        span.swap(left, right);
        left += 1;
    }

    let num_lt = left - 1;
    span.swap(0, num_lt);

    num_lt
}
