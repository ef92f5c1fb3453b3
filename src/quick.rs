use std::cmp::Ordering;
use std::mem::size_of;

use crate::heap;
use crate::smallsort::insertion_sort_shift_left;

sort_impl!("ksort_quick");

/// Sorts the slice with quick sort.
///
/// This sort is unstable (i.e., may reorder equal elements), in-place (i.e., does not allocate),
/// and *O*(*n* \* log(*n*)) worst-case.
///
/// # Current implementation
///
/// Introsort: Hoare partitioning around a median of 3 (pseudo-median of 9 for longer slices),
/// insertion sort for short sub-slices and heap sort once too many imbalanced partitions were
/// produced. Runs of elements equal to an earlier pivot are split off in linear time, so slices
/// with many duplicates do not degrade.
#[inline]
pub fn sort<T>(v: &mut [T])
where
    T: Ord,
{
    quick_sort(v, |a, b| a.lt(b));
}

/// Sorts the slice with quick sort, using a comparator function.
///
/// The comparator function must define a total ordering for the elements in the slice. If
/// the ordering is not total, the order of the elements is unspecified. An order is a
/// total order if it is (for all `a`, `b` and `c`):
///
/// * total and antisymmetric: exactly one of `a < b`, `a == b` or `a > b` is true, and
/// * transitive, `a < b` and `b < c` implies `a < c`. The same must hold for both `==` and `>`.
#[inline]
pub fn sort_by<T, F>(v: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    quick_sort(v, |a, b| compare(a, b) == Ordering::Less);
}

// Slices of up to this length get sorted using insertion sort.
const MAX_INSERTION: usize = 20;

// Recursively select a pseudomedian if above this threshold.
const PSEUDO_MEDIAN_REC_THRESHOLD: usize = 64;

// Deferred sub-slices. Only the larger side of a partition is deferred, so every entry is at most
// half the size of the one below it.
const STACK_CAP: usize = usize::BITS as usize;

fn quick_sort<T, F>(v: &mut [T], mut is_less: F)
where
    F: FnMut(&T, &T) -> bool,
{
    // Sorting has no meaningful behavior on zero-sized types.
    if size_of::<T>() == 0 {
        return;
    }

    let len = v.len();
    if len < 2 {
        return;
    }

    // Allow `2 * floor(log2(len))` imbalanced partitions, see `split_limit`.
    // The binary OR by one is used to eliminate the zero-check in the logarithm.
    let limit = 2 * (len | 1).ilog2();

    quicksort(v, limit, &mut is_less);
}

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

/// Sorts `v` iteratively.
///
/// Every pending sub-slice `v[start..end]` with `start > 0` is preceded by a pivot that is already
/// in its final position and not greater than any element of the sub-slice.
///
/// `limit` is the number of allowed imbalanced partitions before switching to heap sort. If zero,
/// this function will immediately switch to heap sort.
fn quicksort<T, F>(v: &mut [T], limit: u32, is_less: &mut F)
where
    F: FnMut(&T, &T) -> bool,
{
    let mut stack = [Task::default(); STACK_CAP];
    let mut stack_len = 0;

    let mut task = Task {
        start: 0,
        end: v.len(),
        limit,
    };

    loop {
        let (head, tail) = v.split_at_mut(task.start);
        let ancestor_pivot = head.last();
        let w = &mut tail[..task.len()];

        let next = if w.len() <= MAX_INSERTION {
            if w.len() >= 2 {
                insertion_sort_shift_left(w, 1, is_less);
            }
            None
        } else if task.limit == 0 {
            // If too many bad pivot choices were made, simply fall back to heap sort in order to
            // guarantee `O(N x log(N))` worst-case.
            heap::heapsort(w, is_less);
            None
        } else {
            let pivot_pos = choose_pivot(w, is_less);

            match ancestor_pivot {
                // If the chosen pivot is equal to the predecessor, then it's the smallest element
                // in the slice. Partition the slice into elements equal to and elements greater
                // than the pivot. This case is usually hit when the slice contains many duplicate
                // elements.
                Some(ancestor) if !is_less(ancestor, &w[pivot_pos]) => {
                    let num_le = partition(w, pivot_pos, &mut |a, b| !is_less(b, a));

                    // `num_le` is the position of the pivot, everything before it is equal to it.
                    Some(Task {
                        start: task.start + num_le + 1,
                        end: task.end,
                        limit: split_limit(task, (num_le + 1).min(task.len() - num_le - 1)),
                    })
                }
                _ => {
                    let num_lt = partition(w, pivot_pos, is_less);
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

/// Selects a pivot from `v`. Uses median of 3, or compact pseudomedian of 9 for longer slices.
fn choose_pivot<T, F>(v: &[T], is_less: &mut F) -> usize
where
    F: FnMut(&T, &T) -> bool,
{
    let len = v.len();
    debug_assert!(len >= 8);

    if len < PSEUDO_MEDIAN_REC_THRESHOLD {
        // The last element is not sampled: right after a partition it is often the maximum.
        let n8 = len / 8;
        median3(v, 0, n8 * 4, n8 * 7, is_less)
    } else {
        let a = 0; // start
        let b = len / 2; // mid
        let c = len - 1; // end

        let n8 = len / 8;

        let m1 = median3(v, a, a + n8, a + n8 * 2, is_less);
        let m2 = median3(v, b - n8, b, b + n8, is_less);
        let m3 = median3(v, c - n8 * 2, c - n8, c, is_less);

        median3(v, m1, m2, m3, is_less)
    }
}

/// Returns the index of the median of `v[a]`, `v[b]` and `v[c]`.
fn median3<T, F>(v: &[T], a: usize, b: usize, c: usize, is_less: &mut F) -> usize
where
    F: FnMut(&T, &T) -> bool,
{
    let candidates = [a, b, c];

    let x = is_less(&v[b], &v[a]);
    let y = is_less(&v[c], &v[a]);
    let z = is_less(&v[c], &v[b]);

    candidates[(x == y) as usize + (y != z) as usize]
}

/// Takes the input slice `v` and re-arranges elements such that when the call returns normally
/// all elements that compare true for `is_less(elem, pivot)` where `pivot == v[pivot_pos]` are
/// on the left side of `v` followed by the pivot, followed by the other elements, notionally
/// considered greater or equal to `pivot`.
///
/// Returns the number of elements that are compared true for `is_less(elem, pivot)`, which is also
/// the final position of the pivot.
fn partition<T, F>(v: &mut [T], pivot_pos: usize, is_less: &mut F) -> usize
where
    F: FnMut(&T, &T) -> bool,
{
    if v.is_empty() {
        return 0;
    }

    // Place the pivot at the beginning of slice.
    v.swap(0, pivot_pos);
    let (pivot, v_without_pivot) = v.split_at_mut(1);
    let num_lt = partition_hoare(v_without_pivot, &pivot[0], is_less);

    // Place the pivot between the two partitions.
    v.swap(0, num_lt);

    num_lt
}

fn partition_hoare<T, F>(v: &mut [T], pivot: &T, is_less: &mut F) -> usize
where
    F: FnMut(&T, &T) -> bool,
{
    // `v[..left]` is less than the pivot and `v[right..]` is not.
    let mut left = 0;
    let mut right = v.len();

    loop {
        // Find the first element greater than or equal to the pivot.
        while left < right && is_less(&v[left], pivot) {
            left += 1;
        }

        // Find the last element less than the pivot.
        while left < right && !is_less(&v[right - 1], pivot) {
            right -= 1;
        }

        if left >= right {
            break;
        }

        right -= 1;
        v.swap(left, right);
        left += 1;
    }

    left
}
