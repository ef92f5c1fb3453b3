use std::cmp::Ordering;
use std::mem::size_of;

sort_impl!("ksort_shell");

/// Sorts the slice with shell sort.
///
/// This sort is unstable (i.e., may reorder equal elements) and does not allocate. It uses the
/// Ciura gap sequence, extended geometrically for long slices.
#[inline]
pub fn sort<T>(v: &mut [T])
where
    T: Ord,
{
    shell_sort(v, |a, b| a.lt(b));
}

/// Sorts the slice with shell sort, using a comparator function.
///
/// The comparator function must define a total ordering for the elements in the slice. If the
/// ordering is not total, the order of the elements is unspecified.
#[inline]
pub fn sort_by<T, F>(v: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    shell_sort(v, |a, b| compare(a, b) == Ordering::Less);
}

/// Gaps proposed by Marcin Ciura, "Best Increments for the Average Case of Shellsort" (2001).
const CIURA_GAPS: [usize; 9] = [1, 4, 10, 23, 57, 132, 301, 701, 1750];

// Enough for the geometric extension to reach `usize::MAX`.
const MAX_GAPS: usize = 2 * usize::BITS as usize;

/// Returns the gaps used to sort a slice of length `len`, largest first.
///
/// Every gap is smaller than `len` and the last one is always 1, so for `len <= 4` this is plain
/// insertion sort. Empty for `len < 2`.
pub fn gaps(len: usize) -> impl Iterator<Item = usize> {
    let mut seq = [0; MAX_GAPS];
    let mut count = 0;

    for gap in CIURA_GAPS {
        if gap >= len {
            break;
        }
        seq[count] = gap;
        count += 1;
    }

    if count == CIURA_GAPS.len() {
        let mut gap = CIURA_GAPS[CIURA_GAPS.len() - 1];
        while let Some(next) = gap.checked_mul(9).map(|g| g / 4) {
            if next >= len {
                break;
            }
            gap = next;
            seq[count] = gap;
            count += 1;
        }
    }

    seq.into_iter().take(count).rev()
}

fn shell_sort<T, F>(v: &mut [T], mut is_less: F)
where
    F: FnMut(&T, &T) -> bool,
{
    // Sorting has no meaningful behavior on zero-sized types.
    if size_of::<T>() == 0 {
        return;
    }

    let len = v.len();

    for gap in gaps(len) {
        // Gapped insertion sort, with `gap == 1` the final pass is a regular insertion sort.
        for i in gap..len {
            let mut j = i;
            while j >= gap && is_less(&v[j], &v[j - gap]) {
                v.swap(j, j - gap);
                j -= gap;
            }
        }
    }
}
