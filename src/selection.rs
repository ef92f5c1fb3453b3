use std::cmp::Ordering;
use std::mem::size_of;

sort_impl!("ksort_selection");

/// Sorts the slice with selection sort.
///
/// This sort is unstable (i.e., may reorder equal elements) and does not allocate. It always
/// performs *O*(*n*^2) comparisons and at most `n - 1` swaps, already sorted input included.
#[inline]
pub fn sort<T>(v: &mut [T])
where
    T: Ord,
{
    selection_sort(v, |a, b| a.lt(b));
}

/// Sorts the slice with selection sort, using a comparator function.
///
/// The comparator function must define a total ordering for the elements in the slice. If the
/// ordering is not total, the order of the elements is unspecified.
#[inline]
pub fn sort_by<T, F>(v: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    selection_sort(v, |a, b| compare(a, b) == Ordering::Less);
}

fn selection_sort<T, F>(v: &mut [T], mut is_less: F)
where
    F: FnMut(&T, &T) -> bool,
{
    // Sorting has no meaningful behavior on zero-sized types.
    if size_of::<T>() == 0 {
        return;
    }

    let len = v.len();

    for i in 0..len.saturating_sub(1) {
        // First occurrence of the minimum of `v[i..]`.
        let mut min = i;
        for j in (i + 1)..len {
            if is_less(&v[j], &v[min]) {
                min = j;
            }
        }

        v.swap(i, min);
    }
}
