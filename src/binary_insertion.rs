use std::cmp::Ordering;
use std::mem::size_of;

sort_impl!("ksort_binary_insertion");

/// Sorts the slice with binary insertion sort.
///
/// This sort is stable, does not allocate, performs *O*(*n* \* log(*n*)) comparisons and
/// *O*(*n*^2) element moves in the worst case.
#[inline]
pub fn sort<T>(v: &mut [T])
where
    T: Ord,
{
    binary_insertion_sort(v, |a, b| a.lt(b));
}

/// Sorts the slice with binary insertion sort, using a comparator function.
///
/// The comparator function must define a total ordering for the elements in the slice. If the
/// ordering is not total, the order of the elements is unspecified.
#[inline]
pub fn sort_by<T, F>(v: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    binary_insertion_sort(v, |a, b| compare(a, b) == Ordering::Less);
}

fn binary_insertion_sort<T, F>(v: &mut [T], mut is_less: F)
where
    F: FnMut(&T, &T) -> bool,
{
    // Sorting has no meaningful behavior on zero-sized types.
    if size_of::<T>() == 0 || v.len() < 2 {
        return;
    }

    insertion_sort_from(v, 1, &mut is_less);
}

/// Inserts every element of `v[offset..]` into the sorted prefix `v[..offset]`.
///
/// The insertion point of each element is found by binary search over the prefix and is the first
/// position holding a strictly greater element, so equal elements keep their input order.
pub(crate) fn insertion_sort_from<T, F>(v: &mut [T], offset: usize, is_less: &mut F)
where
    F: FnMut(&T, &T) -> bool,
{
    debug_assert!(offset <= v.len());

    for i in offset.max(1)..v.len() {
        let key = &v[i];
        let pos = v[..i].partition_point(|elem| !is_less(key, elem));

        // Open the slot at `pos` by shifting `v[pos..i]` one to the right.
        v[pos..=i].rotate_right(1);
    }
}
