use std::cmp::Ordering;
use std::mem::size_of;
use std::ptr;

use crate::error::{alloc_scratch, SortError};
use crate::smallsort::insertion_sort_shift_left;

sort_impl!("ksort_merge");

/// Sorts the slice with top-down merge sort.
///
/// This sort is stable (i.e., does not reorder equal elements) and *O*(*n* \* log(*n*))
/// worst-case. It allocates a scratch buffer as long as `v`, except for short slices which are
/// sorted in-place with insertion sort.
///
/// # Panics
///
/// Aborts like `Vec` does if the scratch buffer can't be allocated. Use [`try_sort`] to handle
/// that case.
#[inline]
pub fn sort<T>(v: &mut [T])
where
    T: Ord,
{
    if let Err(err) = try_sort(v) {
        err.handle();
    }
}

/// Sorts the slice with top-down merge sort, using a comparator function.
///
/// The comparator function must define a total ordering for the elements in the slice. If
/// the ordering is not total, the order of the elements is unspecified.
#[inline]
pub fn sort_by<T, F>(v: &mut [T], compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    if let Err(err) = try_sort_by(v, compare) {
        err.handle();
    }
}

/// Like [`sort`], but reports a failed scratch allocation instead of aborting.
///
/// On error `v` is left untouched.
#[inline]
pub fn try_sort<T>(v: &mut [T]) -> Result<(), SortError>
where
    T: Ord,
{
    merge_sort(v, |a, b| a.lt(b))
}

/// Like [`sort_by`], but reports a failed scratch allocation instead of aborting.
///
/// On error `v` is left untouched.
#[inline]
pub fn try_sort_by<T, F>(v: &mut [T], mut compare: F) -> Result<(), SortError>
where
    F: FnMut(&T, &T) -> Ordering,
{
    merge_sort(v, |a, b| compare(a, b) == Ordering::Less)
}

// Slices of up to this length get sorted using insertion sort.
const MAX_INSERTION: usize = 20;

fn merge_sort<T, F>(v: &mut [T], mut is_less: F) -> Result<(), SortError>
where
    F: FnMut(&T, &T) -> bool,
{
    // Sorting has no meaningful behavior on zero-sized types.
    if size_of::<T>() == 0 {
        return Ok(());
    }

    let len = v.len();

    // Short arrays get sorted in-place via insertion sort to avoid allocations.
    if len <= MAX_INSERTION {
        if len >= 2 {
            insertion_sort_shift_left(v, 1, &mut is_less);
        }
        return Ok(());
    }

    // The buffer only ever holds shallow copies of elements owned by `v`, its length stays zero
    // so nothing is dropped twice if `is_less` panics. It is reused across all merge levels.
    let mut buf = alloc_scratch::<T>(len)?;

    // SAFETY: `buf` has capacity for `len` elements and is a separate allocation.
    unsafe {
        merge_sort_rec(v, buf.as_mut_ptr(), &mut is_less);
    }

    Ok(())
}

/// # Safety
///
/// `buf` must be valid for writes of `v.len()` elements and must not overlap `v`.
unsafe fn merge_sort_rec<T, F>(v: &mut [T], buf: *mut T, is_less: &mut F)
where
    F: FnMut(&T, &T) -> bool,
{
    let len = v.len();

    if len <= MAX_INSERTION {
        if len >= 2 {
            insertion_sort_shift_left(v, 1, is_less);
        }
        return;
    }

    let mid = len / 2;
    merge_sort_rec(&mut v[..mid], buf, is_less);
    merge_sort_rec(&mut v[mid..], buf, is_less);

    // The halves are already in order, nothing to merge.
    if !is_less(&v[mid], &v[mid - 1]) {
        return;
    }

    merge(v, mid, buf, is_less);
}

/// Merges non-decreasing runs `v[..mid]` and `v[mid..]` into `buf`, then copies the result back.
///
/// If `is_less` panics, `v` still owns every element exactly once, only `buf` holds partial
/// shallow copies.
///
/// # Safety
///
/// `buf` must be valid for writes of `v.len()` elements and must not overlap `v`. Both runs must
/// be non-empty.
unsafe fn merge<T, F>(v: &mut [T], mid: usize, buf: *mut T, is_less: &mut F)
where
    F: FnMut(&T, &T) -> bool,
{
    let len = v.len();
    let v_base = v.as_mut_ptr();

    merge_into(v_base, len, mid, buf, is_less);
    ptr::copy_nonoverlapping(buf, v_base, len);
}

/// # Safety
///
/// `src` must be valid for reads of `len` elements, `dest` for writes of `len` elements, and
/// `0 < mid < len`.
unsafe fn merge_into<T, F>(src: *const T, len: usize, mid: usize, dest: *mut T, is_less: &mut F)
where
    F: FnMut(&T, &T) -> bool,
{
    debug_assert!(mid > 0);
    debug_assert!(mid < len);

    let src_mid = src.add(mid);
    let src_end = src.add(len);

    // Initially, these pointers point to the beginnings of their arrays.
    let mut left = src;
    let mut right = src_mid;
    let mut out = dest;

    while left < src_mid && right < src_end {
        // If equal, prefer the left run to maintain stability.
        let take_right = is_less(&*right, &*left);
        let to_copy = if take_right { right } else { left };
        ptr::copy_nonoverlapping(to_copy, out, 1);
        out = out.add(1);
        right = right.add(take_right as usize);
        left = left.add(!take_right as usize);
    }

    if left < src_mid {
        // The left run is unconsumed.
        let rem_len = src_mid.offset_from(left) as usize;
        ptr::copy_nonoverlapping(left, out, rem_len);
    } else {
        // The right run is unconsumed.
        let rem_len = src_end.offset_from(right) as usize;
        ptr::copy_nonoverlapping(right, out, rem_len);
    }
}
