use std::cmp::Ordering;
use std::mem::size_of;
use std::ptr;
use std::slice;

use crate::binary_insertion::insertion_sort_from;
use crate::error::{grow_scratch, SortError};

sort_impl!("ksort_tim");

/// Sorts the slice with tim sort.
///
/// This sort is stable (i.e., does not reorder equal elements) and *O*(*n* \* log(*n*))
/// worst-case. It is adaptive: inputs made of a few ascending or strictly descending runs are
/// sorted in close to linear time.
///
/// # Current implementation
///
/// Natural runs are detected left to right, descending runs are reversed, and runs shorter than
/// [`min_run_length`] are extended with binary insertion sort. Runs are kept on a [`RunStack`]
/// and merged according to [`collapse`], merges gallop once one side keeps winning. Each merge
/// needs scratch space for the shorter of its two runs, after elements already in place were
/// skipped. The buffer grows on demand, so presorted input does not allocate at all.
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

/// Sorts the slice with tim sort, using a comparator function.
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
/// The scratch buffer is grown between merges, so on error `v` holds the same elements as before,
/// in unspecified order.
#[inline]
pub fn try_sort<T>(v: &mut [T]) -> Result<(), SortError>
where
    T: Ord,
{
    tim_sort(v, |a, b| a.lt(b))
}

/// Like [`sort_by`], but reports a failed scratch allocation instead of aborting.
///
/// The scratch buffer is grown between merges, so on error `v` holds the same elements as before,
/// in unspecified order.
#[inline]
pub fn try_sort_by<T, F>(v: &mut [T], mut compare: F) -> Result<(), SortError>
where
    F: FnMut(&T, &T) -> Ordering,
{
    tim_sort(v, |a, b| compare(a, b) == Ordering::Less)
}

/// Slices shorter than this form a single run and are never merged.
pub const MIN_MERGE: usize = 64;

/// The number of times any one run can win in a row before we try galloping.
const MIN_GALLOP: usize = 7;

/// Capacity of [`RunStack`]. The merge invariants make run lengths grow at least as fast as the
/// Fibonacci numbers, so this covers every slice length addressable with 64 bit pointers.
pub const MAX_RUNS: usize = 85;

fn tim_sort<T, F>(v: &mut [T], mut is_less: F) -> Result<(), SortError>
where
    F: FnMut(&T, &T) -> bool,
{
    // Sorting has no meaningful behavior on zero-sized types.
    if size_of::<T>() == 0 {
        return Ok(());
    }

    let len = v.len();
    if len < 2 {
        return Ok(());
    }

    let min_run = min_run_length(len);

    // Holds the shorter run of a merge. Only ever holds shallow copies, its length stays zero.
    let mut buf = Vec::new();

    let mut runs = RunStack::new();
    let mut start = 0;

    while start < len {
        let tail = &mut v[start..];

        // Find the next natural run, and extend it if it's too short. Binary insertion sort is
        // faster than merging on short sequences.
        let mut run_len = find_run(tail, &mut is_less);
        let forced_len = min_run.min(tail.len());
        if run_len < forced_len {
            insertion_sort_from(&mut tail[..forced_len], run_len, &mut is_less);
            run_len = forced_len;
        }

        runs.push(Run {
            start,
            len: run_len,
        });
        start += run_len;

        // Merge some pairs of adjacent runs to satisfy the invariants.
        while let Some(r) = collapse(runs.as_slice()) {
            merge_at(v, &mut runs, r, &mut buf, &mut is_less)?;
        }
    }

    while let Some(r) = force_collapse(runs.as_slice()) {
        merge_at(v, &mut runs, r, &mut buf, &mut is_less)?;
    }

    // Finally, exactly one run must remain in the stack.
    debug_assert!(runs.len() == 1 && runs.as_slice()[0] == Run { start: 0, len });

    Ok(())
}

/// Computes the length short runs get extended to.
///
/// Returns `n` itself for `n < MIN_MERGE`. Otherwise the result lies in `MIN_MERGE / 2..=MIN_MERGE`
/// and is chosen so that `n / min_run` is a power of two or slightly less than one, which keeps
/// the final merges balanced.
pub fn min_run_length(mut n: usize) -> usize {
    // Becomes 1 if any bit shifted out is set.
    let mut r = 0;
    while n >= MIN_MERGE {
        r |= n & 1;
        n >>= 1;
    }
    n + r
}

/// Finds the natural run at the start of `v` and returns its length.
///
/// A run is either non-descending or strictly descending, the latter is reversed in place so every
/// returned run is ascending. Reversing only strictly descending runs keeps the sort stable.
pub fn find_run<T, F>(v: &mut [T], is_less: &mut F) -> usize
where
    F: FnMut(&T, &T) -> bool,
{
    let len = v.len();
    if len < 2 {
        return len;
    }

    let mut end = 2;
    if is_less(&v[1], &v[0]) {
        while end < len && is_less(&v[end], &v[end - 1]) {
            end += 1;
        }
        v[..end].reverse();
    } else {
        while end < len && !is_less(&v[end], &v[end - 1]) {
            end += 1;
        }
    }

    end
}

/// A sorted region `v[start..start + len]` waiting to be merged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Run {
    pub start: usize,
    pub len: usize,
}

/// Bounded stack of pending runs, the bottom run is the leftmost one.
#[derive(Clone, Debug)]
pub struct RunStack {
    runs: [Run; MAX_RUNS],
    len: usize,
}

impl RunStack {
    pub fn new() -> Self {
        RunStack {
            runs: [Run::default(); MAX_RUNS],
            len: 0,
        }
    }

    /// Pushes `run`, which must start where the current top run ends.
    ///
    /// # Panics
    ///
    /// Panics if the stack is full, which can only happen if the merge invariants were not
    /// restored after earlier pushes.
    pub fn push(&mut self, run: Run) {
        assert!(self.len < MAX_RUNS, "run stack overflow");
        debug_assert!(self
            .as_slice()
            .last()
            .map_or(true, |top| top.start + top.len == run.start));

        self.runs[self.len] = run;
        self.len += 1;
    }

    /// Replaces the runs at `idx` and `idx + 1` with a single run spanning both.
    pub fn merge_at(&mut self, idx: usize) -> Run {
        assert!(idx + 1 < self.len);

        let merged = Run {
            start: self.runs[idx].start,
            len: self.runs[idx].len + self.runs[idx + 1].len,
        };
        self.runs[idx] = merged;
        self.runs.copy_within(idx + 2..self.len, idx + 1);
        self.len -= 1;

        merged
    }

    pub fn as_slice(&self) -> &[Run] {
        &self.runs[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for RunStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Examines the stack of runs and identifies the next pair of runs to merge. More specifically,
/// if `Some(r)` is returned, that means `runs[r]` and `runs[r + 1]` must be merged next. If the
/// algorithm should continue building a new run instead, `None` is returned.
///
/// Once no merge is requested these invariants hold for every `i`:
///
/// 1. `runs[i].len > runs[i + 1].len`
/// 2. `runs[i].len > runs[i + 1].len + runs[i + 2].len`
///
/// Enforcing them on just the top three runs is not sufficient to keep them for the whole stack,
/// see <http://envisage-project.eu/timsort-specification-and-verification/>. This checks the top
/// four.
pub fn collapse(runs: &[Run]) -> Option<usize> {
    let n = runs.len();
    if n < 2 {
        return None;
    }

    if (n >= 3 && runs[n - 3].len <= runs[n - 2].len + runs[n - 1].len)
        || (n >= 4 && runs[n - 4].len <= runs[n - 3].len + runs[n - 2].len)
    {
        if runs[n - 3].len < runs[n - 1].len {
            Some(n - 3)
        } else {
            Some(n - 2)
        }
    } else if runs[n - 2].len <= runs[n - 1].len {
        Some(n - 2)
    } else {
        None
    }
}

/// Like [`collapse`], but always requests a merge while more than one run is left.
pub fn force_collapse(runs: &[Run]) -> Option<usize> {
    let n = runs.len();
    if n < 2 {
        return None;
    }

    if n >= 3 && runs[n - 3].len < runs[n - 1].len {
        Some(n - 3)
    } else {
        Some(n - 2)
    }
}

fn merge_at<T, F>(
    v: &mut [T],
    runs: &mut RunStack,
    idx: usize,
    buf: &mut Vec<T>,
    is_less: &mut F,
) -> Result<(), SortError>
where
    F: FnMut(&T, &T) -> bool,
{
    let left = runs.as_slice()[idx];
    let right = runs.as_slice()[idx + 1];

    merge(&mut v[left.start..right.start + right.len], left.len, buf, is_less)?;
    runs.merge_at(idx);

    Ok(())
}

/// Merges the adjacent non-decreasing runs `v[..mid]` and `v[mid..]`.
///
/// Elements that are already in their final position at either end are skipped by galloping, then
/// the shorter remaining run is moved into `buf` and merged back. `buf` is grown to the length of
/// that run first, if that fails `v` is left as it was. Both runs must be non-empty.
fn merge<T, F>(
    v: &mut [T],
    mid: usize,
    buf: &mut Vec<T>,
    is_less: &mut F,
) -> Result<(), SortError>
where
    F: FnMut(&T, &T) -> bool,
{
    debug_assert!(mid > 0 && mid < v.len());

    // Elements of the left run not greater than the first element of the right run stay in place.
    let start = gallop_right(&v[mid], &v[..mid], false, is_less);
    if start == mid {
        return Ok(());
    }

    // Elements of the right run not less than the last element of the left run stay in place.
    let end = mid + gallop_left(&v[mid - 1], &v[mid..], true, is_less);

    let v = &mut v[start..end];
    let mid = mid - start;
    let shorter = mid.min(v.len() - mid);

    grow_scratch(buf, shorter)?;
    let buf = buf.as_mut_ptr();

    // SAFETY: `buf` has room for the shorter run and is a separate allocation.
    unsafe {
        if mid <= v.len() - mid {
            merge_lo(v, mid, buf, is_less);
        } else {
            merge_hi(v, mid, buf, is_less);
        }
    }

    Ok(())
}

/// Returns the number of elements of the sorted `run` that are less than `key`, i.e. the leftmost
/// position `key` could be inserted at.
fn gallop_left<T, F>(key: &T, run: &[T], from_end: bool, is_less: &mut F) -> usize
where
    F: FnMut(&T, &T) -> bool,
{
    gallop(run, from_end, |elem| is_less(elem, key))
}

/// Returns the number of elements of the sorted `run` that are not greater than `key`, i.e. the
/// rightmost position `key` could be inserted at.
fn gallop_right<T, F>(key: &T, run: &[T], from_end: bool, is_less: &mut F) -> usize
where
    F: FnMut(&T, &T) -> bool,
{
    gallop(run, from_end, |elem| !is_less(key, elem))
}

/// Returns the length of the prefix of `run` for which `pred` holds.
///
/// Probes at exponentially growing distances from the start of `run` (or its end when
/// `from_end`), then binary searches the bracket found. Costs *O*(log *k*) comparisons where *k*
/// is the distance between the probe origin and the answer.
fn gallop<T>(run: &[T], from_end: bool, mut pred: impl FnMut(&T) -> bool) -> usize {
    let len = run.len();
    if len == 0 {
        return 0;
    }

    // `pred` holds for `run[..lo]` and does not hold for `run[hi..]`.
    let (lo, hi) = if from_end {
        if pred(&run[len - 1]) {
            return len;
        }

        let mut lo = 0;
        let mut hi = len - 1;
        let mut dist = 1;
        while dist < len {
            let probe = len - 1 - dist;
            if pred(&run[probe]) {
                lo = probe + 1;
                break;
            }
            hi = probe;
            dist = dist.saturating_mul(2).saturating_add(1);
        }
        (lo, hi)
    } else {
        if !pred(&run[0]) {
            return 0;
        }

        let mut lo = 1;
        let mut hi = len;
        let mut probe = 1;
        while probe < len {
            if !pred(&run[probe]) {
                hi = probe;
                break;
            }
            lo = probe + 1;
            probe = probe.saturating_mul(2).saturating_add(1);
        }
        (lo, hi)
    };

    lo + run[lo..hi].partition_point(|elem| pred(elem))
}

/// Merges `v[..mid]` and `v[mid..]` front to back, `v[..mid]` is the shorter run and is moved into
/// `buf` first.
///
/// # Safety
///
/// `buf` must be valid for writes of `mid` elements and must not overlap `v`.
unsafe fn merge_lo<T, F>(v: &mut [T], mid: usize, buf: *mut T, is_less: &mut F)
where
    F: FnMut(&T, &T) -> bool,
{
    let len = v.len();
    let v_base = v.as_mut_ptr();

    ptr::copy_nonoverlapping(v_base, buf, mid);

    let mut state = MergeLo {
        dest: v_base,
        left: buf,
        left_end: buf.add(mid),
        right: v_base.add(mid),
        right_end: v_base.add(len),
    };
    state.merge(is_less);
    // `state` gets dropped and moves what is left of the left run into place.
}

/// State of a front to back merge. The left run lives in the scratch buffer, the right run in
/// place. The gap `dest..right` is always exactly as long as `left..left_end`.
struct MergeLo<T> {
    dest: *mut T,
    left: *mut T,
    left_end: *mut T,
    right: *mut T,
    right_end: *mut T,
}

impl<T> MergeLo<T> {
    unsafe fn merge<F>(&mut self, is_less: &mut F)
    where
        F: FnMut(&T, &T) -> bool,
    {
        let mut left_wins = 0;
        let mut right_wins = 0;

        while self.left < self.left_end && self.right < self.right_end {
            if left_wins.max(right_wins) < MIN_GALLOP {
                // One-at-a-time mode. If equal, prefer the left run to maintain stability.
                if is_less(&*self.right, &*self.left) {
                    ptr::copy_nonoverlapping(self.right, self.dest, 1);
                    self.right = self.right.add(1);
                    right_wins += 1;
                    left_wins = 0;
                } else {
                    ptr::copy_nonoverlapping(self.left, self.dest, 1);
                    self.left = self.left.add(1);
                    left_wins += 1;
                    right_wins = 0;
                }
                self.dest = self.dest.add(1);
            } else {
                // Galloping mode.
                let left_run = slice::from_raw_parts(self.left, self.left_len());
                left_wins = gallop_right(&*self.right, left_run, false, is_less);
                ptr::copy_nonoverlapping(self.left, self.dest, left_wins);
                self.left = self.left.add(left_wins);
                self.dest = self.dest.add(left_wins);

                if self.left == self.left_end {
                    break;
                }

                let right_len = self.right_end.offset_from(self.right) as usize;
                let right_run = slice::from_raw_parts(self.right, right_len);
                right_wins = gallop_left(&*self.left, right_run, false, is_less);
                ptr::copy(self.right, self.dest, right_wins);
                self.right = self.right.add(right_wins);
                self.dest = self.dest.add(right_wins);
            }
        }
    }

    fn left_len(&self) -> usize {
        // SAFETY: Both point into the scratch buffer and `left <= left_end`.
        unsafe { self.left_end.offset_from(self.left) as usize }
    }
}

impl<T> Drop for MergeLo<T> {
    /// Moves the unmerged part of the left run into the gap. If the comparator panicked the result
    /// is not sorted, but still contains every element exactly once.
    fn drop(&mut self) {
        // SAFETY: The gap at `dest` is exactly `left_len()` elements long.
        unsafe {
            ptr::copy_nonoverlapping(self.left, self.dest, self.left_len());
        }
    }
}

/// Merges `v[..mid]` and `v[mid..]` back to front, `v[mid..]` is the shorter run and is moved into
/// `buf` first.
///
/// # Safety
///
/// `buf` must be valid for writes of `v.len() - mid` elements and must not overlap `v`.
unsafe fn merge_hi<T, F>(v: &mut [T], mid: usize, buf: *mut T, is_less: &mut F)
where
    F: FnMut(&T, &T) -> bool,
{
    let len = v.len();
    let v_base = v.as_mut_ptr();

    ptr::copy_nonoverlapping(v_base.add(mid), buf, len - mid);

    let mut state = MergeHi {
        left_start: v_base,
        left_end: v_base.add(mid),
        right_start: buf,
        right_end: buf.add(len - mid),
        dest_end: v_base.add(len),
    };
    state.merge(is_less);
    // `state` gets dropped and moves what is left of the right run into place.
}

/// State of a back to front merge. The left run lives in place, the right run in the scratch
/// buffer. The gap `left_end..dest_end` is always exactly as long as `right_start..right_end`.
struct MergeHi<T> {
    left_start: *mut T,
    left_end: *mut T,
    right_start: *mut T,
    right_end: *mut T,
    dest_end: *mut T,
}

impl<T> MergeHi<T> {
    unsafe fn merge<F>(&mut self, is_less: &mut F)
    where
        F: FnMut(&T, &T) -> bool,
    {
        let mut left_wins = 0;
        let mut right_wins = 0;

        while self.left_start < self.left_end && self.right_start < self.right_end {
            if left_wins.max(right_wins) < MIN_GALLOP {
                // One-at-a-time mode. If equal, the right run goes last to maintain stability.
                let left_last = self.left_end.sub(1);
                let right_last = self.right_end.sub(1);
                self.dest_end = self.dest_end.sub(1);

                if is_less(&*right_last, &*left_last) {
                    ptr::copy_nonoverlapping(left_last, self.dest_end, 1);
                    self.left_end = left_last;
                    left_wins += 1;
                    right_wins = 0;
                } else {
                    ptr::copy_nonoverlapping(right_last, self.dest_end, 1);
                    self.right_end = right_last;
                    right_wins += 1;
                    left_wins = 0;
                }
            } else {
                // Galloping mode.
                let left_len = self.left_end.offset_from(self.left_start) as usize;
                let left_run = slice::from_raw_parts(self.left_start, left_len);
                let right_last = &*self.right_end.sub(1);
                left_wins = left_len - gallop_right(right_last, left_run, true, is_less);
                self.left_end = self.left_end.sub(left_wins);
                self.dest_end = self.dest_end.sub(left_wins);
                ptr::copy(self.left_end, self.dest_end, left_wins);

                if self.left_end == self.left_start {
                    break;
                }

                let right_len = self.right_len();
                let right_run = slice::from_raw_parts(self.right_start, right_len);
                let left_last = &*self.left_end.sub(1);
                right_wins = right_len - gallop_left(left_last, right_run, true, is_less);
                self.right_end = self.right_end.sub(right_wins);
                self.dest_end = self.dest_end.sub(right_wins);
                ptr::copy_nonoverlapping(self.right_end, self.dest_end, right_wins);
            }
        }
    }

    fn right_len(&self) -> usize {
        // SAFETY: Both point into the scratch buffer and `right_start <= right_end`.
        unsafe { self.right_end.offset_from(self.right_start) as usize }
    }
}

impl<T> Drop for MergeHi<T> {
    /// Moves the unmerged part of the right run into the gap. If the comparator panicked the result
    /// is not sorted, but still contains every element exactly once.
    fn drop(&mut self) {
        // SAFETY: The gap ending at `dest_end` is exactly `right_len()` elements long.
        unsafe {
            let len = self.right_len();
            ptr::copy_nonoverlapping(self.right_start, self.dest_end.sub(len), len);
        }
    }
}
