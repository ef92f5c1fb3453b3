use std::mem::ManuallyDrop;
use std::ptr;

/// Sorts `v[offset..]` into the already sorted prefix `v[..offset]` with plain insertion sort.
///
/// Stable. Used as the small-slice cutover of quick sort and merge sort.
pub(crate) fn insertion_sort_shift_left<T, F>(v: &mut [T], offset: usize, is_less: &mut F)
where
    F: FnMut(&T, &T) -> bool,
{
    let len = v.len();

    assert!(offset != 0 && offset <= len);

    for i in offset..len {
        insert_tail(&mut v[..=i], is_less);
    }
}

/// Inserts `v[v.len() - 1]` into pre-sorted sequence `v[..v.len() - 1]` so that whole `v[..]`
/// becomes sorted.
fn insert_tail<T, F>(v: &mut [T], is_less: &mut F)
where
    F: FnMut(&T, &T) -> bool,
{
    let len = v.len();
    if len < 2 {
        return;
    }

    let arr = v.as_mut_ptr();
    let i = len - 1;

    // SAFETY: `i` and every `j < i` are in-bounds. The element at `i` is moved out into `tmp` and
    // `hole` always points at the single slot of `v` that currently has no owner, so the value is
    // written back exactly once, even if `is_less` panics.
    unsafe {
        if !is_less(&*arr.add(i), &*arr.add(i - 1)) {
            return;
        }

        let tmp = ManuallyDrop::new(ptr::read(arr.add(i)));
        let mut hole = InsertionHole {
            src: &*tmp,
            dest: arr.add(i - 1),
        };
        ptr::copy_nonoverlapping(arr.add(i - 1), arr.add(i), 1);

        for j in (0..i - 1).rev() {
            if !is_less(&*tmp, &*arr.add(j)) {
                break;
            }

            ptr::copy_nonoverlapping(arr.add(j), arr.add(j + 1), 1);
            hole.dest = arr.add(j);
        }
        // `hole` gets dropped and thus copies `tmp` into the remaining hole in `v`.
    }
}

// When dropped, copies from `src` into `dest`.
struct InsertionHole<T> {
    src: *const T,
    dest: *mut T,
}

impl<T> Drop for InsertionHole<T> {
    fn drop(&mut self) {
        // SAFETY: `src` is a live value that was moved out of the slice and `dest` is the slot it
        // left behind.
        unsafe {
            ptr::copy_nonoverlapping(self.src, self.dest, 1);
        }
    }
}
