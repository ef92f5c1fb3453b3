//! In-place sorting algorithm family.
//!
//! Seven type-specialized sorts share the calling convention `sort(&mut [T])` /
//! `sort_by(&mut [T], compare)`: [`shell`], [`binary_insertion`], [`heap`], [`quick`], [`merge`],
//! [`selection`] and [`tim`]. [`generic`] is a separate comparator driven entry point that sorts
//! records of a runtime-known byte size.

macro_rules! sort_impl {
    ($name:expr) => {
        /// Hooks this algorithm into the shared test suite and benchmark harness.
        pub struct SortImpl;

        impl sort_test_tools::Sort for SortImpl {
            fn name() -> String {
                $name.into()
            }

            #[inline]
            fn sort<T>(arr: &mut [T])
            where
                T: Ord,
            {
                sort(arr);
            }

            #[inline]
            fn sort_by<T, F>(arr: &mut [T], compare: F)
            where
                F: FnMut(&T, &T) -> std::cmp::Ordering,
            {
                sort_by(arr, compare);
            }
        }
    };
}

mod error;
mod smallsort;

pub mod binary_insertion;
pub mod generic;
pub mod heap;
pub mod merge;
pub mod quick;
pub mod selection;
pub mod shell;
pub mod tim;

pub use error::SortError;
