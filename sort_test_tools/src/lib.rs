//! Shared test and benchmark tooling for the `ksort` algorithm family.

use std::cmp::Ordering;

pub mod patterns;

// Re-exported so the test instantiation macros work without the caller depending on `paste`.
#[doc(hidden)]
pub use paste;

/// Common interface of every sort implementation under test.
pub trait Sort {
    fn name() -> String;

    fn sort<T>(arr: &mut [T])
    where
        T: Ord;

    fn sort_by<T, F>(arr: &mut [T], compare: F)
    where
        F: FnMut(&T, &T) -> Ordering;
}

/// Expands the full test suite into `#[test]` functions for `$sort_impl`.
#[macro_export]
macro_rules! instantiate_sort_tests {
    ($sort_impl:ty) => {
        $crate::instantiate_sort_test_fns!(
            $sort_impl;
            basic,
            fixed_seed,
            sort_vs_sort_by,
            descending_comparator,
            idempotent,
            permutation_preserved,
            comparator_panic_retains_original_set
        );

        $crate::instantiate_typed_sort_test_fns!(
            $sort_impl;
            [
                random,
                random_narrow,
                random_zipf,
                random_sorted,
                ascending,
                descending,
                all_equal,
                saw_mixed,
                pipe_organ
            ];
            [(i32, i32), (u64, u64), (string, String), (big, $crate::tests::BigKey)]
        );
    };
}

/// Additional tests for implementations that claim to be stable.
#[macro_export]
macro_rules! instantiate_stable_sort_tests {
    ($sort_impl:ty) => {
        $crate::instantiate_sort_test_fns!(
            $sort_impl;
            stability,
            stability_with_runs,
            stability_records
        );
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! instantiate_sort_test_fns {
    ($sort_impl:ty; $($test_fn:ident),* $(,)?) => {
        $(
            #[test]
            fn $test_fn() {
                $crate::tests::$test_fn::<$sort_impl>();
            }
        )*
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! instantiate_typed_sort_test_fns {
    ($sort_impl:ty; [$($test_fn:ident),* $(,)?]; $types:tt) => {
        $(
            $crate::instantiate_typed_sort_test_fn!($sort_impl; $test_fn; $types);
        )*
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! instantiate_typed_sort_test_fn {
    ($sort_impl:ty; $test_fn:ident; [$(($suffix:ident, $ty:ty)),* $(,)?]) => {
        $(
            $crate::paste::paste! {
                #[test]
                fn [<$test_fn _ $suffix>]() {
                    $crate::tests::$test_fn::<$ty, $sort_impl>();
                }
            }
        )*
    };
}
