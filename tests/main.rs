mod shell {
    sort_test_tools::instantiate_sort_tests!(ksort::shell::SortImpl);
}

mod binary_insertion {
    sort_test_tools::instantiate_sort_tests!(ksort::binary_insertion::SortImpl);
    sort_test_tools::instantiate_stable_sort_tests!(ksort::binary_insertion::SortImpl);
}

mod heap {
    sort_test_tools::instantiate_sort_tests!(ksort::heap::SortImpl);
}

mod quick {
    sort_test_tools::instantiate_sort_tests!(ksort::quick::SortImpl);
}

mod merge {
    sort_test_tools::instantiate_sort_tests!(ksort::merge::SortImpl);
    sort_test_tools::instantiate_stable_sort_tests!(ksort::merge::SortImpl);
}

mod selection {
    sort_test_tools::instantiate_sort_tests!(ksort::selection::SortImpl);
}

mod tim {
    sort_test_tools::instantiate_sort_tests!(ksort::tim::SortImpl);
    sort_test_tools::instantiate_stable_sort_tests!(ksort::tim::SortImpl);
}
