pub(crate) mod test_support;

mod escape_tests;
