//! Headless end-to-end tests of the `workbench` binary.

mod common;
mod headless_test;
