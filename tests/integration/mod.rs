//! Library-level integration tests.

pub mod http_service_test;
pub mod result_test;
pub mod workbench_test;
