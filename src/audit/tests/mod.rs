//! Unit tests for the audit module.

mod fixtures;
mod query_tests;
mod report_tests;
