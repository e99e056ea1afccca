//! Unit tests for policy dispatch, masking and the finance pack.

mod fixtures;
mod masking_tests;
