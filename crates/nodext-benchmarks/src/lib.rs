//! nodext benchmarking suite
//!
//! Benchmarks for the lock graph walk, closure normalization, version
//! selection and lock file parsing.

pub mod common;

pub use common::*;
