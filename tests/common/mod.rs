//! Common test utilities for solution-metrics integration tests
//!
//! - `TestSolution` builder for laying out solutions on disk
//! - Assertions over analysis reports

#![allow(dead_code)]

pub mod assertions;
pub mod test_solution;

pub use assertions::*;
pub use test_solution::TestSolution;
