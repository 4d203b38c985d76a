//! Tests for the problem snapshot and the computations built on it

mod calculate_tests;
mod problem_tests;
mod sampling_tests;
