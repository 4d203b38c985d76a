//! Tests for override resolution and the parameter mapping engine

mod override_tests;
