//! Tests for the parameter table, scales and formula expressions

mod expression_tests;
mod scale_tests;
mod table_tests;
