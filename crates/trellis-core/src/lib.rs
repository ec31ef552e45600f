#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures shared by the trellis compiler.
//!
//! - `channel`: encoding channels a view binds fields to
//! - `logical`: `and`/`or`/`not` operand trees over named selections
//! - `utils`: field access paths, identifier sanitizing, JSON stringification

pub mod channel;
pub mod logical;
pub mod utils;

#[cfg(test)]
mod logical_tests;

pub use channel::Channel;
pub use logical::LogicalOperand;
