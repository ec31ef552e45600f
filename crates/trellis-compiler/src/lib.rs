//! Trellis compiler: dataflow IR construction and selection compilation.
//!
//! This crate lowers a normalized visualization model into descriptors for
//! the execution engine:
//! - `dataflow` - node arena, builder, optimizer passes, assembler
//! - `selection` - interaction compilers, selection transforms, resolution
//! - `model` - normalized input handed over by the spec normalizer
//! - `vega` - data, signal, and mark descriptors produced for the engine
//! - `compile` - the build → optimize → assemble pipeline

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod compile;
pub mod config;
pub mod dataflow;
mod error;
pub mod model;
pub mod selection;
pub mod vega;

#[cfg(test)]
pub mod test_utils;

pub use compile::{CompiledSpec, Compiler, compile};
pub use config::{CompileConfig, SelectionConfig, SelectionDefaults};
pub use error::{Error, Result};
