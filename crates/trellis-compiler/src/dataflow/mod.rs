//! Dataflow IR: an arena-backed forest of transform nodes.
//!
//! # Architecture
//!
//! ```text
//! UnitView → GraphBuilder → DataflowGraph → GraphOptimizer → GraphAssembler → [DataDescriptor]
//! ```
//!
//! Nodes are addressed by `NodeId` and owned by the arena. Edges are plain
//! indices: every node has at most one parent and an ordered child list.
//! Output nodes mark named dataset boundaries; whether they are emitted
//! depends on the demand recorded in a `DemandTable` during building.

mod assemble;
mod build;
mod dump;
mod graph;
mod invariants;
mod nodes;
mod optimize;
mod output;

#[cfg(test)]
mod assemble_tests;
#[cfg(test)]
mod build_tests;
#[cfg(test)]
mod graph_tests;
#[cfg(test)]
mod nodes_tests;

pub use assemble::GraphAssembler;
pub use build::{GraphBuilder, ViewOutputs};
pub use dump::GraphPrinter;
pub use graph::{DataflowGraph, GraphNode, NodeId};
pub use nodes::{
    AggregateMeasure, DataflowNode, FieldSet, NodeKind, ParseType, TIME_UNITS, expr_fields,
    is_time_unit, time_unit_expr,
};
pub use optimize::{
    GraphOptimizer, OptimizeStats, merge_equivalent_siblings, move_parse_up,
    remove_unused_subtrees,
};
pub use output::{DemandTable, OutputKind, OutputNode};
