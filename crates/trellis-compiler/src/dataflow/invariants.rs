//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use super::graph::{GraphNode, NodeId};
use super::output::OutputNode;

#[inline]
pub fn ensure_parent(id: NodeId, node: &GraphNode, op: &str) -> NodeId {
    match node.parent() {
        Some(parent) => parent,
        None => panic!(
            "{op}: {id} ({}) is a root (roots have no parent to splice into)",
            node.debug_name()
        ),
    }
}

#[inline]
pub fn ensure_child_position(parent: NodeId, children: &[NodeId], child: NodeId) -> usize {
    match children.iter().position(|&c| c == child) {
        Some(pos) => pos,
        None => panic!("remove_child: {child} is not a child of {parent}"),
    }
}

#[inline]
pub fn ensure_root_position(roots: &[NodeId], root: NodeId) -> usize {
    match roots.iter().position(|&r| r == root) {
        Some(pos) => pos,
        None => panic!("swap_with_parent: {root} has no parent and is not a registered root"),
    }
}

#[inline]
pub fn assert_not_ancestor(is_ancestor: bool, node: NodeId, parent: NodeId) {
    assert!(
        !is_ancestor,
        "set_parent: {node} is an ancestor of {parent} (edge would close a cycle)"
    );
}

#[inline]
pub fn ensure_output(id: NodeId, output: Option<&OutputNode>) -> &OutputNode {
    match output {
        Some(output) => output,
        None => panic!("output: {id} is not an output node"),
    }
}

#[inline]
pub fn ensure_output_mut(id: NodeId, output: Option<&mut OutputNode>) -> &mut OutputNode {
    match output {
        Some(output) => output,
        None => panic!("output_mut: {id} is not an output node"),
    }
}
