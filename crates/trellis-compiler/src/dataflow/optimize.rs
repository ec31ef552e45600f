//! Structural rewrites over the built forest.
//!
//! Passes run in a fixed order until none of them changes the graph:
//!
//! 1. `remove_unused_subtrees` - drop leaves nothing consumes
//! 2. `move_parse_up` - hoist parse nodes toward their source, merging
//!    adjacent ones
//! 3. `merge_equivalent_siblings` - fold identical siblings into one
//!
//! Every pass leaves parent and child links consistent.

use tracing::{debug, instrument};

use super::graph::{DataflowGraph, NodeId};
use super::nodes::{DataflowNode, NodeKind};
use super::output::DemandTable;

/// Statistics from an optimizer run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OptimizeStats {
    /// Nodes spliced out because nothing downstream needs them.
    pub removed: usize,
    /// Parse nodes swapped with their parent.
    pub swapped: usize,
    /// Nodes merged into a parent or sibling.
    pub merged: usize,
    /// Fixpoint rounds run.
    pub iterations: usize,
}

impl OptimizeStats {
    fn changes(&self) -> usize {
        self.removed + self.swapped + self.merged
    }
}

pub struct GraphOptimizer<'a> {
    graph: &'a mut DataflowGraph,
    demand: &'a DemandTable,
    max_iterations: usize,
}

impl<'a> GraphOptimizer<'a> {
    pub fn new(graph: &'a mut DataflowGraph, demand: &'a DemandTable) -> Self {
        Self {
            graph,
            demand,
            max_iterations: 32,
        }
    }

    pub fn max_iterations(mut self, value: usize) -> Self {
        self.max_iterations = value.max(1);
        self
    }

    #[instrument(skip_all, fields(max_iterations = self.max_iterations))]
    pub fn run(self) -> OptimizeStats {
        let mut total = OptimizeStats::default();

        while total.iterations < self.max_iterations {
            total.iterations += 1;
            let removed = remove_unused_subtrees(self.graph, self.demand);
            let (swapped, parse_merged) = move_parse_up(self.graph);
            let sibling_merged = merge_equivalent_siblings(self.graph);

            let round = OptimizeStats {
                removed,
                swapped,
                merged: parse_merged + sibling_merged,
                iterations: 1,
            };
            debug!(
                iteration = total.iterations,
                removed, swapped, merged = round.merged, "optimizer round"
            );

            total.removed += round.removed;
            total.swapped += round.swapped;
            total.merged += round.merged;
            if round.changes() == 0 {
                break;
            }
        }

        #[cfg(debug_assertions)]
        self.graph.verify_links();

        debug!(
            removed = total.removed,
            swapped = total.swapped,
            merged = total.merged,
            iterations = total.iterations,
            "optimized dataflow"
        );
        total
    }
}

/// Remove leaves that produce nothing anyone asked for, repeatedly, so
/// whole unused chains disappear. Roots left without children are dropped.
///
/// Returns the number of nodes removed.
pub fn remove_unused_subtrees(graph: &mut DataflowGraph, demand: &DemandTable) -> usize {
    let mut removed = 0;
    loop {
        let dead: Vec<NodeId> = graph
            .leaves()
            .into_iter()
            .filter(|&id| graph.parent(id).is_some())
            .filter(|&id| match graph.kind(id) {
                NodeKind::Output(output) => !output.is_required(demand),
                _ => true,
            })
            .collect();
        if dead.is_empty() {
            break;
        }
        for id in dead {
            debug!(node = %id, name = graph.node(id).debug_name(), "removing unused node");
            graph.remove(id);
            removed += 1;
        }
    }
    removed + graph.prune_empty_roots()
}

/// Move every parse node up while its parent commutes with it.
///
/// A parse swaps with a parent that has no other children, is not a source,
/// and produces none of the parsed fields. A parse under another parse is
/// merged into it.
///
/// Returns `(swapped, merged)`.
pub fn move_parse_up(graph: &mut DataflowGraph) -> (usize, usize) {
    let mut swapped = 0;
    let mut merged = 0;

    let parses: Vec<NodeId> = graph
        .walk_all()
        .into_iter()
        .filter(|&id| graph.kind(id).is_parse())
        .collect();

    for id in parses {
        if !graph.is_attached(id) {
            continue;
        }
        while let Some(parent) = graph.parent(id) {
            if graph.kind(parent).is_parse() {
                merge_parse_into(graph, id, parent);
                graph.remove(id);
                merged += 1;
                break;
            }
            if graph.kind(parent).is_source() || graph.children(parent).len() > 1 {
                break;
            }
            let parsed = graph.kind(id).dependent_fields();
            let produced = graph.kind(parent).produced_fields();
            if !parsed.is_disjoint(&produced) {
                break;
            }
            graph.swap_with_parent(id);
            swapped += 1;
        }
    }
    (swapped, merged)
}

fn merge_parse_into(graph: &mut DataflowGraph, from: NodeId, into: NodeId) {
    let NodeKind::Parse { fields: extra } = graph.kind(from).clone_node() else {
        return;
    };
    if let NodeKind::Parse { fields } = graph.kind_mut(into) {
        for (field, ty) in extra {
            fields.entry(field).or_insert(ty);
        }
    }
}

/// Merge siblings with identical payloads. The survivor adopts the
/// duplicate's children. Outputs are never merged.
///
/// Returns the number of nodes merged away.
pub fn merge_equivalent_siblings(graph: &mut DataflowGraph) -> usize {
    let mut merged = 0;
    for parent in graph.walk_all() {
        if !graph.is_attached(parent) {
            continue;
        }
        while let Some((keep, dup)) = find_duplicate(graph, parent) {
            debug!(keep = %keep, dup = %dup, "merging equivalent siblings");
            for child in graph.children(dup).to_vec() {
                graph.set_parent(child, keep);
            }
            graph.remove(dup);
            merged += 1;
        }
    }
    merged
}

fn find_duplicate(graph: &DataflowGraph, parent: NodeId) -> Option<(NodeId, NodeId)> {
    let children = graph.children(parent);
    for (i, &a) in children.iter().enumerate() {
        if matches!(graph.kind(a), NodeKind::Output(_)) {
            continue;
        }
        for &b in &children[i + 1..] {
            if graph.kind(a) == graph.kind(b) {
                return Some((a, b));
            }
        }
    }
    None
}
