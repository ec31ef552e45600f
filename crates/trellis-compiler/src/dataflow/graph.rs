//! Arena-backed dataflow forest.
//!
//! The graph owns every node. Removed nodes stay in the arena, unlinked,
//! so `NodeId`s held by callers never dangle. A node is *attached* when
//! following parents leads to a registered root.

use std::fmt;

use super::invariants::{
    assert_not_ancestor, ensure_child_position, ensure_output, ensure_output_mut, ensure_parent,
    ensure_root_position,
};
use super::nodes::{DataflowNode, NodeKind};
use super::output::OutputNode;

/// Index into `DataflowGraph::nodes`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// A node with its structural links.
#[derive(Clone, Debug)]
pub struct GraphNode {
    debug_name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

impl GraphNode {
    fn new(debug_name: String, kind: NodeKind) -> Self {
        Self {
            debug_name,
            parent: None,
            children: Vec::new(),
            kind,
        }
    }

    pub fn debug_name(&self) -> &str {
        &self.debug_name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }
}

#[derive(Clone, Debug, Default)]
pub struct DataflowGraph {
    nodes: Vec<GraphNode>,
    roots: Vec<NodeId>,
}

impl DataflowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a detached node, returning its ID.
    pub fn add_node(&mut self, debug_name: impl Into<String>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(GraphNode::new(debug_name.into(), kind));
        id
    }

    /// Add a node and register it as a root.
    pub fn add_root(&mut self, debug_name: impl Into<String>, kind: NodeKind) -> NodeId {
        let id = self.add_node(debug_name, kind);
        self.roots.push(id);
        id
    }

    /// Add a node as the last child of `parent`.
    pub fn add_under(
        &mut self,
        parent: NodeId,
        debug_name: impl Into<String>,
        kind: NodeKind,
    ) -> NodeId {
        let id = self.add_node(debug_name, kind);
        self.set_parent(id, parent);
        id
    }

    pub fn node(&self, id: NodeId) -> &GraphNode {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.index()].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Number of nodes in the arena, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The output payload of `id`. Panics if `id` is not an output node.
    pub fn output(&self, id: NodeId) -> &OutputNode {
        ensure_output(id, self.nodes[id.index()].kind.as_output())
    }

    pub fn output_mut(&mut self, id: NodeId) -> &mut OutputNode {
        ensure_output_mut(id, self.nodes[id.index()].kind.as_output_mut())
    }

    /// Make `parent` the parent of `node`, linking both sides.
    ///
    /// This is the only way an edge is created. The node is first detached
    /// from its previous parent (or from the root list).
    pub fn set_parent(&mut self, node: NodeId, parent: NodeId) {
        assert_not_ancestor(self.is_ancestor(node, parent), node, parent);

        match self.nodes[node.index()].parent {
            Some(old) => self.remove_child(old, node),
            None => self.roots.retain(|&r| r != node),
        }
        self.nodes[node.index()].parent = Some(parent);
        self.add_child(parent, node);
    }

    /// Append `child` to `parent`'s child list without touching the
    /// child's parent pointer. Use [`Self::set_parent`] to link both sides.
    pub(crate) fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.index()].children.push(child);
    }

    /// Remove the first occurrence of `child` from `parent`'s child list.
    ///
    /// Panics if `child` is not there.
    pub(crate) fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        let children = &mut self.nodes[parent.index()].children;
        let pos = ensure_child_position(parent, children, child);
        children.remove(pos);
    }

    /// Splice `id` out of the tree.
    ///
    /// Its children move, in order, to the end of its parent's child list.
    /// Afterwards `id` has neither parent nor children. Panics on roots.
    pub fn remove(&mut self, id: NodeId) {
        let parent = ensure_parent(id, self.node(id), "remove");

        for child in self.nodes[id.index()].children.clone() {
            self.set_parent(child, parent);
        }
        self.remove_child(parent, id);
        self.nodes[id.index()].parent = None;
    }

    /// Exchange `id` with its parent.
    ///
    /// The children of `id` move under the old parent, `id` takes the old
    /// parent's slot (under the grandparent or in the root list), and the
    /// old parent becomes the only child of `id`.
    pub fn swap_with_parent(&mut self, id: NodeId) {
        let parent = ensure_parent(id, self.node(id), "swap_with_parent");
        let grandparent = self.nodes[parent.index()].parent;

        for child in self.nodes[id.index()].children.clone() {
            self.set_parent(child, parent);
        }
        self.remove_child(parent, id);
        self.nodes[id.index()].parent = None;

        match grandparent {
            Some(g) => {
                let slot = ensure_child_position(g, &self.nodes[g.index()].children, parent);
                self.nodes[g.index()].children[slot] = id;
                self.nodes[id.index()].parent = Some(g);
            }
            None => {
                let slot = ensure_root_position(&self.roots, parent);
                self.roots[slot] = id;
            }
        }

        self.nodes[parent.index()].parent = Some(id);
        self.add_child(id, parent);
    }

    /// Detached copy of `id` with the same payload.
    pub fn clone_node(&mut self, id: NodeId) -> NodeId {
        let node = &self.nodes[id.index()];
        let name = format!("clone_{}", node.debug_name);
        let kind = node.kind.clone_node();
        self.add_node(name, kind)
    }

    /// Drop childless roots. Returns how many were dropped.
    pub fn prune_empty_roots(&mut self) -> usize {
        let before = self.roots.len();
        let nodes = &self.nodes;
        self.roots.retain(|r| !nodes[r.index()].children.is_empty());
        before - self.roots.len()
    }

    /// Whether `ancestor` lies on the parent chain of `node` (or is `node`).
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.nodes[id.index()].parent;
        }
        false
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut cursor = id;
        while let Some(parent) = self.nodes[cursor.index()].parent {
            cursor = parent;
        }
        self.roots.contains(&cursor)
    }

    /// Pre-order walk from `start`.
    pub fn walk(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id.index()].children.iter().rev());
        }
        out
    }

    /// Pre-order walk over every root.
    pub fn walk_all(&self) -> Vec<NodeId> {
        self.roots.iter().flat_map(|&r| self.walk(r)).collect()
    }

    /// Attached nodes without children.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.walk_all()
            .into_iter()
            .filter(|&id| self.nodes[id.index()].children.is_empty())
            .collect()
    }

    /// Check that parent and child links agree across the whole arena.
    ///
    /// Panics on the first inconsistency.
    pub fn verify_links(&self) {
        for (index, node) in self.nodes.iter().enumerate() {
            let id = NodeId(index as u32);
            for &child in &node.children {
                assert_eq!(
                    self.nodes[child.index()].parent,
                    Some(id),
                    "{child} is listed under {id} but points elsewhere"
                );
            }
            if let Some(parent) = node.parent {
                let count = self.nodes[parent.index()]
                    .children
                    .iter()
                    .filter(|&&c| c == id)
                    .count();
                assert_eq!(count, 1, "{id} appears {count} times under {parent}");
                assert!(!self.roots.contains(&id), "{id} has a parent and is a root");
            }
        }
    }
}
