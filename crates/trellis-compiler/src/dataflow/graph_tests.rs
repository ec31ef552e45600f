//! Tests for tree links and structural rewrites.

use super::*;
use crate::test_utils::{chain, formula, output, url_source};

#[test]
fn set_parent_links_both_sides() {
    let mut g = DataflowGraph::new();
    let root = g.add_root("source", url_source("a.json"));
    let a = g.add_node("a", formula("1", "a"));

    g.set_parent(a, root);

    assert_eq!(g.parent(a), Some(root));
    assert_eq!(g.children(root), &[a]);
    g.verify_links();
}

#[test]
fn set_parent_detaches_from_previous_parent() {
    let mut g = DataflowGraph::new();
    let [root, a, b, c] = chain(&mut g);

    g.set_parent(c, a);

    assert_eq!(g.children(b), &[] as &[NodeId]);
    assert_eq!(g.children(a), &[b, c]);
    assert_eq!(g.parent(c), Some(a));
    assert!(g.is_attached(root));
    g.verify_links();
}

#[test]
#[should_panic(expected = "would close a cycle")]
fn set_parent_rejects_cycle() {
    let mut g = DataflowGraph::new();
    let [_, a, _, c] = chain(&mut g);

    g.set_parent(a, c);
}

#[test]
fn add_child_only_touches_parent_side() {
    let mut g = DataflowGraph::new();
    let root = g.add_root("source", url_source("a.json"));
    let a = g.add_node("a", formula("1", "a"));

    g.add_child(root, a);

    assert_eq!(g.children(root), &[a]);
    assert_eq!(g.parent(a), None);
}

#[test]
fn remove_child_removes_first_match() {
    let mut g = DataflowGraph::new();
    let [root, a, ..] = chain(&mut g);
    let extra = g.add_under(root, "x", formula("4", "x"));

    g.remove_child(root, a);

    assert_eq!(g.children(root), &[extra]);
}

#[test]
#[should_panic(expected = "is not a child of")]
fn remove_child_panics_when_absent() {
    let mut g = DataflowGraph::new();
    let [root, _, b, _] = chain(&mut g);

    g.remove_child(root, b);
}

#[test]
fn remove_reparents_children_in_order() {
    let mut g = DataflowGraph::new();
    let root = g.add_root("source", url_source("a.json"));
    let sibling = g.add_under(root, "s", formula("0", "s"));
    let mid = g.add_under(root, "mid", formula("1", "m"));
    let c1 = g.add_under(mid, "c1", formula("2", "c1"));
    let c2 = g.add_under(mid, "c2", formula("3", "c2"));
    let c3 = g.add_under(mid, "c3", formula("4", "c3"));
    let descendants = g.walk(root).len();

    g.remove(mid);

    assert_eq!(g.children(root), &[sibling, c1, c2, c3]);
    assert_eq!(g.parent(mid), None);
    assert!(g.children(mid).is_empty());
    assert_eq!(g.walk(root).len(), descendants - 1);
    g.verify_links();
}

#[test]
#[should_panic(expected = "is a root")]
fn remove_root_panics() {
    let mut g = DataflowGraph::new();
    let [root, ..] = chain(&mut g);

    g.remove(root);
}

#[test]
fn swap_with_parent_exchanges_levels() {
    let mut g = DataflowGraph::new();
    let [root, a, b, c] = chain(&mut g);

    g.swap_with_parent(b);

    insta::assert_snapshot!(g.dump(), @r"
    N0 source data/cars.json
      N2 formula b = 2
        N1 formula a = 1
          N3 formula c = 3
    ");
    assert_eq!(g.parent(b), Some(root));
    assert_eq!(g.children(b), &[a]);
    assert_eq!(g.children(a), &[c]);
    g.verify_links();
}

#[test]
fn swap_keeps_slot_under_grandparent() {
    let mut g = DataflowGraph::new();
    let root = g.add_root("source", url_source("a.json"));
    let left = g.add_under(root, "left", formula("0", "l"));
    let p = g.add_under(root, "p", formula("1", "p"));
    let right = g.add_under(root, "right", formula("2", "r"));
    let n = g.add_under(p, "n", formula("3", "n"));

    g.swap_with_parent(n);

    assert_eq!(g.children(root), &[left, n, right]);
    assert_eq!(g.children(n), &[p]);
    g.verify_links();
}

#[test]
fn swap_twice_restores_shape() {
    let mut g = DataflowGraph::new();
    let [_, a, b, _] = chain(&mut g);
    let before = g.dump();

    g.swap_with_parent(b);
    g.swap_with_parent(a);

    assert_eq!(g.dump(), before);
    g.verify_links();
}

#[test]
fn swap_under_root_list() {
    let mut g = DataflowGraph::new();
    let top = g.add_root("top", formula("0", "t"));
    let other = g.add_root("other", url_source("b.json"));
    let n = g.add_under(top, "n", formula("1", "n"));

    g.swap_with_parent(n);

    assert_eq!(g.roots(), &[n, other]);
    assert_eq!(g.parent(top), Some(n));
    g.verify_links();
}

#[test]
fn clone_is_detached_copy() {
    let mut g = DataflowGraph::new();
    let [_, a, ..] = chain(&mut g);

    let copy = g.clone_node(a);

    assert_eq!(g.kind(copy), g.kind(a));
    assert_eq!(g.node(copy).debug_name(), "clone_a");
    assert_eq!(g.parent(copy), None);
    assert!(g.children(copy).is_empty());
    assert!(!g.is_attached(copy));
}

#[test]
fn clone_of_output_shares_demand() {
    let mut demand = DemandTable::new();
    let mut g = DataflowGraph::new();
    let root = g.add_root("source", url_source("a.json"));
    let out = g.add_under(root, "main", output("main", &mut demand));

    let copy = g.clone_node(out);
    g.output(copy).get_source(&mut demand);

    assert!(g.output(out).is_required(&demand));
    assert_eq!(demand.count("main"), 1);
}

#[test]
fn leaves_only_cover_attached_nodes() {
    let mut g = DataflowGraph::new();
    let [_, _, b, c] = chain(&mut g);
    g.remove(c);

    assert_eq!(g.leaves(), vec![b]);
}
