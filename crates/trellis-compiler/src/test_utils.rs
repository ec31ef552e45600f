//! Fixture helpers shared by unit tests.

use crate::dataflow::{DataflowGraph, DemandTable, NodeId, NodeKind, OutputKind, OutputNode};
use crate::model::{DataRef, NormalizedSpec, UnitView};
use crate::selection::{SelectionComponent, UnitContext};

pub fn spec(json: &str) -> NormalizedSpec {
    serde_json::from_str(json).expect("valid spec fixture")
}

pub fn view(json: &str) -> UnitView {
    serde_json::from_str(json).expect("valid view fixture")
}

pub fn ctx(view: &UnitView) -> UnitContext<'_> {
    UnitContext::new(view, false)
}

pub fn url_source(url: &str) -> NodeKind {
    NodeKind::Source {
        data: DataRef::Url {
            url: url.to_owned(),
            format: None,
        },
    }
}

pub fn formula(expr: &str, r#as: &str) -> NodeKind {
    NodeKind::Formula {
        expr: expr.to_owned(),
        r#as: r#as.to_owned(),
    }
}

pub fn output(name: &str, demand: &mut DemandTable) -> NodeKind {
    NodeKind::Output(OutputNode::new(name, OutputKind::Main, demand))
}

/// `root → a → b → c`, each a formula.
pub fn chain(graph: &mut DataflowGraph) -> [NodeId; 4] {
    let root = graph.add_root("source", url_source("data/cars.json"));
    let a = graph.add_under(root, "a", formula("1", "a"));
    let b = graph.add_under(a, "b", formula("2", "b"));
    let c = graph.add_under(b, "c", formula("3", "c"));
    [root, a, b, c]
}

pub fn interval(name: &str) -> SelectionComponent {
    SelectionComponent::new(name, "interval")
}
