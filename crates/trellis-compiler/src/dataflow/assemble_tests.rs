//! Tests for dataset assembly.

use indexmap::IndexMap;
use serde_json::{Value, json};

use super::*;
use crate::test_utils::{formula, output, url_source};

fn assemble(g: &mut DataflowGraph, demand: &DemandTable) -> Value {
    let data = GraphAssembler::new(g, demand).assemble();
    serde_json::to_value(data).expect("descriptors serialize")
}

fn require(g: &DataflowGraph, id: NodeId, demand: &mut DemandTable) {
    g.output(id).get_source(demand);
}

#[test]
fn parse_under_source_becomes_format() {
    let mut demand = DemandTable::new();
    let mut g = DataflowGraph::new();
    let root = g.add_root("source", url_source("cars.json"));
    let fields = IndexMap::from([("Horsepower".to_owned(), ParseType::Number)]);
    let parse = g.add_under(root, "parse", NodeKind::Parse { fields });
    let main = g.add_under(parse, "main", output("cars_main", &mut demand));
    require(&g, main, &mut demand);

    let data = assemble(&mut g, &demand);

    assert_eq!(
        data,
        json!([{
            "name": "cars_main",
            "url": "cars.json",
            "format": { "parse": { "Horsepower": "number" } }
        }])
    );
}

#[test]
fn parse_below_transform_becomes_formula() {
    let mut demand = DemandTable::new();
    let mut g = DataflowGraph::new();
    let root = g.add_root("source", url_source("cars.json"));
    let f = g.add_under(root, "f", formula("datum.a + 1", "b"));
    let fields = IndexMap::from([("a".to_owned(), ParseType::Date)]);
    let parse = g.add_under(f, "parse", NodeKind::Parse { fields });
    let main = g.add_under(parse, "main", output("main", &mut demand));
    require(&g, main, &mut demand);

    let data = assemble(&mut g, &demand);

    assert_eq!(
        data[0]["transform"],
        json!([
            { "type": "formula", "expr": "datum.a + 1", "as": "b" },
            { "type": "formula", "expr": "toDate(datum[\"a\"])", "as": "a" }
        ])
    );
}

#[test]
fn unrequested_output_is_transparent() {
    let mut demand = DemandTable::new();
    let mut g = DataflowGraph::new();
    let root = g.add_root("source", url_source("cars.json"));
    let raw = g.add_under(root, "raw", output("cars_raw", &mut demand));
    let f = g.add_under(raw, "f", formula("1", "one"));
    let main = g.add_under(f, "main", output("cars_main", &mut demand));
    require(&g, main, &mut demand);

    let data = assemble(&mut g, &demand);

    assert_eq!(
        data,
        json!([{
            "name": "cars_main",
            "url": "cars.json",
            "transform": [{ "type": "formula", "expr": "1", "as": "one" }]
        }])
    );
}

#[test]
fn required_outputs_chain_through_source() {
    let mut demand = DemandTable::new();
    let mut g = DataflowGraph::new();
    let root = g.add_root("source", url_source("cars.json"));
    let raw = g.add_under(root, "raw", output("cars_raw", &mut demand));
    let bin = g.add_under(
        raw,
        "bin",
        NodeKind::Bin {
            field: "b".to_owned(),
            r#as: ["bin_maxbins_10_b".to_owned(), "bin_maxbins_10_b_end".to_owned()],
            maxbins: 10,
        },
    );
    let main = g.add_under(bin, "main", output("cars_main", &mut demand));
    require(&g, raw, &mut demand);
    require(&g, main, &mut demand);

    let data = assemble(&mut g, &demand);

    assert_eq!(
        data,
        json!([
            { "name": "cars_raw", "url": "cars.json" },
            {
                "name": "cars_main",
                "source": "cars_raw",
                "transform": [
                    { "type": "extent", "field": "b", "signal": "bin_maxbins_10_b_extent" },
                    {
                        "type": "bin",
                        "field": "b",
                        "as": ["bin_maxbins_10_b", "bin_maxbins_10_b_end"],
                        "signal": "bin_maxbins_10_b_bins",
                        "extent": { "signal": "bin_maxbins_10_b_extent" },
                        "maxbins": 10
                    }
                ]
            }
        ])
    );
    assert_eq!(g.output(main).peek_source(), "cars_main");
}

#[test]
fn branch_point_gets_generated_name_and_outputs_alias_it() {
    let mut demand = DemandTable::new();
    let mut g = DataflowGraph::new();
    let root = g.add_root("source", url_source("cars.json"));
    let f = g.add_under(root, "f", formula("1", "one"));
    let o1 = g.add_under(f, "o1", output("v1_main", &mut demand));
    let o2 = g.add_under(f, "o2", output("v2_main", &mut demand));
    require(&g, o1, &mut demand);
    require(&g, o2, &mut demand);

    let data = assemble(&mut g, &demand);

    assert_eq!(
        data,
        json!([{
            "name": "data_0",
            "url": "cars.json",
            "transform": [{ "type": "formula", "expr": "1", "as": "one" }]
        }])
    );
    assert_eq!(g.output(o1).peek_source(), "data_0");
    assert_eq!(g.output(o2).peek_source(), "data_0");
}

#[test]
fn colliding_output_names_are_suffixed() {
    let mut demand = DemandTable::new();
    let mut g = DataflowGraph::new();
    let a = g.add_root("source", url_source("a.json"));
    let b = g.add_root("source", url_source("b.json"));
    let oa = g.add_under(a, "main", output("main", &mut demand));
    let ob = g.add_under(b, "main", output("main", &mut demand));
    require(&g, oa, &mut demand);

    let data = assemble(&mut g, &demand);

    assert_eq!(
        data,
        json!([
            { "name": "main", "url": "a.json" },
            { "name": "main_1", "url": "b.json" }
        ])
    );
    assert_eq!(g.output(ob).peek_source(), "main_1");
}

#[test]
fn transforms_below_last_output_are_dropped() {
    let mut demand = DemandTable::new();
    let mut g = DataflowGraph::new();
    let root = g.add_root("source", url_source("cars.json"));
    let main = g.add_under(root, "main", output("main", &mut demand));
    g.add_under(main, "f", formula("1", "one"));
    require(&g, main, &mut demand);

    let data = assemble(&mut g, &demand);

    assert_eq!(data, json!([{ "name": "main", "url": "cars.json" }]));
}

#[test]
fn assembled_sources_show_in_dump() {
    let mut demand = DemandTable::new();
    let mut g = DataflowGraph::new();
    let root = g.add_root("source", url_source("cars.json"));
    let f = g.add_under(root, "f", formula("1", "one"));
    let o1 = g.add_under(f, "o1", output("v1_main", &mut demand));
    g.add_under(f, "o2", output("v2_main", &mut demand));
    require(&g, o1, &mut demand);

    GraphAssembler::new(&mut g, &demand).assemble();

    insta::assert_snapshot!(GraphPrinter::new(&g).with_demand(&demand).dump(), @r"
    N0 source cars.json
      N1 formula one = 1
        N2 output v1_main => data_0 (1)
        N3 output v2_main (0)
    ");
}
