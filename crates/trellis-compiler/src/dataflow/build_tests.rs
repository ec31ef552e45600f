//! Tests for lowering views into the dataflow forest.

use indoc::indoc;

use super::*;
use crate::Error;
use crate::model::UnitView;
use crate::selection::{ProjectComponent, SelectionComponent, SelectionIndex, SelectionRegistry, SelectionResolver};
use crate::test_utils::{interval, view};

fn build(views: &[UnitView], index: &SelectionIndex) -> (DataflowGraph, DemandTable, Vec<ViewOutputs>) {
    let registry = SelectionRegistry::default();
    let resolver = SelectionResolver::new(&registry, index);
    let mut graph = DataflowGraph::new();
    let mut demand = DemandTable::new();
    let mut outputs = Vec::new();
    {
        let mut builder = GraphBuilder::new(&mut graph, &mut demand);
        for v in views {
            outputs.push(builder.build_view(v, &resolver).expect("view builds"));
        }
    }
    (graph, demand, outputs)
}

#[test]
fn plain_view_parses_continuous_fields() {
    let v = view(indoc! {r#"
        {
          "name": "cars",
          "data": {"url": "cars.json"},
          "encoding": {
            "x": {"field": "Horsepower", "type": "quantitative"},
            "y": {"field": "Origin", "type": "nominal"}
          }
        }
    "#});

    let (g, demand, outputs) = build(&[v], &SelectionIndex::new());

    insta::assert_snapshot!(GraphPrinter::new(&g).with_demand(&demand).dump(), @r"
    N0 source cars.json
      N1 parse Horsepower:number
        N2 output cars_raw (0)
          N3 output cars_main (0)
    ");
    assert_eq!(g.output(outputs[0].raw).name(), "cars_raw");
    assert_eq!(g.output(outputs[0].main).kind(), OutputKind::Main);
}

#[test]
fn transforms_bins_time_units_and_aggregates_in_order() {
    let v = view(indoc! {r#"
        {
          "name": "v",
          "data": {"url": "cars.json"},
          "transform": [
            {"calculate": "datum.Horsepower * 2", "as": "hp2"},
            {"filter": "datum.hp2 > 100"}
          ],
          "encoding": {
            "x": {"field": "Horsepower", "type": "quantitative", "bin": true},
            "y": {"aggregate": "count", "type": "quantitative"},
            "color": {"field": "Year", "type": "temporal", "timeUnit": "year"}
          }
        }
    "#});

    let (g, _, _) = build(&[v], &SelectionIndex::new());

    insta::assert_snapshot!(g.dump(), @r"
    N0 source cars.json
      N1 formula hp2 = datum.Horsepower * 2
        N2 filter datum.hp2 > 100
          N3 parse Horsepower:number, Year:date
            N4 output v_raw
              N5 bin Horsepower -> bin_maxbins_10_Horsepower, bin_maxbins_10_Horsepower_end
                N6 timeunit year(Year) -> year_Year
                  N7 aggregate [bin_maxbins_10_Horsepower, bin_maxbins_10_Horsepower_end, year_Year] count(*) -> count_*
                    N8 output v_main
    ");
}

#[test]
fn calculated_fields_are_not_parsed() {
    let v = view(indoc! {r#"
        {
          "name": "v",
          "data": {"url": "cars.json"},
          "transform": [{"calculate": "datum.a * 2", "as": "b"}],
          "encoding": {"x": {"field": "b", "type": "quantitative"}}
        }
    "#});

    let (g, _, _) = build(&[v], &SelectionIndex::new());

    assert!(g.walk_all().iter().all(|&id| !g.kind(id).is_parse()));
}

#[test]
fn views_over_same_data_share_a_source() {
    let a = view(r#"{"name": "a", "data": {"url": "cars.json"}}"#);
    let b = view(r#"{"name": "b", "data": {"url": "cars.json"}}"#);
    let c = view(r#"{"name": "c", "data": {"values": [{"a": 1}]}}"#);

    let (g, _, _) = build(&[a, b, c], &SelectionIndex::new());

    insta::assert_snapshot!(g.dump(), @r"
    N0 source cars.json
      N1 output a_raw
        N2 output a_main
      N3 output b_raw
        N4 output b_main
    N5 source values(1)
      N6 output c_raw
        N7 output c_main
    ");
}

#[test]
fn point_selection_adds_identifier() {
    let v = view(r#"{"name": "v", "data": {"url": "cars.json"}}"#);
    let mut sel = SelectionComponent::new("pick", "single");
    sel.project = vec![ProjectComponent::Field("_vgsid_".to_owned())];
    let mut index = SelectionIndex::new();
    index.insert("v", sel);

    let (g, _, _) = build(&[v], &index);

    insta::assert_snapshot!(g.dump(), @r"
    N0 source cars.json
      N1 identifier
        N2 output v_raw
          N3 output v_main
    ");
}

#[test]
fn selection_filter_expands_to_predicate() {
    let v = view(indoc! {r#"
        {
          "name": "detail",
          "data": {"url": "cars.json"},
          "transform": [{"filter": {"selection": {"not": "brush"}}}]
        }
    "#});
    let mut index = SelectionIndex::new();
    index.insert("overview", interval("brush"));

    let (g, _, _) = build(&[v], &index);

    let filter = g.children(g.roots()[0])[0];
    assert_eq!(
        g.kind(filter),
        &NodeKind::Filter {
            expr: r#"!(vlInterval("brush_store", datum))"#.to_owned(),
            fields: FieldSet::new(),
        }
    );
}

#[test]
fn unknown_selection_in_filter_fails() {
    let v = view(r#"{"name": "v", "data": {"url": "cars.json"}, "transform": [{"filter": {"selection": "nope"}}]}"#);
    let registry = SelectionRegistry::default();
    let index = SelectionIndex::new();
    let resolver = SelectionResolver::new(&registry, &index);
    let mut graph = DataflowGraph::new();
    let mut demand = DemandTable::new();

    let err = GraphBuilder::new(&mut graph, &mut demand)
        .build_view(&v, &resolver)
        .unwrap_err();

    assert!(matches!(err, Error::UnknownSelection { name } if name == "nope"));
}

#[test]
fn unknown_time_unit_fails() {
    let v = view(indoc! {r#"
        {
          "name": "v",
          "data": {"url": "cars.json"},
          "encoding": {"x": {"field": "date", "type": "temporal", "timeUnit": "week"}}
        }
    "#});
    let registry = SelectionRegistry::default();
    let index = SelectionIndex::new();
    let resolver = SelectionResolver::new(&registry, &index);
    let mut graph = DataflowGraph::new();
    let mut demand = DemandTable::new();

    let err = GraphBuilder::new(&mut graph, &mut demand)
        .build_view(&v, &resolver)
        .unwrap_err();

    assert_eq!(
        err,
        Error::InvalidModel("unknown time unit `week` on field `date`".to_owned())
    );
}
