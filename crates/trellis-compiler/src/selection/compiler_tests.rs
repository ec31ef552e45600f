//! Tests for the compiler registry and the point selection compilers.

use serde_json::json;

use super::transforms::SelectionTransform;
use super::transforms::inputs::Inputs;
use super::*;
use crate::Error;
use crate::model::ResolveMode;
use crate::test_utils::{ctx, view};
use crate::vega::{Signal, SignalHandler};

struct Lasso;

impl SelectionCompiler for Lasso {
    fn signals(&self, _ctx: &UnitContext, sel: &SelectionComponent) -> Vec<Signal> {
        vec![Signal::new(sel.tuple()).value(json!(null))]
    }

    fn modify_expr(&self, _ctx: &UnitContext, sel: &SelectionComponent) -> String {
        format!("{}, true", sel.tuple())
    }

    fn predicate(&self) -> &str {
        "vlLasso"
    }

    fn scale_domain(&self) -> &str {
        "vlLassoDomain"
    }
}

fn cars() -> crate::model::UnitView {
    view(r#"{"name": "cars", "data": {"url": "cars.json"}}"#)
}

fn point(ty: &str) -> SelectionComponent {
    let mut sel = SelectionComponent::new("pick", ty);
    sel.events = json!("click");
    sel.project = vec![ProjectComponent::Field("_vgsid_".to_owned())];
    sel
}

#[test]
fn default_registry_has_builtin_types() {
    let registry = SelectionRegistry::default();

    assert_eq!(registry.tags().collect::<Vec<_>>(), ["single", "multi", "interval"]);
    assert_eq!(format!("{registry:?}"), r#"["single", "multi", "interval"]"#);
    assert_eq!(registry.get("interval").map(|c| c.predicate()), Some("vlInterval"));
}

#[test]
fn unsupported_type_names_selection_and_tag() {
    let registry = SelectionRegistry::default();

    let err = registry.lookup("pick", "frobnicate").err().unwrap();

    assert!(matches!(&err, Error::UnsupportedSelectionType { selection, ty }
        if selection == "pick" && ty == "frobnicate"));
    assert_eq!(
        err.to_string(),
        "unsupported selection type `frobnicate` for selection `pick`"
    );
}

#[test]
fn custom_compiler_registers_without_dispatch_changes() {
    let mut registry = SelectionRegistry::empty();

    assert!(registry.register("lasso", Lasso).is_none());
    assert!(registry.register("lasso", Lasso).is_some());

    let compiler = registry.lookup("l", "lasso").unwrap();
    assert_eq!(compiler.predicate(), "vlLasso");
    assert_eq!(compiler.scale_domain(), "vlLassoDomain");
    assert!(registry.get("single").is_none());
}

#[test]
fn single_tuple_signal_captures_projected_values() {
    let v = cars();
    let signals = SingleCompiler.signals(&ctx(&v), &point("single"));

    assert_eq!(
        signals,
        vec![
            Signal::new("pick_tuple").value(json!({})).on(SignalHandler::new(
                "click",
                r#"datum && item().mark.marktype !== 'group' ? {unit: "cars", encodings: [null], fields: ["_vgsid_"], values: [datum["_vgsid_"]]} : null"#,
            )
            .force())
        ]
    );
}

#[test]
fn encoding_projection_names_its_channel() {
    let v = cars();
    let mut sel = point("single");
    sel.project = vec![ProjectComponent::Encoding {
        channel: trellis_core::Channel::Color,
        field: "Origin".to_owned(),
    }];

    let signals = SingleCompiler.signals(&ctx(&v), &sel);

    assert!(signals[0].on[0].update.contains(r#"encodings: ["color"], fields: ["Origin"], values: [datum["Origin"]]"#));
}

#[test]
fn nearest_reads_through_voronoi_datum() {
    let v = cars();
    let mut sel = point("multi");
    sel.nearest = true;

    let signals = MultiCompiler.signals(&ctx(&v), &sel);

    assert!(signals[0].on[0]
        .update
        .contains(r#"values: [(item().isVoronoi ? datum.datum : datum)["_vgsid_"]]"#));
}

#[test]
fn single_modify_replaces_store() {
    let v = cars();
    let mut sel = point("single");

    assert_eq!(SingleCompiler.modify_expr(&ctx(&v), &sel), "pick_tuple, true");

    sel.resolve = ResolveMode::Union;
    assert_eq!(
        SingleCompiler.modify_expr(&ctx(&v), &sel),
        r#"pick_tuple, {unit: "cars"}"#
    );
}

#[test]
fn multi_modify_accumulates() {
    let v = cars();
    let sel = point("multi");

    assert_eq!(MultiCompiler.modify_expr(&ctx(&v), &sel), "pick_tuple, null");
}

#[test]
fn toggle_rewrites_modify_and_adds_signal() {
    let v = cars();
    let mut sel = point("multi");
    sel.toggle = Some("event.shiftKey".to_owned());
    let selections = indexmap::IndexMap::from([("pick".to_owned(), sel)]);

    let signals =
        assemble_unit_selection_signals(&ctx(&v), &selections, &SelectionRegistry::default(), Vec::new())
            .unwrap();

    let names: Vec<&str> = signals.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["pick_tuple", "pick_toggle", "pick_modify"]);
    assert_eq!(
        signals[1],
        Signal::new("pick_toggle")
            .value(json!(false))
            .on(SignalHandler::new("click", "event.shiftKey"))
    );
    assert_eq!(
        signals[2].on[0],
        SignalHandler::on_signal(
            "pick_tuple",
            r#"modify("pick_store", pick_toggle ? null : pick_tuple, pick_toggle ? null : true, pick_toggle ? pick_tuple : null)"#,
        )
    );
}

#[test]
fn unit_signal_and_store_are_added_once() {
    let v = cars();
    let selections = indexmap::IndexMap::from([("pick".to_owned(), point("single"))]);
    let registry = SelectionRegistry::default();

    let top = assemble_top_level_signals(&ctx(&v), &selections, &registry, Vec::new()).unwrap();
    let top = assemble_top_level_signals(&ctx(&v), &selections, &registry, top).unwrap();
    let data = assemble_unit_selection_data(&selections, Vec::new());
    let data = assemble_unit_selection_data(&selections, data);

    assert_eq!(top.iter().filter(|s| s.name == "unit").count(), 1);
    assert_eq!(top[0].on[0].update, "isTuple(group()) ? group() : unit");
    assert_eq!(data.len(), 1);
    assert_eq!(data[0].name, "pick_store");
}

#[test]
fn bound_inputs_drive_the_tuple() {
    let v = cars();
    let mut sel = point("single");
    sel.project = vec![ProjectComponent::Field("Cylinders".to_owned())];
    sel.bind = Some(SelectionBind::Input(json!({"input": "range"})));
    let c = ctx(&v);

    let signals = Inputs.signals(&c, &sel, SingleCompiler.signals(&c, &sel));

    assert_eq!(signals[0].name, "pick_tuple");
    assert_eq!(
        signals[0].update.as_deref(),
        Some(r#"pick_Cylinders ? {fields: ["Cylinders"], values: [pick_Cylinders]} : null"#)
    );
    assert_eq!(signals[0].value, None);
    assert!(signals[0].on.is_empty());
}

#[test]
fn bound_inputs_without_projection_leave_tuple_empty() {
    let v = cars();
    let mut sel = point("single");
    sel.project.clear();
    sel.bind = Some(SelectionBind::Input(json!({"input": "range"})));
    let c = ctx(&v);

    let signals = Inputs.signals(&c, &sel, SingleCompiler.signals(&c, &sel));

    assert_eq!(signals[0].update.as_deref(), Some("null"));
    assert!(signals[0].on.is_empty());
}
