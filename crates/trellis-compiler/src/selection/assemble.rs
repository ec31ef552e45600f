//! Assembles selection output for one unit view.

use indexmap::IndexMap;
use serde_json::json;
use trellis_core::utils::string_value;

use super::compiler::SelectionRegistry;
use super::transforms::applicable;
use super::{MODIFY, SelectionComponent, UnitContext};
use crate::Result;
use crate::vega::{DataDescriptor, Mark, Signal, SignalHandler};

type Selections = IndexMap<String, SelectionComponent>;

/// Append the view-scoped signals of every selection, each followed by
/// its `<name>_modify` signal.
pub fn assemble_unit_selection_signals(
    ctx: &UnitContext,
    selections: &Selections,
    registry: &SelectionRegistry,
    mut signals: Vec<Signal>,
) -> Result<Vec<Signal>> {
    for sel in selections.values() {
        let compiler = registry.lookup(&sel.name, &sel.ty)?;
        let mut modify = compiler.modify_expr(ctx, sel);
        signals.extend(compiler.signals(ctx, sel));

        for transform in applicable(sel) {
            signals = transform.signals(ctx, sel, signals);
            modify = transform.modify_expr(ctx, sel, modify);
        }

        signals.push(
            Signal::new(format!("{}{MODIFY}", sel.name)).on(SignalHandler::new(
                json!({ "signal": sel.tuple() }),
                format!("modify({}, {modify})", string_value(&sel.store())),
            )),
        );
    }
    Ok(signals)
}

/// Add signals that live above the view, plus the shared `unit` signal
/// when the view declares any selection.
pub fn assemble_top_level_signals(
    ctx: &UnitContext,
    selections: &Selections,
    registry: &SelectionRegistry,
    mut signals: Vec<Signal>,
) -> Result<Vec<Signal>> {
    for sel in selections.values() {
        let compiler = registry.lookup(&sel.name, &sel.ty)?;
        signals = compiler.top_level_signals(ctx, sel, signals);
        for transform in applicable(sel) {
            signals = transform.top_level_signals(ctx, sel, signals);
        }
    }

    if !selections.is_empty() && !signals.iter().any(|s| s.name == "unit") {
        signals.insert(
            0,
            Signal::new("unit").value(json!({})).on(SignalHandler::new(
                "mousemove",
                "isTuple(group()) ? group() : unit",
            )),
        );
    }
    Ok(signals)
}

/// One `<name>_store` dataset per selection name.
pub fn assemble_unit_selection_data(selections: &Selections, mut data: Vec<DataDescriptor>) -> Vec<DataDescriptor> {
    for sel in selections.values() {
        let store = sel.store();
        if !data.iter().any(|d| d.name == store) {
            data.push(DataDescriptor::named(store));
        }
    }
    data
}

pub fn assemble_unit_selection_marks(
    ctx: &UnitContext,
    selections: &Selections,
    registry: &SelectionRegistry,
    mut marks: Vec<Mark>,
) -> Result<Vec<Mark>> {
    for sel in selections.values() {
        let compiler = registry.lookup(&sel.name, &sel.ty)?;
        marks = compiler.marks(ctx, sel, marks);
        for transform in applicable(sel) {
            marks = transform.marks(ctx, sel, marks);
        }
    }
    Ok(marks)
}
