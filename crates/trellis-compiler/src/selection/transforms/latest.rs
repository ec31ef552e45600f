//! Tracks which view last updated a `single`-resolved selection.
//!
//! Predicates for such selections test `<name>_unit` to pick the one
//! active instance.

use serde_json::Value;
use trellis_core::utils::string_value;

use super::{SelectionTransform, find_signal};
use crate::model::ResolveMode;
use crate::selection::{SelectionComponent, UnitContext};
use crate::vega::{Signal, SignalHandler};

pub const UNIT: &str = "_unit";

pub struct Latest;

impl SelectionTransform for Latest {
    fn name(&self) -> &'static str {
        "latest"
    }

    fn has(&self, sel: &SelectionComponent) -> bool {
        sel.resolve == ResolveMode::Single
    }

    fn signals(&self, ctx: &UnitContext, sel: &SelectionComponent, mut signals: Vec<Signal>) -> Vec<Signal> {
        let handler = SignalHandler::on_signal(&sel.tuple(), string_value(&ctx.unit_name()));
        let signal = Signal::new(format!("{}{UNIT}", sel.name)).on(handler);
        signals.push(if ctx.composed {
            signal.push("outer")
        } else {
            signal.value(Value::Null)
        });
        signals
    }

    fn top_level_signals(
        &self,
        ctx: &UnitContext,
        sel: &SelectionComponent,
        mut signals: Vec<Signal>,
    ) -> Vec<Signal> {
        let name = format!("{}{UNIT}", sel.name);
        if ctx.composed && find_signal(&signals, &name).is_none() {
            signals.push(Signal::new(name).value(Value::Null));
        }
        signals
    }
}
