//! Shift-click style toggling for multi selections.

use trellis_core::utils::string_value;

use super::SelectionTransform;
use crate::model::ResolveMode;
use crate::selection::{SelectionComponent, UnitContext};
use crate::vega::{Signal, SignalHandler};

pub const TOGGLE: &str = "_toggle";

pub struct Toggle;

impl SelectionTransform for Toggle {
    fn name(&self) -> &'static str {
        "toggle"
    }

    fn has(&self, sel: &SelectionComponent) -> bool {
        sel.ty == "multi" && sel.toggle.is_some()
    }

    fn signals(&self, _ctx: &UnitContext, sel: &SelectionComponent, mut signals: Vec<Signal>) -> Vec<Signal> {
        let toggle = sel.toggle.clone().unwrap_or_default();
        signals.push(
            Signal::new(format!("{}{TOGGLE}", sel.name))
                .value(false.into())
                .on(SignalHandler::new(sel.events.clone(), toggle)),
        );
        signals
    }

    fn modify_expr(&self, ctx: &UnitContext, sel: &SelectionComponent, _expr: String) -> String {
        let tuple = sel.tuple();
        let signal = format!("{}{TOGGLE}", sel.name);
        let remove = match sel.resolve {
            ResolveMode::Global => "true".to_owned(),
            _ => format!("{{unit: {}}}", string_value(&ctx.unit_name())),
        };
        format!("{signal} ? null : {tuple}, {signal} ? null : {remove}, {signal} ? {tuple} : null")
    }
}
