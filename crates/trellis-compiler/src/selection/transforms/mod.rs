//! Refinements applied on top of a selection compiler's output.
//!
//! Every transform whose `has` holds runs, in the order of [`transforms`],
//! at each compilation hook.

pub mod inputs;
pub mod latest;
pub mod nearest;
pub mod project;
pub mod scales;
pub mod toggle;
pub mod translate;
pub mod zoom;

use super::{SelectionComponent, UnitContext};
use crate::Result;
use crate::model::SelectionDef;
use crate::vega::{Mark, Signal};

pub trait SelectionTransform {
    fn name(&self) -> &'static str;

    fn has(&self, sel: &SelectionComponent) -> bool;

    fn parse(
        &self,
        _ctx: &UnitContext,
        _def: &SelectionDef,
        _sel: &mut SelectionComponent,
    ) -> Result<()> {
        Ok(())
    }

    fn signals(&self, _ctx: &UnitContext, _sel: &SelectionComponent, signals: Vec<Signal>) -> Vec<Signal> {
        signals
    }

    fn top_level_signals(
        &self,
        _ctx: &UnitContext,
        _sel: &SelectionComponent,
        signals: Vec<Signal>,
    ) -> Vec<Signal> {
        signals
    }

    fn modify_expr(&self, _ctx: &UnitContext, _sel: &SelectionComponent, expr: String) -> String {
        expr
    }

    fn marks(&self, _ctx: &UnitContext, _sel: &SelectionComponent, marks: Vec<Mark>) -> Vec<Mark> {
        marks
    }
}

/// All transforms in application order.
pub fn transforms() -> [&'static dyn SelectionTransform; 8] {
    [
        &project::Project,
        &toggle::Toggle,
        &scales::Scales,
        &translate::Translate,
        &zoom::Zoom,
        &inputs::Inputs,
        &nearest::Nearest,
        &latest::Latest,
    ]
}

/// Transforms that apply to `sel`, in order.
pub fn applicable(sel: &SelectionComponent) -> impl Iterator<Item = &'static dyn SelectionTransform> + '_ {
    transforms().into_iter().filter(move |t| t.has(sel))
}

/// Index of the signal named `name`.
pub(crate) fn find_signal(signals: &[Signal], name: &str) -> Option<usize> {
    signals.iter().position(|s| s.name == name)
}
