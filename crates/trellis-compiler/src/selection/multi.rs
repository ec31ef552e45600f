//! Point selection accumulating tuples.

use super::compiler::SelectionCompiler;
use super::single::{point_signals, remove_arg};
use super::{SelectionComponent, UnitContext};
use crate::vega::Signal;

pub struct MultiCompiler;

impl SelectionCompiler for MultiCompiler {
    fn signals(&self, ctx: &UnitContext, sel: &SelectionComponent) -> Vec<Signal> {
        point_signals(ctx, sel)
    }

    fn modify_expr(&self, ctx: &UnitContext, sel: &SelectionComponent) -> String {
        format!("{}, {}", sel.tuple(), remove_arg(ctx, sel, "null"))
    }

    fn predicate(&self) -> &str {
        "vlMulti"
    }

    fn scale_domain(&self) -> &str {
        "vlMultiDomain"
    }
}
