//! Voronoi cells so point selections snap to the nearest datum.

use serde_json::json;
use tracing::warn;

use super::SelectionTransform;
use crate::selection::{SelectionComponent, UnitContext, positional_projections};
use crate::vega::Mark;

pub const VORONOI: &str = "voronoi";

pub struct Nearest;

/// Whether point signals should read through voronoi cells.
pub fn applies(sel: &SelectionComponent) -> bool {
    sel.ty != "interval" && sel.nearest
}

impl SelectionTransform for Nearest {
    fn name(&self) -> &'static str {
        "nearest"
    }

    fn has(&self, sel: &SelectionComponent) -> bool {
        applies(sel)
    }

    fn marks(&self, ctx: &UnitContext, sel: &SelectionComponent, mut marks: Vec<Mark>) -> Vec<Mark> {
        if matches!(ctx.mark(), "line" | "area" | "trail") {
            warn!(selection = %sel.name, mark = ctx.mark(), "nearest is not supported for path marks");
            return marks;
        }
        let proj = positional_projections(sel);
        let neither = proj.x.is_none() && proj.y.is_none();
        let x = if proj.x.is_some() || neither { "datum.datum.x || 0" } else { "0" };
        let y = if proj.y.is_some() || neither { "datum.datum.y || 0" } else { "0" };

        let primary = ctx.get_name("marks");
        let mut index = 0;
        let mut exists = false;
        for (i, mark) in marks.iter().enumerate() {
            if mark.name == primary {
                index = i;
            } else if mark.name.contains(VORONOI) {
                exists = true;
            }
        }
        if exists {
            return marks;
        }

        let mut cell = Mark::new(ctx.get_name(VORONOI), "path").from_data(primary);
        cell.encode = Some(json!({
            "enter": {
                "fill": {"value": "transparent"},
                "strokeWidth": {"value": 0.35},
                "stroke": {"value": "transparent"},
                "isVoronoi": {"value": true}
            }
        }));
        cell.transform = vec![json!({
            "type": "voronoi",
            "x": {"expr": x},
            "y": {"expr": y},
            "size": [{"signal": "width"}, {"signal": "height"}]
        })];

        let at = (index + 1).min(marks.len());
        marks.insert(at, cell);
        marks
    }
}
