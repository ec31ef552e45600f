//! Turns selection definitions into components.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, trace};

use super::compiler::SelectionRegistry;
use super::transforms::applicable;
use super::{SelectionBind, SelectionComponent, UnitContext};
use crate::Result;
use crate::config::{SelectionConfig, SelectionDefaults};
use crate::model::SelectionDef;

/// Parse every selection declared on a unit view.
///
/// Each type is looked up before anything is derived from its definition,
/// so an unsupported type aborts without partial output.
pub fn parse_unit_selection(
    ctx: &UnitContext,
    defs: &IndexMap<String, SelectionDef>,
    registry: &SelectionRegistry,
    config: &SelectionConfig,
) -> Result<IndexMap<String, SelectionComponent>> {
    let mut out = IndexMap::new();
    for (name, def) in defs {
        registry.lookup(name, &def.ty)?;

        let def = with_defaults(def, config.defaults_for(&def.ty));
        let mut sel = SelectionComponent::new(name, def.ty.clone());
        sel.events = def.on.clone().unwrap_or(Value::Null);
        sel.bind = def.bind.as_ref().map(SelectionBind::from_value);
        sel.resolve = def.resolve.unwrap_or_default();
        sel.empty = def.empty.unwrap_or_default();
        sel.toggle = flag(def.toggle.as_ref());
        sel.translate = flag(def.translate.as_ref());
        sel.zoom = flag(def.zoom.as_ref());
        sel.nearest = def.nearest.unwrap_or(false);
        sel.mark = def.mark.clone();

        let transforms: Vec<_> = applicable(&sel).collect();
        for transform in transforms {
            trace!(selection = %sel.name, transform = transform.name(), "parse");
            transform.parse(ctx, &def, &mut sel)?;
        }

        debug!(
            view = %ctx.unit_name(),
            selection = %sel.name,
            ty = %sel.ty,
            projections = sel.project.len(),
            "parsed selection"
        );
        out.insert(sel.name.clone(), sel);
    }
    Ok(out)
}

/// Fill what `def` leaves unset from the type's defaults.
///
/// Default `fields`/`encodings` only apply when the definition names
/// neither of them (nor an explicit `project`). `true` for a
/// toggle/translate/zoom flag means the default value.
fn with_defaults(def: &SelectionDef, defaults: Option<&SelectionDefaults>) -> SelectionDef {
    let mut def = def.clone();
    let Some(defaults) = defaults else {
        return def;
    };

    if def.on.is_none() {
        def.on = defaults.on.clone();
    }
    if def.resolve.is_none() {
        def.resolve = Some(defaults.resolve);
    }
    if def.empty.is_none() {
        def.empty = Some(defaults.empty);
    }
    if def.fields.is_none() && def.encodings.is_none() && def.project.is_none() {
        if !defaults.fields.is_empty() {
            def.fields = Some(defaults.fields.clone());
        }
        if !defaults.encodings.is_empty() {
            def.encodings = Some(defaults.encodings.clone());
        }
    }
    def.toggle = default_flag(def.toggle.take(), defaults.toggle.as_deref());
    def.translate = default_flag(def.translate.take(), defaults.translate.as_deref());
    def.zoom = default_flag(def.zoom.take(), defaults.zoom.as_deref());
    if def.nearest.is_none() {
        def.nearest = Some(defaults.nearest);
    }
    def.mark = match (defaults.mark.clone(), def.mark.take()) {
        (Some(Value::Object(mut base)), Some(Value::Object(over))) => {
            base.extend(over);
            Some(Value::Object(base))
        }
        (base, over) => over.or(base),
    };
    def
}

fn default_flag(value: Option<Value>, default: Option<&str>) -> Option<Value> {
    match value {
        None | Some(Value::Bool(true)) => default.map(|d| Value::String(d.to_owned())).or(value),
        other => other,
    }
}

/// `false` disables a flag; a string is its expression or event stream.
fn flag(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Bool(true) => Some("true".to_owned()),
        _ => None,
    }
}
