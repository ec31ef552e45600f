//! Cross-view resolution of selections into predicate and domain
//! expressions.

use indexmap::IndexMap;
use serde_json::{Map, Value, json};
use tracing::warn;
use trellis_core::LogicalOperand;
use trellis_core::logical::try_logical_expr;
use trellis_core::utils::{string_value, var_name};

use super::compiler::SelectionRegistry;
use super::transforms::latest::UNIT;
use super::{SELECTION_DOMAIN, SelectionComponent};
use crate::model::{EmptyMode, ResolveMode, SelectionDomain};
use crate::{Error, Result};

/// A selection as declared in one view.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionInstance {
    /// Unit name of the declaring view.
    pub view: String,
    pub component: SelectionComponent,
}

/// Every instance of every selection, by selection name, in view order.
#[derive(Clone, Debug, Default)]
pub struct SelectionIndex {
    by_name: IndexMap<String, Vec<SelectionInstance>>,
}

impl SelectionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, view: impl Into<String>, component: SelectionComponent) {
        self.by_name
            .entry(component.name.clone())
            .or_default()
            .push(SelectionInstance {
                view: view.into(),
                component,
            });
    }

    pub fn get(&self, name: &str) -> Option<&[SelectionInstance]> {
        self.by_name
            .get(name)
            .map(Vec::as_slice)
            .filter(|instances| !instances.is_empty())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    /// Selections declared in `view`.
    pub fn in_view<'a>(&'a self, view: &'a str) -> impl Iterator<Item = &'a SelectionComponent> + 'a {
        self.by_name
            .values()
            .flatten()
            .filter(move |i| i.view == view)
            .map(|i| &i.component)
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

pub struct SelectionResolver<'a> {
    registry: &'a SelectionRegistry,
    index: &'a SelectionIndex,
}

impl<'a> SelectionResolver<'a> {
    pub fn new(registry: &'a SelectionRegistry, index: &'a SelectionIndex) -> Self {
        Self { registry, index }
    }

    pub fn index(&self) -> &'a SelectionIndex {
        self.index
    }

    /// Boolean expression testing `datum` against an operand tree of
    /// selection names.
    pub fn predicate(&self, op: &LogicalOperand<String>) -> Result<String> {
        try_logical_expr(op, &mut |name: &String| self.selection_predicate(name))
    }

    /// Predicate of one selection, merging its instances by resolve mode.
    ///
    /// The first declaring view decides the mode.
    pub fn selection_predicate(&self, name: &str) -> Result<String> {
        let vname = var_name(name);
        let instances = self.index.get(&vname).ok_or_else(|| Error::UnknownSelection {
            name: name.to_owned(),
        })?;
        let first = &instances[0].component;
        let tpl = self.registry.lookup(&first.name, &first.ty)?.predicate();
        let store = string_value(&first.store());
        let scoped = |view: &str| format!("{tpl}({store}, datum, {})", string_value(view));

        let pred = match first.resolve {
            ResolveMode::Global => format!("{tpl}({store}, datum)"),
            ResolveMode::Union | ResolveMode::Intersect if instances.len() == 1 => {
                scoped(&instances[0].view)
            }
            ResolveMode::Union | ResolveMode::Intersect => {
                let op = if first.resolve == ResolveMode::Union { " || " } else { " && " };
                instances
                    .iter()
                    .map(|i| format!("({})", scoped(&i.view)))
                    .collect::<Vec<_>>()
                    .join(op)
            }
            ResolveMode::Single => {
                let unit = format!("{vname}{UNIT}");
                instances.iter().rev().fold("false".to_owned(), |rest, i| {
                    format!("{unit} === {} ? ({}) : {rest}", string_value(&i.view), scoped(&i.view))
                })
            }
        };

        Ok(match first.empty {
            EmptyMode::All => pred,
            EmptyMode::None => format!("length(data({store})) && ({pred})"),
        })
    }

    /// Domain signal for a scale whose domain is a raw selection domain
    /// (see [`raw_selection_domain`]).
    ///
    /// A view cannot drive its own scale from a selection it declares; that
    /// yields a `null` domain.
    pub fn selection_scale_domain(&self, view: &str, raw: &Value) -> Result<Value> {
        let domain = parse_raw_selection_domain(raw)?;
        let name = var_name(&domain.selection);
        if self.index.in_view(view).any(|s| s.name == name) {
            warn!(view, selection = %name, "a selection cannot drive the scales of its own view");
            return Ok(json!({ "signal": "null" }));
        }

        let instances = self.index.get(&name).ok_or_else(|| Error::UnknownSelection {
            name: domain.selection.clone(),
        })?;
        let sel = &instances[0].component;
        let tpl = self.registry.lookup(&sel.name, &sel.ty)?.scale_domain();

        let mut field = domain.field.clone();
        if domain.encoding.is_none() && field.is_none() {
            if sel.project.len() > 1 {
                warn!(selection = %name, "domain uses the first of several projections");
            }
            field = sel.project.first().map(|p| p.field().to_owned());
        }
        let encoding = domain
            .encoding
            .map_or_else(|| "null".to_owned(), |c| string_value(c.as_str()));
        let field = field.map_or_else(|| "null".to_owned(), |f| string_value(&f));
        let resolve = match sel.resolve {
            ResolveMode::Global => String::new(),
            mode => format!(", {}", string_value(mode.as_str())),
        };

        Ok(json!({
            "signal": format!("{tpl}({}, {encoding}, {field}{resolve})", string_value(&sel.store()))
        }))
    }
}

/// Encode a selection-driven domain as a placeholder signal, resolved
/// once every view's selections are known.
pub fn raw_selection_domain(domain: &SelectionDomain) -> Value {
    let mut body = Map::new();
    body.insert("selection".into(), Value::String(domain.selection.clone()));
    if let Some(encoding) = domain.encoding {
        body.insert("encoding".into(), Value::String(encoding.as_str().to_owned()));
    }
    if let Some(field) = &domain.field {
        body.insert("field".into(), Value::String(field.clone()));
    }
    json!({ "signal": format!("{SELECTION_DOMAIN}{}", Value::Object(body)) })
}

pub fn is_raw_selection_domain(value: &Value) -> bool {
    value
        .get("signal")
        .and_then(Value::as_str)
        .is_some_and(|s| s.starts_with(SELECTION_DOMAIN))
}

fn parse_raw_selection_domain(value: &Value) -> Result<SelectionDomain> {
    if !is_raw_selection_domain(value) {
        return Err(Error::InvalidModel(format!("not a selection domain: {value}")));
    }
    let body = value
        .get("signal")
        .and_then(Value::as_str)
        .and_then(|s| s.strip_prefix(SELECTION_DOMAIN))
        .ok_or_else(|| Error::InvalidModel("not a selection domain".to_owned()))?;
    serde_json::from_str(body).map_err(|e| Error::InvalidModel(format!("selection domain: {e}")))
}
