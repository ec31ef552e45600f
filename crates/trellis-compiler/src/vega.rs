//! Descriptors emitted for the execution engine.
//!
//! Engine-specific payloads (event streams, encode blocks) stay as
//! `serde_json::Value`; this crate never interprets them.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Value, json};

/// A reactive signal.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Signal {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub on: Vec<SignalHandler>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push: Option<String>,
}

impl Signal {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn update(mut self, expr: impl Into<String>) -> Self {
        self.update = Some(expr.into());
        self
    }

    pub fn on(mut self, handler: SignalHandler) -> Self {
        self.on.push(handler);
        self
    }

    pub fn bind(mut self, bind: Value) -> Self {
        self.bind = Some(bind);
        self
    }

    pub fn push(mut self, push: impl Into<String>) -> Self {
        self.push = Some(push.into());
        self
    }
}

/// An event handler updating a signal.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SignalHandler {
    pub events: Value,
    pub update: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub force: bool,
}

impl SignalHandler {
    pub fn new(events: impl Into<Value>, update: impl Into<String>) -> Self {
        Self {
            events: events.into(),
            update: update.into(),
            force: false,
        }
    }

    /// Fire on `signal` changes.
    pub fn on_signal(signal: &str, update: impl Into<String>) -> Self {
        Self::new(json!({ "signal": signal }), update)
    }

    pub fn force(mut self) -> Self {
        self.force = true;
        self
    }
}

/// A mark, including group marks that scope signals.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Mark {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Value>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub clip: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encode: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transform: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub signals: Vec<Signal>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
}

impl Mark {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            ..Self::default()
        }
    }

    pub fn from_data(mut self, data: impl Into<String>) -> Self {
        self.from = Some(json!({ "data": data.into() }));
        self
    }
}

/// A dataset in the engine's data section.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DataDescriptor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<FormatDescriptor>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transform: Vec<TransformDescriptor>,
}

impl DataDescriptor {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// A dataset deriving from `source`.
    pub fn derived(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FormatDescriptor {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub parse: IndexMap<String, String>,
}

/// One dataflow transform.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransformDescriptor {
    Formula {
        expr: String,
        r#as: String,
    },
    Filter {
        expr: String,
    },
    Extent {
        field: String,
        signal: String,
    },
    Bin {
        field: String,
        r#as: [String; 2],
        signal: String,
        extent: Value,
        maxbins: u32,
    },
    Aggregate {
        groupby: Vec<String>,
        ops: Vec<String>,
        fields: Vec<Option<String>>,
        r#as: Vec<String>,
    },
    Identifier {
        r#as: String,
    },
}
