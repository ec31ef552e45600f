//! Compiler configuration.

use serde::Deserialize;
use serde_json::{Value, json};
use trellis_core::Channel;

use crate::model::{EmptyMode, ResolveMode};

const INTERVAL_EVENTS: &str = "[mousedown, window:mouseup] > window:mousemove!";

/// Configuration for a compile invocation.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    /// Per-type selection defaults
    pub(crate) selection: SelectionConfig,
    /// Whether to run the dataflow optimizer
    pub(crate) optimize: bool,
    /// Upper bound on optimizer fixpoint rounds
    pub(crate) max_optimize_iterations: usize,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            selection: SelectionConfig::default(),
            optimize: true,
            max_optimize_iterations: 32,
        }
    }
}

impl CompileConfig {
    /// Create a new CompileConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the selection defaults.
    pub fn selection(mut self, value: SelectionConfig) -> Self {
        self.selection = value;
        self
    }

    /// Set whether to run the optimizer.
    pub fn optimize(mut self, value: bool) -> Self {
        self.optimize = value;
        self
    }

    /// Set the optimizer iteration bound.
    pub fn max_optimize_iterations(mut self, value: usize) -> Self {
        self.max_optimize_iterations = value;
        self
    }

    pub fn selection_config(&self) -> &SelectionConfig {
        &self.selection
    }
}

/// Defaults applied to selection definitions, keyed by selection type.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub single: SelectionDefaults,
    pub multi: SelectionDefaults,
    pub interval: SelectionDefaults,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            single: SelectionDefaults {
                on: Some(json!("click")),
                fields: vec![crate::selection::SELECTION_ID.to_owned()],
                ..SelectionDefaults::default()
            },
            multi: SelectionDefaults {
                on: Some(json!("click")),
                fields: vec![crate::selection::SELECTION_ID.to_owned()],
                toggle: Some("event.shiftKey".to_owned()),
                ..SelectionDefaults::default()
            },
            interval: SelectionDefaults {
                on: Some(json!(INTERVAL_EVENTS)),
                encodings: vec![Channel::X, Channel::Y],
                translate: Some(INTERVAL_EVENTS.to_owned()),
                zoom: Some("wheel!".to_owned()),
                mark: Some(json!({"fill": "#333", "fillOpacity": 0.125, "stroke": "white"})),
                ..SelectionDefaults::default()
            },
        }
    }
}

impl SelectionConfig {
    /// Defaults for a selection type. Unknown (custom) types get none.
    pub fn defaults_for(&self, ty: &str) -> Option<&SelectionDefaults> {
        match ty {
            "single" => Some(&self.single),
            "multi" => Some(&self.multi),
            "interval" => Some(&self.interval),
            _ => None,
        }
    }
}

/// Default values for one selection type.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SelectionDefaults {
    pub on: Option<Value>,
    pub resolve: ResolveMode,
    pub empty: EmptyMode,
    pub fields: Vec<String>,
    pub encodings: Vec<Channel>,
    pub toggle: Option<String>,
    pub translate: Option<String>,
    pub zoom: Option<String>,
    pub nearest: bool,
    pub mark: Option<Value>,
}
