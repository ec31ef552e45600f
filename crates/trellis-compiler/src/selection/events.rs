//! Event stream strings in the engine's selector syntax.
//!
//! Only the shapes selections rewrite are understood: a plain stream
//! (`click`, `wheel!`) and a between stream (`[mousedown, mouseup] > mousemove`).

use serde_json::Value;

/// A `[start, end] > target` stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Between {
    pub start: String,
    pub end: String,
    pub target: String,
}

impl Between {
    pub fn parse(stream: &str) -> Option<Self> {
        let stream = stream.trim();
        let inner = stream.strip_prefix('[')?;

        let mut depth = 0usize;
        let mut comma = None;
        let mut close = None;
        for (i, c) in inner.char_indices() {
            match c {
                '[' => depth += 1,
                ']' if depth == 0 => {
                    close = Some(i);
                    break;
                }
                ']' => depth -= 1,
                ',' if depth == 0 && comma.is_none() => comma = Some(i),
                _ => {}
            }
        }
        let (comma, close) = (comma?, close?);
        let target = inner[close + 1..].trim().strip_prefix('>')?.trim();
        if target.is_empty() {
            return None;
        }

        Some(Self {
            start: inner[..comma].trim().to_owned(),
            end: inner[comma + 1..close].trim().to_owned(),
            target: target.to_owned(),
        })
    }

    /// Only fire `start` when `filter` holds.
    pub fn filter_start(mut self, filter: &str) -> Self {
        self.start = format!("{}[{filter}]", self.start);
        self
    }

    /// Only fire `start` on marks named `markname`.
    pub fn start_on_mark(mut self, markname: &str) -> Self {
        self.start = on_mark(&self.start, markname);
        self
    }

    pub fn to_stream(&self) -> String {
        format!("[{}, {}] > {}", self.start, self.end, self.target)
    }
}

/// Restrict a plain stream to marks named `markname`.
///
/// Streams that already name a mark or a source are left alone.
pub fn on_mark(stream: &str, markname: &str) -> String {
    let stream = stream.trim();
    let names_source = stream
        .split(['[', '{'])
        .next()
        .is_some_and(|head| head.contains(':'));
    if stream.starts_with('@') || stream.starts_with('[') || names_source {
        stream.to_owned()
    } else {
        format!("@{markname}:{stream}")
    }
}

/// The stream strings in a selection's `on`.
pub fn streams(events: &Value) -> Vec<String> {
    match events {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_owned))
            .collect(),
        _ => Vec::new(),
    }
}
