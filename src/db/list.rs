//! Multi-value text fields (project tech stacks, skill items).
//!
//! The store has handed these back as JSON arrays, as comma-delimited strings
//! and as Postgres array literals (`{Rust,"Web Dev"}`). Everything is coerced
//! into a [`TagList`] on the way in; nothing downstream sees the raw shapes.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Shapes a list field can arrive in.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawList {
    Sequence(Vec<String>),
    Delimited(String),
    Other(Value),
}

/// Canonical ordered sequence of trimmed, non-empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagList(Vec<String>);

impl TagList {
    pub fn new(items: Vec<String>) -> Self {
        normalize(RawList::Sequence(items))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<RawList> for TagList {
    fn from(raw: RawList) -> Self {
        normalize(raw)
    }
}

impl<'de> Deserialize<'de> for TagList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawList::deserialize(deserializer).map(normalize)
    }
}

pub fn normalize(raw: RawList) -> TagList {
    match raw {
        RawList::Sequence(items) => TagList(clean(items.into_iter())),
        RawList::Delimited(text) => TagList(split_delimited(&text)),
        RawList::Other(Value::Array(values)) => TagList(clean(
            values
                .into_iter()
                .filter_map(|v| v.as_str().map(str::to_string)),
        )),
        RawList::Other(_) => TagList::default(),
    }
}

fn clean(items: impl Iterator<Item = String>) -> Vec<String> {
    items
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Splits `"a, b"` or `"{a,\"b c\"}"` into trimmed segments.
fn split_delimited(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    let braced = trimmed.starts_with('{') || trimmed.ends_with('}');
    let body = trimmed.trim_matches(|c| c == '{' || c == '}');

    body.split(',')
        .map(|segment| {
            let segment = segment.trim();
            if braced {
                segment.trim_matches('"').trim()
            } else {
                segment
            }
        })
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}
