//! Compiled output of the field tree builder
//!
//! A built form is a tree of [`FieldDefinition`] nodes: tag, merged props,
//! ordered children and an optional item descriptor for list containers.
//! The tree is renderer-agnostic; adapters convert it to their native output.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Prop keys the builder writes into emitted nodes.
pub mod prop_keys {
    pub const PATH: &str = "path";
    pub const CHILD_OF: &str = "childOf";
    pub const OPERATION: &str = "operation";
    pub const VALUE: &str = "value";
    pub const TYPE: &str = "type";
    pub const FORMAT: &str = "format";
    pub const HANDLERS: &str = "handlers";
    pub const RENDERER_ID: &str = "rendererId";
    pub const LAYOUT: &str = "layout";
    pub const PAGES: &str = "pages";
    pub const COL: &str = "col";
    pub const ROW: &str = "row";
    pub const PAGE: &str = "page";
}

/// Ordered key→value map of node props.
///
/// A `BTreeMap` keeps serialization order stable, so two builds of the same
/// model produce byte-identical output.
pub type PropMap = BTreeMap<String, PropValue>;

/// Value of a single prop on a field node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    /// Null / unset value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Integer(i64),
    /// Numeric value
    Number(f64),
    /// Text value
    Text(String),
    /// Date value (formatted by the translator on emission)
    Date(NaiveDateTime),
    /// List of values
    List(Vec<PropValue>),
    /// Nested map of values
    Map(PropMap),
}

impl PropValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Plain string rendering, used by `prop` placements with `stringify`.
    pub fn stringify(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
            Self::Date(d) => d.to_string(),
            Self::List(items) => items
                .iter()
                .map(PropValue::stringify)
                .collect::<Vec<_>>()
                .join(","),
            Self::Map(map) => map
                .iter()
                .map(|(k, v)| format!("{}={}", k, v.stringify()))
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&PropValue> for serde_json::Value {
    fn from(value: &PropValue) -> Self {
        match value {
            PropValue::Null => serde_json::Value::Null,
            PropValue::Bool(b) => serde_json::Value::Bool(*b),
            PropValue::Integer(i) => serde_json::Value::from(*i),
            PropValue::Number(n) => serde_json::Value::from(*n),
            PropValue::Text(s) => serde_json::Value::String(s.clone()),
            PropValue::Date(d) => serde_json::Value::String(d.to_string()),
            PropValue::List(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            PropValue::Map(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// One compiled node of the output UI tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Identifier of the concrete UI element/component
    pub tag: String,
    /// Merged props: resolved attributes, current value, path, context, handlers
    pub props: PropMap,
    /// Ordered child nodes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FieldDefinition>,
    /// Item template when this node represents a list container
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<ItemDescriptor>,
}

/// Item template of a list container node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDescriptor {
    /// Tag rendered per collection entry
    pub tag: String,
    /// Props applied to every rendered item
    pub props: PropMap,
    /// External field name the collection is exposed as
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapped_name: Option<String>,
}
