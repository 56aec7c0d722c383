//! Canonical option values.

use std::collections::BTreeMap;

use serde_json::{Map, Number, Value};

/// A configuration mapping: option name to value, ordered by name.
pub type OptionMap = BTreeMap<String, OptionValue>;

/// A single option value.
///
/// This is the closed set of shapes a configuration may contain. Collaborators
/// convert their parsed options into this model; every option that affects
/// analysis behavior must be representable here so it participates in cache
/// keying.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// An ordered sequence; element order is meaningful and preserved.
    Seq(Vec<OptionValue>),
    /// An unordered collection; element order is fixed at encoding time.
    Set(Vec<OptionValue>),
    /// A nested record of named fields.
    Map(OptionMap),
}

impl OptionValue {
    /// Builds a set from any iterable; the stored order is irrelevant.
    pub fn set<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<OptionValue>,
    {
        OptionValue::Set(items.into_iter().map(Into::into).collect())
    }

    /// Converts to the canonical JSON tree.
    ///
    /// Map keys come out sorted (`BTreeMap` iteration order, re-inserted in
    /// that order so the encoding is stable even if `preserve_order` is
    /// enabled elsewhere in the build graph). Set elements are sorted by
    /// their own canonical encoding, which stays total for floats and mixed
    /// shapes where a native ordering would not.
    pub(crate) fn to_canonical(&self) -> Value {
        match self {
            OptionValue::Null => Value::Null,
            OptionValue::Bool(flag) => Value::Bool(*flag),
            OptionValue::Int(n) => Value::Number((*n).into()),
            OptionValue::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
            OptionValue::Str(s) => Value::String(s.clone()),
            OptionValue::Seq(items) => Value::Array(items.iter().map(Self::to_canonical).collect()),
            OptionValue::Set(items) => {
                let mut elements: Vec<Value> = items.iter().map(Self::to_canonical).collect();
                elements.sort_by_cached_key(|element| element.to_string());
                elements.dedup();
                Value::Array(elements)
            }
            OptionValue::Map(map) => {
                let mut object = Map::new();
                for (name, value) in map {
                    object.insert(name.clone(), value.to_canonical());
                }
                Value::Object(object)
            }
        }
    }
}

impl From<bool> for OptionValue {
    fn from(flag: bool) -> Self {
        OptionValue::Bool(flag)
    }
}

impl From<i64> for OptionValue {
    fn from(n: i64) -> Self {
        OptionValue::Int(n)
    }
}

impl From<f64> for OptionValue {
    fn from(f: f64) -> Self {
        OptionValue::Float(f)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Str(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Str(s)
    }
}

impl From<Vec<OptionValue>> for OptionValue {
    fn from(items: Vec<OptionValue>) -> Self {
        OptionValue::Seq(items)
    }
}
