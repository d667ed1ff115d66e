// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed values stored in the state store's `value`/`type` columns.
//!
//! The original Python `StateManager` serialized everything to a `TEXT`
//! column alongside a `type` discriminator computed by `type(value).__name__`,
//! with `bool` checked ahead of `int` since `bool` is an `int` subclass in
//! Python. This type makes that discipline explicit instead of relying on
//! isinstance-check ordering.

use serde::{Deserialize, Serialize};

/// The set of value shapes the state store round-trips exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// An ISO 8601 timestamp, stored as text but tagged distinctly from a
    /// plain string so callers round-trip `DateTime` values without a
    /// parse step at every read site.
    Timestamp(String),
    /// Arbitrary JSON, for structured records like summary maps.
    Structured(serde_json::Value),
}

/// The `type` column discriminator persisted alongside a value's text
/// encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateValueKind {
    Null,
    Bool,
    Int,
    Float,
    String,
    Timestamp,
    Structured,
}

impl StateValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StateValueKind::Null => "null",
            StateValueKind::Bool => "bool",
            StateValueKind::Int => "int",
            StateValueKind::Float => "float",
            StateValueKind::String => "str",
            StateValueKind::Timestamp => "timestamp",
            StateValueKind::Structured => "structured",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "null" => Some(StateValueKind::Null),
            "bool" => Some(StateValueKind::Bool),
            "int" => Some(StateValueKind::Int),
            "float" => Some(StateValueKind::Float),
            "str" => Some(StateValueKind::String),
            "timestamp" => Some(StateValueKind::Timestamp),
            "structured" => Some(StateValueKind::Structured),
            _ => None,
        }
    }
}

impl StateValue {
    /// The discriminator to persist in the `type` column. Bool is checked
    /// ahead of any numeric kind deliberately, mirroring the ordering the
    /// original relied on to avoid misclassifying booleans as integers.
    pub fn kind(&self) -> StateValueKind {
        match self {
            StateValue::Null => StateValueKind::Null,
            StateValue::Bool(_) => StateValueKind::Bool,
            StateValue::Int(_) => StateValueKind::Int,
            StateValue::Float(_) => StateValueKind::Float,
            StateValue::String(_) => StateValueKind::String,
            StateValue::Timestamp(_) => StateValueKind::Timestamp,
            StateValue::Structured(_) => StateValueKind::Structured,
        }
    }

    /// Encodes the value's payload as the text stored in the `value`
    /// column; paired with `kind()` to reconstruct it on read.
    pub fn encode(&self) -> String {
        match self {
            StateValue::Null => String::new(),
            StateValue::Bool(b) => b.to_string(),
            StateValue::Int(i) => i.to_string(),
            StateValue::Float(f) => f.to_string(),
            StateValue::String(s) => s.clone(),
            StateValue::Timestamp(t) => t.clone(),
            StateValue::Structured(v) => v.to_string(),
        }
    }

    /// Reconstructs a value from its persisted `(type, value)` pair.
    pub fn decode(kind: StateValueKind, text: &str) -> Result<Self, String> {
        Ok(match kind {
            StateValueKind::Null => StateValue::Null,
            StateValueKind::Bool => {
                StateValue::Bool(text.parse().map_err(|_| format!("invalid bool: {text}"))?)
            }
            StateValueKind::Int => {
                StateValue::Int(text.parse().map_err(|_| format!("invalid int: {text}"))?)
            }
            StateValueKind::Float => {
                StateValue::Float(text.parse().map_err(|_| format!("invalid float: {text}"))?)
            }
            StateValueKind::String => StateValue::String(text.to_string()),
            StateValueKind::Timestamp => StateValue::Timestamp(text.to_string()),
            StateValueKind::Structured => StateValue::Structured(
                serde_json::from_str(text).map_err(|e| format!("invalid structured value: {e}"))?,
            ),
        })
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StateValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            StateValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StateValue::String(s) | StateValue::Timestamp(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<bool> for StateValue {
    fn from(v: bool) -> Self {
        StateValue::Bool(v)
    }
}

impl From<i64> for StateValue {
    fn from(v: i64) -> Self {
        StateValue::Int(v)
    }
}

impl From<f64> for StateValue {
    fn from(v: f64) -> Self {
        StateValue::Float(v)
    }
}

impl From<String> for StateValue {
    fn from(v: String) -> Self {
        StateValue::String(v)
    }
}

impl From<&str> for StateValue {
    fn from(v: &str) -> Self {
        StateValue::String(v.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn bool_round_trips_without_being_mistaken_for_int() {
        let value = StateValue::Bool(true);
        assert_eq!(value.kind(), StateValueKind::Bool);
        let encoded = value.encode();
        let decoded = StateValue::decode(value.kind(), &encoded).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn int_round_trips() {
        let value = StateValue::Int(-42);
        let decoded = StateValue::decode(value.kind(), &value.encode()).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn structured_round_trips_through_json() {
        let value = StateValue::Structured(serde_json::json!({"plex": "success", "jellyfin": "failed"}));
        let decoded = StateValue::decode(value.kind(), &value.encode()).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn kind_tag_round_trips_through_str() {
        for kind in [
            StateValueKind::Null,
            StateValueKind::Bool,
            StateValueKind::Int,
            StateValueKind::Float,
            StateValueKind::String,
            StateValueKind::Timestamp,
            StateValueKind::Structured,
        ] {
            assert_eq!(StateValueKind::parse(kind.as_str()), Some(kind));
        }
    }
}
