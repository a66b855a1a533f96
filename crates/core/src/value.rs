use serde_json::Value;

use crate::domain::{SlotKind, SlotSchema};
use crate::registry::SlotKindRegistry;

/// A set slot value, tagged by kind. Wrapping in `Option` at the instance
/// level keeps "unset" distinct from legitimate `false`/`0.0` values.
#[derive(Clone, Debug, PartialEq)]
pub enum SlotValue {
    Text(String),
    Bool(bool),
    /// Stored verbatim when the value is outside the declared set; such
    /// values featurize as the reserved `__other__` category.
    Categorical(String),
    /// Already clamped into the schema's `[min_value, max_value]`.
    Float(f64),
    List(Vec<Value>),
    Any(Value),
    Custom(Value),
}

impl SlotValue {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::Bool(flag) => Value::Bool(*flag),
            Self::Categorical(category) => Value::String(category.clone()),
            Self::Float(number) => serde_json::Number::from_f64(*number)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::List(items) => Value::Array(items.clone()),
            Self::Any(value) | Self::Custom(value) => value.clone(),
        }
    }
}

/// Coerce a raw value to the schema's kind. `None` means the value cannot be
/// represented; callers downgrade the slot to unset with a warning.
pub fn coerce(schema: &SlotSchema, registry: &SlotKindRegistry, raw: &Value) -> Option<SlotValue> {
    match &schema.kind {
        SlotKind::Text => scalar_to_string(raw).map(SlotValue::Text),
        SlotKind::Bool => coerce_bool(raw).map(SlotValue::Bool),
        SlotKind::Categorical => {
            let candidate = scalar_to_string(raw)?;
            Some(SlotValue::Categorical(canonical_category(schema, &candidate)))
        }
        SlotKind::Float => coerce_float(raw).map(|number| SlotValue::Float(clamp(schema, number))),
        SlotKind::List => match raw {
            Value::Array(items) => Some(SlotValue::List(items.clone())),
            Value::Null => None,
            other => Some(SlotValue::List(vec![other.clone()])),
        },
        SlotKind::Any => match raw {
            Value::Null => None,
            other => Some(SlotValue::Any(other.clone())),
        },
        SlotKind::Custom(tag) => {
            registry.custom(tag).and_then(|kind| kind.validate(raw)).map(SlotValue::Custom)
        }
    }
}

/// Clamp into the schema's float bounds. Monotonic and idempotent.
pub fn clamp(schema: &SlotSchema, number: f64) -> f64 {
    number.clamp(schema.min_value, schema.max_value)
}

/// Position of a set categorical value within the declared set, if any.
/// Matching is case-insensitive; misses map to `__other__`.
pub fn category_position(schema: &SlotSchema, category: &str) -> Option<usize> {
    schema.values.iter().position(|declared| declared.eq_ignore_ascii_case(category))
}

fn canonical_category(schema: &SlotSchema, candidate: &str) -> String {
    match category_position(schema, candidate) {
        Some(position) => schema.values[position].clone(),
        None => candidate.to_owned(),
    }
}

fn scalar_to_string(raw: &Value) -> Option<String> {
    match raw {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn coerce_bool(raw: &Value) -> Option<bool> {
    match raw {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) if text.eq_ignore_ascii_case("true") => Some(true),
        Value::String(text) if text.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

fn coerce_float(raw: &Value) -> Option<f64> {
    let number = match raw {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}
