use serde::Serialize;

use crate::domain::{DomainConfig, SlotKind, SlotSchema};
use crate::registry::SlotKindRegistry;
use crate::store::SlotStore;
use crate::value::{self, SlotValue};

/// Concatenated slot features for one turn, in slot declaration order.
/// Recomputed on demand, never persisted.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FeatureVector(pub Vec<f64>);

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Encodes slot state per the fixed per-kind widths. Infallible once the
/// domain has validated: every kind/value combination has a defined vector.
#[derive(Clone, Copy, Debug, Default)]
pub struct Featurizer;

impl Featurizer {
    /// Schema-determined total width, constant regardless of slot values.
    pub fn feature_len(domain: &DomainConfig, registry: &SlotKindRegistry) -> usize {
        domain.slots.iter().map(|schema| registry.feature_width(schema)).sum()
    }

    pub fn featurize(store: &SlotStore) -> FeatureVector {
        let registry = store.registry();
        let mut features = Vec::new();
        for slot in store.iter() {
            let schema = slot.schema();
            if !schema.influences_conversation() {
                continue;
            }
            encode_slot(&mut features, schema, slot.get(), registry);
        }
        FeatureVector(features)
    }
}

fn encode_slot(
    out: &mut Vec<f64>,
    schema: &SlotSchema,
    current: Option<&SlotValue>,
    registry: &SlotKindRegistry,
) {
    match &schema.kind {
        // Only presence matters; the text content never affects the vector.
        SlotKind::Text => out.push(if current.is_some() { 1.0 } else { 0.0 }),
        SlotKind::Bool => match current {
            Some(SlotValue::Bool(true)) => out.extend([1.0, 0.0]),
            Some(SlotValue::Bool(false)) => out.extend([0.0, 1.0]),
            _ => out.extend([0.0, 0.0]),
        },
        SlotKind::Categorical => {
            let width = schema.values.len() + 1;
            let start = out.len();
            out.resize(start + width, 0.0);
            if let Some(SlotValue::Categorical(category)) = current {
                // The sentinel __other__ column is last; a set value outside
                // the declared set lands there. Unset stays all-zero.
                let position = value::category_position(schema, category)
                    .unwrap_or(schema.values.len());
                out[start + position] = 1.0;
            }
        }
        // Is-set companion bit first, then the clamped value, so an explicit
        // min_value is distinguishable from unset.
        SlotKind::Float => match current {
            Some(SlotValue::Float(number)) => out.extend([1.0, value::clamp(schema, *number)]),
            _ => out.extend([0.0, 0.0]),
        },
        SlotKind::List => match current {
            Some(SlotValue::List(items)) if !items.is_empty() => out.push(1.0),
            _ => out.push(0.0),
        },
        SlotKind::Any => {}
        SlotKind::Custom(tag) => {
            if let Some(kind) = registry.custom(tag) {
                let raw = match current {
                    Some(SlotValue::Custom(value)) => Some(value),
                    _ => None,
                };
                let mut encoded = kind.featurize(raw);
                encoded.resize(kind.arity(), 0.0);
                out.extend(encoded);
            }
        }
    }
}
