use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{DomainConfig, SlotSchema};
use crate::errors::{CoercionWarning, EventError};
use crate::registry::SlotKindRegistry;
use crate::value::{self, SlotValue};

/// One named memory cell: the schema it was created from plus the current
/// value. Unset is `None`, never a zero-valued primitive.
#[derive(Clone, Debug, PartialEq)]
pub struct SlotInstance {
    schema: SlotSchema,
    value: Option<SlotValue>,
}

impl SlotInstance {
    fn from_schema(schema: SlotSchema, registry: &SlotKindRegistry) -> Self {
        let value = schema
            .initial_value
            .as_ref()
            .and_then(|initial| value::coerce(&schema, registry, initial));
        Self { schema, value }
    }

    pub fn schema(&self) -> &SlotSchema {
        &self.schema
    }

    pub fn get(&self) -> Option<&SlotValue> {
        self.value.as_ref()
    }

    /// Coerce and store a raw value. On coercion failure the slot is cleared
    /// and the warning is returned to the caller; the turn continues.
    pub fn set(
        &mut self,
        registry: &SlotKindRegistry,
        raw: &serde_json::Value,
    ) -> Result<(), CoercionWarning> {
        match value::coerce(&self.schema, registry, raw) {
            Some(coerced) => {
                self.value = Some(coerced);
                Ok(())
            }
            None => {
                self.value = None;
                Err(CoercionWarning {
                    slot: self.schema.name.clone(),
                    kind: self.schema.kind.clone(),
                    value: raw.clone(),
                })
            }
        }
    }

    pub fn unset(&mut self) {
        self.value = None;
    }

    fn reset(&mut self, registry: &SlotKindRegistry) {
        self.value = self
            .schema
            .initial_value
            .as_ref()
            .and_then(|initial| value::coerce(&self.schema, registry, initial));
    }
}

/// All slot instances of one conversation, in declaration order. Owned
/// exclusively by that conversation's processing context.
#[derive(Clone, Debug)]
pub struct SlotStore {
    slots: Vec<SlotInstance>,
    index: BTreeMap<String, usize>,
    registry: Arc<SlotKindRegistry>,
}

impl SlotStore {
    /// Instantiate one slot per schema, applying `initial_value` where
    /// present. The domain must have been validated against `registry`.
    pub fn from_domain(domain: &DomainConfig, registry: Arc<SlotKindRegistry>) -> Self {
        let mut slots = Vec::with_capacity(domain.slots.len());
        let mut index = BTreeMap::new();
        for schema in &domain.slots {
            index.insert(schema.name.clone(), slots.len());
            slots.push(SlotInstance::from_schema(schema.clone(), &registry));
        }
        Self { slots, index, registry }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SlotInstance> {
        self.slots.iter()
    }

    pub fn registry(&self) -> &SlotKindRegistry {
        &self.registry
    }

    pub fn schema(&self, name: &str) -> Option<&SlotSchema> {
        self.index.get(name).map(|position| self.slots[*position].schema())
    }

    pub fn get(&self, name: &str) -> Result<Option<&SlotValue>, EventError> {
        let position =
            self.index.get(name).ok_or_else(|| EventError::UnknownSlot(name.to_owned()))?;
        Ok(self.slots[*position].get())
    }

    /// Mutate the named slot. Unknown names are a recoverable error; the
    /// event is dropped and the conversation continues. `Ok(Some(warning))`
    /// means the value did not coerce and the slot is now unset.
    pub fn apply_event(
        &mut self,
        name: &str,
        raw: &serde_json::Value,
    ) -> Result<Option<CoercionWarning>, EventError> {
        let position =
            *self.index.get(name).ok_or_else(|| EventError::UnknownSlot(name.to_owned()))?;
        match self.slots[position].set(&self.registry, raw) {
            Ok(()) => {
                debug!(event_name = "slot.set", slot = name, "slot value updated");
                Ok(None)
            }
            Err(warning) => {
                warn!(event_name = "slot.coercion_failed", slot = name, %warning, "slot cleared");
                Ok(Some(warning))
            }
        }
    }

    pub fn unset(&mut self, name: &str) -> Result<(), EventError> {
        let position =
            *self.index.get(name).ok_or_else(|| EventError::UnknownSlot(name.to_owned()))?;
        self.slots[position].unset();
        debug!(event_name = "slot.unset", slot = name, "slot cleared");
        Ok(())
    }

    /// Read-only name → value view for inspection and logging. Unset slots
    /// appear as JSON null.
    pub fn snapshot(&self) -> BTreeMap<String, serde_json::Value> {
        self.slots
            .iter()
            .map(|slot| {
                let value =
                    slot.get().map(SlotValue::to_json).unwrap_or(serde_json::Value::Null);
                (slot.schema().name.clone(), value)
            })
            .collect()
    }

    /// Session-boundary reset. With `carry_over` the current values survive;
    /// without it every slot returns to its schema default.
    pub fn reset(&mut self, carry_over: bool) {
        if carry_over {
            return;
        }
        for slot in &mut self.slots {
            slot.reset(&self.registry);
        }
    }
}
