use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::DomainConfig;
use crate::errors::CoercionWarning;
use crate::store::SlotStore;

/// An extracted entity from the external NLU layer. Consumed read-only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub value: serde_json::Value,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Entity {
    pub fn new(name: impl Into<String>, value: serde_json::Value) -> Self {
        Self { name: name.into(), value, metadata: BTreeMap::new() }
    }
}

/// What one auto-fill pass did to the store.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AutofillReport {
    /// Slot names that received a value, in application order. A slot filled
    /// twice in one turn appears twice; the last application holds.
    pub filled: Vec<String>,
    pub warnings: Vec<CoercionWarning>,
}

/// Applies extracted entities to matching slots, once per turn. A pure
/// function of (entities, flags, store): replaying the same entities over the
/// same starting store yields the same ending store.
#[derive(Clone, Copy, Debug)]
pub struct AutofillResolver {
    store_entities_as_slots: bool,
}

impl AutofillResolver {
    pub fn new(store_entities_as_slots: bool) -> Self {
        Self { store_entities_as_slots }
    }

    pub fn from_domain(domain: &DomainConfig) -> Self {
        Self::new(domain.store_entities_as_slots)
    }

    /// Entities are processed in extraction order, so when several target the
    /// same slot the last one wins. Entities without a matching slot name and
    /// slots with `auto_fill = false` are skipped.
    pub fn apply(&self, store: &mut SlotStore, entities: &[Entity]) -> AutofillReport {
        let mut report = AutofillReport::default();
        if !self.store_entities_as_slots {
            return report;
        }

        for entity in entities {
            let Some(schema) = store.schema(&entity.name) else {
                debug!(event_name = "autofill.no_matching_slot", entity = %entity.name);
                continue;
            };
            if !schema.auto_fill {
                debug!(event_name = "autofill.disabled_for_slot", slot = %entity.name);
                continue;
            }
            match store.apply_event(&entity.name, &entity.value) {
                Ok(None) => {
                    debug!(event_name = "autofill.applied", slot = %entity.name);
                    report.filled.push(entity.name.clone());
                }
                Ok(Some(warning)) => report.warnings.push(warning),
                // Unreachable once the schema lookup above succeeded.
                Err(_) => continue,
            }
        }
        report
    }
}
