use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::autofill::{AutofillResolver, Entity};
use crate::domain::DomainConfig;
use crate::errors::{CoercionWarning, DomainLoadError, EventError};
use crate::featurize::{FeatureVector, Featurizer};
use crate::registry::SlotKindRegistry;
use crate::session::{SessionManager, SessionState};
use crate::store::SlotStore;

/// An explicit "slot was set" event from story or action execution. Applied
/// directly to the store, bypassing auto-fill gating.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotEvent {
    pub name: String,
    pub value: serde_json::Value,
}

/// Everything the external layers hand over for one turn.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnInput {
    /// Inactivity since the previous message, in minutes.
    #[serde(default)]
    pub elapsed_minutes: Option<i64>,
    /// Manual session-start signal.
    #[serde(default)]
    pub session_start: bool,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub slot_events: Vec<SlotEvent>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TurnOutcome {
    pub session_restarted: bool,
    /// Slots auto-filled from entities, in application order.
    pub auto_filled: Vec<String>,
    /// Slots set by explicit events, in application order.
    pub events_applied: Vec<String>,
    /// Explicit events naming undeclared slots; dropped, never fatal.
    pub unknown_slots: Vec<String>,
    pub warnings: Vec<CoercionWarning>,
    pub snapshot: BTreeMap<String, serde_json::Value>,
    pub features: FeatureVector,
}

/// Drives one conversation: session boundary check, entity auto-fill,
/// explicit slot events, then featurization. Owns the conversation's store
/// exclusively; callers serialize turns per conversation.
#[derive(Clone, Debug)]
pub struct ConversationTracker {
    resolver: AutofillResolver,
    store: SlotStore,
    session: SessionManager,
}

impl ConversationTracker {
    /// Validates the domain against the registry before anything else;
    /// schema errors are fatal here and only here.
    pub fn new(
        domain: &DomainConfig,
        registry: Arc<SlotKindRegistry>,
    ) -> Result<Self, DomainLoadError> {
        domain.validate(&registry)?;
        Ok(Self {
            resolver: AutofillResolver::from_domain(domain),
            store: SlotStore::from_domain(domain, registry),
            session: SessionManager::new(domain.session.clone()),
        })
    }

    pub fn store(&self) -> &SlotStore {
        &self.store
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    /// Process one turn. Explicit slot events are applied after auto-fill,
    /// so an explicit event targeting an auto-filled slot wins.
    pub fn process_turn(&mut self, turn: &TurnInput) -> TurnOutcome {
        if let Some(minutes) = turn.elapsed_minutes {
            self.session.observe_inactivity(Duration::minutes(minutes));
        }
        if turn.session_start {
            self.session.request_restart();
        }
        let session_restarted = self.session.on_message(&mut self.store);

        let report = self.resolver.apply(&mut self.store, &turn.entities);
        let mut warnings = report.warnings;
        let mut events_applied = Vec::new();
        let mut unknown_slots = Vec::new();

        for event in &turn.slot_events {
            match self.store.apply_event(&event.name, &event.value) {
                Ok(None) => events_applied.push(event.name.clone()),
                Ok(Some(warning)) => warnings.push(warning),
                Err(EventError::UnknownSlot(name)) => {
                    warn!(event_name = "slot.unknown", slot = %name, "slot event dropped");
                    unknown_slots.push(name);
                }
            }
        }

        TurnOutcome {
            session_restarted,
            auto_filled: report.filled,
            events_applied,
            unknown_slots,
            warnings,
            snapshot: self.store.snapshot(),
            features: Featurizer::featurize(&self.store),
        }
    }
}
