use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::{SlotKind, SlotSchema};

/// Behavior contract for a user-supplied slot kind, registered under a
/// namespaced tag such as `my_addons.season`. Implementations own their
/// coercion rule, feature width, and encoding.
pub trait CustomSlotKind: Send + Sync {
    /// Fixed feature width contributed by slots of this kind.
    fn arity(&self) -> usize;

    /// Coerce a raw value, or reject it. Rejection downgrades the slot to
    /// unset with a recoverable warning.
    fn validate(&self, raw: &serde_json::Value) -> Option<serde_json::Value>;

    /// Encode the current value. The output is padded or truncated to
    /// `arity()` so the concatenated vector length stays schema-determined.
    fn featurize(&self, value: Option<&serde_json::Value>) -> Vec<f64>;
}

/// Catalog of slot kinds: the six built-ins plus registered custom kinds.
/// Unknown tags referenced by a domain are rejected at load time.
#[derive(Clone, Default)]
pub struct SlotKindRegistry {
    custom: BTreeMap<String, Arc<dyn CustomSlotKind>>,
}

impl SlotKindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom kind. Re-registering a tag replaces the previous
    /// implementation.
    pub fn register(&mut self, tag: impl Into<String>, kind: Arc<dyn CustomSlotKind>) {
        self.custom.insert(tag.into(), kind);
    }

    pub fn custom(&self, tag: &str) -> Option<&Arc<dyn CustomSlotKind>> {
        self.custom.get(tag)
    }

    /// Feature width contributed by one slot. Zero for slots that do not
    /// influence the conversation, including every `any` slot.
    pub fn feature_width(&self, schema: &SlotSchema) -> usize {
        if !schema.influences_conversation() {
            return 0;
        }
        match &schema.kind {
            SlotKind::Text | SlotKind::List => 1,
            SlotKind::Bool | SlotKind::Float => 2,
            SlotKind::Categorical => schema.values.len() + 1,
            SlotKind::Any => 0,
            SlotKind::Custom(tag) => self.custom(tag).map(|kind| kind.arity()).unwrap_or(0),
        }
    }
}

impl std::fmt::Debug for SlotKindRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotKindRegistry")
            .field("custom", &self.custom.keys().collect::<Vec<_>>())
            .finish()
    }
}
