use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::DomainLoadError;
use crate::registry::SlotKindRegistry;
use crate::value;

/// Sentinel category for set categorical values outside the declared set.
pub const OTHER_CATEGORY: &str = "__other__";

/// Kind tag for a slot. Built-in kinds use fixed tags; anything else is a
/// custom kind resolved against the registry at load time.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SlotKind {
    Text,
    Bool,
    Categorical,
    Float,
    List,
    Any,
    Custom(String),
}

impl SlotKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Bool => "bool",
            Self::Categorical => "categorical",
            Self::Float => "float",
            Self::List => "list",
            Self::Any => "any",
            Self::Custom(tag) => tag,
        }
    }
}

impl From<String> for SlotKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "text" => Self::Text,
            "bool" => Self::Bool,
            "categorical" => Self::Categorical,
            "float" => Self::Float,
            "list" => Self::List,
            "any" => Self::Any,
            _ => Self::Custom(tag),
        }
    }
}

impl From<SlotKind> for String {
    fn from(kind: SlotKind) -> Self {
        kind.as_str().to_owned()
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotSchema {
    pub name: String,
    pub kind: SlotKind,
    /// Absent means the kind's default: true for every kind except `any`,
    /// which never influences the conversation.
    #[serde(default)]
    pub influence_conversation: Option<bool>,
    #[serde(default = "default_true")]
    pub auto_fill: bool,
    #[serde(default)]
    pub initial_value: Option<serde_json::Value>,
    /// Categorical slots only: the declared value set, in declared order.
    #[serde(default)]
    pub values: Vec<String>,
    /// Float slots only.
    #[serde(default = "default_min_value")]
    pub min_value: f64,
    #[serde(default = "default_max_value")]
    pub max_value: f64,
}

impl SlotSchema {
    pub fn new(name: impl Into<String>, kind: SlotKind) -> Self {
        Self {
            name: name.into(),
            kind,
            influence_conversation: None,
            auto_fill: true,
            initial_value: None,
            values: Vec::new(),
            min_value: default_min_value(),
            max_value: default_max_value(),
        }
    }

    /// Effective influence flag: `any` slots never participate in
    /// featurization regardless of configuration.
    pub fn influences_conversation(&self) -> bool {
        match self.kind {
            SlotKind::Any => false,
            _ => self.influence_conversation.unwrap_or(true),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Inactivity in minutes before a session expires. 0 disables expiry.
    #[serde(default = "default_expiration_minutes")]
    pub session_expiration_time: u64,
    #[serde(default = "default_true")]
    pub carry_over_slots_to_new_session: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_expiration_time: default_expiration_minutes(),
            carry_over_slots_to_new_session: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DomainConfig {
    #[serde(default = "default_true")]
    pub store_entities_as_slots: bool,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub slots: Vec<SlotSchema>,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            store_entities_as_slots: true,
            session: SessionConfig::default(),
            slots: Vec::new(),
        }
    }
}

impl DomainConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, DomainLoadError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DomainLoadError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| DomainLoadError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| DomainLoadError::ParseFile {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load-time schema validation. Every error names the offending slot.
    pub fn validate(&self, registry: &SlotKindRegistry) -> Result<(), DomainLoadError> {
        let mut seen_names = BTreeSet::new();
        for schema in &self.slots {
            if !seen_names.insert(schema.name.clone()) {
                return Err(DomainLoadError::DuplicateSlot(schema.name.clone()));
            }

            match &schema.kind {
                SlotKind::Any => {
                    if schema.influence_conversation == Some(true) {
                        return Err(DomainLoadError::AnyCannotInfluence {
                            slot: schema.name.clone(),
                        });
                    }
                }
                SlotKind::Categorical => {
                    if schema.values.is_empty() {
                        return Err(DomainLoadError::EmptyCategoryValues {
                            slot: schema.name.clone(),
                        });
                    }
                    let mut seen_values = BTreeSet::new();
                    for declared in &schema.values {
                        if declared == OTHER_CATEGORY {
                            return Err(DomainLoadError::ReservedCategoryValue {
                                slot: schema.name.clone(),
                                reserved: OTHER_CATEGORY.to_owned(),
                            });
                        }
                        if !seen_values.insert(declared.to_ascii_lowercase()) {
                            return Err(DomainLoadError::DuplicateCategoryValue {
                                slot: schema.name.clone(),
                                value: declared.clone(),
                            });
                        }
                    }
                }
                SlotKind::Float => {
                    if !schema.min_value.is_finite()
                        || !schema.max_value.is_finite()
                        || schema.min_value >= schema.max_value
                    {
                        return Err(DomainLoadError::InvalidFloatBounds {
                            slot: schema.name.clone(),
                            min: schema.min_value,
                            max: schema.max_value,
                        });
                    }
                }
                SlotKind::Custom(tag) => {
                    if registry.custom(tag).is_none() {
                        return Err(DomainLoadError::UnknownKind {
                            slot: schema.name.clone(),
                            kind: tag.clone(),
                        });
                    }
                }
                SlotKind::Text | SlotKind::Bool | SlotKind::List => {}
            }

            if let Some(initial) = &schema.initial_value {
                if value::coerce(schema, registry, initial).is_none() {
                    return Err(DomainLoadError::InvalidInitialValue {
                        slot: schema.name.clone(),
                        kind: schema.kind.clone(),
                        value: initial.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn slot(&self, name: &str) -> Option<&SlotSchema> {
        self.slots.iter().find(|schema| schema.name == name)
    }
}

fn default_true() -> bool {
    true
}

fn default_min_value() -> f64 {
    0.0
}

fn default_max_value() -> f64 {
    1.0
}

fn default_expiration_minutes() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::registry::SlotKindRegistry;

    use super::{DomainConfig, DomainLoadError, SlotKind, SlotSchema};

    const DOMAIN_TOML: &str = r#"
store_entities_as_slots = true

[session]
session_expiration_time = 30
carry_over_slots_to_new_session = false

[[slots]]
name = "cuisine"
kind = "categorical"
values = ["italian", "french", "vietnamese"]

[[slots]]
name = "account_balance"
kind = "float"
min_value = 0.0
max_value = 1000.0
initial_value = 0.0

[[slots]]
name = "shopping_list"
kind = "list"
auto_fill = false
"#;

    #[test]
    fn parses_domain_toml_with_declaration_order_preserved() {
        let domain = DomainConfig::from_toml_str(DOMAIN_TOML).expect("valid domain");
        assert!(domain.store_entities_as_slots);
        assert_eq!(domain.session.session_expiration_time, 30);
        assert!(!domain.session.carry_over_slots_to_new_session);

        let names = domain.slots.iter().map(|s| s.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["cuisine", "account_balance", "shopping_list"]);
        assert_eq!(domain.slots[0].kind, SlotKind::Categorical);
        assert!(!domain.slots[2].auto_fill);
    }

    #[test]
    fn defaults_apply_when_fields_are_absent() {
        let domain = DomainConfig::from_toml_str(
            "[[slots]]\nname = \"notes\"\nkind = \"text\"\n",
        )
        .expect("minimal domain");

        assert!(domain.store_entities_as_slots);
        assert_eq!(domain.session.session_expiration_time, 60);
        assert!(domain.session.carry_over_slots_to_new_session);

        let slot = &domain.slots[0];
        assert!(slot.auto_fill);
        assert!(slot.influences_conversation());
        assert_eq!(slot.min_value, 0.0);
        assert_eq!(slot.max_value, 1.0);
    }

    #[test]
    fn validate_accepts_well_formed_domain() {
        let domain = DomainConfig::from_toml_str(DOMAIN_TOML).expect("valid domain");
        domain.validate(&SlotKindRegistry::new()).expect("validation should pass");
    }

    #[test]
    fn unknown_kind_is_fatal() {
        let domain = DomainConfig::from_toml_str(
            "[[slots]]\nname = \"season\"\nkind = \"my_addons.season\"\n",
        )
        .expect("parses");

        let error = domain
            .validate(&SlotKindRegistry::new())
            .expect_err("unknown kind must be rejected");
        assert!(matches!(
            error,
            DomainLoadError::UnknownKind { ref slot, ref kind }
                if slot == "season" && kind == "my_addons.season"
        ));
    }

    #[test]
    fn any_with_influence_true_is_fatal() {
        let domain = DomainConfig::from_toml_str(
            "[[slots]]\nname = \"payload\"\nkind = \"any\"\ninfluence_conversation = true\n",
        )
        .expect("parses");

        let error = domain.validate(&SlotKindRegistry::new()).expect_err("must reject");
        assert!(matches!(error, DomainLoadError::AnyCannotInfluence { ref slot } if slot == "payload"));
    }

    #[test]
    fn any_without_explicit_influence_is_accepted_and_never_influences() {
        let domain = DomainConfig::from_toml_str("[[slots]]\nname = \"payload\"\nkind = \"any\"\n")
            .expect("parses");
        domain.validate(&SlotKindRegistry::new()).expect("validation should pass");
        assert!(!domain.slots[0].influences_conversation());
    }

    #[test]
    fn duplicate_slot_names_are_fatal() {
        let domain = DomainConfig::from_toml_str(
            "[[slots]]\nname = \"city\"\nkind = \"text\"\n\n[[slots]]\nname = \"city\"\nkind = \"text\"\n",
        )
        .expect("parses");

        let error = domain.validate(&SlotKindRegistry::new()).expect_err("must reject");
        assert!(matches!(error, DomainLoadError::DuplicateSlot(ref name) if name == "city"));
    }

    #[test]
    fn degenerate_float_bounds_are_fatal() {
        let mut schema = SlotSchema::new("score", SlotKind::Float);
        schema.min_value = 1.0;
        schema.max_value = 1.0;
        let domain = DomainConfig { slots: vec![schema], ..DomainConfig::default() };

        let error = domain.validate(&SlotKindRegistry::new()).expect_err("must reject");
        assert!(matches!(error, DomainLoadError::InvalidFloatBounds { .. }));
    }

    #[test]
    fn categorical_without_values_is_fatal() {
        let domain = DomainConfig::from_toml_str(
            "[[slots]]\nname = \"risk_level\"\nkind = \"categorical\"\n",
        )
        .expect("parses");

        let error = domain.validate(&SlotKindRegistry::new()).expect_err("must reject");
        assert!(matches!(error, DomainLoadError::EmptyCategoryValues { .. }));
    }

    #[test]
    fn reserved_and_duplicate_category_values_are_fatal() {
        let reserved = DomainConfig::from_toml_str(
            "[[slots]]\nname = \"risk\"\nkind = \"categorical\"\nvalues = [\"low\", \"__other__\"]\n",
        )
        .expect("parses");
        assert!(matches!(
            reserved.validate(&SlotKindRegistry::new()),
            Err(DomainLoadError::ReservedCategoryValue { .. })
        ));

        let duplicated = DomainConfig::from_toml_str(
            "[[slots]]\nname = \"risk\"\nkind = \"categorical\"\nvalues = [\"low\", \"LOW\"]\n",
        )
        .expect("parses");
        assert!(matches!(
            duplicated.validate(&SlotKindRegistry::new()),
            Err(DomainLoadError::DuplicateCategoryValue { .. })
        ));
    }

    #[test]
    fn initial_value_must_fit_the_kind() {
        let domain = DomainConfig::from_toml_str(
            "[[slots]]\nname = \"balance\"\nkind = \"float\"\nmin_value = 0.0\nmax_value = 10.0\ninitial_value = \"plenty\"\n",
        )
        .expect("parses");

        let error = domain.validate(&SlotKindRegistry::new()).expect_err("must reject");
        assert!(matches!(error, DomainLoadError::InvalidInitialValue { ref slot, .. } if slot == "balance"));
    }

    #[test]
    fn load_reads_domain_from_file_and_reports_missing_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(DOMAIN_TOML.as_bytes()).expect("write domain");

        let domain = DomainConfig::load(file.path()).expect("load from file");
        assert_eq!(domain.slots.len(), 3);

        let error = DomainConfig::load("/nonexistent/convostate-domain.toml")
            .expect_err("missing file must fail");
        assert!(matches!(error, DomainLoadError::ReadFile { .. }));
    }
}
