use std::path::PathBuf;

use thiserror::Error;

use crate::domain::SlotKind;

/// Fatal configuration errors. Domain loading aborts on the first one.
#[derive(Debug, Error)]
pub enum DomainLoadError {
    #[error("could not read domain file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse domain file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("could not parse domain config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown slot kind `{kind}` for slot `{slot}`")]
    UnknownKind { slot: String, kind: String },
    #[error("slot `{slot}` has kind `any` and cannot have influence_conversation = true")]
    AnyCannotInfluence { slot: String },
    #[error("duplicate slot name `{0}`")]
    DuplicateSlot(String),
    #[error(
        "float slot `{slot}` has invalid bounds: min_value {min} must be below max_value {max}"
    )]
    InvalidFloatBounds { slot: String, min: f64, max: f64 },
    #[error("categorical slot `{slot}` declares no values")]
    EmptyCategoryValues { slot: String },
    #[error("categorical slot `{slot}` declares duplicate value `{value}`")]
    DuplicateCategoryValue { slot: String, value: String },
    #[error("categorical slot `{slot}` declares the reserved value `{reserved}`")]
    ReservedCategoryValue { slot: String, reserved: String },
    #[error("slot `{slot}` has an initial value that does not fit kind `{kind}`: {value}")]
    InvalidInitialValue { slot: String, kind: SlotKind, value: serde_json::Value },
}

/// Recoverable runtime errors. The conversation continues; the event is dropped.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EventError {
    #[error("no slot named `{0}` is declared in the domain")]
    UnknownSlot(String),
}

/// A value that could not be coerced to its slot's kind. The slot is left
/// unset and the turn continues.
#[derive(Clone, Debug, Error, PartialEq, serde::Serialize)]
#[error("value {value} cannot be coerced to kind `{kind}` for slot `{slot}`; slot left unset")]
pub struct CoercionWarning {
    pub slot: String,
    pub kind: SlotKind,
    pub value: serde_json::Value,
}
