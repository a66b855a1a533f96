pub mod autofill;
pub mod domain;
pub mod errors;
pub mod featurize;
pub mod registry;
pub mod session;
pub mod store;
pub mod tracker;
pub mod value;

pub use autofill::{AutofillReport, AutofillResolver, Entity};
pub use domain::{DomainConfig, SessionConfig, SlotKind, SlotSchema, OTHER_CATEGORY};
pub use errors::{CoercionWarning, DomainLoadError, EventError};
pub use featurize::{FeatureVector, Featurizer};
pub use registry::{CustomSlotKind, SlotKindRegistry};
pub use session::{SessionManager, SessionState};
pub use store::{SlotInstance, SlotStore};
pub use tracker::{ConversationTracker, SlotEvent, TurnInput, TurnOutcome};
pub use value::SlotValue;
