use std::path::Path;

use convostate_core::{Featurizer, SlotKindRegistry};
use serde::Serialize;
use serde_json::json;

use super::{validate, CommandResult};

#[derive(Debug, Serialize)]
struct SlotReport {
    name: String,
    kind: String,
    influence_conversation: bool,
    auto_fill: bool,
    feature_width: usize,
}

pub fn run(domain_path: &Path) -> CommandResult {
    let registry = SlotKindRegistry::new();
    let domain = match validate::load_validated(domain_path) {
        Ok(domain) => domain,
        Err(error) => {
            return CommandResult::failure("inspect", "domain_validation", error.to_string(), 2);
        }
    };

    let slots = domain
        .slots
        .iter()
        .map(|schema| SlotReport {
            name: schema.name.clone(),
            kind: schema.kind.to_string(),
            influence_conversation: schema.influences_conversation(),
            auto_fill: schema.auto_fill,
            feature_width: registry.feature_width(schema),
        })
        .collect::<Vec<_>>();

    let data = json!({
        "store_entities_as_slots": domain.store_entities_as_slots,
        "session": domain.session,
        "feature_len": Featurizer::feature_len(&domain, &registry),
        "slots": slots,
    });
    CommandResult::success_with_data(
        "inspect",
        format!("{} slots declared", domain.slots.len()),
        data,
    )
}
