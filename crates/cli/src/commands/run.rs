use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use convostate_core::{ConversationTracker, SlotKindRegistry, TurnInput};
use serde_json::json;

use super::{validate, CommandResult};

/// Replay a JSON file of turns through one conversation tracker, emitting
/// the per-turn snapshot and feature vector.
pub fn run(domain_path: &Path, turns_path: &Path) -> CommandResult {
    let domain = match validate::load_validated(domain_path) {
        Ok(domain) => domain,
        Err(error) => {
            return CommandResult::failure("run", "domain_validation", error.to_string(), 2);
        }
    };

    let turns = match read_turns(turns_path) {
        Ok(turns) => turns,
        Err(error) => {
            return CommandResult::failure("run", "turns_parse", format!("{error:#}"), 2);
        }
    };

    let mut tracker = match ConversationTracker::new(&domain, Arc::new(SlotKindRegistry::new())) {
        Ok(tracker) => tracker,
        Err(error) => {
            return CommandResult::failure("run", "domain_validation", error.to_string(), 2);
        }
    };

    let outcomes = turns.iter().map(|turn| tracker.process_turn(turn)).collect::<Vec<_>>();
    CommandResult::success_with_data(
        "run",
        format!("processed {} turns", outcomes.len()),
        json!({ "turns": outcomes }),
    )
}

fn read_turns(turns_path: &Path) -> anyhow::Result<Vec<TurnInput>> {
    let raw = fs::read_to_string(turns_path)
        .with_context(|| format!("could not read turns file `{}`", turns_path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("could not parse turns file `{}`", turns_path.display()))
}
