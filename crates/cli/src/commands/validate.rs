use std::path::Path;

use convostate_core::{DomainConfig, DomainLoadError, SlotKindRegistry};

use super::CommandResult;

pub fn run(domain_path: &Path) -> CommandResult {
    match load_validated(domain_path) {
        Ok(domain) => CommandResult::success(
            "validate",
            format!("domain is valid ({} slots)", domain.slots.len()),
        ),
        Err(error) => {
            CommandResult::failure("validate", "domain_validation", error.to_string(), 2)
        }
    }
}

/// Load a domain file and validate it against the built-in kind catalog.
/// Custom kinds are registered by embedders at compile time, not by the CLI.
pub(crate) fn load_validated(domain_path: &Path) -> Result<DomainConfig, DomainLoadError> {
    let domain = DomainConfig::load(domain_path)?;
    domain.validate(&SlotKindRegistry::new())?;
    Ok(domain)
}
