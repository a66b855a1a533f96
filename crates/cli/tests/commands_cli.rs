use std::io::Write;
use std::path::Path;

use convostate_cli::commands::{inspect, run, validate};
use serde_json::Value;
use tempfile::NamedTempFile;

const DOMAIN_TOML: &str = r#"
store_entities_as_slots = true

[session]
session_expiration_time = 60
carry_over_slots_to_new_session = false

[[slots]]
name = "cuisine"
kind = "categorical"
values = ["italian", "french", "vietnamese"]

[[slots]]
name = "age_verified"
kind = "bool"

[[slots]]
name = "payload"
kind = "any"
"#;

const TURNS_JSON: &str = r#"
[
  {
    "entities": [
      {"name": "cuisine", "value": "french"},
      {"name": "cuisine", "value": "vietnamese"}
    ]
  },
  {
    "slot_events": [{"name": "age_verified", "value": true}]
  }
]
"#;

#[test]
fn validate_accepts_a_well_formed_domain() {
    let domain = write_temp(DOMAIN_TOML);
    let result = validate::run(domain.path());
    assert_eq!(result.exit_code, 0, "expected successful validation");

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "validate");
    assert_eq!(payload["status"], "ok");
}

#[test]
fn validate_rejects_a_broken_domain_with_domain_validation_class() {
    let domain = write_temp("[[slots]]\nname = \"season\"\nkind = \"my_addons.season\"\n");
    let result = validate::run(domain.path());
    assert_eq!(result.exit_code, 2, "expected domain validation failure code");

    let payload = parse_payload(&result.output);
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["error_class"], "domain_validation");
    assert!(
        payload["message"].as_str().unwrap_or_default().contains("season"),
        "error must name the offending slot"
    );
}

#[test]
fn validate_reports_missing_file() {
    let result = validate::run(Path::new("/nonexistent/domain.toml"));
    assert_eq!(result.exit_code, 2);
    assert_eq!(parse_payload(&result.output)["error_class"], "domain_validation");
}

#[test]
fn inspect_reports_widths_and_total_feature_len() {
    let domain = write_temp(DOMAIN_TOML);
    let result = inspect::run(domain.path());
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    let data = &payload["data"];
    // cuisine: 3 values + __other__; bool: 2; any: excluded.
    assert_eq!(data["feature_len"], 6);

    let slots = data["slots"].as_array().expect("slot array");
    assert_eq!(slots.len(), 3);
    assert_eq!(slots[0]["name"], "cuisine");
    assert_eq!(slots[0]["feature_width"], 4);
    assert_eq!(slots[2]["name"], "payload");
    assert_eq!(slots[2]["influence_conversation"], false);
    assert_eq!(slots[2]["feature_width"], 0);
}

#[test]
fn run_replays_turns_with_last_entity_winning() {
    let domain = write_temp(DOMAIN_TOML);
    let turns = write_temp(TURNS_JSON);
    let result = run::run(domain.path(), turns.path());
    assert_eq!(result.exit_code, 0, "expected successful replay: {}", result.output);

    let payload = parse_payload(&result.output);
    let replayed = payload["data"]["turns"].as_array().expect("turn outcomes");
    assert_eq!(replayed.len(), 2);

    assert_eq!(replayed[0]["session_restarted"], true);
    assert_eq!(replayed[0]["snapshot"]["cuisine"], "vietnamese");
    assert_eq!(
        replayed[0]["features"],
        serde_json::json!([0.0, 0.0, 1.0, 0.0, 0.0, 0.0])
    );

    assert_eq!(replayed[1]["session_restarted"], false);
    assert_eq!(replayed[1]["events_applied"][0], "age_verified");
    assert_eq!(
        replayed[1]["features"],
        serde_json::json!([0.0, 0.0, 1.0, 0.0, 1.0, 0.0])
    );
}

#[test]
fn run_rejects_malformed_turns_file() {
    let domain = write_temp(DOMAIN_TOML);
    let turns = write_temp("not json at all");
    let result = run::run(domain.path(), turns.path());
    assert_eq!(result.exit_code, 2);
    assert_eq!(parse_payload(&result.output)["error_class"], "turns_parse");
}

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write temp contents");
    file
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output must be JSON")
}
