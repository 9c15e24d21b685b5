use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use eppo_core::attributes::ContextAttributes;
use eppo_core::configuration::Configuration;
use eppo_core::configuration_store::ConfigurationStore;
use eppo_core::evaluator::{Evaluator, FlagEvalOutcome};
use eppo_core::sharder::get_md5_shard;
use eppo_core::ufc::VariationType;

fn evaluator_with(json: &str) -> Evaluator {
    let store = Arc::new(ConfigurationStore::new());
    let config = Configuration::from_json(json.as_bytes()).expect("valid configuration");
    store.set_configuration(config);
    Evaluator::new(store)
}

#[test]
fn shard_range_boundaries_match_independently_computed_md5() {
    let total_shards = 10_000;
    let shard = get_md5_shard(&["s", "-", "alice"], total_shards);

    let json = format!(
        r#"{{
            "flags": {{
                "f": {{
                    "key": "f",
                    "enabled": true,
                    "variationType": "STRING",
                    "variations": {{ "v": {{ "key": "v", "value": "matched" }} }},
                    "allocations": [{{
                        "key": "a",
                        "splits": [{{
                            "shards": [{{ "salt": "s", "ranges": [{{ "start": 0, "end": {shard} }}] }}],
                            "variationKey": "v"
                        }}]
                    }}]
                }}
            }}
        }}"#
    );
    let evaluator = evaluator_with(&json);
    let outcome = evaluator.get_assignment(
        "f",
        "alice",
        &HashMap::new(),
        VariationType::String,
        Utc::now(),
    );
    // alice's shard falls exactly at the range's upper (exclusive) bound, so it must NOT match.
    assert!(matches!(outcome, FlagEvalOutcome::Failure(_, _)));

    let json_inclusive = format!(
        r#"{{
            "flags": {{
                "f": {{
                    "key": "f",
                    "enabled": true,
                    "variationType": "STRING",
                    "variations": {{ "v": {{ "key": "v", "value": "matched" }} }},
                    "allocations": [{{
                        "key": "a",
                        "splits": [{{
                            "shards": [{{ "salt": "s", "ranges": [{{ "start": 0, "end": {end} }}] }}],
                            "variationKey": "v"
                        }}]
                    }}]
                }}
            }}
        }}"#,
        end = shard + 1
    );
    let evaluator = evaluator_with(&json_inclusive);
    let outcome = evaluator.get_assignment(
        "f",
        "alice",
        &HashMap::new(),
        VariationType::String,
        Utc::now(),
    );
    match outcome {
        FlagEvalOutcome::Success(assignment, _) => {
            assert_eq!(assignment.value.as_string(), Some("matched"))
        }
        FlagEvalOutcome::Failure(..) => panic!("expected a match once the range includes the shard"),
    }
}

#[test]
fn bandit_controlled_flag_selects_an_action_deterministically() {
    let json = r#"{
        "flags": {
            "bandit-flag": {
                "key": "bandit-flag",
                "enabled": true,
                "variationType": "STRING",
                "variations": { "algo": { "key": "algo", "value": "algo" } },
                "allocations": [{
                    "key": "a",
                    "splits": [{
                        "shards": [{ "salt": "s", "ranges": [{ "start": 0, "end": 10000 }] }],
                        "variationKey": "algo"
                    }]
                }]
            }
        },
        "bandits": {
            "my-bandit": {
                "banditKey": "my-bandit",
                "modelName": "falcon",
                "modelVersion": "v1",
                "updatedAt": "2024-01-01T00:00:00.000Z",
                "modelData": {
                    "gamma": 1.0,
                    "defaultActionScore": 0.0,
                    "actionProbabilityFloor": 0.0,
                    "coefficients": {}
                }
            }
        },
        "banditFlags": {
            "my-bandit": [
                { "key": "k1", "flagKey": "bandit-flag", "variationKey": "algo", "variationValue": "algo" }
            ]
        }
    }"#;

    let evaluator = evaluator_with(json);
    let mut actions = HashMap::new();
    actions.insert("red".to_owned(), ContextAttributes::default());
    actions.insert("blue".to_owned(), ContextAttributes::default());

    let first = evaluator
        .get_bandit_action(
            "bandit-flag",
            "alice",
            &ContextAttributes::default(),
            &actions,
            "algo",
            Utc::now(),
        )
        .expect("bandit should resolve");
    let second = evaluator
        .get_bandit_action(
            "bandit-flag",
            "alice",
            &ContextAttributes::default(),
            &actions,
            "algo",
            Utc::now(),
        )
        .expect("bandit should resolve");

    assert_eq!(first.action_key, second.action_key);
    assert_eq!(first.event.bandit_key, "my-bandit");
}
