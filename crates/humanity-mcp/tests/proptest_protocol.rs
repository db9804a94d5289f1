// crates/humanity-mcp/tests/proptest_protocol.rs
// ============================================================================
// Module: Line Protocol Property-Based Tests
// Description: Property tests for per-line response guarantees.
// Purpose: Detect panics and invariant breaks across arbitrary input lines.
// ============================================================================

//! Property-based tests for line protocol invariants.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use humanity_mcp::validation::FieldKind;
use humanity_mcp::validation::FieldSpec;
use humanity_mcp::validation::InputSchema;
use humanity_mcp::validation::ValidationResult;
use humanity_mcp::validation::validate_against;
use proptest::prelude::*;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::common::default_server;

fn json_value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|v| Value::Number(v.into())),
        ".{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0 .. 4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z_]{1,8}", inner, 0 .. 4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn arbitrary_bytes_yield_one_well_formed_response(bytes in prop::collection::vec(any::<u8>(), 0 .. 256)) {
        let line: Vec<u8> = bytes.into_iter().filter(|byte| *byte != b'\n').collect();
        let response = default_server().handle_line(&line);
        prop_assert!(!response.contains('\n'));
        let parsed: Value = serde_json::from_str(&response).unwrap();
        let ok = parsed["ok"].as_bool().unwrap();
        prop_assert_eq!(ok, parsed.get("data").is_some());
        prop_assert_eq!(!ok, parsed.get("error").is_some());
        prop_assert!(parsed.as_object().unwrap().values().all(|value| !value.is_null()));
    }

    #[test]
    fn string_ids_are_echoed_verbatim(id in ".{0,24}") {
        let line = serde_json::to_string(&json!({ "id": id, "type": "list_actions" })).unwrap();
        let parsed: Value = serde_json::from_str(&default_server().handle_line(line.as_bytes())).unwrap();
        prop_assert_eq!(parsed["id"].as_str(), Some(id.as_str()));
    }

    #[test]
    fn arbitrary_invoke_inputs_never_break_the_envelope(
        action in prop_oneof![Just("supportive_reply".to_string()), "[a-z_]{1,16}"],
        input in json_value_strategy(),
    ) {
        let request = json!({ "type": "invoke", "payload": { "action": action, "input": input } });
        let line = serde_json::to_string(&request).unwrap();
        let parsed: Value = serde_json::from_str(&default_server().handle_line(line.as_bytes())).unwrap();
        if parsed["ok"] == true {
            prop_assert_eq!(parsed["data"]["action"].as_str(), Some(action.as_str()));
        } else {
            prop_assert!(parsed["error"].as_str().is_some_and(|error| !error.is_empty()));
        }
    }

    #[test]
    fn each_absent_required_field_is_reported_once(
        present in prop::collection::vec(any::<bool>(), 4),
    ) {
        let names = ["alpha", "beta", "gamma", "delta"];
        let schema = InputSchema {
            required: names.iter().map(|name| (*name).to_string()).collect(),
            properties: vec![(
                "alpha".to_string(),
                FieldSpec {
                    kind: FieldKind::String,
                    allowed: None,
                },
            )],
        };
        let mut input = Map::new();
        for (name, keep) in names.iter().zip(&present) {
            if *keep {
                input.insert((*name).to_string(), json!("value"));
            }
        }
        let missing = present.iter().filter(|keep| !**keep).count();
        match validate_against(&schema, &input) {
            ValidationResult::Valid => prop_assert_eq!(missing, 0),
            ValidationResult::Invalid { errors } => {
                prop_assert_eq!(errors.len(), missing);
                for error in &errors {
                    prop_assert!(!input.contains_key(error.field()));
                }
            }
        }
    }
}
