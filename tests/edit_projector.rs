#[allow(dead_code)]
mod helpers;

use flow_builder::document::*;
use flow_builder::edit::{self, Edit};
use flow_builder::error::Phase;
use helpers::*;
use serde_json::{Value, json};

fn conditions_json(doc: &AutomationDocument) -> Value {
    to_json(doc)["do"][0]["conditions"].clone()
}

fn condition_keys(doc: &AutomationDocument) -> Vec<String> {
    conditions_json(doc)
        .as_object()
        .map(|object| object.keys().cloned().collect())
        .unwrap_or_default()
}

// =============================================================================
// Instructions
// =============================================================================

#[test]
fn test_add_to_empty_root() {
    let before = doc(json!({ "name": "Automation", "do": [] }));
    let instruction = Instruction::from_value(json!({ "foo": null }));

    let after = edit::add_instruction(&before, &ListPath::root(), 0, instruction).unwrap();
    assert_eq!(to_json(&after)["do"], json!([{ "foo": null }]));
    // Input untouched
    assert!(before.instructions.is_empty());
}

#[test]
fn test_add_then_remove_restores_list() {
    let before = load(LINEAR);
    for index in 0..=before.instructions.len() {
        let added =
            edit::add_instruction(&before, &ListPath::root(), index, emit("inserted")).unwrap();
        assert_eq!(added.instructions[index], emit("inserted"));

        let removed = edit::remove_instruction(&added, &ListPath::root(), index).unwrap();
        assert_eq!(removed, before);
    }
}

#[test]
fn test_add_into_branch_and_body() {
    let nested = load(NESTED);
    let branch_path = body(0).child(0, Nested::Branch { key: "{{item.valid}}".into() });

    let after = edit::add_instruction(&nested, &branch_path, 1, emit("item.logged")).unwrap();
    let json = to_json(&after);
    assert_eq!(
        json["do"][0]["repeat"]["do"][0]["conditions"]["{{item.valid}}"],
        json!([
            { "emit": { "event": "item.accepted" } },
            { "emit": { "event": "item.logged" } }
        ])
    );

    let after = edit::add_instruction(&nested, &body(0), 0, emit("first")).unwrap();
    assert_eq!(
        to_json(&after)["do"][0]["repeat"]["do"][0],
        json!({ "emit": { "event": "first" } })
    );
}

#[test]
fn test_add_into_parallel_block() {
    let nested = load(NESTED);
    let parallel = ListPath::root().child(1, Nested::Parallel);

    let after = edit::add_instruction(&nested, &parallel, 2, set("done", json!(true))).unwrap();
    assert_eq!(to_json(&after)["do"][1]["all"].as_array().map(Vec::len), Some(3));
}

#[test]
fn test_add_into_missing_default_creates_it() {
    let before = doc(json!({ "do": [{ "conditions": { "$a": [] } }] }));

    let after = edit::add_instruction(&before, &branch(0, "default"), 0, emit("fallback")).unwrap();
    assert_eq!(
        conditions_json(&after),
        json!({ "$a": [], "default": [{ "emit": { "event": "fallback" } }] })
    );
}

#[test]
fn test_edits_leave_other_instructions_untouched() {
    let stored = json!({
        "do": [
            { "conditions": { "$a": "{{kept}}", "default": [] } },
            { "wait": { "timeout": 10 } },
            { "set": { "value": 1, "name": "a", "lifespan": null } },
            { "repeat": { "on": "{{items}}", "do": { "emit": {} } } }
        ]
    });
    let before = doc(stored.clone());

    let after = edit::add_instruction(&before, &ListPath::root(), 4, emit("x")).unwrap();
    let written = serde_json::to_string(&to_json(&after)["do"]).unwrap();
    let mut expected = stored["do"].as_array().cloned().unwrap();
    expected.push(json!({ "emit": { "event": "x" } }));
    assert_eq!(written, Value::Array(expected).to_string());
}

#[test]
fn test_edit_instruction_replaces_in_place() {
    let before = load(LINEAR);

    let after =
        edit::edit_instruction(&before, &ListPath::root(), 1, set("user.greeted", json!(1))).unwrap();
    assert_eq!(
        to_json(&after)["do"],
        json!([
            { "emit": { "event": "welcome", "payload": { "user": "{{payload.user}}" } } },
            { "set": { "name": "user.greeted", "value": 1 } }
        ])
    );
    // Untouched keys survive
    assert_eq!(after.name(), Some("Welcome new users"));
    assert_eq!(to_json(&after)["description"], json!("Greets every new account"));
}

#[test]
fn test_out_of_bounds_is_an_error() {
    let before = load(LINEAR);

    let err = edit::edit_instruction(&before, &ListPath::root(), 2, emit("x")).unwrap_err();
    assert_eq!(err.code, "E001");
    assert_eq!(err.phase, Phase::Project);

    let err = edit::add_instruction(&before, &ListPath::root(), 3, emit("x")).unwrap_err();
    assert_eq!(err.code, "E001");

    let err = edit::remove_instruction(&before, &ListPath::root(), 2).unwrap_err();
    assert_eq!(err.code, "E001");
}

#[test]
fn test_path_into_wrong_kind_is_an_error() {
    let before = load(LINEAR);

    let err = edit::add_instruction(&before, &body(0), 0, emit("x")).unwrap_err();
    assert_eq!(err.code, "E002");

    let err = edit::edit_condition(&before, &ListPath::root().at(0), None, "$a").unwrap_err();
    assert_eq!(err.code, "E003");
}

#[test]
fn test_unknown_branch_is_an_error() {
    let before = load(BRANCHING);
    let err = edit::add_instruction(&before, &branch(0, "$nope"), 0, emit("x")).unwrap_err();
    assert_eq!(err.code, "E004");
    assert!(err.to_string().contains("$nope"));
}

// =============================================================================
// Conditions
// =============================================================================

#[test]
fn test_add_two_conditions_to_empty_block() {
    let before = doc(json!({ "do": [{ "conditions": {} }] }));
    let block = ListPath::root().at(0);

    let once = edit::edit_condition(&before, &block, None, "$a == 1").unwrap();
    let twice = edit::edit_condition(&once, &block, None, "$a == 2").unwrap();

    assert_eq!(
        conditions_json(&twice),
        json!({ "$a == 1": [], "$a == 2": [], "default": [] })
    );
    assert_eq!(condition_keys(&twice), vec!["$a == 1", "$a == 2", "default"]);
}

#[test]
fn test_rename_preserves_bodies() {
    let before = doc(json!({
        "do": [{
            "conditions": {
                "$a==1": [{ "emit": { "event": "x" } }],
                "default": [{ "emit": { "event": "y" } }]
            }
        }]
    }));

    let after = edit::edit_condition(&before, &ListPath::root().at(0), Some("$a==1"), "$a==2").unwrap();
    assert_eq!(
        conditions_json(&after),
        json!({
            "$a==2": [{ "emit": { "event": "x" } }],
            "default": [{ "emit": { "event": "y" } }]
        })
    );
    assert_eq!(condition_keys(&after), vec!["$a==2", "default"]);
}

#[test]
fn test_any_condition_edit_moves_default_last() {
    let before = load(BRANCHING);
    assert_eq!(condition_keys(&before), vec!["default", "{{payload.total}} > 100"]);

    let after =
        edit::edit_condition(&before, &ListPath::root().at(0), None, "{{payload.vip}}").unwrap();
    insta::assert_json_snapshot!(to_json(&after), @r###"
    {
      "when": {
        "events": [
          "order.created"
        ]
      },
      "do": [
        {
          "conditions": {
            "{{payload.total}} > 100": [
              {
                "set": {
                  "name": "order.vip",
                  "value": true
                }
              }
            ],
            "{{payload.vip}}": [],
            "default": [
              {
                "emit": {
                  "event": "order.standard"
                }
              }
            ]
          }
        },
        {
          "emit": {
            "event": "order.routed"
          }
        }
      ],
      "name": "Route orders",
      "slug": "route-orders"
    }
    "###);
}

#[test]
fn test_rename_onto_existing_key_keeps_existing_branch() {
    let before = doc(json!({
        "do": [{
            "conditions": {
                "$a": [{ "emit": { "event": "a" } }],
                "$b": [{ "emit": { "event": "b" } }]
            }
        }]
    }));

    let after = edit::edit_condition(&before, &ListPath::root().at(0), Some("$a"), "$b").unwrap();
    assert_eq!(
        conditions_json(&after),
        json!({ "$b": [{ "emit": { "event": "b" } }], "default": [] })
    );
}

#[test]
fn test_default_branch_cannot_be_renamed() {
    let before = load(BRANCHING);
    let block = ListPath::root().at(0);

    let err = edit::edit_condition(&before, &block, Some("default"), "$z").unwrap_err();
    assert_eq!(err.code, "E007");

    let unchanged = edit::edit_condition(&before, &block, Some("default"), "default").unwrap();
    assert_eq!(condition_keys(&unchanged), vec!["{{payload.total}} > 100", "default"]);
}

#[test]
fn test_remove_condition() {
    let before = load(BRANCHING);
    let block = ListPath::root().at(0);

    let after = edit::apply(
        &before,
        Edit::RemoveCondition {
            at: block.clone(),
            key: "{{payload.total}} > 100".into(),
        },
    )
    .unwrap();
    assert_eq!(condition_keys(&after), vec!["default"]);

    let err = edit::apply(
        &before,
        Edit::RemoveCondition {
            at: block.clone(),
            key: "default".into(),
        },
    )
    .unwrap_err();
    assert_eq!(err.code, "E007");

    let err = edit::apply(
        &before,
        Edit::RemoveCondition {
            at: block,
            key: "$missing".into(),
        },
    )
    .unwrap_err();
    assert_eq!(err.code, "E004");
}

// =============================================================================
// Trigger and output
// =============================================================================

#[test]
fn test_edit_trigger_on_bare_automation() {
    let before = doc(json!({ "name": "Automation", "do": [] }));
    let trigger = serde_json::from_value(json!({ "events": ["foo"] })).unwrap();

    let after = edit::edit_trigger(&before, Some(trigger)).unwrap();
    assert_eq!(
        to_json(&after),
        json!({ "name": "Automation", "when": { "events": ["foo"] }, "do": [] })
    );
}

#[test]
fn test_edit_output() {
    let before = load(LINEAR);

    let after = edit::apply(&before, Edit::EditOutput { output: Some(json!({ "ok": true })) }).unwrap();
    assert_eq!(to_json(&after)["output"], json!({ "ok": true }));

    let cleared = edit::apply(&after, Edit::EditOutput { output: Some(Value::Null) }).unwrap();
    assert!(to_json(&cleared).get("output").is_none());
}

// =============================================================================
// Edits as JSON
// =============================================================================

#[test]
fn test_edit_wire_format() {
    let edit: Edit = serde_json::from_value(json!({
        "action": "editCondition",
        "at": { "parent": [], "index": 0 },
        "key": null,
        "newKey": "$x"
    }))
    .unwrap();
    assert_eq!(
        edit,
        Edit::EditCondition {
            at: ListPath::root().at(0),
            key: None,
            new_key: "$x".into(),
        }
    );

    let edit: Edit = serde_json::from_value(json!({
        "action": "addInstruction",
        "parent": [{ "index": 0, "into": { "type": "body" } }],
        "index": 0,
        "instruction": { "emit": { "event": "e" } }
    }))
    .unwrap();
    assert_eq!(
        edit,
        Edit::AddInstruction {
            parent: body(0),
            index: 0,
            instruction: emit("e"),
        }
    );
}
