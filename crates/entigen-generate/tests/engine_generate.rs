use chrono::NaiveDate;
use serde_json::{Value, json};

use entigen_core::ConfigDocument;
use entigen_generate::{GenerateOptions, GenerationEngine, GenerationError};

fn engine_with_seed(doc: &str, seed: u64) -> GenerationEngine {
    let document = ConfigDocument::from_toml_str(doc).expect("parse document");
    let options = GenerateOptions {
        seed: Some(seed),
        today: NaiveDate::from_ymd_opt(2024, 1, 1),
    };
    GenerationEngine::new(document, options).expect("build engine")
}

fn engine_from_toml(doc: &str) -> GenerationEngine {
    engine_with_seed(doc, 7)
}

const SINGLE_SPEC: &str = r#"
targetType = "PERSON"

[[instanceTypes]]
name = "A"
type = "PERSON"
condition = "true"

[[generators]]
target = { type = "PERSON", field = "age" }
logic = { A = "42" }
"#;

#[test]
fn generates_one_entity_with_scripted_field() {
    let mut engine = engine_from_toml(SINGLE_SPEC);
    let entities = engine.generate("PERSON").expect("generate");

    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0]["age"], json!(42));
    assert_eq!(entities[0]["_instanceName"], json!("A"));
    assert_eq!(entities[0]["_instanceType"], json!("PERSON"));
}

#[test]
fn false_condition_yields_no_entity() {
    let doc = r#"
[[instanceTypes]]
name = "A"
type = "PERSON"
condition = "false"

[[generators]]
target = { type = "PERSON", field = "age" }
logic = { A = "42" }
"#;
    let mut engine = engine_from_toml(doc);
    let entities = engine.generate("PERSON").expect("generate");
    assert!(entities.is_empty());
    assert_eq!(engine.summary().specs_skipped, 1);
}

#[test]
fn later_specs_see_earlier_entities() {
    let doc = r#"
[[instanceTypes]]
name = "A"
type = "PERSON"
condition = "true"

[[instanceTypes]]
name = "B"
type = "PERSON"
condition = "_A.age == 42"

[[generators]]
target = { type = "PERSON", field = "age" }
logic = { A = "42" }

[[generators]]
target = { type = "PERSON", field = "parentAge" }
logic = { B = "_A.age" }
"#;
    let mut engine = engine_from_toml(doc);
    let entities = engine.generate("PERSON").expect("generate");

    assert_eq!(entities.len(), 2);
    assert_eq!(entities[1]["_instanceName"], json!("B"));
    assert_eq!(entities[1]["parentAge"], json!(42));
}

#[test]
fn every_matching_condition_is_evaluated_in_order() {
    let doc = r#"
[[instanceTypes]]
name = "A"
type = "PERSON"
condition = "true"

[[instanceTypes]]
name = "B"
type = "PERSON"
condition = "false"

[[instanceTypes]]
name = "C"
type = "PERSON"
condition = "true"

[[instanceTypes]]
name = "D"
type = "PET"
condition = "true"
"#;
    let mut engine = engine_from_toml(doc);
    let entities = engine.generate("PERSON").expect("generate");

    let names: Vec<&Value> = entities
        .iter()
        .map(|entity| &entity["_instanceName"])
        .collect();
    assert_eq!(names, [&json!("A"), &json!("C")]);

    let summary = engine.summary();
    assert_eq!(summary.conditions_evaluated, 3);
    assert_eq!(summary.specs_skipped, 1);
}

#[test]
fn rules_run_in_declared_order_and_last_write_wins() {
    let doc = r#"
[[instanceTypes]]
name = "A"
type = "PERSON"
condition = "true"

[[generators]]
target = { type = "PERSON", field = "age" }
logic = { A = "1" }

[[generators]]
target = { type = "PERSON", field = "age" }
logic = { A = "2" }
"#;
    let mut engine = engine_from_toml(doc);
    let entities = engine.generate("PERSON").expect("generate");
    assert_eq!(entities[0]["age"], json!(2));
}

#[test]
fn rules_see_fields_written_by_earlier_rules() {
    let doc = r#"
[[instanceTypes]]
name = "A"
type = "PERSON"
condition = "true"

[[generators]]
target = { type = "PERSON", field = "age" }
logic = { A = "41" }

[[generators]]
target = { type = "PERSON", field = "ageNextYear" }
logic = { A = "_this.age + 1" }
"#;
    let mut engine = engine_from_toml(doc);
    let entities = engine.generate("PERSON").expect("generate");
    assert_eq!(entities[0]["ageNextYear"], json!(42));
}

#[test]
fn missing_logic_entry_is_a_no_op() {
    let doc = r#"
[[instanceTypes]]
name = "A"
type = "PERSON"
condition = "true"

[[instanceTypes]]
name = "B"
type = "PERSON"
condition = "true"

[[generators]]
target = { type = "PERSON", field = "nickname" }
logic = { A = '"boss"' }
"#;
    let mut engine = engine_from_toml(doc);
    let entities = engine.generate("PERSON").expect("generate");

    assert_eq!(entities.len(), 2);
    assert_eq!(entities[0]["nickname"], json!("boss"));
    assert!(entities[1].get("nickname").is_none());
}

#[test]
fn rule_without_target_field_runs_for_side_effects_only() {
    let doc = r#"
[[instanceTypes]]
name = "A"
type = "PERSON"
condition = "true"

[[generators]]
target = { type = "PERSON" }
logic = { A = "1 + 1" }
"#;
    let mut engine = engine_from_toml(doc);
    let entities = engine.generate("PERSON").expect("generate");

    let fields = entities[0].as_object().expect("entity object");
    assert_eq!(fields.len(), 2); // only the reserved tags
}

#[test]
fn non_boolean_condition_is_fatal() {
    let doc = r#"
[[instanceTypes]]
name = "A"
type = "PERSON"
condition = "42"
"#;
    let mut engine = engine_from_toml(doc);
    let err = engine.generate("PERSON").expect_err("must fail");
    assert!(matches!(err, GenerationError::NonBooleanCondition { .. }));
}

#[test]
fn undefined_symbol_in_generator_is_fatal() {
    let doc = r#"
[[instanceTypes]]
name = "A"
type = "PERSON"
condition = "true"

[[generators]]
target = { type = "PERSON", field = "age" }
logic = { A = "undefinedHelper()" }
"#;
    let mut engine = engine_from_toml(doc);
    let err = engine.generate("PERSON").expect_err("must fail");
    assert!(matches!(err, GenerationError::Script { .. }));
}

#[test]
fn incompatible_field_path_write_is_fatal() {
    let doc = r#"
[[instanceTypes]]
name = "A"
type = "PERSON"
condition = "true"

[[generators]]
target = { type = "PERSON", field = "name" }
logic = { A = '"Taro"' }

[[generators]]
target = { type = "PERSON", field = "name.first" }
logic = { A = '"T"' }
"#;
    let mut engine = engine_from_toml(doc);
    let err = engine.generate("PERSON").expect_err("must fail");
    assert!(matches!(err, GenerationError::Core(_)));
}

#[test]
fn nested_paths_build_entity_structure() {
    let doc = r#"
[[instanceTypes]]
name = "A"
type = "PERSON"
condition = "true"

[[generators]]
target = { type = "PERSON", field = "phones[0].number" }
logic = { A = '"03-1111-2222"' }

[[generators]]
target = { type = "PERSON", field = "phones[0].type" }
logic = { A = '"HOME"' }
"#;
    let mut engine = engine_from_toml(doc);
    let entities = engine.generate("PERSON").expect("generate");
    assert_eq!(
        entities[0]["phones"],
        json!([{"number": "03-1111-2222", "type": "HOME"}])
    );
}

#[test]
fn requested_count_falls_back_to_default() {
    let malformed = engine_from_toml(
        r#"
numberToGenerate = "not-a-number"
"#,
    );
    assert_eq!(malformed.requested_count(), 10);

    let missing = engine_from_toml("");
    assert_eq!(missing.requested_count(), 10);

    let valid = engine_from_toml(r#"numberToGenerate = "3""#);
    assert_eq!(valid.requested_count(), 3);
}

#[test]
fn run_passes_concatenates_and_reuses_compiled_scripts() {
    let mut engine = engine_from_toml(SINGLE_SPEC);
    let entities = engine.run_passes("PERSON", 3).expect("run passes");

    assert_eq!(entities.len(), 3);
    let summary = engine.summary();
    assert_eq!(summary.passes, 3);
    assert_eq!(summary.entities_generated, 3);
    // one distinct generator script, compiled once across all passes
    assert_eq!(summary.scripts_compiled, 1);
}

#[test]
fn cross_entity_visibility_does_not_leak_across_passes() {
    let doc = r#"
[[instanceTypes]]
name = "A"
type = "PERSON"
condition = "true"

[[instanceTypes]]
name = "B"
type = "PERSON"
condition = "_A.age == 42"

[[generators]]
target = { type = "PERSON", field = "age" }
logic = { A = "42" }
"#;
    let mut engine = engine_from_toml(doc);
    let entities = engine.run_passes("PERSON", 2).expect("run passes");
    // each pass generates A then B, independently
    assert_eq!(entities.len(), 4);
}

#[test]
fn seeded_runs_are_deterministic() {
    let doc = r#"
[[instanceTypes]]
name = "A"
type = "PERSON"
condition = "true"

[[generators]]
target = { type = "PERSON", field = "lucky" }
logic = { A = "randomIntBetween(0, 1000000)" }

[[generators]]
target = { type = "PERSON", field = "account" }
logic = { A = "randomDigit(8)" }
"#;
    let mut first = engine_with_seed(doc, 99);
    let mut second = engine_with_seed(doc, 99);

    let a = first.run_passes("PERSON", 5).expect("first run");
    let b = second.run_passes("PERSON", 5).expect("second run");
    assert_eq!(a, b);
}
