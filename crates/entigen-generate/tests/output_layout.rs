use std::path::PathBuf;

use serde_json::{Value, json};

use entigen_generate::output::{write_entities_csv, write_entities_json};

fn temp_path(name: &str, ext: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "entigen_{name}_{}.{ext}",
        std::process::id()
    ))
}

fn sample_entities() -> Vec<Value> {
    vec![
        json!({
            "_instanceType": "PERSON",
            "_instanceName": "A",
            "name": {"first": "Taro", "last": "Yamada"},
            "age": 30,
            "phones": [{"number": "03-1111-2222"}],
        }),
        json!({
            "_instanceType": "PERSON",
            "_instanceName": "B",
            "name": {"first": "Hanako", "last": "Yamada"},
            "nickname": null,
        }),
    ]
}

#[test]
fn csv_orders_listed_columns_first_then_by_name() {
    let path = temp_path("layout", "csv");
    let field_order = vec!["name.first".to_string(), "age".to_string()];
    let bytes = write_entities_csv(&path, &sample_entities(), &field_order).expect("write csv");

    let content = std::fs::read_to_string(&path).expect("read back");
    std::fs::remove_file(&path).ok();
    assert_eq!(bytes, content.len() as u64);

    let mut lines = content.lines();
    assert_eq!(
        lines.next(),
        Some("name.first,age,_instanceName,_instanceType,name.last,nickname,phones[0].number")
    );
    assert_eq!(
        lines.next(),
        Some("Taro,30,A,PERSON,Yamada,,03-1111-2222")
    );
    // null and absent fields both render empty
    assert_eq!(lines.next(), Some("Hanako,,B,PERSON,Yamada,,"));
    assert_eq!(lines.next(), None);
}

#[test]
fn csv_without_field_order_sorts_columns_by_name() {
    let path = temp_path("sorted", "csv");
    let entities = vec![json!({"b": 2, "a": 1, "c": 3})];
    write_entities_csv(&path, &entities, &[]).expect("write csv");

    let content = std::fs::read_to_string(&path).expect("read back");
    std::fs::remove_file(&path).ok();
    assert_eq!(content.lines().next(), Some("a,b,c"));
}

#[test]
fn json_writes_a_pretty_array_that_round_trips() {
    let path = temp_path("result", "json");
    let entities = sample_entities();
    let bytes = write_entities_json(&path, &entities).expect("write json");

    let content = std::fs::read_to_string(&path).expect("read back");
    std::fs::remove_file(&path).ok();
    assert_eq!(bytes, content.len() as u64);
    assert!(content.starts_with('['));

    let parsed: Vec<Value> = serde_json::from_str(&content).expect("parse back");
    assert_eq!(parsed, entities);
}

#[test]
fn empty_entity_list_writes_an_empty_document() {
    let json_path = temp_path("empty", "json");
    let csv_path = temp_path("empty", "csv");

    write_entities_json(&json_path, &[]).expect("write json");
    let csv_bytes = write_entities_csv(&csv_path, &[], &[]).expect("write csv");
    assert_eq!(csv_bytes, 0);

    let json = std::fs::read_to_string(&json_path).expect("read json");
    let csv = std::fs::read_to_string(&csv_path).expect("read csv");
    std::fs::remove_file(&json_path).ok();
    std::fs::remove_file(&csv_path).ok();

    assert_eq!(json, "[]");
    assert_eq!(csv, "");
}
