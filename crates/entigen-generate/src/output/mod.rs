//! Output rendering for generated entities: JSON array and flattened CSV.

pub mod csv;
pub mod json;

pub use csv::write_entities_csv;
pub use json::write_entities_json;

use std::cmp::Ordering;

use serde_json::Value;

/// Flatten an entity into dotted-path/value pairs, in traversal order.
///
/// Nested maps contribute `parent.child` paths, lists contribute
/// `parent[index]` paths. Nulls render as empty text.
pub fn flatten_entity(entity: &Value) -> Vec<(String, String)> {
    let mut out = Vec::new();
    flatten_into(None, entity, &mut out);
    out
}

fn flatten_into(prefix: Option<&str>, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = match prefix {
                    Some(prefix) => format!("{prefix}.{key}"),
                    None => key.clone(),
                };
                flatten_into(Some(&path), child, out);
            }
        }
        Value::Array(list) => {
            for (index, child) in list.iter().enumerate() {
                let path = format!("{}[{index}]", prefix.unwrap_or_default());
                flatten_into(Some(&path), child, out);
            }
        }
        Value::Null => out.push((prefix.unwrap_or_default().to_string(), String::new())),
        Value::String(text) => out.push((prefix.unwrap_or_default().to_string(), text.clone())),
        other => out.push((prefix.unwrap_or_default().to_string(), other.to_string())),
    }
}

/// Order output columns: paths named in `field_order` sort by their list
/// position; the rest sort after all ordered ones, by name, ascending.
///
/// Layout only — generation semantics never depend on this.
pub fn order_columns(mut columns: Vec<String>, field_order: &[String]) -> Vec<String> {
    columns.sort_by(|a, b| {
        let rank_a = field_order.iter().position(|field| field == a);
        let rank_b = field_order.iter().position(|field| field == b);
        match (rank_a, rank_b) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.cmp(b),
        }
    });
    columns
}
