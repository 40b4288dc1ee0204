use std::collections::HashMap;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// A named request to conditionally create one entity of a given type.
///
/// Declaration order is semantically significant: specs are considered in
/// the order they appear in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceSpec {
    pub name: String,
    pub type_name: String,
    pub condition: String,
}

/// One generator row: a target field plus one script per instance name.
///
/// A missing entry in `logic` for a given instance name means "no-op for
/// that instance", not an error. A missing `field` means the script runs for
/// its side effects only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorRule {
    pub target_type: String,
    pub target_field: Option<String>,
    pub logic: HashMap<String, String>,
}

/// One row of the grouped key/value lookup table consumed by DSL helpers.
#[derive(Debug, Clone, PartialEq)]
pub struct TypelistRow {
    pub type_name: String,
    pub key: String,
    pub value: Value,
}

/// The tabular rule document driving a generation session.
///
/// The document is read-only during a run. It is backed by a generic JSON
/// object tree so TOML and JSON sources behave identically, and exposes both
/// raw accessors (`value`/`list`/`bean`) and typed views over the rule
/// tables. Typed views preserve declaration order verbatim.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    root: Map<String, Value>,
}

impl ConfigDocument {
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(Error::InvalidDocument(format!(
                "document root must be a table, found {other}"
            ))),
        }
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(contents)?)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Self::from_value(toml::from_str(contents)?)
    }

    /// Load a document from a `.json` or `.toml` file, chosen by extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&contents),
            Some("json") => Self::from_json_str(&contents),
            other => Err(Error::InvalidDocument(format!(
                "unsupported document extension '{}'",
                other.unwrap_or("")
            ))),
        }
    }

    /// All root entries, in document order.
    pub fn root(&self) -> &Map<String, Value> {
        &self.root
    }

    /// A root scalar rendered as text, or `None` for missing/structured values.
    pub fn value(&self, key: &str) -> Option<String> {
        match self.root.get(key)? {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// A root list, or an empty slice when absent.
    pub fn list(&self, key: &str) -> &[Value] {
        self.root
            .get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// A nested root group.
    pub fn bean(&self, key: &str) -> Option<&Map<String, Value>> {
        self.root.get(key).and_then(Value::as_object)
    }

    /// The `instanceTypes` table, in declaration order.
    pub fn instance_specs(&self) -> Result<Vec<InstanceSpec>> {
        self.list("instanceTypes")
            .iter()
            .enumerate()
            .map(|(row, value)| {
                let entry = require_object("instanceTypes", row, value)?;
                Ok(InstanceSpec {
                    name: require_text("instanceTypes", row, entry, "name")?,
                    type_name: require_text("instanceTypes", row, entry, "type")?,
                    condition: require_text("instanceTypes", row, entry, "condition")?,
                })
            })
            .collect()
    }

    /// The `generators` table, in declaration order.
    pub fn generator_rules(&self) -> Result<Vec<GeneratorRule>> {
        self.list("generators")
            .iter()
            .enumerate()
            .map(|(row, value)| {
                let entry = require_object("generators", row, value)?;
                let target = entry
                    .get("target")
                    .and_then(Value::as_object)
                    .ok_or_else(|| {
                        Error::InvalidDocument(format!(
                            "generators[{row}] is missing a 'target' table"
                        ))
                    })?;
                let target_type = target
                    .get("type")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        Error::InvalidDocument(format!(
                            "generators[{row}].target is missing 'type'"
                        ))
                    })?
                    .to_string();
                let target_field = target
                    .get("field")
                    .and_then(Value::as_str)
                    .map(|field| field.to_string());

                let mut logic = HashMap::new();
                if let Some(scripts) = entry.get("logic").and_then(Value::as_object) {
                    for (instance_name, script) in scripts {
                        let script = script.as_str().ok_or_else(|| {
                            Error::InvalidDocument(format!(
                                "generators[{row}].logic.{instance_name} must be script text"
                            ))
                        })?;
                        logic.insert(instance_name.clone(), script.to_string());
                    }
                }

                Ok(GeneratorRule {
                    target_type,
                    target_field,
                    logic,
                })
            })
            .collect()
    }

    /// The `typelists` table, in declaration order.
    pub fn typelist_rows(&self) -> Result<Vec<TypelistRow>> {
        self.list("typelists")
            .iter()
            .enumerate()
            .map(|(row, value)| {
                let entry = require_object("typelists", row, value)?;
                Ok(TypelistRow {
                    type_name: require_text("typelists", row, entry, "type")?,
                    key: require_text("typelists", row, entry, "key")?,
                    value: entry.get("value").cloned().unwrap_or(Value::Null),
                })
            })
            .collect()
    }

    /// Optional output column ordering (affects layout only, not semantics).
    pub fn field_order(&self) -> Vec<String> {
        self.list("fieldOrder")
            .iter()
            .filter_map(Value::as_str)
            .map(|name| name.to_string())
            .collect()
    }
}

fn require_object<'a>(table: &str, row: usize, value: &'a Value) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| Error::InvalidDocument(format!("{table}[{row}] must be a table")))
}

fn require_text(table: &str, row: usize, entry: &Map<String, Value>, key: &str) -> Result<String> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .map(|text| text.to_string())
        .ok_or_else(|| Error::InvalidDocument(format!("{table}[{row}] is missing '{key}'")))
}
