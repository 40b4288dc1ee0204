use serde_json::Value;

use crate::error::{Error, Result};

/// One step of a parsed field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Map lookup by key.
    Key(String),
    /// List lookup by zero-based index.
    Index(usize),
}

/// A parsed dotted field path such as `phones[1].number`.
///
/// Paths address positions inside the nested map/list tree of a generated
/// entity. `set` materializes missing intermediate maps and extends lists
/// with nulls, matching how generator rules populate entities incrementally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<PathSegment>,
}

impl FieldPath {
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(Error::InvalidPath {
                path: raw.to_string(),
                reason: "empty path".to_string(),
            });
        }

        let mut segments = Vec::new();
        for part in raw.split('.') {
            let (name, indexes) = split_indexes(raw, part)?;
            if name.is_empty() && indexes.is_empty() {
                return Err(Error::InvalidPath {
                    path: raw.to_string(),
                    reason: "empty path segment".to_string(),
                });
            }
            if !name.is_empty() {
                segments.push(PathSegment::Key(name.to_string()));
            }
            for index in indexes {
                segments.push(PathSegment::Index(index));
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Read the value at this path, or `None` if any step is absent.
    pub fn get<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut current = root;
        for segment in &self.segments {
            current = match segment {
                PathSegment::Key(key) => current.as_object()?.get(key)?,
                PathSegment::Index(index) => current.as_array()?.get(*index)?,
            };
        }
        Some(current)
    }

    /// Write `value` at this path, creating intermediate containers.
    ///
    /// A step that runs into an existing value of the wrong shape (indexing
    /// into a non-list, keying into a non-map) is an error; the caller treats
    /// that as fatal.
    pub fn set(&self, root: &mut Value, value: Value) -> Result<()> {
        let mut current = root;
        let last = self.segments.len() - 1;

        for (position, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) => {
                    let map = match current {
                        Value::Object(map) => map,
                        Value::Null => {
                            *current = Value::Object(serde_json::Map::new());
                            match current {
                                Value::Object(map) => map,
                                _ => unreachable!(),
                            }
                        }
                        other => {
                            return Err(self.incompatible(key, other));
                        }
                    };
                    if position == last {
                        map.insert(key.clone(), value);
                        return Ok(());
                    }
                    current = map.entry(key.clone()).or_insert(Value::Null);
                }
                PathSegment::Index(index) => {
                    let list = match current {
                        Value::Array(list) => list,
                        Value::Null => {
                            *current = Value::Array(Vec::new());
                            match current {
                                Value::Array(list) => list,
                                _ => unreachable!(),
                            }
                        }
                        other => {
                            return Err(self.incompatible(&format!("[{index}]"), other));
                        }
                    };
                    if list.len() <= *index {
                        list.resize(*index + 1, Value::Null);
                    }
                    if position == last {
                        list[*index] = value;
                        return Ok(());
                    }
                    current = &mut list[*index];
                }
            }
        }

        unreachable!("paths always contain at least one segment")
    }

    fn incompatible(&self, segment: &str, found: &Value) -> Error {
        Error::IncompatiblePath {
            path: self.raw.clone(),
            segment: segment.to_string(),
            reason: format!("expected container, found {}", type_name(found)),
        }
    }
}

fn split_indexes<'a>(raw: &str, part: &'a str) -> Result<(&'a str, Vec<usize>)> {
    let Some(open) = part.find('[') else {
        return Ok((part, Vec::new()));
    };

    let name = &part[..open];
    let mut indexes = Vec::new();
    let mut rest = &part[open..];
    while !rest.is_empty() {
        if !rest.starts_with('[') {
            return Err(invalid(raw, "expected '['"));
        }
        let Some(close) = rest.find(']') else {
            return Err(invalid(raw, "unclosed index"));
        };
        let index: usize = rest[1..close]
            .parse()
            .map_err(|_| invalid(raw, "index is not a number"))?;
        indexes.push(index);
        rest = &rest[close + 1..];
    }

    Ok((name, indexes))
}

fn invalid(path: &str, reason: &str) -> Error {
    Error::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}
