use std::path::Path;

use serde_json::Value;

use crate::errors::GenerationError;

/// Write entities as a pretty-printed JSON array.
///
/// Returns the number of bytes written.
pub fn write_entities_json(path: &Path, entities: &[Value]) -> Result<u64, GenerationError> {
    let bytes = serde_json::to_vec_pretty(entities)?;
    std::fs::write(path, &bytes)?;
    Ok(bytes.len() as u64)
}
