use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde_json::Value;

use crate::errors::GenerationError;

use super::{flatten_entity, order_columns};

/// Write entities as CSV rows, one column per flattened field path.
///
/// Returns the number of bytes written.
pub fn write_entities_csv(
    path: &Path,
    entities: &[Value],
    field_order: &[String],
) -> Result<u64, GenerationError> {
    if entities.is_empty() {
        File::create(path)?;
        return Ok(0);
    }

    let flattened: Vec<Vec<(String, String)>> = entities.iter().map(flatten_entity).collect();

    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for row in &flattened {
        for (column, _) in row {
            if seen.insert(column.clone()) {
                columns.push(column.clone());
            }
        }
    }
    let columns = order_columns(columns, field_order);

    let writer = BufWriter::new(File::create(path)?);
    let counting = CountingWriter::new(writer);
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(counting);

    writer.write_record(&columns)?;
    for row in &flattened {
        let record: Vec<&str> = columns
            .iter()
            .map(|column| {
                row.iter()
                    .find(|(path, _)| path == column)
                    .map(|(_, value)| value.as_str())
                    .unwrap_or_default()
            })
            .collect();
        writer.write_record(&record)?;
    }

    writer.flush()?;
    let counting = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(counting.bytes_written())
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
