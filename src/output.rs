//! Output formatting for tables read back from the database.
//!
//! Supports CSV and pretty-printed JSON records.

use std::io::Write;

use anyhow::Result;
use csv::WriterBuilder;
use tracing::debug;

use crate::table::Table;

/// Writes `table` as CSV with a header line.
pub fn write_csv<W: Write>(writer: W, table: &Table) -> Result<()> {
    debug!(rows = table.len(), "Writing CSV");

    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);

    if !table.columns().is_empty() {
        writer.write_record(table.columns())?;
    }
    for row in table.rows() {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes `table` as a pretty-printed JSON array of records.
pub fn write_json<W: Write>(mut writer: W, table: &Table) -> Result<()> {
    debug!(rows = table.len(), "Writing JSON");

    serde_json::to_writer_pretty(&mut writer, &table.records())?;
    writeln!(writer)?;

    Ok(())
}
