//! Delimited-text (CSV) renderer.

use crate::error::Result;
use crate::model::NormalizedTable;
use std::io::Write;

use super::options::{CsvOptions, UTF8_BOM};

/// Write a table as CSV: a header row, then one record per row, `\n`-terminated.
pub fn write_csv<W: Write>(writer: W, table: &NormalizedTable, options: &CsvOptions) -> Result<()> {
    let mut writer = writer;
    if options.utf8_bom {
        writer.write_all(UTF8_BOM)?;
    }

    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv_writer.write_record(table.columns())?;
    for row in table.rows() {
        csv_writer.write_record(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Render a table as CSV bytes.
pub fn to_csv(table: &NormalizedTable, options: &CsvOptions) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, table, options)?;
    Ok(buffer)
}
