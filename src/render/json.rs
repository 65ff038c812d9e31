//! JSON renderer implementation.

use crate::error::{Error, Result};
use crate::model::NormalizedTable;

use super::options::JsonFormat;

/// Convert a normalized table to JSON (`{"columns": [...], "rows": [[...]]}`).
pub fn to_json(table: &NormalizedTable, format: JsonFormat) -> Result<String> {
    let rendered = match format {
        JsonFormat::Compact => serde_json::to_string(table),
        JsonFormat::Pretty => serde_json::to_string_pretty(table),
    };
    rendered.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}
