//! Normalization of raw worksheet tables into the fixed output schema.
//!
//! A normalized table always has the 16 [`SCHEMA_COLUMNS`] in order, one row
//! per input row, and only string cells with no null sentinels in them.
//!
//! # Example
//!
//! ```
//! use imba::model::{CellValue, RawTable};
//! use imba::normalize::normalize;
//!
//! let raw = RawTable::from_rows(
//!     ["no", "Avon_Ganhe"],
//!     vec![vec![CellValue::Number(7.0), CellValue::Number(10.5)]],
//! );
//! let table = normalize(&raw, "202501");
//!
//! assert_eq!(table.get(0, "NO"), Some("7"));
//! assert_eq!(table.get(0, "NM_CICLO"), Some("202501"));
//! assert_eq!(table.get(0, "Avon_Ganhe"), Some("10.5"));
//! ```

mod clean;

pub use clean::{clean_cell, is_null_sentinel, strip_float_suffix, NULL_SENTINELS};

use crate::cycle::Cycle;
use crate::model::{CellValue, NormalizedTable, RawTable};

/// Identifier column.
pub const NO_COLUMN: &str = "NO";

/// Column stamped with the cycle token.
pub const CYCLE_COLUMN: &str = "NM_CICLO";

/// Output columns, in output order.
pub const SCHEMA_COLUMNS: [&str; 16] = [
    "NO",
    "NM_CICLO",
    "Avon_Topo_Pontos",
    "Avon_Topo_Desconto",
    "Avon_Base_Valor",
    "Avon_Base_Valor_Centavos",
    "Avon_Ganhe",
    "Avon_Ganhe_Mecanica",
    "Natura_Topo_Pontos",
    "Natura_Topo_Desconto",
    "Natura_Base_Valor",
    "Natura_Base_Valor_Centavo",
    "Natura_Ganhe",
    "Natura_Ganhe_Mecanica",
    "Avon_Link_Cta",
    "Natura_Link_Cta",
];

/// Normalizes raw tables for one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalizer {
    token: String,
}

impl Normalizer {
    /// Create a normalizer stamping the token of `cycle`.
    pub fn new(cycle: &Cycle) -> Self {
        Self {
            token: cycle.token(),
        }
    }

    /// Create a normalizer with an explicit `NM_CICLO` token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Normalize one table. Never fails.
    pub fn normalize(&self, raw: &RawTable) -> NormalizedTable {
        normalize(raw, &self.token)
    }
}

/// Normalize `raw` into the schema, stamping `cycle_token` into `NM_CICLO`.
pub fn normalize(raw: &RawTable, cycle_token: &str) -> NormalizedTable {
    let mut table = raw.clone();
    identify_no_column(&mut table);
    table.set_column(CYCLE_COLUMN, CellValue::text(cycle_token));

    let projected = project_columns(&table);
    let rows = table
        .rows()
        .iter()
        .map(|row| {
            projected
                .iter()
                .map(|index| match index {
                    Some(i) => clean_cell(&row[*i].to_raw_string()),
                    None => String::new(),
                })
                .collect()
        })
        .collect();

    NormalizedTable::new(
        SCHEMA_COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows,
    )
}

/// Whether a header names the identifier column (" No ", "no", "NO").
pub fn is_no_column(name: &str) -> bool {
    name.trim().to_uppercase() == NO_COLUMN
}

/// Rename the first column recognized by [`is_no_column`] to exactly `NO`.
///
/// Another column already literally named `NO` is replaced by it.
fn identify_no_column(table: &mut RawTable) {
    let Some(found) = table.find_column(is_no_column) else {
        return;
    };
    if table.columns()[found] == NO_COLUMN {
        return;
    }

    let mut found = found;
    if let Some(existing) = table.column_index(NO_COLUMN) {
        table.remove_column(existing);
        if existing < found {
            found -= 1;
        }
    }
    table.rename_column(found, NO_COLUMN);
}

/// For each schema column, the source column index or `None` if absent.
fn project_columns(table: &RawTable) -> Vec<Option<usize>> {
    SCHEMA_COLUMNS
        .iter()
        .map(|name| table.column_index(name))
        .collect()
}
