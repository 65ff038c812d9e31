//! Sheet mappings: which worksheet feeds which output file.
//!
//! Each [`SheetMapping`] pairs a logical key with the sheet names it accepts
//! and the transform applied to the sheet. Mappings are processed in order
//! and independently: a missing sheet only affects its own mapping.

use crate::cycle::Cycle;
use crate::error::Result;
use crate::model::{NormalizedTable, RawTable};
use crate::normalize::Normalizer;
use crate::xlsx::XlsxReader;
use tracing::{info, warn};

/// Transform applied to a matched sheet.
pub type Transform = fn(&Normalizer, &RawTable) -> NormalizedTable;

/// One logical output and the sheets that can feed it.
#[derive(Debug, Clone, Copy)]
pub struct SheetMapping {
    /// Logical name, used in the output file name.
    pub key: &'static str,
    /// Acceptable sheet names, compared case-insensitively, in priority order.
    pub sheet_names: &'static [&'static str],
    pub transform: Transform,
}

impl SheetMapping {
    /// Output file name for this mapping in `cycle`.
    pub fn file_name(&self, cycle: &Cycle) -> String {
        output_file_name(self.key, cycle)
    }

    /// The real name of the first acceptable sheet present in the workbook.
    pub fn resolve<'a>(&self, reader: &'a XlsxReader) -> Option<&'a str> {
        self.sheet_names
            .iter()
            .find_map(|name| reader.find_sheet(name))
    }
}

fn normalize_general(normalizer: &Normalizer, raw: &RawTable) -> NormalizedTable {
    normalizer.normalize(raw)
}

/// The mappings this crate knows about.
pub fn default_mappings() -> Vec<SheetMapping> {
    vec![SheetMapping {
        key: "Geral",
        sheet_names: &["Geral"],
        transform: normalize_general,
    }]
}

/// `Nova_Imba_<key>_C<cc>.csv`
pub fn output_file_name(key: &str, cycle: &Cycle) -> String {
    format!("Nova_Imba_{}_C{}.csv", key, cycle.padded())
}

/// A mapping whose sheet was found and normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedSheet {
    pub key: String,
    /// Sheet name as it appears in the workbook.
    pub sheet_name: String,
    pub file_name: String,
    pub table: NormalizedTable,
}

/// Result of one mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingOutcome {
    Processed(ProcessedSheet),
    /// No acceptable sheet exists; nothing is produced for this key.
    MissingSheet { key: String },
}

impl MappingOutcome {
    pub fn key(&self) -> &str {
        match self {
            MappingOutcome::Processed(sheet) => &sheet.key,
            MappingOutcome::MissingSheet { key } => key,
        }
    }

    pub fn processed(&self) -> Option<&ProcessedSheet> {
        match self {
            MappingOutcome::Processed(sheet) => Some(sheet),
            MappingOutcome::MissingSheet { .. } => None,
        }
    }
}

/// Run every mapping against the workbook.
///
/// Missing sheets are reported per mapping; a sheet that is present but
/// cannot be read fails the whole call.
pub fn process_workbook(
    reader: &XlsxReader,
    cycle: &Cycle,
    mappings: &[SheetMapping],
) -> Result<Vec<MappingOutcome>> {
    let normalizer = Normalizer::new(cycle);
    let mut outcomes = Vec::with_capacity(mappings.len());

    for mapping in mappings {
        let Some(sheet_name) = mapping.resolve(reader) else {
            warn!(key = mapping.key, accepted = ?mapping.sheet_names, "sheet not found");
            outcomes.push(MappingOutcome::MissingSheet {
                key: mapping.key.to_string(),
            });
            continue;
        };

        let raw = reader.read_sheet(sheet_name)?;
        let table = (mapping.transform)(&normalizer, &raw);
        let file_name = mapping.file_name(cycle);
        info!(
            key = mapping.key,
            sheet = sheet_name,
            rows = table.row_count(),
            file = %file_name,
            "normalized sheet"
        );

        outcomes.push(MappingOutcome::Processed(ProcessedSheet {
            key: mapping.key.to_string(),
            sheet_name: sheet_name.to_string(),
            file_name,
            table,
        }));
    }

    Ok(outcomes)
}
