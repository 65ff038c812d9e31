//! # imba
//!
//! Normalizes promotional-cycle Excel workbooks into fixed-schema CSV files.
//!
//! A workbook sheet (by default the one named `Geral`, matched
//! case-insensitively) is loaded, projected onto the 16 output columns,
//! stamped with the cycle token and cleaned of null markers and `.0`
//! float artifacts.
//!
//! ## Quick Start
//!
//! ```no_run
//! use imba::{process_file, Cycle, MappingOutcome};
//! use imba::render::{to_csv, CsvOptions};
//!
//! let cycle = Cycle::new(2025, 1)?;
//! for outcome in process_file("campanha.xlsx", &cycle)? {
//!     match outcome {
//!         MappingOutcome::Processed(sheet) => {
//!             let csv = to_csv(&sheet.table, &CsvOptions::default())?;
//!             std::fs::write(&sheet.file_name, csv)?;
//!         }
//!         MappingOutcome::MissingSheet { key } => eprintln!("sheet '{}' not found", key),
//!     }
//! }
//! # Ok::<(), imba::Error>(())
//! ```
//!
//! ## Features
//!
//! - `async`: [`process_file_async`] reading the workbook with Tokio

pub mod container;
pub mod cycle;
pub mod detect;
pub mod error;
pub mod mapping;
pub mod model;
pub mod normalize;
pub mod render;
pub mod xlsx;

// Re-exports
pub use container::WorkbookPackage;
pub use cycle::Cycle;
pub use detect::{detect_format_from_bytes, detect_format_from_path, WorkbookFormat};
pub use error::{Error, Result};
pub use mapping::{default_mappings, process_workbook, MappingOutcome, ProcessedSheet, SheetMapping};
pub use model::{CellValue, NormalizedTable, RawTable};
pub use normalize::{normalize, Normalizer, SCHEMA_COLUMNS};
pub use xlsx::{ReadOptions, XlsxReader};

use std::path::Path;

/// Run the default mappings over a workbook file.
///
/// Fails only when the workbook cannot be read; missing sheets are
/// reported as [`MappingOutcome::MissingSheet`].
pub fn process_file(path: impl AsRef<Path>, cycle: &Cycle) -> Result<Vec<MappingOutcome>> {
    let path = path.as_ref();
    detect_format_from_path(path)?;
    let reader = XlsxReader::open(path)?;
    process_workbook(&reader, cycle, &default_mappings())
}

/// Run the default mappings over an in-memory workbook.
pub fn process_bytes(data: &[u8], cycle: &Cycle) -> Result<Vec<MappingOutcome>> {
    detect_format_from_bytes(data)?;
    let reader = XlsxReader::from_bytes(data.to_vec())?;
    process_workbook(&reader, cycle, &default_mappings())
}

/// Async variant of [`process_file`]; only the file read is asynchronous.
#[cfg(feature = "async")]
pub async fn process_file_async(
    path: impl AsRef<Path>,
    cycle: &Cycle,
) -> Result<Vec<MappingOutcome>> {
    let data = tokio::fs::read(path.as_ref()).await?;
    process_bytes(&data, cycle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_bytes_rejects_garbage() {
        let cycle = Cycle::new(2025, 1).unwrap();
        let result = process_bytes(b"not a workbook at all", &cycle);
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_process_file_missing() {
        let cycle = Cycle::new(2025, 1).unwrap();
        let result = process_file("does-not-exist.xlsx", &cycle);
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
