//! Output rendering for normalized tables.
//!
//! CSV is the delivery format; JSON is available for inspection.
//!
//! # Example
//!
//! ```no_run
//! use imba::{process_file, render::*, Cycle};
//!
//! let cycle = Cycle::new(2025, 1)?;
//! for outcome in process_file("campanha.xlsx", &cycle)? {
//!     if let Some(sheet) = outcome.processed() {
//!         let bytes = to_csv(&sheet.table, &CsvOptions::default())?;
//!         std::fs::write(&sheet.file_name, bytes)?;
//!     }
//! }
//! # Ok::<(), imba::Error>(())
//! ```

mod delimited;
mod json;
mod options;

pub use delimited::{to_csv, write_csv};
pub use json::to_json;
pub use options::{CsvOptions, JsonFormat};
