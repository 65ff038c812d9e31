//! XLSX (Excel) workbook reader.
//!
//! Loads worksheets of Office Open XML workbooks into [`RawTable`]s.
//!
//! # Example
//!
//! ```no_run
//! use imba::xlsx::XlsxReader;
//!
//! let reader = XlsxReader::open("campanha.xlsx")?;
//! if let Some(name) = reader.find_sheet("geral") {
//!     let table = reader.read_sheet(name)?;
//!     println!("{} rows in '{}'", table.row_count(), name);
//! }
//! # Ok::<(), imba::Error>(())
//! ```
//!
//! [`RawTable`]: crate::model::RawTable

mod options;
mod parser;
mod shared_strings;
mod styles;

pub use options::{ReadOptions, MISSING_MARKERS};
pub use parser::{column_index, SheetInfo, XlsxReader};
