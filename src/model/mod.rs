//! In-memory model for worksheet data.
//!
//! The workbook reader produces [`RawTable`]s of typed [`CellValue`]s; the
//! normalizer turns them into [`NormalizedTable`]s of plain strings.

mod table;
mod value;

pub use table::*;
pub use value::*;
