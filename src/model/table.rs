//! Raw and normalized table structures.

use super::CellValue;
use serde::{Deserialize, Serialize};

/// A worksheet as loaded: named columns and rows of typed cells.
///
/// Every row holds exactly one value per column, deserialized tables included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "TableData<CellValue>")]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// Create an empty table with the given columns.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Create a table from columns and rows.
    ///
    /// Short rows are padded with empty cells, long rows truncated.
    pub fn from_rows<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: impl IntoIterator<Item = Vec<CellValue>>,
    ) -> Self {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Append a row, fitting it to the column count.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Position of the first column with exactly this name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Position of the first column whose name satisfies `pred`.
    pub fn find_column(&self, pred: impl Fn(&str) -> bool) -> Option<usize> {
        self.columns.iter().position(|c| pred(c.as_str()))
    }

    /// Cell at (row, column), if both are in range.
    pub fn cell(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Rename the column at `index`.
    pub fn rename_column(&mut self, index: usize, name: impl Into<String>) {
        if let Some(column) = self.columns.get_mut(index) {
            *column = name.into();
        }
    }

    /// Remove the column at `index` together with its values.
    pub fn remove_column(&mut self, index: usize) {
        if index >= self.columns.len() {
            return;
        }
        self.columns.remove(index);
        for row in &mut self.rows {
            row.remove(index);
        }
    }

    /// Set every row of `name` to `value`, appending the column if absent.
    pub fn set_column(&mut self, name: &str, value: CellValue) {
        let index = match self.column_index(name) {
            Some(index) => index,
            None => {
                self.columns.push(name.to_string());
                self.columns.len() - 1
            }
        };
        for row in &mut self.rows {
            if index < row.len() {
                row[index] = value.clone();
            } else {
                row.push(value.clone());
            }
        }
    }
}

/// A table with a fixed column set whose cells are all strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TableData<String>")]
pub struct NormalizedTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl NormalizedTable {
    /// Create a table; rows are fitted to the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of `column` in `row`.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).map(|r| r[index].as_str())
    }

    /// All values of one column, top to bottom.
    pub fn column(&self, column: &str) -> Option<Vec<&str>> {
        let index = self.columns.iter().position(|c| c == column)?;
        Some(self.rows.iter().map(|r| r[index].as_str()).collect())
    }

    /// Treat this table as raw input again, every cell as text.
    pub fn to_raw_table(&self) -> RawTable {
        RawTable::from_rows(
            self.columns.iter().cloned(),
            self.rows
                .iter()
                .map(|r| r.iter().map(|s| CellValue::Text(s.clone())).collect()),
        )
    }
}

/// Serialized form of a table, before rows are fitted to the columns.
#[derive(Deserialize)]
struct TableData<T> {
    columns: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<T>>,
}

impl From<TableData<CellValue>> for RawTable {
    fn from(data: TableData<CellValue>) -> Self {
        RawTable::from_rows(data.columns, data.rows)
    }
}

impl From<TableData<String>> for NormalizedTable {
    fn from(data: TableData<String>) -> Self {
        NormalizedTable::new(data.columns, data.rows)
    }
}
