//! XLSX workbook reader.

use crate::container::WorkbookPackage;
use crate::error::{Error, Result};
use crate::model::{CellValue, RawTable};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use tracing::debug;

use super::options::ReadOptions;
use super::shared_strings::SharedStrings;
use super::styles::{serial_to_cell, Styles};

const DEFAULT_WORKBOOK_PATH: &str = "xl/workbook.xml";

const OFFICE_DOCUMENT_REL: &str = "/officeDocument";

/// A sheet as listed in the workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetInfo {
    /// Sheet name as shown on the tab.
    pub name: String,
    /// Whether the sheet is hidden or very hidden.
    pub hidden: bool,
    rel_id: String,
}

/// Reader for XLSX workbooks.
pub struct XlsxReader {
    package: WorkbookPackage,
    workbook_path: String,
    shared_strings: SharedStrings,
    styles: Styles,
    sheets: Vec<SheetInfo>,
    date1904: bool,
    options: ReadOptions,
}

impl XlsxReader {
    /// Open an XLSX file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let package = WorkbookPackage::open(path)?;
        Self::from_package(package)
    }

    /// Create a reader from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let package = WorkbookPackage::from_bytes(data)?;
        Self::from_package(package)
    }

    /// Create a reader from an opened package.
    pub fn from_package(package: WorkbookPackage) -> Result<Self> {
        let workbook_path = package
            .read_relationships("")?
            .iter()
            .find(|rel| rel.rel_type.ends_with(OFFICE_DOCUMENT_REL))
            .map(|rel| WorkbookPackage::resolve_path("", &rel.target))
            .unwrap_or_else(|| DEFAULT_WORKBOOK_PATH.to_string());

        let workbook_xml = package.read_xml(&workbook_path)?;
        let (sheets, date1904) = parse_workbook(&workbook_xml)?;

        let shared_strings = match package.read_xml("xl/sharedStrings.xml") {
            Ok(xml) => SharedStrings::parse(&xml)?,
            Err(Error::MissingComponent(_)) => SharedStrings::default(),
            Err(e) => return Err(e),
        };

        let styles = match package.read_xml("xl/styles.xml") {
            Ok(xml) => Styles::parse(&xml),
            Err(_) => Styles::default(),
        };

        debug!(
            workbook = %workbook_path,
            sheets = sheets.len(),
            shared_strings = shared_strings.len(),
            date1904,
            "opened workbook"
        );

        Ok(Self {
            package,
            workbook_path,
            shared_strings,
            styles,
            sheets,
            date1904,
            options: ReadOptions::default(),
        })
    }

    /// Replace the loading options.
    pub fn with_options(mut self, options: ReadOptions) -> Self {
        self.options = options;
        self
    }

    /// Sheets in workbook order.
    pub fn sheets(&self) -> &[SheetInfo] {
        &self.sheets
    }

    /// Get the number of sheets.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Get sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Find a sheet by case-insensitive name, returning its real name.
    pub fn find_sheet(&self, name: &str) -> Option<&str> {
        let wanted = name.to_lowercase();
        self.sheets
            .iter()
            .find(|s| s.name.to_lowercase() == wanted)
            .map(|s| s.name.as_str())
    }

    /// Load a sheet, by exact name, into a raw table.
    ///
    /// The first non-blank row supplies the column names; blank rows are skipped.
    pub fn read_sheet(&self, name: &str) -> Result<RawTable> {
        let sheet = self
            .sheets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::MissingComponent(format!("sheet '{}'", name)))?;

        let rels = self.package.read_relationships(&self.workbook_path)?;
        let target = rels.get(&sheet.rel_id).ok_or_else(|| {
            Error::InvalidData(format!(
                "sheet '{}' has no relationship '{}'",
                sheet.name, sheet.rel_id
            ))
        })?;
        let sheet_path = WorkbookPackage::resolve_path(&self.workbook_path, &target.target);

        let xml = self.package.read_xml(&sheet_path)?;
        let grid = self.parse_sheet(&xml)?;
        let table = build_table(grid, &self.options);

        debug!(
            sheet = %sheet.name,
            part = %sheet_path,
            columns = table.column_count(),
            rows = table.row_count(),
            "loaded sheet"
        );
        Ok(table)
    }

    /// Parse worksheet XML into rows of positioned cells.
    fn parse_sheet(&self, xml: &str) -> Result<Vec<Vec<CellValue>>> {
        let mut rows: BTreeMap<u32, BTreeMap<u32, CellValue>> = BTreeMap::new();
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut row_idx: u32 = 0;
        let mut next_row: u32 = 0;
        let mut col_idx: u32 = 0;
        let mut next_col: u32 = 0;
        let mut in_cell = false;
        let mut in_value = false;
        let mut in_phonetic = false;
        let mut cell_type: Option<String> = None;
        let mut cell_style: Option<usize> = None;
        let mut cell_text = String::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Start(ref e)) => match e.name().as_ref() {
                    b"row" => {
                        row_idx = row_number(e).unwrap_or(next_row);
                        next_row = row_idx + 1;
                        next_col = 0;
                    }
                    b"c" => {
                        in_cell = true;
                        cell_text.clear();
                        (col_idx, cell_type, cell_style) = cell_attributes(e, next_col);
                        next_col = col_idx + 1;
                    }
                    b"rPh" if in_cell => in_phonetic = true,
                    b"v" | b"t" if in_cell && !in_phonetic => in_value = true,
                    _ => {}
                },
                Ok(quick_xml::events::Event::Empty(ref e)) => match e.name().as_ref() {
                    b"row" => {
                        row_idx = row_number(e).unwrap_or(next_row);
                        next_row = row_idx + 1;
                    }
                    b"c" => {
                        // Styled but valueless cell; it still occupies a column.
                        let (col, _, _) = cell_attributes(e, next_col);
                        next_col = col + 1;
                    }
                    _ => {}
                },
                Ok(quick_xml::events::Event::Text(ref e)) if in_value => {
                    let text = e
                        .unescape()
                        .map_err(|err| Error::XmlParse(err.to_string()))?;
                    cell_text.push_str(&text);
                }
                Ok(quick_xml::events::Event::End(ref e)) => match e.name().as_ref() {
                    b"c" => {
                        let value = self.resolve_cell_value(
                            &cell_text,
                            cell_type.as_deref(),
                            cell_style,
                        );
                        if !is_blank(&value) {
                            rows.entry(row_idx).or_default().insert(col_idx, value);
                        }
                        in_cell = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"v" | b"t" => in_value = false,
                    _ => {}
                },
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(rows
            .into_values()
            .map(|cells| {
                let width = cells.keys().next_back().map_or(0, |c| *c as usize + 1);
                let mut row = vec![CellValue::Empty; width];
                for (col, value) in cells {
                    row[col as usize] = value;
                }
                row
            })
            .collect())
    }

    /// Resolve a cell's text according to its type and style.
    fn resolve_cell_value(&self, value: &str, cell_type: Option<&str>, style: Option<usize>) -> CellValue {
        match cell_type {
            Some("s") => match value.trim().parse::<usize>() {
                Ok(idx) => CellValue::text(self.shared_strings.get(idx).unwrap_or("")),
                Err(_) => CellValue::text(value),
            },
            Some("b") => CellValue::Bool(value.trim() == "1"),
            Some("e") => CellValue::Error(value.to_string()),
            Some("str") | Some("inlineStr") => CellValue::text(value),
            Some("d") => parse_iso_date(value.trim())
                .map(CellValue::DateTime)
                .unwrap_or_else(|| CellValue::text(value)),
            _ => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    CellValue::Empty
                } else {
                    match trimmed.parse::<f64>() {
                        Ok(n) if style.is_some_and(|s| self.styles.is_date_style(s)) => {
                            serial_to_cell(n, self.date1904)
                        }
                        Ok(n) => CellValue::Number(n),
                        Err(_) => CellValue::text(value),
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for XlsxReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XlsxReader")
            .field("workbook", &self.workbook_path)
            .field("sheets", &self.sheet_names())
            .finish()
    }
}

/// Parse workbook.xml: the sheet list and the 1904 date-system flag.
fn parse_workbook(xml: &str) -> Result<(Vec<SheetInfo>, bool)> {
    let mut sheets = Vec::new();
    let mut date1904 = false;

    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Empty(e)) | Ok(quick_xml::events::Event::Start(e)) => {
                match e.local_name().as_ref() {
                    b"sheet" => {
                        let mut name = String::new();
                        let mut rel_id = String::new();
                        let mut hidden = false;

                        for attr in e.attributes().flatten() {
                            let key = attr.key.as_ref();
                            if key == b"name" {
                                name = attr
                                    .unescape_value()
                                    .map(|v| v.to_string())
                                    .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).to_string());
                            } else if key == b"state" {
                                hidden = attr.value.as_ref() != b"visible";
                            } else if key.ends_with(b":id") {
                                rel_id = String::from_utf8_lossy(&attr.value).to_string();
                            }
                        }

                        if !name.is_empty() {
                            sheets.push(SheetInfo {
                                name,
                                hidden,
                                rel_id,
                            });
                        }
                    }
                    b"workbookPr" => {
                        date1904 = e
                            .attributes()
                            .flatten()
                            .find(|a| a.key.as_ref() == b"date1904")
                            .is_some_and(|a| matches!(a.value.as_ref(), b"1" | b"true"));
                    }
                    _ => {}
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok((sheets, date1904))
}

/// Zero-based row index from a `<row r="N">` element.
fn row_number(e: &quick_xml::events::BytesStart<'_>) -> Option<u32> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == b"r")
        .and_then(|a| String::from_utf8_lossy(&a.value).parse::<u32>().ok())
        .and_then(|r| r.checked_sub(1))
}

/// Column index, type and style of a `<c>` element.
///
/// Cells without a reference follow the previous cell.
fn cell_attributes(
    e: &quick_xml::events::BytesStart<'_>,
    next_col: u32,
) -> (u32, Option<String>, Option<usize>) {
    let mut col = next_col;
    let mut cell_type = None;
    let mut style = None;

    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"r" => {
                if let Some(c) = column_index(&String::from_utf8_lossy(&attr.value)) {
                    col = c;
                }
            }
            b"t" => cell_type = Some(String::from_utf8_lossy(&attr.value).to_string()),
            b"s" => style = String::from_utf8_lossy(&attr.value).parse().ok(),
            _ => {}
        }
    }

    (col, cell_type, style)
}

/// Zero-based column index of a cell reference ("A1" -> 0, "AB7" -> 27).
pub fn column_index(reference: &str) -> Option<u32> {
    let letters: Vec<char> = reference
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if letters.is_empty() {
        return None;
    }

    let mut index: u32 = 0;
    for c in letters {
        let digit = (c.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
    }
    Some(index - 1)
}

fn parse_iso_date(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// A cell with nothing in it: missing, or empty text.
fn is_blank(cell: &CellValue) -> bool {
    cell.is_empty() || matches!(cell, CellValue::Text(s) if s.is_empty())
}

fn is_blank_row(row: &[CellValue]) -> bool {
    row.iter().all(is_blank)
}

/// Turn positioned rows into a table: header from the first non-blank row.
///
/// Missing markers only apply to data rows; header text is kept as written.
fn build_table(grid: Vec<Vec<CellValue>>, options: &ReadOptions) -> RawTable {
    let mut rows = grid.into_iter().filter(|row| !is_blank_row(row));

    let Some(header) = rows.next() else {
        return RawTable::default();
    };
    let data: Vec<Vec<CellValue>> = rows
        .map(|row| {
            row.into_iter()
                .map(|cell| match cell {
                    CellValue::Text(ref s) if options.is_missing(s) => CellValue::Empty,
                    other => other,
                })
                .collect::<Vec<_>>()
        })
        .filter(|row| !is_blank_row(row))
        .collect();

    let width = data
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0);

    let names = (0..width)
        .map(|i| match header.get(i) {
            Some(cell) if !is_blank(cell) => cell.to_raw_string(),
            _ => format!("Unnamed: {}", i),
        })
        .collect();

    RawTable::from_rows(dedupe_headers(names), data)
}

/// Make header names unique: repeats become `name.1`, `name.2`, ...
fn dedupe_headers(names: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut used: HashSet<String> = HashSet::new();
    let mut result = Vec::with_capacity(names.len());

    for name in names {
        let mut count = counts.get(&name).copied().unwrap_or(0);
        let mut candidate = name.clone();
        while used.contains(&candidate) {
            count += 1;
            candidate = format!("{}.{}", name, count);
        }
        counts.insert(name, count);
        used.insert(candidate.clone());
        result.push(candidate);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_index() {
        assert_eq!(column_index("A1"), Some(0));
        assert_eq!(column_index("B12"), Some(1));
        assert_eq!(column_index("Z3"), Some(25));
        assert_eq!(column_index("AA3"), Some(26));
        assert_eq!(column_index("ab7"), Some(27));
        assert_eq!(column_index("XFD1"), Some(16383));
        assert_eq!(column_index("12"), None);
    }

    #[test]
    fn test_dedupe_headers() {
        let names = ["a", "b", "a", "a", "a.1"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(dedupe_headers(names), vec!["a", "b", "a.1", "a.2", "a.1.1"]);
    }

    #[test]
    fn test_build_table_header_and_blank_rows() {
        let grid = vec![
            vec![],
            vec![CellValue::Empty, CellValue::Empty],
            vec![CellValue::from("no"), CellValue::Empty, CellValue::Number(2025.0)],
            vec![CellValue::Number(7.0)],
            vec![CellValue::Empty],
            vec![
                CellValue::Number(8.0),
                CellValue::from("x"),
                CellValue::Empty,
                CellValue::from("y"),
            ],
        ];
        let table = build_table(grid, &ReadOptions::default());

        assert_eq!(table.columns(), ["no", "Unnamed: 1", "2025", "Unnamed: 3"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 0), Some(&CellValue::Number(7.0)));
        assert_eq!(table.cell(0, 3), Some(&CellValue::Empty));
        assert_eq!(table.cell(1, 3), Some(&CellValue::from("y")));
    }

    #[test]
    fn test_build_table_empty() {
        let table = build_table(vec![vec![CellValue::Empty]], &ReadOptions::default());
        assert_eq!(table.column_count(), 0);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_missing_markers_only_in_data_rows() {
        let grid = vec![
            vec![CellValue::from("NA"), CellValue::from("None")],
            vec![CellValue::from("NA"), CellValue::from("n/a")],
            vec![CellValue::from("1"), CellValue::from("NA")],
        ];

        let table = build_table(grid.clone(), &ReadOptions::default());
        assert_eq!(table.columns(), ["NA", "None"]);
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.cell(0, 0), Some(&CellValue::from("1")));
        assert_eq!(table.cell(0, 1), Some(&CellValue::Empty));

        let kept = build_table(grid, &ReadOptions::new().with_missing_markers(false));
        assert_eq!(kept.row_count(), 2);
        assert_eq!(kept.cell(0, 1), Some(&CellValue::from("n/a")));
    }

    #[test]
    fn test_empty_text_is_blank() {
        let grid = vec![
            vec![CellValue::text(""), CellValue::text("")],
            vec![CellValue::from("no"), CellValue::text("")],
            vec![CellValue::Number(7.0)],
        ];
        let table = build_table(grid, &ReadOptions::new().with_missing_markers(false));
        assert_eq!(table.columns(), ["no", "Unnamed: 1"]);
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_parse_workbook() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"
          xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <workbookPr date1904="1"/>
  <sheets>
    <sheet name="Capa" sheetId="1" r:id="rId1"/>
    <sheet name="Geral &amp; Cia" sheetId="2" state="hidden" r:id="rId2"/>
  </sheets>
</workbook>"#;
        let (sheets, date1904) = parse_workbook(xml).unwrap();
        assert!(date1904);
        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0].name, "Capa");
        assert!(!sheets[0].hidden);
        assert_eq!(sheets[1].name, "Geral & Cia");
        assert!(sheets[1].hidden);
        assert_eq!(sheets[1].rel_id, "rId2");
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(
            parse_iso_date("2025-03-04").map(|d| d.to_string()),
            Some("2025-03-04 00:00:00".to_string())
        );
        assert!(parse_iso_date("2025-03-04T10:20:30").is_some());
        assert!(parse_iso_date("March").is_none());
    }
}
