//! In-memory workbook fixtures.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Style 1 is a custom dd/mm/yyyy date, style 2 the built-in date format 14.
const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <numFmts count="1"><numFmt numFmtId="164" formatCode="dd/mm/yyyy"/></numFmts>
  <cellXfs count="3">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
    <xf numFmtId="164" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>
    <xf numFmtId="14" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>
  </cellXfs>
</styleSheet>"#;

/// A sheet fixture: tab name and the XML inside `<sheetData>`.
pub struct Sheet<'a> {
    pub name: &'a str,
    pub data: String,
}

impl<'a> Sheet<'a> {
    pub fn new(name: &'a str, data: impl Into<String>) -> Self {
        Self {
            name,
            data: data.into(),
        }
    }
}

/// Inline-string cell.
pub fn text(reference: &str, value: &str) -> String {
    format!(
        r#"<c r="{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
        reference, value
    )
}

/// Numeric cell.
pub fn number(reference: &str, value: &str) -> String {
    format!(r#"<c r="{}"><v>{}</v></c>"#, reference, value)
}

/// Row element with the given cells.
pub fn row(number: u32, cells: &[String]) -> String {
    format!(r#"<row r="{}">{}</row>"#, number, cells.concat())
}

/// Build an .xlsx package with the given sheets and shared strings.
pub fn workbook(sheets: &[Sheet<'_>], shared_strings: &[&str]) -> Vec<u8> {
    let mut buffer = Vec::new();
    let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
    let options = SimpleFileOptions::default();

    let mut overrides = String::new();
    for i in 1..=sheets.len() {
        overrides.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            i
        ));
    }
    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
  {}
</Types>"#,
            overrides
        )
        .as_bytes(),
    )
    .unwrap();

    zip.start_file("_rels/.rels", options).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#,
    )
    .unwrap();

    let mut sheet_list = String::new();
    let mut sheet_rels = String::new();
    for (i, sheet) in sheets.iter().enumerate() {
        let n = i + 1;
        sheet_list.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            sheet.name, n, n
        ));
        sheet_rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            n, n
        ));
    }

    zip.start_file("xl/workbook.xml", options).unwrap();
    zip.write_all(
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets>{}</sheets>
</workbook>"#,
            sheet_list
        )
        .as_bytes(),
    )
    .unwrap();

    zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
    zip.write_all(
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
            sheet_rels
        )
        .as_bytes(),
    )
    .unwrap();

    for (i, sheet) in sheets.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)
            .unwrap();
        zip.write_all(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
                sheet.data
            )
            .as_bytes(),
        )
        .unwrap();
    }

    if !shared_strings.is_empty() {
        let items: String = shared_strings
            .iter()
            .map(|s| format!("<si><t>{}</t></si>", s))
            .collect();
        zip.start_file("xl/sharedStrings.xml", options).unwrap();
        zip.write_all(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">{}</sst>"#,
                items
            )
            .as_bytes(),
        )
        .unwrap();
    }

    zip.start_file("xl/styles.xml", options).unwrap();
    zip.write_all(STYLES.as_bytes()).unwrap();

    zip.finish().unwrap();
    buffer
}
