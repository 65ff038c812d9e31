//! Workbook format detection.

use crate::container::decode_xml_bytes;
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// ZIP file magic bytes: PK\x03\x04
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// OLE compound file magic: legacy .xls and password-protected workbooks.
const OLE_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Content type for the XLSX workbook part.
const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";

/// Content type for the macro-enabled (XLSM) workbook part.
const XLSM_CONTENT_TYPE: &str = "application/vnd.ms-excel.sheet.macroEnabled.main+xml";

/// Content types of other Office packages that are not workbooks.
const NON_WORKBOOK_CONTENT_TYPES: [(&str, &str); 2] = [
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
        "Word document",
    ),
    (
        "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml",
        "PowerPoint presentation",
    ),
];

/// Detected workbook format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkbookFormat {
    /// Excel workbook (.xlsx)
    Xlsx,
    /// Macro-enabled Excel workbook (.xlsm)
    Xlsm,
}

impl WorkbookFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            WorkbookFormat::Xlsx => "xlsx",
            WorkbookFormat::Xlsm => "xlsm",
        }
    }

    /// Returns a human-readable name for this format.
    pub fn name(&self) -> &'static str {
        match self {
            WorkbookFormat::Xlsx => "Excel Workbook",
            WorkbookFormat::Xlsm => "Excel Macro-Enabled Workbook",
        }
    }
}

impl std::fmt::Display for WorkbookFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Detect the workbook format of a file.
pub fn detect_format_from_path(path: impl AsRef<Path>) -> Result<WorkbookFormat> {
    let mut file = File::open(path.as_ref())?;
    let mut magic = [0u8; 8];
    let read = file.read(&mut magic)?;
    check_magic(&magic[..read])?;

    file.rewind()?;
    detect_format_from_reader(BufReader::new(file))
}

/// Detect the workbook format of an in-memory file.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<WorkbookFormat> {
    check_magic(data)?;
    detect_format_from_reader(std::io::Cursor::new(data))
}

/// Detect the workbook format from a reader positioned at the start of a ZIP.
pub fn detect_format_from_reader<R: Read + Seek>(reader: R) -> Result<WorkbookFormat> {
    let mut archive = zip::ZipArchive::new(reader)?;

    let content_types = match archive.by_name("[Content_Types].xml") {
        Ok(mut file) => {
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;
            decode_xml_bytes(&bytes)?
        }
        Err(_) => {
            return Err(Error::MissingComponent("[Content_Types].xml".to_string()));
        }
    };

    if content_types.contains(XLSM_CONTENT_TYPE) {
        return Ok(WorkbookFormat::Xlsm);
    }
    if content_types.contains(XLSX_CONTENT_TYPE) {
        return Ok(WorkbookFormat::Xlsx);
    }
    for (content_type, label) in NON_WORKBOOK_CONTENT_TYPES {
        if content_types.contains(content_type) {
            return Err(Error::UnsupportedFormat(label.to_string()));
        }
    }

    // Some writers omit the override; an xl/ folder is enough.
    if archive.file_names().any(|n| n.starts_with("xl/")) {
        Ok(WorkbookFormat::Xlsx)
    } else {
        Err(Error::UnknownFormat)
    }
}

fn check_magic(data: &[u8]) -> Result<()> {
    if is_ole_file(data) {
        return Err(Error::UnsupportedFormat(
            "legacy .xls or password-protected workbook".to_string(),
        ));
    }
    if !is_zip_file(data) {
        return Err(Error::UnknownFormat);
    }
    Ok(())
}

/// Check if data starts with ZIP magic bytes.
pub fn is_zip_file(data: &[u8]) -> bool {
    data.starts_with(&ZIP_MAGIC)
}

/// Check if data starts with the OLE compound file signature.
pub fn is_ole_file(data: &[u8]) -> bool {
    data.starts_with(&OLE_MAGIC)
}
