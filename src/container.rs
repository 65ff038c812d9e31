//! ZIP package access for spreadsheet workbooks.

use crate::error::{Error, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;
use tracing::debug;

/// A relationship entry from a .rels part.
#[derive(Debug, Clone)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path as written in the part (relative or absolute)
    pub target: String,
    /// Whether the target points outside the package
    pub external: bool,
}

/// Relationships of one package part, keyed by ID.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    by_id: HashMap<String, Relationship>,
}

impl Relationships {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a relationship by ID.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.by_id.get(id)
    }

    /// Add a relationship, replacing any with the same ID.
    pub fn add(&mut self, rel: Relationship) {
        self.by_id.insert(rel.id.clone(), rel);
    }

    /// Iterate over all relationships, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.by_id.values()
    }
}

/// Rewrite a UTF-16 encoding declaration once the content is already UTF-8.
///
/// quick-xml honours the declaration, so a decoded string that still claims
/// `encoding="UTF-16"` would be misread.
fn fix_xml_encoding_declaration(content: String) -> String {
    if !content.starts_with("<?xml") {
        return content;
    }
    let Some(end_decl) = content.find("?>") else {
        return content;
    };

    if !content[..end_decl].to_ascii_lowercase().contains("utf-16") {
        return content;
    }

    let (decl, rest) = content.split_at(end_decl + 2);
    let fixed = decl
        .replace("UTF-16", "UTF-8")
        .replace("utf-16", "UTF-8");
    format!("{}{}", fixed, rest)
}

/// Decode XML bytes, handling UTF-8 (with or without BOM) and UTF-16 LE/BE.
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    if let Some(rest) = bytes.strip_prefix(b"\xEF\xBB\xBF") {
        return String::from_utf8(rest.to_vec())
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)));
    }
    if let Some(rest) = bytes.strip_prefix(b"\xFF\xFE") {
        return decode_utf16(rest, u16::from_le_bytes).map(fix_xml_encoding_declaration);
    }
    if let Some(rest) = bytes.strip_prefix(b"\xFE\xFF") {
        return decode_utf16(rest, u16::from_be_bytes).map(fix_xml_encoding_declaration);
    }

    match String::from_utf8(bytes.to_vec()) {
        Ok(s) => Ok(s),
        // No BOM: ASCII markup in UTF-16 leaves a zero byte beside every character.
        Err(_) if bytes.len() >= 4 && bytes[1] == 0 && bytes[3] == 0 => {
            decode_utf16(bytes, u16::from_le_bytes).map(fix_xml_encoding_declaration)
        }
        Err(_) if bytes.len() >= 4 && bytes[0] == 0 && bytes[2] == 0 => {
            decode_utf16(bytes, u16::from_be_bytes).map(fix_xml_encoding_declaration)
        }
        Err(_) => Ok(String::from_utf8_lossy(bytes).into_owned()),
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> Result<String> {
    let units = bytes.chunks_exact(2).map(|pair| to_unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// A workbook package: the ZIP archive holding the workbook's XML parts.
pub struct WorkbookPackage {
    archive: RefCell<zip::ZipArchive<Cursor<Vec<u8>>>>,
}

impl WorkbookPackage {
    /// Open a package from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Create a package from a byte vector.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let archive = zip::ZipArchive::new(Cursor::new(data))?;
        debug!(parts = archive.len(), "opened workbook package");
        Ok(Self {
            archive: RefCell::new(archive),
        })
    }

    /// Read an XML part as a string.
    pub fn read_xml(&self, path: &str) -> Result<String> {
        let mut archive = self.archive.borrow_mut();
        let mut file = archive
            .by_name(path)
            .map_err(|_| Error::MissingComponent(path.to_string()))?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        decode_xml_bytes(&bytes)
    }

    /// Read the relationships of a part (e.g. `xl/workbook.xml`).
    ///
    /// A part without a .rels companion has no relationships.
    pub fn read_relationships(&self, part_path: &str) -> Result<Relationships> {
        let path = Path::new(part_path);
        let parent = path.parent().unwrap_or(Path::new(""));
        let filename = path.file_name().unwrap_or_default().to_string_lossy();
        let rels_path = if parent.as_os_str().is_empty() {
            format!("_rels/{}.rels", filename)
        } else {
            format!("{}/_rels/{}.rels", parent.display(), filename)
        };

        let content = match self.read_xml(&rels_path) {
            Ok(c) => c,
            Err(Error::MissingComponent(_)) => return Ok(Relationships::new()),
            Err(e) => return Err(e),
        };
        parse_relationships(&content)
    }

    /// Resolve a relationship target against the part that declares it.
    pub fn resolve_path(base: &str, target: &str) -> String {
        if let Some(stripped) = target.strip_prefix('/') {
            return stripped.to_string();
        }

        let base_dir = Path::new(base).parent().unwrap_or(Path::new(""));
        let mut result = base_dir.to_path_buf();
        for component in Path::new(target).components() {
            match component {
                std::path::Component::ParentDir => {
                    result.pop();
                }
                std::path::Component::Normal(c) => result.push(c),
                _ => {}
            }
        }

        result.to_string_lossy().replace('\\', "/")
    }
}

/// Parse the content of a .rels part.
fn parse_relationships(content: &str) -> Result<Relationships> {
    let mut rels = Relationships::new();
    if content.trim().is_empty() {
        return Ok(rels);
    }

    let mut reader = quick_xml::Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Empty(e)) | Ok(quick_xml::events::Event::Start(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut rel = Relationship {
                    id: String::new(),
                    rel_type: String::new(),
                    target: String::new(),
                    external: false,
                };

                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value).to_string();
                    match attr.key.as_ref() {
                        b"Id" => rel.id = value,
                        b"Type" => rel.rel_type = value,
                        b"Target" => rel.target = value,
                        b"TargetMode" => rel.external = value.eq_ignore_ascii_case("external"),
                        _ => {}
                    }
                }

                if !rel.id.is_empty() {
                    rels.add(rel);
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

impl std::fmt::Debug for WorkbookPackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkbookPackage")
            .field("parts", &self.archive.borrow().len())
            .finish()
    }
}
