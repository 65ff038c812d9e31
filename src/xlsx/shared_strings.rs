//! XLSX shared strings table.

use crate::error::{Error, Result};

/// Shared strings table, indexed by the value of `t="s"` cells.
#[derive(Debug, Clone, Default)]
pub struct SharedStrings {
    strings: Vec<String>,
}

impl SharedStrings {
    /// Parse shared strings from xl/sharedStrings.xml content.
    ///
    /// Rich-text runs are concatenated; phonetic hints (`rPh`) are skipped.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut strings = Vec::new();
        let mut reader = quick_xml::Reader::from_str(xml);
        // Leading and trailing spaces in cell text are significant.
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut in_si = false;
        let mut in_t = false;
        let mut in_phonetic = false;
        let mut current_text = String::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_text.clear();
                    }
                    b"rPh" if in_si => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Ok(quick_xml::events::Event::Empty(e)) if e.name().as_ref() == b"si" => {
                    strings.push(String::new());
                }
                Ok(quick_xml::events::Event::Text(e)) if in_t => {
                    let text = e
                        .unescape()
                        .map_err(|err| Error::XmlParse(err.to_string()))?;
                    current_text.push_str(&text);
                }
                Ok(quick_xml::events::Event::CData(e)) if in_t => {
                    current_text.push_str(&String::from_utf8_lossy(&e));
                }
                Ok(quick_xml::events::Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(std::mem::take(&mut current_text));
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(Self { strings })
    }

    /// Get a string by index.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shared_strings() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="3" uniqueCount="3">
    <si><t>NO</t></si>
    <si><t>Avon_Ganhe</t></si>
    <si><t xml:space="preserve"> Geral &amp; Cia </t></si>
</sst>"#;

        let ss = SharedStrings::parse(xml).unwrap();
        assert_eq!(ss.len(), 3);
        assert_eq!(ss.get(0), Some("NO"));
        assert_eq!(ss.get(1), Some("Avon_Ganhe"));
        assert_eq!(ss.get(2), Some(" Geral & Cia "));
        assert_eq!(ss.get(3), None);
    }

    #[test]
    fn test_rich_text_and_phonetic() {
        let xml = r#"<sst>
    <si>
        <r><rPr><b/></rPr><t>Natura</t></r>
        <r><t>_Ganhe</t></r>
        <rPh sb="0" eb="1"><t>ignored</t></rPh>
    </si>
    <si/>
</sst>"#;

        let ss = SharedStrings::parse(xml).unwrap();
        assert_eq!(ss.len(), 2);
        assert_eq!(ss.get(0), Some("Natura_Ganhe"));
        assert_eq!(ss.get(1), Some(""));
        assert!(!ss.is_empty());
    }
}
