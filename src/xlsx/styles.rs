//! Cell styles: which style indices carry a date number format.

use crate::model::CellValue;
use chrono::{Days, NaiveDate, NaiveTime};
use std::collections::HashMap;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Styles information parsed from xl/styles.xml.
#[derive(Debug, Default)]
pub struct Styles {
    /// Custom number formats: numFmtId -> formatCode
    num_fmts: HashMap<u32, String>,
    /// Cell formats in order: style index -> numFmtId
    cell_xfs: Vec<u32>,
}

impl Styles {
    /// Parse styles from xl/styles.xml content.
    ///
    /// Malformed content yields whatever was read before the error.
    pub fn parse(xml: &str) -> Self {
        let mut styles = Self::default();
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut in_num_fmts = false;
        let mut in_cell_xfs = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Start(ref e))
                | Ok(quick_xml::events::Event::Empty(ref e)) => match e.name().as_ref() {
                    b"numFmts" => in_num_fmts = true,
                    b"cellXfs" => in_cell_xfs = true,
                    b"numFmt" if in_num_fmts => {
                        let mut id: Option<u32> = None;
                        let mut code = String::new();
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"numFmtId" => id = String::from_utf8_lossy(&attr.value).parse().ok(),
                                b"formatCode" => {
                                    code = attr
                                        .unescape_value()
                                        .map(|v| v.to_string())
                                        .unwrap_or_else(|_| {
                                            String::from_utf8_lossy(&attr.value).to_string()
                                        })
                                }
                                _ => {}
                            }
                        }
                        if let Some(id) = id {
                            styles.num_fmts.insert(id, code);
                        }
                    }
                    b"xf" if in_cell_xfs => {
                        let num_fmt_id = e
                            .attributes()
                            .flatten()
                            .find(|a| a.key.as_ref() == b"numFmtId")
                            .and_then(|a| String::from_utf8_lossy(&a.value).parse().ok())
                            .unwrap_or(0);
                        styles.cell_xfs.push(num_fmt_id);
                    }
                    _ => {}
                },
                Ok(quick_xml::events::Event::End(ref e)) => match e.name().as_ref() {
                    b"numFmts" => in_num_fmts = false,
                    b"cellXfs" => in_cell_xfs = false,
                    _ => {}
                },
                Ok(quick_xml::events::Event::Eof) => break,
                Err(_) => break,
                _ => {}
            }
            buf.clear();
        }

        styles
    }

    /// Whether cells with this style index hold dates or times.
    pub fn is_date_style(&self, style_index: usize) -> bool {
        self.cell_xfs
            .get(style_index)
            .is_some_and(|id| self.is_date_format(*id))
    }

    /// Check if a numFmtId represents a date or time format.
    pub fn is_date_format(&self, num_fmt_id: u32) -> bool {
        // Built-in: 14-22 dates, 45-47 times.
        if (14..=22).contains(&num_fmt_id) || (45..=47).contains(&num_fmt_id) {
            return true;
        }

        self.num_fmts
            .get(&num_fmt_id)
            .is_some_and(|code| is_date_format_code(code))
    }
}

/// Check if a format code has date/time tokens outside literals and brackets.
fn is_date_format_code(format_code: &str) -> bool {
    let mut in_bracket = false;
    let mut in_quote = false;
    let mut escaped = false;

    for c in format_code.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if !in_quote => escaped = true,
            '"' => in_quote = !in_quote,
            '[' if !in_quote => in_bracket = true,
            ']' if !in_quote => in_bracket = false,
            _ if in_bracket || in_quote => {}
            _ => {
                if matches!(c.to_ascii_lowercase(), 'd' | 'm' | 'y' | 'h' | 's') {
                    return true;
                }
            }
        }
    }

    false
}

/// Convert a date-formatted serial into a date-time or time cell.
///
/// Negative or non-finite serials stay numbers.
pub fn serial_to_cell(serial: f64, date1904: bool) -> CellValue {
    if !serial.is_finite() || serial < 0.0 {
        return CellValue::Number(serial);
    }

    let mut days = serial.floor() as u64;
    let mut seconds = ((serial - serial.floor()) * SECONDS_PER_DAY).round() as u64;
    if seconds >= SECONDS_PER_DAY as u64 {
        days += 1;
        seconds = 0;
    }
    let Some(time) = NaiveTime::from_num_seconds_from_midnight_opt(seconds as u32, 0) else {
        return CellValue::Number(serial);
    };

    if !date1904 && days == 0 {
        return CellValue::Time(time);
    }

    // 1900 system: serial 60 is the non-existent 1900-02-29, so serials
    // before it count from one day later.
    let (epoch, days) = if date1904 {
        (NaiveDate::from_ymd_opt(1904, 1, 1), days)
    } else if days < 60 {
        (NaiveDate::from_ymd_opt(1899, 12, 31), days)
    } else {
        (NaiveDate::from_ymd_opt(1899, 12, 30), days)
    };

    match epoch.and_then(|e| e.checked_add_days(Days::new(days))) {
        Some(date) => CellValue::DateTime(date.and_time(time)),
        None => CellValue::Number(serial),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(serial: f64) -> String {
        serial_to_cell(serial, false).to_raw_string()
    }

    #[test]
    fn test_builtin_date_formats() {
        let styles = Styles::default();
        assert!(styles.is_date_format(14));
        assert!(styles.is_date_format(22));
        assert!(styles.is_date_format(46));
        assert!(!styles.is_date_format(0));
        assert!(!styles.is_date_format(2));
    }

    #[test]
    fn test_custom_date_format_detection() {
        assert!(is_date_format_code("yyyy-mm-dd"));
        assert!(is_date_format_code("d/m/yy"));
        assert!(is_date_format_code("[$-409]mmmm\\ d\\,\\ yyyy;@"));
        assert!(is_date_format_code("hh:mm"));

        assert!(!is_date_format_code("0.00"));
        assert!(!is_date_format_code("#,##0"));
        assert!(!is_date_format_code("\"$\"#,##0.00"));
        assert!(!is_date_format_code("[Red]0.0"));
        assert!(!is_date_format_code("0\\d"));
        assert!(!is_date_format_code("General"));
    }

    #[test]
    fn test_parse_styles() {
        let xml = r#"<styleSheet>
  <numFmts count="1"><numFmt numFmtId="164" formatCode="dd/mm/yyyy"/></numFmts>
  <cellXfs count="3">
    <xf numFmtId="0" fontId="0"/>
    <xf numFmtId="164" fontId="0" applyNumberFormat="1"/>
    <xf numFmtId="4" fontId="0"><alignment horizontal="left"/></xf>
  </cellXfs>
</styleSheet>"#;
        let styles = Styles::parse(xml);
        assert!(!styles.is_date_style(0));
        assert!(styles.is_date_style(1));
        assert!(!styles.is_date_style(2));
        assert!(!styles.is_date_style(3));
    }

    #[test]
    fn test_serial_dates() {
        assert_eq!(date(1.0), "1900-01-01 00:00:00");
        assert_eq!(date(59.0), "1900-02-28 00:00:00");
        assert_eq!(date(61.0), "1900-03-01 00:00:00");
        assert_eq!(date(45658.0), "2025-01-01 00:00:00");
        assert_eq!(date(45658.5), "2025-01-01 12:00:00");
    }

    #[test]
    fn test_serial_times_and_1904() {
        assert_eq!(date(0.75), "18:00:00");
        assert_eq!(
            serial_to_cell(0.0, true).to_raw_string(),
            "1904-01-01 00:00:00"
        );
        assert_eq!(serial_to_cell(-1.0, false), CellValue::Number(-1.0));
    }
}
