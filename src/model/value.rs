//! Typed cell values and their string form.

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Whole numbers below this magnitude render as integers.
const WHOLE_FLOAT_LIMIT: f64 = 1e16;

/// Non-zero magnitudes below this render in exponent form (`1e-07`).
const EXPONENT_BELOW: f64 = 1e-4;

/// A single worksheet cell as loaded from the workbook.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CellValue {
    /// No value (blank cell, missing-value marker).
    #[default]
    Empty,
    /// Text, including shared and inline strings.
    Text(String),
    /// Any numeric cell that is not date-formatted.
    Number(f64),
    /// Boolean cell.
    Bool(bool),
    /// Date-formatted numeric cell.
    DateTime(NaiveDateTime),
    /// Date-formatted numeric cell with no date part.
    Time(NaiveTime),
    /// Formula error such as `#N/A` or `#DIV/0!`.
    Error(String),
}

impl CellValue {
    /// Create a text cell.
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    /// Whether this cell carries no value.
    ///
    /// Error cells and NaN count as missing.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty | CellValue::Error(_) => true,
            CellValue::Number(n) => n.is_nan(),
            _ => false,
        }
    }

    /// The string form of the cell, as handed to the normalizer.
    ///
    /// Whole numbers render as integers (`7`, `-5`), other numbers in
    /// shortest round-trip form; missing values become `""`.
    pub fn to_raw_string(&self) -> String {
        match self {
            CellValue::Empty | CellValue::Error(_) => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_float(*n),
            CellValue::Bool(true) => "True".to_string(),
            CellValue::Bool(false) => "False".to_string(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            CellValue::Time(t) => t.format("%H:%M:%S").to_string(),
        }
    }

}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

fn is_whole(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0 && n.abs() < WHOLE_FLOAT_LIMIT
}

fn format_float(n: f64) -> String {
    if n.is_nan() {
        String::new()
    } else if n.is_infinite() {
        if n > 0.0 { "inf" } else { "-inf" }.to_string()
    } else if n == 0.0 {
        // also catches -0.0
        "0".to_string()
    } else if is_whole(n) {
        format!("{:.0}", n)
    } else if n.abs() < EXPONENT_BELOW {
        exponent_form(n)
    } else {
        n.to_string()
    }
}

/// `1.5e-7` as `1.5e-07`: shortest mantissa, signed two-digit exponent.
fn exponent_form(n: f64) -> String {
    let formatted = format!("{:e}", n);
    let Some((mantissa, exponent)) = formatted.split_once('e') else {
        return formatted;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{}e{}{:0>2}", mantissa, sign, digits)
}
