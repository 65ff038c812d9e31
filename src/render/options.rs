//! Output options.

/// UTF-8 byte order mark, for spreadsheet programs that need it to pick UTF-8.
pub(crate) const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// CSV output configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    /// Field delimiter (default `,`)
    pub delimiter: u8,

    /// Prefix the output with a UTF-8 byte order mark
    pub utf8_bom: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            utf8_bom: false,
        }
    }
}

impl CsvOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Enable or disable the byte order mark.
    pub fn with_utf8_bom(mut self, enabled: bool) -> Self {
        self.utf8_bom = enabled;
        self
    }
}

/// JSON output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonFormat {
    /// Compact single-line JSON
    Compact,
    /// Pretty-printed with 2-space indentation
    #[default]
    Pretty,
}
