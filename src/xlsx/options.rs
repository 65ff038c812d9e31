//! Options controlling how worksheet cells are loaded.

/// Text cells treated as missing values when loading a sheet.
pub const MISSING_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Worksheet loading options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    /// Load text cells equal to one of [`MISSING_MARKERS`] as empty.
    pub missing_markers: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            missing_markers: true,
        }
    }
}

impl ReadOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable missing-marker detection.
    pub fn with_missing_markers(mut self, enabled: bool) -> Self {
        self.missing_markers = enabled;
        self
    }

    pub(crate) fn is_missing(&self, text: &str) -> bool {
        self.missing_markers && MISSING_MARKERS.contains(&text)
    }
}
