//! Sales cycle identifiers.

use crate::error::{Error, Result};
use std::fmt;
use std::ops::RangeInclusive;

/// Recognized calendar years.
pub const YEAR_RANGE: RangeInclusive<u16> = 2024..=2030;

/// Recognized cycle numbers within a year.
pub const CYCLE_RANGE: RangeInclusive<u8> = 1..=20;

/// A promotional period: a sales cycle within a calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cycle {
    year: u16,
    cycle: u8,
}

impl Cycle {
    /// Create a cycle, rejecting values outside the recognized ranges.
    pub fn new(year: u16, cycle: u8) -> Result<Self> {
        if !YEAR_RANGE.contains(&year) {
            return Err(Error::InvalidCycle(format!(
                "year {} outside {}..={}",
                year,
                YEAR_RANGE.start(),
                YEAR_RANGE.end()
            )));
        }
        if !CYCLE_RANGE.contains(&cycle) {
            return Err(Error::InvalidCycle(format!(
                "cycle {} outside {}..={}",
                cycle,
                CYCLE_RANGE.start(),
                CYCLE_RANGE.end()
            )));
        }
        Ok(Self { year, cycle })
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn cycle(&self) -> u8 {
        self.cycle
    }

    /// Cycle number zero-padded to two digits ("01").
    pub fn padded(&self) -> String {
        format!("{:02}", self.cycle)
    }

    /// The `NM_CICLO` token: year followed by the padded cycle ("202501").
    pub fn token(&self) -> String {
        format!("{}{:02}", self.year, self.cycle)
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{:02}/{}", self.cycle, self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token() {
        assert_eq!(Cycle::new(2025, 1).unwrap().token(), "202501");
        assert_eq!(Cycle::new(2025, 12).unwrap().token(), "202512");
        assert_eq!(Cycle::new(2030, 20).unwrap().token(), "203020");
    }

    #[test]
    fn test_padded() {
        assert_eq!(Cycle::new(2024, 3).unwrap().padded(), "03");
        assert_eq!(Cycle::new(2024, 15).unwrap().padded(), "15");
    }

    #[test]
    fn test_range_bounds() {
        assert!(Cycle::new(2024, 1).is_ok());
        assert!(Cycle::new(2030, 20).is_ok());
        assert!(matches!(Cycle::new(2023, 1), Err(Error::InvalidCycle(_))));
        assert!(matches!(Cycle::new(2031, 1), Err(Error::InvalidCycle(_))));
        assert!(matches!(Cycle::new(2025, 0), Err(Error::InvalidCycle(_))));
        assert!(matches!(Cycle::new(2025, 21), Err(Error::InvalidCycle(_))));
    }

    #[test]
    fn test_display() {
        assert_eq!(Cycle::new(2025, 7).unwrap().to_string(), "C07/2025");
    }
}
