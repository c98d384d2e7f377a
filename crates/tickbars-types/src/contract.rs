//! Futures contract symbols and run input identification.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::TickbarsError;

/// `ROOT[-_]YYYY[-_]?MM.csv`, capturing root, year and month.
static FILE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z]+)[-_](20\d{2})[-_]?(\d{2})\.csv$").unwrap()
});

/// A quarterly futures contract code such as `NQH0`.
///
/// The contract traded in a given calendar month follows the usual
/// roll-ahead of expiry: December rolls into the next year's March
/// contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractSymbol {
    /// Instrument root (e.g., "NQ").
    root: String,
    /// Contract month code: `H`, `M`, `U` or `Z`.
    month_code: char,
    /// Contract year.
    year: i32,
}

impl ContractSymbol {
    /// Resolves the contract active during `month` of `year`.
    ///
    /// Returns `None` if `month` is not in `1..=12`.
    #[must_use]
    pub fn for_month(root: impl Into<String>, year: i32, month: u32) -> Option<Self> {
        let (month_code, year) = match month {
            12 => ('H', year + 1),
            1..=3 => ('H', year),
            4..=6 => ('M', year),
            7..=9 => ('U', year),
            10 | 11 => ('Z', year),
            _ => return None,
        };
        Some(Self {
            root: root.into(),
            month_code,
            year,
        })
    }

    /// Returns the instrument root.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Returns the contract month code.
    #[must_use]
    pub const fn month_code(&self) -> char {
        self.month_code
    }

    /// Returns the contract year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }
}

impl std::fmt::Display for ContractSymbol {
    /// Renders as root, month code and the last digit of the year.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.root,
            self.month_code,
            self.year.rem_euclid(10)
        )
    }
}

/// Instrument root, year and month identifying one run's input file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunInput {
    /// Instrument root (e.g., "NQ").
    pub root: String,
    /// Four-digit calendar year.
    pub year: i32,
    /// Calendar month, 1 to 12.
    pub month: u32,
}

impl RunInput {
    /// Creates a run input, validating the month.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is empty or the month is outside `1..=12`.
    pub fn new(root: impl Into<String>, year: i32, month: u32) -> Result<Self, TickbarsError> {
        let root = root.into();
        if root.is_empty() {
            return Err(TickbarsError::InvalidFileName(
                "empty instrument root".to_string(),
            ));
        }
        if !(1..=12).contains(&month) {
            return Err(TickbarsError::InvalidMonth(month));
        }
        Ok(Self { root, year, month })
    }

    /// Parses a file name of the form `ROOT_YYYY_MM.csv`.
    ///
    /// The separators may be `_` or `-`, and the one between year and month
    /// may be omitted: `NQ_2020_03.csv`, `NQ-2020-03.csv` and `NQ_202003.csv`
    /// all name March 2020. The root is one or more uppercase ASCII letters
    /// and the year must be in the 2000s.
    ///
    /// # Errors
    ///
    /// Returns an error if the name does not match or the month is invalid.
    pub fn from_file_name(name: &str) -> Result<Self, TickbarsError> {
        let invalid = || TickbarsError::InvalidFileName(name.to_string());

        let caps = FILE_NAME.captures(name).ok_or_else(invalid)?;
        let year = caps[2].parse().map_err(|_| invalid())?;
        let month = caps[3].parse().map_err(|_| invalid())?;
        Self::new(&caps[1], year, month)
    }

    /// Resolves the contract symbol used to filter this run's ticks.
    ///
    /// # Errors
    ///
    /// Returns an error if the month has no contract mapping.
    pub fn contract(&self) -> Result<ContractSymbol, TickbarsError> {
        ContractSymbol::for_month(self.root.clone(), self.year, self.month)
            .ok_or(TickbarsError::InvalidMonth(self.month))
    }
}
