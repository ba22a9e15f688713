//! Integer-backed A1 cell addresses.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::spec::XlsxLayoutError;

/// One worksheet cell: zero-based column, one-based row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct SpecCellAddress {
    /// Zero-based column index (`A` = 0).
    pub col: u32,
    /// One-based row number.
    pub row: u32,
}

impl SpecCellAddress {
    pub fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }

    /// Parse `<letters><digits>` case-insensitively, e.g. `b12`.
    pub fn parse(text: &str) -> Result<Self, XlsxLayoutError> {
        let c_text = text.trim();
        let err = || XlsxLayoutError::MalformedAddress(text.to_string());

        let n_len_letters = c_text
            .chars()
            .take_while(|chr| chr.is_ascii_alphabetic())
            .count();
        let (c_letters, c_digits) = c_text.split_at(n_len_letters);
        if c_letters.is_empty()
            || c_digits.is_empty()
            || !c_digits.chars().all(|chr| chr.is_ascii_digit())
        {
            return Err(err());
        }

        let mut n_col: u64 = 0;
        for chr in c_letters.chars() {
            let n_digit = u64::from(chr.to_ascii_uppercase() as u8 - b'A') + 1;
            n_col = n_col
                .checked_mul(26)
                .and_then(|val| val.checked_add(n_digit))
                .ok_or_else(err)?;
        }
        let n_col = u32::try_from(n_col - 1).map_err(|_| err())?;
        let n_row = c_digits.parse::<u32>().map_err(|_| err())?;
        if n_row == 0 {
            return Err(err());
        }

        Ok(Self::new(n_col, n_row))
    }

    /// Cell one column to the right.
    pub fn next_column(&self) -> Self {
        Self::new(self.col + 1, self.row)
    }

    /// Cell one row below.
    pub fn next_row(&self) -> Self {
        Self::new(self.col, self.row + 1)
    }

    /// Offset by `n_cols` columns and `n_rows` rows.
    pub fn offset(&self, n_cols: u32, n_rows: u32) -> Self {
        Self::new(self.col + n_cols, self.row + n_rows)
    }

    /// `(row, col)` zero-based, as `rust_xlsxwriter` expects.
    pub fn to_zero_based(&self) -> (u32, u32) {
        (self.row - 1, self.col)
    }

    /// Column letters, e.g. `AA` for column 26.
    pub fn column_letters(&self) -> String {
        let mut l_chars = Vec::new();
        let mut n_col = self.col + 1;
        while n_col > 0 {
            let n_rem = (n_col - 1) % 26;
            l_chars.push((b'A' + n_rem as u8) as char);
            n_col = (n_col - 1) / 26;
        }
        l_chars.iter().rev().collect()
    }
}

impl fmt::Display for SpecCellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column_letters(), self.row)
    }
}

impl FromStr for SpecCellAddress {
    type Err = XlsxLayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SpecCellAddress {
    type Error = XlsxLayoutError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Inclusive rectangular range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecCellRange {
    /// Top-left cell.
    pub first: SpecCellAddress,
    /// Bottom-right cell.
    pub last: SpecCellAddress,
}

impl fmt::Display for SpecCellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.first, self.last)
    }
}
