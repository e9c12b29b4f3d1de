use std::fmt;
use std::str::FromStr;

use super::SheetError;
use crate::shared::format::column_letters;

/// Inclusive, 0-based column window of a sheet ("B:R" → 1..=17)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnRange {
    pub first: u32,
    pub last: u32,
}

impl ColumnRange {
    pub fn columns(&self) -> impl Iterator<Item = u32> {
        self.first..=self.last
    }
}

impl FromStr for ColumnRange {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SheetError::InvalidColumnRange(s.to_string());
        let (first, last) = match s.split_once(':') {
            Some((a, b)) => (a, b),
            None => (s, s),
        };
        let first = letters_to_index(first.trim()).ok_or_else(invalid)?;
        let last = letters_to_index(last.trim()).ok_or_else(invalid)?;
        if first > last {
            return Err(invalid());
        }
        Ok(Self { first, last })
    }
}

impl fmt::Display for ColumnRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", column_letters(self.first), column_letters(self.last))
    }
}

/// "A" → 0, "Z" → 25, "AA" → 26. Case-insensitive.
fn letters_to_index(letters: &str) -> Option<u32> {
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }
    let mut acc: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        acc = acc * 26 + digit;
    }
    Some(acc - 1)
}
