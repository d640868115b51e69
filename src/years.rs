//! The generation year range.

use core::{fmt, ops::RangeInclusive};

use serde::{ser::SerializeSeq, Serialize, Serializer};

use crate::{error::DstRulesError, DstRulesResult};

/// An inclusive, contiguous, ascending range of calendar years.
///
/// The same range is requested for every ambiguous zone in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    first: i32,
    last: i32,
}

impl YearRange {
    /// The years the detector ships rules for.
    pub const DEFAULT: Self = Self {
        first: 2008,
        last: 2014,
    };

    pub fn new(first: i32, last: i32) -> DstRulesResult<Self> {
        if first > last {
            return Err(DstRulesError::InvalidYearRange { first, last });
        }
        Ok(Self { first, last })
    }

    pub const fn single(year: i32) -> Self {
        Self {
            first: year,
            last: year,
        }
    }

    pub const fn first(&self) -> i32 {
        self.first
    }

    pub const fn last(&self) -> i32 {
        self.last
    }

    pub const fn len(&self) -> usize {
        (self.last as i64 - self.first as i64 + 1) as usize
    }

    /// Always false; a range holds at least one year.
    pub const fn is_empty(&self) -> bool {
        false
    }

    pub const fn contains(&self, year: i32) -> bool {
        self.first <= year && year <= self.last
    }

    pub fn iter(&self) -> RangeInclusive<i32> {
        self.first..=self.last
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl IntoIterator for YearRange {
    type Item = i32;
    type IntoIter = RangeInclusive<i32>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for &YearRange {
    type Item = i32;
    type IntoIter = RangeInclusive<i32>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}..={}", self.first, self.last)
        }
    }
}

// Serialized as the explicit list of years, which is what the detector reads.
impl Serialize for YearRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for year in self {
            seq.serialize_element(&year)?;
        }
        seq.end()
    }
}
