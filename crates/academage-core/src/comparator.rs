//! Academic age versus chronological age.
//!
//! Both sides are reduced to total months before subtracting, so a tenths
//! age can be compared with a months age.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{AcademicAge, Age, CANNOT_CALCULATE};

/// Signed gap between academic and chronological age, in months.
///
/// Negative means the academic age trails the chronological age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgeDifference {
    pub months: i64,
}

impl AgeDifference {
    pub fn between(academic: Age, chronological: Age) -> Self {
        Self {
            months: months_as_i64(academic) - months_as_i64(chronological),
        }
    }

    pub fn is_deficit(&self) -> bool {
        self.months < 0
    }
}

// A u32 year counted in months always fits an i64.
fn months_as_i64(age: Age) -> i64 {
    i64::try_from(age.total_months()).unwrap_or(i64::MAX)
}

impl fmt::Display for AgeDifference {
    /// `years.months` with months zero-padded, `-` prefixed when negative.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.months < 0 { "-" } else { "" };
        let magnitude = self.months.unsigned_abs();
        let (years, months) = (magnitude / 12, magnitude % 12);
        write!(f, "{sign}{years}.{months:02}")
    }
}

/// Outcome of a deficit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeficitStatus {
    /// Academic age is behind chronological age.
    Deficit,
    /// Academic age is level with or ahead of chronological age.
    NoDeficit,
    /// One side was a sentinel, empty or malformed.
    Undetermined,
}

impl DeficitStatus {
    /// Collapse to a flag. `Undetermined` reads as no deficit.
    pub fn as_flag(self) -> bool {
        matches!(self, DeficitStatus::Deficit)
    }
}

impl fmt::Display for DeficitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeficitStatus::Deficit => write!(f, "deficit"),
            DeficitStatus::NoDeficit => write!(f, "no deficit"),
            DeficitStatus::Undetermined => write!(f, "undetermined"),
        }
    }
}

/// Result of comparing a typed academic age with a chronological age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub difference: Option<AgeDifference>,
    pub status: DeficitStatus,
}

impl Comparison {
    pub fn new(academic: &AcademicAge, chronological: Age) -> Self {
        match academic.exact() {
            Some(academic) => Self::of(academic, chronological),
            None => Self::undetermined(),
        }
    }

    fn of(academic: Age, chronological: Age) -> Self {
        let difference = AgeDifference::between(academic, chronological);
        let status = if difference.is_deficit() {
            DeficitStatus::Deficit
        } else {
            DeficitStatus::NoDeficit
        };
        Self {
            difference: Some(difference),
            status,
        }
    }

    fn undetermined() -> Self {
        Self {
            difference: None,
            status: DeficitStatus::Undetermined,
        }
    }

    /// Compare two stored age strings of either encoding.
    pub fn from_strings(academic: &str, chronological: &str) -> Self {
        let academic = AcademicAge::parse(academic).and_then(|a| a.exact());
        let chronological = chronological.trim().parse::<Age>().ok();
        match (academic, chronological) {
            (Some(a), Some(c)) => Self::of(a, c),
            _ => Self::undetermined(),
        }
    }

    /// The difference as stored, or `"Cannot calculate"`.
    pub fn difference_string(&self) -> String {
        self.difference
            .map(|d| d.to_string())
            .unwrap_or_else(|| CANNOT_CALCULATE.to_string())
    }
}

/// Signed gap between two stored age strings, or `"Cannot calculate"`.
pub fn age_difference(academic: &str, chronological: &str) -> String {
    Comparison::from_strings(academic, chronological).difference_string()
}

/// Deficit outcome for two stored age strings.
pub fn deficit_status(academic: &str, chronological: &str) -> DeficitStatus {
    Comparison::from_strings(academic, chronological).status
}

/// `true` only when the academic age is known to trail the chronological age.
pub fn is_deficit(academic: &str, chronological: &str) -> bool {
    deficit_status(academic, chronological).as_flag()
}
