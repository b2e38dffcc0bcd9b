//! Core data model types for academage.
//!
//! Every age value carries its encoding. The two encodings cannot be told
//! apart reliably from their rendered strings, so nothing in the engine does
//! arithmetic on strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::encoding;

/// How the fractional part of an age is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeEncoding {
    /// `Y.T`, where `T` is a published (non-linear) tenth of a year.
    Tenths,
    /// `Y.MM`, where `MM` is calendar months 0–11.
    Months,
}

impl AgeEncoding {
    /// Number of distinct subunit values per year.
    pub fn subunits_per_year(self) -> u8 {
        match self {
            AgeEncoding::Tenths => 10,
            AgeEncoding::Months => 12,
        }
    }
}

impl fmt::Display for AgeEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgeEncoding::Tenths => write!(f, "tenths"),
            AgeEncoding::Months => write!(f, "months"),
        }
    }
}

impl FromStr for AgeEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tenths" | "tenth" | "decimal" => Ok(AgeEncoding::Tenths),
            "months" | "month" => Ok(AgeEncoding::Months),
            other => Err(format!("unknown age encoding: {other}")),
        }
    }
}

/// Subject family a test belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectFamily {
    Numeracy,
    Reading,
    Spelling,
}

impl fmt::Display for SubjectFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectFamily::Numeracy => write!(f, "numeracy"),
            SubjectFamily::Reading => write!(f, "reading"),
            SubjectFamily::Spelling => write!(f, "spelling"),
        }
    }
}

impl FromStr for SubjectFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "numeracy" | "maths" | "math" => Ok(SubjectFamily::Numeracy),
            "reading" | "literacy-reading" => Ok(SubjectFamily::Reading),
            "spelling" | "literacy-spelling" => Ok(SubjectFamily::Spelling),
            other => Err(format!("unknown subject family: {other}")),
        }
    }
}

/// An age in whole years plus an encoded fraction of a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Age {
    pub years: u32,
    /// Tenths digit or month count, depending on `encoding`.
    pub subunit: u8,
    pub encoding: AgeEncoding,
}

impl Age {
    /// Build an age, rejecting a subunit that does not fit the encoding.
    pub fn new(years: u32, subunit: u8, encoding: AgeEncoding) -> Option<Self> {
        (subunit < encoding.subunits_per_year()).then_some(Self {
            years,
            subunit,
            encoding,
        })
    }

    /// Build an age from a total month count.
    ///
    /// The year saturates at `u32::MAX`.
    pub fn from_total_months(total: u64, encoding: AgeEncoding) -> Self {
        let years = u32::try_from(total / 12).unwrap_or(u32::MAX);
        let months = (total % 12) as u8;
        let subunit = match encoding {
            AgeEncoding::Months => months,
            AgeEncoding::Tenths => encoding::months_to_tenth(months),
        };
        Self {
            years,
            subunit,
            encoding,
        }
    }

    /// The fractional part expressed as calendar months.
    pub fn months(&self) -> u8 {
        match self.encoding {
            AgeEncoding::Months => self.subunit,
            AgeEncoding::Tenths => encoding::tenth_to_months(self.subunit),
        }
    }

    /// Months elapsed since the start of year zero.
    ///
    /// Widened to `u64` so that any `u32` year fits.
    pub fn total_months(&self) -> u64 {
        u64::from(self.years) * 12 + u64::from(self.months())
    }

    /// Re-express this age in another encoding.
    pub fn to_encoding(self, encoding: AgeEncoding) -> Self {
        if self.encoding == encoding {
            self
        } else {
            Self::from_total_months(self.total_months(), encoding)
        }
    }

    /// Parse a string whose encoding is known.
    pub fn parse_as(s: &str, encoding: AgeEncoding) -> Option<Self> {
        let (years, fraction) = split_age(s)?;
        let subunit: u8 = fraction.parse().ok()?;
        if encoding == AgeEncoding::Tenths && fraction.len() != 1 {
            return None;
        }
        Self::new(years, subunit, encoding)
    }

    /// Human-readable `"<Y> years <M> months"` rendering.
    pub fn years_months(&self) -> String {
        encoding::format_years_months(self.years, self.months())
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.encoding {
            AgeEncoding::Tenths => write!(f, "{}.{}", self.years, self.subunit),
            AgeEncoding::Months => write!(f, "{}.{:02}", self.years, self.subunit),
        }
    }
}

impl FromStr for Age {
    type Err = String;

    /// Parse an untagged age string, detecting its encoding from its shape.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let encoding =
            encoding::detect_encoding(s).ok_or_else(|| format!("malformed age: {s:?}"))?;
        Age::parse_as(s, encoding).ok_or_else(|| format!("malformed age: {s:?}"))
    }
}

/// Split `"Y.F"` into its numeric year and raw fraction digits.
pub(crate) fn split_age(s: &str) -> Option<(u32, &str)> {
    let (years, fraction) = s.trim().split_once('.')?;
    if years.is_empty()
        || fraction.is_empty()
        || !years.bytes().all(|b| b.is_ascii_digit())
        || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    Some((years.parse().ok()?, fraction))
}

pub const INVALID_SCORE: &str = "Invalid score";
pub const CANNOT_CALCULATE: &str = "Cannot calculate";

/// The result of converting a raw score through a norm table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "age", rename_all = "snake_case")]
pub enum AcademicAge {
    /// The raw score has its own table entry.
    Exact(Age),
    /// The raw score is below the table; carries the lowest tabulated age.
    Below(Age),
    /// The raw score is above the table; carries the highest tabulated age.
    Above(Age),
    /// The raw score cannot come from this instrument.
    InvalidScore,
}

impl AcademicAge {
    /// The age usable for arithmetic, if this is not a sentinel.
    pub fn exact(&self) -> Option<Age> {
        match self {
            AcademicAge::Exact(age) => Some(*age),
            _ => None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        !matches!(self, AcademicAge::Exact(_))
    }

    /// Parse a stored academic age string, sentinels included.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s == INVALID_SCORE {
            return Some(AcademicAge::InvalidScore);
        }
        if let Some(rest) = s.strip_prefix('<') {
            return rest.trim().parse().ok().map(AcademicAge::Below);
        }
        if let Some(rest) = s.strip_prefix('>') {
            return rest.trim().parse().ok().map(AcademicAge::Above);
        }
        s.parse().ok().map(AcademicAge::Exact)
    }

    /// Human-readable rendering with sentinel prefixes preserved.
    pub fn years_months(&self) -> String {
        match self {
            AcademicAge::Exact(age) => age.years_months(),
            AcademicAge::Below(age) => format!("< {}", age.years_months()),
            AcademicAge::Above(age) => format!("> {}", age.years_months()),
            AcademicAge::InvalidScore => INVALID_SCORE.to_string(),
        }
    }
}

impl fmt::Display for AcademicAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcademicAge::Exact(age) => write!(f, "{age}"),
            AcademicAge::Below(age) => write!(f, "< {age}"),
            AcademicAge::Above(age) => write!(f, "> {age}"),
            AcademicAge::InvalidScore => write!(f, "{INVALID_SCORE}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn months(years: u32, m: u8) -> Age {
        Age::new(years, m, AgeEncoding::Months).unwrap()
    }

    fn tenths(years: u32, t: u8) -> Age {
        Age::new(years, t, AgeEncoding::Tenths).unwrap()
    }

    #[test]
    fn encoding_display_and_parse() {
        assert_eq!(AgeEncoding::Tenths.to_string(), "tenths");
        assert_eq!("Months".parse::<AgeEncoding>().unwrap(), AgeEncoding::Months);
        assert!("weeks".parse::<AgeEncoding>().is_err());
        assert_eq!(
            "literacy-spelling".parse::<SubjectFamily>().unwrap(),
            SubjectFamily::Spelling
        );
    }

    #[test]
    fn subunit_must_fit_encoding() {
        assert!(Age::new(7, 10, AgeEncoding::Tenths).is_none());
        assert!(Age::new(7, 11, AgeEncoding::Months).is_some());
        assert!(Age::new(7, 12, AgeEncoding::Months).is_none());
    }

    #[test]
    fn months_render_padded() {
        assert_eq!(months(6, 11).to_string(), "6.11");
        assert_eq!(months(7, 5).to_string(), "7.05");
        assert_eq!(months(7, 0).to_string(), "7.00");
        assert_eq!(tenths(6, 9).to_string(), "6.9");
        assert_eq!(tenths(6, 0).to_string(), "6.0");
    }

    #[test]
    fn untagged_parse_detects_encoding() {
        assert_eq!("7.10".parse::<Age>().unwrap(), months(7, 10));
        assert_eq!("7.05".parse::<Age>().unwrap(), months(7, 5));
        assert_eq!("7.3".parse::<Age>().unwrap(), tenths(7, 3));
        assert!("7.12".parse::<Age>().is_err());
        assert!("7".parse::<Age>().is_err());
        assert!("seven".parse::<Age>().is_err());
        assert!("7.123".parse::<Age>().is_err());
    }

    #[test]
    fn tagged_parse_trusts_the_tag() {
        // A single-digit month is fine once the encoding is known.
        assert_eq!(Age::parse_as("7.5", AgeEncoding::Months), Some(months(7, 5)));
        assert_eq!(Age::parse_as("7.05", AgeEncoding::Tenths), None);
    }

    #[test]
    fn total_months_uses_published_tenths() {
        assert_eq!(tenths(6, 9).total_months(), 83);
        assert_eq!(tenths(0, 3).total_months(), 4);
        assert_eq!(months(6, 11).total_months(), 83);
        assert_eq!(
            months(u32::MAX, 11).total_months(),
            u64::from(u32::MAX) * 12 + 11
        );
    }

    #[test]
    fn huge_years_convert_without_overflow() {
        let age = "400000000.1".parse::<Age>().unwrap();
        assert_eq!(age.to_encoding(AgeEncoding::Months), months(400_000_000, 1));
        assert_eq!(
            months(u32::MAX, 11).to_encoding(AgeEncoding::Tenths),
            tenths(u32::MAX, 9)
        );
    }

    #[test]
    fn encoding_conversion() {
        assert_eq!(months(6, 11).to_encoding(AgeEncoding::Tenths), tenths(6, 9));
        assert_eq!(months(6, 4).to_encoding(AgeEncoding::Tenths), tenths(6, 3));
        assert_eq!(tenths(6, 3).to_encoding(AgeEncoding::Months), months(6, 4));
    }

    #[test]
    fn academic_age_sentinels_roundtrip_through_strings() {
        let below = AcademicAge::Below(tenths(6, 0));
        assert_eq!(below.to_string(), "< 6.0");
        assert_eq!(AcademicAge::Below(months(6, 0)).to_string(), "< 6.00");
        assert_eq!(AcademicAge::parse("< 6.0"), Some(AcademicAge::Below(tenths(6, 0))));
        assert_eq!(
            AcademicAge::parse("> 11.11"),
            Some(AcademicAge::Above(months(11, 11)))
        );
        assert_eq!(
            AcademicAge::parse("Invalid score"),
            Some(AcademicAge::InvalidScore)
        );
        assert_eq!(AcademicAge::parse(""), None);
        assert!(AcademicAge::InvalidScore.is_sentinel());
    }

    #[test]
    fn academic_age_serializes_with_kind_tag() {
        let json = serde_json::to_string(&AcademicAge::Exact(tenths(6, 0))).unwrap();
        assert!(json.contains("\"kind\":\"exact\""));
        assert!(json.contains("\"encoding\":\"tenths\""));
        let back: AcademicAge = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AcademicAge::Exact(tenths(6, 0)));
    }
}
