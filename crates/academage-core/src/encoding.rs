//! Tenths/months conversion and display normalization.
//!
//! The tenths used by the paper norm tables are not a proportional split of
//! the year. Both directions below are fixed lookup tables and must not be
//! replaced with arithmetic.

use crate::model::{split_age, AcademicAge, Age, AgeEncoding};

/// Months (index) to published tenths digit.
const MONTH_TO_TENTH: [u8; 12] = [0, 1, 2, 3, 3, 4, 5, 6, 7, 8, 9, 9];

/// Tenths digit (index) to months. Where two months share a tenth, the
/// later month is used.
const TENTH_TO_MONTHS: [u8; 10] = [0, 1, 2, 4, 5, 6, 7, 8, 9, 11];

/// Map a month count (0–11) to its tenths digit.
pub fn months_to_tenth(months: u8) -> u8 {
    MONTH_TO_TENTH[usize::from(months.min(11))]
}

/// Map a tenths digit (0–9) to its month count.
pub fn tenth_to_months(tenth: u8) -> u8 {
    TENTH_TO_MONTHS[usize::from(tenth.min(9))]
}

/// Guess the encoding of an untagged age string.
///
/// A two-digit fraction (or one above 9) can only be months; a single digit
/// is read as tenths. Returns `None` if the string is not `Y.F` shaped.
pub fn detect_encoding(s: &str) -> Option<AgeEncoding> {
    let (_, fraction) = split_age(s)?;
    let value: u32 = fraction.parse().ok()?;
    if fraction.len() >= 2 || value > 9 {
        Some(AgeEncoding::Months)
    } else {
        Some(AgeEncoding::Tenths)
    }
}

pub(crate) fn format_years_months(years: u32, months: u8) -> String {
    if months == 0 {
        format!("{years} years")
    } else {
        format!("{years} years {months} months")
    }
}

/// Render any stored age string as `"<Y> years <M> months"`.
///
/// Sentinel prefixes survive the conversion. Strings that are not ages are
/// returned unchanged.
pub fn to_years_months(age: &str) -> String {
    match AcademicAge::parse(age) {
        Some(AcademicAge::InvalidScore) | None => age.to_string(),
        Some(parsed) => parsed.years_months(),
    }
}

/// Convert a stored age string to total months, if it is a plain age.
pub fn to_total_months(age: &str) -> Option<u64> {
    age.parse::<Age>().ok().map(|a| a.total_months())
}
