//! Chronological age at the date of testing.

use chrono::NaiveDate;

use crate::error::{NormError, Result};
use crate::model::{Age, AgeEncoding};

/// Average year length used to turn elapsed days into years.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Compute a student's age on `test_date`.
///
/// Elapsed days are divided by [`DAYS_PER_YEAR`]; whole years and whole
/// months are both truncated. In the tenths encoding the month count goes
/// through the published months-to-tenths table.
pub fn chronological_age(
    date_of_birth: NaiveDate,
    test_date: NaiveDate,
    encoding: AgeEncoding,
) -> Result<Age> {
    let days = (test_date - date_of_birth).num_days();
    if days < 0 {
        return Err(NormError::TestBeforeBirth {
            date_of_birth,
            test_date,
        });
    }

    let fractional_years = days as f64 / DAYS_PER_YEAR;
    let years = fractional_years.floor();
    let months = (((fractional_years - years) * 12.0).floor() as u64).min(11);
    let total = years as u64 * 12 + months;

    Ok(Age::from_total_months(total, encoding))
}

/// String form of [`chronological_age`], as stored alongside an assessment.
pub fn chronological_age_string(
    date_of_birth: NaiveDate,
    test_date: NaiveDate,
    encoding: AgeEncoding,
) -> Result<String> {
    chronological_age(date_of_birth, test_date, encoding).map(|age| age.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::to_years_months;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn months_encoding() {
        let age = chronological_age(date(2018, 5, 15), date(2025, 5, 10), AgeEncoding::Months)
            .unwrap();
        assert_eq!(age.to_string(), "6.11");
        assert_eq!(age.years, 6);
        assert_eq!(age.months(), 11);
    }

    #[test]
    fn tenths_encoding() {
        let age = chronological_age_string(date(2018, 5, 15), date(2025, 5, 10), AgeEncoding::Tenths)
            .unwrap();
        assert_eq!(age, "6.9");
    }

    #[test]
    fn tenths_uses_published_table() {
        // 4 months shares tenth 3 with 3 months.
        let dob = date(2015, 1, 1);
        let test = date(2022, 5, 5);
        assert_eq!(
            chronological_age_string(dob, test, AgeEncoding::Months).unwrap(),
            "7.04"
        );
        assert_eq!(
            chronological_age_string(dob, test, AgeEncoding::Tenths).unwrap(),
            "7.3"
        );
    }

    #[test]
    fn same_day_is_zero() {
        let age = chronological_age(date(2020, 3, 1), date(2020, 3, 1), AgeEncoding::Months)
            .unwrap();
        assert_eq!(age.to_string(), "0.00");
    }

    #[test]
    fn whole_years_keep_two_month_digits() {
        let dob = date(2018, 1, 1);
        let test = date(2025, 1, 5);
        assert_eq!(
            chronological_age_string(dob, test, AgeEncoding::Months).unwrap(),
            "7.00"
        );
        assert_eq!(
            chronological_age_string(dob, test, AgeEncoding::Tenths).unwrap(),
            "7.0"
        );
        assert_eq!(to_years_months("7.00"), "7 years");
    }

    #[test]
    fn test_before_birth_is_rejected() {
        let err = chronological_age(date(2020, 3, 1), date(2020, 2, 1), AgeEncoding::Months)
            .unwrap_err();
        assert!(matches!(err, NormError::TestBeforeBirth { .. }));
    }

    #[test]
    fn display_roundtrip_matches_direct_rendering() {
        let dob = date(2016, 9, 30);
        let mut test = date(2022, 1, 1);
        while test < date(2024, 1, 1) {
            let age = chronological_age(dob, test, AgeEncoding::Months).unwrap();
            assert_eq!(to_years_months(&age.to_string()), age.years_months(), "{test}");
            test = test.succ_opt().unwrap();
        }
    }
}
