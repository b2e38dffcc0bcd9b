//! Engine error types.
//!
//! Only caller mistakes are errors here. Out-of-range scores and unparseable
//! age strings come back as data (sentinels).

use thiserror::Error;

/// Errors raised by norm lookups and table construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormError {
    /// The named test has no norm table.
    #[error("unknown test: {0}")]
    UnknownTest(String),

    /// The named assessment component has no standardization table.
    #[error("unknown component: {0}")]
    UnknownComponent(String),

    /// A norm table could not be built from its source.
    #[error("malformed norm table '{test}': {message}")]
    MalformedTable { test: String, message: String },

    /// Two norm tables share the same id.
    #[error("duplicate test id: {0}")]
    DuplicateTest(String),

    /// The test date lies before the date of birth.
    #[error("test date {test_date} is before date of birth {date_of_birth}")]
    TestBeforeBirth {
        date_of_birth: chrono::NaiveDate,
        test_date: chrono::NaiveDate,
    },
}

impl NormError {
    /// Returns `true` if this error points at a bad identifier or table,
    /// i.e. a bug in the caller's configuration rather than in user input.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            NormError::UnknownTest(_)
                | NormError::UnknownComponent(_)
                | NormError::MalformedTable { .. }
                | NormError::DuplicateTest(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, NormError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn identifier_errors_are_configuration_errors() {
        assert!(NormError::UnknownTest("x".into()).is_configuration());
        assert!(NormError::UnknownComponent("x".into()).is_configuration());
        assert!(NormError::DuplicateTest("x".into()).is_configuration());
    }

    #[test]
    fn date_order_is_not_a_configuration_error() {
        let err = NormError::TestBeforeBirth {
            date_of_birth: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            test_date: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
        };
        assert!(!err.is_configuration());
        assert!(err.to_string().contains("2019-01-01"));
    }
}
