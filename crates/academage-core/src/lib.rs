//! academage-core — Norm tables, age arithmetic and comparison.
//!
//! Turns a raw test score into a standardized score and an academic age,
//! computes chronological age from dates, and compares the two across the
//! tenths and months encodings.
//!
//! The top-level functions take and return the plain strings stored next to
//! an assessment. The typed API underneath lives in the modules.

pub mod assessment;
pub mod chronological;
pub mod comparator;
pub mod encoding;
pub mod error;
pub mod model;
pub mod norms;
pub mod parser;
pub mod report;
pub mod standardization;

pub use chronological::{chronological_age, chronological_age_string};
pub use comparator::{age_difference, deficit_status, is_deficit, DeficitStatus};
pub use encoding::to_years_months;
pub use error::NormError;
pub use model::{AcademicAge, Age, AgeEncoding, SubjectFamily};
pub use norms::{convert_to_academic_age, NormRegistry};
pub use standardization::standardize;
