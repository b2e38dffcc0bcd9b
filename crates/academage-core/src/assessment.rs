//! One student's assessment, end to end.
//!
//! Raw score → academic age → chronological age (in the same encoding as the
//! test's table) → difference and deficit status.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::chronological::chronological_age;
use crate::comparator::{Comparison, DeficitStatus};
use crate::error::Result;
use crate::model::{AcademicAge, Age, AgeEncoding, SubjectFamily};
use crate::norms::NormRegistry;
use crate::standardization::Component;

/// Inputs collected by the entry form for one test sitting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentRequest {
    /// Test id or display name.
    pub test: String,
    pub raw_score: i64,
    pub date_of_birth: NaiveDate,
    pub test_date: NaiveDate,
    /// Raw component scores keyed by component name.
    #[serde(default)]
    pub components: BTreeMap<String, i64>,
}

/// A standardized component score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentScore {
    pub component: Component,
    pub raw: i64,
    /// 1–5, or 0 when the raw score is outside every band.
    pub standardized: u8,
}

/// Everything derived from an [`AssessmentRequest`].
///
/// The `*_text` fields are the stored string forms; `*_display` fields are
/// the `"<Y> years <M> months"` renderings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentOutcome {
    pub test_id: String,
    pub test_name: String,
    pub family: SubjectFamily,
    pub encoding: AgeEncoding,
    pub raw_score: i64,
    pub academic_age: AcademicAge,
    pub academic_age_text: String,
    pub academic_age_display: String,
    pub chronological_age: Age,
    pub chronological_age_text: String,
    pub chronological_age_display: String,
    /// Signed `years.months` gap, or `"Cannot calculate"`.
    pub difference: String,
    pub deficit: bool,
    pub status: DeficitStatus,
    #[serde(default)]
    pub components: Vec<ComponentScore>,
}

/// Run the full pipeline for one request.
///
/// Fails only on an unknown test or component name, or a test date before
/// the date of birth.
pub fn assess(registry: &NormRegistry, request: &AssessmentRequest) -> Result<AssessmentOutcome> {
    let table = registry.get(&request.test)?;
    let definition = table.definition();

    let components = request
        .components
        .iter()
        .map(|(name, &raw)| {
            let component: Component = name.parse()?;
            Ok(ComponentScore {
                component,
                raw,
                standardized: component.standardize(raw),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let academic_age = table.lookup(request.raw_score);
    let chronological =
        chronological_age(request.date_of_birth, request.test_date, definition.encoding)?;
    let comparison = Comparison::new(&academic_age, chronological);

    tracing::debug!(
        test = %definition.id,
        raw = request.raw_score,
        academic = %academic_age,
        chronological = %chronological,
        status = %comparison.status,
        "assessed"
    );

    Ok(AssessmentOutcome {
        test_id: definition.id.clone(),
        test_name: definition.name.clone(),
        family: definition.family,
        encoding: definition.encoding,
        raw_score: request.raw_score,
        academic_age,
        academic_age_text: table.lookup_text(request.raw_score),
        academic_age_display: academic_age.years_months(),
        chronological_age: chronological,
        chronological_age_text: chronological.to_string(),
        chronological_age_display: chronological.years_months(),
        difference: comparison.difference_string(),
        deficit: comparison.status.as_flag(),
        status: comparison.status,
        components,
    })
}
