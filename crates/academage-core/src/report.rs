//! Batch assessment of a roster, with JSON persistence.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assessment::{assess, AssessmentOutcome, AssessmentRequest};
use crate::comparator::DeficitStatus;
use crate::norms::NormRegistry;

/// One student's row in a roster file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub test_date: NaiveDate,
    pub test: String,
    pub raw_score: i64,
    #[serde(default)]
    pub components: BTreeMap<String, i64>,
}

impl StudentRecord {
    fn request(&self) -> AssessmentRequest {
        AssessmentRequest {
            test: self.test.clone(),
            raw_score: self.raw_score,
            date_of_birth: self.date_of_birth,
            test_date: self.test_date,
            components: self.components.clone(),
        }
    }
}

/// A roster of students to assess together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub students: Vec<StudentRecord>,
}

impl Roster {
    /// Load a roster from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read roster: {}", path.display()))?;
        Self::parse_str(&content, path)
    }

    /// Parse a roster from a TOML string.
    pub fn parse_str(content: &str, source_path: &Path) -> Result<Self> {
        let mut roster: Roster = toml::from_str(content)
            .with_context(|| format!("failed to parse roster: {}", source_path.display()))?;
        if roster.name.is_empty() {
            roster.name = source_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        Ok(roster)
    }
}

/// The result for one roster row: an outcome, or why there is none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEntry {
    pub student_id: String,
    pub student_name: String,
    #[serde(default)]
    pub outcome: Option<AssessmentOutcome>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Counts for one test across the batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSummary {
    pub assessed: usize,
    pub deficit: usize,
    pub no_deficit: usize,
    pub undetermined: usize,
}

impl TestSummary {
    fn record(&mut self, status: DeficitStatus) {
        self.assessed += 1;
        match status {
            DeficitStatus::Deficit => self.deficit += 1,
            DeficitStatus::NoDeficit => self.no_deficit += 1,
            DeficitStatus::Undetermined => self.undetermined += 1,
        }
    }
}

/// Roll-up of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub failed: usize,
    pub overall: TestSummary,
    pub per_test: BTreeMap<String, TestSummary>,
}

/// A complete batch report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Roster the report was built from.
    pub roster: String,
    pub entries: Vec<BatchEntry>,
    pub summary: BatchSummary,
}

impl BatchReport {
    /// Assess every student in the roster.
    ///
    /// A row that fails (unknown test, bad dates) is recorded with its error
    /// and the batch carries on.
    pub fn run(registry: &NormRegistry, roster: &Roster) -> Self {
        let mut summary = BatchSummary::default();
        let entries: Vec<BatchEntry> = roster
            .students
            .iter()
            .map(|student| {
                summary.total += 1;
                let (outcome, error) = match assess(registry, &student.request()) {
                    Ok(outcome) => {
                        summary.overall.record(outcome.status);
                        summary
                            .per_test
                            .entry(outcome.test_id.clone())
                            .or_default()
                            .record(outcome.status);
                        (Some(outcome), None)
                    }
                    Err(e) => {
                        tracing::warn!("student '{}': {}", student.id, e);
                        summary.failed += 1;
                        (None, Some(e.to_string()))
                    }
                };
                BatchEntry {
                    student_id: student.id.clone(),
                    student_name: student.name.clone(),
                    outcome,
                    error,
                }
            })
            .collect();

        tracing::info!(
            total = summary.total,
            failed = summary.failed,
            deficits = summary.overall.deficit,
            "batch assessed"
        );

        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            roster: roster.name.clone(),
            entries,
            summary,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: BatchReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Render as a markdown table.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        md.push_str(&format!("## Assessment batch: {}\n\n", self.roster));
        md.push_str(&format!(
            "{} students, {} deficit, {} no deficit, {} undetermined, {} failed\n\n",
            self.summary.total,
            self.summary.overall.deficit,
            self.summary.overall.no_deficit,
            self.summary.overall.undetermined,
            self.summary.failed
        ));
        md.push_str("| Student | Test | Raw | Academic age | Chronological age | Difference | Status |\n");
        md.push_str("|---------|------|-----|--------------|-------------------|------------|--------|\n");
        for entry in &self.entries {
            let student = if entry.student_name.is_empty() {
                entry.student_id.clone()
            } else {
                format!("{} ({})", entry.student_name, entry.student_id)
            };
            match (&entry.outcome, &entry.error) {
                (Some(o), _) => md.push_str(&format!(
                    "| {} | {} | {} | {} | {} | {} | {} |\n",
                    student,
                    o.test_id,
                    o.raw_score,
                    o.academic_age_text,
                    o.chronological_age_text,
                    o.difference,
                    o.status
                )),
                (None, error) => md.push_str(&format!(
                    "| {} | | | | | | error: {} |\n",
                    student,
                    error.as_deref().unwrap_or("unknown")
                )),
            }
        }
        md
    }
}
